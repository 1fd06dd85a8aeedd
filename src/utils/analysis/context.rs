//! Call-site context disambiguation
//!
//! Symbol names collide far more often than file names, so symbol hits are
//! classified by call shape and compared against the declaring context of the
//! target file (its first class, interface, trait, struct or namespace-like
//! constant). Hits whose receiver mentions that context are "contextual".
//!
//! Both the declaration detector and the call-site matcher are ordered lists of
//! named patterns; the first declaration found top to bottom wins.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::core::{MatchRecord, MatchType, STANDALONE_CONTEXT};

/// A named declaration shape, e.g. `class Foo` or `type Foo struct`.
pub struct DeclarationPattern {
    pub name: &'static str,
    regex: Regex,
}

impl DeclarationPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("declaration pattern must compile"),
        }
    }

    /// Name bound by this declaration on `line`, if the line declares one.
    pub fn capture<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.regex
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

lazy_static! {
    /// Declaration shapes across JS/TS, PHP, Go, Python and Rust, in priority order.
    pub static ref DECLARATION_PATTERNS: Vec<DeclarationPattern> = vec![
        // class Foo / export default abstract class Foo / final class Foo / class Foo:
        DeclarationPattern::new(
            "class",
            r"^\s*(?:export\s+)?(?:default\s+)?(?:(?:abstract|final|readonly)\s+)*class\s+([A-Za-z_$][\w$]*)",
        ),
        DeclarationPattern::new(
            "interface",
            r"^\s*(?:export\s+)?(?:default\s+)?interface\s+([A-Za-z_$][\w$]*)",
        ),
        DeclarationPattern::new(
            "trait",
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?trait\s+([A-Za-z_]\w*)",
        ),
        // Go: type Foo struct / type Foo interface
        DeclarationPattern::new(
            "type",
            r"^\s*type\s+([A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(?:struct|interface)\b",
        ),
        DeclarationPattern::new(
            "struct",
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum)\s+([A-Za-z_]\w*)",
        ),
        // Namespace-like constants only: const Foo = { ... } / = class / = new / Object.freeze(
        DeclarationPattern::new(
            "constant",
            r"^\s*(?:export\s+)?const\s+([A-Za-z_$][\w$]*)\s*(?::[^=]+)?=\s*(?:\{|class\b|new\s|Object\.freeze\()",
        ),
    ];
}

/// The first declaration in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub kind: &'static str,
    pub name: String,
    pub line_number: usize,
}

/// First declaration found scanning top to bottom; later ones are ignored.
pub fn detect_declaration(content: &str) -> Option<Declaration> {
    for (index, line) in content.lines().enumerate() {
        for pattern in DECLARATION_PATTERNS.iter() {
            if let Some(name) = pattern.capture(line) {
                return Some(Declaration {
                    kind: pattern.name,
                    name: name.to_string(),
                    line_number: index + 1,
                });
            }
        }
    }
    None
}

pub fn detect_declaring_context(content: &str) -> Option<String> {
    detect_declaration(content).map(|d| d.name)
}

enum CallKind {
    /// `receiver<op>symbol(`; capture group 1 is the receiver token.
    Receiver(Regex),
    /// `<op>symbol(` after a call or index expression, e.g. `getWidget().render(`,
    /// or at the start of a line continuing a chain from the previous line.
    Chained,
    /// `symbol(` with no member operator, sigil or identifier char before it.
    Standalone,
}

const MEMBER_OPERATORS: [&str; 3] = [".", "?.", "->"];

/// One call-site shape for a specific symbol.
struct CallPattern {
    kind: CallKind,
}

impl CallPattern {
    fn match_type(&self) -> MatchType {
        match self.kind {
            CallKind::Receiver(_) | CallKind::Chained => MatchType::MethodCall,
            CallKind::Standalone => MatchType::StandaloneCall,
        }
    }

    /// Call contexts of every occurrence of this shape on `line`. `previous` is the
    /// last non-blank line before it.
    fn contexts(&self, line: &str, previous: Option<&str>, symbol: &str) -> Vec<String> {
        match &self.kind {
            CallKind::Receiver(regex) => regex
                .captures_iter(line)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .collect(),
            CallKind::Chained => {
                let mut contexts = Vec::new();
                for op in MEMBER_OPERATORS {
                    let needle = format!("{}{}(", op, symbol);
                    for (start, _) in line.match_indices(&needle) {
                        let before = &line[..start];
                        if op == "." && before.ends_with('?') {
                            continue;
                        }
                        if before.trim().is_empty() {
                            contexts.extend(previous.map(receiver_chain));
                        } else if before.ends_with(')') || before.ends_with(']') {
                            contexts.push(receiver_chain(before));
                        }
                    }
                }
                contexts
            }
            CallKind::Standalone => {
                let needle = format!("{}(", symbol);
                line.match_indices(&needle)
                    .filter(|(start, _)| is_standalone_prefix(&line[..*start]))
                    .map(|_| STANDALONE_CONTEXT.to_string())
                    .collect()
            }
        }
    }
}

fn is_standalone_prefix(before: &str) -> bool {
    if before.ends_with("->") || before.ends_with("::") {
        return false;
    }
    match before.chars().next_back() {
        None => true,
        Some(c) => !(c == '.' || c == '$' || c == '_' || c.is_alphanumeric()),
    }
}

/// Member chain ending at the end of `before`, with bracket groups dropped:
/// `this.widgets.get(id)` gives `this.widgets.get`, `items[0]` gives `items`.
/// Falls back to the last whitespace-separated token when no identifier is found.
fn receiver_chain(before: &str) -> String {
    let text = before.trim_end();
    let mut chain = Vec::new();
    let mut depth = 0usize;

    for c in text.chars().rev() {
        match c {
            ')' | ']' => depth += 1,
            '(' | '[' if depth > 0 => depth -= 1,
            _ if depth > 0 => {}
            c if c.is_alphanumeric() || "_$.->:".contains(c) => chain.push(c),
            _ => break,
        }
    }

    let chain: String = chain.into_iter().rev().collect();
    let chain = chain.trim_matches(|c| ".->:".contains(c));
    if chain.is_empty() {
        text.rsplit(char::is_whitespace).next().unwrap_or(text).to_string()
    } else {
        chain.to_string()
    }
}

/// Ordered call-site matchers compiled for one symbol name.
pub struct CallMatcher {
    symbol: String,
    patterns: Vec<CallPattern>,
}

impl CallMatcher {
    pub fn new(symbol: &str) -> Self {
        let escaped = regex::escape(symbol);
        let receiver = |op: &str| {
            Regex::new(&format!(r"([$A-Za-z_][\w$]*){}{}\(", op, escaped))
                .expect("escaped call pattern must compile")
        };

        let patterns = vec![
            // property: obj.sym( / obj?.sym(
            CallPattern {
                kind: CallKind::Receiver(receiver(r"\??\.")),
            },
            // arrow: $obj->sym(
            CallPattern {
                kind: CallKind::Receiver(receiver("->")),
            },
            // scope: Class::sym( / \Ns\Class::sym(
            CallPattern {
                kind: CallKind::Receiver(
                    Regex::new(&format!(r"([A-Za-z_\\][\w\\]*)::{}\(", escaped))
                        .expect("escaped call pattern must compile"),
                ),
            },
            CallPattern {
                kind: CallKind::Chained,
            },
            CallPattern {
                kind: CallKind::Standalone,
            },
        ];

        Self {
            symbol: symbol.to_string(),
            patterns,
        }
    }

    /// All call sites of the symbol in `content`, in line order, shapes in priority order.
    pub fn scan(&self, content: &str) -> Vec<MatchRecord> {
        let mut results = Vec::new();
        let mut previous: Option<&str> = None;
        for (index, line) in content.lines().enumerate() {
            if line.contains(&self.symbol) {
                for pattern in &self.patterns {
                    for call_context in pattern.contexts(line, previous, &self.symbol) {
                        results.push(MatchRecord {
                            line_number: index + 1,
                            line_text: line.trim().to_string(),
                            keyword: self.symbol.clone(),
                            match_type: pattern.match_type(),
                            call_context,
                        });
                    }
                }
            }
            if !line.trim().is_empty() {
                previous = Some(line);
            }
        }
        results
    }
}

pub fn detect_method_context(content: &str, symbol: &str) -> Vec<MatchRecord> {
    CallMatcher::new(symbol).scan(content)
}

/// Method calls whose receiver contains the declaring context (case-insensitive).
pub fn contextual_subset<'a>(matches: &'a [MatchRecord], context: &str) -> Vec<&'a MatchRecord> {
    let needle = context.to_lowercase();
    matches
        .iter()
        .filter(|m| is_contextual(m, &needle))
        .collect()
}

fn is_contextual(record: &MatchRecord, lowered_context: &str) -> bool {
    record.match_type == MatchType::MethodCall
        && !lowered_context.is_empty()
        && record.call_context.to_lowercase().contains(lowered_context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaring_context_per_syntax() {
        assert_eq!(detect_declaring_context("export default class Widget {"), Some("Widget".into()));
        assert_eq!(detect_declaring_context("<?php\nfinal class Mailer\n{"), Some("Mailer".into()));
        assert_eq!(detect_declaring_context("interface Shape {}"), Some("Shape".into()));
        assert_eq!(detect_declaring_context("trait Loggable {"), Some("Loggable".into()));
        assert_eq!(detect_declaring_context("package main\n\ntype Server struct {"), Some("Server".into()));
        assert_eq!(detect_declaring_context("pub struct Cache {"), Some("Cache".into()));
        assert_eq!(detect_declaring_context("export const Api = {"), Some("Api".into()));
        assert_eq!(detect_declaring_context("class Parser:\n    pass"), Some("Parser".into()));
    }

    #[test]
    fn test_plain_constants_are_not_contexts() {
        assert_eq!(detect_declaring_context("const fs = require('fs');\nconst MAX = 3;"), None);
        assert_eq!(detect_declaring_context("function render() {}"), None);
    }

    #[test]
    fn test_first_declaration_wins() {
        let content = "// helpers\nclass First {}\nclass Second {}\n";
        let decl = detect_declaration(content).unwrap();
        assert_eq!(decl.name, "First");
        assert_eq!(decl.kind, "class");
        assert_eq!(decl.line_number, 2);
    }

    #[test]
    fn test_call_shapes() {
        let content = "widget.render();\n$view->render($x);\nView::render();\nrender(1);\n";
        let matches = detect_method_context(content, "render");

        let summary: Vec<(usize, MatchType, &str)> = matches
            .iter()
            .map(|m| (m.line_number, m.match_type, m.call_context.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, MatchType::MethodCall, "widget"),
                (2, MatchType::MethodCall, "$view"),
                (3, MatchType::MethodCall, "View"),
                (4, MatchType::StandaloneCall, STANDALONE_CONTEXT),
            ]
        );
    }

    #[test]
    fn test_chained_receivers() {
        let content = "items[0].render();\ngetWidget().render();\nthis.widgets.get(id).render();\nwidget\n  .render();\n";
        let matches = detect_method_context(content, "render");

        let summary: Vec<(usize, MatchType, &str)> = matches
            .iter()
            .map(|m| (m.line_number, m.match_type, m.call_context.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (1, MatchType::MethodCall, "items"),
                (2, MatchType::MethodCall, "getWidget"),
                (3, MatchType::MethodCall, "this.widgets.get"),
                (5, MatchType::MethodCall, "widget"),
            ]
        );
    }

    #[test]
    fn test_chained_receiver_shapes() {
        let matches = detect_method_context("$repo->find($id)->render();\nload()?.render();", "render");
        let contexts: Vec<&str> = matches.iter().map(|m| m.call_context.as_str()).collect();
        assert_eq!(contexts, vec!["$repo->find", "load"]);

        // Continuation after blank lines uses the last non-blank line
        let matches = detect_method_context("builder()\n\n    .render();", "render");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].call_context, "builder");

        let contextual = contextual_subset(&matches, "Builder");
        assert_eq!(contextual.len(), 1);
    }

    #[test]
    fn test_standalone_requires_clean_prefix() {
        assert!(detect_method_context("rerender();", "render").is_empty());
        assert!(detect_method_context("$render();", "render").is_empty());
        assert!(detect_method_context("render ()", "render").is_empty());
        assert_eq!(detect_method_context("x = (render(a))", "render").len(), 1);
    }

    #[test]
    fn test_multiple_shapes_on_one_line() {
        let matches = detect_method_context("a.render(); b?.render(); render();", "render");
        let contexts: Vec<&str> = matches.iter().map(|m| m.call_context.as_str()).collect();
        assert_eq!(contexts, vec!["a", "b", STANDALONE_CONTEXT]);
        assert!(matches.iter().all(|m| m.line_number == 1));
    }

    #[test]
    fn test_symbol_with_regex_metacharacters() {
        let matches = detect_method_context("obj.$get(1)", "$get");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].call_context, "obj");
    }

    #[test]
    fn test_contextual_subset_case_insensitive() {
        let matches = detect_method_context(
            "widget.render();\nmainWidget.render();\nother.render();\nrender();",
            "render",
        );
        let contextual = contextual_subset(&matches, "Widget");
        let lines: Vec<usize> = contextual.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![1, 2]);
        // Subset property
        assert!(contextual.iter().all(|c| matches.iter().any(|m| m == *c)));
    }

    #[test]
    fn test_contextual_subset_ignores_standalone_and_filename() {
        let records = vec![
            MatchRecord {
                line_number: 1,
                line_text: "standalone".into(),
                keyword: "render".into(),
                match_type: MatchType::StandaloneCall,
                call_context: STANDALONE_CONTEXT.into(),
            },
            MatchRecord {
                line_number: 2,
                line_text: "import './stand.js'".into(),
                keyword: "stand.js".into(),
                match_type: MatchType::FilenameReference,
                call_context: "stand".into(),
            },
        ];
        assert!(contextual_subset(&records, "Stand").is_empty());
    }
}
