//! Markdown report

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use super::{Formatter, confidence_label, last_change_lines, symbol_note};
use crate::core::{FileImpact, ImpactReport, file_name_of};
use crate::locale::Messages;

pub struct MarkdownFormatter;

// Fence language hints for the match snippets
fn language_hint(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "js" | "mjs" | "cjs" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "php" => "php",
        "go" => "go",
        "rs" => "rust",
        "py" => "python",
        _ => "",
    }
}

impl MarkdownFormatter {
    fn write_impact(
        &self,
        output: &mut dyn Write,
        report: &ImpactReport,
        impact: &FileImpact,
        messages: &Messages,
    ) -> Result<()> {
        write!(output, "- `{}`", report.relative(&impact.path).display())?;
        if let Some(via) = &impact.via {
            write!(output, " {}", messages.via(&file_name_of(via)))?;
        }
        if let Some(label) = confidence_label(impact, messages) {
            write!(output, " _({})_", label)?;
        }
        writeln!(output)?;
        writeln!(output)?;
        writeln!(output, "  ```{}", language_hint(&impact.path))?;
        for m in &impact.matches {
            writeln!(output, "  {:>4} | {}", m.line_number, m.line_text)?;
        }
        writeln!(output, "  ```")?;
        writeln!(output)?;
        Ok(())
    }
}

impl Formatter for MarkdownFormatter {
    fn write_header(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        let (author, time) = last_change_lines(&report.last_change, messages);

        writeln!(output, "# {}", messages.impact_title)?;
        writeln!(output)?;
        writeln!(output, "| | |")?;
        writeln!(output, "|---|---|")?;
        writeln!(
            output,
            "| **{}** | `{}` |",
            messages.file,
            report.relative(&report.requested_file).display()
        )?;
        writeln!(output, "| **{}** | {} |", messages.last_changed_by, author)?;
        writeln!(output, "| **{}** | {} |", messages.last_changed_time, time)?;
        writeln!(output, "| **{}** | {} |", messages.scanned_files, report.scanned_files)?;
        if let Some(ctx) = &report.declaring_context {
            writeln!(output, "| **{}** | `{}` |", messages.declaring_context, ctx)?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn write_usages(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        writeln!(output, "## {}", messages.usage_detail)?;
        writeln!(output)?;
        if report.impacts.is_empty() {
            writeln!(output, "_{}_", messages.not_found)?;
            writeln!(output)?;
            return Ok(());
        }

        for (heading, impacts) in [
            (messages.direct_usage, report.direct().collect::<Vec<_>>()),
            (messages.indirect_usage, report.indirect().collect()),
        ] {
            if impacts.is_empty() {
                continue;
            }
            writeln!(output, "### {}", heading)?;
            writeln!(output)?;
            for impact in impacts {
                self.write_impact(output, report, impact, messages)?;
            }
        }
        Ok(())
    }

    fn write_footer(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        if let Some(note) = symbol_note(report, messages) {
            writeln!(output, "> **{}:** {}", messages.note, note.replace('\n', "\n> "))?;
            writeln!(output)?;
        }
        writeln!(output, "## {}", messages.risk_label(report.risk))?;
        writeln!(output)?;
        writeln!(output, "{}", messages.risk_message(report.risk, report.impacted_count()))?;
        writeln!(output)?;
        writeln!(output, "---")?;
        Ok(())
    }
}
