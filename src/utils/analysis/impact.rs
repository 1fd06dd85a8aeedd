//! Impact aggregation
//!
//! Folds per-file scans into the impact map. Files that mention the target's
//! file name are direct usages; files that only call the target symbol are
//! indirect usages, and get a best-effort "via" link to the first direct-usage
//! file whose text mentions them.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::core::{FileImpact, FileScan, MatchRecord, Usage, file_name_of};
use crate::utils::analysis::context::contextual_subset;
use crate::utils::analysis::lines::read_source;

/// True when `candidate` is the target file, directly or through a link.
pub fn is_same_file(candidate: &Path, target: &Path) -> bool {
    candidate == target || candidate.canonicalize().is_ok_and(|c| c == target)
}

/// Aggregated scan results, ready to go into a report.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub impacts: Vec<FileImpact>,
    pub scanned_files: usize,
    /// `None` when no symbol was requested
    pub symbol_file_count: Option<usize>,
}

/// Sole writer of the impact map for one run.
pub struct ImpactAggregator {
    target: PathBuf,
    symbol_requested: bool,
    context: Option<String>,
    impacts: Vec<FileImpact>,
    index: HashMap<PathBuf, usize>,
    scanned_files: usize,
}

impl ImpactAggregator {
    /// `target` must be canonical. `declaring_context` enables high-confidence
    /// classification of method calls.
    pub fn new(target: &Path, symbol_requested: bool, declaring_context: Option<&str>) -> Self {
        Self {
            target: target.to_path_buf(),
            symbol_requested,
            context: declaring_context.map(str::to_string),
            impacts: Vec::new(),
            index: HashMap::new(),
            scanned_files: 0,
        }
    }

    /// Adds one file's scan. The target itself is never recorded; returns
    /// whether the scan was counted.
    pub fn add(&mut self, scan: FileScan) -> bool {
        if is_same_file(&scan.path, &self.target) {
            return false;
        }
        self.scanned_files += 1;
        if scan.is_empty() {
            return true;
        }

        let high_confidence = self
            .context
            .as_deref()
            .is_some_and(|ctx| !contextual_subset(&scan.symbol_matches, ctx).is_empty());
        let has_filename = !scan.filename_matches.is_empty();
        let has_symbol = !scan.symbol_matches.is_empty();

        let slot = match self.index.get(&scan.path) {
            Some(&i) => i,
            None => {
                self.impacts.push(FileImpact {
                    path: scan.path.clone(),
                    matches: Vec::new(),
                    usage: Usage::Indirect,
                    is_high_confidence: false,
                    symbol_matched: false,
                    via: None,
                });
                self.index.insert(scan.path.clone(), self.impacts.len() - 1);
                self.impacts.len() - 1
            }
        };

        let impact = &mut self.impacts[slot];
        impact.matches = dedup_by_line(
            std::mem::take(&mut impact.matches)
                .into_iter()
                .chain(scan.filename_matches)
                .chain(scan.symbol_matches),
        );
        if has_filename {
            impact.usage = Usage::Direct;
        }
        impact.symbol_matched |= has_symbol;
        impact.is_high_confidence |= high_confidence;
        true
    }

    pub fn finish(mut self) -> Aggregate {
        self.attribute_indirect();

        let symbol_file_count = self.symbol_requested.then(|| {
            let contextual = self.impacts.iter().filter(|i| i.is_high_confidence).count();
            if contextual > 0 {
                contextual
            } else {
                self.impacts.iter().filter(|i| i.symbol_matched).count()
            }
        });

        tracing::debug!(
            impacted = self.impacts.len(),
            scanned = self.scanned_files,
            "aggregation finished"
        );

        Aggregate {
            impacts: self.impacts,
            scanned_files: self.scanned_files,
            symbol_file_count,
        }
    }

    /// Single-hop "via" links: first direct file (discovery order) whose text
    /// contains the indirect file's base name.
    fn attribute_indirect(&mut self) {
        if !self.impacts.iter().any(|i| i.usage == Usage::Indirect) {
            return;
        }

        let direct: Vec<(PathBuf, String)> = self
            .impacts
            .iter()
            .filter(|i| i.usage == Usage::Direct)
            .filter_map(|i| read_source(&i.path).map(|content| (i.path.clone(), content)))
            .collect();

        for impact in self.impacts.iter_mut().filter(|i| i.usage == Usage::Indirect) {
            let name = file_name_of(&impact.path);
            impact.via = direct
                .iter()
                .find(|(_, content)| content.contains(&name))
                .map(|(path, _)| path.clone());
        }
    }
}

/// Keeps the first record seen for each line, ordered by line number.
fn dedup_by_line(records: impl IntoIterator<Item = MatchRecord>) -> Vec<MatchRecord> {
    let mut by_line: BTreeMap<usize, MatchRecord> = BTreeMap::new();
    for record in records {
        by_line.entry(record.line_number).or_insert(record);
    }
    by_line.into_values().collect()
}
