//! Risk tiers derived from the number of impacted files

use serde::Serialize;

/// Coarse severity bucket for a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Largest impacted-file count still classified as `Medium`.
pub const MEDIUM_MAX_FILES: usize = 3;

impl RiskTier {
    /// 0 files is `Low`, 1..=3 is `Medium`, anything above is `High`.
    pub fn classify(impacted_files: usize) -> Self {
        match impacted_files {
            0 => RiskTier::Low,
            1..=MEDIUM_MAX_FILES => RiskTier::Medium,
            _ => RiskTier::High,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        };
        f.write_str(label)
    }
}
