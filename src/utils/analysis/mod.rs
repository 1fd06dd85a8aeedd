//! Text-level impact analysis
//!
//! Contains line scanning, call-site disambiguation, impact aggregation and risk
//! classification.

pub mod context;
pub mod impact;
pub mod lines;
pub mod risk;

// Re-export commonly used items
pub use context::{CallMatcher, contextual_subset, detect_declaring_context, detect_method_context};
pub use impact::ImpactAggregator;
pub use lines::{scan_file, scan_lines};
pub use risk::RiskTier;
