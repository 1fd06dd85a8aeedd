//! Utility modules for ripple
//!
//! - `analysis/` - line matching, call-site context, aggregation and risk
//! - `process` - bounded external commands
//! - `rippleignore` - project-level exclusion names

pub mod analysis;
pub mod process;
pub mod rippleignore;
