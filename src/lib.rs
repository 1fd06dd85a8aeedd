pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod fs;
pub mod git;
pub mod locale;
pub mod runner;
pub mod utils;

// Re-export key items for convenience
pub use config::{OutputFormat, RippleConfig};
pub use core::{CancelToken, ImpactReport, ScanEvent, ScanRequest};
pub use error::{AnalysisError, HistoryError};
pub use locale::Locale;
pub use runner::{analyze, run};
