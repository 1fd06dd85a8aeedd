//! Core module for ripple
//!
//! This module contains the data model, the per-file scanner and cancellation.

pub mod scanner;
mod types;

pub use scanner::{FileScan, FileScanner};
pub use types::*;
