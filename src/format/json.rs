//! JSON report
//!
//! The serialized [`ImpactReport`] plus a `summary` object carrying the localized
//! strings the text renderers show.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use super::{Formatter, last_change_lines, symbol_note};
use crate::core::ImpactReport;
use crate::locale::Messages;

pub struct JsonFormatter;

#[derive(Serialize)]
struct Summary {
    last_changed_by: String,
    last_changed_time: String,
    risk_label: &'static str,
    risk_message: String,
    note: Option<String>,
}

#[derive(Serialize)]
struct Document<'a> {
    #[serde(flatten)]
    report: &'a ImpactReport,
    impacted_count: usize,
    summary: Summary,
}

impl Formatter for JsonFormatter {
    fn write_header(&mut self, _output: &mut dyn Write, _report: &ImpactReport, _messages: &Messages) -> Result<()> {
        Ok(())
    }

    fn write_usages(&mut self, _output: &mut dyn Write, _report: &ImpactReport, _messages: &Messages) -> Result<()> {
        Ok(())
    }

    // Single document, written once everything is known
    fn write_footer(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        let (last_changed_by, last_changed_time) = last_change_lines(&report.last_change, messages);
        let document = Document {
            report,
            impacted_count: report.impacted_count(),
            summary: Summary {
                last_changed_by,
                last_changed_time,
                risk_label: messages.risk_label(report.risk),
                risk_message: messages.risk_message(report.risk, report.impacted_count()),
                note: symbol_note(report, messages),
            },
        };
        serde_json::to_writer_pretty(&mut *output, &document)?;
        writeln!(output)?;
        Ok(())
    }
}
