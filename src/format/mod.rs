//! Report renderers for ripple

pub mod json;
pub mod markdown;
pub mod plain;

use anyhow::Result;
use std::io::Write;

use crate::config::OutputFormat;
use crate::core::{FileImpact, ImpactReport};
use crate::git::LastChange;
use crate::locale::{Locale, Messages};

pub trait Formatter {
    fn write_header(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()>;

    fn write_usages(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()>;

    fn write_footer(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()>;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Plain => Box::new(plain::PlainFormatter),
        OutputFormat::Markdown => Box::new(markdown::MarkdownFormatter),
        OutputFormat::Json => Box::new(json::JsonFormatter),
    }
}

pub fn write_report(
    output: &mut dyn Write,
    report: &ImpactReport,
    format: OutputFormat,
    locale: Locale,
) -> Result<()> {
    let messages = locale.messages();
    let mut formatter = create_formatter(format);
    formatter.write_header(output, report, messages)?;
    formatter.write_usages(output, report, messages)?;
    formatter.write_footer(output, report, messages)?;
    Ok(())
}

pub fn render(report: &ImpactReport, format: OutputFormat, locale: Locale) -> Result<String> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, report, format, locale)?;
    Ok(String::from_utf8(buffer)?)
}

/// Author and time lines for the "last changed" block.
pub(crate) fn last_change_lines(change: &LastChange, messages: &Messages) -> (String, String) {
    match change {
        LastChange::Commit(commit) => {
            let time = commit
                .timestamp
                .as_ref()
                .map(|ts| messages.format_date(ts))
                .unwrap_or_else(|| messages.invalid_date.to_string());
            (commit.author.clone(), time)
        }
        LastChange::Identity { author } => {
            (format!("{} ({})", author, messages.general_git_info), "-".to_string())
        }
        LastChange::Unavailable { reason } => (messages.history_failure(reason), "-".to_string()),
    }
}

/// Symbol-only hits that could not be tied to the declaring context.
pub(crate) fn confidence_label(impact: &FileImpact, messages: &Messages) -> Option<&'static str> {
    if !impact.symbol_matched {
        return None;
    }
    Some(if impact.is_high_confidence {
        messages.high_confidence
    } else {
        messages.low_confidence
    })
}

/// Found/not-found note for the requested symbol.
pub(crate) fn symbol_note(report: &ImpactReport, messages: &Messages) -> Option<String> {
    let symbol = report.target_symbol.as_deref()?;
    if report.symbol_not_found() {
        Some(messages.symbol_not_found(symbol))
    } else {
        Some(messages.symbol_found(symbol, report.symbol_file_count.unwrap_or(0)))
    }
}
