//! Plain text report

use anyhow::Result;
use std::io::Write;

use super::{Formatter, confidence_label, last_change_lines, symbol_note};
use crate::core::{FileImpact, ImpactReport};
use crate::locale::Messages;

pub struct PlainFormatter;

impl PlainFormatter {
    fn write_impact(
        &self,
        output: &mut dyn Write,
        report: &ImpactReport,
        impact: &FileImpact,
        messages: &Messages,
    ) -> Result<()> {
        write!(output, " - {}", report.relative(&impact.path).display())?;
        if let Some(via) = &impact.via {
            write!(output, " {}", messages.via(&crate::core::file_name_of(via)))?;
        }
        if let Some(label) = confidence_label(impact, messages) {
            write!(output, " [{}]", label)?;
        }
        writeln!(output)?;
        for m in &impact.matches {
            writeln!(output, "     L{}: {}", m.line_number, m.line_text)?;
        }
        Ok(())
    }
}

impl Formatter for PlainFormatter {
    fn write_header(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        let (author, time) = last_change_lines(&report.last_change, messages);

        writeln!(output, "{}", messages.impact_title)?;
        writeln!(output)?;
        writeln!(output, "{}: {}", messages.file, report.relative(&report.requested_file).display())?;
        writeln!(output, "{}: {}", messages.last_changed_by, author)?;
        writeln!(output, "{}: {}", messages.last_changed_time, time)?;
        writeln!(output, "{}: {}", messages.scanned_files, report.scanned_files)?;
        if let Some(ctx) = &report.declaring_context {
            writeln!(output, "{}: {}", messages.declaring_context, ctx)?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn write_usages(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        writeln!(output, "=== {} ===", messages.usage_detail)?;
        if report.impacts.is_empty() {
            writeln!(output, "{}", messages.not_found)?;
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
            writeln!(output, "{}:", heading)?;
            for impact in impacts {
                self.write_impact(output, report, impact, messages)?;
            }
            writeln!(output)?;
        }
        Ok(())
    }

    fn write_footer(&mut self, output: &mut dyn Write, report: &ImpactReport, messages: &Messages) -> Result<()> {
        if let Some(note) = symbol_note(report, messages) {
            writeln!(output, "{}: {}", messages.note, note.replace("**", "").replace('`', ""))?;
            writeln!(output)?;
        }
        writeln!(output, "{}", messages.risk_label(report.risk))?;
        writeln!(output, "{}", messages.risk_message(report.risk, report.impacted_count()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures::sample_report;
    use crate::locale::Locale;

    fn render(report: &ImpactReport, locale: Locale) -> String {
        let mut output = Vec::new();
        let messages = locale.messages();
        let mut formatter = PlainFormatter;
        formatter.write_header(&mut output, report, messages).unwrap();
        formatter.write_usages(&mut output, report, messages).unwrap();
        formatter.write_footer(&mut output, report, messages).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_plain_report() {
        let result = render(&sample_report(), Locale::En);

        assert!(result.contains("File: src/core.js"));
        assert!(result.contains("Last changed by: Alice"));
        assert!(result.contains("Time: Friday, May 3, 2024 14:05"));
        assert!(result.contains("Declaring context: Core"));
        assert!(result.contains(" - src/app.js\n     L3: import core from './core.js'"));
        assert!(result.contains(" - lib/plugin.js (via app.js) [low confidence]"));
        assert!(result.contains("Note: Function run() was found in 1 files"));
        assert!(result.contains("⚠️ Risk Level: MEDIUM"));
    }

    #[test]
    fn test_plain_empty_report_indonesian() {
        let mut report = sample_report();
        report.impacts.clear();
        report.symbol_file_count = Some(0);
        report.risk = crate::utils::analysis::risk::RiskTier::classify(0);

        let result = render(&report, Locale::Id);
        assert!(result.contains("Tidak ditemukan pemanggilan"));
        assert!(result.contains("Peringatan"));
        assert!(result.contains("✅ Tingkat Risiko: RENDAH"));
        assert!(!result.contains("Dipakai langsung"));
    }
}
