//! Localized report strings
//!
//! Two message tables (English and Indonesian) keyed by fixed fields. Parameterized
//! messages are methods on [`Messages`].

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, HistoryError};
use crate::utils::analysis::risk::RiskTier;

/// Report times are shown in Western Indonesia Time (UTC+7).
const REPORT_UTC_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::Id => &ID,
        }
    }
}

pub struct Messages {
    pub locale: Locale,
    pub impact_title: &'static str,
    pub file: &'static str,
    pub last_changed_by: &'static str,
    pub last_changed_time: &'static str,
    pub scanned_files: &'static str,
    pub declaring_context: &'static str,
    pub usage_detail: &'static str,
    pub direct_usage: &'static str,
    pub indirect_usage: &'static str,
    pub not_found: &'static str,
    pub note: &'static str,
    pub low_confidence: &'static str,
    pub high_confidence: &'static str,
    pub risk_level_low: &'static str,
    pub risk_level_medium: &'static str,
    pub risk_level_high: &'static str,
    pub risk_low_message: &'static str,
    pub not_a_git_repo: &'static str,
    pub no_commit: &'static str,
    pub git_not_installed: &'static str,
    pub timeout: &'static str,
    pub cancelled: &'static str,
    pub unknown_git_error: &'static str,
    pub general_git_info: &'static str,
    pub invalid_date: &'static str,
    pub target_not_found: &'static str,
    pub root_not_found: &'static str,
    pub empty_symbol: &'static str,
    pub analysis_failed: &'static str,
    pub analysis_cancelled: &'static str,
    pub analysis_in_progress: &'static str,
    pub scanning_files: &'static str,
    pub analysis_done: &'static str,
    weekdays: [&'static str; 7],
    months: [&'static str; 12],
}

pub static EN: Messages = Messages {
    locale: Locale::En,
    impact_title: "📦 Impact Estimation",
    file: "File",
    last_changed_by: "Last changed by",
    last_changed_time: "Time",
    scanned_files: "Scanned files",
    declaring_context: "Declaring context",
    usage_detail: "Usage Details",
    direct_usage: "🔁 Used directly by",
    indirect_usage: "📎 Indirectly connected",
    not_found: "No usage found",
    note: "Note",
    low_confidence: "low confidence",
    high_confidence: "high confidence",
    risk_level_low: "✅ Risk Level: LOW",
    risk_level_medium: "⚠️ Risk Level: MEDIUM",
    risk_level_high: "🚨 Risk Level: HIGH",
    risk_low_message: "This file appears safe to change as no dependencies were detected.",
    not_a_git_repo: "Not a Git repository",
    no_commit: "No commits yet for this file",
    git_not_installed: "Git is not installed",
    timeout: "Git command timed out",
    cancelled: "Git command cancelled",
    unknown_git_error: "Unknown Git error",
    general_git_info: "general Git info",
    invalid_date: "Invalid date format",
    target_not_found: "Target file not found",
    root_not_found: "Project root not found",
    empty_symbol: "Function name must not be empty",
    analysis_failed: "Failed to run analysis",
    analysis_cancelled: "Analysis cancelled",
    analysis_in_progress: "Analyzing impact...",
    scanning_files: "Scanning files...",
    analysis_done: "Analysis complete!",
    weekdays: [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ],
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
};

pub static ID: Messages = Messages {
    locale: Locale::Id,
    impact_title: "📦 Estimasi Dampak",
    file: "File",
    last_changed_by: "Terakhir diubah oleh",
    last_changed_time: "Waktu",
    scanned_files: "File yang dipindai",
    declaring_context: "Konteks deklarasi",
    usage_detail: "Detail Penggunaan",
    direct_usage: "🔁 Dipakai langsung oleh",
    indirect_usage: "📎 Terhubung tidak langsung",
    not_found: "Tidak ditemukan pemanggilan",
    note: "Catatan",
    low_confidence: "keyakinan rendah",
    high_confidence: "keyakinan tinggi",
    risk_level_low: "✅ Tingkat Risiko: RENDAH",
    risk_level_medium: "⚠️ Tingkat Risiko: SEDANG",
    risk_level_high: "🚨 Tingkat Risiko: TINGGI",
    risk_low_message: "File ini sepertinya aman untuk diubah karena tidak ada dependensi yang terdeteksi.",
    not_a_git_repo: "Bukan repository Git",
    no_commit: "Belum ada commit untuk file ini",
    git_not_installed: "Git tidak terpasang",
    timeout: "Perintah Git melebihi batas waktu",
    cancelled: "Perintah Git dibatalkan",
    unknown_git_error: "Error Git tidak dikenal",
    general_git_info: "info Git umum",
    invalid_date: "Format tanggal tidak valid",
    target_not_found: "File target tidak ditemukan",
    root_not_found: "Folder proyek tidak ditemukan",
    empty_symbol: "Nama fungsi tidak boleh kosong",
    analysis_failed: "Gagal menjalankan analisis",
    analysis_cancelled: "Analisis dibatalkan",
    analysis_in_progress: "Menganalisis dampak perubahan...",
    scanning_files: "Memindai file...",
    analysis_done: "Analisis selesai!",
    weekdays: ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"],
    months: [
        "Januari",
        "Februari",
        "Maret",
        "April",
        "Mei",
        "Juni",
        "Juli",
        "Agustus",
        "September",
        "Oktober",
        "November",
        "Desember",
    ],
};

impl Messages {
    pub fn risk_label(&self, tier: RiskTier) -> &'static str {
        match tier {
            RiskTier::Low => self.risk_level_low,
            RiskTier::Medium => self.risk_level_medium,
            RiskTier::High => self.risk_level_high,
        }
    }

    pub fn risk_message(&self, tier: RiskTier, count: usize) -> String {
        match (self.locale, tier) {
            (_, RiskTier::Low) => self.risk_low_message.to_string(),
            (Locale::En, RiskTier::Medium) => {
                format!("{} files are affected. Be sure to test your changes carefully.", count)
            }
            (Locale::En, RiskTier::High) => {
                format!("{} files are affected. Extensive testing recommended!", count)
            }
            (Locale::Id, RiskTier::Medium) => format!(
                "Ada {} file yang terpengaruh. Pastikan untuk menguji perubahan dengan baik.",
                count
            ),
            (Locale::Id, RiskTier::High) => {
                format!("Ada {} file yang terpengaruh. Lakukan testing menyeluruh!", count)
            }
        }
    }

    pub fn symbol_found(&self, symbol: &str, count: usize) -> String {
        match self.locale {
            Locale::En => format!("Function `{}()` was found in **{}** files", symbol, count),
            Locale::Id => format!("Fungsi `{}()` ditemukan di **{}** file", symbol, count),
        }
    }

    pub fn symbol_not_found(&self, symbol: &str) -> String {
        match self.locale {
            Locale::En => format!(
                "⚠️ **Warning:** Function `{}` was not found. Possible reasons:\n\
                 - The function name is not exactly the same\n\
                 - The function is used only internally\n\
                 - The function is not used in this project",
                symbol
            ),
            Locale::Id => format!(
                "⚠️ **Peringatan:** Fungsi `{}` tidak ditemukan. Kemungkinan:\n\
                 - Nama fungsi tidak persis sama\n\
                 - Fungsi hanya digunakan secara internal\n\
                 - Fungsi belum dipakai di proyek ini",
                symbol
            ),
        }
    }

    /// Progress line shown once the report is ready.
    pub fn analysis_complete(&self, impacted: usize) -> String {
        match self.locale {
            Locale::En => format!("{} {} impacted files", self.analysis_done, impacted),
            Locale::Id => format!("{} {} file terdampak", self.analysis_done, impacted),
        }
    }

    pub fn via(&self, file_name: &str) -> String {
        format!("(via {})", file_name)
    }

    pub fn history_failure(&self, err: &HistoryError) -> String {
        match err {
            HistoryError::NotARepository => self.not_a_git_repo.to_string(),
            HistoryError::NoCommits => self.no_commit.to_string(),
            HistoryError::ToolNotInstalled => self.git_not_installed.to_string(),
            HistoryError::Timeout(_) => self.timeout.to_string(),
            HistoryError::Cancelled => self.cancelled.to_string(),
            HistoryError::Unknown(msg) => format!("{}: {}", self.unknown_git_error, msg),
        }
    }

    /// One-line message for a terminal analysis error.
    pub fn describe_error(&self, err: &AnalysisError) -> String {
        match err {
            AnalysisError::TargetNotFound(p) | AnalysisError::TargetNotAFile(p) => {
                format!("{}: {}", self.target_not_found, p.display())
            }
            AnalysisError::RootNotFound(p) | AnalysisError::RootNotADirectory(p) => {
                format!("{}: {}", self.root_not_found, p.display())
            }
            AnalysisError::EmptySymbol => self.empty_symbol.to_string(),
            AnalysisError::Cancelled => self.analysis_cancelled.to_string(),
            other => format!("{}: {}", self.analysis_failed, other),
        }
    }

    /// Long-form date in UTC+7, e.g. "Friday, May 3, 2024 14:05" / "Jumat, 3 Mei 2024 14:05".
    pub fn format_date(&self, date: &DateTime<FixedOffset>) -> String {
        use chrono::Datelike;

        let date = FixedOffset::east_opt(REPORT_UTC_OFFSET_SECS)
            .map(|offset| date.with_timezone(&offset))
            .unwrap_or(*date);
        let weekday = self.weekdays[date.weekday().num_days_from_monday() as usize];
        let month = self.months[date.month0() as usize];
        let time = date.format("%H:%M");
        match self.locale {
            Locale::En => format!("{}, {} {}, {} {}", weekday, month, date.day(), date.year(), time),
            Locale::Id => format!("{}, {} {} {} {}", weekday, date.day(), month, date.year(), time),
        }
    }
}
