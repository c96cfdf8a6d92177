//! # cafe-reports: Report Export
//!
//! Writes a [`cafe_core::Report`] as PDF, spreadsheet or semicolon CSV.
//!
//! ## Pipeline Position
//! ```text
//! raw rows (JSON) ──► cafe_core::normalize ──┐
//!                                            ├──► Report ──► serialize ──► file
//! typed rows (cafe-db) ──► From<row> ────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use cafe_reports::{serialize, ExportFormat, ExportOptions};
//!
//! let path = serialize(&report, ExportFormat::Pdf, Path::new("daily.pdf"), &ExportOptions::default())?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Local};

use cafe_core::ReportKind;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod delimited;
pub mod error;
pub mod pdf;
pub mod spreadsheet;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ExportError, ExportResult};
pub use writer::{render, serialize};

// =============================================================================
// Format & Options
// =============================================================================

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Xlsx, ExportFormat::Csv];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(format!("unknown format '{}' (pdf, xlsx, csv)", other)),
        }
    }
}

/// Presentation details that are not part of the report rows.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Prefix for amounts in the PDF summary.
    pub currency_symbol: String,
    /// Printed under the PDF title when set.
    pub business_name: Option<String>,
    pub generated_at: DateTime<Local>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            currency_symbol: "S/".to_string(),
            business_name: None,
            generated_at: Local::now(),
        }
    }
}

/// `<dir>/<kind>_<YYYYmmdd_HHMMSS>.<ext>`, e.g. `daily_sales_20261019_140509.pdf`.
pub fn default_path(
    dir: &Path,
    kind: ReportKind,
    format: ExportFormat,
    at: DateTime<Local>,
) -> PathBuf {
    dir.join(format!(
        "{}_{}.{}",
        kind.file_stem(),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PDF".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert_eq!("excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert!("docx".parse::<ExportFormat>().is_err());
        assert_eq!(
            ExportFormat::from_path(Path::new("out/report.CSV")),
            Some(ExportFormat::Csv)
        );
        assert_eq!(ExportFormat::from_path(Path::new("report")), None);
    }

    #[test]
    fn test_default_path() {
        let at = Local.with_ymd_and_hms(2026, 10, 19, 14, 5, 9).unwrap();
        let path = default_path(Path::new("out"), ReportKind::DailySales, ExportFormat::Pdf, at);
        assert_eq!(path, Path::new("out/daily_sales_20261019_140509.pdf"));
    }
}
