//! # Atomic Report Writer
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  serialize(report, format, path, options)                              │
//! │                                                                         │
//! │  has_data()? ── no ──► ExportError::NoData   (nothing touched)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  render bytes in memory (pdf / spreadsheet / delimited)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  NamedTempFile in the target's directory ── write + flush              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  persist (rename) over the target                                      │
//! │                                                                         │
//! │  Any error before the rename drops the temp file, so the target is     │
//! │  either the old file or the complete new one.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use cafe_core::Report;

use crate::error::{ExportError, ExportResult};
use crate::{delimited, pdf, spreadsheet, ExportFormat, ExportOptions};

/// Renders `report` without touching the filesystem.
pub fn render(
    report: &Report,
    format: ExportFormat,
    options: &ExportOptions,
) -> ExportResult<Vec<u8>> {
    if !report.has_data() {
        return Err(ExportError::NoData { kind: report.kind });
    }

    match format {
        ExportFormat::Pdf => pdf::render(report, options),
        ExportFormat::Xlsx => spreadsheet::render(report),
        ExportFormat::Csv => delimited::render(report),
    }
}

/// Renders `report` and atomically writes it to `path`.
///
/// ## Returns
/// The path written.
pub fn serialize(
    report: &Report,
    format: ExportFormat,
    path: &Path,
    options: &ExportOptions,
) -> ExportResult<PathBuf> {
    debug!(
        kind = %report.kind,
        format = %format,
        rows = report.rows.len(),
        path = %path.display(),
        "Exporting report"
    );

    let bytes = render(report, format, options).inspect_err(|e| {
        warn!(kind = %report.kind, error = %e, "Report not exported");
    })?;

    write_atomic(path, &bytes)?;

    info!(
        kind = %report.kind,
        format = %format,
        bytes = bytes.len(),
        path = %path.display(),
        "Report exported"
    );
    Ok(path.to_path_buf())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| ExportError::Persist {
        path: path.display().to_string(),
        source: e.error,
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::ReportKind;
    use serde_json::json;

    fn sales_report() -> Report {
        Report::from_raw(
            ReportKind::DailySales,
            &[
                json!([1, "Ana", 19.0, "2026-10-19 09:15:00"]),
                json!({"id": 2, "customer_name": "Luis", "total": "S/ 7,50", "date": "2026-10-19 10:00:00"}),
            ],
        )
    }

    #[test]
    fn test_every_format_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = sales_report();

        for format in ExportFormat::ALL {
            let path = dir.path().join(format!("sales.{}", format.extension()));
            serialize(&report, format, &path, &ExportOptions::default()).unwrap();

            let bytes = std::fs::read(&path).unwrap();
            match format {
                ExportFormat::Pdf => assert!(bytes.starts_with(b"%PDF")),
                ExportFormat::Xlsx => assert!(bytes.starts_with(b"PK")),
                ExportFormat::Csv => {
                    let text = String::from_utf8(bytes).unwrap();
                    assert!(text.starts_with('\u{feff}'));
                    assert!(text.contains("2;2026-10-19 10:00:00;Luis;7.50;Completed"));
                }
            }
        }

        // Only the three targets, no stray temp files
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_no_data_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        let empty = Report::from_raw(ReportKind::TopProducts, &[]);
        assert!(matches!(
            serialize(&empty, ExportFormat::Csv, &path, &ExportOptions::default()),
            Err(ExportError::NoData { .. })
        ));

        let zero = Report::from_raw(ReportKind::TopProducts, &[json!(["Tea", 0, 0])]);
        assert!(matches!(
            serialize(&zero, ExportFormat::Pdf, &path, &ExportOptions::default()),
            Err(ExportError::NoData { .. })
        ));

        assert!(!path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "previous").unwrap();

        let empty = Report::from_raw(ReportKind::Inventory, &[]);
        assert!(serialize(&empty, ExportFormat::Csv, &path, &ExportOptions::default()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");

        let missing_dir = dir.path().join("nope").join("report.csv");
        assert!(matches!(
            serialize(&sales_report(), ExportFormat::Csv, &missing_dir, &ExportOptions::default()),
            Err(ExportError::Io(_))
        ));
    }
}
