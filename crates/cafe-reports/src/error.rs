//! # Export Errors

use thiserror::Error;

use cafe_core::ReportKind;

/// Failures while rendering or writing a report file.
///
/// On every variant the target path is left as it was before the call.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export: no rows, or every amount is zero.
    #[error("No data to export for {kind}")]
    NoData { kind: ReportKind },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV writing failed: {0}")]
    Csv(#[from] csv::Error),

    /// The rendered temp file could not be moved over the target.
    #[error("Could not replace {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<printpdf::Error> for ExportError {
    fn from(err: printpdf::Error) -> Self {
        ExportError::Pdf(err.to_string())
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
