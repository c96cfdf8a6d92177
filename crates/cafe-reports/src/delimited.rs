//! # CSV Export
//!
//! Semicolon-delimited, UTF-8 with a byte order mark so spreadsheet
//! programs in comma-decimal locales open it with the right encoding.
//! Money cells are written as plain `12.34`.

use cafe_core::Report;

use crate::error::ExportResult;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Renders the header row and one record per report row.
pub fn render(report: &Report) -> ExportResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(report.headers())?;
    for row in report.cells() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(bytes)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::ReportKind;
    use serde_json::json;

    #[test]
    fn test_bom_delimiter_and_rows() {
        let report = Report::from_raw(
            ReportKind::TopProducts,
            &[json!(["Latte; large", 3, 10.5]), json!(["Tea", 1, "S/ 4,00"])],
        );

        let bytes = render(&report).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Product;Quantity Sold;Total Revenue");
        assert_eq!(lines[1], "\"Latte; large\";3;10.50");
        assert_eq!(lines[2], "Tea;1;4.00");
        assert_eq!(lines.len(), 3);
    }
}
