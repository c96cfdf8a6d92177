//! # Spreadsheet Export
//!
//! One worksheet named per report kind, a bold header row, then raw
//! values. Money is a number cell formatted `0.00`.

use rust_xlsxwriter::{Format, Workbook};

use cafe_core::report::Cell;
use cafe_core::Report;

use crate::error::ExportResult;

pub fn render(report: &Report) -> ExportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(report.kind.sheet_name())?;

        for (col, title) in report.headers().iter().enumerate() {
            let col = col as u16;
            sheet.write_string_with_format(0, col, *title, &header)?;
            sheet.set_column_width(col, 16)?;
        }

        for (r, cells) in report.cells().iter().enumerate() {
            let row = r as u32 + 1;
            for (c, cell) in cells.iter().enumerate() {
                let col = c as u16;
                match cell {
                    Cell::Text(text) => {
                        sheet.write_string(row, col, text)?;
                    }
                    Cell::Int(n) => {
                        sheet.write_number(row, col, *n as f64)?;
                    }
                    Cell::Money(m) => {
                        sheet.write_number_with_format(row, col, m.to_major_f64(), &money)?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

// =============================================================================
// Unit Tests
// =============================================================================
