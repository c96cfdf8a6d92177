//! # PDF Export
//!
//! A4 portrait, builtin Helvetica. The builtin fonts only carry the
//! WinAnsi character set, so any other character is drawn as `?`.
//!
//! Layout per page:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ DAILY SALES REPORT                       │  title (first page)
//! │ Nexus Coffee                             │  business name, if set
//! │ Generated: 19/10/2026 14:05:09           │
//! │ ┌────┬────────────┬──────────┬────────┐  │
//! │ │ ID │ Date       │ Customer │ Total  │  │  header row, repeated
//! │ ├────┼────────────┼──────────┼────────┤  │  on every page
//! │ │ 1  │ 2026-10-19 │ Ana      │ 19.00  │  │
//! │ └────┴────────────┴──────────┴────────┘  │
//! │ TOTAL SALES: S/ 19.00                    │  summary (last page)
//! └──────────────────────────────────────────┘
//! ```

use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point,
};

use cafe_core::Report;

use crate::error::ExportResult;
use crate::ExportOptions;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 7.0;
const TABLE_FONT_SIZE: f32 = 9.0;
/// Rough Helvetica advance at 9pt, used to clip long cells.
const CHAR_WIDTH_MM: f32 = 1.75;

/// The 0x80-0x9F block of WinAnsi (Windows-1252), which differs from Latin-1.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Writes pages into one document, opening a new page when the cursor
/// reaches the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    fonts: &'a Fonts,
    layer: PdfLayerReference,
    cursor: f32,
    pages: usize,
}

impl<'a> PageWriter<'a> {
    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold {
            &self.fonts.bold
        } else {
            &self.fonts.regular
        };
        self.layer.use_text(win_ansi(text), size, Mm(x), Mm(self.cursor), font);
    }

    fn hline(&self, y: f32) {
        self.segment((MARGIN, y), (PAGE_WIDTH - MARGIN, y));
    }

    fn segment(&self, from: (f32, f32), to: (f32, f32)) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(from.0), Mm(from.1)), false),
                (Point::new(Mm(to.0), Mm(to.1)), false),
            ],
            is_closed: false,
        });
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.pages += 1;
    }

    fn has_room(&self, height: f32) -> bool {
        self.cursor - height >= MARGIN
    }

    /// One gridded row: top border, cell text, column separators.
    fn table_row(&mut self, cells: &[String], columns: &[f32], bold: bool) {
        let top = self.cursor;
        let bottom = top - ROW_HEIGHT;
        self.hline(top);

        let mut x = MARGIN;
        self.cursor = bottom + 2.2;
        for (cell, width) in cells.iter().zip(columns) {
            self.text(&clip(cell, *width), TABLE_FONT_SIZE, x + 1.5, bold);
            self.segment((x, top), (x, bottom));
            x += width;
        }
        self.segment((x, top), (x, bottom));
        self.cursor = bottom;
    }
}

/// Replaces characters the builtin fonts cannot draw with `?`.
fn win_ansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            c if WIN_ANSI_EXTRAS.contains(c) => c,
            _ => '?',
        })
        .collect()
}

/// Truncates `text` to what fits in a column `width` mm wide.
fn clip(text: &str, width: f32) -> String {
    let max = ((width - 3.0) / CHAR_WIDTH_MM).max(1.0) as usize;
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max.saturating_sub(3)).collect();
        clipped.push_str("...");
        clipped
    }
}

/// Column widths proportional to the longest content, filling the page.
fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<f32> {
    let mut longest: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(len) = longest.get_mut(i) {
                *len = (*len).max(cell.chars().count()).min(40);
            }
        }
    }

    let available = PAGE_WIDTH - 2.0 * MARGIN;
    let total: usize = longest.iter().map(|l| l + 2).sum();
    longest
        .iter()
        .map(|l| available * (*l + 2) as f32 / total.max(1) as f32)
        .collect()
}

pub fn render(report: &Report, options: &ExportOptions) -> ExportResult<Vec<u8>> {
    let title = report.kind.title();
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    let headers: Vec<String> = report.headers().iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = report
        .cells()
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let columns = column_widths(report.headers(), &rows);

    let mut writer = PageWriter {
        doc: &doc,
        fonts: &fonts,
        layer: doc.get_page(page).get_layer(layer),
        cursor: PAGE_HEIGHT - MARGIN - 5.0,
        pages: 1,
    };

    writer.text(title, 16.0, MARGIN, true);
    if let Some(business) = options.business_name.as_deref().filter(|b| !b.is_empty()) {
        writer.cursor -= 7.0;
        writer.text(business, 11.0, MARGIN, false);
    }
    writer.cursor -= 6.0;
    writer.text(
        &format!("Generated: {}", options.generated_at.format("%d/%m/%Y %H:%M:%S")),
        9.0,
        MARGIN,
        false,
    );
    writer.cursor -= 6.0;

    writer.table_row(&headers, &columns, true);
    for row in &rows {
        if !writer.has_room(ROW_HEIGHT) {
            writer.hline(writer.cursor);
            writer.new_page();
            writer.table_row(&headers, &columns, true);
        }
        writer.table_row(row, &columns, false);
    }
    writer.hline(writer.cursor);

    let summary = report.summary().lines(&options.currency_symbol);
    if !writer.has_room(10.0 + 7.0 * summary.len() as f32) {
        writer.new_page();
    }
    writer.cursor -= 10.0;
    for line in &summary {
        writer.text(line, 12.0, MARGIN, true);
        writer.cursor -= 7.0;
    }

    let pages = writer.pages;
    tracing::debug!(pages, rows = rows.len(), "PDF rendered");

    Ok(doc.save_to_bytes()?)
}

// =============================================================================
// Unit Tests
// =============================================================================
