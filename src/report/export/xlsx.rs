//! Excel report: a data sheet plus a "Summary" sheet.

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use crate::error::Result;
use crate::report::SummaryValue;
use crate::table::CellValue;

use super::ReportJob;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin)
}

/// Numeric text worth storing as a number cell. Identifiers with leading zeros stay text.
fn numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if digits.is_empty() || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.") {
        return None;
    }
    trimmed.parse().ok()
}

/// How a resolved cell is written to the data sheet.
#[derive(Debug, Clone, PartialEq)]
enum SheetCell {
    Blank,
    /// Currency amount, written with the grouped two-decimal number format.
    Amount(f64),
    Number(f64),
    Text(String),
}

impl From<CellValue> for SheetCell {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Empty => SheetCell::Blank,
            CellValue::Number(n) => SheetCell::Amount(n),
            CellValue::Text(text) => match numeric(&text) {
                Some(n) => SheetCell::Number(n),
                None => SheetCell::Text(text),
            },
        }
    }
}

/// Sheet names are capped at 31 characters.
fn sheet_name(title: &str) -> String {
    title.chars().take(31).collect()
}

/// Data column width from its header text.
fn column_width(header: &str) -> f64 {
    (header.chars().count() + 4).max(12) as f64
}

fn build(job: &ReportJob<'_>) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = header_format();
    let amount_format = Format::new().set_num_format("#,##0.00");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(job.title()))?;

    let headers = job.headers();
    for (col, header) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
        worksheet.set_column_width(col, column_width(header))?;
    }

    for (idx, record) in job.rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, cell) in job.cells(record).into_iter().enumerate() {
            let col = col as u16;
            match SheetCell::from(cell) {
                SheetCell::Blank => {}
                SheetCell::Amount(n) => {
                    worksheet.write_number_with_format(row, col, n, &amount_format)?;
                }
                SheetCell::Number(n) => {
                    worksheet.write_number(row, col, n)?;
                }
                SheetCell::Text(text) => {
                    worksheet.write_string(row, col, &text)?;
                }
            }
        }
    }

    if !headers.is_empty() {
        worksheet.autofilter(0, 0, job.rows.len() as u32, (headers.len() - 1) as u16)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    if !job.summary.is_empty() {
        let summary = workbook.add_worksheet();
        summary.set_name("Summary")?;
        summary.write_string_with_format(0, 0, "Metric", &header_format)?;
        summary.write_string_with_format(0, 1, "Value", &header_format)?;
        summary.set_column_width(0, 32)?;
        summary.set_column_width(1, 16)?;

        for (idx, (label, value)) in job.summary.iter().enumerate() {
            let row = (idx + 1) as u32;
            summary.write_string(row, 0, label)?;
            match value {
                SummaryValue::Count(n) => {
                    summary.write_number(row, 1, n as f64)?;
                }
                SummaryValue::Amount(a) => {
                    summary.write_number_with_format(row, 1, a, &amount_format)?;
                }
            }
        }
    }

    Ok(workbook)
}

pub fn render(job: &ReportJob<'_>) -> Result<Vec<u8>> {
    let mut workbook = build(job)?;
    Ok(workbook.save_to_buffer()?)
}
