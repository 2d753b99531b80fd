//! PDF report: landscape A4 with a brand header, the summary block and a paged table.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rect, Rgb,
};

use crate::error::{AppError, Result};

use super::ReportJob;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 12.0;
const FOOTER_SPACE: f32 = 8.0;
const HEADER_ROW: f32 = 8.0;
const BODY_ROW: f32 = 6.5;
const BODY_FONT: f32 = 8.0;
const HEADER_FONT: f32 = 9.0;
const PT_TO_MM: f32 = 0.3528;
/// Shown for null/missing cells.
const PLACEHOLDER: &str = "-";
const LAYER: &str = "Layer 1";

fn rgb(hex: u32) -> Color {
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
    Color::Rgb(Rgb::new(channel(16), channel(8), channel(0), None))
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::export(format!("PDF error: {e}"))
}

/// Cut text to roughly fit `width` millimetres at `size` points.
fn fit(text: &str, width: f32, size: f32) -> String {
    let char_width = size * 0.5 * PT_TO_MM;
    let max = ((width - 2.0) / char_width).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Top of the next block, in millimetres from the bottom edge.
    y: f32,
    page: usize,
}

impl Canvas {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
            page: 1,
        })
    }

    fn text(&self, text: &str, size: f32, x: f32, baseline: f32, bold: bool, color: u32) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(rgb(color));
        self.layer.use_text(text, size, Mm(x), Mm(baseline), font);
    }

    fn band(&self, x: f32, width: f32, height: f32, color: u32) {
        self.layer.set_fill_color(rgb(color));
        let rect = Rect::new(Mm(x), Mm(self.y - height), Mm(x + width), Mm(self.y)).with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    fn footer(&self) {
        self.text(
            &format!("Page {}", self.page),
            8.0,
            PAGE_WIDTH - MARGIN - 15.0,
            MARGIN / 2.0,
            false,
            0x808080,
        );
    }

    /// Start a new page if `height` does not fit. Returns whether it did.
    fn ensure_space(&mut self, height: f32) -> bool {
        if self.y - height >= MARGIN + FOOTER_SPACE {
            return false;
        }
        self.footer();
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page += 1;
        self.y = PAGE_HEIGHT - MARGIN;
        true
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.footer();
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

fn draw_title(canvas: &mut Canvas, job: &ReportJob<'_>) {
    canvas.text(&job.brand, 16.0, MARGIN, canvas.y - 6.0, true, 0x1F3864);
    canvas.text(job.title(), 12.0, MARGIN, canvas.y - 13.0, true, 0x000000);
    canvas.text(
        &format!("Generated: {}", job.timestamp()),
        9.0,
        MARGIN,
        canvas.y - 19.0,
        false,
        0x595959,
    );
    canvas.y -= 25.0;
}

fn draw_summary(canvas: &mut Canvas, job: &ReportJob<'_>) {
    if job.summary.is_empty() {
        return;
    }

    canvas.text("Summary", 11.0, MARGIN, canvas.y - 5.0, true, 0x000000);
    canvas.y -= 8.0;

    // Two columns of "label: value" lines.
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / 2.0;
    let entries: Vec<_> = job.summary.iter().collect();
    for pair in entries.chunks(2) {
        canvas.ensure_space(5.0);
        for (i, (label, value)) in pair.iter().enumerate() {
            let line = fit(&format!("{label}: {value}"), column_width, 9.0);
            canvas.text(&line, 9.0, MARGIN + i as f32 * column_width, canvas.y - 4.0, false, 0x000000);
        }
        canvas.y -= 5.0;
    }
    canvas.y -= 4.0;
}

fn draw_table_header(canvas: &Canvas, headers: &[&str], column_width: f32) {
    canvas.band(MARGIN, column_width * headers.len() as f32, HEADER_ROW, 0x4472C4);
    for (i, header) in headers.iter().enumerate() {
        let x = MARGIN + i as f32 * column_width + 1.5;
        canvas.text(
            &fit(header, column_width, HEADER_FONT),
            HEADER_FONT,
            x,
            canvas.y - HEADER_ROW + 2.5,
            true,
            0xFFFFFF,
        );
    }
}

/// Lay out the whole report, leaving the last page open for its footer.
fn draw(job: &ReportJob<'_>) -> Result<Canvas> {
    let mut canvas = Canvas::new(&format!("{} - {}", job.brand, job.title()))?;
    let headers = job.headers();
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / headers.len().max(1) as f32;

    draw_title(&mut canvas, job);
    draw_summary(&mut canvas, job);

    canvas.ensure_space(HEADER_ROW + BODY_ROW);
    draw_table_header(&canvas, &headers, column_width);
    canvas.y -= HEADER_ROW;

    for (index, row) in job.rows.iter().enumerate() {
        if canvas.ensure_space(BODY_ROW) {
            draw_table_header(&canvas, &headers, column_width);
            canvas.y -= HEADER_ROW;
        }

        if index % 2 == 1 {
            canvas.band(MARGIN, column_width * headers.len() as f32, BODY_ROW, 0xF2F2F2);
        }
        for (i, cell) in job.cells(row).iter().enumerate() {
            let x = MARGIN + i as f32 * column_width + 1.5;
            let text = fit(&cell.display(PLACEHOLDER), column_width, BODY_FONT);
            canvas.text(&text, BODY_FONT, x, canvas.y - BODY_ROW + 2.0, false, 0x000000);
        }
        canvas.y -= BODY_ROW;
    }

    Ok(canvas)
}

pub fn render(job: &ReportJob<'_>) -> Result<Vec<u8>> {
    draw(job)?.finish()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::report::ReportType;
    use crate::report::export::test_support::{fixed_time, rows};
    use crate::table::Column;

    #[test]
    fn test_fit_truncates_long_text() {
        assert_eq!(fit("Short", 40.0, 8.0), "Short");
        let cut = fit(&"x".repeat(200), 20.0, 8.0);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() < 200);
    }

    #[test]
    fn test_rgb_channels() {
        match rgb(0x4472C4) {
            Color::Rgb(c) => {
                assert!((c.r - 0x44 as f32 / 255.0).abs() < f32::EPSILON);
                assert!((c.b - 0xC4 as f32 / 255.0).abs() < f32::EPSILON);
            }
            _ => panic!("expected rgb"),
        }
    }

    fn payment_job(columns: &[Column], count: usize) -> ReportJob<'_> {
        let data: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "referenceNumber": format!("OR-{i:05}"),
                    "lastName": "Garcia",
                    "firstName": "Lea",
                    "amount": 150,
                    "status": if i % 3 == 0 { "PENDING" } else { "PAID" },
                    "remarks": null
                })
            })
            .collect();
        let data = rows(serde_json::Value::Array(data));
        ReportJob::new(ReportType::Payment, data, columns.iter().collect(), "Brand", fixed_time())
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("referenceNumber", "Reference"),
            Column::new("fullName", "Name"),
            Column::new("amount", "Amount"),
            Column::new("remarks", "Remarks"),
        ]
    }

    #[test]
    fn test_short_report_fits_one_page() {
        let columns = columns();
        let job = payment_job(&columns, 3);
        assert_eq!(draw(&job).unwrap().page, 1);
    }

    #[test]
    fn test_long_report_spans_pages() {
        let columns = columns();
        let job = payment_job(&columns, 120);

        let canvas = draw(&job).unwrap();
        // Roughly 25 body rows fit on a landscape page.
        assert!(canvas.page >= 4, "got {} pages", canvas.page);
        assert!(canvas.y >= MARGIN + FOOTER_SPACE);

        let bytes = canvas.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1024);
    }
}
