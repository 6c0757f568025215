//! Fixed-layout PDF: a bold centered title over a bordered table with one
//! row per trial, on a single A4 page.

use std::io::Write;

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use crate::document::TITLE;
use crate::error::ReportError;
use crate::report::Report;

const PAGE_MM: (f32, f32) = (210.0, 297.0);
const MARGIN_MM: f32 = 10.0;
const ROW_MM: f32 = 10.0;
const COLUMNS_MM: [(&str, f32); 3] = [("Index", 30.0), ("TrialLabel", 60.0), ("Outcome", 60.0)];
const TITLE_PT: f32 = 14.0;
const BODY_PT: f32 = 12.0;

const PT_TO_MM: f32 = 0.3528;
// Built-in fonts carry no metrics here; Helvetica averages about half an em.
const AVG_ADVANCE_EM: f32 = 0.5;
const CAP_HEIGHT_EM: f32 = 0.7;

pub fn render_pdf(report: &Report) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(TITLE, Mm(PAGE_MM.0), Mm(PAGE_MM.1), "table");
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut top = PAGE_MM.1 - MARGIN_MM;
    let width = PAGE_MM.0 - 2.0 * MARGIN_MM;
    centered(&layer, TITLE, TITLE_PT, &bold, MARGIN_MM, width, top);
    top -= 2.0 * ROW_MM;

    table_row(&layer, &regular, top, COLUMNS_MM.map(|(name, _)| name.to_string()));
    for row in report.rows() {
        top -= ROW_MM;
        let cells = [
            row.index.to_string(),
            row.label.to_string(),
            row.outcome.to_string(),
        ];
        table_row(&layer, &regular, top, cells);
    }

    doc.save_to_bytes().map_err(pdf_error)
}

pub fn write_pdf<W: Write>(report: &Report, mut writer: W) -> Result<(), ReportError> {
    writer.write_all(&render_pdf(report)?)?;
    writer.flush()?;
    Ok(())
}

fn table_row(layer: &PdfLayerReference, font: &IndirectFontRef, top: f32, cells: [String; 3]) {
    let mut x = MARGIN_MM;
    for ((_, width), cell) in COLUMNS_MM.iter().zip(cells.iter()) {
        border(layer, x, top, *width);
        centered(layer, cell, BODY_PT, font, x, *width, top);
        x += width;
    }
}

fn border(layer: &PdfLayerReference, x: f32, top: f32, width: f32) {
    let bottom = top - ROW_MM;
    let corners = [(x, top), (x + width, top), (x + width, bottom), (x, bottom)];
    layer.add_line(Line {
        points: corners
            .iter()
            .map(|&(px, py)| (Point::new(Mm(px), Mm(py)), false))
            .collect(),
        is_closed: true,
    });
}

/// Places `text` in the middle of the `width` x one-row cell whose top-left
/// corner is `(x, top)`.
fn centered(
    layer: &PdfLayerReference,
    text: &str,
    size_pt: f32,
    font: &IndirectFontRef,
    x: f32,
    width: f32,
    top: f32,
) {
    let em = size_pt * PT_TO_MM;
    let text_width = text.chars().count() as f32 * em * AVG_ADVANCE_EM;
    let left = x + ((width - text_width) / 2.0).max(0.0);
    let baseline = top - ROW_MM + (ROW_MM - em * CAP_HEIGHT_EM) / 2.0;
    layer.use_text(text, size_pt, Mm(left), Mm(baseline), font);
}

fn pdf_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(err.to_string())
}
