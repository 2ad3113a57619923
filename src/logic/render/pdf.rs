//! printpdf backend: draws laid-out pages into a PDF byte buffer

use printpdf::{
    BuiltinFont, Color as PdfColor, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

use super::document::{PAGE_HEIGHT_IN, PAGE_WIDTH_IN};
use super::layout::{Color, DrawOp, Page};
use super::RenderError;

const LAYER: &str = "content";

fn mm(inches: f64) -> Mm {
    Mm((inches * 25.4) as f32)
}

fn fill(layer: &PdfLayerReference, (r, g, b): Color) {
    layer.set_fill_color(PdfColor::Rgb(Rgb::new(r, g, b, None)));
}

fn backend<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

pub fn write_pdf(title: &str, pages: &[Page]) -> Result<Vec<u8>, RenderError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH_IN), mm(PAGE_HEIGHT_IN), LAYER);
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(backend)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(backend)?;

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(mm(PAGE_WIDTH_IN), mm(PAGE_HEIGHT_IN), LAYER);
            doc.get_page(p).get_layer(l)
        };
        draw_page(&layer, page, &regular, &bold);
    }

    doc.save_to_bytes().map_err(backend)
}

fn draw_page(layer: &PdfLayerReference, page: &Page, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    // Fills first so text is never painted over.
    for op in &page.ops {
        if let DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        } = op
        {
            fill(layer, *color);
            layer.add_rect(Rect::new(mm(*x), mm(*y), mm(x + width), mm(y + height)));
        }
    }
    for op in &page.ops {
        if let DrawOp::Text {
            x,
            y,
            size,
            bold: is_bold,
            color,
            text,
        } = op
        {
            fill(layer, *color);
            let font = if *is_bold { bold } else { regular };
            layer.use_text(text.as_str(), *size, mm(*x), mm(*y), font);
        }
    }
}
