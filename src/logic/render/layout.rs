//! Page layout: positions document blocks as draw operations
//!
//! Coordinates are inches from the bottom-left corner of a US-letter page.

use super::document::{
    BarChart, Block, ReportDocument, TableBlock, CONTENT_WIDTH_IN, MARGIN_IN, PAGE_HEIGHT_IN,
};

/// RGB in 0.0..=1.0
pub type Color = (f32, f32, f32);

pub const BLACK: Color = (0.0, 0.0, 0.0);
pub const MUTED: Color = (0.35, 0.35, 0.35);
pub const BRAND_BLUE: Color = (0.12, 0.29, 0.53);
pub const BANNER_FILL: Color = (1.0, 0.93, 0.75);
pub const BANNER_TEXT: Color = (0.6, 0.2, 0.0);
pub const HEADER_FILL: Color = (0.85, 0.88, 0.93);
pub const HIGHLIGHT_FILL: Color = (1.0, 0.85, 0.85);
pub const BAR_FILL: Color = (0.25, 0.5, 0.78);

const TOP_IN: f64 = PAGE_HEIGHT_IN - MARGIN_IN;
const BOTTOM_IN: f64 = 0.8;
const FOOTER_Y_IN: f64 = 0.4;

const CHART_HEIGHT_IN: f64 = 1.8;
const ROW_HEIGHT_IN: f64 = 0.2;
const TABLE_FONT_PT: f32 = 7.0;

/// Approximate Helvetica advance per point of font size, in inches.
const GLYPH_IN_PER_PT: f64 = 0.5 / 72.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        y: f64,
        size: f32,
        bold: bool,
        color: Color,
        text: String,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub fn footer_text(page: usize, total: usize) -> String {
    format!("Page {} of {}", page, total)
}

/// Lays the document out and stamps every page with its footer.
pub fn layout(doc: &ReportDocument) -> Vec<Page> {
    let mut cursor = Cursor::new();
    cursor.title(doc);
    for block in &doc.blocks {
        match block {
            Block::Heading(text) => cursor.heading(text),
            Block::Banner(text) => cursor.banner(text),
            Block::KeyValues(pairs) => cursor.key_values(pairs),
            Block::Paragraph(text) => cursor.paragraph(text),
            Block::BarChart(chart) => cursor.bar_chart(chart),
            Block::Table(table) => cursor.table(table),
        }
    }

    let mut pages = cursor.finish();
    let total = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        page.ops.push(DrawOp::Text {
            x: MARGIN_IN,
            y: FOOTER_Y_IN,
            size: 8.0,
            bold: false,
            color: MUTED,
            text: format!("{}  |  {}", doc.title, footer_text(i + 1, total)),
        });
    }
    pages
}

/// Cuts `text` so it fits `width` inches at `size` points.
pub fn fit_text(text: &str, width: f64, size: f32) -> String {
    let max_chars = (width / (size as f64 * GLYPH_IN_PER_PT)).floor().max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(2).max(1);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("..");
    cut
}

// ============================================================================
// CURSOR
// ============================================================================

struct Cursor {
    pages: Vec<Page>,
    current: Page,
    y: f64,
}

impl Cursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: TOP_IN,
        }
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = TOP_IN;
    }

    /// Starts a new page when `height` no longer fits.
    fn reserve(&mut self, height: f64) -> bool {
        if self.y - height < BOTTOM_IN && self.y < TOP_IN {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&mut self, x: f64, y: f64, size: f32, bold: bool, color: Color, text: impl Into<String>) {
        self.current.ops.push(DrawOp::Text {
            x,
            y,
            size,
            bold,
            color,
            text: text.into(),
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Color) {
        self.current.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn title(&mut self, doc: &ReportDocument) {
        self.y -= 0.3;
        self.text(MARGIN_IN, self.y, 18.0, true, BRAND_BLUE, doc.title.clone());
        self.y -= 0.28;
        self.text(MARGIN_IN, self.y, 11.0, false, MUTED, doc.subtitle.clone());
        self.y -= 0.1;
        self.rect(MARGIN_IN, self.y, CONTENT_WIDTH_IN, 0.02, BRAND_BLUE);
        self.y -= 0.2;
    }

    fn heading(&mut self, text: &str) {
        // Keep a heading with at least a line of what follows.
        self.reserve(0.6);
        self.y -= 0.28;
        self.text(MARGIN_IN, self.y, 13.0, true, BRAND_BLUE, text);
        self.y -= 0.12;
    }

    fn banner(&mut self, text: &str) {
        let height = 0.4;
        self.reserve(height + 0.1);
        self.y -= height;
        self.rect(MARGIN_IN, self.y, CONTENT_WIDTH_IN, height, BANNER_FILL);
        let line = fit_text(text, CONTENT_WIDTH_IN - 0.2, 9.0);
        self.text(MARGIN_IN + 0.1, self.y + 0.15, 9.0, true, BANNER_TEXT, line);
        self.y -= 0.1;
    }

    fn key_values(&mut self, pairs: &[(String, String)]) {
        let key_width = 2.4;
        for (key, value) in pairs {
            self.reserve(0.18);
            self.y -= 0.18;
            self.text(MARGIN_IN, self.y, 9.0, true, BLACK, fit_text(key, key_width, 9.0));
            let value = fit_text(value, CONTENT_WIDTH_IN - key_width, 9.0);
            self.text(MARGIN_IN + key_width, self.y, 9.0, false, BLACK, value);
        }
        self.y -= 0.1;
    }

    fn paragraph(&mut self, text: &str) {
        self.reserve(0.2);
        self.y -= 0.2;
        self.text(MARGIN_IN, self.y, 9.0, false, BLACK, fit_text(text, CONTENT_WIDTH_IN, 9.0));
        self.y -= 0.05;
    }

    fn bar_chart(&mut self, chart: &BarChart) {
        let total_height = CHART_HEIGHT_IN + 0.75;
        self.reserve(total_height);

        self.y -= 0.22;
        self.text(MARGIN_IN, self.y, 10.0, true, BLACK, chart.title.clone());
        self.y -= 0.15;

        let top = self.y - 0.12;
        let base = top - CHART_HEIGHT_IN;
        let max = chart.bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let slot = CONTENT_WIDTH_IN / chart.bars.len().max(1) as f64;
        let bar_width = (slot * 0.6).min(0.8);

        self.rect(MARGIN_IN, base, CONTENT_WIDTH_IN, 0.01, MUTED);
        for (i, (label, value)) in chart.bars.iter().enumerate() {
            let x = MARGIN_IN + slot * i as f64 + (slot - bar_width) / 2.0;
            let height = if max > 0.0 {
                value / max * CHART_HEIGHT_IN
            } else {
                0.0
            };
            if height > 0.0 {
                self.rect(x, base, bar_width, height, BAR_FILL);
            }
            self.text(x, base + height + 0.04, 7.0, false, BLACK, format_value(*value));
            self.text(x, base - 0.14, 7.0, false, MUTED, fit_text(label, slot, 7.0));
        }
        self.y = base - 0.3;
    }

    fn table(&mut self, table: &TableBlock) {
        self.reserve(ROW_HEIGHT_IN * 2.0);
        self.table_header(table);

        for (i, row) in table.rows.iter().enumerate() {
            if self.reserve(ROW_HEIGHT_IN) {
                self.table_header(table);
            }
            self.y -= ROW_HEIGHT_IN;
            if table.highlighted.get(i).copied().unwrap_or(false) {
                let width: f64 = table.widths.iter().sum();
                self.rect(MARGIN_IN, self.y - 0.05, width, ROW_HEIGHT_IN, HIGHLIGHT_FILL);
            }
            let mut x = MARGIN_IN;
            for (col, width) in table.widths.iter().enumerate() {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                let cell = fit_text(cell, width - 0.04, TABLE_FONT_PT);
                self.text(x + 0.02, self.y, TABLE_FONT_PT, false, BLACK, cell);
                x += width;
            }
        }
        self.y -= 0.1;
    }

    fn table_header(&mut self, table: &TableBlock) {
        self.y -= ROW_HEIGHT_IN;
        let width: f64 = table.widths.iter().sum();
        self.rect(MARGIN_IN, self.y - 0.05, width, ROW_HEIGHT_IN, HEADER_FILL);
        let mut x = MARGIN_IN;
        for (name, width) in table.header.iter().zip(&table.widths) {
            let name = fit_text(name, width - 0.04, TABLE_FONT_PT);
            self.text(x + 0.02, self.y, TABLE_FONT_PT, true, BLACK, name);
            x += width;
        }
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
