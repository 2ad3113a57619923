//! Structured report document built from a parsed artifact
//!
//! Everything here is independent of the PDF backend: the document is a
//! list of blocks that `layout` positions on pages.

use crate::logic::reports::aggregate::PREDICTED_RISK_COLUMN;
use crate::logic::reports::ReportArtifact;

pub const BRAND: &str = "Outbreak Risk Surveillance";

/// Inches of column width per character of the longest cell.
pub const CHAR_WIDTH_IN: f64 = 0.09;
pub const MIN_COLUMN_IN: f64 = 0.5;
pub const MAX_COLUMN_IN: f64 = 1.2;

pub const PAGE_WIDTH_IN: f64 = 8.5;
pub const PAGE_HEIGHT_IN: f64 = 11.0;
pub const MARGIN_IN: f64 = 0.5;
pub const CONTENT_WIDTH_IN: f64 = PAGE_WIDTH_IN - 2.0 * MARGIN_IN;

pub const ZERO_ACTIVITY_WARNING: &str =
    "No cases and no outbreaks were recorded in this report. Check that data was collected for this period.";

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub subtitle: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Banner(String),
    KeyValues(Vec<(String, String)>),
    Paragraph(String),
    BarChart(BarChart),
    Table(TableBlock),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Column widths in inches, already fitted to the content width.
    pub widths: Vec<f64>,
    /// Rows whose outbreak cell is set.
    pub highlighted: Vec<bool>,
}

impl ReportDocument {
    #[cfg(test)]
    pub fn charts(&self) -> impl Iterator<Item = &BarChart> {
        self.blocks.iter().filter_map(|b| match b {
            Block::BarChart(chart) => Some(chart),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn has_banner(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, Block::Banner(_)))
    }

    pub fn table(&self) -> Option<&TableBlock> {
        self.blocks.iter().find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

// ============================================================================
// COERCION
// ============================================================================

/// Chart value of a cell: booleans as 0/1, anything unparseable as 0.
///
/// Only used for plotting; stored cells are never rewritten.
pub fn chart_number(cell: &str) -> f64 {
    let cell = cell.trim();
    match cell.to_lowercase().as_str() {
        "true" | "yes" => return 1.0,
        "false" | "no" => return 0.0,
        _ => {}
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

// ============================================================================
// COLUMN SIZING
// ============================================================================

/// Width per column proportional to its longest cell, clamped to
/// `[MIN_COLUMN_IN, MAX_COLUMN_IN]`, then scaled down together when the
/// table is wider than `content_width`.
pub fn column_widths(header: &[String], rows: &[Vec<String>], content_width: f64) -> Vec<f64> {
    let widths: Vec<f64> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0);
            (longest as f64 * CHAR_WIDTH_IN).clamp(MIN_COLUMN_IN, MAX_COLUMN_IN)
        })
        .collect();

    let total: f64 = widths.iter().sum();
    if total > content_width && total > 0.0 {
        let scale = content_width / total;
        widths.into_iter().map(|w| w * scale).collect()
    } else {
        widths
    }
}

// ============================================================================
// DOCUMENT BUILDING
// ============================================================================

/// Filenames naming a special assessment get a prediction analysis section.
pub fn is_assessment(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    lower.contains("special") || lower.contains("assessment")
}

pub fn build(artifact: &ReportArtifact) -> ReportDocument {
    let table = &artifact.table;
    let mut blocks = Vec::new();

    let total_cases = summary_total(artifact, "total_cases", "cases");
    let total_outbreaks = summary_total(artifact, "total_outbreaks", "outbreak");
    if total_cases == 0.0 && total_outbreaks == 0.0 {
        blocks.push(Block::Banner(ZERO_ACTIVITY_WARNING.to_string()));
    }

    blocks.push(Block::Heading("Summary".to_string()));
    let mut summary: Vec<(String, String)> = artifact
        .metadata
        .iter()
        .map(|(k, v)| (humanize(k), v.clone()))
        .collect();
    if artifact.metadata_value("total_cases").is_none() {
        summary.push(("Total Cases".to_string(), format_count(total_cases)));
    }
    if artifact.metadata_value("total_outbreaks").is_none() {
        summary.push(("Total Outbreaks".to_string(), format_count(total_outbreaks)));
    }
    summary.push(("Rows".to_string(), table.rows.len().to_string()));
    blocks.push(Block::KeyValues(summary));

    let cases_by_disease = sum_by(artifact, "disease", "cases");
    if cases_by_disease.iter().any(|(_, v)| *v > 0.0) {
        blocks.push(Block::BarChart(BarChart {
            title: "Cases by Disease".to_string(),
            bars: cases_by_disease,
        }));
    }

    let outbreaks_by_region = sum_by(artifact, "county", "outbreak");
    if outbreaks_by_region.iter().any(|(_, v)| *v > 0.0) {
        blocks.push(Block::BarChart(BarChart {
            title: "Outbreaks by Region".to_string(),
            bars: outbreaks_by_region,
        }));
    }

    if is_assessment(&artifact.filename) {
        blocks.extend(prediction_analysis(artifact));
    }

    blocks.push(Block::Heading("Data".to_string()));
    let outbreak_idx = table.column("outbreak");
    blocks.push(Block::Table(TableBlock {
        header: table.header.clone(),
        rows: table.rows.clone(),
        widths: column_widths(&table.header, &table.rows, CONTENT_WIDTH_IN),
        highlighted: table
            .rows
            .iter()
            .map(|row| {
                outbreak_idx
                    .and_then(|i| row.get(i))
                    .map(|cell| chart_number(cell) > 0.0)
                    .unwrap_or(false)
            })
            .collect(),
    }));

    ReportDocument {
        title: BRAND.to_string(),
        subtitle: subtitle(artifact),
        blocks,
    }
}

fn subtitle(artifact: &ReportArtifact) -> String {
    match (artifact.metadata_value("report_type"), artifact.metadata_value("period")) {
        (Some(kind), Some(period)) => format!("{} report: {}", capitalize(kind), period),
        _ => artifact.filename.clone(),
    }
}

/// Totals from metadata when present, otherwise recomputed from the table.
fn summary_total(artifact: &ReportArtifact, key: &str, column: &str) -> f64 {
    match artifact.metadata_value(key) {
        Some(v) => chart_number(v),
        None => artifact
            .table
            .column_values(column)
            .map(|values| values.map(chart_number).sum::<f64>())
            .unwrap_or(0.0),
    }
}

/// Sums of `value_col` per distinct `key_col`, first-seen order.
fn sum_by(artifact: &ReportArtifact, key_col: &str, value_col: &str) -> Vec<(String, f64)> {
    let table = &artifact.table;
    let (Some(k), Some(v)) = (table.column(key_col), table.column(value_col)) else {
        return Vec::new();
    };

    let mut out: Vec<(String, f64)> = Vec::new();
    for row in &table.rows {
        let key = row.get(k).map(|s| s.trim()).unwrap_or("");
        let value = row.get(v).map(|s| chart_number(s)).unwrap_or(0.0);
        match out.iter_mut().find(|(name, _)| name == key) {
            Some((_, total)) => *total += value,
            None => out.push((key.to_string(), value)),
        }
    }
    out
}

fn prediction_analysis(artifact: &ReportArtifact) -> Vec<Block> {
    let table = &artifact.table;
    let mut blocks = vec![Block::Heading("Prediction Analysis".to_string())];

    let Some(risk_idx) = table.column(PREDICTED_RISK_COLUMN) else {
        blocks.push(Block::Paragraph(
            "This report carries no model predictions.".to_string(),
        ));
        return blocks;
    };
    let outbreak_idx = table.column("outbreak");
    let disease_idx = table.column("disease");

    let mut scored = 0usize;
    let mut at_risk = 0usize;
    let mut agree = 0usize;
    let mut at_risk_by_disease: Vec<(String, f64)> = Vec::new();

    for row in &table.rows {
        let Some(cell) = row.get(risk_idx).filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        scored += 1;
        let predicted = chart_number(cell) >= 0.5;
        if predicted {
            at_risk += 1;
            let disease = disease_idx.and_then(|i| row.get(i)).map(|s| s.as_str()).unwrap_or("");
            match at_risk_by_disease.iter_mut().find(|(d, _)| d == disease) {
                Some((_, n)) => *n += 1.0,
                None => at_risk_by_disease.push((disease.to_string(), 1.0)),
            }
        }
        let observed = outbreak_idx
            .and_then(|i| row.get(i))
            .map(|c| chart_number(c) > 0.0)
            .unwrap_or(false);
        if predicted == observed {
            agree += 1;
        }
    }

    let pct = |n: usize| {
        if scored == 0 {
            "0.0%".to_string()
        } else {
            format!("{:.1}%", n as f64 * 100.0 / scored as f64)
        }
    };
    blocks.push(Block::KeyValues(vec![
        ("Scored Rows".to_string(), scored.to_string()),
        ("Predicted At Risk".to_string(), format!("{} ({})", at_risk, pct(at_risk))),
        ("Agreement With Observed Outbreaks".to_string(), pct(agree)),
    ]));
    if !at_risk_by_disease.is_empty() {
        blocks.push(Block::BarChart(BarChart {
            title: "Predicted At-Risk Rows by Disease".to_string(),
            bars: at_risk_by_disease,
        }));
    }
    blocks
}

fn humanize(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
