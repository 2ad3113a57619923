//! Renderer tests

use super::document::*;
use super::layout::{fit_text, footer_text};
use super::*;

fn artifact(filename: &str, csv: &str) -> ReportArtifact {
    ReportArtifact::parse(filename, csv.as_bytes()).unwrap()
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Column sizing
// ---------------------------------------------------------------------------

#[test]
fn test_column_widths_are_clamped() {
    let header = strings(&["a", "b", "c"]);
    let rows = vec![strings(&["x", &"y".repeat(30), "1234567890"])];
    let widths = column_widths(&header, &rows, CONTENT_WIDTH_IN);

    assert!((widths[0] - MIN_COLUMN_IN).abs() < 1e-9);
    assert!((widths[1] - MAX_COLUMN_IN).abs() < 1e-9);
    assert!((widths[2] - 0.9).abs() < 1e-9);
}

#[test]
fn test_wide_tables_are_scaled_to_fit() {
    let header: Vec<String> = (0..10).map(|i| format!("column_number_{}", i)).collect();
    let widths = column_widths(&header, &[], CONTENT_WIDTH_IN);

    let total: f64 = widths.iter().sum();
    assert!((total - CONTENT_WIDTH_IN).abs() < 1e-9);
    assert!(widths.iter().all(|w| (w - 0.75).abs() < 1e-9));
}

#[test]
fn test_header_counts_toward_width() {
    let widths = column_widths(&strings(&["unimproved_sanitation_rate"]), &[strings(&["0.1"])], 7.5);
    assert!((widths[0] - MAX_COLUMN_IN).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Document content
// ---------------------------------------------------------------------------

#[test]
fn test_chart_number_coercion() {
    assert_eq!(chart_number("3"), 3.0);
    assert_eq!(chart_number(" 2.5 "), 2.5);
    assert_eq!(chart_number("true"), 1.0);
    assert_eq!(chart_number("False"), 0.0);
    assert_eq!(chart_number(""), 0.0);
    assert_eq!(chart_number("n/a"), 0.0);
    assert_eq!(chart_number("NaN"), 0.0);
}

#[test]
fn test_zero_activity_gets_banner_and_no_charts() {
    let doc = build(&artifact(
        "weekly_2024-01-01_Kisumu.csv",
        "# report_type: weekly\n# period: 2024-01-01\n# total_cases: 0\n# total_outbreaks: 0\n\
         week,county,disease,cases,outbreak\n2024-01-01,Kisumu,cholera,0,0\n",
    ));

    assert!(doc.has_banner());
    assert_eq!(doc.charts().count(), 0);
    assert_eq!(doc.subtitle, "Weekly report: 2024-01-01");
}

#[test]
fn test_charts_follow_nonzero_columns() {
    let doc = build(&artifact(
        "plain.csv",
        "county,disease,cases,outbreak\nKisumu,cholera,3,0\nNairobi,malaria,bad,0\nKisumu,cholera,,0\n",
    ));

    assert!(!doc.has_banner());
    let charts: Vec<_> = doc.charts().collect();
    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].title, "Cases by Disease");
    assert_eq!(
        charts[0].bars,
        vec![("cholera".to_string(), 3.0), ("malaria".to_string(), 0.0)]
    );
}

#[test]
fn test_outbreak_rows_are_highlighted() {
    let doc = build(&artifact(
        "plain.csv",
        "county,cases,outbreak\nA,1,1\nB,2,0\nC,3,true\nD,4,\n",
    ));
    let table = doc.table().unwrap();
    assert_eq!(table.highlighted, vec![true, false, true, false]);
    assert_eq!(table.rows[3][2], "");
}

#[test]
fn test_assessment_section_only_for_special_names() {
    let csv = "disease,cases,outbreak,predicted_risk\n\
               cholera,3,1,1\ncholera,1,0,0\ntyphoid,2,1,\nmalaria,5,0,1\n";

    let regular = build(&artifact("weekly_2024-01-01_Kisumu.csv", csv));
    assert!(!regular.blocks.contains(&Block::Heading("Prediction Analysis".to_string())));

    let special = build(&artifact("special_assessment_kisumu.csv", csv));
    assert!(special.blocks.contains(&Block::Heading("Prediction Analysis".to_string())));

    let stats = special
        .blocks
        .iter()
        .find_map(|b| match b {
            Block::KeyValues(kv) if kv[0].0 == "Scored Rows" => Some(kv.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(stats[0].1, "3");
    assert_eq!(stats[1].1, "2 (66.7%)");
    assert_eq!(stats[2].1, "66.7%");

    let at_risk = special
        .charts()
        .find(|c| c.title.starts_with("Predicted"))
        .unwrap();
    assert_eq!(
        at_risk.bars,
        vec![("cholera".to_string(), 1.0), ("malaria".to_string(), 1.0)]
    );
}

#[test]
fn test_assessment_without_predictions() {
    let doc = build(&artifact("Assessment.csv", "county,cases\nA,1\n"));
    assert!(doc
        .blocks
        .contains(&Block::Paragraph("This report carries no model predictions.".to_string())));
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[test]
fn test_every_page_has_a_footer() {
    let mut csv = String::from("week,county,disease,cases,outbreak\n");
    for i in 0..200 {
        csv.push_str(&format!("2024-01-01,County{},cholera,{},{}\n", i, i, i % 2));
    }
    let pages = layout(&build(&artifact("long.csv", &csv)));

    assert!(pages.len() > 1);
    let total = pages.len();
    for (i, page) in pages.iter().enumerate() {
        let footer = footer_text(i + 1, total);
        assert!(page.texts().any(|t| t.ends_with(&footer)), "page {} lacks footer", i + 1);
    }
}

#[test]
fn test_fit_text_truncates_long_cells() {
    assert_eq!(fit_text("short", 2.0, 7.0), "short");
    let cut = fit_text(&"x".repeat(100), 0.5, 7.0);
    assert!(cut.ends_with(".."));
    assert!(cut.chars().count() < 100);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_render_produces_pdf() {
    let bytes = render(
        "weekly_2024-01-01_Kisumu.csv",
        b"# report_type: weekly\n# period: 2024-01-01\n\
          week,county,disease,cases,outbreak,predicted_risk\n2024-01-01,Kisumu,cholera,3,1,1\n",
    )
    .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_render_rejects_unparseable_artifact() {
    let err = render("x.csv", b"# missing separator\na\n").unwrap_err();
    assert!(matches!(err, RenderError::Parse(_)));
}
