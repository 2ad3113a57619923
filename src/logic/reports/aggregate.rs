//! Aggregation Engine - period grouping, row annotation and summaries

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;

use super::artifact::{ReportArtifact, Table};
use super::ReportError;
use crate::logic::features::{extract_record, ModelKind};
use crate::logic::model::{Label, PredictionService};
use crate::models::record::{prefix_chars, Record, RECORD_COLUMNS};

/// Column appended to every artifact table.
pub const PREDICTED_RISK_COLUMN: &str = "predicted_risk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Weekly, Granularity::Monthly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    /// Grouping key: the raw period, or its year-month prefix.
    pub fn period_key<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            Granularity::Weekly => &record.period,
            Granularity::Monthly => prefix_chars(&record.period, 7),
        }
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// Records sharing one period key, in input order.
#[derive(Debug, Clone)]
pub struct ReportGroup<'a> {
    pub period: String,
    pub records: Vec<&'a Record>,
}

impl<'a> ReportGroup<'a> {
    /// Distinct regions, sorted.
    pub fn regions(&self) -> BTreeSet<&'a str> {
        self.records.iter().map(|r| r.region.as_str()).collect()
    }
}

/// Groups in first-seen order of their keys.
pub fn group_records(records: &[Record], granularity: Granularity) -> Vec<ReportGroup<'_>> {
    let mut groups: Vec<ReportGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let key = granularity.period_key(record);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(ReportGroup {
                period: key.to_string(),
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups
}

/// `{weekly|monthly}_{period}_{regions}.csv` with sorted, de-duplicated
/// regions and path separators replaced.
pub fn report_filename<'r, I>(granularity: Granularity, period: &str, regions: I) -> String
where
    I: IntoIterator<Item = &'r str>,
{
    let regions: BTreeSet<&str> = regions.into_iter().collect();
    let joined = regions.into_iter().collect::<Vec<_>>().join("_");
    let name = format!("{}_{}_{}.csv", granularity.as_str(), period, joined);
    name.replace(['/', '\\'], "_")
}

// ============================================================================
// ANNOTATION & SUMMARY
// ============================================================================

/// A record with its model label; `None` when no model covers the disease.
#[derive(Debug, Clone)]
pub struct AnnotatedRow<'a> {
    pub record: &'a Record,
    pub predicted_risk: Option<Label>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiseaseSummary {
    pub cases: u64,
    pub avg_predicted_risk: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSummary {
    pub total_cases: u64,
    pub total_outbreaks: u64,
    pub avg_temp: f64,
    pub avg_rainfall: f64,
    pub avg_sanitation_rate: f64,
    pub avg_ndvi: f64,
    pub by_disease: BTreeMap<String, DiseaseSummary>,
}

impl ReportSummary {
    /// Summary metadata, one `key: value` pair per statistic.
    pub fn to_metadata(&self) -> Vec<(String, String)> {
        let mut out = vec![
            ("total_cases".to_string(), self.total_cases.to_string()),
            ("total_outbreaks".to_string(), self.total_outbreaks.to_string()),
            ("avg_temp".to_string(), format_mean(self.avg_temp)),
            ("avg_rainfall".to_string(), format_mean(self.avg_rainfall)),
            ("avg_sanitation_rate".to_string(), format_mean(self.avg_sanitation_rate)),
            ("avg_ndvi".to_string(), format_mean(self.avg_ndvi)),
        ];
        for (disease, summary) in &self.by_disease {
            let key = metadata_key(disease);
            out.push((format!("{}_cases", key), summary.cases.to_string()));
            out.push((
                format!("{}_avg_predicted_risk", key),
                format_mean(summary.avg_predicted_risk),
            ));
        }
        out
    }
}

// Metadata lines split on the first ':', so keys must not contain one.
fn metadata_key(disease: &str) -> String {
    disease.replace(':', "_")
}

/// Means of an empty set are 0, never NaN.
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn format_mean(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{:.4}", value)
}

pub fn summarize(rows: &[AnnotatedRow<'_>]) -> ReportSummary {
    let n = rows.len();
    let sum = |f: fn(&Record) -> f64| rows.iter().map(|r| f(r.record)).sum::<f64>();

    // Scoreable diseases are always reported, even with no rows.
    let mut risk: BTreeMap<String, (u64, f64, usize)> = ModelKind::ALL
        .iter()
        .map(|m| (m.as_str().to_string(), (0, 0.0, 0)))
        .collect();
    for row in rows {
        let entry = risk.entry(row.record.disease.to_string()).or_default();
        entry.0 += row.record.cases as u64;
        if let Some(label) = row.predicted_risk {
            entry.1 += label.as_u8() as f64;
            entry.2 += 1;
        }
    }

    ReportSummary {
        total_cases: rows.iter().map(|r| r.record.cases as u64).sum(),
        total_outbreaks: rows.iter().filter(|r| r.record.outbreak).count() as u64,
        avg_temp: mean(sum(|r| r.avg_temp), n),
        avg_rainfall: mean(sum(|r| r.avg_rainfall), n),
        avg_sanitation_rate: mean(sum(|r| r.unimproved_sanitation_rate), n),
        avg_ndvi: mean(sum(|r| r.mean_ndvi), n),
        by_disease: risk
            .into_iter()
            .map(|(disease, (cases, risk_sum, scored))| {
                (
                    disease,
                    DiseaseSummary {
                        cases,
                        avg_predicted_risk: mean(risk_sum, scored),
                    },
                )
            })
            .collect(),
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Builds report artifacts, scoring rows through the prediction service.
pub struct ReportGenerator<'s> {
    service: &'s PredictionService,
}

impl<'s> ReportGenerator<'s> {
    pub fn new(service: &'s PredictionService) -> Self {
        Self { service }
    }

    /// Label for scoreable rows, `None` otherwise.
    pub fn annotate<'a>(&self, records: &[&'a Record]) -> Result<Vec<AnnotatedRow<'a>>, ReportError> {
        records
            .iter()
            .map(|&record| {
                let predicted_risk = match ModelKind::for_disease(&record.disease) {
                    Some(model) => {
                        let features = extract_record(model, record)
                            .map_err(crate::logic::model::PredictionError::from)?;
                        Some(self.service.predict_label(&features)?)
                    }
                    None => None,
                };
                Ok(AnnotatedRow {
                    record,
                    predicted_risk,
                })
            })
            .collect()
    }

    pub fn build(
        &self,
        group: &ReportGroup<'_>,
        granularity: Granularity,
    ) -> Result<ReportArtifact, ReportError> {
        let rows = self.annotate(&group.records)?;
        let summary = summarize(&rows);
        let regions = group.regions();

        let mut metadata = vec![
            ("report_type".to_string(), granularity.as_str().to_string()),
            ("period".to_string(), group.period.clone()),
            (
                "regions".to_string(),
                regions.iter().copied().collect::<Vec<_>>().join(", "),
            ),
            ("generated_at".to_string(), Utc::now().to_rfc3339()),
            ("record_count".to_string(), rows.len().to_string()),
        ];
        metadata.extend(summary.to_metadata());

        let mut header: Vec<String> = RECORD_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.push(PREDICTED_RISK_COLUMN.to_string());

        let table_rows = rows
            .iter()
            .map(|row| {
                let mut cells = row.record.to_row();
                cells.push(
                    row.predicted_risk
                        .map(|l| l.as_u8().to_string())
                        .unwrap_or_default(),
                );
                cells
            })
            .collect();

        Ok(ReportArtifact {
            filename: report_filename(granularity, &group.period, regions),
            metadata,
            table: Table {
                header,
                rows: table_rows,
            },
        })
    }

    /// One artifact per period group.
    pub fn generate(
        &self,
        records: &[Record],
        granularity: Granularity,
    ) -> Result<Vec<ReportArtifact>, ReportError> {
        group_records(records, granularity)
            .iter()
            .map(|group| self.build(group, granularity))
            .collect()
    }

    /// Weekly and monthly artifacts together.
    pub fn generate_all(&self, records: &[Record]) -> Result<Vec<ReportArtifact>, ReportError> {
        let mut artifacts = Vec::new();
        for granularity in Granularity::ALL {
            artifacts.extend(self.generate(records, granularity)?);
        }
        Ok(artifacts)
    }
}
