//! Dashboard aggregations over the dataset

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyComparison {
    pub month: String,
    pub disease: String,
    pub cases: u64,
    pub outbreaks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountySummary {
    pub county: String,
    pub total_cases: u64,
    pub total_outbreaks: u64,
    pub cases_by_disease: BTreeMap<String, u64>,
    pub avg_temp: f64,
    pub avg_rainfall: f64,
    pub avg_sanitation_rate: f64,
    pub avg_ndvi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentalPoint {
    pub week: String,
    pub avg_temp: f64,
    pub avg_rainfall: f64,
    pub avg_sanitation_rate: f64,
    pub avg_ndvi: f64,
    pub total_cases: u64,
}

/// Running sums for the four environmental columns.
#[derive(Debug, Default, Clone)]
struct EnvAccumulator {
    count: u64,
    temp: f64,
    rainfall: f64,
    sanitation: f64,
    ndvi: f64,
}

impl EnvAccumulator {
    fn add(&mut self, r: &Record) {
        self.count += 1;
        self.temp += r.avg_temp;
        self.rainfall += r.avg_rainfall;
        self.sanitation += r.unimproved_sanitation_rate;
        self.ndvi += r.mean_ndvi;
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            sum / self.count as f64
        }
    }
}

/// Cases and outbreaks per (month, disease), months ascending.
pub fn monthly_comparison(records: &[Record]) -> Vec<MonthlyComparison> {
    let mut groups: BTreeMap<(String, String), (u64, u64)> = BTreeMap::new();
    for r in records {
        let entry = groups
            .entry((r.month().to_string(), r.disease.to_string()))
            .or_default();
        entry.0 += r.cases as u64;
        entry.1 += r.outbreak as u64;
    }

    groups
        .into_iter()
        .map(|((month, disease), (cases, outbreaks))| MonthlyComparison {
            month,
            disease,
            cases,
            outbreaks,
        })
        .collect()
}

/// Totals and environmental means per county, counties ascending.
pub fn county_data(records: &[Record]) -> Vec<CountySummary> {
    #[derive(Default)]
    struct Acc {
        cases: u64,
        outbreaks: u64,
        by_disease: BTreeMap<String, u64>,
        env: EnvAccumulator,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();
    for r in records {
        let acc = groups.entry(r.region.as_str()).or_default();
        acc.cases += r.cases as u64;
        acc.outbreaks += r.outbreak as u64;
        *acc.by_disease.entry(r.disease.to_string()).or_default() += r.cases as u64;
        acc.env.add(r);
    }

    groups
        .into_iter()
        .map(|(county, acc)| CountySummary {
            county: county.to_string(),
            total_cases: acc.cases,
            total_outbreaks: acc.outbreaks,
            avg_temp: acc.env.mean(acc.env.temp),
            avg_rainfall: acc.env.mean(acc.env.rainfall),
            avg_sanitation_rate: acc.env.mean(acc.env.sanitation),
            avg_ndvi: acc.env.mean(acc.env.ndvi),
            cases_by_disease: acc.by_disease,
        })
        .collect()
}

/// Weekly environmental means alongside case totals, weeks ascending.
pub fn environmental(records: &[Record]) -> Vec<EnvironmentalPoint> {
    let mut groups: BTreeMap<&str, (EnvAccumulator, u64)> = BTreeMap::new();
    for r in records {
        let (env, cases) = groups.entry(r.period.as_str()).or_default();
        env.add(r);
        *cases += r.cases as u64;
    }

    groups
        .into_iter()
        .map(|(week, (env, cases))| EnvironmentalPoint {
            week: week.to_string(),
            avg_temp: env.mean(env.temp),
            avg_rainfall: env.mean(env.rainfall),
            avg_sanitation_rate: env.mean(env.sanitation),
            avg_ndvi: env.mean(env.ndvi),
            total_cases: cases,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Disease;

    fn record(week: &str, county: &str, disease: &str, cases: u32, outbreak: bool, temp: f64) -> Record {
        Record {
            period: week.to_string(),
            region: county.to_string(),
            disease: Disease::from(disease),
            cases,
            outbreak,
            avg_temp: temp,
            avg_rainfall: 50.0,
            unimproved_sanitation_rate: 0.3,
            mean_ndvi: 0.4,
        }
    }

    fn sample() -> Vec<Record> {
        vec![
            record("2024-02-05", "Kisumu", "cholera", 5, true, 26.0),
            record("2024-01-01", "Kisumu", "malaria", 2, false, 24.0),
            record("2024-01-08", "Nairobi", "cholera", 1, false, 20.0),
            record("2024-01-01", "Nairobi", "cholera", 3, true, 22.0),
        ]
    }

    #[test]
    fn test_monthly_comparison_groups_by_month_and_disease() {
        let rows = monthly_comparison(&sample());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].month, "2024-01");
        assert_eq!(rows[0].disease, "cholera");
        assert_eq!(rows[0].cases, 4);
        assert_eq!(rows[0].outbreaks, 1);
        assert_eq!(rows[2].month, "2024-02");
    }

    #[test]
    fn test_county_data() {
        let rows = county_data(&sample());
        assert_eq!(rows.len(), 2);
        let kisumu = &rows[0];
        assert_eq!(kisumu.county, "Kisumu");
        assert_eq!(kisumu.total_cases, 7);
        assert_eq!(kisumu.total_outbreaks, 1);
        assert_eq!(kisumu.cases_by_disease["malaria"], 2);
        assert!((kisumu.avg_temp - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_environmental_is_weekly() {
        let rows = environmental(&sample());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].week, "2024-01-01");
        assert_eq!(rows[0].total_cases, 5);
        assert!((rows[0].avg_temp - 23.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        assert!(monthly_comparison(&[]).is_empty());
        assert!(county_data(&[]).is_empty());
        assert!(environmental(&[]).is_empty());
    }
}
