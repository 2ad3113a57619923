//! Report artifact file format
//!
//! ```text
//! # report_type: weekly
//! # period: 2024-01-01
//! # total_cases: 42
//! week,county,disease,...,predicted_risk
//! 2024-01-01,Kisumu,cholera,...,1
//! ```
//!
//! Comment lines at the top carry `key: value` metadata; everything after
//! the first non-comment line is a plain CSV table.

/// Prefix marking a metadata line.
pub const METADATA_PREFIX: char = '#';

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact is not valid UTF-8")]
    Encoding,

    #[error("malformed metadata line {line}: '{content}'")]
    Metadata { line: usize, content: String },

    #[error("artifact has no table header")]
    MissingHeader,

    #[error("invalid table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to encode artifact: {0}")]
    Encode(String),
}

/// Header and string cells; empty cells stay empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Cells of a named column, in row order.
    pub fn column_values<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column(name)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(idx).map(String::as_str).unwrap_or("")),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub filename: String,
    pub metadata: Vec<(String, String)>,
    pub table: Table,
}

impl ReportArtifact {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut out = Vec::new();
        for (key, value) in &self.metadata {
            out.extend_from_slice(
                format!("{} {}: {}\n", METADATA_PREFIX, key, single_line(value)).as_bytes(),
            );
        }

        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&self.table.header)?;
        for row in &self.table.rows {
            writer.write_record(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    pub fn parse(filename: &str, bytes: &[u8]) -> Result<Self, ArtifactError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ArtifactError::Encoding)?;

        let mut metadata = Vec::new();
        let mut body_start = text.len();
        let mut offset = 0;
        for (line_no, line) in text.split_inclusive('\n').enumerate() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(METADATA_PREFIX) {
                let (key, value) = rest.split_once(':').ok_or_else(|| ArtifactError::Metadata {
                    line: line_no + 1,
                    content: trimmed.to_string(),
                })?;
                metadata.push((key.trim().to_string(), value.trim().to_string()));
            } else if !trimmed.is_empty() {
                body_start = offset;
                break;
            }
            offset += line.len();
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text[body_start..].as_bytes());
        let mut records = reader.records();

        let header: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(ArtifactError::MissingHeader),
        };
        let rows = records
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(Self {
            filename: filename.to_string(),
            metadata,
            table: Table { header, rows },
        })
    }
}

fn single_line(value: &str) -> String {
    value.replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ReportArtifact {
        ReportArtifact {
            filename: "weekly_2024-01-01_Kisumu.csv".to_string(),
            metadata: vec![
                ("report_type".to_string(), "weekly".to_string()),
                ("regions".to_string(), "Kisumu, Nairobi".to_string()),
                ("generated_at".to_string(), "2024-01-07T10:00:00+00:00".to_string()),
            ],
            table: Table {
                header: vec!["county".to_string(), "cases".to_string(), "predicted_risk".to_string()],
                rows: vec![
                    vec!["Kisumu".to_string(), "3".to_string(), "1".to_string()],
                    vec!["Nairobi, West".to_string(), "0".to_string(), "".to_string()],
                ],
            },
        }
    }

    #[test]
    fn test_metadata_and_table_survive_write_and_parse() {
        let original = artifact();
        let bytes = original.to_bytes().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("# report_type: weekly\n"));

        let parsed = ReportArtifact::parse(&original.filename, &bytes).unwrap();
        assert_eq!(parsed, original);
        assert_eq!(parsed.metadata_value("generated_at"), Some("2024-01-07T10:00:00+00:00"));
    }

    #[test]
    fn test_empty_cells_are_preserved() {
        let parsed = ReportArtifact::parse("x.csv", &artifact().to_bytes().unwrap()).unwrap();
        let risks: Vec<&str> = parsed.table.column_values("predicted_risk").unwrap().collect();
        assert_eq!(risks, vec!["1", ""]);
    }

    #[test]
    fn test_plain_csv_without_metadata() {
        let parsed = ReportArtifact::parse("plain.csv", b"a,b\n1,2\n").unwrap();
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.table.header, vec!["a", "b"]);
        assert_eq!(parsed.table.rows.len(), 1);
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            ReportArtifact::parse("x.csv", b"# no separator\na\n1\n"),
            Err(ArtifactError::Metadata { line: 1, .. })
        ));
        assert!(matches!(
            ReportArtifact::parse("x.csv", b"# k: v\n"),
            Err(ArtifactError::MissingHeader)
        ));
        assert!(matches!(
            ReportArtifact::parse("x.csv", &[0xff, 0xfe, 0x00]),
            Err(ArtifactError::Encoding)
        ));
    }
}
