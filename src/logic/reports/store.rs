//! Report Store - the reports directory and nothing else

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use tempfile::NamedTempFile;

use super::artifact::{ArtifactError, ReportArtifact};

/// Extensions served from the reports directory.
pub const RECOGNIZED_EXTENSIONS: [&str; 2] = ["csv", "pdf"];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Invalid report name: {0}")]
    InvalidName(String),

    #[error("Corrupt report {name}: {source}")]
    Corrupt {
        name: String,
        #[source]
        source: ArtifactError,
    },

    #[error("Report storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A report that could not be stored during a batch write.
#[derive(Debug, Serialize)]
pub struct WriteFailure {
    pub filename: String,
    pub error: String,
}

/// Outcome of a batch write. Each artifact is written independently.
#[derive(Debug, Default, Serialize)]
pub struct WriteSummary {
    pub written: Vec<String>,
    pub failed: Vec<WriteFailure>,
}

impl WriteSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Exclusive owner of the reports directory.
///
/// Writes go through a temporary sibling and a rename, and batches are
/// serialized by `write_lock`, so readers only ever see complete files.
pub struct ReportStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl ReportStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Report filenames with a recognized extension, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.') && is_recognized(name))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Path inside the reports directory for the basename of `name`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let base = basename(name).ok_or_else(|| StoreError::InvalidName(name.to_string()))?;
        Ok(self.dir.join(base))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    pub fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(display_name(name))),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(test)]
    pub fn read_artifact(&self, name: &str) -> Result<ReportArtifact, StoreError> {
        let bytes = self.read(name)?;
        let base = display_name(name);
        ReportArtifact::parse(&base, &bytes).map_err(|source| StoreError::Corrupt { name: base, source })
    }

    #[cfg(test)]
    pub fn write(&self, name: &str, content: &[u8]) -> Result<PathBuf, StoreError> {
        let _guard = self.write_lock.lock();
        self.write_unlocked(name, content)
    }

    /// Writes a whole regeneration pass under one lock.
    ///
    /// A failing artifact is logged and recorded; the rest are still written.
    pub fn write_all(&self, artifacts: &[ReportArtifact]) -> WriteSummary {
        let _guard = self.write_lock.lock();
        let mut summary = WriteSummary::default();
        for artifact in artifacts {
            let result = artifact
                .to_bytes()
                .map_err(|source| StoreError::Corrupt {
                    name: artifact.filename.clone(),
                    source,
                })
                .and_then(|bytes| self.write_unlocked(&artifact.filename, &bytes));
            match result {
                Ok(_) => summary.written.push(artifact.filename.clone()),
                Err(e) => {
                    tracing::error!("Failed to write report {}: {}", artifact.filename, e);
                    summary.failed.push(WriteFailure {
                        filename: artifact.filename.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        tracing::info!(
            "Wrote {} reports to {} ({} failed)",
            summary.written.len(),
            self.dir.display(),
            summary.failed.len()
        );
        summary
    }

    // The temp name has a fixed length, so any name the filesystem accepts
    // can be written.
    fn write_unlocked(&self, name: &str, content: &[u8]) -> Result<PathBuf, StoreError> {
        let path = self.resolve(name)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        tracing::debug!("Report written: {}", path.display());
        Ok(path)
    }
}

/// Final path component, splitting on both separator styles.
pub fn basename(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}

fn display_name(name: &str) -> String {
    basename(name).unwrap_or(name).to_string()
}

pub fn is_recognized(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| RECOGNIZED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
