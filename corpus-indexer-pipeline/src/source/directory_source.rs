//! Directory source: one JSON document per file.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::errors::PipelineError;
use corpus_indexer_shared::Record;

/// A directory of documents, one per file.
///
/// Each call to [`DirectorySource::open`] lists the directory again, so a
/// source can be read more than once.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source for the given directory. Nothing is read until
    /// [`DirectorySource::open`] is called.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// List the directory.
    ///
    /// Entries are returned in file name order. Subdirectories are skipped.
    ///
    /// # Returns
    ///
    /// * `Ok(DirectoryListing)` - Listing ready to be read record by record
    /// * `Err(PipelineError::IoError)` - If the directory cannot be listed
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn open(&self) -> Result<DirectoryListing, PipelineError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| PipelineError::io(format!("{}: {}", self.dir.display(), e)))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PipelineError::io(format!("{}: {}", self.dir.display(), e)))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| PipelineError::io(format!("{}: {}", entry.path().display(), e)))?;
            if file_type.is_dir() {
                debug!(path = %entry.path().display(), "Skipping subdirectory");
                continue;
            }
            files.push(entry.path());
        }
        files.sort();

        info!(files = files.len(), "Listed source directory");
        Ok(DirectoryListing {
            files: files.into_iter(),
        })
    }
}

/// A listed directory, read lazily one file at a time.
#[derive(Debug)]
pub struct DirectoryListing {
    files: std::vec::IntoIter<PathBuf>,
}

impl DirectoryListing {
    /// Number of files not yet read.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }

    /// Read the next file.
    ///
    /// Returns `Ok(None)` once every file has been read.
    pub async fn next_record(&mut self) -> Result<Option<Record>, PipelineError> {
        let Some(path) = self.files.next() else {
            return Ok(None);
        };

        let id = record_id(&path)?;
        let payload = tokio::fs::read(&path)
            .await
            .map_err(|e| PipelineError::io(format!("{}: {}", path.display(), e)))?;

        Ok(Some(Record::new(id, payload)))
    }
}

/// File name with its last extension removed.
fn record_id(path: &Path) -> Result<String, PipelineError> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let id = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name.as_str(),
    };

    if id.is_empty() {
        return Err(PipelineError::io(format!(
            "{}: file name yields an empty document id",
            path.display()
        )));
    }
    Ok(id.to_string())
}
