use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use docsync_core::{Manifest, SyncStatus, MANIFEST_FILENAME};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::frontmatter::split_metadata_header;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path} unusable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| unusable(e.to_string()))?;
        if !meta.is_dir() {
            return Err(unusable("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| unusable(e.to_string()))?;
    }
    // Writability probe; the temp file is removed on drop.
    NamedTempFile::new_in(dir).map_err(|e| unusable(e.to_string()))?;
    Ok(())
}

/// Writes documents into one directory, each via temp file + rename so a reader never
/// sees a half-written file.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    dir: PathBuf,
}

impl DocumentWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Writes `content` to `{dir}/{filename}` and reports how it compares to what was there.
    ///
    /// A fresh `synced:` stamp alone still counts as unchanged. Any other frontmatter is
    /// compared like the rest of the body.
    pub fn write(&self, filename: &str, content: &str) -> Result<SyncStatus, PersistError> {
        let target = self.dir.join(filename);
        let status = match fs::read_to_string(&target) {
            Ok(existing) if same_document(&existing, content) => SyncStatus::Unchanged,
            Err(err) if err.kind() == io::ErrorKind::NotFound => SyncStatus::Created,
            // Unreadable or non-UTF-8 content is still an existing file being replaced.
            Ok(_) | Err(_) => SyncStatus::Updated,
        };
        self.replace(&target, content)?;
        Ok(status)
    }

    pub fn write_manifest(&self, manifest: &Manifest) -> Result<PathBuf, PersistError> {
        let mut json = manifest.to_json_pretty()?;
        json.push('\n');
        let target = self.dir.join(MANIFEST_FILENAME);
        self.replace(&target, &json)?;
        Ok(target)
    }

    fn replace(&self, target: &Path, content: &str) -> Result<(), PersistError> {
        let write_err = |source: io::Error| PersistError::Write {
            path: target.to_path_buf(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.as_file_mut().sync_all().map_err(write_err)?;
        tmp.persist(target).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

fn same_document(existing: &str, new: &str) -> bool {
    match (split_metadata_header(existing), split_metadata_header(new)) {
        (Some(old), Some(new)) => old == new,
        _ => existing == new,
    }
}
