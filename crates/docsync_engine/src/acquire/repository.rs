use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docsync_core::{PathRules, SourceDocument};
use sync_logging::{sync_debug, sync_info, sync_warn};
use tokio::process::Command;
use walkdir::WalkDir;

use super::{AcquireError, AcquiredItem, Acquirer, Acquisition, ItemFailure};
use crate::fetch::ProgressSink;
use crate::types::{FailureKind, FetchError, ItemProgress, Stage, SyncEvent};

/// Produces a shallow checkout of a repository.
#[async_trait::async_trait]
pub trait RepositoryCloner: Send + Sync {
    /// Clones `url` at depth 1 into `dest` (which must not exist yet) and returns the
    /// checked-out commit id.
    async fn clone_shallow(
        &self,
        url: &str,
        reference: Option<&str>,
        dest: &Path,
    ) -> Result<String, AcquireError>;
}

/// Shells out to the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: PathBuf,
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCloner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(
        &self,
        action: &'static str,
        repo: &str,
        args: &[&OsStr],
    ) -> Result<String, AcquireError> {
        let failed = |message: String| AcquireError::Git {
            action,
            repo: repo.to_string(),
            message,
        };
        let output = Command::new(&self.program)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|err| failed(format!("could not run {}: {err}", self.program.display())))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!("{} ({})", stderr.trim(), output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait::async_trait]
impl RepositoryCloner for GitCloner {
    async fn clone_shallow(
        &self,
        url: &str,
        reference: Option<&str>,
        dest: &Path,
    ) -> Result<String, AcquireError> {
        if let Some(reference) = reference.filter(|r| r.starts_with('-')) {
            return Err(AcquireError::Git {
                action: "clone",
                repo: url.to_string(),
                message: format!("reference '{reference}' looks like an option"),
            });
        }
        let mut args: Vec<&OsStr> = vec!["clone".as_ref(), "--depth".as_ref(), "1".as_ref()];
        if let Some(reference) = reference {
            args.push("--branch".as_ref());
            args.push(reference.as_ref());
        }
        // `--` keeps the url positional.
        args.push("--".as_ref());
        args.push(url.as_ref());
        args.push(dest.as_os_str());
        self.run("clone", url, &args).await?;

        self.run(
            "rev-parse",
            url,
            &[
                OsStr::new("-C"),
                dest.as_os_str(),
                OsStr::new("rev-parse"),
                OsStr::new("HEAD"),
            ],
        )
        .await
    }
}

/// Clones into a private scratch directory, then reads markdown under `subdir`.
pub struct RepositoryAcquirer {
    url: String,
    reference: Option<String>,
    subdir: String,
    rules: PathRules,
    cloner: Arc<dyn RepositoryCloner>,
}

impl RepositoryAcquirer {
    pub fn new(
        url: String,
        reference: Option<String>,
        subdir: String,
        rules: PathRules,
        cloner: Arc<dyn RepositoryCloner>,
    ) -> Self {
        Self {
            url,
            reference,
            subdir,
            rules,
            cloner,
        }
    }
}

#[async_trait::async_trait]
impl Acquirer for RepositoryAcquirer {
    async fn acquire(&self, sink: &dyn ProgressSink) -> Result<Acquisition, AcquireError> {
        // Dropping the TempDir removes the checkout on every return path.
        let scratch = tempfile::Builder::new()
            .prefix("docsync-")
            .tempdir()
            .map_err(AcquireError::Scratch)?;
        let checkout = scratch.path().join("repo");

        sink.emit(SyncEvent::Progress(ItemProgress {
            item: 0,
            stage: Stage::Cloning,
            bytes: None,
        }));
        sync_info!("cloning {} (depth 1)", self.url);
        let commit = self
            .cloner
            .clone_shallow(&self.url, self.reference.as_deref(), &checkout)
            .await?;
        sync_info!("cloned {} at {}", self.url, commit);

        let subdir = self.subdir.trim_matches('/');
        let source_dir = if subdir.is_empty() {
            checkout.clone()
        } else {
            checkout.join(subdir)
        };
        if !source_dir.is_dir() {
            return Err(AcquireError::MissingSourceDir(PathBuf::from(subdir)));
        }

        let items = collect_documents(&source_dir, &self.rules, sink)?;
        sync_info!("found {} documents under '{}'", items.len(), subdir);

        let mut acquisition = Acquisition::new(self.url.clone());
        acquisition.commit = Some(commit);
        acquisition.source_path = (!subdir.is_empty()).then(|| subdir.to_string());
        acquisition.items = items;

        if let Err(err) = scratch.close() {
            sync_warn!("failed to remove scratch checkout: {}", err);
        }
        Ok(acquisition)
    }
}

fn collect_documents(
    source_dir: &Path,
    rules: &PathRules,
    sink: &dyn ProgressSink,
) -> Result<Vec<Result<AcquiredItem, ItemFailure>>, AcquireError> {
    let walker = WalkDir::new(source_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !rules
                    .skip_dirs
                    .iter()
                    .any(|skip| entry.file_name().to_string_lossy() == skip.as_str())
        });

    let mut items = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| AcquireError::Read {
            path: err.path().unwrap_or(source_dir).to_path_buf(),
            message: err.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if rules.skip_files.iter().any(|skip| name == skip.as_str()) {
            sync_debug!("skipping {}", entry.path().display());
            continue;
        }
        let accepted = entry
            .path()
            .extension()
            .is_some_and(|ext| rules.accepts_extension(&ext.to_string_lossy()));
        if !accepted {
            continue;
        }

        let logical_path = relative_logical_path(entry.path(), source_dir);
        sink.emit(SyncEvent::Progress(ItemProgress {
            item: items.len(),
            stage: Stage::Scanning,
            bytes: entry.metadata().ok().map(|m| m.len()),
        }));
        let item = match fs::read_to_string(entry.path()) {
            Ok(content) => Ok(AcquiredItem::markdown(SourceDocument::new(
                logical_path,
                content,
            ))),
            Err(err) => {
                sync_warn!("could not read {}: {}", logical_path, err);
                Err(ItemFailure {
                    logical_path,
                    title: None,
                    error: FetchError::new(FailureKind::Decode, err.to_string()),
                })
            }
        };
        items.push(item);
    }
    Ok(items)
}

fn relative_logical_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
