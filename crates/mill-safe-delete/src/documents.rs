//! Filesystem-backed document store with snapshot rollback

use async_trait::async_trait;
use mill_foundation::protocol::{DocumentStore, Transaction};
use mill_foundation::{ApplyReport, FileOperation, MillError, MillResult, OperationKind};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Applies transactions to files under a project root.
///
/// All new contents are computed in memory before the first write. If a
/// write fails, every file touched so far is restored from its snapshot.
#[derive(Debug, Clone)]
pub struct FileSystemDocuments {
    root: PathBuf,
}

enum FileChange {
    Write(String),
    Remove,
}

impl FileSystemDocuments {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let root = match std::fs::canonicalize(&root) {
            Ok(canonical) => canonical,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Could not canonicalize project root");
                root
            }
        };
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for `path`, rejecting anything outside the project root
    fn resolve_path(&self, path: &Path) -> MillResult<PathBuf> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };

        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::ParentDir => {
                    normalized.pop();
                }
                Component::CurDir => {}
                other => normalized.push(other),
            }
        }

        if !normalized.starts_with(&self.root) {
            return Err(MillError::transaction(format!(
                "Path escapes project root: {}",
                path.display()
            )));
        }
        Ok(normalized)
    }

    async fn snapshot(
        &self,
        files: &BTreeMap<PathBuf, Vec<FileOperation>>,
    ) -> MillResult<BTreeMap<PathBuf, String>> {
        let mut snapshots = BTreeMap::new();
        for path in files.keys() {
            let content = fs::read_to_string(path)
                .await
                .map_err(|e| MillError::io(path.clone(), e))?;
            debug!(file_path = %path.display(), content_len = content.len(), "Snapshot created");
            snapshots.insert(path.clone(), content);
        }
        Ok(snapshots)
    }

    async fn rollback(
        &self,
        snapshots: &BTreeMap<PathBuf, String>,
        touched: &[PathBuf],
    ) -> MillResult<()> {
        warn!(files_count = touched.len(), "Rolling back file modifications");

        let mut rollback_errors = Vec::new();
        for path in touched {
            let Some(original) = snapshots.get(path) else {
                continue;
            };
            if let Err(e) = fs::write(path, original).await {
                rollback_errors.push(format!("{}: {}", path.display(), e));
            }
        }

        if !rollback_errors.is_empty() {
            error!(
                error_count = rollback_errors.len(),
                errors = %rollback_errors.join("; "),
                "Encountered errors during rollback"
            );
            return Err(MillError::transaction(format!(
                "Rollback partially failed: {}",
                rollback_errors.join("; ")
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileSystemDocuments {
    async fn commit(&self, transaction: Transaction) -> MillResult<ApplyReport> {
        let operation_count = transaction.operations.len();

        let mut files: BTreeMap<PathBuf, Vec<FileOperation>> = BTreeMap::new();
        for operation in transaction.operations {
            let path = self.resolve_path(&operation.file_path)?;
            files.entry(path).or_default().push(operation);
        }

        let snapshots = self.snapshot(&files).await?;

        let mut changes = Vec::with_capacity(files.len());
        for (path, operations) in files {
            let change = if operations.iter().any(|op| op.kind == OperationKind::DeleteFile) {
                FileChange::Remove
            } else {
                let original = snapshots.get(&path).map(String::as_str).unwrap_or_default();
                FileChange::Write(apply_operations(&path, original, operations)?)
            };
            changes.push((path, change));
        }

        let mut report = ApplyReport {
            operation_count,
            ..ApplyReport::default()
        };
        let mut touched = Vec::with_capacity(changes.len());

        for (path, change) in changes {
            let result = match &change {
                FileChange::Write(content) => fs::write(&path, content).await,
                FileChange::Remove => fs::remove_file(&path).await,
            };
            touched.push(path.clone());

            if let Err(e) = result {
                error!(file_path = %path.display(), error = %e, "Failed to apply transaction");
                self.rollback(&snapshots, &touched).await?;
                return Err(MillError::transaction(format!(
                    "'{}' failed on {}: {}",
                    transaction.label,
                    path.display(),
                    e
                )));
            }

            match change {
                FileChange::Write(_) => report.modified_files.push(path),
                FileChange::Remove => report.deleted_files.push(path),
            }
        }

        info!(
            label = %transaction.label,
            modified_files = report.modified_files.len(),
            deleted_files = report.deleted_files.len(),
            "Transaction committed"
        );
        Ok(report)
    }
}

/// Apply range operations to `content`, last range first.
///
/// Identical operations are applied once; any other overlap is rejected.
fn apply_operations(
    path: &Path,
    content: &str,
    mut operations: Vec<FileOperation>,
) -> MillResult<String> {
    operations.sort_by(|a, b| (b.range.start, b.range.end).cmp(&(a.range.start, a.range.end)));
    operations.dedup_by(|a, b| {
        a.range == b.range && a.kind == b.kind && a.replacement() == b.replacement()
    });

    let mut result = content.to_string();
    let mut lower_bound = content.len();

    for operation in &operations {
        let range = operation.range;
        if range.end > content.len()
            || !content.is_char_boundary(range.start)
            || !content.is_char_boundary(range.end)
        {
            return Err(MillError::transaction(format!(
                "Range {}..{} is invalid for {} ({} bytes)",
                range.start,
                range.end,
                path.display(),
                content.len()
            )));
        }
        if range.end > lower_bound {
            return Err(MillError::transaction(format!(
                "Overlapping edits in {} at {}..{}",
                path.display(),
                range.start,
                range.end
            )));
        }

        result.replace_range(range.start..range.end, operation.replacement());
        lower_bound = range.start;
    }

    Ok(result)
}
