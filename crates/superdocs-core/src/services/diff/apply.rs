use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use thiserror::Error;
#[cfg(not(target_arch = "wasm32"))]
use tokio::fs;

use super::types::Change;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("search block not found in {filepath}")]
    SearchNotFound { filepath: String },
    #[error("failed to read or write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Applies one change to in-memory content. An empty search block replaces the
/// whole content; otherwise the first occurrence of the block is replaced.
pub fn apply_change(content: &str, change: &Change) -> Result<String, ApplyError> {
    if change.creates_file() {
        return Ok(change.replace_block.clone());
    }
    if !content.contains(&change.search_block) {
        return Err(ApplyError::SearchNotFound {
            filepath: change.filepath.clone(),
        });
    }
    Ok(content.replacen(&change.search_block, &change.replace_block, 1))
}

/// Writes reconciled changes into a workspace directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct ChangeApplier {
    workspace: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl ChangeApplier {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub async fn apply(&self, change: &Change) -> Result<(), ApplyError> {
        let path = self.workspace.join(&change.filepath);
        let io_error = |source| ApplyError::Io {
            path: path.clone(),
            source,
        };

        let updated = if change.creates_file() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).await.map_err(io_error)?;
            }
            change.replace_block.clone()
        } else {
            let content = fs::read_to_string(&path).await.map_err(io_error)?;
            apply_change(&content, change)?
        };

        fs::write(&path, updated).await.map_err(io_error)?;
        tracing::info!("applied change to {}", change.filepath);
        Ok(())
    }

    /// Applies changes in order, one result per change. A failing change is
    /// logged and the rest of the batch still lands.
    pub async fn apply_all(&self, changes: &[Change]) -> Vec<Result<(), ApplyError>> {
        let mut results = Vec::with_capacity(changes.len());
        for change in changes {
            let result = self.apply(change).await;
            if let Err(e) = &result {
                tracing::error!("failed to apply change: {}", e);
            }
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_apply_change() {
        let test_cases = vec![
            (
                "a\nb\nb\n",
                Change::new("f", "b", "c"),
                Some("a\nc\nb\n"),
            ),
            ("a\n", Change::new("f", "", "new\n"), Some("new\n")),
            ("a\n", Change::new("f", "missing", "x"), None),
        ];

        for (content, change, expected) in test_cases {
            let result = apply_change(content, &change).ok();
            assert_eq!(result.as_deref(), expected, "Failed for change: {:?}", change);
        }
    }

    #[tokio::test]
    async fn test_apply_all_writes_files_and_skips_failures() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("foo.py"), "x = 1\ny = 3\n").unwrap();

        let applier = ChangeApplier::new(dir.path());
        let changes = vec![
            Change::new("foo.py", "x = 1", "x = 2"),
            Change::new("foo.py", "not there", "z"),
            Change::new("nested/dir/new.txt", "", "hello\n"),
        ];

        let results = applier.apply_all(&changes).await;
        assert_eq!(
            results.iter().map(Result::is_ok).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert!(matches!(results[1], Err(ApplyError::SearchNotFound { .. })));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("foo.py")).unwrap(),
            "x = 2\ny = 3\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("nested/dir/new.txt")).unwrap(),
            "hello\n"
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let applier = ChangeApplier::new(dir.path());

        let result = applier.apply(&Change::new("absent.rs", "a", "b")).await;
        assert!(matches!(result, Err(ApplyError::Io { .. })));
    }
}
