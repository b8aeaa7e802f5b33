use super::config::ReconcileConfig;
use super::filename::{resolve_filepath, Resolution};
use super::matcher::find_best_match;
use super::strategies::{get_diff_strategy, DiffStrategy};
use super::types::{Change, FileSet, ReconcileError, Reconciliation};

/// Turns model responses into changes that apply literally to known files.
#[derive(Debug)]
pub struct Reconciler {
    config: ReconcileConfig,
    strategy: Box<dyn DiffStrategy>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        let strategy = get_diff_strategy(config.edit_format);
        Self { config, strategy }
    }

    pub fn with_strategy(config: ReconcileConfig, strategy: Box<dyn DiffStrategy>) -> Self {
        Self { config, strategy }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn strategy(&self) -> &dyn DiffStrategy {
        self.strategy.as_ref()
    }

    pub fn reconcile(&self, files: &FileSet, response: &str) -> Reconciliation {
        let candidates = self.strategy.extract_changes(response);
        tracing::debug!(
            "{} candidate changes from {} response",
            candidates.len(),
            self.strategy.name()
        );
        self.reconcile_changes(files, candidates)
    }

    pub fn reconcile_changes(
        &self,
        files: &FileSet,
        candidates: impl IntoIterator<Item = Change>,
    ) -> Reconciliation {
        let mut reconciliation = Reconciliation::default();

        for candidate in candidates {
            if candidate.is_noop() {
                continue;
            }
            match self.reconcile_change(files, candidate) {
                Ok(change) => reconciliation.changes.push(change),
                Err(e) => {
                    tracing::warn!("dropping edit: {}", e);
                    reconciliation.failures.push(e);
                }
            }
        }

        reconciliation
    }

    /// Resolves the candidate's file and, for an existing file, replaces its
    /// search text with the verbatim block it best corresponds to.
    pub fn reconcile_change(
        &self,
        files: &FileSet,
        candidate: Change,
    ) -> Result<Change, ReconcileError> {
        let filepath = match resolve_filepath(
            &candidate.filepath,
            files,
            self.config.new_file_threshold,
        ) {
            Resolution::New { filepath } => {
                tracing::debug!("{} is a new file", filepath);
                return Ok(Change { filepath, ..candidate });
            }
            Resolution::Existing { filepath, .. } => filepath,
        };
        let Some(snapshot) = files.get(&filepath) else {
            return Ok(Change { filepath, ..candidate });
        };

        if candidate.search_block.trim().is_empty() {
            if self.strategy.rewrites_whole_file() {
                return Ok(Change::new(filepath, "", candidate.replace_block));
            }
            return Err(ReconcileError::MissingSearch {
                filepath,
                replace_block: candidate.replace_block,
            });
        }

        let best = find_best_match(
            &candidate.search_block,
            &snapshot.content,
            &self.config.matcher,
        );
        if !best.is_found() || best.score <= self.config.matcher.min_score {
            return Err(ReconcileError::NoMatch {
                filepath,
                best_score: best.score,
                search_block: candidate.search_block,
            });
        }

        tracing::debug!("matched edit in {} with score {:.2}", filepath, best.score);
        let replace_block = align_line_ending(&best.block, candidate.replace_block);
        Ok(Change::new(filepath, best.block, replace_block))
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

/// Matched blocks are joined without a trailing newline; drop the one the
/// replacement carries so applying the change does not add a blank line.
fn align_line_ending(block: &str, mut replace_block: String) -> String {
    if !block.ends_with('\n') && replace_block.ends_with('\n') {
        replace_block.pop();
    }
    replace_block
}

/// Reconciles a model response against `files` in one call.
pub fn get_fixed_search_replace(
    files: &FileSet,
    response: &str,
    config: &ReconcileConfig,
) -> Reconciliation {
    Reconciler::new(config.clone()).reconcile(files, response)
}
