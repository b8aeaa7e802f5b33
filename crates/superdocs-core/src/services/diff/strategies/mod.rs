mod search_replace;
mod unified;
mod whole_file;

pub use search_replace::SearchReplaceDiffStrategy;
pub use unified::UnifiedDiffStrategy;
pub use whole_file::WholeFileStrategy;

use std::fmt::Debug;

use crate::services::diff::config::EditFormat;
use crate::services::diff::types::{Change, ToolArgs};

/// How edits are written in a model response.
pub trait DiffStrategy: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Format instructions to give the model.
    fn get_tool_description(&self, args: &ToolArgs) -> String;

    /// Candidate changes in document order, with unresolved paths and
    /// unmatched search text. No-op candidates are already dropped.
    fn extract_changes(&self, response: &str) -> Vec<Change>;

    /// Whether an empty search block against an existing file means
    /// "replace the whole file" rather than a missing anchor.
    fn rewrites_whole_file(&self) -> bool {
        false
    }
}

pub fn get_diff_strategy(format: EditFormat) -> Box<dyn DiffStrategy> {
    match format {
        EditFormat::UnifiedDiff => Box::new(UnifiedDiffStrategy::new()),
        EditFormat::SearchReplace => Box::new(SearchReplaceDiffStrategy::new()),
        EditFormat::WholeFile => Box::new(WholeFileStrategy::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_diff_strategy() {
        let test_cases = vec![
            (EditFormat::UnifiedDiff, "unified", false),
            (EditFormat::SearchReplace, "search_replace", false),
            (EditFormat::WholeFile, "whole_file", true),
        ];

        for (format, name, whole_file) in test_cases {
            let strategy = get_diff_strategy(format);
            assert_eq!(strategy.name(), name);
            assert_eq!(strategy.rewrites_whole_file(), whole_file);
            let description = strategy.get_tool_description(&ToolArgs {
                cwd: "/workspace".into(),
            });
            assert!(description.contains("/workspace"), "{} description", name);
        }
    }
}
