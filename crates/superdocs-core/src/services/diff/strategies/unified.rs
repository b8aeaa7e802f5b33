use crate::services::diff::hunks::parse_diff;
use crate::services::diff::markdown::extract_code_blocks;
use crate::services::diff::types::{Change, ToolArgs};
use std::fmt;

use super::DiffStrategy;

#[derive(Default)]
pub struct UnifiedDiffStrategy;

impl UnifiedDiffStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl fmt::Debug for UnifiedDiffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnifiedDiffStrategy").finish()
    }
}

impl DiffStrategy for UnifiedDiffStrategy {
    fn name(&self) -> &'static str {
        "unified"
    }

    fn get_tool_description(&self, args: &ToolArgs) -> String {
        format!(
            r#"# Editing files

Describe every edit as a unified diff inside a ```diff fenced block.

1. Start each file with headers:
    ```
    --- path/to/original/file
    +++ path/to/modified/file
    ```
    - Paths are relative to {}
    - Use /dev/null as the original path for a new file

2. For each change section:
    - Begin with a "@@ ... @@" separator line without line numbers
    - Include 2-3 lines of unchanged context before and after the change
    - Mark removed lines with "-" and added lines with "+"
    - Start unchanged context lines with a single space
    - Preserve exact indentation

3. Keep related modifications in the same hunk; when changing a function,
   include the whole function."#,
            args.cwd
        )
    }

    fn extract_changes(&self, response: &str) -> Vec<Change> {
        let mut blocks = extract_code_blocks(response, "");
        if blocks.is_empty() {
            blocks.push(response.to_string());
        }

        blocks
            .iter()
            .flat_map(|block| parse_diff(block))
            .filter(|change| {
                let keep = !change.is_noop();
                if !keep {
                    tracing::debug!("dropping empty hunk for {:?}", change.filepath);
                }
                keep
            })
            .collect()
    }
}
