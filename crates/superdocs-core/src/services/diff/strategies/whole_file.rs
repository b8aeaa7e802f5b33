use crate::services::diff::markdown::extract_file_blocks;
use crate::services::diff::types::{Change, ToolArgs};

use super::DiffStrategy;

/// Every fenced block named by the line above it is the complete new content
/// of that file.
#[derive(Debug, Default)]
pub struct WholeFileStrategy;

impl WholeFileStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl DiffStrategy for WholeFileStrategy {
    fn name(&self) -> &'static str {
        "whole_file"
    }

    fn get_tool_description(&self, args: &ToolArgs) -> String {
        format!(
            r#"# Editing files

Return the complete new content of every file you change. Put the file path
(relative to {}) in square brackets on its own line, directly followed by a
fenced code block with the full file:

[path/to/file]
```
full file content
```

Never elide unchanged parts of a file."#,
            args.cwd
        )
    }

    fn extract_changes(&self, response: &str) -> Vec<Change> {
        extract_file_blocks(response)
            .into_iter()
            .map(|block| {
                let mut content = block.code;
                content.push('\n');
                Change::new(block.filepath, "", content)
            })
            .filter(|change| !change.is_noop())
            .collect()
    }

    fn rewrites_whole_file(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_each_named_block_is_a_full_rewrite() {
        let response = "[src/app.ts]\n```ts\nexport const a = 2;\n```\n\n[src/empty.ts]\n```\n```\n";
        let changes = WholeFileStrategy::new().extract_changes(response);

        assert_eq!(changes, vec![Change::new("src/app.ts", "", "export const a = 2;\n")]);
        assert!(changes[0].creates_file());
    }
}
