use crate::services::diff::markdown::filepath_from_header;
use crate::services::diff::types::{Change, ToolArgs};
use once_cell::sync::Lazy;
use regex::Regex;

use super::DiffStrategy;

/// `path` line, optional opening fence, then a SEARCH/REPLACE block. Five to
/// seven marker characters are accepted.
static SEARCH_REPLACE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^([^\n]+)\n(?:```[^\n]*\n)?<{5,7} ?SEARCH\n([\s\S]*?)\n?={5,7}\n([\s\S]*?)\n?>{5,7} ?REPLACE",
    )
    .unwrap()
});

#[derive(Debug, Default)]
pub struct SearchReplaceDiffStrategy;

impl SearchReplaceDiffStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl DiffStrategy for SearchReplaceDiffStrategy {
    fn name(&self) -> &'static str {
        "search_replace"
    }

    fn get_tool_description(&self, args: &ToolArgs) -> String {
        format!(
            r#"# Editing files

Describe every edit as a search and replace block, preceded by the path of
the file to change (relative to {}).

```
path/to/file
<<<<<<< SEARCH
[content to find including whitespace]
=======
[new content to replace with]
>>>>>>> REPLACE
```

- The SEARCH section should match existing content as closely as possible,
  including indentation.
- Leave the SEARCH section empty to create a new file.
- Use one block per location; do not repeat unchanged code."#,
            args.cwd
        )
    }

    fn extract_changes(&self, response: &str) -> Vec<Change> {
        SEARCH_REPLACE_BLOCK
            .captures_iter(response)
            .filter_map(|captures| {
                let header = captures.get(1)?.as_str();
                let Some(filepath) = filepath_from_header(header) else {
                    tracing::debug!("no filepath in header {:?}, skipping block", header);
                    return None;
                };
                Some(Change::new(
                    filepath,
                    captures.get(2).map_or("", |m| m.as_str()),
                    captures.get(3).map_or("", |m| m.as_str()),
                ))
            })
            .filter(|change| !change.is_noop())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_blocks_with_and_without_fence() {
        let response = r#"First change:

src/app.ts
```ts
<<<<<<< SEARCH
const a = 1;
=======
const a = 2;
>>>>>>> REPLACE
```

```
lib/util.py
<<<<<SEARCH
def f():
    pass
=====
def f():
    return 1
>>>>>REPLACE
```
"#;

        let changes = SearchReplaceDiffStrategy::new().extract_changes(response);
        assert_eq!(
            changes,
            vec![
                Change::new("src/app.ts", "const a = 1;", "const a = 2;"),
                Change::new("lib/util.py", "def f():\n    pass", "def f():\n    return 1"),
            ]
        );
    }

    #[test]
    fn test_empty_search_creates_file() {
        let response = "new/file.txt\n<<<<<<< SEARCH\n=======\nhello\n>>>>>>> REPLACE\n";
        let changes = SearchReplaceDiffStrategy::new().extract_changes(response);
        assert_eq!(changes, vec![Change::new("new/file.txt", "", "hello")]);
    }

    #[test]
    fn test_block_without_filepath_is_skipped() {
        let response = "Replace this:\n<<<<<<< SEARCH\na\n=======\nb\n>>>>>>> REPLACE\n";
        assert!(SearchReplaceDiffStrategy::new().extract_changes(response).is_empty());
    }
}
