use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 複数のスニペットを一つのファイルにまとめる際の区切り
pub const SNIPPET_SEPARATOR: &str = "\n----\n";

/// Block returned for an empty query. It never occurs in real source text, so
/// searching for it is the same as searching for nothing.
pub const UNMATCHABLE_BLOCK: &str = "SUPERDOCSTHISSTRINGWILLNEVEREVERBEFOUND";

/// エディタから送られてくるコード片
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub filepath: String,
    pub code: String,
    #[serde(default)]
    pub language: String,
}

/// リクエスト時点でのファイルの内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub filepath: String,
    pub content: String,
}

/// Ordered set of snapshots for one request. Order is significant: it is the
/// tie-break order used by filename resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSet {
    files: Vec<FileSnapshot>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the snapshot for `filepath`, keeping its first position.
    pub fn insert(&mut self, filepath: impl Into<String>, content: impl Into<String>) {
        let filepath = filepath.into();
        let content = content.into();
        match self.files.iter_mut().find(|f| f.filepath == filepath) {
            Some(existing) => existing.content = content,
            None => self.files.push(FileSnapshot { filepath, content }),
        }
    }

    /// Groups snippets by filepath in first-seen order and joins the pieces of
    /// each file with [`SNIPPET_SEPARATOR`].
    pub fn from_snippets(snippets: &[Snippet]) -> Self {
        let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
        for snippet in snippets {
            match grouped.iter_mut().find(|(path, _)| *path == snippet.filepath) {
                Some((_, chunks)) => chunks.push(&snippet.code),
                None => grouped.push((&snippet.filepath, vec![&snippet.code])),
            }
        }

        let mut set = Self::new();
        for (filepath, chunks) in grouped {
            set.insert(filepath, chunks.join(SNIPPET_SEPARATOR));
        }
        set
    }

    pub fn get(&self, filepath: &str) -> Option<&FileSnapshot> {
        self.files.iter().find(|f| f.filepath == filepath)
    }

    pub fn filepaths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.filepath.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSnapshot> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (filepath, content) in iter {
            set.insert(filepath, content);
        }
        set
    }
}

/// 差分テキスト中の一つのハンク（ファイル名は未解決のまま）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub filepath: String,
    pub text: String,
}

/// A search/replace pair. Once reconciled against a snapshot, `search_block`
/// occurs verbatim in that snapshot's content. An empty `search_block` means
/// `replace_block` is the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    pub filepath: String,
    pub search_block: String,
    pub replace_block: String,
}

impl Change {
    pub fn new(
        filepath: impl Into<String>,
        search_block: impl Into<String>,
        replace_block: impl Into<String>,
    ) -> Self {
        Self {
            filepath: filepath.into(),
            search_block: search_block.into(),
            replace_block: replace_block.into(),
        }
    }

    /// True when the change carries nothing to apply.
    pub fn is_noop(&self) -> bool {
        self.filepath.trim().is_empty()
            || (self.search_block.trim().is_empty() && self.replace_block.trim().is_empty())
    }

    pub fn creates_file(&self) -> bool {
        self.search_block.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub block: String,
    pub score: f64,
}

impl Match {
    /// Score of "nothing matched yet". Anything at or below it is not a match.
    pub const NO_MATCH_SCORE: f64 = -1.0;

    pub fn none() -> Self {
        Self {
            block: String::new(),
            score: Self::NO_MATCH_SCORE,
        }
    }

    pub fn insertion(score: f64) -> Self {
        Self {
            block: UNMATCHABLE_BLOCK.to_string(),
            score,
        }
    }

    pub fn is_insertion(&self) -> bool {
        self.block == UNMATCHABLE_BLOCK
    }

    pub fn is_found(&self) -> bool {
        self.score > Self::NO_MATCH_SCORE && !self.is_insertion()
    }
}

/// Why an edit could not be turned into an applicable change.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReconcileError {
    #[error("No sufficiently similar block found in {filepath} (best score {best_score:.2})")]
    NoMatch {
        filepath: String,
        best_score: f64,
        search_block: String,
    },
    #[error("Edit to existing file {filepath} has no search text to anchor it")]
    MissingSearch {
        filepath: String,
        replace_block: String,
    },
}

impl ReconcileError {
    pub fn filepath(&self) -> &str {
        match self {
            Self::NoMatch { filepath, .. } | Self::MissingSearch { filepath, .. } => filepath,
        }
    }
}

/// Result of reconciling one model response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub changes: Vec<Change>,
    pub failures: Vec<ReconcileError>,
}

pub struct ToolArgs {
    pub cwd: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_snippets_joins_chunks_in_first_seen_order() {
        let snippets = vec![
            Snippet {
                filepath: "src/b.rs".into(),
                code: "fn b() {}".into(),
                language: "rust".into(),
            },
            Snippet {
                filepath: "src/a.rs".into(),
                code: "fn a() {}".into(),
                language: "rust".into(),
            },
            Snippet {
                filepath: "src/b.rs".into(),
                code: "fn c() {}".into(),
                language: "rust".into(),
            },
        ];

        let files = FileSet::from_snippets(&snippets);

        assert_eq!(files.filepaths().collect::<Vec<_>>(), vec!["src/b.rs", "src/a.rs"]);
        assert_eq!(
            files.get("src/b.rs").map(|f| f.content.as_str()),
            Some("fn b() {}\n----\nfn c() {}")
        );
    }

    #[test]
    fn test_insert_replaces_content_in_place() {
        let mut files: FileSet = [("a.py", "1"), ("b.py", "2")].into_iter().collect();
        files.insert("a.py", "3");

        assert_eq!(files.len(), 2);
        assert_eq!(files.get("a.py").map(|f| f.content.as_str()), Some("3"));
        assert_eq!(files.filepaths().next(), Some("a.py"));
    }

    #[test]
    fn test_change_noop_detection() {
        let test_cases = vec![
            (Change::new("", "a\n", "b\n"), true),
            (Change::new("a.py", " \n", "\n"), true),
            (Change::new("a.py", "", "print(1)\n"), false),
            (Change::new("a.py", "x = 1\n", ""), false),
        ];

        for (change, expected) in test_cases {
            assert_eq!(change.is_noop(), expected, "Failed for change: {:?}", change);
        }
    }

    #[test]
    fn test_match_sentinels() {
        assert!(!Match::none().is_found());
        assert!(Match::insertion(7.0).is_insertion());
        assert!(!Match::insertion(7.0).is_found());
        assert!(Match {
            block: "x".into(),
            score: 0.0
        }
        .is_found());
    }

    #[test]
    fn test_change_serializes_camel_case() {
        let json = serde_json::to_value(Change::new("a.py", "x", "y")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"filepath": "a.py", "searchBlock": "x", "replaceBlock": "y"})
        );
    }
}
