const FENCE: &str = "```";

/// A fenced block that carries a complete file, named by the line above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlock {
    pub filepath: String,
    pub code: String,
}

struct Fenced<'a> {
    /// Byte offset of the opening fence.
    start: usize,
    info: &'a str,
    body: &'a str,
}

/// Scans fenced blocks in document order. The first fence after an opening
/// fence closes it, even if it belongs to a sample nested inside the block.
/// Unterminated trailing blocks are dropped.
fn fenced_blocks<'a>(markdown: &'a str, language: &str) -> Vec<Fenced<'a>> {
    let opening = format!("{FENCE}{language}");
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = markdown[cursor..].find(&opening) {
        let start = cursor + offset;
        let after_open = start + opening.len();
        let Some(close_offset) = markdown[after_open..].find(FENCE) else {
            break;
        };
        let end = after_open + close_offset;
        let raw = &markdown[after_open..end];

        let (info, body) = split_info_string(raw);
        blocks.push(Fenced {
            start,
            info: info.trim(),
            body,
        });
        cursor = end + FENCE.len();
    }

    blocks
}

/// Separates the language tag left on the opening line from the body. A bare
/// word directly after the fence is a tag; anything else is content.
fn split_info_string(raw: &str) -> (&str, &str) {
    let (first, rest) = match raw.find('\n') {
        Some(idx) => (&raw[..idx], &raw[idx + 1..]),
        None => return ("", raw),
    };
    let is_tag = first
        .trim_end()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.' | '#'));
    if is_tag {
        (first, rest)
    } else {
        ("", raw)
    }
}

fn trim_body(body: &str) -> &str {
    let start = body
        .char_indices()
        .take_while(|(_, c)| c.is_whitespace())
        .filter(|(_, c)| *c == '\n')
        .map(|(i, _)| i + 1)
        .last()
        .unwrap_or(0);
    body[start..].trim_end()
}

/// Returns the bodies of fenced code blocks whose opening fence is followed by
/// `language` (empty matches any block).
///
/// Nested fences are not recognised: a literal ```` ``` ```` inside a code
/// sample ends the block early. Blocks are trimmed of leading blank lines and
/// trailing whitespace; indentation of the first code line is kept.
pub fn extract_code_blocks(markdown: &str, language: &str) -> Vec<String> {
    fenced_blocks(markdown, language)
        .into_iter()
        .map(|block| trim_body(block.body).to_string())
        .collect()
}

/// Extracts whole-file blocks: a fenced block whose preceding non-blank line
/// names a file, e.g. `[src/app.ts]`, `src/app.ts:` or `### src/app.ts`.
pub fn extract_file_blocks(markdown: &str) -> Vec<FileBlock> {
    fenced_blocks(markdown, "")
        .into_iter()
        .filter(|block| block.info != "diff")
        .filter_map(|block| {
            let header = markdown[..block.start]
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())?;
            let filepath = filepath_from_header(header)?;
            Some(FileBlock {
                filepath,
                code: trim_body(block.body).to_string(),
            })
        })
        .collect()
}

pub(crate) fn filepath_from_header(header: &str) -> Option<String> {
    let mut name = header.trim();
    name = name.trim_start_matches('#').trim();
    for prefix in ["File:", "file:", "Filepath:", "filepath:", "Path:", "path:"] {
        if let Some(rest) = name.strip_prefix(prefix) {
            name = rest.trim();
        }
    }
    let name = name
        .trim_end_matches(':')
        .trim_matches(|c| matches!(c, '[' | ']' | '`' | '*' | '"' | '\''))
        .trim();

    let looks_like_path = !name.is_empty()
        && !name.contains(char::is_whitespace)
        && (name.contains('.') || name.contains('/'))
        && !name.ends_with(FENCE);
    looks_like_path.then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_code_blocks_any_language() {
        let md = "Here:\n```diff\n--- a/x.py\n+++ x.py\n```\ntext\n```\nplain\n```\n";
        assert_eq!(
            extract_code_blocks(md, ""),
            vec!["--- a/x.py\n+++ x.py".to_string(), "plain".to_string()]
        );
    }

    #[test]
    fn test_extract_code_blocks_language_filter() {
        let md = "```python\nx = 1\n```\n```diff\n-x = 1\n+x = 2\n```";
        assert_eq!(extract_code_blocks(md, "diff"), vec!["-x = 1\n+x = 2".to_string()]);
    }

    #[test]
    fn test_unterminated_block_is_dropped() {
        let md = "```\nfirst\n```\n```diff\n-never closed";
        assert_eq!(extract_code_blocks(md, ""), vec!["first".to_string()]);
    }

    #[test]
    fn test_nested_fence_closes_block_early() {
        let md = "```markdown\nexample:\n```rust\nfn main() {}\n```\n```";
        // The inner opening fence terminates the outer block.
        assert_eq!(extract_code_blocks(md, "")[0], "example:");
    }

    #[test]
    fn test_first_line_indentation_is_kept() {
        let md = "```\n\n    indented()\n```";
        assert_eq!(extract_code_blocks(md, ""), vec!["    indented()".to_string()]);
    }

    #[test]
    fn test_extract_file_blocks() {
        let md = concat!(
            "Updated files:\n\n",
            "[src/app.ts]\n```ts\nexport const a = 1;\n```\n",
            "### lib/util.py\n\n```python\ndef f():\n    pass\n```\n",
            "Some prose\n```\nnot a file\n```\n",
        );

        assert_eq!(
            extract_file_blocks(md),
            vec![
                FileBlock {
                    filepath: "src/app.ts".into(),
                    code: "export const a = 1;".into(),
                },
                FileBlock {
                    filepath: "lib/util.py".into(),
                    code: "def f():\n    pass".into(),
                },
            ]
        );
    }

    #[test]
    fn test_filepath_from_header() {
        let test_cases = vec![
            ("[src/app.ts]", Some("src/app.ts")),
            ("`main.rs`:", Some("main.rs")),
            ("File: a/b.py", Some("a/b.py")),
            ("**new/file.txt**", Some("new/file.txt")),
            ("Here is the code", None),
            ("```", None),
        ];

        for (header, expected) in test_cases {
            assert_eq!(
                filepath_from_header(header).as_deref(),
                expected,
                "Failed for header: {}",
                header
            );
        }
    }
}
