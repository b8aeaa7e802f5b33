use super::types::{Change, Hunk};

fn is_hunk_header(line: &str) -> bool {
    line.trim_start().starts_with("@@")
}

/// Splits unified-diff-like text into hunks.
///
/// `---` lines are skipped. A `+++` line or an `@@` header closes the hunk
/// collected so far (only once a filename is known); `+++` also sets the
/// filename for the hunks that follow. The last hunk is always emitted, even
/// when it has no filename, so callers must drop empty results.
pub fn find_hunks(diff: &str) -> Vec<Hunk> {
    let mut hunks = Vec::new();
    let mut current_filename = String::new();
    let mut current_lines = String::new();

    for line in diff.lines() {
        if line.starts_with("---") {
            continue;
        }

        if let Some(filename) = line.trim_start().strip_prefix("+++") {
            if !current_filename.is_empty() {
                hunks.push(Hunk {
                    filepath: current_filename.clone(),
                    text: std::mem::take(&mut current_lines),
                });
            }
            current_filename = filename.trim().to_string();
            current_lines.clear();
        } else if is_hunk_header(line) {
            if !current_filename.is_empty() {
                hunks.push(Hunk {
                    filepath: current_filename.clone(),
                    text: std::mem::take(&mut current_lines),
                });
            }
            current_lines.clear();
        } else {
            current_lines.push_str(line);
            current_lines.push('\n');
        }
    }

    hunks.push(Hunk {
        filepath: current_filename,
        text: current_lines,
    });
    hunks
}

/// Splits a hunk body into its old side (`search_block`) and new side
/// (`replace_block`). Context lines go to both, without their leading space.
pub fn parse_hunk(hunk: &Hunk) -> Change {
    let mut search_block = String::new();
    let mut replace_block = String::new();

    for line in hunk.text.lines() {
        if let Some(removed) = line.strip_prefix('-') {
            search_block.push_str(removed);
            search_block.push('\n');
        } else if let Some(added) = line.strip_prefix('+') {
            replace_block.push_str(added);
            replace_block.push('\n');
        } else {
            let context = line.strip_prefix(' ').unwrap_or(line);
            search_block.push_str(context);
            search_block.push('\n');
            replace_block.push_str(context);
            replace_block.push('\n');
        }
    }

    Change {
        filepath: hunk.filepath.clone(),
        search_block,
        replace_block,
    }
}

/// One candidate change per hunk, in order, including no-op ones.
pub fn parse_diff(diff: &str) -> Vec<Change> {
    find_hunks(diff).iter().map(parse_hunk).collect()
}
