use super::config::MatchConfig;
use super::similarity::{collapse, line_relevant, ratio};
use super::types::Match;

/// Slack on the pruning bound for float rounding in the score sum.
const SCORE_EPSILON: f64 = 1e-9;

/// Candidate `(start, end)` line windows, `end` inclusive, for a query of
/// `query_len` lines in a document of `doc_len` lines. Every window's length
/// is within `tolerance` lines of the query's.
pub fn candidate_windows(
    query_len: usize,
    doc_len: usize,
    tolerance: usize,
) -> impl Iterator<Item = (usize, usize)> {
    (0..doc_len).flat_map(move |start| {
        let min_end = doc_len.min(start.max((start + query_len).saturating_sub(tolerance)));
        let max_end = doc_len.min(start + query_len + tolerance);
        (min_end..max_end).map(move |end| (start, end))
    })
}

/// Finds the run of lines in `original` that best corresponds to `query`.
///
/// Each window is scored as the similarity of the whole block (whitespace
/// collapsed, blank and comment lines dropped) plus the weighted similarity of
/// its first and last raw lines against the query's. The strictly best score
/// wins, so earlier windows win ties. The returned block is always `original`
/// lines joined by `\n`, i.e. a verbatim substring of `original`.
///
/// Only blank lines are stripped from the ends of the query; the indentation
/// of its first line is kept. An empty query yields [`Match::insertion`]. If
/// no window can be formed, the result keeps [`Match::NO_MATCH_SCORE`].
pub fn find_best_match(query: &str, original: &str, config: &MatchConfig) -> Match {
    let query_lines = trim_blank_lines(query);
    let (Some(first_query_line), Some(last_query_line)) =
        (query_lines.first().copied(), query_lines.last().copied())
    else {
        return Match::insertion(config.max_score());
    };

    let original_lines: Vec<&str> = original.split('\n').collect();
    let collapsed_query = collapse(query_lines.iter().copied());

    let relevant_lines: Vec<Option<&str>> = original_lines
        .iter()
        .map(|line| line_relevant(line).then(|| line.trim()))
        .collect();
    let first_line_similarity: Vec<f64> = original_lines
        .iter()
        .map(|line| ratio(line, first_query_line))
        .collect();
    let last_line_similarity: Vec<f64> = original_lines
        .iter()
        .map(|line| ratio(line, last_query_line))
        .collect();

    // Highest endpoint score first; a window's body adds at most body_weight.
    let mut windows: Vec<(f64, usize, usize)> = candidate_windows(
        query_lines.len(),
        original_lines.len(),
        config.window_tolerance,
    )
    .map(|(start, end)| {
        let endpoints = config.endpoint_weight * first_line_similarity[start]
            + config.endpoint_weight * last_line_similarity[end];
        (endpoints, start, end)
    })
    .collect();
    windows.sort_by(|a, b| b.0.total_cmp(&a.0).then((a.1, a.2).cmp(&(b.1, b.2))));

    let body_bound = config.body_weight.max(0.0);
    let mut best = Match::none();
    let mut best_window = (usize::MAX, usize::MAX);
    for (endpoints, start, end) in windows {
        if endpoints + body_bound + SCORE_EPSILON < best.score {
            break;
        }

        let window = relevant_lines[start..=end]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let score = config.body_weight * ratio(&window, &collapsed_query) + endpoints;

        if score > best.score || (score == best.score && (start, end) < best_window) {
            best = Match {
                block: original_lines[start..=end].join("\n"),
                score,
            };
            best_window = (start, end);
        }
    }

    best
}

/// Query lines without the whitespace-only lines at either end.
fn trim_blank_lines(query: &str) -> Vec<&str> {
    let lines: Vec<&str> = query.lines().collect();
    let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return Vec::new();
    };
    let last = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(first);
    lines[first..=last].to_vec()
}
