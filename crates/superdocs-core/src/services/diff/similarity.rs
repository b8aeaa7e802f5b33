use rapidfuzz::fuzz;

/// Normalized indel similarity in `[0, 1]`: `2 * lcs / total` chars.
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    fuzz::ratio(a.chars(), b.chars())
}

/// Blank lines and `#` / `//` comment lines carry no weight when comparing
/// blocks. The check runs on the trimmed line, so indented comments are
/// dropped too, and so are indented lines that merely start with `#` such as
/// Rust attributes or C preprocessor directives.
pub fn line_relevant(line: &str) -> bool {
    let trimmed = line.trim();
    !(trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//"))
}

/// Drops irrelevant lines and joins the rest, trimmed, with single spaces.
pub fn collapse<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines
        .into_iter()
        .filter(|line| line_relevant(line))
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}
