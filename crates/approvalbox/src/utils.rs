//! Text helpers shared by the matchers

/// Normalize line endings
pub fn normalize_lines(data: &str) -> String {
    normalize_line_endings::normalized(data.chars()).collect()
}

/// Compare text the way approved files are compared
///
/// Line endings are normalized and a single trailing newline is not significant,
/// as editors tend to add one when a not-approved file is renamed.
pub fn text_eq(expected: &str, actual: &str) -> bool {
    let expected = normalize_lines(expected);
    let actual = normalize_lines(actual);
    trim_final_newline(&expected) == trim_final_newline(&actual)
}

fn trim_final_newline(data: &str) -> &str {
    data.strip_suffix('\n').unwrap_or(data)
}
