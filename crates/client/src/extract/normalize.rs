//! Whitespace normalization for extracted text.

/// Collapse whitespace while keeping block boundaries.
///
/// Runs of spaces and tabs become one space, runs of line breaks become one
/// newline, each line is trimmed, and blank lines are dropped.
pub fn collapse_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces_and_tabs() {
        assert_eq!(collapse_whitespace("a  \t b   c"), "a b c");
    }

    #[test]
    fn test_collapses_newline_runs() {
        assert_eq!(collapse_whitespace("first\n\n\n   \nsecond\r\n\r\nthird"), "first\nsecond\nthird");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(collapse_whitespace("\n\n  padded line  \n\n"), "padded line");
        assert_eq!(collapse_whitespace(" \n\t\n "), "");
    }
}
