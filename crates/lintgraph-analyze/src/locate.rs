//! Map code quoted by the oracle back to a line of a member body.

/// Shortest snippet allowed to match with whitespace differences ignored.
const PARTIAL_MATCH_MIN_LEN: usize = 10;

/// Find the 1-based line of `body` where `code` appears.
///
/// Tried in order:
/// 1. exact: the trimmed snippet occurs verbatim in the body
/// 2. trimmed: the first non-blank snippet line occurs in a trimmed body line
/// 3. partial: for snippets longer than 10 characters, the first snippet
///    line occurs in a body line once runs of whitespace are collapsed
///
/// Returns `None` for a blank snippet or when nothing matches.
pub fn locate_line(body: &str, code: &str) -> Option<usize> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }

    if let Some(offset) = body.find(code) {
        return Some(body[..offset].matches('\n').count() + 1);
    }

    let needle = code.lines().map(str::trim).find(|l| !l.is_empty())?;
    if let Some(i) = body.lines().position(|line| line.trim().contains(needle)) {
        return Some(i + 1);
    }

    if needle.len() > PARTIAL_MATCH_MIN_LEN {
        let needle = collapse_whitespace(needle);
        if let Some(i) = body
            .lines()
            .position(|line| collapse_whitespace(line).contains(&needle))
        {
            return Some(i + 1);
        }
    }

    None
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "func Add(a, b int) int {\n\tsum := a + b\n\treturn sum\n}";

    #[test]
    fn exact_match() {
        assert_eq!(locate_line(BODY, "return sum"), Some(3));
    }

    #[test]
    fn first_line() {
        assert_eq!(locate_line(BODY, "func Add"), Some(1));
    }

    #[test]
    fn surrounding_whitespace_in_snippet_is_ignored() {
        assert_eq!(locate_line(BODY, "   sum := a + b  \n"), Some(2));
    }

    #[test]
    fn multi_line_snippet_uses_first_line() {
        assert_eq!(locate_line(BODY, "sum := a + b\n    return   sum"), Some(2));
    }

    #[test]
    fn whitespace_differences_need_long_snippet() {
        assert_eq!(locate_line(BODY, "sum  :=  a  +  b"), Some(2));
        assert_eq!(locate_line(BODY, "a  +  b"), None);
    }

    #[test]
    fn blank_or_missing_snippet() {
        assert_eq!(locate_line(BODY, "   "), None);
        assert_eq!(locate_line(BODY, "panic(err)"), None);
    }
}
