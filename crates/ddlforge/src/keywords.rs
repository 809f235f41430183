//! Keyword and argument-list formatting helpers.
//!
//! Symbolic names throughout the model use lowercase kebab/underscore form
//! (`"primary-key"`, `"current_timestamp"`); these helpers turn them into SQL
//! keyword text at render time.

/// Renders a symbolic name as an SQL keyword: upper-cased, with dashes
/// replaced by spaces (`"double-precision"` becomes `DOUBLE PRECISION`).
#[must_use]
pub fn as_keyword(name: &str) -> String {
    name.to_uppercase().replace('-', " ")
}

/// Renders a parenthesized, comma-joined argument list.
///
/// Returns `()` for an empty slice; composite statements rely on that for
/// element-less tables.
#[must_use]
pub fn as_list<S: AsRef<str>>(items: &[S]) -> String {
    let joined = items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    format!("({joined})")
}

/// Joins the non-empty parts of a clause with single spaces.
#[must_use]
pub fn join_parts<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_keyword_upcases_and_replaces_dashes() {
        assert_eq!(as_keyword("integer"), "INTEGER");
        assert_eq!(as_keyword("double-precision"), "DOUBLE PRECISION");
        assert_eq!(as_keyword("current-timestamp"), "CURRENT TIMESTAMP");
        // Underscores pass through untouched.
        assert_eq!(as_keyword("current_timestamp"), "CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_as_list() {
        assert_eq!(as_list::<&str>(&[]), "()");
        assert_eq!(as_list(&["a"]), "(a)");
        assert_eq!(as_list(&["a", "b", "c"]), "(a, b, c)");
    }

    #[test]
    fn test_join_parts_skips_empty() {
        assert_eq!(join_parts(&["\"foo\"", "", "NOT NULL"]), "\"foo\" NOT NULL");
    }
}
