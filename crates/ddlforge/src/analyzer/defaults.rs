//! Best-effort parsing of engine-reported textual column defaults.
//!
//! Engines hand back defaults as free text in their own spelling. This parser
//! recognizes the handful of shapes that actually occur (numeric literals,
//! quoted strings, casts, no-argument function calls, keywords) and falls
//! back to an opaque string literal for everything else. It never fails.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{Expression, Scalar};

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+\.\d+(?:[eE][+-]?\d+)?$").unwrap());
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'((?:[^']|'')*)'$").unwrap());
static CAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^'((?:[^']|'')*)'::[A-Za-z_][A-Za-z0-9_ ]*$").unwrap());
static CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([a-z_][a-z0-9_]*)\(\)$").unwrap());
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Uppercase no-argument calls, as reported by the H2 driver.
static UPPER_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z_][A-Z0-9_]*)\(\)$").unwrap());

fn unescape(quoted: &str) -> String {
    quoted.replace("''", "'")
}

/// Parses an engine-reported default into an expression; unrecognized text
/// becomes an opaque string literal.
#[must_use]
pub fn parse(text: &str) -> Expression {
    let trimmed = text.trim();
    match trimmed.to_ascii_uppercase().as_str() {
        "NULL" => return Expression::Scalar(Scalar::Null),
        "TRUE" => return Expression::boolean(true),
        "FALSE" => return Expression::boolean(false),
        _ => {}
    }
    if INTEGER.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<i64>() {
            return Expression::integer(value);
        }
    }
    if FLOAT.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<f64>() {
            return Expression::float(value);
        }
    }
    if let Some(captures) = CAST.captures(trimmed) {
        return Expression::text(unescape(&captures[1]));
    }
    if let Some(captures) = QUOTED.captures(trimmed) {
        return Expression::text(unescape(&captures[1]));
    }
    if let Some(captures) = CALL.captures(trimmed) {
        return Expression::call(captures[1].to_string(), Vec::new());
    }
    if WORD.is_match(trimmed) {
        return Expression::keyword(trimmed.to_ascii_lowercase());
    }
    Expression::text(trimmed)
}

/// Like [`parse`] but also recognizing uppercase function-call tokens, which
/// the H2 driver reports where others use lowercase.
#[must_use]
pub fn parse_with_upper_calls(text: &str) -> Expression {
    let trimmed = text.trim();
    if let Some(captures) = UPPER_CALL.captures(trimmed) {
        return Expression::call(captures[1].to_ascii_lowercase(), Vec::new());
    }
    parse(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_literals() {
        assert_eq!(parse("0"), Expression::integer(0));
        assert_eq!(parse("-42"), Expression::integer(-42));
        assert_eq!(parse("1.5"), Expression::float(1.5));
    }

    #[test]
    fn test_quoted_strings_and_casts() {
        assert_eq!(parse("'hello'"), Expression::text("hello"));
        assert_eq!(parse("'it''s'"), Expression::text("it's"));
        assert_eq!(parse("'draft'::character varying"), Expression::text("draft"));
    }

    #[test]
    fn test_function_calls_and_keywords() {
        assert_eq!(parse("now()"), Expression::call("now", vec![]));
        assert_eq!(
            parse("CURRENT_TIMESTAMP"),
            Expression::keyword("current_timestamp")
        );
        assert_eq!(parse("NULL"), Expression::Scalar(Scalar::Null));
    }

    #[test]
    fn test_unrecognized_text_becomes_opaque_literal() {
        assert_eq!(
            parse("nextval('users_id_seq'::regclass)"),
            Expression::text("nextval('users_id_seq'::regclass)")
        );
    }

    #[test]
    fn test_upper_call_variant() {
        assert_eq!(parse("NOW()"), Expression::text("NOW()"));
        assert_eq!(parse_with_upper_calls("NOW()"), Expression::call("now", vec![]));
    }
}
