//! Resolution of untyped scalars.
//!
//! Quoted and block scalars, and plain scalars carrying the non-specific
//! tag `!`, are always strings. Plain scalars are resolved in order:
//!
//! | text                                   | value            |
//! |----------------------------------------|------------------|
//! | empty, `null` `Null` `NULL` `~`        | Invalid          |
//! | `true` `True` `TRUE`                   | `true`           |
//! | `false` `False` `FALSE`                | `false`          |
//! | `.nan` `.NaN` `.NAN`                   | NaN              |
//! | `.inf` `.Inf` `.INF`, optionally signed | ±infinity        |
//! | a base-10 integer                      | Int              |
//! | contains `.`, `e` or `E` and is a float | Double           |
//! | anything else                          | String           |
//!
//! The parser reports a node with no content (`key:`, `- `, an empty
//! document) as an empty plain scalar, so empty text is null. Numbers must
//! span the whole text; `12abc` stays a string.

use paramtree::DynamicValue;
use yaml_rust2::parser::Tag;
use yaml_rust2::scanner::TScalarStyle;

/// Resolves a scalar event's text to a dynamic value.
pub fn resolve_scalar(text: &str, style: TScalarStyle, tag: Option<&Tag>) -> DynamicValue {
    if style != TScalarStyle::Plain || tag.is_some_and(is_verbatim) {
        return DynamicValue::String(text.to_owned());
    }
    resolve_plain(text)
}

/// The non-specific tag `!`, however the scanner split it.
fn is_verbatim(tag: &Tag) -> bool {
    matches!(
        (tag.handle.as_str(), tag.suffix.as_str()),
        ("", "!") | ("!", "")
    )
}

/// Resolves the text of an untagged plain scalar.
pub fn resolve_plain(text: &str) -> DynamicValue {
    match text {
        "" | "null" | "Null" | "NULL" | "~" => DynamicValue::Invalid,
        "true" | "True" | "TRUE" => DynamicValue::Bool(true),
        "false" | "False" | "FALSE" => DynamicValue::Bool(false),
        ".nan" | ".NaN" | ".NAN" => DynamicValue::Double(f64::NAN),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => DynamicValue::Double(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => DynamicValue::Double(f64::NEG_INFINITY),
        _ => parse_number(text).unwrap_or_else(|| DynamicValue::String(text.to_owned())),
    }
}

fn parse_number(text: &str) -> Option<DynamicValue> {
    if text.contains(['.', 'e', 'E']) {
        if !looks_numeric(text) {
            return None;
        }
        return text.parse::<f64>().ok().map(DynamicValue::Double);
    }
    text.parse::<i64>().ok().map(DynamicValue::Int)
}

/// Rules out words Rust's float parser accepts but YAML does not, such as
/// `infinity` or `NaN`.
fn looks_numeric(text: &str) -> bool {
    text.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
}
