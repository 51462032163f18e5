//! Code normalization.
//!
//! Parenthetical groups on a drawing carry per-occurrence quantities
//! (`U3(1)` is "one U3"), not identity, so they are stripped from the
//! output form. What remains is whitespace-collapsed and cleaned of
//! trailing punctuation left behind by the stripping (`CM2(` → `CM2`).
//!
//! `normalize` is total and idempotent, and never lengthens its input.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_TRAILING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ .\-(]+$").unwrap());

/// Canonicalize a validated code string.
///
/// Steps, in order: remove every non-nested `(...)` group, collapse
/// whitespace runs to a single space and trim, strip any trailing run of
/// space, `.`, `-` or `(`.
pub fn normalize_code(code: &str) -> String {
    let s = RE_PARENS.replace_all(code, "");
    let s = RE_WHITESPACE.replace_all(&s, " ");
    let s = s.trim();
    RE_TRAILING.replace(s, "").to_string()
}
