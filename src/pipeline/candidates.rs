//! Candidate generation and overlap disambiguation.
//!
//! A span's raw text rarely arrives as one clean label: extraction merges
//! neighbouring labels into a single fragment (`"S1N S3R"`), drops the
//! separator entirely (`"TEU3"`), or glues parenthesised labels together
//! (`"TE(1)U3(2)"`). Generation is permissive: it produces every substring
//! that *might* be a code and lets the grammar filter, with one exception
//! noted on [`generate`]. Disambiguation then removes concatenated
//! candidates that are fully explained by their parts, so one physical
//! label never yields two output rows.

use once_cell::sync::Lazy;
use regex::Regex;

use super::grammar::CodeGrammar;

/// Letters that can begin a code in this grammar. A concatenation split is
/// only ever inserted in front of one of these.
const CODE_INITIALS: &[char] = &['A', 'B', 'S', 'C', 'I', 'M', 'T', 'U', 'N'];

/// Character-class scan recovering individually spaced labels inside one
/// fragment. Covers the label alphabet plus the qualifier punctuation seen
/// on drawings (fractions, inch marks, chained dots).
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[A-Z0-9()\-/.'"″]+"#).unwrap());

/// Generate every candidate substring of one span's text.
///
/// Order matters downstream (output preserves first-generated order), so the
/// result is a deduplicated list, not a set:
/// 1. the whole trimmed text;
/// 2. tokens from the character-class scan;
/// 3. splits at a `)` immediately followed by a letter (`TE(1)U3(2)`);
/// 4. splits before a code-initial letter, for pieces with no separator at
///    all (`TEU3` → `TE`,`U3`; `S1NS3R` → `S1N`,`S3R`).
///
/// A concatenation split is admitted only when every part it produced is
/// grammar-valid. Code initials occur mid-label too (`CM3(1)` cuts into
/// `C` + `M3(1)`); admitting a half-valid split would leak the suffix as a
/// second code for one physical label.
pub fn generate(span_text: &str, grammar: &CodeGrammar) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    push_unique(&mut out, span_text);

    for tok in TOKEN_RE.find_iter(span_text) {
        push_unique(&mut out, tok.as_str());
    }

    // Splits are applied to everything generated so far, in order.
    let mut i = 0;
    while i < out.len() {
        let piece = out[i].clone();
        for part in split_after_parens(&piece) {
            push_unique(&mut out, part);
        }
        i += 1;
    }

    let mut i = 0;
    while i < out.len() {
        let piece = out[i].clone();
        let parts = split_concatenated(&piece);
        if !parts.is_empty() && parts.iter().all(|p| grammar.looks_like_code(p)) {
            for part in parts {
                push_unique(&mut out, &part);
            }
        }
        i += 1;
    }

    out
}

fn push_unique(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() && !out.iter().any(|c| c == s) {
        out.push(s.to_string());
    }
}

/// Split at every `)` that is immediately followed by a letter.
///
/// Returns the pieces, or an empty vec when no such boundary exists.
fn split_after_parens(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut cuts = Vec::new();
    for i in 0..bytes.len().saturating_sub(1) {
        if bytes[i] == b')' && bytes[i + 1].is_ascii_uppercase() {
            cuts.push(i + 1);
        }
    }
    if cuts.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(&s[start..cut]);
        start = cut;
    }
    parts.push(&s[start..]);
    parts
}

/// Decompose a separator-free piece at implied code boundaries.
///
/// A cut goes in front of a code-initial letter that starts a new label,
/// recognised by the character after it: a digit or an opening parenthesis
/// (`TEU3` cuts before `U`; `S1NS3R` cuts before the second `S` but not
/// before the `N`, which is a suffix letter here). Pieces that already carry
/// an explicit separator are left alone — those are chained codes the
/// grammar models as one unit.
///
/// Returns an empty vec when the piece does not decompose.
fn split_concatenated(s: &str) -> Vec<String> {
    if s.contains([' ', '.', '-', '/']) {
        return Vec::new();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut cuts = Vec::new();
    for i in 1..chars.len() {
        if CODE_INITIALS.contains(&chars[i]) {
            let followed = chars
                .get(i + 1)
                .is_some_and(|c| c.is_ascii_digit() || *c == '(');
            if followed {
                cuts.push(i);
            }
        }
    }
    if cuts.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        parts.push(chars[start..cut].iter().collect::<String>());
        start = cut;
    }
    parts.push(chars[start..].iter().collect::<String>());
    parts
}

/// Decompose a candidate for disambiguation purposes.
///
/// Splits on explicit separators (space, dot, hyphen), paren boundaries and
/// implied concatenation boundaries, in that order. `None` when the
/// candidate does not break into two or more pieces.
fn decompose(s: &str) -> Option<Vec<String>> {
    let mut parts: Vec<String> = Vec::new();
    for sep_piece in s.split([' ', '.', '-']) {
        let sep_piece = sep_piece.trim();
        if sep_piece.is_empty() {
            continue;
        }
        let paren_parts = split_after_parens(sep_piece);
        let paren_parts: Vec<String> = if paren_parts.is_empty() {
            vec![sep_piece.to_string()]
        } else {
            paren_parts.into_iter().map(str::to_string).collect()
        };
        for p in paren_parts {
            let concat = split_concatenated(&p);
            if concat.is_empty() {
                parts.push(p);
            } else {
                parts.extend(concat);
            }
        }
    }
    if parts.len() >= 2 {
        Some(parts)
    } else {
        None
    }
}

/// Resolve overlap between concatenated candidates and their parts.
///
/// Every grammar-valid candidate is classified as a *base* (no further
/// decomposition into grammar-valid pieces) or a *compound*. A compound is
/// dropped iff every one of its parts is independently present as a base —
/// it is then redundant bookkeeping for labels already counted. Compounds
/// with at least one part missing from the base set are irreducible units
/// (chained codes like `CM3-CM3(1)`) and are kept whole.
///
/// Input order is preserved in the output.
pub fn disambiguate(valid: &[String], grammar: &CodeGrammar) -> Vec<String> {
    let compounds: Vec<Option<Vec<String>>> = valid
        .iter()
        .map(|c| {
            decompose(c).filter(|parts| parts.iter().all(|p| grammar.looks_like_code(p)))
        })
        .collect();

    let bases: Vec<&String> = valid
        .iter()
        .zip(&compounds)
        .filter(|(_, parts)| parts.is_none())
        .map(|(c, _)| c)
        .collect();

    valid
        .iter()
        .zip(&compounds)
        .filter(|(_, parts)| match parts {
            None => true,
            Some(parts) => !parts.iter().all(|p| bases.iter().any(|b| *b == p)),
        })
        .map(|(c, _)| c.clone())
        .collect()
}
