//! The component-code grammar.
//!
//! A fixed table of rules defines what counts as a code. A candidate string
//! is grammar-valid iff at least one rule matches the *entire* trimmed
//! string — every rule is anchored at both ends, so this is full-string
//! matching, never substring search. Rule order is grouping only; it has no
//! effect on acceptance.
//!
//! The table is an opaque, versionable artifact: it reproduces the
//! acceptance set observed on the source drawing corpus and should be edited
//! as configuration, not refactored. One oddity is kept deliberately —
//! `^CM2\($` matches a truncated label with an unmatched opening parenthesis
//! exactly as it appears in some drawings.
//!
//! [`CodeGrammar`] compiles the table once at construction and is immutable
//! afterwards, so a single instance can be shared across threads and
//! documents behind an `Arc`.

use regex::Regex;

/// The rule table. Rules are grouped by code family:
/// numeric ratings, the `AM`/`BM`/`CM`/`ABN`/`AN`/`BN`/`B` prefix families,
/// the single-letter families (`CE`, `CM`, `CN`, `I`, `M`, `T`, `U`, `N`),
/// chained forms, the `S` family, and two generic catch-alls for label
/// chains and juxtaposed label blocks.
const RULES: &[&str] = &[
    // Numeric ratings and ranges
    r"(?i)^\d{2,3}A\s*[-/]\s*\d{1,2}kA\s*[-/]\s*\d{1,2}[HKT]$",
    r"(?i)^\d{2,3}\s*-\s*\d{1,2}kA\d{1,2}[HKT]$",
    r"^\d{2,3}\s*[- ]\s*\d{2,4}$",
    // Prefix families with fractional/parenthetical qualifiers
    r#"(?i)^[A-Z]{2,4}-\d+\s*\(\s*\d+/\d+\s*(?:"|''|″)?\s*\)$"#,
    r#"(?i)^(?:AM|BM|CM)-\d+\s*\(\s*\d+/\d+\s*(?:"|''|″)?\s*\)\s+ABN-\d+\(\d+\)$"#,
    r"(?i)^ABCN-\s*\d+(?:/\d+)?\s*(?:CA)?\s*\(\s*\d+(?:/\d+)?\s*(?:CA)?\s*\)$",
    r"(?i)^ABN(?:-\s*\d+)?\s*(?:CA)?\s*\(\s*\d+(?:/\d+)?\s*(?:CA)?\s*\)(?:\s*\(\s*\d+\s*\))?$",
    r"^ABN-\d+$",
    r"(?i)^AN-?\s*\d+(?:/\d+)?\s*(?:CA{1,2})?\s*\(\s*\d+(?:/\d+)?\s*(?:CA{1,2})?\s*\)$",
    r"^AN\d+\(\d+\)$",
    r"(?i)^BN-\s*\d+\s*CA{1,2}\s*\(\s*\d+\s*CA{1,2}\s*\)$",
    r"(?i)^B-\s*\d+\s*CA{1,2}$",
    r"^B\d\(\d+\)$",
    r"^B-\([A-Z0-9]+\)$",
    // CE family and chains
    r"^CE\d(?:\.\d+)?(?:\(\d+\))?$",
    r"^(?:CE\d(?:\(\d+\))?)(?:[.\-]CE\d(?:\(\d+\))?)+$",
    r"^CE(?:BE|BS|J|M)\d(?:\(\d+\))?$",
    r"^(?:CEN\d|CM\d)(?:\(\d+\))?(?:[.\-](?:CEN\d|CM\d)(?:\(\d+\))?)+$",
    r"^CM\d(?:\(\d+\))?$",
    // Truncated label seen verbatim on some drawings; kept as-is.
    r"^CM2\($",
    r"^CN(?:-\s*\d+)?\s*\(\s*\d+\s*\)$",
    // Other single-letter families
    r"^I\d\(\d+\)$",
    r"^M\d(?:\.\d+)?(?:\(\d+\))?$",
    // Generic chain of 1–3 letter labels joined by space/hyphen/dot
    r"^(?:[A-Z]{1,3}(?:\d+(?:\.\d+)?)?(?:\(\d+\))?)(?:[ .-]{1,2}[A-Z]{1,3}(?:\d+(?:\.\d+)?)?(?:\(\d+\))?)+$",
    // S family, with nested alphanumeric qualifiers and chains
    r"^S[A-Z0-9]+(?:\([A-Z0-9]+\))?$",
    r"^S(?:[A-Z0-9]+(?:\([A-Z0-9]+\))?)+(?:[ .-]S(?:[A-Z0-9]+(?:\([A-Z0-9]+\))?)+)*$",
    r"^T(?:E|\d)(?:\(\d+\))?$",
    r"^U\d(?:\.\d+)?(?:\(\d+\))?$",
    r"^N(?:\d+(?:\.\d+)?)?(?:\(\d+\))?$",
    // Juxtaposed label blocks with no separator at all
    r"^(?:[A-Z]{1,3}(?:\d+(?:\.\d+)?(?:\(\d+\))?|\(\d+\))){2,}$",
];

/// The compiled code grammar.
///
/// Construct once (or use [`CodeGrammar::default`]) and share by `Arc`;
/// matching takes `&self` and is safe for concurrent use.
#[derive(Debug)]
pub struct CodeGrammar {
    rules: Vec<Regex>,
}

impl CodeGrammar {
    /// Compile the built-in rule table.
    pub fn new() -> Self {
        CodeGrammar {
            rules: RULES
                .iter()
                .map(|p| Regex::new(p).expect("built-in grammar rule must compile"))
                .collect(),
        }
    }

    /// Number of rules in the table.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// True iff the trimmed string matches at least one rule in full.
    ///
    /// Empty and whitespace-only strings never match.
    pub fn looks_like_code(&self, text: &str) -> bool {
        let s = text.trim();
        !s.is_empty() && self.rules.iter().any(|r| r.is_match(s))
    }
}

impl Default for CodeGrammar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> CodeGrammar {
        CodeGrammar::new()
    }

    #[test]
    fn empty_and_whitespace_never_match() {
        let g = grammar();
        assert!(!g.looks_like_code(""));
        assert!(!g.looks_like_code("   "));
        assert!(!g.looks_like_code("\t\n"));
    }

    #[test]
    fn accepts_prefix_families() {
        let g = grammar();
        for s in ["ABN-7", "ABN-12", "AN3(2)", "B2(10)", "B-(X12)"] {
            assert!(g.looks_like_code(s), "should accept {s:?}");
        }
    }

    #[test]
    fn accepts_single_letter_families() {
        let g = grammar();
        for s in [
            "CE1", "CE1(2)", "CE2.1", "CEBE3", "CM3", "CM3(1)", "CN(4)", "CN-2 (4)", "I2(3)",
            "M1", "M2.5(1)", "TE", "TE(1)", "T3", "U3", "U3(1)", "U2.1", "N", "N12(3)",
        ] {
            assert!(g.looks_like_code(s), "should accept {s:?}");
        }
    }

    #[test]
    fn accepts_chained_forms() {
        let g = grammar();
        for s in [
            "CE1(2).CE3(1)",
            "CE1-CE2",
            "CM3-CM3(1)",
            "CEN1.CM2",
            "AB-CD-EF",
            "S1N S3R",
            "S1N.S3R",
        ] {
            assert!(g.looks_like_code(s), "should accept {s:?}");
        }
    }

    #[test]
    fn accepts_s_family() {
        let g = grammar();
        for s in ["S1N", "S3R", "S1N(2B)", "S1NS3R", "SA2(B1)"] {
            assert!(g.looks_like_code(s), "should accept {s:?}");
        }
    }

    #[test]
    fn s_family_accepts_plain_s_words() {
        // The S-family rule is an alphabet match, not a shape match: any
        // all-caps word starting with S is accepted, drawing prose like SEE
        // and SHEET included. That is the fielded acceptance set; narrowing
        // it here would drop real S codes. Downstream relies on the color
        // gate keeping prose out.
        let g = grammar();
        assert!(g.looks_like_code("SEE"));
        assert!(g.looks_like_code("SHEET"));
        assert!(!g.looks_like_code("DETAIL"));
    }

    #[test]
    fn accepts_numeric_ratings() {
        let g = grammar();
        for s in ["100A-10kA-5H", "250a/25ka/10t", "60-100", "120 - 2404"] {
            assert!(g.looks_like_code(s), "should accept {s:?}");
        }
    }

    #[test]
    fn accepts_juxtaposed_blocks() {
        let g = grammar();
        for s in ["TE(1)U3(2)", "CE1CE2", "U3(1)M2"] {
            assert!(g.looks_like_code(s), "should accept {s:?}");
        }
    }

    #[test]
    fn keeps_truncated_cm2_rule_verbatim() {
        let g = grammar();
        assert!(g.looks_like_code("CM2("));
        assert!(!g.looks_like_code("CM3("));
    }

    #[test]
    fn rejects_plain_prose() {
        let g = grammar();
        for s in [
            "NOTE",
            "SEE DETAIL",
            "hello world",
            "page 3 of 7",
            "TEU3", // concatenation with no valid juxtaposed reading
            "A",
            "12",
        ] {
            assert!(!g.looks_like_code(s), "should reject {s:?}");
        }
    }

    #[test]
    fn match_is_full_string_not_substring() {
        let g = grammar();
        assert!(!g.looks_like_code("see ABN-7 here"));
        assert!(g.looks_like_code("  ABN-7  "), "trimming is allowed");
    }

    #[test]
    fn rule_table_is_stable() {
        assert_eq!(grammar().rule_count(), RULES.len());
    }
}
