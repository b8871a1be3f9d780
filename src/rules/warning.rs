//! Verbatim Government Warning matcher.
//!
//! The health warning statement must appear exactly as mandated: the heading
//! and both numbered clauses, in order, with exact casing. Matching normalizes
//! whitespace and line breaks, then requires byte-for-byte equality. Any
//! deviation is a failure; the matcher never escalates.

/// Canonical warning text per 27 CFR Part 16.
pub const CANONICAL_WARNING: &str = "GOVERNMENT WARNING: (1) According to the Surgeon General, women should not drink
alcoholic beverages during pregnancy because of the risk of birth defects.
(2) Consumption of alcoholic beverages impairs your ability to drive a car or
operate machinery, and may cause health problems.";

/// Result of matching extracted warning text against [`CANONICAL_WARNING`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningVerdict {
    Exact,
    Mismatch { reason: String },
}

impl WarningVerdict {
    pub fn is_exact(&self) -> bool {
        matches!(self, WarningVerdict::Exact)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn mismatch(reason: &str) -> WarningVerdict {
    WarningVerdict::Mismatch {
        reason: reason.to_string(),
    }
}

/// Compares extracted warning text against the canonical statement.
///
/// Whitespace and line breaks are normalized on both sides; the comparison
/// itself is case-sensitive and exact. Diagnostic reasons distinguish a
/// missing statement, a wrong heading, missing or reordered clauses, casing
/// drift, and general wording drift.
pub fn verify_warning(text: Option<&str>) -> WarningVerdict {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return mismatch("Government Warning missing; required per 27 CFR Part 16");
    };

    let observed = normalize(text);
    let expected = normalize(CANONICAL_WARNING);
    if observed == expected {
        return WarningVerdict::Exact;
    }

    let observed_words: Vec<&str> = observed.split(' ').collect();
    if observed_words.len() < 3 {
        return mismatch(
            "Government Warning appears incomplete; required text missing (27 CFR Part 16)",
        );
    }
    if observed_words[0] != "GOVERNMENT" || observed_words[1] != "WARNING:" {
        return mismatch(
            "Government Warning heading must be exactly 'GOVERNMENT WARNING:' in all caps (27 CFR Part 16)",
        );
    }

    let idx1 = observed_words.iter().position(|w| *w == "(1)");
    let idx2 = observed_words.iter().position(|w| *w == "(2)");
    match (idx1, idx2) {
        (Some(i1), Some(i2)) if i2 < i1 => {
            return mismatch(
                "Government Warning must include both numbered clauses in order (27 CFR Part 16)",
            );
        }
        (Some(_), Some(_)) => {}
        _ => {
            return mismatch(
                "Government Warning must include both numbered clauses (1) and (2) (27 CFR Part 16)",
            );
        }
    }

    if observed.eq_ignore_ascii_case(&expected) {
        return mismatch(
            "Government Warning casing does not match the required verbatim text (27 CFR Part 16)",
        );
    }

    mismatch("Government Warning wording does not match required verbatim text (27 CFR Part 16)")
}
