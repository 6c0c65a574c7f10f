//! Two-value match scoring with a presence/absence policy.
//!
//! | query   | hit     | enrichment expected | not expected |
//! |---------|---------|---------------------|--------------|
//! | absent  | absent  | 0.5                 | 1.0          |
//! | present | absent  | 0.2                 | 0.5          |
//! | absent  | present | 1.0                 | 0.5          |
//! | present | present | similarity          | similarity   |
//!
//! Numeric fields compare by integer distance before falling back to fuzzy
//! similarity.

use super::FuzzyMatcher;
use crate::config::AddressPartSpec;
use crate::model::FieldValues;

/// How absent values and numbers are treated for one comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchPolicy {
    pub requires_enrichment: bool,
    pub is_numeric: bool,
}

impl MatchPolicy {
    /// Plain string comparison, no enrichment expected.
    pub const TEXT: Self = Self {
        requires_enrichment: false,
        is_numeric: false,
    };

    /// Plain string comparison where the hit is expected to add detail.
    pub const ENRICHED_TEXT: Self = Self {
        requires_enrichment: true,
        is_numeric: false,
    };
}

impl From<&AddressPartSpec> for MatchPolicy {
    fn from(spec: &AddressPartSpec) -> Self {
        Self {
            requires_enrichment: spec.requires_enrichment,
            is_numeric: spec.is_numeric,
        }
    }
}

/// Score how well `hit` matches `query` in `[0, 1]`.
#[must_use]
pub fn match_property<M: FuzzyMatcher>(
    matcher: &M,
    query: Option<&str>,
    hit: Option<&str>,
    policy: MatchPolicy,
) -> f64 {
    let enrich = policy.requires_enrichment;
    let (query, hit) = match (query, hit) {
        (None, None) => return if enrich { 0.5 } else { 1.0 },
        (Some(_), None) => return if enrich { 0.2 } else { 0.5 },
        (None, Some(_)) => return if enrich { 1.0 } else { 0.5 },
        (Some(query), Some(hit)) => (query, hit),
    };

    if policy.is_numeric {
        if query == hit {
            return 1.0;
        }
        if let (Some(n1), Some(n2)) = (parse_leading_int(query), parse_leading_int(hit)) {
            return numeric_proximity(n1, n2);
        }
    }

    matcher.similarity(query, hit)
}

/// Like [`match_property`], but a multi-valued hit property scores as its
/// best-matching value. A present but empty list scores `0.0`.
#[must_use]
pub fn match_any<M: FuzzyMatcher>(
    matcher: &M,
    query: Option<&str>,
    hit: Option<&FieldValues>,
    policy: MatchPolicy,
) -> f64 {
    match hit {
        None => match_property(matcher, query, None, policy),
        Some(values) => values
            .iter()
            .map(|value| match_property(matcher, query, Some(value), policy))
            .fold(0.0, f64::max),
    }
}

/// `0.9 / (1 + |n1 - n2|)`: close house numbers still score, never as high as
/// an exact match.
#[allow(clippy::cast_precision_loss)]
fn numeric_proximity(n1: i64, n2: i64) -> f64 {
    0.9 / (1.0 + n1.abs_diff(n2) as f64)
}

/// Parse the leading integer of `s`.
///
/// Leading whitespace and one sign are accepted, trailing characters are
/// ignored: `"12a"` is 12, `"a12"` and `""` are `None`.
#[must_use]
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = usize::from(s.starts_with(['+', '-']));
    let digits = s[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    s[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::LevenshteinMatcher;

    const NUMERIC: MatchPolicy = MatchPolicy {
        requires_enrichment: false,
        is_numeric: true,
    };

    fn assert_approx_eq(actual: f64, expected: f64) {
        let tolerance = 1e-10;
        assert!(
            (actual - expected).abs() <= tolerance,
            "actual ({actual}) != expected ({expected})"
        );
    }

    fn score(query: Option<&str>, hit: Option<&str>, policy: MatchPolicy) -> f64 {
        match_property(&LevenshteinMatcher, query, hit, policy)
    }

    #[test]
    fn both_absent() {
        assert_approx_eq(score(None, None, MatchPolicy::ENRICHED_TEXT), 0.5);
        assert_approx_eq(score(None, None, MatchPolicy::TEXT), 1.0);
    }

    #[test]
    fn query_only() {
        assert_approx_eq(score(Some("10"), None, MatchPolicy::ENRICHED_TEXT), 0.2);
        assert_approx_eq(score(Some("10"), None, MatchPolicy::TEXT), 0.5);
    }

    #[test]
    fn hit_only() {
        assert_approx_eq(score(None, Some("10"), MatchPolicy::ENRICHED_TEXT), 1.0);
        assert_approx_eq(score(None, Some("10"), MatchPolicy::TEXT), 0.5);
    }

    #[test]
    fn numeric_exact_match() {
        assert_approx_eq(score(Some("10"), Some("10"), NUMERIC), 1.0);
    }

    #[test]
    fn numeric_distance_decays() {
        assert_approx_eq(score(Some("10"), Some("12"), NUMERIC), 0.3);
        assert_approx_eq(score(Some("12"), Some("10"), NUMERIC), 0.3);
        // Same integer, different text: close but not exact.
        assert_approx_eq(score(Some("10a"), Some("10"), NUMERIC), 0.9);
    }

    #[test]
    fn unparseable_numbers_fall_back_to_fuzzy() {
        let expected = LevenshteinMatcher.similarity("a10", "b10");
        assert_approx_eq(score(Some("a10"), Some("b10"), NUMERIC), expected);
    }

    #[test]
    fn text_comparison_is_fuzzy() {
        let s = score(Some("Main St"), Some("Main Street"), MatchPolicy::ENRICHED_TEXT);
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn match_any_takes_best_value() {
        let values = FieldValues::many(["8", "10", "14"]);
        assert_approx_eq(
            match_any(&LevenshteinMatcher, Some("10"), Some(&values), NUMERIC),
            1.0,
        );
        let values = FieldValues::many(["8", "14"]);
        assert_approx_eq(
            match_any(&LevenshteinMatcher, Some("10"), Some(&values), NUMERIC),
            0.9 / 3.0,
        );
    }

    #[test]
    fn match_any_empty_list_scores_zero() {
        let values = FieldValues::many(Vec::<String>::new());
        assert_approx_eq(
            match_any(&LevenshteinMatcher, Some("x"), Some(&values), MatchPolicy::ENRICHED_TEXT),
            0.0,
        );
        assert_approx_eq(
            match_any(&LevenshteinMatcher, None, Some(&values), NUMERIC),
            0.0,
        );
        // Absent is not the same as empty.
        assert_approx_eq(match_any(&LevenshteinMatcher, None, None, NUMERIC), 1.0);
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int("  12b"), Some(12));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("+7 "), Some(7));
        assert_eq!(parse_leading_int("a12"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), None);
    }
}
