//! Multilingual name matching with a street fallback.

use super::ScoringContext;
use crate::matching::{FuzzyMatcher, MatchPolicy, match_any};
use crate::model::{Query, ResultHit};
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

/// Whether digits are removed from hit names before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitHandling {
    Keep,
    /// Venue-style names often embed the house number ("Main Street 5");
    /// strip it when comparing against a bare street name.
    Strip,
}

impl<M: FuzzyMatcher> ScoringContext<'_, M> {
    /// Best similarity of `text` against the hit's names in the configured
    /// languages. Languages outside the configured set are ignored.
    #[must_use]
    pub fn best_language_match(
        &self,
        text: &str,
        names: Option<&BTreeMap<String, String>>,
        digits: DigitHandling,
    ) -> f64 {
        let Some(names) = names else {
            return 0.0;
        };

        let mut best_score = 0.0;
        let mut best_name = None;

        for (lang, name) in names {
            if !self.config.is_language_enabled(lang) {
                continue;
            }

            let candidate = match digits {
                DigitHandling::Keep => Cow::Borrowed(name.as_str()),
                DigitHandling::Strip => Cow::Owned(strip_digits(name)),
            };
            let score = self.matcher.similarity(text, &candidate);

            if score > best_score {
                best_score = score;
                best_name = Some(name.as_str());
            }
        }

        debug!(score = best_score, text, name = ?best_name, "name score");
        best_score
    }

    /// Name check: the parsed `name` (or the raw text when the parser found
    /// none) against every configured name variant and the street, which often
    /// holds the searched name.
    #[must_use]
    pub fn name_score(&self, query: &Query, hit: &ResultHit) -> f64 {
        let input: Cow<'_, str> = match query.parsed_text.as_ref().and_then(|p| p.field("name")) {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(query.lowercase_text()),
        };

        let mut score = self.best_language_match(&input, hit.name.as_ref(), DigitHandling::Keep);

        if let Some(street) = hit.address_part("street") {
            let street_score = match_any(
                self.matcher,
                Some(input.as_ref()),
                Some(street),
                MatchPolicy::ENRICHED_TEXT,
            );
            score = score.max(street_score);
        }

        score
    }
}

fn strip_digits(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_ascii_digit())
        .collect::<String>()
        .trim()
        .to_string()
}
