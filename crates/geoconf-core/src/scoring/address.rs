//! Weighted match over the configured address parts.

use super::{DigitHandling, ScoringContext};
use crate::matching::{FuzzyMatcher, MatchPolicy, match_any};
use crate::model::{ParsedQuery, ResultHit};
use tracing::debug;

impl<M: FuzzyMatcher> ScoringContext<'_, M> {
    /// Whether the query carries any configured address part.
    #[must_use]
    pub fn has_address_parts(&self, parsed: &ParsedQuery) -> bool {
        self.config
            .address_parts()
            .iter()
            .any(|part| parsed.field(&part.key).is_some())
    }

    /// Weighted average of the per-part match scores, in configured order.
    ///
    /// Parts the query lacks are skipped when the hit is only expected to
    /// enrich them. Returns `None` when no part was scored.
    #[must_use]
    pub fn address_score(&self, parsed: &ParsedQuery, hit: &ResultHit) -> Option<f64> {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for part in self.config.address_parts() {
            let query_value = parsed.field(&part.key);
            if query_value.is_none() && part.requires_enrichment {
                continue;
            }

            let hit_value = hit.lookup(&part.parent_key, &part.field);
            let mut score = match_any(self.matcher, query_value, hit_value, MatchPolicy::from(part));

            // Proper street names are sometimes stored only in the name.
            if let Some(street) = query_value.filter(|_| part.key == "street") {
                let name_score =
                    self.best_language_match(street, hit.name.as_ref(), DigitHandling::Strip);
                score = score.max(name_score);
            }

            weighted_sum += score * part.weight;
            total_weight += part.weight;
        }

        if total_weight <= 0.0 {
            return None;
        }

        let score = weighted_sum / total_weight;
        debug!(score, "address match");
        Some(score)
    }
}
