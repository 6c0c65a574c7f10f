//! Combine the field scorers into one confidence value per hit.
//!
//! # Formula
//!
//! ```text
//! checks     = [address] + [name]
//! confidence = (address + name) / checks                        without admin
//! confidence = (address + name + checks * admin) / (2 * checks) with admin
//! ```
//!
//! Scaling the admin score by the number of finer checks keeps it at exactly
//! half of the final weighted average however many other checks ran. The name
//! check is skipped when it would only re-score the street and number tokens
//! the address check already covered.

use super::ScoringContext;
use crate::matching::FuzzyMatcher;
use crate::model::{ParsedQuery, Query, ResultHit};
use crate::stats::ScoreDistribution;
use serde::Serialize;
use tracing::{debug, trace};

/// Sub-scores behind one confidence value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    /// Weighted address match, when the query had address parts.
    pub address: Option<f64>,
    /// Name match, unless it duplicated the address check.
    pub name: Option<f64>,
    /// Admin region match, when configured and the query had regions.
    pub admin: Option<f64>,
    /// Denominator of the final average.
    pub checks: u32,
    pub confidence: f64,
}

impl<M: FuzzyMatcher> ScoringContext<'_, M> {
    /// Score `hit` against `query` and return the per-check breakdown.
    #[must_use]
    pub fn breakdown(
        &self,
        query: &Query,
        distribution: &ScoreDistribution,
        hit: &ResultHit,
    ) -> ConfidenceBreakdown {
        let mut out = ConfidenceBreakdown::default();
        let mut sum = 0.0;
        let parsed = query.parsed_text.as_ref();

        if let Some(parsed) = parsed {
            if self.has_address_parts(parsed) {
                out.address = self.address_score(parsed, hit);
                if let Some(address) = out.address {
                    sum += address;
                    out.checks += 1;
                }
            }

            if !parsed.regions.is_empty() && self.config.admin_properties().is_some() {
                out.admin = Some(self.match_regions(parsed, hit));
            }
        }

        let duplicates_address =
            out.address.is_some() && parsed.is_some_and(|p| name_repeats_address(p, query));
        if duplicates_address {
            debug!("skip name check");
        } else {
            let name = self.name_score(query, hit);
            out.name = Some(name);
            sum += name;
            out.checks += 1;
        }

        if let Some(admin) = out.admin {
            sum += f64::from(out.checks) * admin;
            out.checks *= 2;
        }

        out.confidence = average(sum, out.checks);

        if let Some(score) = hit.score {
            trace!(
                score,
                z_score = distribution.z_score(score),
                above_mean = distribution.distance_from_mean(score),
                "engine score position"
            );
        }
        debug!(confidence = out.confidence, checks = out.checks, "confidence");

        out
    }

    /// Confidence of `hit` for `query`, in `[0, 1]` when every sub-score is.
    #[must_use]
    pub fn confidence(
        &self,
        query: &Query,
        distribution: &ScoreDistribution,
        hit: &ResultHit,
    ) -> f64 {
        self.breakdown(query, distribution, hit).confidence
    }

    /// Attach the confidence to `hit`.
    pub fn score_hit(&self, query: &Query, distribution: &ScoreDistribution, hit: &mut ResultHit) {
        hit.confidence = Some(self.confidence(query, distribution, hit));
    }
}

/// Whether the name input is just "street number" or "number street", in
/// which case the address check already scored those tokens.
fn name_repeats_address(parsed: &ParsedQuery, query: &Query) -> bool {
    let Some(street) = parsed.field("street") else {
        return false;
    };

    let input = parsed
        .field("name")
        .map_or_else(|| query.lowercase_text(), str::to_lowercase);

    let street = street.to_lowercase();
    match parsed.field("number") {
        Some(number) => {
            let number = number.to_lowercase();
            input == format!("{street} {number}") || input == format!("{number} {street}")
        }
        None => input == street,
    }
}

/// `sum / checks`, defined as `0.0` when no check ran.
fn average(sum: f64, checks: u32) -> f64 {
    if checks == 0 {
        0.0
    } else {
        sum / f64::from(checks)
    }
}
