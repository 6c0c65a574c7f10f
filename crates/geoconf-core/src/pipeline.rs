//! The confidence stage as it plugs into a search pipeline.
//!
//! [`setup`] validates the settings once and returns a [`ConfidenceStage`];
//! the stage then scores, ranks, and filters one request at a time. Requests
//! missing the query, the result batch, or the score metadata pass through
//! untouched.

use crate::config::{ScoringConfig, ScoringSettings};
use crate::error::ConfigError;
use crate::matching::{FuzzyMatcher, LevenshteinMatcher};
use crate::model::{Query, ResultHit, ScoreRequest};
use crate::ranking::rank_and_filter;
use crate::scoring::ScoringContext;
use crate::stats::ScoreDistribution;
use tracing::{debug, instrument};

/// What the stage did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// A guard condition held; the request is unchanged.
    PassThrough,
    /// Every hit was scored and ranked; `dropped` fell below the floor.
    Scored { kept: usize, dropped: usize },
}

/// Ready-to-use confidence stage. Holds the immutable configuration and the
/// string matcher; safe to share across threads.
#[derive(Debug, Clone)]
pub struct ConfidenceStage<M = LevenshteinMatcher> {
    config: ScoringConfig,
    matcher: M,
}

/// Build the stage from optional settings.
///
/// Without settings the built-in defaults apply (and `relativeScores` stays
/// off); with settings, omitted keys take their documented defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the settings fail validation.
pub fn setup(
    settings: Option<&ScoringSettings>,
) -> Result<ConfidenceStage<LevenshteinMatcher>, ConfigError> {
    let config = match settings {
        Some(settings) => ScoringConfig::from_settings(settings)?,
        None => ScoringConfig::default(),
    };
    Ok(ConfidenceStage::new(config))
}

impl ConfidenceStage<LevenshteinMatcher> {
    #[must_use]
    pub const fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            matcher: LevenshteinMatcher,
        }
    }
}

impl<M: FuzzyMatcher> ConfidenceStage<M> {
    /// Use a custom string matcher instead of the Levenshtein default.
    #[must_use]
    pub const fn with_matcher(config: ScoringConfig, matcher: M) -> Self {
        Self { config, matcher }
    }

    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scoring context borrowing this stage's config and matcher.
    #[must_use]
    pub const fn context(&self) -> ScoringContext<'_, M> {
        ScoringContext::new(&self.config, &self.matcher)
    }

    /// Score, rank, and filter `request.data` in place.
    #[instrument(
        skip_all,
        fields(batch = request.data.as_ref().map_or(0, Vec::len))
    )]
    pub fn apply(&self, request: &mut ScoreRequest) -> StageOutcome {
        let ScoreRequest {
            query: Some(query),
            data: Some(hits),
            meta: Some(meta),
        } = request
        else {
            debug!("missing query, results, or score metadata; passing through");
            return StageOutcome::PassThrough;
        };

        if hits.is_empty() {
            return StageOutcome::PassThrough;
        }

        self.score_batch(query, &meta.scores, hits)
    }

    /// Score every hit against `query`, then rank and filter the batch.
    ///
    /// `scores` are the raw engine scores, parallel to `hits`.
    pub fn score_batch(
        &self,
        query: &Query,
        scores: &[f64],
        hits: &mut Vec<ResultHit>,
    ) -> StageOutcome {
        if hits.is_empty() {
            return StageOutcome::PassThrough;
        }

        let distribution = ScoreDistribution::from_scores(scores);
        debug!(
            mean = distribution.mean,
            stdev = distribution.stdev,
            "engine score distribution"
        );

        let ctx = self.context();
        for hit in hits.iter_mut() {
            ctx.score_hit(query, &distribution, hit);
        }

        let dropped = rank_and_filter(&self.config, hits);
        StageOutcome::Scored {
            kept: hits.len(),
            dropped,
        }
    }
}
