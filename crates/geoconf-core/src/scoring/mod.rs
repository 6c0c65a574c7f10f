//! Per-result confidence scoring.
//!
//! Field scorers (address, name, admin) each return a value in `[0, 1]`;
//! the composer averages them into the final confidence. All of them run
//! against one [`ScoringContext`], which borrows the shared configuration and
//! string matcher for the duration of a request.

pub mod address;
pub mod admin;
pub mod composer;
pub mod name;

pub use composer::ConfidenceBreakdown;
pub use name::DigitHandling;

use crate::config::ScoringConfig;
use crate::matching::FuzzyMatcher;

/// Borrowed configuration and matcher used by every scorer.
#[derive(Debug)]
pub struct ScoringContext<'a, M> {
    pub config: &'a ScoringConfig,
    pub matcher: &'a M,
}

impl<M> Clone for ScoringContext<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for ScoringContext<'_, M> {}

impl<'a, M: FuzzyMatcher> ScoringContext<'a, M> {
    #[must_use]
    pub const fn new(config: &'a ScoringConfig, matcher: &'a M) -> Self {
        Self { config, matcher }
    }
}
