//! String similarity used by every scorer.
//!
//! The scorers treat similarity as an opaque capability behind
//! [`FuzzyMatcher`]; [`LevenshteinMatcher`] is the implementation the stage
//! ships with.

use strsim::normalized_levenshtein;

/// Similarity between two strings in `[0, 1]`.
///
/// Implementations must return a value in `[0, 1]` for any two non-empty
/// strings. Scores outside that range are not checked and will skew the
/// confidence rather than fail.
pub trait FuzzyMatcher: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Best similarity of `text` against any of `candidates`; `0.0` when there
    /// are none.
    fn best_of<S: AsRef<str>>(&self, text: &str, candidates: &[S]) -> f64
    where
        Self: Sized,
    {
        candidates
            .iter()
            .map(|candidate| self.similarity(text, candidate.as_ref()))
            .fold(0.0, f64::max)
    }
}

/// Case-insensitive normalized Levenshtein similarity.
///
/// `1 - edit_distance / max_len` over trimmed, lower-cased inputs. Either side
/// being empty scores `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevenshteinMatcher;

impl FuzzyMatcher for LevenshteinMatcher {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        if a == b {
            return 1.0;
        }
        normalized_levenshtein(&a, &b)
    }
}
