//! Distribution of the raw engine scores across one result batch.
//!
//! The confidence formula does not use these yet; they are computed for every
//! batch so relative-score factors can be folded in without touching the
//! stage wiring.

use serde::Serialize;

/// Standard deviations below this are numerical noise and count as zero.
pub const STDEV_NOISE_FLOOR: f64 = 0.01;

/// Mean and population standard deviation of a batch's engine scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreDistribution {
    pub mean: f64,
    pub stdev: f64,
}

impl ScoreDistribution {
    /// Compute the distribution of `scores`. An empty slice yields zeros.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let stdev = variance.sqrt();

        Self {
            mean,
            stdev: if stdev < STDEV_NOISE_FLOOR { 0.0 } else { stdev },
        }
    }

    /// Z-score squashed into a percentage-like range.
    ///
    /// Z-scores effectively live in `[-3, 3]`; shifting by 10 and dividing by
    /// 16 maps that onto roughly `[0.44, 0.81]`. Returns `0.0` for a flat
    /// distribution.
    #[must_use]
    pub fn z_score(&self, score: f64) -> f64 {
        if self.stdev < STDEV_NOISE_FLOOR {
            return 0.0;
        }
        (((score - self.mean) / self.stdev) + 10.0) / 16.0
    }

    /// `1.0` when `score` sits more than one standard deviation above the
    /// mean.
    #[must_use]
    pub fn distance_from_mean(&self, score: f64) -> f64 {
        if score - self.mean > self.stdev {
            1.0
        } else {
            0.0
        }
    }
}
