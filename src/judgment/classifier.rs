//! HitClassifier - cumulative timing windows
//!
//! Tiers are ordered ascending by window width, and each width is added to
//! the previous tier's boundary. With widths 0.05/0.05/0.05 the boundaries
//! are 0.05, 0.10 and 0.15 seconds; anything beyond the last boundary is a
//! Miss.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Named timing-accuracy bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Judgment {
    Perfect,
    Great,
    Good,
    Miss,
}

/// Scoring and window data for one judgment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentTier {
    pub judgment: Judgment,
    /// Score added for a correct gate answer
    pub correct_score_delta: f64,
    /// Score added for an incorrect gate answer
    pub incorrect_score_delta: f64,
    /// Seconds added to the previous tier's boundary
    pub window_width: f64,
}

impl JudgmentTier {
    pub fn new(
        judgment: Judgment,
        correct_score_delta: f64,
        incorrect_score_delta: f64,
        window_width: f64,
    ) -> Self {
        Self {
            judgment,
            correct_score_delta,
            incorrect_score_delta,
            window_width,
        }
    }

    /// Miss tier with no score change
    pub fn miss() -> Self {
        Self::new(Judgment::Miss, 0.0, 0.0, 0.0)
    }
}

/// Classify an absolute timing error against a tier list
///
/// Re-sorts `tiers` ascending by window width (stable, so sorting an already
/// sorted list leaves it unchanged), then returns the judgment of the first
/// tier whose cumulative boundary is `>= abs_time_error`. Returns
/// `Judgment::Miss` when no boundary reaches the error.
pub fn classify(abs_time_error: f64, tiers: &mut [JudgmentTier]) -> Judgment {
    tiers.sort_by(|a, b| a.window_width.total_cmp(&b.window_width));

    let mut boundary = 0.0;
    for tier in tiers.iter() {
        boundary += tier.window_width;
        if boundary >= abs_time_error {
            return tier.judgment;
        }
    }
    Judgment::Miss
}

/// Validated tier list plus the Miss scoring tier
#[derive(Debug, Clone)]
pub struct HitClassifier {
    tiers: Vec<JudgmentTier>,
    miss: JudgmentTier,
}

impl HitClassifier {
    /// Create a classifier from hit tiers and a Miss tier
    ///
    /// # Errors
    /// - `EmptyTierList` when `tiers` is empty
    /// - `InvalidTierWidth` for negative or non-finite widths
    /// - `InvalidTierSet` when a judgment repeats or Miss appears as a hit tier
    pub fn new(mut tiers: Vec<JudgmentTier>, miss: JudgmentTier) -> Result<Self, ConfigError> {
        if tiers.is_empty() {
            return Err(ConfigError::EmptyTierList);
        }

        for (index, tier) in tiers.iter().enumerate() {
            if !tier.window_width.is_finite() || tier.window_width < 0.0 {
                return Err(ConfigError::InvalidTierWidth {
                    index,
                    width: tier.window_width,
                });
            }
            if tier.judgment == Judgment::Miss {
                return Err(ConfigError::InvalidTierSet {
                    reason: format!("tier {} is Miss; Miss is implied past the last window", index),
                });
            }
            if tiers[..index].iter().any(|t| t.judgment == tier.judgment) {
                return Err(ConfigError::InvalidTierSet {
                    reason: format!("{:?} appears more than once", tier.judgment),
                });
            }
        }

        tiers.sort_by(|a, b| a.window_width.total_cmp(&b.window_width));
        let miss = JudgmentTier {
            judgment: Judgment::Miss,
            ..miss
        };

        Ok(Self { tiers, miss })
    }

    /// Judge a timing error and return the scoring tier
    ///
    /// The sign of `time_error` is ignored.
    pub fn judge(&mut self, time_error: f64) -> JudgmentTier {
        let judgment = classify(time_error.abs(), &mut self.tiers);
        self.tier_for(judgment)
    }

    /// Scoring data for a judgment
    pub fn tier_for(&self, judgment: Judgment) -> JudgmentTier {
        self.tiers
            .iter()
            .find(|tier| tier.judgment == judgment)
            .copied()
            .unwrap_or(self.miss)
    }

    /// Cumulative width of every tier; errors beyond this are a Miss
    pub fn outer_window(&self) -> f64 {
        self.tiers.iter().map(|tier| tier.window_width).sum()
    }

    pub fn miss_tier(&self) -> JudgmentTier {
        self.miss
    }

    /// Tiers in classification order
    pub fn tiers(&self) -> &[JudgmentTier] {
        &self.tiers
    }
}
