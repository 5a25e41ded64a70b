// ScoreAccumulator - score, combo counters and combo multiplier
//
// The accumulator is the only writer of ScoreState. Every judgment produces
// a ScoreChanged notification, which is the accumulator's only observable
// effect; HUD and health systems consume it.

use serde::{Deserialize, Serialize};

use super::classifier::JudgmentTier;
use crate::error::ConfigError;

/// Combo multiplier parameters
///
/// `multiplier = 1 + min(max_multiplier - 1, floor(all_combo / interval) * step)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Combo count per multiplier step
    pub interval: f64,
    /// Multiplier gained per interval
    pub step: f64,
    /// Multiplier ceiling (>= 1)
    pub max_multiplier: f64,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            interval: 50.0,
            step: 0.1,
            max_multiplier: 2.0,
        }
    }
}

impl ComboConfig {
    /// # Errors
    /// `ConfigError::InvalidCombo` when the interval is not positive, the step
    /// is negative, or the ceiling is below 1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(ConfigError::InvalidCombo {
                reason: format!("interval must be > 0 (got {})", self.interval),
            });
        }
        if !self.step.is_finite() || self.step < 0.0 {
            return Err(ConfigError::InvalidCombo {
                reason: format!("step must be >= 0 (got {})", self.step),
            });
        }
        if !self.max_multiplier.is_finite() || self.max_multiplier < 1.0 {
            return Err(ConfigError::InvalidCombo {
                reason: format!("max_multiplier must be >= 1 (got {})", self.max_multiplier),
            });
        }
        Ok(())
    }

    /// Multiplier for a combo count
    pub fn multiplier_for(&self, all_combo: f64) -> f64 {
        let bonus = (all_combo / self.interval).floor() * self.step;
        1.0 + bonus.min(self.max_multiplier - 1.0)
    }
}

/// Snapshot of score counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub total_score: f64,
    /// Consecutive answered beats, right or wrong
    pub all_combo: f64,
    /// Consecutive correct answers
    pub correct_combo: f64,
    pub multiplier: f64,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            total_score: 0.0,
            all_combo: 0.0,
            correct_combo: 0.0,
            multiplier: 1.0,
        }
    }
}

/// Score-changed notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreChanged {
    pub total_score: f64,
    pub all_combo: f64,
    pub correct_combo: f64,
    pub max_score: f64,
    pub multiplier: f64,
}

/// Folds judgments into score state
#[derive(Debug, Clone)]
pub struct ScoreAccumulator {
    state: ScoreState,
    max_score: f64,
    combo: ComboConfig,
    max_all_combo: f64,
}

impl ScoreAccumulator {
    /// # Errors
    /// `InvalidMaxScore` for a negative or non-finite ceiling, or any
    /// [`ComboConfig::validate`] error.
    pub fn new(max_score: f64, combo: ComboConfig) -> Result<Self, ConfigError> {
        if !max_score.is_finite() || max_score < 0.0 {
            return Err(ConfigError::InvalidMaxScore { max_score });
        }
        combo.validate()?;

        Ok(Self {
            state: ScoreState::default(),
            max_score,
            combo,
            max_all_combo: 0.0,
        })
    }

    /// Apply one judgment
    ///
    /// - `Some(true)`: correct answer, both combos grow
    /// - `Some(false)`: wrong answer, all-combo grows, correct-combo resets
    /// - `None`: no answer (timeout), both combos reset and the score is untouched
    pub fn on_judgment(&mut self, tier: &JudgmentTier, correct: Option<bool>) -> ScoreChanged {
        match correct {
            Some(true) => {
                self.state.total_score += tier.correct_score_delta;
                self.state.all_combo += 1.0;
                self.state.correct_combo += 1.0;
            }
            Some(false) => {
                self.state.total_score += tier.incorrect_score_delta;
                self.state.all_combo += 1.0;
                self.state.correct_combo = 0.0;
            }
            None => {
                self.state.correct_combo = 0.0;
                self.state.all_combo = 0.0;
            }
        }

        self.state.multiplier = self.combo.multiplier_for(self.state.all_combo);
        self.state.total_score = self.state.total_score.clamp(0.0, self.max_score);
        self.max_all_combo = self.max_all_combo.max(self.state.all_combo);

        log::debug!(
            "[Score] {:?} correct={:?} -> score={} combo={}/{} x{}",
            tier.judgment,
            correct,
            self.state.total_score,
            self.state.all_combo,
            self.state.correct_combo,
            self.state.multiplier
        );

        self.notification()
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Highest all-combo reached this session
    pub fn max_all_combo(&self) -> f64 {
        self.max_all_combo
    }

    /// Clear all counters for a replay
    pub fn reset(&mut self) {
        self.state = ScoreState::default();
        self.max_all_combo = 0.0;
    }

    fn notification(&self) -> ScoreChanged {
        ScoreChanged {
            total_score: self.state.total_score,
            all_combo: self.state.all_combo,
            correct_combo: self.state.correct_combo,
            max_score: self.max_score,
            multiplier: self.state.multiplier,
        }
    }
}
