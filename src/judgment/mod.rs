// Judgment module - hit timing classification and score accumulation
//
// Two components:
// 1. HitClassifier: maps an absolute timing error to a judgment tier using
//    cumulative window widths
// 2. ScoreAccumulator: folds judgments and gate-answer correctness into
//    score, combo counters and the combo multiplier

pub mod classifier;
pub mod score;

pub use classifier::{classify, HitClassifier, Judgment, JudgmentTier};
pub use score::{ComboConfig, ScoreAccumulator, ScoreChanged, ScoreState};
