//! Gate - boolean logic variants driving lane patterns
//!
//! Each [`GateVariant`] is a pair of pure functions:
//! - `generate`: build a lane pattern whose evaluation equals a target truth value
//! - `evaluate`: reduce an observed lane-activation vector to a truth value
//!
//! The complement gates (NAND/NOR/XNOR) are expressed through their base gate
//! with the truth value flipped, so only AND/OR/XOR carry real generation logic.

use std::fmt;

use rand::Rng;

pub mod pattern;

pub use pattern::LanePattern;


/// Boolean gate governing how a lane pattern maps to a truth value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateVariant {
    /// True only when every lane is active
    And,
    /// True when at least one lane is active
    Or,
    /// True when an odd number of lanes are active
    Xor,
    /// Complement of And
    Nand,
    /// Complement of Or
    Nor,
    /// Complement of Xor
    Xnor,
}

impl GateVariant {
    /// Every variant, in declaration order
    pub const ALL: [GateVariant; 6] = [
        GateVariant::And,
        GateVariant::Or,
        GateVariant::Xor,
        GateVariant::Nand,
        GateVariant::Nor,
        GateVariant::Xnor,
    ];

    /// Split a variant into its base gate and whether the output is negated
    pub fn decompose(self) -> (GateVariant, bool) {
        match self {
            GateVariant::And => (GateVariant::And, false),
            GateVariant::Or => (GateVariant::Or, false),
            GateVariant::Xor => (GateVariant::Xor, false),
            GateVariant::Nand => (GateVariant::And, true),
            GateVariant::Nor => (GateVariant::Or, true),
            GateVariant::Xnor => (GateVariant::Xor, true),
        }
    }

    /// Short display label used by HUD themes and reports
    pub fn label(self) -> &'static str {
        match self {
            GateVariant::And => "AND",
            GateVariant::Or => "OR",
            GateVariant::Xor => "XOR",
            GateVariant::Nand => "NAND",
            GateVariant::Nor => "NOR",
            GateVariant::Xnor => "XNOR",
        }
    }

    /// Generate a lane pattern that evaluates to `target_truth` under this gate
    ///
    /// The pattern size is drawn uniformly from the sizes that satisfy the
    /// gate, then a subset of that size is drawn uniformly from
    /// `0..num_lanes`. Exactly one call should be made per beat.
    ///
    /// With `num_lanes == 0` the empty pattern is returned for every gate and
    /// truth value. Session configuration rejects zero lanes, so only direct
    /// callers can reach that path.
    ///
    /// With a single lane, `And` has no non-empty proper subset and returns
    /// the empty pattern for `false`.
    pub fn generate<R: Rng + ?Sized>(
        self,
        target_truth: bool,
        num_lanes: usize,
        rng: &mut R,
    ) -> LanePattern {
        if num_lanes == 0 {
            return LanePattern::empty(0);
        }

        let (base, negated) = self.decompose();
        let truth = target_truth != negated;
        let size = base.pick_size(truth, num_lanes, rng);

        LanePattern::random_subset(num_lanes, size, rng)
    }

    /// Evaluate an observed lane-activation vector
    pub fn evaluate(self, inputs: &[bool]) -> bool {
        let (base, negated) = self.decompose();
        let value = match base {
            GateVariant::And => inputs.iter().all(|&active| active),
            GateVariant::Or => inputs.iter().any(|&active| active),
            _ => inputs.iter().filter(|&&active| active).count() % 2 == 1,
        };
        value != negated
    }

    /// Evaluate a generated pattern
    pub fn evaluate_pattern(self, pattern: &LanePattern) -> bool {
        self.evaluate(&pattern.to_inputs())
    }

    /// Pick a pattern cardinality for a base gate
    fn pick_size<R: Rng + ?Sized>(self, truth: bool, num_lanes: usize, rng: &mut R) -> usize {
        match (self, truth) {
            (GateVariant::And, true) => num_lanes,
            (GateVariant::And, false) => {
                if num_lanes >= 2 {
                    rng.gen_range(1..num_lanes)
                } else {
                    0
                }
            }
            (GateVariant::Or, true) => rng.gen_range(1..=num_lanes),
            (GateVariant::Or, false) => 0,
            (_, truth) => {
                // Sizes with the requested parity: p, p + 2, ... <= num_lanes
                let parity = usize::from(truth);
                let choices = (num_lanes - parity) / 2 + 1;
                parity + 2 * rng.gen_range(0..choices)
            }
        }
    }
}

impl fmt::Display for GateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
