//! GateSequencer - checkpoint-driven gate switching
//!
//! Owns the single active [`GateVariant`]. Each due checkpoint selects the
//! next gate uniformly from the allowed set. Immediate repeats are possible
//! unless `avoid_repeat` is enabled.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::beatmap::CheckpointEvent;
use crate::error::ConfigError;
use crate::gate::GateVariant;

/// Gate-changed notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateChanged {
    pub previous: GateVariant,
    pub new: GateVariant,
    pub checkpoint_label: String,
    pub beat_stamp: f64,
}

/// Active gate state machine
#[derive(Debug, Clone)]
pub struct GateSequencer {
    allowed: Vec<GateVariant>,
    initial: GateVariant,
    current: GateVariant,
    avoid_repeat: bool,
}

impl GateSequencer {
    /// Create a sequencer starting on `initial`
    ///
    /// Duplicate entries in `allowed` are collapsed so selection stays
    /// uniform over distinct gates.
    ///
    /// # Errors
    /// - `EmptyGateSet` when `allowed` is empty
    /// - `GateNotAllowed` when `initial` is not in `allowed`
    pub fn new(
        allowed: &[GateVariant],
        initial: GateVariant,
        avoid_repeat: bool,
    ) -> Result<Self, ConfigError> {
        if allowed.is_empty() {
            return Err(ConfigError::EmptyGateSet);
        }

        let mut distinct: Vec<GateVariant> = Vec::with_capacity(allowed.len());
        for &gate in allowed {
            if !distinct.contains(&gate) {
                distinct.push(gate);
            }
        }

        if !distinct.contains(&initial) {
            return Err(ConfigError::GateNotAllowed { gate: initial });
        }

        Ok(Self {
            allowed: distinct,
            initial,
            current: initial,
            avoid_repeat,
        })
    }

    /// Currently active gate
    pub fn current(&self) -> GateVariant {
        self.current
    }

    pub fn allowed(&self) -> &[GateVariant] {
        &self.allowed
    }

    /// Switch gates for a due checkpoint
    pub fn on_checkpoint_due<R: Rng + ?Sized>(
        &mut self,
        checkpoint: &CheckpointEvent,
        rng: &mut R,
    ) -> GateChanged {
        let previous = self.current;
        let next = if self.avoid_repeat && self.allowed.len() > 1 {
            let candidates: Vec<GateVariant> = self
                .allowed
                .iter()
                .copied()
                .filter(|&gate| gate != previous)
                .collect();
            candidates.choose(rng).copied()
        } else {
            self.allowed.choose(rng).copied()
        };
        // The allowed set is never empty, so `choose` always yields a gate
        self.current = next.unwrap_or(previous);

        log::info!(
            "[Sequencer] Checkpoint '{}' at beat {}: {} -> {}",
            checkpoint.label,
            checkpoint.beat_stamp,
            previous,
            self.current
        );

        GateChanged {
            previous,
            new: self.current,
            checkpoint_label: checkpoint.label.clone(),
            beat_stamp: checkpoint.beat_stamp,
        }
    }

    /// Return to the initial gate for a replay
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
