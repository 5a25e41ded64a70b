//! Session telemetry: judgment counts and timing statistics.
//!
//! The collector keeps a bounded history of recent judgments plus a rolling
//! timing-error window, and exposes a serializable snapshot for the CLI
//! report and HUD debug overlays.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::gate::GateVariant;
use crate::judgment::Judgment;

/// One judged beat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub beat_stamp: f64,
    pub lane_group: usize,
    pub gate: GateVariant,
    pub judgment: Judgment,
    /// `None` for a timeout
    pub correct: Option<bool>,
    /// Signed seconds relative to the target beat (positive = late)
    pub timing_error: Option<f64>,
}

/// Per-judgment totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentCounts {
    pub perfect: u32,
    pub great: u32,
    pub good: u32,
    pub miss: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub timeouts: u32,
}

impl JudgmentCounts {
    fn record(&mut self, judgment: Judgment, correct: Option<bool>) {
        match judgment {
            Judgment::Perfect => self.perfect += 1,
            Judgment::Great => self.great += 1,
            Judgment::Good => self.good += 1,
            Judgment::Miss => self.miss += 1,
        }
        match correct {
            Some(true) => self.correct += 1,
            Some(false) => self.incorrect += 1,
            None => self.timeouts += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.great + self.good + self.miss
    }
}

/// Snapshot of collector state for reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counts: JudgmentCounts,
    pub recent: Vec<JudgmentRecord>,
    /// Rolling mean of absolute timing error (seconds)
    pub avg_abs_error: f64,
    /// Rolling max of absolute timing error (seconds)
    pub max_abs_error: f64,
    pub skipped_events: u64,
}

/// Rolling window over absolute timing errors
struct TimingTracker {
    samples: VecDeque<f64>,
    max_samples: usize,
}

impl TimingTracker {
    fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples,
        }
    }

    fn observe(&mut self, value: f64) {
        if self.max_samples == 0 {
            return;
        }
        if self.samples.len() == self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value.abs());
    }

    fn stats(&self) -> (f64, f64) {
        let count = self.samples.len();
        if count == 0 {
            return (0.0, 0.0);
        }
        let sum: f64 = self.samples.iter().sum();
        let max = self.samples.iter().copied().fold(0.0_f64, f64::max);
        (sum / count as f64, max)
    }
}

/// Bounded judgment history plus derived timing gauges
pub struct SessionTelemetry {
    counts: JudgmentCounts,
    history: VecDeque<JudgmentRecord>,
    history_capacity: usize,
    timing: TimingTracker,
    skipped_events: u64,
}

impl SessionTelemetry {
    pub fn new(history_capacity: usize, timing_window: usize) -> Self {
        Self {
            counts: JudgmentCounts::default(),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            timing: TimingTracker::new(timing_window),
            skipped_events: 0,
        }
    }

    pub fn record_judgment(&mut self, record: JudgmentRecord) {
        self.counts.record(record.judgment, record.correct);
        if let Some(error) = record.timing_error {
            self.timing.observe(error);
        }

        if self.history_capacity == 0 {
            return;
        }
        if self.history.len() == self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(record);
    }

    /// Count an event that was skipped because of a session error
    pub fn record_skipped(&mut self) {
        self.skipped_events += 1;
    }

    pub fn counts(&self) -> JudgmentCounts {
        self.counts
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let (avg_abs_error, max_abs_error) = self.timing.stats();
        TelemetrySnapshot {
            counts: self.counts,
            recent: self.history.iter().copied().collect(),
            avg_abs_error,
            max_abs_error,
            skipped_events: self.skipped_events,
        }
    }
}

impl Default for SessionTelemetry {
    fn default() -> Self {
        Self::new(64, 32)
    }
}
