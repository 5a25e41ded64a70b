//! Session configuration
//!
//! Everything a play session needs besides the beatmap: lane layout, note
//! travel (which sets the lead time), judgment tiers, combo multiplier,
//! gate selection and autoplay. Supplied once at session start and
//! immutable afterwards. Loaded from JSON; every field has a default so a
//! config file only needs the values it overrides.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::gate::GateVariant;
use crate::judgment::{ComboConfig, HitClassifier, Judgment, JudgmentTier, ScoreAccumulator};
use crate::sequencer::GateSequencer;

/// Complete session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub lanes: LaneConfig,
    pub travel: TravelConfig,
    pub scoring: ScoringConfig,
    pub gates: GateConfig,
    /// Answer every beat correctly on its target time
    pub autoplay: bool,
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

/// Lane layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Gate inputs per beat (lanes in a pattern)
    pub num_lanes: usize,
    /// Spawn locations a note event's lane group can address
    pub num_spawn_locations: usize,
    /// Emit inactive markers for lanes without a note
    pub emit_empty_markers: bool,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            num_lanes: 3,
            num_spawn_locations: 2,
            emit_empty_markers: false,
        }
    }
}

/// Note travel; lead time = distance / speed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Distance from spawn point to hit line (world units)
    pub distance: f64,
    /// Travel speed (world units per second)
    pub speed: f64,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            distance: 10.0,
            speed: 5.0,
        }
    }
}

impl TravelConfig {
    /// Seconds between spawn and the target beat
    ///
    /// # Errors
    /// `InvalidLeadTime` for a negative distance or non-positive speed.
    pub fn lead_time(&self) -> Result<f64, ConfigError> {
        let valid = self.distance.is_finite()
            && self.distance >= 0.0
            && self.speed.is_finite()
            && self.speed > 0.0;
        if !valid {
            return Err(ConfigError::InvalidLeadTime {
                distance: self.distance,
                speed: self.speed,
            });
        }
        Ok(self.distance / self.speed)
    }
}

/// Judgment tiers and score limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Hit tiers; widths are cumulative
    pub tiers: Vec<JudgmentTier>,
    /// Scoring applied to answers outside every window
    pub miss_tier: JudgmentTier,
    pub max_score: f64,
    pub combo: ComboConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                JudgmentTier::new(Judgment::Perfect, 300.0, 30.0, 0.05),
                JudgmentTier::new(Judgment::Great, 200.0, 20.0, 0.05),
                JudgmentTier::new(Judgment::Good, 100.0, 10.0, 0.1),
            ],
            miss_tier: JudgmentTier::miss(),
            max_score: 1_000_000.0,
            combo: ComboConfig::default(),
        }
    }
}

/// Where a beat's target truth value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthSource {
    /// Roll a fresh random value every beat, ignoring authored values
    #[default]
    Reroll,
    /// Use the note event's authored value; roll only for `Random`
    Authored,
}

/// Gate selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub allowed: Vec<GateVariant>,
    pub initial: GateVariant,
    /// Exclude the current gate when a checkpoint picks the next one
    pub avoid_repeat: bool,
    pub truth_source: TruthSource,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allowed: GateVariant::ALL.to_vec(),
            initial: GateVariant::And,
            avoid_repeat: false,
            truth_source: TruthSource::Reroll,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// `IoFailed` / `ParseFailed` when the file cannot be read or parsed, or
    /// any [`SessionConfig::validate`] error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        let config: SessionConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        log::info!("[Config] Loaded session configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Check every rule a session start depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lanes.num_lanes == 0 {
            return Err(ConfigError::NoLanes);
        }
        if self.lanes.num_spawn_locations == 0 {
            return Err(ConfigError::NoSpawnLocations);
        }
        self.travel.lead_time()?;
        self.hit_classifier()?;
        self.score_accumulator()?;
        self.gate_sequencer()?;
        Ok(())
    }

    pub(crate) fn hit_classifier(&self) -> Result<HitClassifier, ConfigError> {
        HitClassifier::new(self.scoring.tiers.clone(), self.scoring.miss_tier)
    }

    pub(crate) fn score_accumulator(&self) -> Result<ScoreAccumulator, ConfigError> {
        ScoreAccumulator::new(self.scoring.max_score, self.scoring.combo)
    }

    pub(crate) fn gate_sequencer(&self) -> Result<GateSequencer, ConfigError> {
        GateSequencer::new(&self.gates.allowed, self.gates.initial, self.gates.avoid_repeat)
    }
}
