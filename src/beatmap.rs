//! BeatMap - immutable song timing data
//!
//! A beatmap carries the tempo plus two beat-stamped event lists: note
//! events (one gate pattern per entry) and checkpoints (gate switches).
//! Both lists are stable-sorted by beat stamp when the map is built, which
//! is the ordering the scheduler relies on.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Truth value authored for a note event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    False,
    True,
    #[default]
    Random,
}

impl TriState {
    /// The fixed value, or `None` for `Random`
    pub fn as_bool(self) -> Option<bool> {
        match self {
            TriState::False => Some(false),
            TriState::True => Some(true),
            TriState::Random => None,
        }
    }
}

/// One beat's worth of notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Beat index the notes should reach the hit line on
    pub beat_stamp: f64,
    /// Spawn location the pattern appears at
    #[serde(default)]
    pub lane_group: usize,
    /// Authored truth value (only honoured with `TruthSource::Authored`)
    #[serde(default)]
    pub forced_truth: TriState,
}

/// Beat-stamped gate switch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEvent {
    pub label: String,
    pub beat_stamp: f64,
}

/// Raw on-disk shape, validated into [`BeatMap`]
#[derive(Debug, Deserialize)]
struct BeatMapFile {
    #[serde(default)]
    title: Option<String>,
    bpm: f64,
    #[serde(default)]
    notes: Vec<NoteEvent>,
    #[serde(default)]
    checkpoints: Vec<CheckpointEvent>,
}

/// Immutable song metadata and event lists
#[derive(Debug, Clone, Serialize)]
pub struct BeatMap {
    title: Option<String>,
    bpm: f64,
    beat_duration: f64,
    notes: Vec<NoteEvent>,
    checkpoints: Vec<CheckpointEvent>,
}

impl BeatMap {
    /// Build a beatmap, sorting both event lists by beat stamp
    ///
    /// # Errors
    /// `ConfigError::BpmInvalid` when `bpm` is not finite or not positive,
    /// `ConfigError::InvalidBeatStamp` for a NaN or infinite event stamp.
    pub fn new(
        bpm: f64,
        mut notes: Vec<NoteEvent>,
        mut checkpoints: Vec<CheckpointEvent>,
    ) -> Result<Self, ConfigError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(ConfigError::BpmInvalid { bpm });
        }
        let stamps = notes
            .iter()
            .map(|n| n.beat_stamp)
            .chain(checkpoints.iter().map(|c| c.beat_stamp));
        for beat_stamp in stamps {
            if !beat_stamp.is_finite() {
                return Err(ConfigError::InvalidBeatStamp { beat_stamp });
            }
        }

        notes.sort_by(|a, b| cmp_beats(a.beat_stamp, b.beat_stamp));
        checkpoints.sort_by(|a, b| cmp_beats(a.beat_stamp, b.beat_stamp));

        Ok(Self {
            title: None,
            bpm,
            beat_duration: 60.0 / bpm,
            notes,
            checkpoints,
        })
    }

    /// Attach a display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a beatmap from JSON
    ///
    /// ```json
    /// { "title": "demo", "bpm": 120,
    ///   "notes": [{ "beat_stamp": 4, "lane_group": 0, "forced_truth": "true" }],
    ///   "checkpoints": [{ "label": "verse", "beat_stamp": 16 }] }
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: BeatMapFile = serde_json::from_str(json)?;
        let map = Self::new(raw.bpm, raw.notes, raw.checkpoints)?;
        Ok(match raw.title {
            Some(title) => map.with_title(title),
            None => map,
        })
    }

    /// Load a beatmap JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        let map = Self::from_json_str(&contents)?;
        log::info!(
            "[BeatMap] Loaded {:?}: {} notes, {} checkpoints at {} BPM",
            path.as_ref(),
            map.notes.len(),
            map.checkpoints.len(),
            map.bpm
        );
        Ok(map)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Seconds per beat (`60 / bpm`)
    pub fn beat_duration(&self) -> f64 {
        self.beat_duration
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn checkpoints(&self) -> &[CheckpointEvent] {
        &self.checkpoints
    }

    /// Song time (seconds) of a beat stamp
    pub fn time_of_beat(&self, beat_stamp: f64) -> f64 {
        beat_stamp * self.beat_duration
    }

    /// Song time of the last authored event, or 0 for an empty map
    pub fn end_time(&self) -> f64 {
        let last_note = self.notes.last().map(|n| n.beat_stamp).unwrap_or(0.0);
        let last_checkpoint = self.checkpoints.last().map(|c| c.beat_stamp).unwrap_or(0.0);
        self.time_of_beat(last_note.max(last_checkpoint))
    }
}

fn cmp_beats(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(beat: f64) -> NoteEvent {
        NoteEvent {
            beat_stamp: beat,
            lane_group: 0,
            forced_truth: TriState::Random,
        }
    }

    #[test]
    fn test_beat_duration_from_bpm() {
        let map = BeatMap::new(120.0, vec![], vec![]).unwrap();
        assert!((map.beat_duration() - 0.5).abs() < 1e-12);
        assert!((map.time_of_beat(8.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_bpm() {
        for bpm in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                BeatMap::new(bpm, vec![], vec![]),
                Err(ConfigError::BpmInvalid { .. })
            ));
        }
    }

    #[test]
    fn test_rejects_non_finite_beat_stamps() {
        for stamp in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                BeatMap::new(60.0, vec![note(1.0), note(stamp)], vec![]),
                Err(ConfigError::InvalidBeatStamp { .. })
            ));
            let checkpoint = CheckpointEvent {
                label: "bad".to_string(),
                beat_stamp: stamp,
            };
            assert!(matches!(
                BeatMap::new(60.0, vec![], vec![checkpoint]),
                Err(ConfigError::InvalidBeatStamp { .. })
            ));
        }
    }

    #[test]
    fn test_events_are_sorted_on_build() {
        let map = BeatMap::new(
            60.0,
            vec![note(5.0), note(1.0), note(2.0)],
            vec![
                CheckpointEvent {
                    label: "b".to_string(),
                    beat_stamp: 8.0,
                },
                CheckpointEvent {
                    label: "a".to_string(),
                    beat_stamp: 4.0,
                },
            ],
        )
        .unwrap();

        let beats: Vec<f64> = map.notes().iter().map(|n| n.beat_stamp).collect();
        assert_eq!(beats, vec![1.0, 2.0, 5.0]);
        assert_eq!(map.checkpoints()[0].label, "a");
        assert!((map.end_time() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "title": "demo",
            "bpm": 90,
            "notes": [
                { "beat_stamp": 2 },
                { "beat_stamp": 1, "lane_group": 1, "forced_truth": "false" }
            ],
            "checkpoints": [{ "label": "drop", "beat_stamp": 4 }]
        }"#;
        let map = BeatMap::from_json_str(json).unwrap();
        assert_eq!(map.title(), Some("demo"));
        assert_eq!(map.notes()[0].lane_group, 1);
        assert_eq!(map.notes()[0].forced_truth, TriState::False);
        assert_eq!(map.notes()[1].forced_truth, TriState::Random);
        assert_eq!(map.checkpoints().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            BeatMap::from_json_str("{ \"bpm\": 0 }"),
            Err(ConfigError::BpmInvalid { .. })
        ));
        assert!(matches!(
            BeatMap::from_json_str("not json"),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.json");
        fs::write(&path, r#"{ "bpm": 150, "notes": [{ "beat_stamp": 3 }] }"#).unwrap();

        let map = BeatMap::load_from_file(&path).unwrap();
        assert_eq!(map.notes().len(), 1);
        assert!((map.beat_duration() - 0.4).abs() < 1e-12);

        assert!(matches!(
            BeatMap::load_from_file(dir.path().join("missing.json")),
            Err(ConfigError::IoFailed { .. })
        ));
    }

    #[test]
    fn test_tristate_as_bool() {
        assert_eq!(TriState::True.as_bool(), Some(true));
        assert_eq!(TriState::False.as_bool(), Some(false));
        assert_eq!(TriState::Random.as_bool(), None);
    }
}
