// GameSession: explicit session context for one play-through
// Owns every piece of mutable core state and drives it once per tick

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::beatmap::{BeatMap, NoteEvent};
use crate::channels::NotificationChannels;
use crate::config::{SessionConfig, TruthSource};
use crate::error::{log_config_error, log_session_error, ConfigError, SessionError};
use crate::gate::{GateVariant, LanePattern};
use crate::input::{Direction, PlayerInput};
use crate::judgment::{HitClassifier, JudgmentTier, ScoreAccumulator, ScoreChanged, ScoreState};
use crate::scheduler::{BeatScheduler, SpawnCommand};
use crate::sequencer::{GateChanged, GateSequencer};
use crate::telemetry::{JudgmentRecord, SessionTelemetry, TelemetrySnapshot};


/// A spawned beat waiting for an answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBeat {
    pub beat_stamp: f64,
    /// Song time the notes reach the hit line
    pub target_time: f64,
    pub lane_group: usize,
    /// Gate the pattern was generated under
    pub gate: GateVariant,
    pub pattern: LanePattern,
}

impl PendingBeat {
    /// Truth value of the pattern under its gate
    pub fn expected_answer(&self) -> bool {
        self.gate.evaluate_pattern(&self.pattern)
    }
}

/// Result of judging one beat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgmentOutcome {
    pub record: JudgmentRecord,
    pub score: ScoreChanged,
}

/// Everything one tick produced
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub spawns: Vec<SpawnCommand>,
    pub gate_changes: Vec<GateChanged>,
    /// Autoplay answers and timeouts resolved this tick
    pub judgments: Vec<JudgmentOutcome>,
    /// Events skipped this tick
    pub errors: Vec<SessionError>,
}

/// Session context
///
/// Replaces scene-wide singletons: the scheduler, sequencer, classifier and
/// score accumulator are owned here and only mutated through [`tick`] and
/// [`handle_input`]. External layers read snapshots and subscribe to
/// [`NotificationChannels`].
///
/// [`tick`]: GameSession::tick
/// [`handle_input`]: GameSession::handle_input
pub struct GameSession {
    config: SessionConfig,
    beatmap: BeatMap,
    lead_time: f64,
    scheduler: BeatScheduler,
    sequencer: GateSequencer,
    classifier: HitClassifier,
    score: ScoreAccumulator,
    pending: Vec<VecDeque<PendingBeat>>,
    channels: NotificationChannels,
    telemetry: SessionTelemetry,
    rng: StdRng,
    song_time: Option<f64>,
}

impl GameSession {
    /// Validate the configuration and build a session
    ///
    /// Fails fast on any configuration error; nothing is partially built.
    pub fn new(config: SessionConfig, beatmap: BeatMap) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            log_config_error(&err, "GameSession::new");
            return Err(err);
        }

        let lead_time = config.travel.lead_time()?;
        let scheduler = BeatScheduler::new(&beatmap, config.lanes.emit_empty_markers);
        let sequencer = config.gate_sequencer()?;
        let classifier = config.hit_classifier()?;
        let score = config.score_accumulator()?;
        let pending = vec![VecDeque::new(); config.lanes.num_spawn_locations];
        let rng = Self::seeded_rng(config.seed);
        // Every note arriving within one lead window can spawn in a single tick
        let burst = scheduler.max_notes_within(lead_time + beatmap.beat_duration());
        let channels = NotificationChannels::with_spawn_capacity(burst * config.lanes.num_lanes);

        log::info!(
            "[Session] Starting '{}': {} BPM, {} notes, {} checkpoints, lead {:.3}s, gate {}",
            beatmap.title().unwrap_or("untitled"),
            beatmap.bpm(),
            beatmap.notes().len(),
            beatmap.checkpoints().len(),
            lead_time,
            sequencer.current()
        );

        Ok(Self {
            config,
            beatmap,
            lead_time,
            scheduler,
            sequencer,
            classifier,
            score,
            pending,
            channels,
            telemetry: SessionTelemetry::default(),
            rng,
            song_time: None,
        })
    }

    fn seeded_rng(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Advance the session to `song_time`
    ///
    /// Order: due checkpoints switch the gate, due notes get one pattern each
    /// and are published as spawn commands, autoplay answers beats that have
    /// reached their target time, and beats past the outer judgment window
    /// time out. `song_time` must not decrease between calls.
    pub fn tick(&mut self, song_time: f64) -> TickReport {
        debug_assert!(
            self.song_time.map_or(true, |last| song_time >= last),
            "song time must be monotonic"
        );
        self.song_time = Some(song_time);

        let mut report = TickReport::default();
        let due = self.scheduler.advance(song_time, self.lead_time);

        for checkpoint in &due.checkpoints {
            let change = self.sequencer.on_checkpoint_due(checkpoint, &mut self.rng);
            self.channels.publish_gate_changed(change.clone());
            report.gate_changes.push(change);
        }

        for note in &due.notes {
            match self.spawn_note(note) {
                Ok(commands) => report.spawns.extend(commands),
                Err(err) => {
                    log_session_error(&err, "GameSession::tick");
                    self.telemetry.record_skipped();
                    report.errors.push(err);
                }
            }
        }

        if self.config.autoplay {
            self.autoplay(song_time, &mut report);
        }
        self.expire_overdue(song_time, &mut report);

        report
    }

    /// Generate and publish one note's pattern
    fn spawn_note(&mut self, note: &NoteEvent) -> Result<Vec<SpawnCommand>, SessionError> {
        let spawn_locations = self.config.lanes.num_spawn_locations;
        if note.lane_group >= spawn_locations {
            return Err(SessionError::LaneGroupOutOfRange {
                lane_group: note.lane_group,
                spawn_locations,
                beat_stamp: Some(note.beat_stamp),
            });
        }

        let truth = match self.config.gates.truth_source {
            TruthSource::Reroll => self.rng.gen::<bool>(),
            TruthSource::Authored => match note.forced_truth.as_bool() {
                Some(truth) => truth,
                None => self.rng.gen::<bool>(),
            },
        };
        let gate = self.sequencer.current();
        let pattern = gate.generate(truth, self.config.lanes.num_lanes, &mut self.rng);
        let commands = self
            .scheduler
            .spawn_commands(note, &pattern, self.lead_time);

        log::debug!(
            "[Session] Beat {} group {}: {} {:?} -> {}",
            note.beat_stamp,
            note.lane_group,
            gate,
            pattern.active_lanes(),
            truth
        );

        for command in &commands {
            self.channels.publish_spawn(*command);
        }
        self.pending[note.lane_group].push_back(PendingBeat {
            beat_stamp: note.beat_stamp,
            target_time: self.scheduler.arrival_time(note.beat_stamp),
            lane_group: note.lane_group,
            gate,
            pattern,
        });

        Ok(commands)
    }

    fn autoplay(&mut self, song_time: f64, report: &mut TickReport) {
        for group in 0..self.pending.len() {
            while let Some(beat) = self.pop_pending_if(group, |b| b.target_time <= song_time) {
                let answer = Direction::from_truth(beat.expected_answer());
                let outcome = self.resolve_answer(beat, answer, song_time);
                report.judgments.push(outcome);
            }
        }
    }

    fn expire_overdue(&mut self, song_time: f64, report: &mut TickReport) {
        let outer_window = self.classifier.outer_window();
        for group in 0..self.pending.len() {
            while let Some(beat) =
                self.pop_pending_if(group, |b| song_time - b.target_time > outer_window)
            {
                let outcome = self.judge_timeout(beat);
                report.judgments.push(outcome);
            }
        }
    }

    fn pop_pending_if(
        &mut self,
        group: usize,
        due: impl Fn(&PendingBeat) -> bool,
    ) -> Option<PendingBeat> {
        let queue = self.pending.get_mut(group)?;
        if queue.front().is_some_and(due) {
            queue.pop_front()
        } else {
            None
        }
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// Answer the oldest pending beat of the input's lane group
    ///
    /// Returns `Ok(None)` when that lane group has nothing pending, or when
    /// the input lands before the beat's outer window (the beat stays
    /// pending). An input after the outer window times the beat out.
    pub fn handle_input(
        &mut self,
        input: PlayerInput,
    ) -> Result<Option<JudgmentOutcome>, SessionError> {
        let spawn_locations = self.pending.len();
        if input.lane_group >= spawn_locations {
            let err = SessionError::LaneGroupOutOfRange {
                lane_group: input.lane_group,
                spawn_locations,
                beat_stamp: None,
            };
            log_session_error(&err, "GameSession::handle_input");
            return Err(err);
        }

        let outer_window = self.classifier.outer_window();
        let early = |beat: &PendingBeat| input.timestamp - beat.target_time < -outer_window;
        match self.pending[input.lane_group].front() {
            None => {
                log::debug!(
                    "[Session] Input on lane group {} with nothing pending; ignored",
                    input.lane_group
                );
                return Ok(None);
            }
            Some(beat) if early(beat) => {
                log::debug!(
                    "[Session] Input at {:.3}s is before the window of beat {}; ignored",
                    input.timestamp,
                    beat.beat_stamp
                );
                return Ok(None);
            }
            Some(_) => {}
        }

        Ok(self.pending[input.lane_group]
            .pop_front()
            .map(|beat| self.resolve_answer(beat, input.direction, input.timestamp)))
    }

    /// Judge an answer, or time the beat out when it lands past every window
    fn resolve_answer(
        &mut self,
        beat: PendingBeat,
        answer: Direction,
        timestamp: f64,
    ) -> JudgmentOutcome {
        if timestamp - beat.target_time > self.classifier.outer_window() {
            self.judge_timeout(beat)
        } else {
            self.judge_answer(beat, answer, timestamp)
        }
    }

    fn judge_answer(
        &mut self,
        beat: PendingBeat,
        answer: Direction,
        timestamp: f64,
    ) -> JudgmentOutcome {
        let timing_error = timestamp - beat.target_time;
        let tier = self.classifier.judge(timing_error);
        let correct = answer.as_bool() == beat.expected_answer();
        self.settle(&beat, tier, Some(correct), Some(timing_error))
    }

    fn judge_timeout(&mut self, beat: PendingBeat) -> JudgmentOutcome {
        let tier = self.classifier.miss_tier();
        self.settle(&beat, tier, None, None)
    }

    fn settle(
        &mut self,
        beat: &PendingBeat,
        tier: JudgmentTier,
        correct: Option<bool>,
        timing_error: Option<f64>,
    ) -> JudgmentOutcome {
        let score = self.score.on_judgment(&tier, correct);
        self.channels.publish_score_changed(score);

        let record = JudgmentRecord {
            beat_stamp: beat.beat_stamp,
            lane_group: beat.lane_group,
            gate: beat.gate,
            judgment: tier.judgment,
            correct,
            timing_error,
        };
        self.telemetry.record_judgment(record);

        JudgmentOutcome { record, score }
    }

    // ========================================================================
    // LIFECYCLE & SNAPSHOTS
    // ========================================================================

    /// Start the song over from fresh queues
    ///
    /// A seeded session replays the same patterns and gate switches.
    pub fn restart(&mut self) {
        self.scheduler = BeatScheduler::new(&self.beatmap, self.config.lanes.emit_empty_markers);
        self.sequencer.reset();
        self.score.reset();
        for queue in &mut self.pending {
            queue.clear();
        }
        self.telemetry = SessionTelemetry::default();
        self.rng = Self::seeded_rng(self.config.seed);
        self.song_time = None;
        log::info!("[Session] Restarted");
    }

    /// All notes spawned and every spawned beat judged
    pub fn is_finished(&self) -> bool {
        self.scheduler.is_finished() && self.pending.iter().all(VecDeque::is_empty)
    }

    /// Pending beats, per lane group in answer order
    pub fn pending_beats(&self) -> impl Iterator<Item = &PendingBeat> {
        self.pending.iter().flatten()
    }

    pub fn score(&self) -> ScoreState {
        self.score.state()
    }

    pub fn max_combo(&self) -> f64 {
        self.score.max_all_combo()
    }

    pub fn current_gate(&self) -> GateVariant {
        self.sequencer.current()
    }

    pub fn lead_time(&self) -> f64 {
        self.lead_time
    }

    /// Seconds after a beat before it times out
    pub fn miss_window(&self) -> f64 {
        self.classifier.outer_window()
    }

    pub fn song_time(&self) -> Option<f64> {
        self.song_time
    }

    pub fn channels(&self) -> &NotificationChannels {
        &self.channels
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn beatmap(&self) -> &BeatMap {
        &self.beatmap
    }
}
