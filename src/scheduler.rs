//! BeatScheduler - monotonic event queues against the song clock
//!
//! The scheduler owns two FIFO queues built from an immutable [`BeatMap`]:
//! - note events, drained against `song_time + lead_time` so notes spawned
//!   now reach the hit line exactly on their beat
//! - checkpoints, drained against the unshifted `song_time`
//!
//! Drained entries are never revisited. Replaying a song means building a
//! fresh scheduler from the same beatmap.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::beatmap::{BeatMap, CheckpointEvent, NoteEvent};
use crate::gate::LanePattern;

/// Instruction for the external visual/pooling layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnCommand {
    pub beat_stamp: f64,
    /// Lane index within the gate pattern
    pub lane_index: usize,
    /// Spawn location (the note event's lane group)
    pub spawn_slot_index: usize,
    /// `false` marks an empty lane slot
    pub active: bool,
    /// Seconds the note travels before reaching the hit line
    pub lead_time: f64,
}

/// Events that became due during one `advance`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DueEvents {
    pub checkpoints: Vec<CheckpointEvent>,
    pub notes: Vec<NoteEvent>,
}

impl DueEvents {
    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty() && self.notes.is_empty()
    }
}

/// Queue-based beat scheduler
#[derive(Debug, Clone)]
pub struct BeatScheduler {
    beat_duration: f64,
    notes: VecDeque<NoteEvent>,
    checkpoints: VecDeque<CheckpointEvent>,
    emit_empty_markers: bool,
    last_song_time: Option<f64>,
}

impl BeatScheduler {
    /// Build fresh queues from a beatmap
    pub fn new(beatmap: &BeatMap, emit_empty_markers: bool) -> Self {
        let notes: VecDeque<NoteEvent> = beatmap.notes().iter().cloned().collect();
        let checkpoints: VecDeque<CheckpointEvent> =
            beatmap.checkpoints().iter().cloned().collect();

        debug_assert!(
            notes
                .iter()
                .zip(notes.iter().skip(1))
                .all(|(a, b)| a.beat_stamp <= b.beat_stamp),
            "note queue must be sorted by beat stamp"
        );
        debug_assert!(
            checkpoints
                .iter()
                .zip(checkpoints.iter().skip(1))
                .all(|(a, b)| a.beat_stamp <= b.beat_stamp),
            "checkpoint queue must be sorted by beat stamp"
        );

        Self {
            beat_duration: beatmap.beat_duration(),
            notes,
            checkpoints,
            emit_empty_markers,
            last_song_time: None,
        }
    }

    /// Beat index reached at `time` (`floor(time / beat_duration)`)
    pub fn beat_at(&self, time: f64) -> f64 {
        (time / self.beat_duration).floor()
    }

    /// Song time a note is judged against
    ///
    /// A note drains on the first whole beat at or after its stamp, so a
    /// fractional stamp arrives on `ceil(beat_stamp)`. Whole stamps are
    /// unchanged.
    pub fn arrival_time(&self, beat_stamp: f64) -> f64 {
        beat_stamp.ceil() * self.beat_duration
    }

    /// Most queued notes whose arrival times fit inside one `span` window
    pub fn max_notes_within(&self, span: f64) -> usize {
        let arrivals: Vec<f64> = self
            .notes
            .iter()
            .map(|n| self.arrival_time(n.beat_stamp))
            .collect();

        let mut best = 0;
        let mut start = 0;
        for (end, &arrival) in arrivals.iter().enumerate() {
            while arrival - arrivals[start] > span {
                start += 1;
            }
            best = best.max(end - start + 1);
        }
        best
    }

    /// Drain every event that is due at `song_time`
    ///
    /// Notes are due when `beat_stamp <= floor((song_time + lead_time) /
    /// beat_duration)`; checkpoints when `beat_stamp <= floor(song_time /
    /// beat_duration)`. `song_time` must not decrease between calls.
    pub fn advance(&mut self, song_time: f64, lead_time: f64) -> DueEvents {
        debug_assert!(
            self.last_song_time.map_or(true, |last| song_time >= last),
            "song time must be monotonic"
        );
        self.last_song_time = Some(song_time);

        let checkpoint_beat = self.beat_at(song_time);
        let note_beat = self.beat_at(song_time + lead_time);

        let mut due = DueEvents::default();
        while self
            .checkpoints
            .front()
            .is_some_and(|c| c.beat_stamp <= checkpoint_beat)
        {
            if let Some(checkpoint) = self.checkpoints.pop_front() {
                due.checkpoints.push(checkpoint);
            }
        }
        while self
            .notes
            .front()
            .is_some_and(|n| n.beat_stamp <= note_beat)
        {
            if let Some(note) = self.notes.pop_front() {
                due.notes.push(note);
            }
        }

        due
    }

    /// Spawn commands for one note's pattern
    ///
    /// One command per active lane; with empty markers enabled, inactive
    /// lanes get an `active: false` command so every lane slot is covered.
    pub fn spawn_commands(
        &self,
        note: &NoteEvent,
        pattern: &LanePattern,
        lead_time: f64,
    ) -> Vec<SpawnCommand> {
        (0..pattern.num_lanes())
            .filter_map(|lane| {
                let active = pattern.is_active(lane);
                (active || self.emit_empty_markers).then_some(SpawnCommand {
                    beat_stamp: note.beat_stamp,
                    lane_index: lane,
                    spawn_slot_index: note.lane_group,
                    active,
                    lead_time,
                })
            })
            .collect()
    }

    pub fn beat_duration(&self) -> f64 {
        self.beat_duration
    }

    pub fn remaining_notes(&self) -> usize {
        self.notes.len()
    }

    pub fn remaining_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    /// Both queues drained
    pub fn is_finished(&self) -> bool {
        self.notes.is_empty() && self.checkpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beatmap::TriState;

    fn note(beat: f64, group: usize) -> NoteEvent {
        NoteEvent {
            beat_stamp: beat,
            lane_group: group,
            forced_truth: TriState::Random,
        }
    }

    fn checkpoint(label: &str, beat: f64) -> CheckpointEvent {
        CheckpointEvent {
            label: label.to_string(),
            beat_stamp: beat,
        }
    }

    fn beats(events: &[NoteEvent]) -> Vec<f64> {
        events.iter().map(|n| n.beat_stamp).collect()
    }

    /// 60 BPM: one beat per second
    fn one_second_beats(notes: Vec<NoteEvent>, checkpoints: Vec<CheckpointEvent>) -> BeatScheduler {
        let map = BeatMap::new(60.0, notes, checkpoints).unwrap();
        BeatScheduler::new(&map, false)
    }

    #[test]
    fn test_due_ordering_with_one_beat_lead() {
        let mut scheduler =
            one_second_beats(vec![note(1.0, 0), note(2.0, 0), note(5.0, 0)], vec![]);

        assert_eq!(beats(&scheduler.advance(0.0, 1.0).notes), vec![1.0]);
        assert!(scheduler.advance(0.5, 1.0).notes.is_empty());
        assert!(scheduler.advance(0.99, 1.0).notes.is_empty());
        assert_eq!(beats(&scheduler.advance(1.0, 1.0).notes), vec![2.0]);
        assert!(scheduler.advance(3.9, 1.0).notes.is_empty());
        assert_eq!(beats(&scheduler.advance(4.0, 1.0).notes), vec![5.0]);
        assert!(scheduler.advance(10.0, 1.0).is_empty());
        assert!(scheduler.is_finished());
    }

    #[test]
    fn test_large_step_drains_everything_due_in_order() {
        let mut scheduler =
            one_second_beats(vec![note(1.0, 0), note(2.0, 1), note(5.0, 0)], vec![]);
        let due = scheduler.advance(3.0, 0.5);
        assert_eq!(beats(&due.notes), vec![1.0, 2.0]);
        assert_eq!(scheduler.remaining_notes(), 1);
    }

    #[test]
    fn test_checkpoints_ignore_lead_time() {
        let mut scheduler = one_second_beats(
            vec![note(4.0, 0)],
            vec![checkpoint("a", 2.0), checkpoint("b", 4.0)],
        );

        let due = scheduler.advance(1.5, 3.0);
        assert_eq!(beats(&due.notes), vec![4.0]);
        assert!(due.checkpoints.is_empty());

        let due = scheduler.advance(2.0, 3.0);
        assert_eq!(due.checkpoints.len(), 1);
        assert_eq!(due.checkpoints[0].label, "a");

        let due = scheduler.advance(4.2, 3.0);
        assert_eq!(due.checkpoints[0].label, "b");
        assert_eq!(scheduler.remaining_checkpoints(), 0);
    }

    #[test]
    fn test_fractional_beats_wait_for_next_whole_beat() {
        let mut scheduler = one_second_beats(vec![note(2.5, 0)], vec![]);
        assert!(scheduler.advance(2.6, 0.0).notes.is_empty());
        assert_eq!(beats(&scheduler.advance(3.0, 0.0).notes), vec![2.5]);
    }

    #[test]
    fn test_arrival_time_rounds_fractional_stamps_up() {
        let map = BeatMap::new(120.0, vec![], vec![]).unwrap();
        let scheduler = BeatScheduler::new(&map, false);
        assert_eq!(scheduler.arrival_time(4.0), 2.0);
        assert_eq!(scheduler.arrival_time(2.5), 1.5);
        assert_eq!(scheduler.arrival_time(2.01), 1.5);
    }

    #[test]
    fn test_max_notes_within_window() {
        let scheduler = one_second_beats(
            vec![
                note(1.0, 0),
                note(1.0, 1),
                note(2.0, 0),
                note(2.5, 0),
                note(10.0, 0),
            ],
            vec![],
        );
        // Arrivals 1, 1, 2, 3, 10
        assert_eq!(scheduler.max_notes_within(0.0), 2);
        assert_eq!(scheduler.max_notes_within(1.0), 3);
        assert_eq!(scheduler.max_notes_within(2.0), 4);
        assert_eq!(scheduler.max_notes_within(100.0), 5);
        assert_eq!(one_second_beats(vec![], vec![]).max_notes_within(5.0), 0);
    }

    #[test]
    fn test_beat_duration_scaling() {
        // 120 BPM: beat 4 starts at 2.0 seconds
        let map = BeatMap::new(120.0, vec![note(4.0, 0)], vec![]).unwrap();
        let mut scheduler = BeatScheduler::new(&map, false);
        assert!(scheduler.advance(0.0, 1.9).notes.is_empty());
        assert_eq!(scheduler.advance(0.5, 1.9).notes.len(), 1);
    }

    #[test]
    fn test_fresh_scheduler_replays_from_beatmap() {
        let map = BeatMap::new(60.0, vec![note(1.0, 0)], vec![]).unwrap();
        let mut first = BeatScheduler::new(&map, false);
        assert_eq!(first.advance(1.0, 0.0).notes.len(), 1);
        assert!(first.advance(2.0, 0.0).notes.is_empty());

        let mut replay = BeatScheduler::new(&map, false);
        assert_eq!(replay.advance(1.0, 0.0).notes.len(), 1);
    }

    #[test]
    fn test_spawn_commands_active_only() {
        let scheduler = one_second_beats(vec![], vec![]);
        let pattern = LanePattern::from_indices(4, &[0, 2]);
        let commands = scheduler.spawn_commands(&note(3.0, 1), &pattern, 1.5);

        assert_eq!(commands.len(), 2);
        assert!(commands.iter().all(|c| c.active));
        assert_eq!(commands[0].lane_index, 0);
        assert_eq!(commands[1].lane_index, 2);
        assert!(commands
            .iter()
            .all(|c| c.spawn_slot_index == 1 && c.beat_stamp == 3.0 && c.lead_time == 1.5));
    }

    #[test]
    fn test_spawn_commands_with_empty_markers() {
        let map = BeatMap::new(60.0, vec![], vec![]).unwrap();
        let scheduler = BeatScheduler::new(&map, true);
        let pattern = LanePattern::from_indices(3, &[1]);
        let commands = scheduler.spawn_commands(&note(1.0, 0), &pattern, 2.0);

        assert_eq!(commands.len(), 3);
        let flags: Vec<bool> = commands.iter().map(|c| c.active).collect();
        assert_eq!(flags, vec![false, true, false]);
    }
}
