use std::path::PathBuf;

use gate_rhythm::{
    BeatMap, Direction, GameSession, GateVariant, Judgment, PlayerInput, SessionConfig,
    TriState, TruthSource,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

fn fixture_session() -> GameSession {
    let config = SessionConfig::load_from_file(fixture_path("session_config.json"))
        .expect("fixture config loads");
    let beatmap =
        BeatMap::load_from_file(fixture_path("basic_song.json")).expect("fixture beatmap loads");
    GameSession::new(config, beatmap).expect("fixture session starts")
}

#[test]
fn fixture_files_load() {
    let session = fixture_session();
    let config = session.config();
    assert_eq!(config.lanes.num_lanes, 4);
    assert_eq!(config.gates.initial, GateVariant::Xor);
    assert_eq!(config.gates.truth_source, TruthSource::Authored);
    assert_eq!(config.seed, Some(42));

    let beatmap = session.beatmap();
    assert_eq!(beatmap.title(), Some("basic_song"));
    assert_eq!(beatmap.beat_duration(), 0.5);
    assert_eq!(beatmap.notes().len(), 32);
    assert_eq!(beatmap.notes()[0].forced_truth, TriState::False);
    assert_eq!(beatmap.notes()[4].forced_truth, TriState::True);
}

#[test]
fn full_song_with_channel_observers() {
    let mut session = fixture_session();
    let mut spawns = session.channels().subscribe_spawns();
    let mut gates = session.channels().subscribe_gate_changes();
    let mut scores = session.channels().subscribe_score_changes();

    let mut reported_spawns = 0;
    let mut reported_gates = Vec::new();
    let mut previous_gate = session.current_gate();
    let mut tick = 0u32;

    while !session.is_finished() {
        let song_time = f64::from(tick) * 0.02;
        let report = session.tick(song_time);
        assert!(report.errors.is_empty());
        reported_spawns += report.spawns.len();
        reported_gates.extend(report.gate_changes);

        // Authored truth: every pattern must evaluate to its note's value
        let due: Vec<_> = session
            .pending_beats()
            .filter(|beat| beat.target_time <= song_time)
            .cloned()
            .collect();
        for beat in due {
            let input = PlayerInput::new(
                beat.lane_group,
                Direction::from_truth(beat.expected_answer()),
                beat.target_time + 0.01,
            );
            let outcome = session.handle_input(input).unwrap().unwrap();
            assert_eq!(outcome.record.judgment, Judgment::Perfect);
            assert_eq!(outcome.record.correct, Some(true));
        }

        tick += 1;
        assert!(tick < 2_000, "session never finished");
    }

    let mut received_spawns = 0;
    while let Ok(command) = spawns.try_recv() {
        assert!(command.active);
        assert!(command.lane_index < 4);
        assert!(command.spawn_slot_index < 2);
        assert_eq!(command.lead_time, 2.0);
        received_spawns += 1;
    }
    assert_eq!(received_spawns, reported_spawns);

    assert_eq!(reported_gates.len(), 3);
    for change in &reported_gates {
        let received = gates.try_recv().unwrap();
        assert_eq!(&received, change);
        assert_eq!(change.previous, previous_gate);
        assert_ne!(change.new, change.previous, "avoid_repeat is enabled");
        previous_gate = change.new;
    }

    let mut last_score = None;
    while let Ok(score) = scores.try_recv() {
        last_score = Some(score);
    }
    let last_score = last_score.unwrap();
    assert_eq!(last_score.total_score, 9600.0);
    assert_eq!(last_score.all_combo, 32.0);
    // interval 10, step 0.1, capped at 1.5
    assert!((last_score.multiplier - 1.3).abs() < 1e-9);
}

#[test]
fn authored_truth_matches_expected_answers() {
    let mut session = fixture_session();
    session.tick(0.0);

    let beatmap = session.beatmap().clone();
    for beat in session.pending_beats() {
        let note = beatmap
            .notes()
            .iter()
            .find(|n| n.beat_stamp == beat.beat_stamp)
            .unwrap();
        if let Some(truth) = note.forced_truth.as_bool() {
            assert_eq!(beat.expected_answer(), truth, "beat {}", beat.beat_stamp);
        }
    }
}

#[test]
fn restart_replays_same_gate_sequence() {
    let mut session = fixture_session();
    let first: Vec<GateVariant> = (0..1_000)
        .flat_map(|tick| session.tick(f64::from(tick) * 0.02).gate_changes)
        .map(|change| change.new)
        .collect();

    session.restart();
    let second: Vec<GateVariant> = (0..1_000)
        .flat_map(|tick| session.tick(f64::from(tick) * 0.02).gate_changes)
        .map(|change| change.new)
        .collect();

    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(session.is_finished());
    assert_eq!(session.telemetry().counts.timeouts, 32);
}
