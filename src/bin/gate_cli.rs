use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gate_rhythm::judgment::ScoreState;
use gate_rhythm::telemetry::TelemetrySnapshot;
use gate_rhythm::{
    init_logging, BeatMap, Direction, GameSession, GateChanged, GateVariant, PlayerInput,
    SessionConfig,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "gate_cli",
    about = "Deterministic beatmap harness for the gate rhythm core"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a beatmap to the end and print a JSON score report
    Simulate {
        #[arg(long)]
        beatmap: PathBuf,
        /// Session config JSON (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the config's RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Let the session answer every beat itself
        #[arg(long)]
        autoplay: bool,
        /// Song clock step between ticks
        #[arg(long, default_value_t = 10)]
        tick_ms: u32,
        /// Scripted player: answer this many milliseconds off the beat
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset_ms: i32,
        /// Scripted player: answer every Nth beat wrongly (0 = never)
        #[arg(long, default_value_t = 0)]
        wrong_every: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check a beatmap and config without playing
    Validate {
        #[arg(long)]
        beatmap: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            beatmap,
            config,
            seed,
            autoplay,
            tick_ms,
            offset_ms,
            wrong_every,
            output,
        } => {
            let mut config = load_config(config.as_deref())?;
            if seed.is_some() {
                config.seed = seed;
            }
            config.autoplay |= autoplay;
            let player = ScriptedPlayer {
                offset: f64::from(offset_ms) / 1000.0,
                wrong_every,
                answered: 0,
            };
            run_simulate(&beatmap, config, tick_ms, player, output)
        }
        Commands::Validate { beatmap, config } => run_validate(&beatmap, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SessionConfig::default()),
    }
}

fn load_session(beatmap_path: &Path, config: SessionConfig) -> Result<GameSession> {
    let beatmap = BeatMap::load_from_file(beatmap_path)
        .with_context(|| format!("loading beatmap {}", beatmap_path.display()))?;
    GameSession::new(config, beatmap).context("starting session")
}

/// Answers pending beats at a fixed offset from their target time
struct ScriptedPlayer {
    offset: f64,
    wrong_every: u32,
    answered: u32,
}

impl ScriptedPlayer {
    fn play(&mut self, session: &mut GameSession, song_time: f64) -> Result<()> {
        let due: Vec<_> = session
            .pending_beats()
            .filter(|beat| beat.target_time + self.offset <= song_time)
            .cloned()
            .collect();

        for beat in due {
            self.answered += 1;
            let wrong = self.wrong_every > 0 && self.answered % self.wrong_every == 0;
            let direction = Direction::from_truth(beat.expected_answer() != wrong);
            let input = PlayerInput::new(beat.lane_group, direction, beat.target_time + self.offset);
            session.handle_input(input)?;
        }
        Ok(())
    }
}

fn run_simulate(
    beatmap_path: &Path,
    config: SessionConfig,
    tick_ms: u32,
    mut player: ScriptedPlayer,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    if tick_ms == 0 {
        bail!("--tick-ms must be positive");
    }
    let span = tracing::info_span!("simulate", beatmap = %beatmap_path.display());
    let _guard = span.enter();

    let autoplay = config.autoplay;
    let seed = config.seed;
    let mut session = load_session(beatmap_path, config)?;

    let step = f64::from(tick_ms) / 1000.0;
    let deadline = session.beatmap().end_time() + session.miss_window() + step + 1.0;
    let mut gate_changes = Vec::new();
    let mut spawn_count = 0;
    let mut skipped_events = 0;
    let mut ticks: u64 = 0;

    while !session.is_finished() {
        let song_time = ticks as f64 * step;
        if song_time > deadline {
            bail!("session did not finish by {song_time:.3}s");
        }

        let report = session.tick(song_time);
        spawn_count += report.spawns.len();
        skipped_events += report.errors.len();
        gate_changes.extend(report.gate_changes);
        if !autoplay {
            player.play(&mut session, song_time)?;
        }
        ticks += 1;
    }

    tracing::info!(ticks, spawn_count, "simulation finished");

    let report = SimulationReport {
        title: session.beatmap().title(),
        bpm: session.beatmap().bpm(),
        seed,
        autoplay,
        ticks,
        spawn_count,
        skipped_events,
        final_gate: session.current_gate(),
        score: session.score(),
        max_combo: session.max_combo(),
        gate_changes: &gate_changes,
        telemetry: session.telemetry(),
    };
    emit_json(&report, output_path)?;
    Ok(ExitCode::from(0))
}

fn run_validate(beatmap_path: &Path, config_path: Option<&Path>) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let session = load_session(beatmap_path, config)?;
    let beatmap = session.beatmap();

    let summary = ValidationSummary {
        title: beatmap.title(),
        bpm: beatmap.bpm(),
        notes: beatmap.notes().len(),
        checkpoints: beatmap.checkpoints().len(),
        lead_time: session.lead_time(),
        miss_window: session.miss_window(),
        duration: beatmap.end_time(),
    };
    emit_json(&summary, None)?;
    Ok(ExitCode::from(0))
}

fn emit_json<T: Serialize>(payload: &T, output_path: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(payload)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

#[derive(Serialize)]
struct SimulationReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    bpm: f64,
    seed: Option<u64>,
    autoplay: bool,
    ticks: u64,
    spawn_count: usize,
    skipped_events: usize,
    final_gate: GateVariant,
    score: ScoreState,
    max_combo: f64,
    #[serde(skip_serializing_if = "slice_empty")]
    gate_changes: &'a [GateChanged],
    telemetry: TelemetrySnapshot,
}

fn slice_empty(changes: &&[GateChanged]) -> bool {
    changes.is_empty()
}

#[derive(Serialize)]
struct ValidationSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    bpm: f64,
    notes: usize,
    checkpoints: usize,
    lead_time: f64,
    miss_window: f64,
    duration: f64,
}
