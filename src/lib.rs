// Gate Rhythm Core - logic-gate rhythm game engine
// Beat scheduling, gate patterns, judgment and scoring, free of any rendering layer

// Module declarations
pub mod beatmap;
pub mod channels;
pub mod config;
pub mod error;
pub mod gate;
pub mod input;
pub mod judgment;
pub mod scheduler;
pub mod sequencer;
pub mod session;
pub mod telemetry;

// Re-exports for convenience
pub use beatmap::{BeatMap, CheckpointEvent, NoteEvent, TriState};
pub use channels::NotificationChannels;
pub use config::{SessionConfig, TruthSource};
pub use error::{ConfigError, ErrorCode, SessionError};
pub use gate::{GateVariant, LanePattern};
pub use input::{Direction, PlayerInput};
pub use judgment::{HitClassifier, Judgment, JudgmentTier, ScoreAccumulator, ScoreChanged};
pub use scheduler::{BeatScheduler, SpawnCommand};
pub use sequencer::{GateChanged, GateSequencer};
pub use session::{GameSession, JudgmentOutcome, PendingBeat, TickReport};
pub use telemetry::{JudgmentRecord, TelemetrySnapshot};

/// Install a stderr `tracing` subscriber for hosts and tools
///
/// `log` records from the core are picked up by the subscriber's log
/// bridge. Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
