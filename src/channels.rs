// NotificationChannels: typed outbound channels owned by a session
// Single Responsibility: notification fan-out to external consumers

use tokio::sync::broadcast;

use crate::judgment::ScoreChanged;
use crate::scheduler::SpawnCommand;
use crate::sequencer::GateChanged;

/// Minimum buffer for spawn commands (several per beat, drained each frame)
const SPAWN_BUFFER: usize = 256;
/// Buffer for gate changes (one per checkpoint)
const GATE_BUFFER: usize = 16;
/// Buffer for score changes (one per judgment)
const SCORE_BUFFER: usize = 128;

/// One broadcast channel per notification type
///
/// The session is the only publisher. Consumers (visual pooling layer,
/// theming, HUD, health) subscribe independently; each receiver sees every
/// message of its channel in publish order. Publishing never blocks and
/// succeeds with no subscribers. A receiver that falls more than a buffer
/// behind observes `RecvError::Lagged` and skips ahead.
///
/// Sessions size the spawn buffer so one tick's spawns fit, but a receiver
/// that is drained less often than once per tick can still lag.
/// `TickReport::spawns` is the lossless record of every spawn command.
pub struct NotificationChannels {
    spawn: broadcast::Sender<SpawnCommand>,
    gate_changed: broadcast::Sender<GateChanged>,
    score_changed: broadcast::Sender<ScoreChanged>,
}

impl NotificationChannels {
    pub fn new() -> Self {
        Self::with_spawn_capacity(SPAWN_BUFFER)
    }

    /// Channels whose spawn buffer holds at least `capacity` commands
    pub fn with_spawn_capacity(capacity: usize) -> Self {
        let (spawn, _) = broadcast::channel(capacity.max(SPAWN_BUFFER));
        let (gate_changed, _) = broadcast::channel(GATE_BUFFER);
        let (score_changed, _) = broadcast::channel(SCORE_BUFFER);
        Self {
            spawn,
            gate_changed,
            score_changed,
        }
    }

    // ========================================================================
    // SPAWN CHANNEL
    // ========================================================================

    /// Subscribe to spawn commands
    pub fn subscribe_spawns(&self) -> broadcast::Receiver<SpawnCommand> {
        self.spawn.subscribe()
    }

    pub(crate) fn publish_spawn(&self, command: SpawnCommand) {
        // No subscribers is not an error
        let _ = self.spawn.send(command);
    }

    // ========================================================================
    // GATE-CHANGED CHANNEL
    // ========================================================================

    /// Subscribe to gate switches
    pub fn subscribe_gate_changes(&self) -> broadcast::Receiver<GateChanged> {
        self.gate_changed.subscribe()
    }

    pub(crate) fn publish_gate_changed(&self, change: GateChanged) {
        let _ = self.gate_changed.send(change);
    }

    // ========================================================================
    // SCORE-CHANGED CHANNEL
    // ========================================================================

    /// Subscribe to score updates
    pub fn subscribe_score_changes(&self) -> broadcast::Receiver<ScoreChanged> {
        self.score_changed.subscribe()
    }

    pub(crate) fn publish_score_changed(&self, change: ScoreChanged) {
        let _ = self.score_changed.send(change);
    }

    /// Live subscriber counts (spawn, gate, score)
    pub fn receiver_counts(&self) -> (usize, usize, usize) {
        (
            self.spawn.receiver_count(),
            self.gate_changed.receiver_count(),
            self.score_changed.receiver_count(),
        )
    }
}

impl Default for NotificationChannels {
    fn default() -> Self {
        Self::new()
    }
}
