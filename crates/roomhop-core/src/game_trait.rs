use serde::{Deserialize, Serialize};

use crate::effects::{Effect, EffectKind};
use crate::input::ActionSnapshot;

/// Core trait implemented by a simulation driven from a host frame loop.
///
/// The host owns rendering, audio and device polling; the game only
/// consumes logical input and returns events for the host to act on.
pub trait Game {
    /// Game metadata for menus and logs.
    fn metadata(&self) -> GameMetadata;

    /// Called each frame with the elapsed time in seconds.
    fn update(&mut self, dt: f32, input: &ActionSnapshot) -> Vec<GameEvent>;

    /// Called by the host when a previously requested effect has finished.
    fn effect_complete(&mut self, kind: EffectKind) -> Vec<GameEvent>;

    /// Serialize the current state for debugging and replay comparison.
    fn serialize_state(&self) -> Vec<u8>;

    /// Text shown by the host's debug overlay.
    fn debug_overlay(&self) -> String;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;
}

/// Game metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
}

/// Events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A visual effect the host should play.
    Effect(Effect),
    /// The player left `from` and a transition into `to` has begun.
    TransitionStarted { from: String, to: String },
    /// The active room changed.
    RoomEntered { room: String },
    /// The player ran into an exit with no destination.
    ExitBlocked { room: String, exit: String },
    /// A room failed to load; the previous room stays active.
    RoomLoadFailed { room: String, reason: String },
}

impl GameEvent {
    pub fn as_effect(&self) -> Option<&Effect> {
        match self {
            Self::Effect(e) => Some(e),
            _ => None,
        }
    }
}
