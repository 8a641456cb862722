pub mod config;
pub mod error;
pub mod layouts;
pub mod movement;
pub mod overlay;
pub mod physics;
pub mod rooms;
pub mod spawn;
pub mod tilemap;
pub mod transition;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use roomhop_core::effects::{Effect, EffectKind, Tint};
use roomhop_core::game_trait::{Game, GameEvent, GameMetadata};
use roomhop_core::input::ActionSnapshot;

use config::PlatformerConfig;
use error::RoomError;
use movement::{MovementState, MovementTimers, PlayerController};
use overlay::OverlayView;
use physics::{ArcadeWorld, Body, Contacts, PhysicsStep};
use rooms::{RoomId, RoomRegistry};
use spawn::Arrival;
use tilemap::RoomLayout;
use transition::{CheckOutcome, PendingTransition, TransitionController, TransitionState};

/// Longest frame the simulation will integrate in one update, in seconds.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Non-finite or negative frame times become zero; long frames are capped.
fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Serializable view of the game for debugging and replay comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformerSnapshot {
    pub room: RoomId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub movement: MovementState,
    pub timers: MovementTimers,
    pub facing: Vec2,
    pub dash_available: bool,
    pub tint: Tint,
    pub transition: TransitionState,
    pub pending: Option<PendingTransition>,
    pub locked_portal: Option<u8>,
    pub paused: bool,
}

/// A single-player room-hopping platformer.
///
/// Owns the active room, the player body and both controllers; the physics
/// collaborator defaults to [`ArcadeWorld`].
pub struct Platformer<P: PhysicsStep = ArcadeWorld> {
    config: PlatformerConfig,
    registry: RoomRegistry,
    room: RoomLayout,
    body: Body,
    controller: PlayerController,
    physics: P,
    transition: TransitionController,
    /// Contact flags from the most recent physics step.
    contacts: Contacts,
    paused: bool,
}

impl Platformer<ArcadeWorld> {
    pub fn new(
        config: PlatformerConfig,
        registry: RoomRegistry,
        start_room: &str,
    ) -> Result<Self, RoomError> {
        let physics = ArcadeWorld::new(&config.world);
        Self::with_physics(config, registry, start_room, physics)
    }
}

impl<P: PhysicsStep> Platformer<P> {
    pub fn with_physics(
        config: PlatformerConfig,
        registry: RoomRegistry,
        start_room: &str,
        mut physics: P,
    ) -> Result<Self, RoomError> {
        let room = registry.load(start_room, &config.world)?;
        physics.set_static_geometry(&room.platforms);

        let radius = config.transition.spawn_search_radius;
        let pos = spawn::resolve_or_fallback(&room, Arrival::Fresh, radius);
        let mut body = Body::new(
            pos,
            Vec2::new(config.world.player_width, config.world.player_height),
        );
        body.drag_x = config.world.player_drag_x;

        tracing::info!("starting in {} at ({:.0}, {:.0})", room.id, pos.x, pos.y);

        Ok(Self {
            controller: PlayerController::new(config.movement.clone()),
            transition: TransitionController::new(config.transition.clone()),
            config,
            registry,
            room,
            body,
            physics,
            contacts: Contacts::default(),
            paused: false,
        })
    }

    pub fn config(&self) -> &PlatformerConfig {
        &self.config
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn room(&self) -> &RoomLayout {
        &self.room
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn contacts(&self) -> Contacts {
        self.contacts
    }

    pub fn transition_state(&self) -> TransitionState {
        self.transition.state()
    }

    pub fn snapshot(&self) -> PlatformerSnapshot {
        PlatformerSnapshot {
            room: self.room.id.clone(),
            pos: self.body.pos,
            vel: self.body.vel,
            movement: self.controller.state(),
            timers: *self.controller.timers(),
            facing: self.controller.facing(),
            dash_available: self.controller.dash_available(),
            tint: self.controller.tint(),
            transition: self.transition.state(),
            pending: self.transition.pending().cloned(),
            locked_portal: self.transition.lock().locked(),
            paused: self.paused,
        }
    }
}

fn wrap_effects(effects: Vec<Effect>) -> impl Iterator<Item = GameEvent> {
    effects.into_iter().map(GameEvent::Effect)
}

impl<P: PhysicsStep> Game for Platformer<P> {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Roomhop".to_string(),
            description: "Run, jump and dash through a grid of rooms.".to_string(),
        }
    }

    fn update(&mut self, dt: f32, input: &ActionSnapshot) -> Vec<GameEvent> {
        let dt = sanitize_dt(dt);
        if self.paused || self.transition.is_transitioning() || dt == 0.0 {
            return Vec::new();
        }

        let mut effects = Vec::new();
        self.controller.tick(
            &mut self.body,
            input,
            self.contacts,
            dt * 1000.0,
            &mut effects,
        );

        let prev_pos = self.body.pos;
        self.contacts = self.physics.step(&mut self.body, dt);

        let outcome = self.transition.check(
            &self.room,
            &self.registry,
            &mut self.body,
            prev_pos,
            &mut self.physics,
            &mut effects,
        );

        let event = match outcome {
            CheckOutcome::Idle => None,
            CheckOutcome::Started { from, to } => {
                self.controller.interrupt(&mut self.body, &mut effects);
                self.contacts = Contacts::default();
                Some(GameEvent::TransitionStarted { from, to })
            },
            CheckOutcome::Blocked(exit) => Some(GameEvent::ExitBlocked {
                room: self.room.id.clone(),
                exit: exit.to_string(),
            }),
        };

        wrap_effects(effects).chain(event).collect()
    }

    fn effect_complete(&mut self, kind: EffectKind) -> Vec<GameEvent> {
        if kind != EffectKind::FadeOut {
            return Vec::new();
        }
        let mut effects = Vec::new();
        let Some(result) = self.transition.on_fade_out_complete(
            &self.registry,
            &self.config.world,
            &mut self.room,
            &mut self.body,
            &mut self.physics,
            &mut effects,
        ) else {
            return Vec::new();
        };
        self.contacts = Contacts::default();

        let event = match result {
            Ok(room) => GameEvent::RoomEntered { room },
            Err(e) => GameEvent::RoomLoadFailed {
                room: e.room().to_string(),
                reason: e.to_string(),
            },
        };
        wrap_effects(effects).chain(std::iter::once(event)).collect()
    }

    fn serialize_state(&self) -> Vec<u8> {
        match rmp_serde::to_vec(&self.snapshot()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("state serialization failed: {e}");
                Vec::new()
            },
        }
    }

    fn debug_overlay(&self) -> String {
        overlay::debug_text(&OverlayView {
            body: &self.body,
            room: &self.room.id,
            controller: &self.controller,
            transition: &self.transition,
        })
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
