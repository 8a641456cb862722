//! Per-tick movement state machine: run, variable-height jump with coyote
//! time and input buffering, and a timed dash.
//!
//! The controller never integrates anything itself. It reads the contact
//! flags from the previous physics step and writes velocity commands into
//! the [`Body`] for the next one.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use roomhop_core::effects::{Effect, Tint};
use roomhop_core::input::ActionSnapshot;

use crate::config::MovementConfig;
use crate::physics::{Body, Contacts};

/// Coarse movement state, for the overlay and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementState {
    Grounded,
    Airborne,
    Dashing,
}

impl std::fmt::Display for MovementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Grounded => "GROUNDED",
            Self::Airborne => "AIRBORNE",
            Self::Dashing => "DASHING",
        };
        write!(f, "{name}")
    }
}

/// Countdown timers in milliseconds. Active while `> 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementTimers {
    pub coyote_ms: f32,
    pub jump_buffer_ms: f32,
    pub dash_ms: f32,
    /// Time until the next dash afterimage.
    pub trail_ms: f32,
}

impl MovementTimers {
    fn tick(&mut self, delta_ms: f32) {
        for t in [
            &mut self.coyote_ms,
            &mut self.jump_buffer_ms,
            &mut self.dash_ms,
            &mut self.trail_ms,
        ] {
            *t = (*t - delta_ms).max(0.0);
        }
    }
}

/// Owns the player's movement timers, facing and dash state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerController {
    config: MovementConfig,
    timers: MovementTimers,
    /// Last nonzero input direction. Never zero.
    facing: Vec2,
    dash_available: bool,
    dashing: bool,
    grounded: bool,
    tint: Tint,
}

impl PlayerController {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            timers: MovementTimers::default(),
            facing: Vec2::X,
            dash_available: true,
            dashing: false,
            grounded: false,
            tint: Tint::Base,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn timers(&self) -> &MovementTimers {
        &self.timers
    }

    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    pub fn dash_available(&self) -> bool {
        self.dash_available
    }

    pub fn is_dashing(&self) -> bool {
        self.dashing
    }

    pub fn tint(&self) -> Tint {
        self.tint
    }

    pub fn state(&self) -> MovementState {
        if self.dashing {
            MovementState::Dashing
        } else if self.grounded {
            MovementState::Grounded
        } else {
            MovementState::Airborne
        }
    }

    /// Run one tick. `contacts` are the flags from the last physics step;
    /// visual requests are appended to `effects`.
    pub fn tick(
        &mut self,
        body: &mut Body,
        input: &ActionSnapshot,
        contacts: Contacts,
        delta_ms: f32,
        effects: &mut Vec<Effect>,
    ) {
        // 1. Timers
        self.timers.tick(delta_ms);

        // 2. Facing
        let (ax, ay) = input.axis();
        if ax != 0.0 || ay != 0.0 {
            self.facing = Vec2::new(ax, ay);
        }

        // 3. Ground contact
        self.grounded = contacts.grounded();
        if self.grounded {
            self.timers.coyote_ms = self.config.coyote_ms;
            self.dash_available = true;
            if !self.dashing {
                self.set_tint(Tint::Base, effects);
            }
        }

        // 4. Jump buffer
        if input.jump_pressed {
            self.timers.jump_buffer_ms = self.config.jump_buffer_ms;
        }

        // 5. Dash
        if self.dashing {
            if self.timers.dash_ms > 0.0 {
                if self.timers.trail_ms <= 0.0 {
                    effects.push(Effect::DashTrail {
                        x: body.pos.x,
                        y: body.pos.y,
                        fade_ms: self.config.dash_trail_fade_ms,
                    });
                    self.timers.trail_ms = self.config.dash_trail_interval_ms;
                }
                return;
            }
            self.end_dash(body, effects);
        }
        if input.dash_pressed && self.dash_available {
            self.start_dash(body, Vec2::new(ax, ay), effects);
            return;
        }

        // 6. Jump
        if self.timers.jump_buffer_ms > 0.0 && self.timers.coyote_ms > 0.0 {
            body.vel.y = self.config.jump_force;
            self.timers.jump_buffer_ms = 0.0;
            self.timers.coyote_ms = 0.0;
            effects.push(Effect::SquashStretch {
                scale_x: self.config.jump_squash_x,
                scale_y: self.config.jump_squash_y,
                duration_ms: self.config.jump_squash_ms,
            });
        }
        // Releasing jump early truncates the ascent.
        if !input.jump_held && body.vel.y < self.config.jump_cutoff {
            body.vel.y = self.config.jump_cutoff;
        }

        // 7. Horizontal run
        if ax != 0.0 {
            body.vel.x = ax * self.config.run_speed;
        } else if body.drag_x <= 0.0 {
            body.vel.x = 0.0;
        }
    }

    fn start_dash(&mut self, body: &mut Body, axis: Vec2, effects: &mut Vec<Effect>) {
        self.dash_available = false;
        self.dashing = true;
        self.timers.dash_ms = self.config.dash_ms;
        self.timers.trail_ms = 0.0;

        let mut dir = if axis == Vec2::ZERO { self.facing } else { axis };
        if dir.x != 0.0 && dir.y != 0.0 {
            dir *= FRAC_1_SQRT_2;
        }

        body.gravity_enabled = false;
        body.vel = dir * self.config.dash_speed;
        self.set_tint(Tint::Dash, effects);
        effects.push(Effect::Shake {
            duration_ms: self.config.dash_shake_ms,
            intensity: self.config.dash_shake_intensity,
        });
    }

    fn end_dash(&mut self, body: &mut Body, effects: &mut Vec<Effect>) {
        self.dashing = false;
        self.timers.dash_ms = 0.0;
        body.gravity_enabled = true;
        body.vel *= self.config.post_dash_damping;
        self.set_tint(Tint::Base, effects);
    }

    /// Abort any dash and pending jump without damping, e.g. when the player
    /// is teleported into another room.
    pub fn interrupt(&mut self, body: &mut Body, effects: &mut Vec<Effect>) {
        if self.dashing {
            self.dashing = false;
            self.timers.dash_ms = 0.0;
            body.gravity_enabled = true;
            self.set_tint(Tint::Base, effects);
        }
        self.timers.jump_buffer_ms = 0.0;
        self.timers.coyote_ms = 0.0;
        self.grounded = false;
    }

    fn set_tint(&mut self, tint: Tint, effects: &mut Vec<Effect>) {
        if self.tint != tint {
            self.tint = tint;
            effects.push(Effect::Tint(tint));
        }
    }
}
