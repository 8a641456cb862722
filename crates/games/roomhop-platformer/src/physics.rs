use glam::Vec2;
use serde::{Deserialize, Serialize};

use roomhop_core::geometry::Rect;

use crate::config::WorldConfig;

/// A dynamic body. The movement controller writes velocity commands into it
/// before each physics step; the step integrates and resolves collisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Centre position in world units.
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub gravity_enabled: bool,
    /// Horizontal deceleration in px/s^2. Zero disables drag.
    pub drag_x: f32,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size,
            gravity_enabled: true,
            drag_x: 0.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Per-axis contact flags reported after a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    pub down: bool,
    pub up: bool,
    pub left: bool,
    pub right: bool,
}

impl Contacts {
    pub fn grounded(&self) -> bool {
        self.down
    }
}

/// The physics collaborator: integrates a body against the active room's
/// static geometry.
pub trait PhysicsStep {
    /// Replace the static geometry. Only one room's worth exists at a time.
    fn set_static_geometry(&mut self, rects: &[Rect]);

    /// Integrate one step and report contacts. A paused world leaves the
    /// body untouched and reports no contacts.
    fn step(&mut self, body: &mut Body, dt: f32) -> Contacts;

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;
}

const MAX_SUBSTEPS: u32 = 64;

/// Minimal arcade-style physics: gravity, horizontal drag, per-axis speed
/// caps and axis-separated AABB resolution against static rects.
#[derive(Debug, Clone)]
pub struct ArcadeWorld {
    gravity: f32,
    max_velocity: Vec2,
    statics: Vec<Rect>,
    paused: bool,
}

impl ArcadeWorld {
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            gravity: config.gravity,
            max_velocity: Vec2::new(config.max_velocity_x, config.max_velocity_y),
            statics: Vec::new(),
            paused: false,
        }
    }

    pub fn statics(&self) -> &[Rect] {
        &self.statics
    }

    fn move_x(&self, body: &mut Body, dt: f32, contacts: &mut Contacts) {
        let dx = body.vel.x * dt;
        if dx == 0.0 {
            return;
        }
        let half = body.size / 2.0;
        body.pos.x += dx;
        for s in &self.statics {
            if !body.rect().overlaps(s) {
                continue;
            }
            if dx > 0.0 {
                body.pos.x = s.left() - half.x;
                contacts.right = true;
            } else {
                body.pos.x = s.right() + half.x;
                contacts.left = true;
            }
            body.vel.x = 0.0;
        }
    }

    fn move_y(&self, body: &mut Body, dt: f32, contacts: &mut Contacts) {
        let dy = body.vel.y * dt;
        if dy == 0.0 {
            return;
        }
        let half = body.size / 2.0;
        body.pos.y += dy;
        for s in &self.statics {
            if !body.rect().overlaps(s) {
                continue;
            }
            if dy > 0.0 {
                // Landed on top
                body.pos.y = s.top() - half.y;
                contacts.down = true;
            } else {
                // Hit head
                body.pos.y = s.bottom() + half.y;
                contacts.up = true;
            }
            body.vel.y = 0.0;
        }
    }
}

impl PhysicsStep for ArcadeWorld {
    fn set_static_geometry(&mut self, rects: &[Rect]) {
        self.statics.clear();
        self.statics.extend_from_slice(rects);
    }

    fn step(&mut self, body: &mut Body, dt: f32) -> Contacts {
        let mut contacts = Contacts::default();
        if self.paused || dt <= 0.0 {
            return contacts;
        }

        if body.gravity_enabled {
            body.vel.y += self.gravity * dt;
        }
        if body.drag_x > 0.0 {
            let slow = body.drag_x * dt;
            body.vel.x = if body.vel.x.abs() <= slow {
                0.0
            } else {
                body.vel.x - slow * body.vel.x.signum()
            };
        }
        body.vel = body.vel.clamp(-self.max_velocity, self.max_velocity);

        // Never move more than half the body per substep so thin walls hold.
        let half = body.size / 2.0;
        let reach = (body.vel.abs() * dt / half.max(Vec2::ONE)).max_element();
        let substeps = (reach.ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let sub_dt = dt / substeps as f32;
        for _ in 0..substeps {
            self.move_x(body, sub_dt, &mut contacts);
            self.move_y(body, sub_dt, &mut contacts);
        }

        contacts
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
