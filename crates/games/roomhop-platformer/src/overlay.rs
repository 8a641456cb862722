use std::fmt::Write;

use crate::movement::{MovementState, PlayerController};
use crate::physics::Body;
use crate::transition::TransitionController;

/// Everything the overlay reports about one frame.
pub struct OverlayView<'a> {
    pub body: &'a Body,
    pub room: &'a str,
    pub controller: &'a PlayerController,
    pub transition: &'a TransitionController,
}

/// Round for display, folding `-0` into `0`. Non-finite values print as `--`.
fn axis(v: f32) -> String {
    if !v.is_finite() {
        return "--".to_string();
    }
    let r = v.round();
    if r == 0.0 {
        "0".to_string()
    } else {
        format!("{r:.0}")
    }
}

pub fn debug_text(view: &OverlayView<'_>) -> String {
    let body = view.body;
    let mut out = String::new();
    let _ = writeln!(out, "POS: {}, {}", axis(body.pos.x), axis(body.pos.y));
    let _ = writeln!(out, "VEL: {}, {}", axis(body.vel.x), axis(body.vel.y));
    let _ = writeln!(out, "ROOM: {}", view.room);

    let state = view.controller.state();
    let dash = if view.controller.dash_available() {
        "ready"
    } else {
        "spent"
    };
    let _ = writeln!(out, "STATE: {state} (dash {dash})");
    if state == MovementState::Dashing {
        let _ = writeln!(out, "DASH: {} ms", axis(view.controller.timers().dash_ms));
    }

    let _ = write!(out, "TRANSITION: {}", view.transition.state());
    if let Some(id) = view.transition.lock().locked() {
        let _ = write!(out, " (portal {id} locked)");
    }
    out
}
