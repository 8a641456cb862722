//! Roomhop headless harness
//!
//! Drives the platformer with a seeded random input script, acknowledges
//! fades after their nominal duration like a renderer would, checks a few
//! invariants every tick and prints a JSON summary.
//!
//! Usage:
//!   cargo run -p roomhop-sim
//!   cargo run -p roomhop-sim -- --seed 7 --ticks 3600 --vault

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use roomhop_core::effects::{Effect, EffectKind};
use roomhop_core::game_trait::{Game, GameEvent};
use roomhop_core::input::{Action, ActionSnapshot, InputBindings, InputState};
use roomhop_platformer::Platformer;
use roomhop_platformer::config::PlatformerConfig;
use roomhop_platformer::layouts;

const USAGE: &str = "usage: roomhop-sim [--seed N] [--ticks N] [--vault]";

#[derive(Debug, Clone, PartialEq)]
struct SimArgs {
    seed: u64,
    ticks: u32,
    vault: bool,
}

impl Default for SimArgs {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1800,
            vault: false,
        }
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<SimArgs, String> {
    let mut out = SimArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let v = args.next().ok_or("--seed needs a value")?;
                out.seed = v.parse().map_err(|e| format!("bad --seed {v:?}: {e}"))?;
            },
            "--ticks" => {
                let v = args.next().ok_or("--ticks needs a value")?;
                out.ticks = v.parse().map_err(|e| format!("bad --ticks {v:?}: {e}"))?;
            },
            "--vault" => out.vault = true,
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(out)
}

// ── Input script ────────────────────────────────────────────────────────

/// Holds a direction for a while, with occasional jump and dash taps.
///
/// Works at the key level: every action goes through a randomly chosen key
/// bound to it, and the bindings collapse the key state into a snapshot.
struct InputScript {
    rng: StdRng,
    bindings: InputBindings,
    keys: InputState,
    tapped: Vec<String>,
    ticks_left: u32,
}

impl InputScript {
    fn new(seed: u64, bindings: InputBindings) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            bindings,
            keys: InputState::new(),
            tapped: Vec::new(),
            ticks_left: 0,
        }
    }

    fn next_input(&mut self) -> ActionSnapshot {
        for key in std::mem::take(&mut self.tapped) {
            self.keys.on_key_up(key);
        }
        self.keys.end_frame();

        if self.ticks_left == 0 {
            let held: Vec<String> = self.keys.keys_down.iter().cloned().collect();
            for key in held {
                self.keys.on_key_up(key);
            }
            // Biased east so dungeon runs actually leave START.
            let dir = match self.rng.random_range(0u8..10) {
                0..=5 => Some(Action::Right),
                6..=7 => Some(Action::Left),
                _ => None,
            };
            if let Some(action) = dir {
                self.hold(action);
            }
            if self.rng.random_bool(0.3) {
                self.hold(Action::Jump);
            }
            self.ticks_left = self.rng.random_range(10..90);
        }
        self.ticks_left -= 1;

        if self.rng.random_bool(0.05) {
            self.tap(Action::Jump);
        }
        if self.rng.random_bool(0.02) {
            self.tap(Action::Dash);
        }
        self.bindings.snapshot(&self.keys)
    }

    fn hold(&mut self, action: Action) {
        if let Some(key) = self.bindings.keys_for(action).choose(&mut self.rng) {
            self.keys.on_key_down(key.clone());
        }
    }

    /// Press a bound key that is not already down, released next tick.
    fn tap(&mut self, action: Action) {
        let free: Vec<&String> = self
            .bindings
            .keys_for(action)
            .iter()
            .filter(|k| !self.keys.is_key_down(k))
            .collect();
        if let Some(key) = free.choose(&mut self.rng) {
            let key = (*key).clone();
            self.keys.on_key_down(key.clone());
            self.tapped.push(key);
        }
    }
}

// ── Summary ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
struct Summary {
    game: String,
    seed: u64,
    ticks: u32,
    start_room: String,
    final_room: String,
    final_position: [f32; 2],
    rooms_visited: Vec<String>,
    transitions: u32,
    exits_blocked: u32,
    load_failures: u32,
    effects: BTreeMap<String, u32>,
    violations: Vec<String>,
}

impl Summary {
    fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Effect(e) => {
                *self.effects.entry(format!("{:?}", e.kind())).or_default() += 1;
            },
            GameEvent::TransitionStarted { from, to } => {
                tracing::debug!("transition {from} -> {to}");
                self.transitions += 1;
            },
            GameEvent::RoomEntered { room } => {
                if !self.rooms_visited.contains(room) {
                    self.rooms_visited.push(room.clone());
                }
            },
            GameEvent::ExitBlocked { .. } => self.exits_blocked += 1,
            GameEvent::RoomLoadFailed { room, reason } => {
                tracing::warn!("load of {room} failed: {reason}");
                self.load_failures += 1;
            },
        }
    }
}

fn check_invariants(game: &Platformer, tick: u32, violations: &mut Vec<String>) {
    let body = game.body();
    if !body.pos.is_finite() || !body.vel.is_finite() {
        violations.push(format!("tick {tick}: non-finite body {:?}", body.pos));
        return;
    }
    let room = game.room();
    let half = body.size / 2.0;
    let inside = |v: f32, max: f32, h: f32| v >= -h && v <= max + h;
    if !inside(body.pos.x, room.width(), half.x) || !inside(body.pos.y, room.height(), half.y) {
        violations.push(format!(
            "tick {tick}: body at ({:.1}, {:.1}) outside {}",
            body.pos.x, body.pos.y, room.id
        ));
    }
    if game.controller().facing().length_squared() == 0.0 {
        violations.push(format!("tick {tick}: facing is zero"));
    }
}

fn run(args: &SimArgs) -> Result<Summary, String> {
    let config = PlatformerConfig::load();
    let (registry, start) = if args.vault {
        (layouts::vaults(), "VAULT_A")
    } else {
        (layouts::dungeon(), "START")
    };
    let fade_ms = config.transition.fade_out_ms;
    let bindings = config.bindings.clone();

    let mut game = Platformer::new(config, registry, start).map_err(|e| e.to_string())?;
    let dt = 1.0 / game.tick_rate();
    let frame_ms = dt * 1000.0;
    let game_name = game.metadata().name;
    tracing::info!(game = %game_name, seed = args.seed, "starting run in {start}");

    let mut script = InputScript::new(args.seed, bindings);
    let mut summary = Summary {
        game: game_name,
        seed: args.seed,
        ticks: args.ticks,
        start_room: start.to_string(),
        rooms_visited: vec![start.to_string()],
        ..Default::default()
    };

    // Remaining time on an in-flight fade-out.
    let mut fade_left: Option<f32> = None;

    for tick in 0..args.ticks {
        let input = script.next_input();
        let mut events = game.update(dt, &input);

        if let Some(left) = fade_left.as_mut() {
            *left -= frame_ms;
            if *left <= 0.0 {
                fade_left = None;
                events.extend(game.effect_complete(EffectKind::FadeOut));
            }
        }
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::Effect(Effect::FadeOut { .. })))
        {
            fade_left = Some(fade_ms);
        }

        for event in &events {
            summary.record(event);
        }
        check_invariants(&game, tick, &mut summary.violations);
    }

    let pos = game.body().pos;
    summary.final_room = game.room().id.clone();
    summary.final_position = [pos.x, pos.y];
    tracing::info!("{}", game.debug_overlay().replace('\n', " | "));
    Ok(summary)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(2);
        },
    };

    let summary = match run(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to start: {e}");
            std::process::exit(1);
        },
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to encode summary: {e}"),
    }

    if !summary.violations.is_empty() {
        std::process::exit(1);
    }
}
