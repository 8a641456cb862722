use glam::Vec2;

use roomhop_core::effects::Effect;
use roomhop_core::game_trait::{Game, GameEvent};
use roomhop_core::input::{Action, ActionSnapshot};
use roomhop_core::test_helpers::{FRAME, complete_fades, idle, requested_fade_out};

use roomhop_platformer::Platformer;
use roomhop_platformer::config::PlatformerConfig;
use roomhop_platformer::layouts;
use roomhop_platformer::rooms::{GridAdjacency, PortalAdjacency, RoomRegistry, Topology};
use roomhop_platformer::transition::TransitionState;

fn game_in(registry: RoomRegistry, room: &str) -> Platformer {
    Platformer::new(PlatformerConfig::default(), registry, room).unwrap()
}

fn holding(action: Action) -> ActionSnapshot {
    ActionSnapshot::default().holding(action)
}

/// Tick with `input` until `done` holds or `max_ticks` run out, completing
/// every requested fade. Returns all events seen.
fn drive(
    game: &mut Platformer,
    input: &ActionSnapshot,
    max_ticks: usize,
    done: impl Fn(&Platformer) -> bool,
) -> Vec<GameEvent> {
    let mut log = Vec::new();
    for _ in 0..max_ticks {
        let events = game.update(FRAME, input);
        let follow_up = complete_fades(game, &events);
        log.extend(events);
        log.extend(follow_up);
        if done(game) {
            break;
        }
    }
    log
}

fn in_room(id: &'static str) -> impl Fn(&Platformer) -> bool {
    move |g| g.room().id == id
}

fn transitions(events: &[GameEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TransitionStarted { from, to } => Some((from.clone(), to.clone())),
            _ => None,
        })
        .collect()
}

fn blocked_exits(events: &[GameEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ExitBlocked { exit, .. } => Some(exit.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn walking_off_start_east_enters_hallway() {
    let mut game = game_in(layouts::dungeon(), "START");
    let events = drive(&mut game, &holding(Action::Right), 400, in_room("HALLWAY"));

    assert_eq!(game.room().id, "HALLWAY");
    assert_eq!(
        transitions(&events),
        vec![("START".to_string(), "HALLWAY".to_string())]
    );
    assert!(events.contains(&GameEvent::RoomEntered {
        room: "HALLWAY".into()
    }));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GameEvent::Effect(Effect::FadeIn { .. })))
    );
    // Crossed on row 13; HALLWAY's west border is open there.
    assert_eq!(game.body().pos, Vec2::new(20.0, 540.0));
    assert_eq!(game.body().vel, Vec2::ZERO);
    assert_eq!(game.transition_state(), TransitionState::Active);
}

#[test]
fn round_trip_returns_to_entry_border() {
    let mut game = game_in(layouts::dungeon(), "START");
    drive(&mut game, &holding(Action::Right), 400, in_room("HALLWAY"));
    let events = drive(&mut game, &holding(Action::Left), 100, in_room("START"));

    assert_eq!(game.room().id, "START");
    assert_eq!(
        transitions(&events),
        vec![("HALLWAY".to_string(), "START".to_string())]
    );
    // Back on START's east border, same row.
    assert_eq!(game.body().pos, Vec2::new(780.0, 540.0));
}

#[test]
fn border_scan_skips_wall_on_pit_entry() {
    let mut game = game_in(layouts::dungeon(), "START");
    drive(&mut game, &holding(Action::Right), 400, in_room("HALLWAY"));
    drive(&mut game, &holding(Action::Right), 400, in_room("PIT"));

    assert_eq!(game.room().id, "PIT");
    // Row 13 of PIT's west border is wall; row 12 is the nearest opening.
    assert_eq!(game.body().pos, Vec2::new(20.0, 500.0));
}

#[test]
fn pit_east_edge_is_a_wall() {
    let mut game = game_in(layouts::dungeon(), "PIT");
    let events = drive(&mut game, &holding(Action::Right), 240, |_| false);

    assert_eq!(game.room().id, "PIT");
    assert_eq!(game.body().pos.x, 800.0 - 16.0);
    assert_eq!(game.transition_state(), TransitionState::Active);
    assert!(transitions(&events).is_empty());
    assert_eq!(blocked_exits(&events), vec!["east edge".to_string()]);
}

#[test]
fn trigger_during_transition_is_ignored() {
    let mut game = game_in(layouts::dungeon(), "START");
    let mut crossing = Vec::new();
    for _ in 0..400 {
        crossing = game.update(FRAME, &holding(Action::Right));
        if requested_fade_out(&crossing) {
            break;
        }
    }
    assert_eq!(game.transition_state(), TransitionState::Transitioning);

    let frozen = game.serialize_state();
    for input in [holding(Action::Left), holding(Action::Right), idle()] {
        for _ in 0..20 {
            assert!(game.update(FRAME, &input).is_empty());
        }
    }
    assert_eq!(frozen, game.serialize_state(), "nothing moves mid-fade");

    let done = complete_fades(&mut game, &crossing);
    assert!(done.contains(&GameEvent::RoomEntered {
        room: "HALLWAY".into()
    }));
    assert_eq!(game.room().id, "HALLWAY");
}

#[test]
fn missing_room_keeps_previous_room() {
    let registry = RoomRegistry::new(Topology::Grid(GridAdjacency::row(&["START", "CELLAR"])))
        .with_room("START", layouts::START);
    let mut game = game_in(registry, "START");

    let mut failure = None;
    for _ in 0..400 {
        let events = game.update(FRAME, &holding(Action::Right));
        let follow_up = complete_fades(&mut game, &events);
        failure = follow_up.into_iter().find(|e| matches!(e, GameEvent::RoomLoadFailed { .. }));
        if failure.is_some() {
            break;
        }
    }

    match failure {
        Some(GameEvent::RoomLoadFailed { room, reason }) => {
            assert_eq!(room, "CELLAR");
            assert!(reason.contains("not found"), "{reason}");
        },
        other => panic!("expected RoomLoadFailed, got {other:?}"),
    }
    assert_eq!(game.room().id, "START");
    assert_eq!(game.transition_state(), TransitionState::Active);
    assert_eq!(game.body().pos.x, 800.0 - 16.0);

    // Simulation keeps running in START afterwards.
    let before = game.serialize_state();
    game.update(FRAME, &holding(Action::Left));
    assert_ne!(before, game.serialize_state());
}

fn load_failures(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::RoomLoadFailed { .. }))
        .count()
}

#[test]
fn portal_to_missing_room_fails_once() {
    let registry = RoomRegistry::new(Topology::Portals(
        PortalAdjacency::new().link("VAULT_A", 1, "GHOST"),
    ))
    .with_room("VAULT_A", layouts::VAULT_A);
    let mut game = game_in(registry, "VAULT_A");

    let mut events = drive(&mut game, &holding(Action::Right), 400, |g| {
        g.snapshot().locked_portal.is_some()
    });
    events.extend(drive(&mut game, &idle(), 300, |_| false));

    assert_eq!(
        transitions(&events),
        vec![("VAULT_A".to_string(), "GHOST".to_string())]
    );
    assert_eq!(load_failures(&events), 1);
    assert_eq!(game.room().id, "VAULT_A");
    assert_eq!(game.transition_state(), TransitionState::Active);
    assert_eq!(game.snapshot().locked_portal, Some(1));
    assert!(game.body().rect().overlaps(&game.room().portal(1).unwrap().rect));
}

#[test]
fn portal_lock_prevents_bounce_back() {
    let mut game = game_in(layouts::vaults(), "VAULT_A");
    drive(&mut game, &holding(Action::Right), 400, in_room("VAULT_B"));

    assert_eq!(game.room().id, "VAULT_B");
    let portal = game.room().portal(1).unwrap().rect.center;
    assert_eq!(game.body().pos, portal);
    assert_eq!(game.snapshot().locked_portal, Some(1));

    // Standing on the arrival portal never sends the player back.
    let events = drive(&mut game, &idle(), 60, |_| false);
    assert!(transitions(&events).is_empty());
    assert_eq!(game.room().id, "VAULT_B");
    assert!(game.body().rect().overlaps(&game.room().portal(1).unwrap().rect));
}

#[test]
fn unlinked_portal_acts_as_closed_door() {
    let mut game = game_in(layouts::vaults(), "VAULT_A");
    drive(&mut game, &holding(Action::Right), 400, in_room("VAULT_B"));

    // Walk into portal 3, which leads nowhere.
    let events = drive(&mut game, &holding(Action::Right), 200, |_| false);
    assert!(transitions(&events).is_empty());
    assert_eq!(blocked_exits(&events), vec!["portal 3".to_string()]);
    let door = game.room().portal(3).unwrap().rect;
    assert!(!game.body().rect().overlaps(&door));
    assert!(game.body().pos.x < door.left());
    assert_eq!(game.snapshot().locked_portal, None, "lock released on leaving portal 1");
}

#[test]
fn portal_round_trip_lands_on_origin_portal() {
    let mut game = game_in(layouts::vaults(), "VAULT_A");
    drive(&mut game, &holding(Action::Right), 400, in_room("VAULT_B"));
    drive(&mut game, &holding(Action::Right), 30, |_| false);
    let events = drive(&mut game, &holding(Action::Left), 400, in_room("VAULT_A"));

    assert_eq!(
        transitions(&events),
        vec![("VAULT_B".to_string(), "VAULT_A".to_string())]
    );
    assert_eq!(game.body().pos, game.room().portal(1).unwrap().rect.center);
    assert_eq!(game.snapshot().locked_portal, Some(1));
}

#[test]
fn dash_into_transition_is_cancelled() {
    let mut game = game_in(layouts::dungeon(), "START");
    // Get close to the east edge first.
    drive(&mut game, &holding(Action::Right), 400, |g| g.body().pos.x > 760.0);
    let dash = ActionSnapshot::default()
        .holding(Action::Right)
        .pressing(Action::Dash);
    drive(&mut game, &dash, 1, |_| false);
    drive(&mut game, &holding(Action::Right), 20, in_room("HALLWAY"));

    assert_eq!(game.room().id, "HALLWAY");
    assert!(!game.controller().is_dashing());
    assert!(game.body().gravity_enabled);
}
