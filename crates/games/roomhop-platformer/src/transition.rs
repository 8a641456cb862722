use glam::Vec2;
use serde::{Deserialize, Serialize};

use roomhop_core::effects::Effect;
use roomhop_core::geometry::Direction;

use crate::config::{TransitionConfig, WorldConfig};
use crate::error::RoomError;
use crate::physics::{Body, PhysicsStep};
use crate::rooms::{ExitKey, RoomGraph, RoomId, RoomRegistry};
use crate::spawn::{self, Arrival};
use crate::tilemap::RoomLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionState {
    /// Player-controlled, physics running.
    Active,
    /// Physics frozen, input ignored, fade in flight.
    Transitioning,
}

impl std::fmt::Display for TransitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Transitioning => write!(f, "TRANSITIONING"),
        }
    }
}

/// Suppresses the portal the player just arrived through until they step
/// off it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalLock {
    locked: Option<u8>,
}

impl PortalLock {
    pub fn lock(&mut self, portal: u8) {
        self.locked = Some(portal);
    }

    pub fn clear(&mut self) {
        self.locked = None;
    }

    pub fn locked(&self) -> Option<u8> {
        self.locked
    }

    pub fn is_locked(&self, portal: u8) -> bool {
        self.locked == Some(portal)
    }

    /// Release the lock unless the locked portal is among `overlapping`.
    pub fn release_unless_overlapping(&mut self, overlapping: &[u8]) {
        if let Some(id) = self.locked
            && !overlapping.contains(&id)
        {
            self.locked = None;
        }
    }
}

/// A transition waiting for its fade-out to finish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub from: RoomId,
    pub to: RoomId,
    pub arrival: Arrival,
}

/// Result of a per-tick boundary check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Idle,
    Started { from: RoomId, to: RoomId },
    /// The player hit a closed exit this tick (reported once per contact).
    Blocked(ExitKey),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionController {
    config: TransitionConfig,
    state: TransitionState,
    pending: Option<PendingTransition>,
    lock: PortalLock,
    last_blocked: Option<ExitKey>,
}

impl TransitionController {
    pub fn new(config: TransitionConfig) -> Self {
        Self {
            config,
            state: TransitionState::Active,
            pending: None,
            lock: PortalLock::default(),
            last_blocked: None,
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.state == TransitionState::Transitioning
    }

    pub fn lock(&self) -> &PortalLock {
        &self.lock
    }

    pub fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    /// Look for portal overlaps and edge crossings after the physics step.
    ///
    /// `prev_pos` is the body position before the step; an unlinked portal
    /// pushes the player back there.
    pub fn check(
        &mut self,
        room: &RoomLayout,
        graph: &impl RoomGraph,
        body: &mut Body,
        prev_pos: Vec2,
        physics: &mut dyn PhysicsStep,
        effects: &mut Vec<Effect>,
    ) -> CheckOutcome {
        if self.is_transitioning() {
            return CheckOutcome::Idle;
        }

        let player = body.rect();
        let overlapping: Vec<u8> = room
            .portals
            .iter()
            .filter(|p| p.rect.overlaps(&player))
            .map(|p| p.id)
            .collect();
        self.lock.release_unless_overlapping(&overlapping);

        let mut blocked = None;

        for &id in &overlapping {
            if self.lock.is_locked(id) {
                continue;
            }
            let exit = ExitKey::Portal(id);
            match graph.neighbor(&room.id, exit) {
                Some(to) => {
                    return self.begin(&room.id, to, Arrival::Portal(id), body, physics, effects);
                },
                None => {
                    tracing::debug!(room = %room.id, "portal link missing for {exit}");
                    body.pos = prev_pos;
                    body.vel = Vec2::ZERO;
                    blocked = Some(exit);
                    break;
                },
            }
        }

        let width = room.width();
        let height = room.height();
        for dir in Direction::ALL {
            let (crossed, overflowing) = match dir {
                Direction::West => (body.pos.x < 0.0, body.rect().left() < 0.0),
                Direction::East => (body.pos.x > width, body.rect().right() > width),
                Direction::North => (body.pos.y < 0.0, body.rect().top() < 0.0),
                Direction::South => (body.pos.y > height, body.rect().bottom() > height),
            };
            if !overflowing {
                continue;
            }
            let exit = ExitKey::Edge(dir);
            match graph.neighbor(&room.id, exit) {
                Some(to) => {
                    if crossed {
                        let carried = spawn::carried_coordinate(body.pos, dir, room.tile_size);
                        let arrival = Arrival::Edge { exit: dir, carried };
                        return self.begin(&room.id, to, arrival, body, physics, effects);
                    }
                },
                None => {
                    clamp_inside(body, dir, width, height);
                    blocked.get_or_insert(exit);
                },
            }
        }

        let newly_blocked = blocked.filter(|b| self.last_blocked != Some(*b));
        self.last_blocked = blocked;
        match newly_blocked {
            Some(exit) => {
                tracing::debug!(room = %room.id, "blocked at closed {exit}");
                CheckOutcome::Blocked(exit)
            },
            None => CheckOutcome::Idle,
        }
    }

    fn begin(
        &mut self,
        from: &str,
        to: RoomId,
        arrival: Arrival,
        body: &mut Body,
        physics: &mut dyn PhysicsStep,
        effects: &mut Vec<Effect>,
    ) -> CheckOutcome {
        self.state = TransitionState::Transitioning;
        self.last_blocked = None;
        self.pending = Some(PendingTransition {
            from: from.to_string(),
            to: to.clone(),
            arrival,
        });
        physics.pause();
        body.vel = Vec2::ZERO;
        effects.push(Effect::FadeOut {
            duration_ms: self.config.fade_out_ms,
        });
        effects.push(Effect::Shake {
            duration_ms: self.config.shake_ms,
            intensity: self.config.shake_intensity,
        });
        tracing::debug!("transition {from} -> {to} started");
        CheckOutcome::Started {
            from: from.to_string(),
            to,
        }
    }

    /// Finish the pending transition once the fade-out has played.
    ///
    /// Returns `None` when no transition was pending. On a failed load the
    /// previous room stays active, the player is pulled back inside it and
    /// the simulation resumes.
    pub fn on_fade_out_complete(
        &mut self,
        registry: &RoomRegistry,
        world: &WorldConfig,
        room: &mut RoomLayout,
        body: &mut Body,
        physics: &mut dyn PhysicsStep,
        effects: &mut Vec<Effect>,
    ) -> Option<Result<RoomId, RoomError>> {
        if !self.is_transitioning() {
            return None;
        }
        let pending = self.pending.take()?;

        let result = match registry.load(&pending.to, world) {
            Ok(next) => {
                physics.set_static_geometry(&next.platforms);
                body.pos =
                    spawn::resolve_or_fallback(&next, pending.arrival, self.config.spawn_search_radius);
                body.vel = Vec2::ZERO;
                match pending.arrival {
                    Arrival::Portal(id) => self.lock.lock(id),
                    _ => self.lock.clear(),
                }
                tracing::info!(
                    "entered {} from {} at ({:.0}, {:.0})",
                    next.id,
                    pending.from,
                    body.pos.x,
                    body.pos.y
                );
                *room = next;
                Ok(pending.to)
            },
            Err(e) => {
                tracing::error!("transition {} -> {} aborted: {e}", pending.from, pending.to);
                let half = body.size / 2.0;
                body.pos = body
                    .pos
                    .clamp(half, Vec2::new(room.width(), room.height()) - half);
                // Still standing on the portal that failed; it stays quiet
                // until the player steps off.
                if let Arrival::Portal(id) = pending.arrival {
                    self.lock.lock(id);
                }
                Err(e)
            },
        };

        effects.push(Effect::FadeIn {
            duration_ms: self.config.fade_in_ms,
        });
        physics.resume();
        self.state = TransitionState::Active;
        Some(result)
    }
}

fn clamp_inside(body: &mut Body, side: Direction, width: f32, height: f32) {
    let half = body.size / 2.0;
    match side {
        Direction::West => {
            body.pos.x = half.x;
            body.vel.x = body.vel.x.max(0.0);
        },
        Direction::East => {
            body.pos.x = width - half.x;
            body.vel.x = body.vel.x.min(0.0);
        },
        Direction::North => {
            body.pos.y = half.y;
            body.vel.y = body.vel.y.max(0.0);
        },
        Direction::South => {
            body.pos.y = height - half.y;
            body.vel.y = body.vel.y.min(0.0);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use roomhop_core::effects::EffectKind;

    use crate::physics::ArcadeWorld;
    use crate::rooms::{GridAdjacency, PortalAdjacency, Topology};

    const OPEN: [&str; 1] = ["...................."];

    fn world() -> WorldConfig {
        WorldConfig::default()
    }

    fn corridor_registry() -> RoomRegistry {
        RoomRegistry::new(Topology::Grid(GridAdjacency::row(&["A", "B"])))
            .with_room("A", &OPEN)
            .with_room("B", &OPEN)
    }

    fn portal_registry() -> RoomRegistry {
        let a = ["....................", ".1.................2"];
        let b = ["....................", ".1.................."];
        RoomRegistry::new(Topology::Portals(PortalAdjacency::new().link_both("A", 1, "B")))
            .with_room("A", &a)
            .with_room("B", &b)
    }

    struct Rig {
        registry: RoomRegistry,
        room: RoomLayout,
        body: Body,
        physics: ArcadeWorld,
        ctrl: TransitionController,
        effects: Vec<Effect>,
    }

    impl Rig {
        fn new(registry: RoomRegistry, start: &str, pos: Vec2) -> Self {
            let room = registry.load(start, &world()).unwrap();
            let mut physics = ArcadeWorld::new(&world());
            physics.set_static_geometry(&room.platforms);
            Self {
                registry,
                room,
                body: Body::new(pos, Vec2::splat(32.0)),
                physics,
                ctrl: TransitionController::new(TransitionConfig::default()),
                effects: Vec::new(),
            }
        }

        fn check(&mut self) -> CheckOutcome {
            let prev = self.body.pos;
            self.check_from(prev)
        }

        fn check_from(&mut self, prev: Vec2) -> CheckOutcome {
            self.ctrl.check(
                &self.room,
                &self.registry,
                &mut self.body,
                prev,
                &mut self.physics,
                &mut self.effects,
            )
        }

        fn complete(&mut self) -> Option<Result<RoomId, RoomError>> {
            self.ctrl.on_fade_out_complete(
                &self.registry,
                &world(),
                &mut self.room,
                &mut self.body,
                &mut self.physics,
                &mut self.effects,
            )
        }
    }

    #[test]
    fn crossing_linked_edge_starts_transition() {
        let mut rig = Rig::new(corridor_registry(), "A", Vec2::new(801.0, 100.0));
        rig.body.vel = Vec2::new(350.0, 10.0);
        let outcome = rig.check();
        assert_eq!(
            outcome,
            CheckOutcome::Started {
                from: "A".into(),
                to: "B".into()
            }
        );
        assert!(rig.ctrl.is_transitioning());
        assert!(rig.physics.is_paused());
        assert_eq!(rig.body.vel, Vec2::ZERO);
        let kinds: Vec<_> = rig.effects.iter().map(Effect::kind).collect();
        assert_eq!(kinds, vec![EffectKind::FadeOut, EffectKind::Shake]);
    }

    #[test]
    fn straddling_linked_edge_does_not_trigger_yet() {
        let mut rig = Rig::new(corridor_registry(), "A", Vec2::new(790.0, 100.0));
        assert_eq!(rig.check(), CheckOutcome::Idle);
        assert_eq!(rig.body.pos.x, 790.0, "no clamp toward an open neighbor");
    }

    #[test]
    fn fade_completion_swaps_room_and_places_player() {
        let mut rig = Rig::new(corridor_registry(), "A", Vec2::new(801.0, 130.0));
        rig.check();
        rig.effects.clear();
        assert_eq!(rig.complete(), Some(Ok("B".into())));
        assert_eq!(rig.room.id, "B");
        assert_eq!(rig.body.pos, Vec2::new(20.0, 140.0), "west border, row 3");
        assert_eq!(rig.ctrl.state(), TransitionState::Active);
        assert!(!rig.physics.is_paused());
        assert_eq!(rig.ctrl.lock().locked(), None);
        assert_eq!(
            rig.effects,
            vec![Effect::FadeIn {
                duration_ms: TransitionConfig::default().fade_in_ms
            }]
        );
    }

    #[test]
    fn second_trigger_while_transitioning_is_ignored() {
        let mut rig = Rig::new(corridor_registry(), "A", Vec2::new(801.0, 100.0));
        rig.check();
        let pending = rig.ctrl.pending().cloned();
        rig.body.pos = Vec2::new(-5.0, 100.0);
        assert_eq!(rig.check(), CheckOutcome::Idle);
        assert_eq!(rig.ctrl.pending().cloned(), pending);
    }

    #[test]
    fn spurious_completion_is_none() {
        let mut rig = Rig::new(corridor_registry(), "A", Vec2::new(100.0, 100.0));
        assert_eq!(rig.complete(), None);
        assert_eq!(rig.room.id, "A");
    }

    #[test]
    fn closed_edge_clamps_inside() {
        let mut rig = Rig::new(corridor_registry(), "B", Vec2::new(805.0, 100.0));
        rig.body.vel.x = 350.0;
        assert_eq!(
            rig.check(),
            CheckOutcome::Blocked(ExitKey::Edge(Direction::East))
        );
        assert_eq!(rig.body.pos.x, 800.0 - 16.0);
        assert_eq!(rig.body.vel.x, 0.0);
        assert!(!rig.ctrl.is_transitioning());

        // Pressing on the same wall is only reported once.
        rig.body.pos.x = 790.0;
        assert_eq!(rig.check(), CheckOutcome::Idle);
        assert_eq!(rig.body.pos.x, 784.0);
    }

    #[test]
    fn closed_floor_keeps_player_in_room() {
        let mut rig = Rig::new(corridor_registry(), "A", Vec2::new(100.0, 610.0));
        rig.body.vel.y = 500.0;
        rig.check();
        assert_eq!(rig.body.pos.y, 600.0 - 16.0);
        assert_eq!(rig.body.vel.y, 0.0);
    }

    #[test]
    fn missing_room_aborts_and_keeps_previous() {
        let registry = RoomRegistry::new(Topology::Grid(GridAdjacency::row(&["A", "GHOST"])))
            .with_room("A", &OPEN);
        let mut rig = Rig::new(registry, "A", Vec2::new(801.0, 100.0));
        rig.check();
        let result = rig.complete();
        assert_eq!(result, Some(Err(RoomError::NotFound("GHOST".into()))));
        assert_eq!(rig.room.id, "A");
        assert_eq!(rig.body.pos.x, 800.0 - 16.0, "pulled back inside A");
        assert_eq!(rig.ctrl.state(), TransitionState::Active);
        assert!(!rig.physics.is_paused());
    }

    #[test]
    fn failed_portal_load_locks_the_portal() {
        let a = ["....................", ".1.................."];
        let registry = RoomRegistry::new(Topology::Portals(PortalAdjacency::new().link(
            "A", 1, "GHOST",
        )))
        .with_room("A", &a);
        let mut rig = Rig::new(registry, "A", Vec2::new(60.0, 60.0));
        assert!(matches!(rig.check(), CheckOutcome::Started { .. }));
        assert_eq!(rig.complete(), Some(Err(RoomError::NotFound("GHOST".into()))));
        assert_eq!(rig.room.id, "A");
        assert_eq!(rig.ctrl.lock().locked(), Some(1));

        for _ in 0..5 {
            assert_eq!(rig.check(), CheckOutcome::Idle);
            assert!(!rig.ctrl.is_transitioning());
        }

        // Stepping off and back on tries again.
        rig.body.pos = Vec2::new(200.0, 60.0);
        rig.check();
        rig.body.pos = Vec2::new(60.0, 60.0);
        assert!(matches!(rig.check(), CheckOutcome::Started { .. }));
    }

    #[test]
    fn portal_entry_locks_arrival_portal() {
        let mut rig = Rig::new(portal_registry(), "A", Vec2::new(60.0, 60.0));
        assert!(matches!(rig.check(), CheckOutcome::Started { .. }));
        assert_eq!(rig.complete(), Some(Ok("B".into())));
        assert_eq!(rig.body.pos, Vec2::new(60.0, 60.0), "lands on B's portal 1");
        assert_eq!(rig.ctrl.lock().locked(), Some(1));

        // Standing on the locked portal never re-triggers.
        for _ in 0..3 {
            assert_eq!(rig.check(), CheckOutcome::Idle);
            assert!(!rig.ctrl.is_transitioning());
        }
    }

    #[test]
    fn lock_clears_after_stepping_off() {
        let mut rig = Rig::new(portal_registry(), "A", Vec2::new(60.0, 60.0));
        rig.check();
        rig.complete();
        rig.body.pos = Vec2::new(200.0, 60.0);
        assert_eq!(rig.check(), CheckOutcome::Idle);
        assert_eq!(rig.ctrl.lock().locked(), None);

        rig.body.pos = Vec2::new(60.0, 60.0);
        assert_eq!(
            rig.check(),
            CheckOutcome::Started {
                from: "B".into(),
                to: "A".into()
            }
        );
    }

    #[test]
    fn other_portal_triggers_despite_lock() {
        let a = ["....................", ".12................."];
        let b = ["....................", ".12................."];
        let registry = RoomRegistry::new(Topology::Portals(
            PortalAdjacency::new()
                .link_both("A", 1, "B")
                .link_both("A", 2, "B"),
        ))
        .with_room("A", &a)
        .with_room("B", &b);
        let mut rig = Rig::new(registry, "A", Vec2::new(60.0, 60.0));
        rig.check();
        rig.complete();
        assert_eq!(rig.ctrl.lock().locked(), Some(1));

        // Overlap portal 2 while still touching portal 1.
        rig.body.pos = Vec2::new(90.0, 60.0);
        assert!(matches!(rig.check(), CheckOutcome::Started { .. }));
        rig.complete();
        assert_eq!(rig.ctrl.lock().locked(), Some(2));
        assert_eq!(rig.body.pos, Vec2::new(100.0, 60.0));
    }

    #[test]
    fn unlinked_portal_bounces_back() {
        // A's portal 2 has no link.
        let mut rig = Rig::new(portal_registry(), "A", Vec2::new(760.0, 60.0));
        rig.body.vel = Vec2::new(350.0, 0.0);
        let outcome = rig.check_from(Vec2::new(700.0, 60.0));
        assert_eq!(outcome, CheckOutcome::Blocked(ExitKey::Portal(2)));
        assert_eq!(rig.body.pos, Vec2::new(700.0, 60.0));
        assert_eq!(rig.body.vel, Vec2::ZERO);
        assert!(!rig.ctrl.is_transitioning());
    }

    #[test]
    fn portal_rooms_have_closed_edges() {
        let mut rig = Rig::new(portal_registry(), "A", Vec2::new(-3.0, 300.0));
        assert_eq!(
            rig.check(),
            CheckOutcome::Blocked(ExitKey::Edge(Direction::West))
        );
        assert_eq!(rig.body.pos.x, 16.0);
    }

    #[test]
    fn portal_lock_release_rules() {
        let mut lock = PortalLock::default();
        lock.lock(4);
        lock.release_unless_overlapping(&[4, 5]);
        assert!(lock.is_locked(4));
        lock.release_unless_overlapping(&[5]);
        assert_eq!(lock.locked(), None);
    }
}
