use glam::Vec2;
use serde::{Deserialize, Serialize};

use roomhop_core::geometry::Direction;

use crate::error::SpawnError;
use crate::tilemap::{RoomLayout, Tile, cell_center};

/// How the player is arriving in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arrival {
    /// Game start or respawn: use the room's spawn marker.
    Fresh,
    /// Came through portal N of the previous room.
    Portal(u8),
    /// Walked off the `exit` edge of the previous room; `carried` is the
    /// aligned cross-axis cell coordinate at the moment of crossing.
    Edge { exit: Direction, carried: i32 },
}

/// Portal-indexed policy: the tile of the matching portal, or the default
/// spawn marker when entering fresh.
pub fn portal_spawn(layout: &RoomLayout, portal: Option<u8>) -> Option<Vec2> {
    match portal {
        Some(id) => layout.spawn_by_portal.get(&id).copied(),
        None => layout.default_spawn,
    }
}

/// Cross-axis cell coordinate of `pos` for an exit through `exit`.
pub fn carried_coordinate(pos: Vec2, exit: Direction, tile_size: f32) -> i32 {
    let v = if exit.is_horizontal() { pos.y } else { pos.x };
    (v / tile_size).floor() as i32
}

/// Border-scan policy.
///
/// The entry border is the one opposite `exit`. Offsets are tried in the
/// order 0, +1, -1, +2, -2, ... up to `radius`; the first open tile wins.
/// Portal tiles are skipped so an edge arrival never lands on a trigger.
pub fn border_scan(
    layout: &RoomLayout,
    exit: Direction,
    carried: i32,
    radius: u32,
) -> Result<Vec2, SpawnError> {
    let entry = exit.opposite();
    let len = layout.grid.border_len(entry) as i32;
    let from = carried.clamp(0, (len - 1).max(0));

    for step in 0..=radius as i32 {
        let offsets: &[i32] = if step == 0 { &[0] } else { &[step, -step] };
        for &off in offsets {
            let idx = from + off;
            if idx < 0 || idx >= len {
                continue;
            }
            let (c, r) = layout.grid.border_cell(entry, idx);
            if layout.grid.get(c, r).is_some_and(|t| matches!(t, Tile::Empty | Tile::Spawn)) {
                return Ok(cell_center(c, r, layout.tile_size));
            }
        }
    }

    Err(SpawnError::NotFound {
        room: layout.id.clone(),
        entry,
        from,
        radius,
    })
}

/// Deterministic fallback for a failed border scan: the middle cell of the
/// entry border.
pub fn border_fallback(layout: &RoomLayout, exit: Direction) -> Vec2 {
    let entry = exit.opposite();
    let mid = layout.grid.border_len(entry) as i32 / 2;
    let (c, r) = layout.grid.border_cell(entry, mid);
    cell_center(c, r, layout.tile_size)
}

/// Resolve an arrival with the policy matching how the player came in.
pub fn resolve(layout: &RoomLayout, arrival: Arrival, radius: u32) -> Result<Vec2, SpawnError> {
    match arrival {
        Arrival::Fresh => Ok(portal_spawn(layout, None).unwrap_or_else(|| room_center(layout))),
        Arrival::Portal(id) => Ok(portal_spawn(layout, Some(id))
            .or(layout.default_spawn)
            .unwrap_or_else(|| room_center(layout))),
        Arrival::Edge { exit, carried } => border_scan(layout, exit, carried, radius),
    }
}

/// [`resolve`], falling back instead of failing.
pub fn resolve_or_fallback(layout: &RoomLayout, arrival: Arrival, radius: u32) -> Vec2 {
    match resolve(layout, arrival, radius) {
        Ok(pos) => pos,
        Err(e) => {
            tracing::warn!("{e}, using border centre");
            match arrival {
                Arrival::Edge { exit, .. } => border_fallback(layout, exit),
                _ => room_center(layout),
            }
        },
    }
}

fn room_center(layout: &RoomLayout) -> Vec2 {
    Vec2::new(layout.width() / 2.0, layout.height() / 2.0)
}
