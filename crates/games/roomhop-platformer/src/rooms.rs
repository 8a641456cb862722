use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use roomhop_core::geometry::Direction;

use crate::config::WorldConfig;
use crate::error::RoomError;
use crate::tilemap::RoomLayout;

/// Unique identifier for a room.
pub type RoomId = String;

/// How the player leaves a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitKey {
    Portal(u8),
    Edge(Direction),
}

impl std::fmt::Display for ExitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Portal(id) => write!(f, "portal {id}"),
            Self::Edge(dir) => write!(f, "{dir} edge"),
        }
    }
}

/// Which room lies behind an exit. `None` means the exit is closed.
pub trait RoomGraph {
    fn neighbor(&self, room: &str, exit: ExitKey) -> Option<RoomId>;
}

/// Explicit `adjacency[room][portal] -> room` table. Screen edges never lead
/// anywhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalAdjacency {
    links: HashMap<RoomId, HashMap<u8, RoomId>>,
}

impl PortalAdjacency {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-way link from `portal` in `from` to `to`.
    pub fn link(mut self, from: &str, portal: u8, to: &str) -> Self {
        self.links
            .entry(from.to_string())
            .or_default()
            .insert(portal, to.to_string());
        self
    }

    /// Link `portal` in both directions between `a` and `b`.
    pub fn link_both(self, a: &str, portal: u8, b: &str) -> Self {
        self.link(a, portal, b).link(b, portal, a)
    }
}

impl RoomGraph for PortalAdjacency {
    fn neighbor(&self, room: &str, exit: ExitKey) -> Option<RoomId> {
        match exit {
            ExitKey::Portal(id) => self.links.get(room)?.get(&id).cloned(),
            ExitKey::Edge(_) => None,
        }
    }
}

/// Rooms laid out on a 2D grid; neighbours are grid-adjacent cells. Portals
/// never lead anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAdjacency {
    /// `cells[row][col]`; `None` marks a void cell.
    cells: Vec<Vec<Option<RoomId>>>,
}

impl GridAdjacency {
    pub fn new(cells: Vec<Vec<Option<RoomId>>>) -> Self {
        Self { cells }
    }

    /// Single row of rooms, west to east.
    pub fn row(rooms: &[&str]) -> Self {
        Self::new(vec![rooms.iter().map(|r| Some(r.to_string())).collect()])
    }

    /// (col, row) of `room` in the grid.
    pub fn position(&self, room: &str) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(r, line)| {
            line.iter()
                .position(|cell| cell.as_deref() == Some(room))
                .map(|c| (c, r))
        })
    }

    fn cell(&self, col: i64, row: i64) -> Option<&RoomId> {
        if col < 0 || row < 0 {
            return None;
        }
        self.cells.get(row as usize)?.get(col as usize)?.as_ref()
    }
}

impl RoomGraph for GridAdjacency {
    fn neighbor(&self, room: &str, exit: ExitKey) -> Option<RoomId> {
        let ExitKey::Edge(dir) = exit else {
            return None;
        };
        let (col, row) = self.position(room)?;
        let (dc, dr) = dir.offset();
        self.cell(col as i64 + dc as i64, row as i64 + dr as i64)
            .cloned()
    }
}

/// The room graph shape, selected at configuration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Topology {
    Portals(PortalAdjacency),
    Grid(GridAdjacency),
}

impl RoomGraph for Topology {
    fn neighbor(&self, room: &str, exit: ExitKey) -> Option<RoomId> {
        match self {
            Self::Portals(g) => g.neighbor(room, exit),
            Self::Grid(g) => g.neighbor(room, exit),
        }
    }
}

/// Named ASCII layouts plus the graph connecting them.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    layouts: HashMap<RoomId, Vec<String>>,
    topology: Topology,
}

impl RoomRegistry {
    pub fn new(topology: Topology) -> Self {
        Self {
            layouts: HashMap::new(),
            topology,
        }
    }

    pub fn with_room<S: AsRef<str>>(mut self, id: &str, rows: &[S]) -> Self {
        self.insert(id, rows);
        self
    }

    pub fn insert<S: AsRef<str>>(&mut self, id: &str, rows: &[S]) {
        self.layouts.insert(
            id.to_string(),
            rows.iter().map(|r| r.as_ref().to_string()).collect(),
        );
    }

    /// Raw ASCII rows of a room.
    pub fn get_room(&self, id: &str) -> Result<&[String], RoomError> {
        self.layouts
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| RoomError::NotFound(id.to_string()))
    }

    /// Decode a room for entry.
    pub fn load(&self, id: &str, world: &WorldConfig) -> Result<RoomLayout, RoomError> {
        RoomLayout::decode(id, self.get_room(id)?, world)
    }

    pub fn room_ids(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }
}

impl RoomGraph for RoomRegistry {
    fn neighbor(&self, room: &str, exit: ExitKey) -> Option<RoomId> {
        self.topology.neighbor(room, exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dungeon() -> GridAdjacency {
        GridAdjacency::row(&["START", "HALLWAY", "PIT"])
    }

    #[test]
    fn grid_neighbors_east_and_west() {
        let g = dungeon();
        assert_eq!(
            g.neighbor("START", ExitKey::Edge(Direction::East)).as_deref(),
            Some("HALLWAY")
        );
        assert_eq!(
            g.neighbor("HALLWAY", ExitKey::Edge(Direction::West)).as_deref(),
            Some("START")
        );
        assert_eq!(
            g.neighbor("HALLWAY", ExitKey::Edge(Direction::East)).as_deref(),
            Some("PIT")
        );
    }

    #[test]
    fn grid_edges_without_neighbor_are_closed() {
        let g = dungeon();
        assert_eq!(g.neighbor("PIT", ExitKey::Edge(Direction::East)), None);
        assert_eq!(g.neighbor("START", ExitKey::Edge(Direction::West)), None);
        assert_eq!(g.neighbor("HALLWAY", ExitKey::Edge(Direction::North)), None);
        assert_eq!(g.neighbor("HALLWAY", ExitKey::Edge(Direction::South)), None);
    }

    #[test]
    fn grid_void_cells_are_closed() {
        let g = GridAdjacency::new(vec![
            vec![Some("A".into()), None],
            vec![Some("B".into()), Some("C".into())],
        ]);
        assert_eq!(g.neighbor("A", ExitKey::Edge(Direction::East)), None);
        assert_eq!(
            g.neighbor("A", ExitKey::Edge(Direction::South)).as_deref(),
            Some("B")
        );
        assert_eq!(
            g.neighbor("C", ExitKey::Edge(Direction::North)),
            None,
            "north of C is void"
        );
    }

    #[test]
    fn grid_ignores_portals_and_unknown_rooms() {
        let g = dungeon();
        assert_eq!(g.neighbor("START", ExitKey::Portal(1)), None);
        assert_eq!(g.neighbor("NOWHERE", ExitKey::Edge(Direction::East)), None);
    }

    #[test]
    fn portal_table_lookup() {
        let g = PortalAdjacency::new()
            .link_both("A", 1, "B")
            .link("B", 2, "C");
        assert_eq!(g.neighbor("A", ExitKey::Portal(1)).as_deref(), Some("B"));
        assert_eq!(g.neighbor("B", ExitKey::Portal(1)).as_deref(), Some("A"));
        assert_eq!(g.neighbor("B", ExitKey::Portal(2)).as_deref(), Some("C"));
        assert_eq!(g.neighbor("C", ExitKey::Portal(2)), None, "one-way link");
        assert_eq!(g.neighbor("A", ExitKey::Portal(7)), None);
        assert_eq!(g.neighbor("A", ExitKey::Edge(Direction::East)), None);
    }

    #[test]
    fn registry_missing_room_is_not_found() {
        let reg = RoomRegistry::new(Topology::Grid(dungeon())).with_room("START", &["S"]);
        assert!(reg.get_room("START").is_ok());
        assert_eq!(
            reg.get_room("PIT").unwrap_err(),
            RoomError::NotFound("PIT".into())
        );
        assert_eq!(
            reg.load("PIT", &WorldConfig::default()).unwrap_err(),
            RoomError::NotFound("PIT".into())
        );
    }

    #[test]
    fn registry_delegates_to_topology() {
        let reg = RoomRegistry::new(Topology::Grid(dungeon()));
        assert_eq!(
            reg.neighbor("START", ExitKey::Edge(Direction::East))
                .as_deref(),
            Some("HALLWAY")
        );
    }

    #[test]
    fn exit_key_display() {
        assert_eq!(ExitKey::Portal(3).to_string(), "portal 3");
        assert_eq!(ExitKey::Edge(Direction::East).to_string(), "east edge");
    }
}
