use roomhop_core::geometry::Direction;

use crate::rooms::RoomId;

/// Why an ASCII layout could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    RowTooLong { row: usize, len: usize, max: u32 },
    TooManyRows { count: usize, max: u32 },
    UnknownTile { row: usize, col: usize, ch: char },
    DuplicatePortal { id: u8 },
    DuplicateSpawn { row: usize, col: usize },
}

impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowTooLong { row, len, max } => {
                write!(f, "row {row} has {len} tiles (max {max})")
            },
            Self::TooManyRows { count, max } => write!(f, "{count} rows (max {max})"),
            Self::UnknownTile { row, col, ch } => {
                write!(f, "unknown tile {ch:?} at row {row}, col {col}")
            },
            Self::DuplicatePortal { id } => write!(f, "portal {id} appears more than once"),
            Self::DuplicateSpawn { row, col } => {
                write!(f, "second spawn marker at row {row}, col {col}")
            },
        }
    }
}

impl std::error::Error for LayoutError {}

/// Room lookup and load failures. Fatal for the load that hit them; the
/// previously active room stays in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    NotFound(RoomId),
    MalformedLayout { room: RoomId, source: LayoutError },
}

impl RoomError {
    /// The room the failed load was for.
    pub fn room(&self) -> &str {
        match self {
            Self::NotFound(room) | Self::MalformedLayout { room, .. } => room,
        }
    }
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(room) => write!(f, "room not found: {room}"),
            Self::MalformedLayout { room, source } => {
                write!(f, "malformed layout for room {room}: {source}")
            },
        }
    }
}

impl std::error::Error for RoomError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::MalformedLayout { source, .. } => Some(source),
        }
    }
}

/// The border scan found no passable tile within its search radius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    NotFound {
        room: RoomId,
        entry: Direction,
        from: i32,
        radius: u32,
    },
}

impl std::fmt::Display for SpawnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound {
                room,
                entry,
                from,
                radius,
            } => write!(
                f,
                "no passable tile on the {entry} border of {room} within {radius} cells of {from}"
            ),
        }
    }
}

impl std::error::Error for SpawnError {}
