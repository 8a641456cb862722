use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use roomhop_core::geometry::{Direction, Rect};

use crate::config::WorldConfig;
use crate::error::{LayoutError, RoomError};
use crate::rooms::RoomId;

/// Tile types for a room grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Wall,
    /// Default spawn marker.
    Spawn,
    /// Numbered portal, 0-9.
    Portal(u8),
}

impl Tile {
    /// `#` wall, `.`/space empty, `S` spawn, digits are portals.
    pub fn from_char(ch: char) -> Option<Tile> {
        match ch {
            '#' => Some(Tile::Wall),
            '.' | ' ' => Some(Tile::Empty),
            'S' => Some(Tile::Spawn),
            '0'..='9' => ch.to_digit(10).map(|d| Tile::Portal(d as u8)),
            _ => None,
        }
    }

    pub fn is_passable(self) -> bool {
        !matches!(self, Tile::Wall)
    }
}

/// A room-sized tile grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    /// Width in tiles.
    pub cols: u32,
    /// Height in tiles.
    pub rows: u32,
    /// Tile data stored row-major (row * cols + col).
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    /// Parse ASCII rows into a `cols x rows` grid.
    ///
    /// Rows shorter than `cols`, and missing trailing rows, are cut borders:
    /// the absent cells become `Empty` openings.
    pub fn parse<S: AsRef<str>>(lines: &[S], cols: u32, rows: u32) -> Result<Self, LayoutError> {
        if lines.len() > rows as usize {
            return Err(LayoutError::TooManyRows {
                count: lines.len(),
                max: rows,
            });
        }
        let mut tiles = vec![Tile::Empty; (cols * rows) as usize];
        for (r, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let len = line.chars().count();
            if len > cols as usize {
                return Err(LayoutError::RowTooLong {
                    row: r,
                    len,
                    max: cols,
                });
            }
            for (c, ch) in line.chars().enumerate() {
                let tile =
                    Tile::from_char(ch).ok_or(LayoutError::UnknownTile { row: r, col: c, ch })?;
                tiles[r * cols as usize + c] = tile;
            }
        }
        Ok(Self { cols, rows, tiles })
    }

    /// Tile at (col, row), or `None` outside the grid.
    pub fn get(&self, col: i32, row: i32) -> Option<Tile> {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return None;
        }
        Some(self.tiles[row as usize * self.cols as usize + col as usize])
    }

    /// Iterate `(col, row, tile)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, Tile)> + '_ {
        let cols = self.cols;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i as u32 % cols, i as u32 / cols, t))
    }

    /// Number of cells along the `side` border.
    pub fn border_len(&self, side: Direction) -> u32 {
        if side.is_horizontal() {
            self.rows
        } else {
            self.cols
        }
    }

    /// Cell on the `side` border at `index` along that border.
    pub fn border_cell(&self, side: Direction, index: i32) -> (i32, i32) {
        match side {
            Direction::North => (index, 0),
            Direction::South => (index, self.rows as i32 - 1),
            Direction::West => (0, index),
            Direction::East => (self.cols as i32 - 1, index),
        }
    }
}

/// World-space centre of cell (col, row).
pub fn cell_center(col: i32, row: i32, tile_size: f32) -> Vec2 {
    Vec2::new(
        col as f32 * tile_size + tile_size / 2.0,
        row as f32 * tile_size + tile_size / 2.0,
    )
}

/// Cell containing a world position. Not clamped to any grid.
pub fn cell_at(pos: Vec2, tile_size: f32) -> (i32, i32) {
    (
        (pos.x / tile_size).floor() as i32,
        (pos.y / tile_size).floor() as i32,
    )
}

/// A non-solid trigger area tagged with its portal id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub id: u8,
    pub rect: Rect,
}

/// A decoded room: collidable geometry, portals and spawn points.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    pub id: RoomId,
    pub grid: TileGrid,
    pub tile_size: f32,
    /// One static rect per wall tile.
    pub platforms: Vec<Rect>,
    pub portals: Vec<Portal>,
    /// Arrival point when entering through portal N.
    pub spawn_by_portal: BTreeMap<u8, Vec2>,
    /// Used when entering with no portal, e.g. at game start.
    pub default_spawn: Option<Vec2>,
}

impl RoomLayout {
    pub fn decode<S: AsRef<str>>(
        id: &str,
        lines: &[S],
        world: &WorldConfig,
    ) -> Result<Self, RoomError> {
        let malformed = |source| RoomError::MalformedLayout {
            room: id.to_string(),
            source,
        };
        let grid = TileGrid::parse(lines, world.grid_cols, world.grid_rows).map_err(malformed)?;

        let ts = world.tile_size;
        let cell = Vec2::splat(ts);
        let mut platforms = Vec::new();
        let mut portals = Vec::new();
        let mut spawn_by_portal = BTreeMap::new();
        let mut default_spawn = None;

        for (col, row, tile) in grid.cells() {
            let center = cell_center(col as i32, row as i32, ts);
            match tile {
                Tile::Wall => platforms.push(Rect::new(center, cell)),
                Tile::Spawn => {
                    if default_spawn.is_some() {
                        return Err(malformed(LayoutError::DuplicateSpawn {
                            row: row as usize,
                            col: col as usize,
                        }));
                    }
                    default_spawn = Some(center);
                },
                Tile::Portal(pid) => {
                    if spawn_by_portal.insert(pid, center).is_some() {
                        return Err(malformed(LayoutError::DuplicatePortal { id: pid }));
                    }
                    portals.push(Portal {
                        id: pid,
                        rect: Rect::new(center, cell),
                    });
                },
                Tile::Empty => {},
            }
        }

        Ok(Self {
            id: id.to_string(),
            grid,
            tile_size: ts,
            platforms,
            portals,
            spawn_by_portal,
            default_spawn,
        })
    }

    pub fn portal(&self, id: u8) -> Option<&Portal> {
        self.portals.iter().find(|p| p.id == id)
    }

    /// Sides with at least one passable border cell.
    pub fn open_borders(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&side| {
                (0..self.grid.border_len(side) as i32).any(|i| {
                    let (c, r) = self.grid.border_cell(side, i);
                    self.grid.get(c, r).is_some_and(Tile::is_passable)
                })
            })
            .collect()
    }

    pub fn width(&self) -> f32 {
        self.grid.cols as f32 * self.tile_size
    }

    pub fn height(&self) -> f32 {
        self.grid.rows as f32 * self.tile_size
    }
}
