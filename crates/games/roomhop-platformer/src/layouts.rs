use crate::rooms::{GridAdjacency, PortalAdjacency, RoomRegistry, Topology};

pub const START: &[&str] = &[
    "####################",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#.........####.....#",
    "#..................#",
    "#..................#",
    "#....####...........",
    "#...................",
    "#...S...............",
    "#...................",
    "####################",
];

pub const HALLWAY: &[&str] = &[
    "####################",
    "####################",
    "####################",
    "####################",
    "####################",
    "####################",
    "####################",
    "####################",
    "####################",
    "#######......#######",
    "....................",
    "....................",
    ".........##.........",
    "....................",
    "####################",
];

/// Open to the east with nothing beyond it. The floor has a one-tile dip.
pub const PIT: &[&str] = &[
    "####################",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#.....######.......#",
    "....................",
    "....................",
    "....................",
    "######....##########",
    "####################",
];

pub const VAULT_A: &[&str] = &[
    "####################",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#.2......#####.....#",
    "#..####............#",
    "#..................#",
    "#.........####.....#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#.S..............1.#",
    "####################",
];

/// Portal 3 leads nowhere.
pub const VAULT_B: &[&str] = &[
    "####################",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#..............2...#",
    "#.............####.#",
    "#..................#",
    "#....####..........#",
    "#..................#",
    "#..................#",
    "#..................#",
    "#.1............3...#",
    "####################",
];

/// Three rooms in a row, west to east, joined through open borders.
pub fn dungeon() -> RoomRegistry {
    RoomRegistry::new(Topology::Grid(GridAdjacency::row(&[
        "START", "HALLWAY", "PIT",
    ])))
    .with_room("START", START)
    .with_room("HALLWAY", HALLWAY)
    .with_room("PIT", PIT)
}

/// Two sealed rooms joined by portals 1 and 2.
pub fn vaults() -> RoomRegistry {
    RoomRegistry::new(Topology::Portals(
        PortalAdjacency::new()
            .link_both("VAULT_A", 1, "VAULT_B")
            .link_both("VAULT_A", 2, "VAULT_B"),
    ))
    .with_room("VAULT_A", VAULT_A)
    .with_room("VAULT_B", VAULT_B)
}
