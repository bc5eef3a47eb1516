use std::fmt;

use serde_derive::{Deserialize, Serialize};

/// Position of a maze cell. `x` grows eastwards, `z` grows southwards.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub x: u32,
    pub z: u32,
}

impl GridCoordinate {
    pub fn new(x: u32, z: u32) -> GridCoordinate {
        GridCoordinate { x, z }
    }

    /// The coordinate one cell away in `dir`.
    /// Returns None if that would leave the non-negative quadrant; the upper bounds are
    /// the grid's concern.
    pub fn offset(self, dir: CompassPrimary) -> Option<GridCoordinate> {
        let GridCoordinate { x, z } = self;
        match dir {
            CompassPrimary::North => z.checked_sub(1).map(|z| GridCoordinate { x, z }),
            CompassPrimary::South => z.checked_add(1).map(|z| GridCoordinate { x, z }),
            CompassPrimary::East => x.checked_add(1).map(|x| GridCoordinate { x, z }),
            CompassPrimary::West => x.checked_sub(1).map(|x| GridCoordinate { x, z }),
        }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum CompassPrimary {
    North,
    South,
    East,
    West,
}

impl CompassPrimary {
    /// Neighbour visiting order used everywhere a deterministic order matters.
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::South,
                                          CompassPrimary::East,
                                          CompassPrimary::West];

    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    /// Unit step as (dx, dz).
    pub fn delta(self) -> (i64, i64) {
        match self {
            CompassPrimary::North => (0, -1),
            CompassPrimary::South => (0, 1),
            CompassPrimary::East => (1, 0),
            CompassPrimary::West => (-1, 0),
        }
    }
}

/// Wall flags of a single cell, `true` meaning the wall stands and there is no passage.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Walls {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl Walls {
    pub fn all() -> Walls {
        Walls {
            north: true,
            south: true,
            east: true,
            west: true,
        }
    }

    pub fn has_wall(&self, dir: CompassPrimary) -> bool {
        match dir {
            CompassPrimary::North => self.north,
            CompassPrimary::South => self.south,
            CompassPrimary::East => self.east,
            CompassPrimary::West => self.west,
        }
    }

    pub fn remove(&mut self, dir: CompassPrimary) {
        self.set(dir, false);
    }

    pub fn set(&mut self, dir: CompassPrimary, present: bool) {
        match dir {
            CompassPrimary::North => self.north = present,
            CompassPrimary::South => self.south = present,
            CompassPrimary::East => self.east = present,
            CompassPrimary::West => self.west = present,
        }
    }

    pub fn count(&self) -> usize {
        CompassPrimary::ALL.iter().filter(|&&dir| self.has_wall(dir)).count()
    }
}

impl Default for Walls {
    fn default() -> Walls {
        Walls::all()
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub coord: GridCoordinate,
    pub walls: Walls,
    /// Set while carving.
    pub visited: bool,
    /// Set once the cell is reachable from the carve's start cell.
    pub is_path: bool,
}

impl Cell {
    pub fn new(coord: GridCoordinate) -> Cell {
        Cell {
            coord,
            walls: Walls::all(),
            visited: false,
            is_path: false,
        }
    }

    #[inline]
    pub fn has_wall(&self, dir: CompassPrimary) -> bool {
        self.walls.has_wall(dir)
    }
}
