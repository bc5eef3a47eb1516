//! World space layout of a maze: where cells, walls, the start, the end and the checkpoints sit.
//!
//! The world is y-up. Maze cell (x, z) is `CELL_SIZE` units square and its centre lies at
//! `((x - width / 2) * CELL_SIZE, GROUND_LEVEL, (z - height / 2) * CELL_SIZE)`.

use log::debug;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::cells::{CompassPrimary, GridCoordinate};
use crate::grid::MazeGrid;
use crate::occupancy::{GridPoint, OccupancyGrid, RESOLUTION};
use crate::units::{Height, Width};

pub const CELL_SIZE: f32 = 4.0;
pub const SUB_CELL_SIZE: f32 = CELL_SIZE / RESOLUTION as f32;
pub const WALL_HEIGHT: f32 = 4.0;
pub const WALL_THICKNESS: f32 = 0.5;
pub const OUTER_WALL_THICKNESS: f32 = 1.0;
/// Outer walls overhang the maze by this much in total so the corners close.
pub const OUTER_WALL_OVERHANG: f32 = 2.0;
/// Height of walkers and wall centres.
pub const GROUND_LEVEL: f32 = WALL_HEIGHT / 2.0;

pub const OUTER_WALL_COLOUR: &str = "#1a202c";
pub const INNER_WALL_PALETTE: [&str; 6] =
    ["#2d3748", "#4a5568", "#718096", "#2b6cb0", "#3182ce", "#2c5282"];

pub const MIN_CHECKPOINTS: usize = 3;
pub const MAX_CHECKPOINTS: usize = 5;
pub const CHECKPOINT_ATTEMPTS: usize = 50;

#[derive(PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPoint {
    pub fn new(x: f32, y: f32, z: f32) -> WorldPoint {
        WorldPoint { x, y, z }
    }

    /// A point on the walking plane.
    pub fn on_ground(x: f32, z: f32) -> WorldPoint {
        WorldPoint::new(x, GROUND_LEVEL, z)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    Outer,
    Inner,
}

/// An axis aligned box for the renderer to draw and collide with.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct WallSegment {
    pub position: [f32; 3],
    pub size: [f32; 3],
    #[serde(rename = "color")]
    pub colour: String,
    #[serde(rename = "type")]
    pub kind: WallKind,
}

#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub id: u32,
}

/// Converts between maze cells, occupancy cells and world positions for one maze size.
///
/// Occupancy cell `g` along an axis is centred on `(g - 1) * SUB_CELL_SIZE - extent / 2`, so the
/// odd occupancy cells coincide with maze cell centres and occupancy cell 0 lies on the west or
/// north outer wall.
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct WorldFrame {
    columns: usize,
    rows: usize,
}

impl WorldFrame {
    pub fn for_maze(width: Width, height: Height) -> WorldFrame {
        WorldFrame {
            columns: width.0 * RESOLUTION,
            rows: height.0 * RESOLUTION,
        }
    }

    pub fn for_occupancy(grid: &OccupancyGrid) -> WorldFrame {
        WorldFrame {
            columns: grid.width(),
            rows: grid.height(),
        }
    }

    /// World size of the maze along x.
    pub fn world_width(&self) -> f32 {
        self.columns as f32 * SUB_CELL_SIZE
    }

    /// World size of the maze along z.
    pub fn world_height(&self) -> f32 {
        self.rows as f32 * SUB_CELL_SIZE
    }

    fn origin_x(&self) -> f32 {
        -SUB_CELL_SIZE - self.world_width() / 2.0
    }

    fn origin_z(&self) -> f32 {
        -SUB_CELL_SIZE - self.world_height() / 2.0
    }

    /// Centre of the world rectangle enclosed by the outer walls.
    pub fn centre(&self) -> (f32, f32) {
        (self.origin_x() + self.world_width() / 2.0, self.origin_z() + self.world_height() / 2.0)
    }

    pub fn cell_centre(&self, coord: GridCoordinate) -> WorldPoint {
        self.occupancy_centre(GridPoint::new(coord.x as usize * RESOLUTION + 1,
                                             coord.z as usize * RESOLUTION + 1))
    }

    pub fn occupancy_centre(&self, point: GridPoint) -> WorldPoint {
        WorldPoint::on_ground(self.origin_x() + point.x as f32 * SUB_CELL_SIZE,
                              self.origin_z() + point.z as f32 * SUB_CELL_SIZE)
    }

    /// The occupancy cell containing a position on the walking plane, None when it lies off the
    /// grid. Every position within half a sub cell of a centre maps to that centre's cell.
    pub fn world_to_occupancy(&self, x: f32, z: f32) -> Option<GridPoint> {
        let to_index = |world: f32, origin: f32, count: usize| -> Option<usize> {
            let index = ((world - origin) / SUB_CELL_SIZE + 0.5).floor();
            if index.is_finite() && index >= 0.0 && index < count as f32 {
                Some(index as usize)
            } else {
                None
            }
        };
        Some(GridPoint::new(to_index(x, self.origin_x(), self.columns)?,
                            to_index(z, self.origin_z(), self.rows)?))
    }

    /// Where the player starts: the middle of the southern edge row.
    pub fn start_position(&self) -> WorldPoint {
        self.cell_centre(GridCoordinate::new(self.maze_columns() / 2, self.maze_rows() - 1))
    }

    /// The goal: the middle of the northern edge row, as far from the start as the maze allows.
    pub fn end_position(&self) -> WorldPoint {
        self.cell_centre(GridCoordinate::new(self.maze_columns() / 2, 0))
    }

    fn maze_columns(&self) -> u32 {
        (self.columns / RESOLUTION).max(1) as u32
    }

    fn maze_rows(&self) -> u32 {
        (self.rows / RESOLUTION).max(1) as u32
    }

    /// The four outer walls enclosing the maze.
    pub fn outer_walls(&self) -> [WallSegment; 4] {
        let (cx, cz) = self.centre();
        let (half_w, half_h) = (self.world_width() / 2.0, self.world_height() / 2.0);
        let along_x = [self.world_width() + OUTER_WALL_OVERHANG, WALL_HEIGHT, OUTER_WALL_THICKNESS];
        let along_z = [OUTER_WALL_THICKNESS, WALL_HEIGHT, self.world_height() + OUTER_WALL_OVERHANG];
        let outer = |position: [f32; 3], size: [f32; 3]| {
            WallSegment {
                position,
                size,
                colour: OUTER_WALL_COLOUR.to_string(),
                kind: WallKind::Outer,
            }
        };

        [outer([cx, GROUND_LEVEL, cz + half_h], along_x),
         outer([cx, GROUND_LEVEL, cz - half_h], along_x),
         outer([cx + half_w, GROUND_LEVEL, cz], along_z),
         outer([cx - half_w, GROUND_LEVEL, cz], along_z)]
    }
}

/// Wall boxes for a maze: the outer boundary plus one box per standing interior wall.
///
/// An interior wall is shared by two cells, it is emitted from the cell north or west of it
/// only. Inner wall colours are drawn from `INNER_WALL_PALETTE` with `rng`.
pub fn wall_segments<R: Rng + ?Sized>(grid: &MazeGrid, rng: &mut R) -> Vec<WallSegment> {
    let frame = WorldFrame::for_maze(grid.width(), grid.height());
    let mut walls = frame.outer_walls().to_vec();
    let half_cell = CELL_SIZE / 2.0;

    for cell in grid.cells() {
        let centre = frame.cell_centre(cell.coord);
        for &dir in [CompassPrimary::South, CompassPrimary::East].iter() {
            if grid.neighbour_at_direction(cell.coord, dir).is_none() || !cell.has_wall(dir) {
                continue;
            }
            let (position, size) = match dir {
                CompassPrimary::South => {
                    ([centre.x, GROUND_LEVEL, centre.z + half_cell],
                     [CELL_SIZE, WALL_HEIGHT, WALL_THICKNESS])
                }
                _ => {
                    ([centre.x + half_cell, GROUND_LEVEL, centre.z],
                     [WALL_THICKNESS, WALL_HEIGHT, CELL_SIZE])
                }
            };
            walls.push(WallSegment {
                position,
                size,
                colour: random_wall_colour(rng).to_string(),
                kind: WallKind::Inner,
            });
        }
    }

    debug!("{} wall segments for {}x{} maze", walls.len(), grid.width().0, grid.height().0);
    walls
}

fn random_wall_colour<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    INNER_WALL_PALETTE[rng.gen_range(0..INNER_WALL_PALETTE.len())]
}

/// Pick between `MIN_CHECKPOINTS` and `MAX_CHECKPOINTS` waypoints on cells reached by the carve.
///
/// Each waypoint gets `CHECKPOINT_ATTEMPTS` random cells to land on; if all of them miss, that
/// waypoint is dropped and fewer are returned. Ids count up from 1 without gaps.
pub fn checkpoints<R: Rng + ?Sized>(grid: &MazeGrid, rng: &mut R) -> Vec<Checkpoint> {
    let frame = WorldFrame::for_maze(grid.width(), grid.height());
    let wanted = rng.gen_range(MIN_CHECKPOINTS..=MAX_CHECKPOINTS);
    let mut found = Vec::with_capacity(wanted);

    for _ in 0..wanted {
        let hit = (0..CHECKPOINT_ATTEMPTS)
            .map(|_| grid.random_cell(rng))
            .find(|&coord| grid.cell(coord).map_or(false, |cell| cell.is_path));

        if let Some(coord) = hit {
            let centre = frame.cell_centre(coord);
            found.push(Checkpoint {
                x: centre.x,
                y: centre.y,
                z: centre.z,
                id: found.len() as u32 + 1,
            });
        }
    }

    if found.len() < wanted {
        debug!("placed {} of {} checkpoints", found.len(), wanted);
    }
    found
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::generators;

    fn frame(w: usize, h: usize) -> WorldFrame {
        WorldFrame::for_maze(Width(w), Height(h))
    }

    #[test]
    fn cell_centres_follow_cell_size() {
        let f = frame(16, 16);
        assert_eq!(f.cell_centre(GridCoordinate::new(8, 8)), WorldPoint::new(0.0, 2.0, 0.0));
        assert_eq!(f.cell_centre(GridCoordinate::new(0, 15)), WorldPoint::new(-32.0, 2.0, 28.0));

        let odd = frame(15, 15);
        assert_eq!(odd.cell_centre(GridCoordinate::new(7, 7)), WorldPoint::new(-2.0, 2.0, -2.0));
    }

    #[test]
    fn start_and_end_sit_on_opposite_edges() {
        let f = frame(16, 16);
        assert_eq!(f.start_position(), WorldPoint::new(0.0, 2.0, 28.0));
        assert_eq!(f.end_position(), WorldPoint::new(0.0, 2.0, -32.0));

        let odd = frame(15, 15);
        assert_eq!(odd.start_position(), WorldPoint::new(-2.0, 2.0, 26.0));
        assert_eq!(odd.end_position(), WorldPoint::new(-2.0, 2.0, -30.0));
    }

    #[test]
    fn start_and_end_land_on_walkable_cells() {
        let mut rng = XorShiftRng::seed_from_u64(5);
        let grid = generators::generate(Width(15), Height(9), &mut rng).unwrap();
        let layout = OccupancyGrid::from_maze(&grid);
        let f = WorldFrame::for_occupancy(&layout);
        for p in [f.start_position(), f.end_position()].iter() {
            let point = f.world_to_occupancy(p.x, p.z).unwrap();
            assert!(layout.is_walkable(point));
        }
    }

    #[test]
    fn world_to_occupancy_rounds_to_nearest_centre() {
        let f = frame(15, 15);
        assert_eq!(f.world_to_occupancy(-2.0, -2.0), Some(GridPoint::new(15, 15)));
        assert_eq!(f.world_to_occupancy(-1.2, -2.9), Some(GridPoint::new(15, 15)));
        assert_eq!(f.world_to_occupancy(-0.9, -2.0), Some(GridPoint::new(16, 15)));
        assert_eq!(f.world_to_occupancy(1000.0, 0.0), None);
        assert_eq!(f.world_to_occupancy(0.0, -1000.0), None);
        assert_eq!(f.world_to_occupancy(f32::NAN, 0.0), None);
    }

    #[test]
    fn quickcheck_round_trip_is_idempotent() {
        fn p(x: i16, z: i16) -> TestResult {
            let f = frame(15, 15);
            let (x, z) = ((x % 3500) as f32 / 100.0, (z % 3500) as f32 / 100.0);
            match f.world_to_occupancy(x, z) {
                None => TestResult::discard(),
                Some(point) => {
                    let centre = f.occupancy_centre(point);
                    TestResult::from_bool(f.world_to_occupancy(centre.x, centre.z) == Some(point))
                }
            }
        }
        quickcheck(p as fn(i16, i16) -> TestResult);
    }

    #[test]
    fn outer_walls_enclose_every_cell() {
        let f = frame(4, 3);
        let walls = f.outer_walls();
        let west = walls[3].position[0];
        let east = walls[2].position[0];
        let north = walls[1].position[2];
        let south = walls[0].position[2];
        for x in 0..4 {
            for z in 0..3 {
                let c = f.cell_centre(GridCoordinate::new(x, z));
                assert!(c.x - CELL_SIZE / 2.0 >= west && c.x + CELL_SIZE / 2.0 <= east);
                assert!(c.z - CELL_SIZE / 2.0 >= north && c.z + CELL_SIZE / 2.0 <= south);
            }
        }
        assert_eq!(walls[0].size, [18.0, WALL_HEIGHT, OUTER_WALL_THICKNESS]);
        assert!(walls.iter().all(|w| w.kind == WallKind::Outer && w.colour == OUTER_WALL_COLOUR));
    }

    #[test]
    fn closed_grid_has_every_interior_wall_once() {
        let grid = MazeGrid::new(Width(3), Height(2)).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(1);
        let walls = wall_segments(&grid, &mut rng);
        // 3 * 1 horizontal partitions plus 2 * 2 vertical ones.
        let inner = walls.iter().filter(|w| w.kind == WallKind::Inner).collect::<Vec<_>>();
        assert_eq!(walls.len(), 4 + 7);
        assert_eq!(inner.len(), 7);
        assert!(inner.iter().all(|w| INNER_WALL_PALETTE.contains(&w.colour.as_str())));
    }

    #[test]
    fn carved_walls_match_missing_passages() {
        let mut rng = XorShiftRng::seed_from_u64(77);
        let grid = generators::generate(Width(10), Height(10), &mut rng).unwrap();
        let walls = wall_segments(&grid, &mut rng);
        let interior_partitions = 9 * 10 * 2;
        assert_eq!(walls.len() - 4, interior_partitions - grid.passages_count());
    }

    #[test]
    fn checkpoints_land_on_path_cells() {
        let mut rng = XorShiftRng::seed_from_u64(3);
        let grid = generators::generate(Width(15), Height(15), &mut rng).unwrap();
        let f = WorldFrame::for_maze(grid.width(), grid.height());
        let points = checkpoints(&grid, &mut rng);
        assert!(points.len() >= MIN_CHECKPOINTS && points.len() <= MAX_CHECKPOINTS);
        for (i, checkpoint) in points.iter().enumerate() {
            assert_eq!(checkpoint.id, i as u32 + 1);
            let point = f.world_to_occupancy(checkpoint.x, checkpoint.z).unwrap();
            assert_eq!((point.x % 2, point.z % 2), (1, 1));
        }
    }

    #[test]
    fn checkpoints_silently_undercount() {
        let grid = MazeGrid::new(Width(5), Height(5)).unwrap();
        let mut rng = XorShiftRng::seed_from_u64(3);
        assert!(checkpoints(&grid, &mut rng).is_empty());
    }
}
