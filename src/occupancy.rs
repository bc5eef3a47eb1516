//! The double resolution walkable/blocked grid that route finding runs on.
//!
//! Maze cell (x, z) owns the occupancy cell (2x + 1, 2z + 1) at its centre. The occupancy cells
//! directly north, south, east and west of a centre stand for the passages to the neighbouring
//! maze cells, so a corridor between two centres is a walkable cell of its own. Row 0 and column 0
//! sit outside the maze's west and north walls and are always blocked.

use std::convert::TryFrom;
use std::fmt;

use petgraph::unionfind::UnionFind;
use serde_derive::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::cells::CompassPrimary;
use crate::grid::MazeGrid;
use crate::utils;

pub const WALKABLE: u8 = 0;
pub const BLOCKED: u8 = 1;

/// Occupancy cells per maze cell along each axis.
pub const RESOLUTION: usize = 2;

/// A cell of the occupancy grid. `x` is the column, `z` the row.
///
/// On the wire a point is a `[row, column]` pair, the same order as the nested occupancy rows.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct GridPoint {
    pub x: usize,
    pub z: usize,
}

impl GridPoint {
    pub fn new(x: usize, z: usize) -> GridPoint {
        GridPoint { x, z }
    }

    /// Manhattan distance, the number of 4-connected moves on an open grid.
    pub fn manhattan_distance(self, other: GridPoint) -> usize {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(x {}, z {})", self.x, self.z)
    }
}

impl From<[usize; 2]> for GridPoint {
    fn from([z, x]: [usize; 2]) -> GridPoint {
        GridPoint::new(x, z)
    }
}

impl From<GridPoint> for [usize; 2] {
    fn from(point: GridPoint) -> [usize; 2] {
        [point.z, point.x]
    }
}

#[derive(Error, Eq, PartialEq, Clone, Debug)]
pub enum LayoutError {
    #[error("occupancy grid has no cells")]
    Empty,
    #[error("occupancy grid row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("occupancy grid cell [{x}, {z}] holds {value}, expected 0 (walkable) or 1 (blocked)")]
    InvalidValue { x: usize, z: usize, value: u8 },
}

/// Walkable (0) and blocked (1) cells stored row major.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl fmt::Debug for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OccupancyGrid :: width: {}, height: {}, walkable: {}",
               self.width, self.height, self.walkable_count())
    }
}

impl OccupancyGrid {
    /// Everything blocked.
    pub fn blocked(width: usize, height: usize) -> OccupancyGrid {
        OccupancyGrid {
            width,
            height,
            cells: vec![BLOCKED; width * height],
        }
    }

    /// Lay out the maze at double resolution.
    pub fn from_maze(maze: &MazeGrid) -> OccupancyGrid {
        let mut layout = OccupancyGrid::blocked(maze.width().0 * RESOLUTION,
                                                maze.height().0 * RESOLUTION);

        for cell in maze.cells().iter().filter(|cell| cell.visited) {
            let centre = GridPoint::new(cell.coord.x as usize * RESOLUTION + 1,
                                        cell.coord.z as usize * RESOLUTION + 1);
            layout.set(centre, WALKABLE);

            for &dir in CompassPrimary::ALL.iter() {
                if maze.is_neighbour_linked(cell.coord, dir) {
                    if let Some(passage) = layout.offset(centre, dir) {
                        layout.set(passage, WALKABLE);
                    }
                }
            }
        }

        layout
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn contains(&self, point: GridPoint) -> bool {
        point.x < self.width && point.z < self.height
    }

    #[inline]
    pub fn point_to_index(&self, point: GridPoint) -> Option<usize> {
        if self.contains(point) {
            Some(point.z * self.width + point.x)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_point(&self, index: usize) -> GridPoint {
        GridPoint::new(index % self.width, index / self.width)
    }

    pub fn get(&self, point: GridPoint) -> Option<u8> {
        self.point_to_index(point).map(|i| self.cells[i])
    }

    pub fn set(&mut self, point: GridPoint, value: u8) {
        if let Some(i) = self.point_to_index(point) {
            self.cells[i] = value;
        }
    }

    #[inline]
    pub fn is_walkable(&self, point: GridPoint) -> bool {
        self.get(point) == Some(WALKABLE)
    }

    /// The in-bounds point one step away in `dir`.
    pub fn offset(&self, point: GridPoint, dir: CompassPrimary) -> Option<GridPoint> {
        let (dx, dz) = dir.delta();
        let x = point.x.checked_add_signed(dx as isize)?;
        let z = point.z.checked_add_signed(dz as isize)?;
        Some(GridPoint::new(x, z)).filter(|&p| self.contains(p))
    }

    /// Walkable 4-connected neighbours in North, South, East, West order.
    pub fn walkable_neighbours(&self, point: GridPoint) -> SmallVec<[GridPoint; 4]> {
        CompassPrimary::ALL
            .iter()
            .filter_map(|&dir| self.offset(point, dir))
            .filter(|&p| self.is_walkable(p))
            .collect()
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == WALKABLE).count()
    }

    /// Number of separate regions of walkable cells. A generated maze always has exactly one.
    pub fn component_count(&self) -> usize {
        let mut regions = UnionFind::<usize>::new(self.size());
        for (index, _) in self.cells.iter().enumerate().filter(|&(_, &v)| v == WALKABLE) {
            let point = self.index_to_point(index);
            for &dir in [CompassPrimary::East, CompassPrimary::South].iter() {
                if let Some(n) = self.offset(point, dir).filter(|&n| self.is_walkable(n)) {
                    regions.union(index, n.z * self.width + n.x);
                }
            }
        }

        let labels = regions.into_labeling();
        let mut roots = utils::fnv_hashset(self.size());
        for (index, &v) in self.cells.iter().enumerate() {
            if v == WALKABLE {
                roots.insert(labels[index]);
            }
        }
        roots.len()
    }

    /// Copy out as one `Vec` per row.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells.chunks(self.width.max(1)).map(|row| row.to_vec()).collect()
    }

    pub fn iter_row(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks(self.width.max(1))
    }
}

impl TryFrom<Vec<Vec<u8>>> for OccupancyGrid {
    type Error = LayoutError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<OccupancyGrid, LayoutError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if width == 0 || height == 0 {
            return Err(LayoutError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (z, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(LayoutError::RaggedRow {
                    row: z,
                    expected: width,
                    found: row.len(),
                });
            }
            if let Some((x, &value)) = row.iter().enumerate().find(|&(_, &v)| v > BLOCKED) {
                return Err(LayoutError::InvalidValue { x, z, value });
            }
            cells.extend(row);
        }

        Ok(OccupancyGrid { width, height, cells })
    }
}

impl From<OccupancyGrid> for Vec<Vec<u8>> {
    fn from(grid: OccupancyGrid) -> Vec<Vec<u8>> {
        grid.to_rows()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;
    use crate::cells::GridCoordinate;
    use crate::units::{Height, Width};

    fn layout(rows: &[&str]) -> OccupancyGrid {
        let rows = rows.iter()
            .map(|row| row.chars().map(|c| if c == '#' { BLOCKED } else { WALKABLE }).collect())
            .collect::<Vec<Vec<u8>>>();
        OccupancyGrid::try_from(rows).unwrap()
    }

    #[test]
    fn maze_cells_map_to_double_resolution() {
        let mut maze = MazeGrid::new(Width(2), Height(2)).unwrap();
        for coord in maze.iter().collect::<Vec<_>>() {
            maze.mark_visited(coord);
        }
        maze.knock_down(GridCoordinate::new(0, 0), CompassPrimary::East);
        maze.knock_down(GridCoordinate::new(1, 0), CompassPrimary::South);

        let grid = OccupancyGrid::from_maze(&maze);
        assert_eq!((grid.width(), grid.height()), (4, 4));
        assert_eq!(grid.to_rows(),
                   vec![vec![1, 1, 1, 1],
                        vec![1, 0, 0, 0],
                        vec![1, 1, 1, 0],
                        vec![1, 0, 1, 0]]);
        assert_eq!(grid.walkable_count(), 6);
        assert_eq!(grid.component_count(), 2);
    }

    #[test]
    fn unvisited_cells_stay_blocked() {
        let maze = MazeGrid::new(Width(3), Height(2)).unwrap();
        let grid = OccupancyGrid::from_maze(&maze);
        assert_eq!(grid.walkable_count(), 0);
        assert_eq!(grid.component_count(), 0);
    }

    #[test]
    fn neighbours_are_ordered_and_walkable() {
        let grid = layout(&[" # ",
                            "   ",
                            " # "]);
        let centre = GridPoint::new(1, 1);
        assert_eq!(&*grid.walkable_neighbours(centre),
                   &[GridPoint::new(2, 1), GridPoint::new(0, 1)]);
        assert_eq!(&*grid.walkable_neighbours(GridPoint::new(0, 0)), &[GridPoint::new(0, 1)]);
    }

    #[test]
    fn components_split_by_a_wall() {
        let grid = layout(&["  #  ",
                            "  #  ",
                            "  #  "]);
        assert_eq!(grid.component_count(), 2);
        let joined = layout(&["  #  ",
                              "     ",
                              "  #  "]);
        assert_eq!(joined.component_count(), 1);
    }

    #[test]
    fn rejects_malformed_rows() {
        assert_eq!(OccupancyGrid::try_from(Vec::<Vec<u8>>::new()).unwrap_err(), LayoutError::Empty);
        assert_eq!(OccupancyGrid::try_from(vec![vec![0u8, 1], vec![0]]).unwrap_err(),
                   LayoutError::RaggedRow { row: 1, expected: 2, found: 1 });
        assert_eq!(OccupancyGrid::try_from(vec![vec![0u8, 7]]).unwrap_err(),
                   LayoutError::InvalidValue { x: 1, z: 0, value: 7 });
    }

    #[test]
    fn serializes_as_nested_arrays() {
        let grid = layout(&["# ", " #"]);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, "[[1,0],[0,1]]");
        let back: OccupancyGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
        assert!(serde_json::from_str::<OccupancyGrid>("[[0,2]]").is_err());
    }

    #[test]
    fn points_travel_as_row_column_pairs() {
        let point = GridPoint::new(3, 7);
        assert_eq!(serde_json::to_string(&point).unwrap(), "[7,3]");
        assert_eq!(serde_json::from_str::<GridPoint>("[7,3]").unwrap(), point);
        assert_eq!(point.to_string(), "(x 3, z 7)");
    }

    #[test]
    fn manhattan() {
        assert_eq!(GridPoint::new(1, 5).manhattan_distance(GridPoint::new(4, 2)), 6);
    }
}
