use std::fmt;

use rand::Rng;
use smallvec::SmallVec;
use thiserror::Error;

use crate::cells::{Cell, CompassPrimary, GridCoordinate};
use crate::units::{CellsCount, Height, Width};

/// Smallest maze side length that can still hold a start and an end cell.
pub const MIN_SIDE_LENGTH: usize = 2;

#[derive(Error, Eq, PartialEq, Copy, Clone, Debug)]
pub enum GenerationError {
    #[error("invalid maze dimensions {width}x{height}, both sides must be at least {min}", min = MIN_SIDE_LENGTH)]
    InvalidDimensions { width: usize, height: usize },
}

/// Rectangular maze of cells stored row major (z major).
#[derive(Clone, PartialEq, Eq)]
pub struct MazeGrid {
    width: Width,
    height: Height,
    cells: Vec<Cell>,
}

impl fmt::Debug for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MazeGrid :: width: {:?}, height: {:?}, passages: {}",
               self.width, self.height, self.passages_count())
    }
}

impl MazeGrid {
    /// A fully walled grid with every cell unvisited.
    pub fn new(width: Width, height: Height) -> Result<MazeGrid, GenerationError> {
        let (Width(w), Height(h)) = (width, height);
        if w < MIN_SIDE_LENGTH || h < MIN_SIDE_LENGTH || w > u32::MAX as usize ||
           h > u32::MAX as usize {
            return Err(GenerationError::InvalidDimensions { width: w, height: h });
        }

        let cells = (0..h)
            .flat_map(|z| (0..w).map(move |x| Cell::new(GridCoordinate::new(x as u32, z as u32))))
            .collect();

        Ok(MazeGrid { width, height, cells })
    }

    #[inline]
    pub fn width(&self) -> Width {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Height {
        self.height
    }

    #[inline]
    pub fn size(&self) -> CellsCount {
        CellsCount(self.cells.len())
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, coord: GridCoordinate) -> Option<&Cell> {
        self.grid_coordinate_to_index(coord).map(|i| &self.cells[i])
    }

    pub fn cell_mut(&mut self, coord: GridCoordinate) -> Option<&mut Cell> {
        let index = self.grid_coordinate_to_index(coord)?;
        Some(&mut self.cells[index])
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: GridCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.z as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: GridCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.z as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn index_to_grid_coordinate(&self, index: usize) -> Option<GridCoordinate> {
        if index < self.cells.len() {
            let w = self.width.0;
            Some(GridCoordinate::new((index % w) as u32, (index / w) as u32))
        } else {
            None
        }
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> GridCoordinate {
        let x = rng.gen_range(0..self.width.0);
        let z = rng.gen_range(0..self.height.0);
        GridCoordinate::new(x as u32, z as u32)
    }

    pub fn neighbour_at_direction(&self,
                                  coord: GridCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<GridCoordinate> {
        coord.offset(direction).filter(|&c| self.is_valid_coordinate(c))
    }

    /// Neighbours not yet reached by the carve, with the direction leading to them.
    pub fn unvisited_neighbours(&self,
                                coord: GridCoordinate)
                                -> SmallVec<[(CompassPrimary, GridCoordinate); 4]> {
        CompassPrimary::ALL
            .iter()
            .filter_map(|&dir| self.neighbour_at_direction(coord, dir).map(|n| (dir, n)))
            .filter(|&(_, n)| self.cell(n).map_or(false, |cell| !cell.visited))
            .collect()
    }

    /// Mark a cell as reached by the carve.
    pub fn mark_visited(&mut self, coord: GridCoordinate) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.visited = true;
            cell.is_path = true;
        }
    }

    /// Remove the wall of `coord` facing `dir`, and the matching wall of the neighbour when
    /// there is one. A wall facing out of the grid is cleared on this cell only.
    /// Returns the neighbour whose wall was also removed.
    pub fn knock_down(&mut self, coord: GridCoordinate, dir: CompassPrimary) -> Option<GridCoordinate> {
        self.cell_mut(coord)?.walls.remove(dir);

        let neighbour = self.neighbour_at_direction(coord, dir)?;
        if let Some(cell) = self.cell_mut(neighbour) {
            cell.walls.remove(dir.opposite());
        }
        Some(neighbour)
    }

    pub fn is_neighbour_linked(&self, coord: GridCoordinate, direction: CompassPrimary) -> bool {
        match (self.cell(coord), self.neighbour_at_direction(coord, direction)) {
            (Some(cell), Some(_)) => !cell.has_wall(direction),
            _ => false,
        }
    }

    /// Number of open passages between pairs of cells inside the grid.
    pub fn passages_count(&self) -> usize {
        self.iter()
            .map(|coord| {
                [CompassPrimary::South, CompassPrimary::East]
                    .iter()
                    .filter(|&&dir| self.is_neighbour_linked(coord, dir))
                    .count()
            })
            .sum()
    }

    /// True when every pair of adjacent cells agrees about the wall between them.
    pub fn has_symmetric_walls(&self) -> bool {
        self.iter().all(|coord| {
            CompassPrimary::ALL.iter().all(|&dir| {
                match self.neighbour_at_direction(coord, dir) {
                    Some(n) => self.is_neighbour_linked(coord, dir) ==
                               self.is_neighbour_linked(n, dir.opposite()),
                    None => true,
                }
            })
        })
    }

    pub fn all_visited(&self) -> bool {
        self.cells.iter().all(|cell| cell.visited)
    }

    pub fn iter(&self) -> impl Iterator<Item = GridCoordinate> + '_ {
        self.cells.iter().map(|cell| cell.coord)
    }

    pub fn iter_row(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.0)
    }
}
