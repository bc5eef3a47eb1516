use log::{debug, trace};
use rand::Rng;

use crate::cells::{CompassPrimary, GridCoordinate};
use crate::grid::{GenerationError, MazeGrid};
use crate::units::{Height, Width};

/// Share of the grid's cells sampled for extra passages after the primary carve.
pub const EXTRA_PASSAGE_RATIO: f64 = 0.1;

/// Build a maze: a randomised depth first carve followed by a pass that opens a few extra
/// passages so that the maze has loops.
///
/// The same seeded `rng` always produces the same maze.
pub fn generate<R: Rng + ?Sized>(width: Width,
                                 height: Height,
                                 rng: &mut R)
                                 -> Result<MazeGrid, GenerationError> {
    let mut grid = MazeGrid::new(width, height)?;
    let start = recursive_backtracker(&mut grid, rng);
    let sampled = add_random_passages(&mut grid, rng);
    debug!("generated {}x{} maze from {} with {} extra passage samples, {} passages",
           width.0,
           height.0,
           start,
           sampled,
           grid.passages_count());
    Ok(grid)
}

/// Apply the recursive backtracker maze generation algorithm to a grid.
///
/// A random walk from a random start cell that only steps into cells it has not seen before.
/// When the walk reaches a dead end (no unvisited neighbours) it backs up along its own trail
/// until it finds a cell with an unvisited neighbour and carries on from there. The trail is an
/// explicit stack of coordinates rather than recursion, so large grids cannot blow the call
/// stack.
///
/// Every cell of the grid is connected to its neighbours, so the walk visits all of them and the
/// result is a perfect maze: exactly one route between any two cells.
///
/// Returns the start cell of the walk.
pub fn recursive_backtracker<R: Rng + ?Sized>(grid: &mut MazeGrid, rng: &mut R) -> GridCoordinate {
    let start = grid.random_cell(rng);
    grid.mark_visited(start);

    let mut stack = Vec::with_capacity(grid.size().0);
    stack.push(start);

    while let Some(&current) = stack.last() {
        let unvisited = grid.unvisited_neighbours(current);

        if unvisited.is_empty() {
            stack.pop();
        } else {
            let (dir, next) = unvisited[rng.gen_range(0..unvisited.len())];
            trace!("carve {} -> {} ({:?})", current, next, dir);
            grid.knock_down(current, dir);
            grid.mark_visited(next);
            stack.push(next);
        }
    }

    start
}

/// How many cells `add_random_passages` samples for a grid of this size.
pub fn extra_passages_count(grid: &MazeGrid) -> usize {
    (grid.size().0 as f64 * EXTRA_PASSAGE_RATIO).floor() as usize
}

/// Knock down either the east or the south wall of randomly chosen cells, turning the perfect
/// maze into one with some loops.
///
/// Cells are sampled with replacement and may already be open in the chosen direction. A cell on
/// the east or south edge of the grid loses its outer wall flag only; there is no neighbour to
/// update. Walls are only ever removed, so no cell can become unreachable.
///
/// Returns the number of cells sampled.
pub fn add_random_passages<R: Rng + ?Sized>(grid: &mut MazeGrid, rng: &mut R) -> usize {
    let samples = extra_passages_count(grid);

    for _ in 0..samples {
        let coord = grid.random_cell(rng);
        let dir = if rng.gen() {
            CompassPrimary::East
        } else {
            CompassPrimary::South
        };
        let neighbour = grid.knock_down(coord, dir);
        trace!("extra passage at {} {:?} -> {:?}", coord, dir, neighbour);
    }

    samples
}

#[cfg(test)]
mod tests {
    use quickcheck::{quickcheck, TestResult};
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::occupancy::OccupancyGrid;

    fn seeded(seed: u64) -> XorShiftRng {
        XorShiftRng::seed_from_u64(seed)
    }

    fn carved(w: usize, h: usize, seed: u64) -> MazeGrid {
        let mut grid = MazeGrid::new(Width(w), Height(h)).unwrap();
        recursive_backtracker(&mut grid, &mut seeded(seed));
        grid
    }

    #[test]
    fn invalid_dimensions_fail_fast() {
        let mut rng = seeded(1);
        assert_eq!(generate(Width(1), Height(10), &mut rng).unwrap_err(),
                   GenerationError::InvalidDimensions { width: 1, height: 10 });
    }

    #[test]
    fn carve_visits_every_cell() {
        let grid = carved(15, 15, 42);
        assert!(grid.all_visited());
        assert!(grid.cells().iter().all(|c| c.is_path));
    }

    #[test]
    fn carve_is_a_spanning_tree() {
        // A tree over n cells has exactly n - 1 edges.
        let grid = carved(12, 7, 3);
        assert_eq!(grid.passages_count(), 12 * 7 - 1);
        assert!(grid.has_symmetric_walls());
    }

    #[test]
    fn extra_passages_only_add_links() {
        let mut grid = carved(15, 15, 9);
        let before = grid.passages_count();
        let samples = add_random_passages(&mut grid, &mut seeded(10));
        assert_eq!(samples, 22);
        assert!(grid.passages_count() >= before);
        assert!(grid.has_symmetric_walls());
    }

    #[test]
    fn tiny_grids_get_no_extra_passages() {
        let mut grid = carved(3, 3, 1);
        let before = grid.clone();
        assert_eq!(add_random_passages(&mut grid, &mut seeded(1)), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn same_seed_same_maze() {
        let a = generate(Width(15), Height(15), &mut seeded(1234)).unwrap();
        let b = generate(Width(15), Height(15), &mut seeded(1234)).unwrap();
        let c = generate(Width(15), Height(15), &mut seeded(4321)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn quickcheck_carve_connects_all_cells() {
        fn p(w: u8, h: u8, seed: u64) -> TestResult {
            let (w, h) = (w as usize % 30, h as usize % 30);
            if w < 2 || h < 2 {
                return TestResult::discard();
            }
            let grid = carved(w, h, seed);
            TestResult::from_bool(grid.all_visited() && grid.passages_count() == w * h - 1)
        }
        quickcheck(p as fn(u8, u8, u64) -> TestResult);
    }

    #[test]
    fn quickcheck_walls_stay_symmetric() {
        fn p(w: u8, h: u8, seed: u64) -> TestResult {
            let (w, h) = (w as usize % 30, h as usize % 30);
            if w < 2 || h < 2 {
                return TestResult::discard();
            }
            let grid = generate(Width(w), Height(h), &mut seeded(seed)).unwrap();
            TestResult::from_bool(grid.has_symmetric_walls())
        }
        quickcheck(p as fn(u8, u8, u64) -> TestResult);
    }

    #[test]
    fn quickcheck_loops_never_disconnect() {
        fn p(w: u8, h: u8, seed: u64) -> TestResult {
            let (w, h) = (w as usize % 30, h as usize % 30);
            if w < 2 || h < 2 {
                return TestResult::discard();
            }
            let mut rng = seeded(seed);
            let mut grid = MazeGrid::new(Width(w), Height(h)).unwrap();
            recursive_backtracker(&mut grid, &mut rng);
            let before = OccupancyGrid::from_maze(&grid).component_count();
            add_random_passages(&mut grid, &mut rng);
            let after = OccupancyGrid::from_maze(&grid).component_count();
            TestResult::from_bool(before == 1 && after == 1)
        }
        quickcheck(p as fn(u8, u8, u64) -> TestResult);
    }
}
