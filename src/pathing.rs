//! Route finding over an `OccupancyGrid`.
//!
//! Three searches are offered. They all move between 4-connected walkable cells at a cost of one
//! per move, so they all find routes of the same (shortest) length; they differ in how they
//! explore and may pick different routes among equally short ones.
//!
//! - Breadth first: a FIFO frontier, neighbours queued North, South, East, West.
//! - Dijkstra: a min-heap frontier keyed by the cost so far.
//! - A*: a min-heap frontier keyed by the cost so far plus the Manhattan distance to the goal,
//!   which never overestimates on a 4-connected unit cost grid.
//!
//! Heap ties are broken by insertion order, so every search is deterministic.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::fmt;
use std::str::FromStr;

use log::{debug, trace};
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::WorldFrame;
use crate::occupancy::{GridPoint, OccupancyGrid};
use crate::utils::{self, FnvHashMap};

/// Cost of a single move between adjacent cells.
pub const STEP_COST: u32 = 1;

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "BFS")]
    BreadthFirst,
    #[serde(rename = "Dijkstra")]
    Dijkstra,
    #[serde(rename = "A*")]
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::BreadthFirst, Algorithm::Dijkstra, Algorithm::AStar];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::BreadthFirst => "BFS",
            Algorithm::Dijkstra => "Dijkstra",
            Algorithm::AStar => "A*",
        }
    }

    /// Whether results report a total cost, true for the priority queue searches.
    pub fn reports_cost(self) -> bool {
        self != Algorithm::BreadthFirst
    }
}

impl Default for Algorithm {
    fn default() -> Algorithm {
        Algorithm::AStar
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Eq, PartialEq, Clone, Debug)]
#[error("unknown pathfinding algorithm {0:?}, expected one of bfs, dijkstra, astar")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Algorithm, UnknownAlgorithm> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" | "breadth-first" => Ok(Algorithm::BreadthFirst),
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "astar" | "a*" | "a-star" => Ok(Algorithm::AStar),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Which end of a route a position belongs to.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Endpoint::Start => "start",
            Endpoint::End => "end",
        })
    }
}

#[derive(Error, PartialEq, Clone, Debug)]
pub enum PathfindingError {
    #[error("{endpoint} position ({x}, {z}) lies outside the maze")]
    OutOfBounds { endpoint: Endpoint, x: f32, z: f32 },
    #[error("{endpoint} cell {cell} lies outside the {width}x{height} grid")]
    OffGrid { endpoint: Endpoint, cell: GridPoint, width: usize, height: usize },
    #[error("{endpoint} position lies on blocked cell {cell}")]
    BlockedEndpoint { endpoint: Endpoint, cell: GridPoint },
    #[error("no path found from {start} to {goal}")]
    NoPathFound { start: GridPoint, goal: GridPoint },
    #[error("search stopped after expanding {0} cells without reaching the goal")]
    BudgetExhausted(usize),
}

impl PathfindingError {
    /// True for endpoints that cannot be searched from or to at all.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(*self,
                 PathfindingError::OutOfBounds { .. } | PathfindingError::OffGrid { .. } |
                 PathfindingError::BlockedEndpoint { .. })
    }
}

/// A route through the occupancy grid, start first.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct GridRoute {
    pub cells: Vec<GridPoint>,
    pub cost: u32,
    /// Cells taken off the frontier while searching.
    pub expanded: usize,
}

impl GridRoute {
    /// Number of moves, one less than the number of cells.
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }
}

/// Outcome of a route request in the shape the game layer consumes.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub algorithm: Algorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_path: Option<Vec<GridPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_path: Option<Vec<[f32; 3]>>,
    /// Number of cells on the route, start and end included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub failure: Option<PathfindingError>,
}

impl PathResult {
    pub fn found(algorithm: Algorithm, route: &GridRoute, frame: &WorldFrame) -> PathResult {
        let world_path = route.cells
            .iter()
            .map(|&p| frame.occupancy_centre(p).to_array())
            .collect();
        PathResult {
            algorithm,
            grid_path: Some(route.cells.clone()),
            world_path: Some(world_path),
            length: Some(route.cells.len()),
            success: true,
            cost: if algorithm.reports_cost() { Some(route.cost) } else { None },
            error: None,
            failure: None,
        }
    }

    pub fn failed(algorithm: Algorithm, failure: PathfindingError) -> PathResult {
        PathResult {
            algorithm,
            grid_path: None,
            world_path: None,
            length: None,
            success: false,
            cost: None,
            error: Some(failure.to_string()),
            failure: Some(failure),
        }
    }

    /// A request that never reached the search, e.g. one that could not be parsed.
    pub fn rejected(algorithm: Algorithm, error: String) -> PathResult {
        PathResult {
            algorithm,
            grid_path: None,
            world_path: None,
            length: None,
            success: false,
            cost: None,
            error: Some(error),
            failure: None,
        }
    }

    /// The grid route, empty when the search failed.
    pub fn route(&self) -> &[GridPoint] {
        self.grid_path.as_ref().map_or(&[], |path| path.as_slice())
    }
}

/// Search configuration. Cheap to copy and free of state, one value can serve any number of
/// requests on any thread.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default)]
pub struct Pathfinder {
    algorithm: Algorithm,
    max_expansions: Option<usize>,
}

impl Pathfinder {
    pub fn new(algorithm: Algorithm) -> Pathfinder {
        Pathfinder {
            algorithm,
            max_expansions: None,
        }
    }

    /// Give up with `BudgetExhausted` after taking this many cells off the frontier.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Pathfinder {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Pathfinder {
        self.algorithm = algorithm;
        self
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Route between two positions on the walking plane, given as `[x, z]`.
    ///
    /// Failures are reported inside the result, never as a panic.
    pub fn find_path(&self, grid: &OccupancyGrid, start: [f32; 2], end: [f32; 2]) -> PathResult {
        let frame = WorldFrame::for_occupancy(grid);
        let outcome = locate(grid, &frame, Endpoint::Start, start)
            .and_then(|s| locate(grid, &frame, Endpoint::End, end).map(|e| (s, e)))
            .and_then(|(s, e)| self.search(grid, s, e));

        match outcome {
            Ok(route) => PathResult::found(self.algorithm, &route, &frame),
            Err(failure) => {
                debug!("{} search failed: {}", self.algorithm, failure);
                PathResult::failed(self.algorithm, failure)
            }
        }
    }

    /// Route between two occupancy cells.
    pub fn search(&self,
                  grid: &OccupancyGrid,
                  start: GridPoint,
                  goal: GridPoint)
                  -> Result<GridRoute, PathfindingError> {
        for &(endpoint, point) in [(Endpoint::Start, start), (Endpoint::End, goal)].iter() {
            if !grid.contains(point) {
                return Err(PathfindingError::OffGrid {
                    endpoint,
                    cell: point,
                    width: grid.width(),
                    height: grid.height(),
                });
            }
            if !grid.is_walkable(point) {
                return Err(PathfindingError::BlockedEndpoint { endpoint, cell: point });
            }
        }

        let mut search = Search::new(grid, start, goal, self.max_expansions);
        let reached = match self.algorithm {
            Algorithm::BreadthFirst => search.breadth_first()?,
            Algorithm::Dijkstra => search.best_first(|_| 0)?,
            Algorithm::AStar => search.best_first(|p: GridPoint| p.manhattan_distance(goal) as u32)?,
        };

        match reached {
            Some(cost) => {
                let route = GridRoute {
                    cells: search.reconstruct(),
                    cost,
                    expanded: search.expanded,
                };
                debug!("{} route {} -> {}: {} steps, {} cells expanded",
                       self.algorithm,
                       start,
                       goal,
                       route.steps(),
                       route.expanded);
                Ok(route)
            }
            None => Err(PathfindingError::NoPathFound { start, goal }),
        }
    }
}

/// Route between two positions on the walking plane with no step budget.
pub fn find_path(grid: &OccupancyGrid,
                 start: [f32; 2],
                 end: [f32; 2],
                 algorithm: Algorithm)
                 -> PathResult {
    Pathfinder::new(algorithm).find_path(grid, start, end)
}

fn locate(grid: &OccupancyGrid,
          frame: &WorldFrame,
          endpoint: Endpoint,
          [x, z]: [f32; 2])
          -> Result<GridPoint, PathfindingError> {
    let cell = frame.world_to_occupancy(x, z)
        .ok_or(PathfindingError::OutOfBounds { endpoint, x, z })?;
    if grid.is_walkable(cell) {
        Ok(cell)
    } else {
        Err(PathfindingError::BlockedEndpoint { endpoint, cell })
    }
}

/// State of one search: the parent of every discovered cell and the expansion budget.
struct Search<'a> {
    grid: &'a OccupancyGrid,
    start: usize,
    goal: usize,
    parents: FnvHashMap<usize, usize>,
    expanded: usize,
    max_expansions: Option<usize>,
}

impl<'a> Search<'a> {
    fn new(grid: &'a OccupancyGrid,
           start: GridPoint,
           goal: GridPoint,
           max_expansions: Option<usize>)
           -> Search<'a> {
        let index = |p: GridPoint| p.z * grid.width() + p.x;
        Search {
            grid,
            start: index(start),
            goal: index(goal),
            parents: utils::fnv_hashmap(grid.size() / 4),
            expanded: 0,
            max_expansions,
        }
    }

    /// Count one cell taken off the frontier, failing once the budget is spent.
    fn expand(&mut self, index: usize) -> Result<(), PathfindingError> {
        if let Some(limit) = self.max_expansions {
            if self.expanded >= limit {
                return Err(PathfindingError::BudgetExhausted(limit));
            }
        }
        self.expanded += 1;
        trace!("expand {}", self.grid.index_to_point(index));
        Ok(())
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + 'a {
        let grid = self.grid;
        grid.walkable_neighbours(grid.index_to_point(index))
            .into_iter()
            .map(move |p| p.z * grid.width() + p.x)
    }

    /// Returns the number of moves to the goal, None when it cannot be reached.
    fn breadth_first(&mut self) -> Result<Option<u32>, PathfindingError> {
        let mut discovered = utils::index_set(self.grid.size());
        let mut depth = utils::fnv_hashmap::<usize, u32>(self.grid.size() / 4);
        discovered.insert(self.start);
        depth.insert(self.start, 0);
        let mut frontier = VecDeque::new();
        frontier.push_back(self.start);

        while let Some(current) = frontier.pop_front() {
            self.expand(current)?;
            let current_depth = depth.get(&current).cloned().unwrap_or(0);
            if current == self.goal {
                return Ok(Some(current_depth));
            }

            for next in self.neighbours(current) {
                if discovered.insert(next) {
                    self.parents.insert(next, current);
                    depth.insert(next, current_depth + STEP_COST);
                    frontier.push_back(next);
                }
            }
        }

        Ok(None)
    }

    /// Dijkstra's algorithm, or A* when `heuristic` is not zero. The heuristic must be consistent,
    /// a cell is never improved after it has been expanded.
    fn best_first<H>(&mut self, heuristic: H) -> Result<Option<u32>, PathfindingError>
        where H: Fn(GridPoint) -> u32
    {
        let grid = self.grid;
        let mut closed = utils::index_set(grid.size());
        let mut best_cost = utils::fnv_hashmap::<usize, u32>(grid.size() / 4);
        let mut frontier = BinaryHeap::new();
        let mut pushed: u64 = 0;

        best_cost.insert(self.start, 0);
        frontier.push(Reverse((heuristic(grid.index_to_point(self.start)), pushed, self.start)));

        while let Some(Reverse((_, _, current))) = frontier.pop() {
            if !closed.insert(current) {
                // Stale entry, the cell was expanded through a cheaper one.
                continue;
            }
            self.expand(current)?;
            let cost = best_cost.get(&current).cloned().unwrap_or(0);
            if current == self.goal {
                return Ok(Some(cost));
            }

            for next in self.neighbours(current) {
                if closed.contains(next) {
                    continue;
                }
                let next_cost = cost + STEP_COST;
                if best_cost.get(&next).map_or(true, |&known| next_cost < known) {
                    best_cost.insert(next, next_cost);
                    self.parents.insert(next, current);
                    pushed += 1;
                    let priority = next_cost + heuristic(grid.index_to_point(next));
                    frontier.push(Reverse((priority, pushed, next)));
                }
            }
        }

        Ok(None)
    }

    /// Walk the parents back from the goal, then flip to start-first order.
    fn reconstruct(&self) -> Vec<GridPoint> {
        let mut path = vec![self.grid.index_to_point(self.goal)];
        let mut current = self.goal;
        while current != self.start {
            match self.parents.get(&current) {
                Some(&parent) => {
                    current = parent;
                    path.push(self.grid.index_to_point(current));
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}
