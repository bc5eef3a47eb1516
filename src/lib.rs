//! **maze_nav** generates the mazes of a 3D maze game and finds routes through them.
//!
//! A level is built in three steps:
//!
//! - `generators::generate` carves a `grid::MazeGrid` with a randomised depth first walk and then
//!   opens a few extra passages so the maze has loops.
//! - `maze_data::MazeData` derives what the game draws and walks on from the grid: wall boxes,
//!   start and end positions, checkpoints and the double resolution `occupancy::OccupancyGrid`.
//! - `pathing` searches the occupancy grid with breadth first search, Dijkstra or A* and returns
//!   the route in grid and world coordinates; `protocol` wraps that in a JSON request/response.
//!
//! All randomness comes from a caller supplied `rand::Rng`, so a seeded source reproduces a level
//! exactly.

pub mod cells;
pub mod generators;
pub mod geometry;
pub mod grid;
pub mod grid_displays;
pub mod maze_data;
pub mod occupancy;
pub mod pathing;
pub mod protocol;
pub mod units;
mod utils;
