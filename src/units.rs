use serde_derive::{Deserialize, Serialize};

/// Number of cells along the x axis of a maze.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct Width(pub usize);

/// Number of cells along the z axis of a maze.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct Height(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct CellsCount(pub usize);

/// Level number of a generated maze, starting at 1.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub struct Level(pub u32);
