use log::info;
use rand::Rng;
use serde_derive::{Deserialize, Serialize};

use crate::generators;
use crate::geometry::{self, Checkpoint, WallSegment, WorldFrame, WorldPoint, CELL_SIZE};
use crate::grid::{GenerationError, MazeGrid, MIN_SIDE_LENGTH};
use crate::occupancy::OccupancyGrid;
use crate::units::{Height, Level, Width};

pub const DEFAULT_SIDE_LENGTH: usize = 15;

/// Size and level of a maze to build.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct MazeConfig {
    pub width: Width,
    pub height: Height,
    pub level: Level,
}

impl Default for MazeConfig {
    fn default() -> MazeConfig {
        MazeConfig {
            width: Width(DEFAULT_SIDE_LENGTH),
            height: Height(DEFAULT_SIDE_LENGTH),
            level: Level(1),
        }
    }
}

impl MazeConfig {
    pub fn new(width: Width, height: Height, level: Level) -> MazeConfig {
        MazeConfig { width, height, level }
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.width.0 < MIN_SIDE_LENGTH || self.height.0 < MIN_SIDE_LENGTH {
            Err(GenerationError::InvalidDimensions {
                width: self.width.0,
                height: self.height.0,
            })
        } else {
            Ok(())
        }
    }
}

/// Sizes of the occupancy grid and of the world area it covers.
#[derive(PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDimensions {
    pub width: usize,
    pub height: usize,
    pub cell_size: f32,
    pub world_width: f32,
    pub world_height: f32,
}

impl MapDimensions {
    pub fn of(layout: &OccupancyGrid) -> MapDimensions {
        let frame = WorldFrame::for_occupancy(layout);
        MapDimensions {
            width: layout.width(),
            height: layout.height(),
            cell_size: CELL_SIZE,
            world_width: frame.world_width(),
            world_height: frame.world_height(),
        }
    }
}

/// Everything the game layer needs for one level. Built once and replaced wholesale by the next
/// level's data.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MazeData {
    pub level: Level,
    pub walls: Vec<WallSegment>,
    pub start_point: WorldPoint,
    pub end_point: WorldPoint,
    pub checkpoints: Vec<Checkpoint>,
    pub map_layout: OccupancyGrid,
    pub dimensions: MapDimensions,
}

impl MazeData {
    /// Generate a level. The random source is drawn on for the carve, the extra passages, the
    /// wall colours and the checkpoints, in that order, so a seeded source always gives the same
    /// level.
    pub fn generate<R: Rng + ?Sized>(config: &MazeConfig,
                                     rng: &mut R)
                                     -> Result<(MazeGrid, MazeData), GenerationError> {
        config.validate()?;
        let grid = generators::generate(config.width, config.height, rng)?;
        let data = MazeData::from_grid(&grid, config.level, rng);
        info!("level {}: {}x{} maze, {} walls, {} checkpoints",
              config.level.0,
              config.width.0,
              config.height.0,
              data.walls.len(),
              data.checkpoints.len());
        Ok((grid, data))
    }

    /// Derive the level data of an already generated grid.
    pub fn from_grid<R: Rng + ?Sized>(grid: &MazeGrid, level: Level, rng: &mut R) -> MazeData {
        let frame = WorldFrame::for_maze(grid.width(), grid.height());
        let walls = geometry::wall_segments(grid, rng);
        let checkpoints = geometry::checkpoints(grid, rng);
        let map_layout = OccupancyGrid::from_maze(grid);
        let dimensions = MapDimensions::of(&map_layout);

        MazeData {
            level,
            walls,
            start_point: frame.start_position(),
            end_point: frame.end_position(),
            checkpoints,
            map_layout,
            dimensions,
        }
    }
}
