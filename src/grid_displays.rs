use std::fmt;

use itertools::Itertools;

use crate::cells::{CompassPrimary, GridCoordinate};
use crate::grid::MazeGrid;
use crate::occupancy::{GridPoint, OccupancyGrid, RESOLUTION};
use crate::utils::{self, FnvHashSet};

/// Supplies the three character body of each cell when a maze is drawn as text.
pub trait GridDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String;
}

/// Blank cell bodies.
#[derive(Debug, Copy, Clone, Default)]
pub struct PlainDisplay;

impl GridDisplay for PlainDisplay {
    fn render_cell_body(&self, _: GridCoordinate) -> String {
        String::from("   ")
    }
}

/// Marks the maze cells a route passes through.
#[derive(Debug)]
pub struct PathDisplay {
    on_path_coordinates: FnvHashSet<GridCoordinate>,
    start: Option<GridCoordinate>,
    end: Option<GridCoordinate>,
}

impl PathDisplay {
    pub fn new(path: &[GridCoordinate]) -> PathDisplay {
        let mut on_path_coordinates = utils::fnv_hashset(path.len());
        on_path_coordinates.extend(path.iter().cloned());
        PathDisplay {
            on_path_coordinates,
            start: path.first().cloned(),
            end: path.last().cloned(),
        }
    }

    /// From an occupancy grid route. Only occupancy cells at maze cell centres are kept, the
    /// passage cells between them have no body of their own.
    pub fn from_route(route: &[GridPoint]) -> PathDisplay {
        let cells = route.iter()
            .filter(|p| p.x % RESOLUTION == 1 && p.z % RESOLUTION == 1)
            .map(|p| GridCoordinate::new((p.x / RESOLUTION) as u32, (p.z / RESOLUTION) as u32))
            .collect::<Vec<_>>();
        PathDisplay::new(&cells)
    }
}

impl GridDisplay for PathDisplay {
    fn render_cell_body(&self, coord: GridCoordinate) -> String {
        if self.start == Some(coord) {
            String::from(" S ")
        } else if self.end == Some(coord) {
            String::from(" E ")
        } else if self.on_path_coordinates.contains(&coord) {
            String::from(" . ")
        } else {
            String::from("   ")
        }
    }
}

/// A maze drawn with box drawing characters and a `GridDisplay` for the cell bodies.
pub struct MazeView<'a, D: GridDisplay> {
    grid: &'a MazeGrid,
    displayer: &'a D,
}

impl<'a, D: GridDisplay> MazeView<'a, D> {
    pub fn new(grid: &'a MazeGrid, displayer: &'a D) -> MazeView<'a, D> {
        MazeView { grid, displayer }
    }
}

impl fmt::Display for MazeGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        MazeView::new(self, &PlainDisplay).fmt(f)
    }
}

impl<'a, D: GridDisplay> fmt::Display for MazeView<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const WALL_L: &str = "╴";
        const WALL_R: &str = "╶";
        const WALL_U: &str = "╵";
        const WALL_D: &str = "╷";
        const WALL_LR_3: &str = "───";
        const WALL_LR: &str = "─";
        const WALL_UD: &str = "│";
        const WALL_LD: &str = "┐";
        const WALL_RU: &str = "└";
        const WALL_LU: &str = "┘";
        const WALL_RD: &str = "┌";
        const WALL_LRU: &str = "┴";
        const WALL_LRD: &str = "┬";
        const WALL_LRUD: &str = "┼";
        const WALL_RUD: &str = "├";
        const WALL_LUD: &str = "┤";

        let grid = self.grid;
        let columns_count = grid.width().0;
        let rows_count = grid.height().0;

        // The north boundary is drawn up front, every row below draws its own south boundary.
        let mut output = String::from(WALL_RD);
        for x in 0..columns_count {
            let coord = GridCoordinate::new(x as u32, 0);
            output.push_str(WALL_LR_3);
            if grid.is_neighbour_linked(coord, CompassPrimary::East) {
                output.push_str(WALL_LR);
            } else if x == columns_count - 1 {
                output.push_str(WALL_LD);
            } else {
                output.push_str(WALL_LRD);
            }
        }
        output.push('\n');

        for (index_row, row) in grid.iter_row().enumerate() {
            let is_last_row = index_row == rows_count - 1;
            let mut row_middle_section_render = String::from(WALL_UD);
            let mut row_bottom_section_render = String::new();

            for (index_column, cell) in row.iter().enumerate() {
                let cell_coord = cell.coord;
                let is_last_column = index_column == columns_count - 1;
                let east_open = grid.is_neighbour_linked(cell_coord, CompassPrimary::East);
                let south_open = grid.is_neighbour_linked(cell_coord, CompassPrimary::South);

                row_middle_section_render.push_str(&self.displayer.render_cell_body(cell_coord));
                row_middle_section_render.push_str(if east_open { " " } else { WALL_UD });

                if index_column == 0 {
                    row_bottom_section_render.push_str(if is_last_row {
                        WALL_RU
                    } else if south_open {
                        WALL_UD
                    } else {
                        WALL_RUD
                    });
                }
                row_bottom_section_render.push_str(if south_open { "   " } else { WALL_LR_3 });

                let corner = match (is_last_row, is_last_column) {
                    (true, true) => WALL_LU,
                    (true, false) => if east_open { WALL_LR } else { WALL_LRU },
                    (false, true) => if south_open { WALL_UD } else { WALL_LUD },
                    (false, false) => {
                        let access_se_from_east =
                            grid.neighbour_at_direction(cell_coord, CompassPrimary::East)
                                .map_or(false,
                                        |c| grid.is_neighbour_linked(c, CompassPrimary::South));
                        let access_se_from_south =
                            grid.neighbour_at_direction(cell_coord, CompassPrimary::South)
                                .map_or(false,
                                        |c| grid.is_neighbour_linked(c, CompassPrimary::East));

                        match (!south_open, !access_se_from_east, !east_open, !access_se_from_south) {
                            (true, true, true, true) => WALL_LRUD,
                            (true, true, true, false) => WALL_LRU,
                            (true, true, false, true) => WALL_LRD,
                            (true, false, true, true) => WALL_LUD,
                            (false, true, true, true) => WALL_RUD,
                            (true, true, false, false) => WALL_LR,
                            (false, false, true, true) => WALL_UD,
                            (false, true, true, false) => WALL_RU,
                            (true, false, false, true) => WALL_LD,
                            (true, false, true, false) => WALL_LU,
                            (false, true, false, true) => WALL_RD,
                            (true, false, false, false) => WALL_L,
                            (false, true, false, false) => WALL_R,
                            (false, false, true, false) => WALL_U,
                            (false, false, false, true) => WALL_D,
                            _ => " ",
                        }
                    }
                };
                row_bottom_section_render.push_str(corner);
            }

            output.push_str(&row_middle_section_render);
            output.push('\n');
            output.push_str(&row_bottom_section_render);
            output.push('\n');
        }

        write!(f, "{}", output)
    }
}

/// An occupancy grid as one character per cell: `#` blocked, space walkable, `.` on the route,
/// `S` and `E` for the route's ends.
pub struct OccupancyDisplay<'a> {
    grid: &'a OccupancyGrid,
    route: &'a [GridPoint],
}

impl<'a> OccupancyDisplay<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> OccupancyDisplay<'a> {
        OccupancyDisplay { grid, route: &[] }
    }

    pub fn with_route(grid: &'a OccupancyGrid, route: &'a [GridPoint]) -> OccupancyDisplay<'a> {
        OccupancyDisplay { grid, route }
    }
}

impl<'a> fmt::Display for OccupancyDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut on_route = utils::index_set(self.grid.size());
        for &p in self.route {
            if let Some(index) = self.grid.point_to_index(p) {
                on_route.insert(index);
            }
        }
        let start = self.route.first().cloned();
        let end = self.route.last().cloned();

        let rows = (0..self.grid.height()).map(|z| {
            (0..self.grid.width())
                .map(|x| {
                    let p = GridPoint::new(x, z);
                    if Some(p) == start {
                        'S'
                    } else if Some(p) == end {
                        'E'
                    } else if self.grid.point_to_index(p).map_or(false, |i| on_route.contains(i)) {
                        '.'
                    } else if self.grid.is_walkable(p) {
                        ' '
                    } else {
                        '#'
                    }
                })
                .collect::<String>()
        });
        writeln!(f, "{}", rows.format("\n"))
    }
}
