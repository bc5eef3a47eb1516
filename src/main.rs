use docopt::Docopt;
use log::info;
use maze_nav::{
    geometry::WorldFrame,
    grid_displays::{MazeView, OccupancyDisplay, PathDisplay},
    maze_data::{MazeConfig, MazeData},
    pathing::{Algorithm, Pathfinder},
    protocol,
    units::{Height, Level, Width},
};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde_derive::Deserialize;
use std::{
    fs::File,
    io,
    io::prelude::*,
};

const USAGE: &str = "Maze Nav

Usage:
    maze_driver -h | --help
    maze_driver generate [--width=<w>] [--height=<h>] [--level=<n>] [--seed=<s>] [--json-out=<path>] [--text]
    maze_driver solve [(bfs|dijkstra|astar|all)] [--width=<w>] [--height=<h>] [--seed=<s>] [--max-expansions=<n>] [--text-out=<path>] [--show-grid]
    maze_driver pathfind [--request=<path>] [--json-out=<path>] [--max-expansions=<n>]

Options:
    -h --help                Show this screen.
    --width=<w>              The maze width in cells [default: 15].
    --height=<h>             The maze height in cells [default: 15].
    --level=<n>              The level number recorded in the maze data [default: 1].
    --seed=<s>               Seed for the random source. A fresh random seed is used if not given.
    --json-out=<path>        Output file path for JSON. Written to stdout if not given.
    --text                   Also print a text rendering of the generated maze.
    --text-out=<path>        Output file path for the text rendering of a solved maze.
    --show-grid              Render the solved route on the occupancy grid instead of the maze cells.
    --max-expansions=<n>     Give up a search after expanding this many cells.
    --request=<path>         JSON path request file, {maze, start, end, algorithm}. Read from stdin if not given.
";

#[derive(Debug, Deserialize)]
struct MazeArgs {
    cmd_generate: bool,
    cmd_solve: bool,
    cmd_pathfind: bool,
    cmd_bfs: bool,
    cmd_dijkstra: bool,
    cmd_astar: bool,
    cmd_all: bool,
    flag_width: usize,
    flag_height: usize,
    flag_level: u32,
    flag_seed: Option<u64>,
    flag_json_out: String,
    flag_text: bool,
    flag_text_out: String,
    flag_show_grid: bool,
    flag_max_expansions: Option<usize>,
    flag_request: String,
}

mod errors {
    use error_chain::*;
    error_chain! {
        foreign_links {
            DocOptFailure(::docopt::Error);
            Io(::std::io::Error);
            Json(::serde_json::Error);
            Generation(::maze_nav::grid::GenerationError);
        }
    }
}
use crate::errors::*;

fn main() -> Result<()> {
    env_logger::init();

    let args: MazeArgs = Docopt::new(USAGE).and_then(|d| d.deserialize())?;

    if args.cmd_generate {
        generate(&args)
    } else if args.cmd_solve {
        solve(&args)
    } else if args.cmd_pathfind {
        pathfind(&args)
    } else {
        Ok(())
    }
}

fn seeded_rng(maze_args: &MazeArgs) -> XorShiftRng {
    match maze_args.flag_seed {
        Some(seed) => XorShiftRng::seed_from_u64(seed),
        None => XorShiftRng::from_entropy(),
    }
}

fn maze_config(maze_args: &MazeArgs) -> MazeConfig {
    MazeConfig::new(Width(maze_args.flag_width),
                    Height(maze_args.flag_height),
                    Level(maze_args.flag_level))
}

fn generate(maze_args: &MazeArgs) -> Result<()> {
    let mut rng = seeded_rng(maze_args);
    let (grid, data) = MazeData::generate(&maze_config(maze_args), &mut rng)?;

    if maze_args.flag_text {
        eprintln!("{}", grid);
    }

    let json = serde_json::to_string_pretty(&data)?;
    write_output(&json, &maze_args.flag_json_out)
}

/// Generate a maze and route from its start to its end with each requested search.
fn solve(maze_args: &MazeArgs) -> Result<()> {
    let mut rng = seeded_rng(maze_args);
    let (grid, data) = MazeData::generate(&maze_config(maze_args), &mut rng)?;
    let frame = WorldFrame::for_occupancy(&data.map_layout);
    let start = [data.start_point.x, data.start_point.z];
    let end = [data.end_point.x, data.end_point.z];

    let mut output = String::new();
    for algorithm in requested_algorithms(maze_args) {
        let mut finder = Pathfinder::new(algorithm);
        if let Some(limit) = maze_args.flag_max_expansions {
            finder = finder.with_max_expansions(limit);
        }
        let result = finder.find_path(&data.map_layout, start, end);

        if result.success {
            let route = result.route();
            if maze_args.flag_show_grid {
                output.push_str(&OccupancyDisplay::with_route(&data.map_layout, route).to_string());
            } else {
                let display = PathDisplay::from_route(route);
                output.push_str(&MazeView::new(&grid, &display).to_string());
            }
            output.push_str(&format!("{}: {} path cells", algorithm, result.length.unwrap_or(0)));
            if let Some(cost) = result.cost {
                output.push_str(&format!(", cost {}", cost));
            }
            output.push('\n');
        } else {
            output.push_str(&format!("{}: {}\n",
                                     algorithm,
                                     result.error.as_deref().unwrap_or("search failed")));
        }
    }
    info!("solved {}x{} world area from {:?} to {:?}",
          frame.world_width(),
          frame.world_height(),
          start,
          end);

    if maze_args.flag_text_out.is_empty() {
        print!("{}", output);
        Ok(())
    } else {
        write_text_to_file(&output, &maze_args.flag_text_out)
            .chain_err(|| format!("Failed to write solved maze to text file {}", maze_args.flag_text_out))
    }
}

fn requested_algorithms(maze_args: &MazeArgs) -> Vec<Algorithm> {
    if maze_args.cmd_all {
        Algorithm::ALL.to_vec()
    } else if maze_args.cmd_bfs {
        vec![Algorithm::BreadthFirst]
    } else if maze_args.cmd_dijkstra {
        vec![Algorithm::Dijkstra]
    } else if maze_args.cmd_astar {
        vec![Algorithm::AStar]
    } else {
        vec![Algorithm::default()]
    }
}

/// Answer one JSON path request.
fn pathfind(maze_args: &MazeArgs) -> Result<()> {
    let mut body = String::new();
    if maze_args.flag_request.is_empty() {
        io::stdin().read_to_string(&mut body).chain_err(|| "Failed to read path request from stdin")?;
    } else {
        File::open(&maze_args.flag_request)
            .and_then(|mut f| f.read_to_string(&mut body))
            .chain_err(|| format!("Failed to read path request file {}", maze_args.flag_request))?;
    }

    let mut finder = Pathfinder::default();
    if let Some(limit) = maze_args.flag_max_expansions {
        finder = finder.with_max_expansions(limit);
    }
    let response = protocol::handle_request_json_with(&body, finder);

    write_output(&response, &maze_args.flag_json_out)
}

fn write_output(data: &str, file_name: &str) -> Result<()> {
    if file_name.is_empty() {
        println!("{}", data);
        Ok(())
    } else {
        write_text_to_file(data, file_name)
            .chain_err(|| format!("Failed to write output file {}", file_name))
    }
}

fn write_text_to_file(data: &str, file_name: &str) -> io::Result<()> {
    let mut f = File::create(file_name)?;
    f.write_all(data.as_bytes())?;
    Ok(())
}
