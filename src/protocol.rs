//! JSON binding for route requests from the game layer.
//!
//! A request looks like
//!
//! ```json
//! { "maze": [[1, 1, 1], [1, 0, 0], [1, 1, 1]], "start": [-2.0, 0.0], "end": [0.0, 0.0],
//!   "algorithm": "bfs" }
//! ```
//!
//! `algorithm` is optional and defaults to A*. Names are matched case insensitively; an unknown
//! name is logged and searched with A*.

use log::warn;
use serde_derive::{Deserialize, Serialize};
use serde_json::json;

use crate::occupancy::OccupancyGrid;
use crate::pathing::{Algorithm, PathResult, Pathfinder};

#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct PathRequest {
    pub maze: OccupancyGrid,
    pub start: [f32; 2],
    pub end: [f32; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

impl PathRequest {
    /// The search to run, A* when none or an unknown one is named.
    pub fn algorithm(&self) -> Algorithm {
        match self.algorithm {
            None => Algorithm::default(),
            Some(ref name) => {
                name.parse().unwrap_or_else(|err| {
                    warn!("{}, using {}", err, Algorithm::default());
                    Algorithm::default()
                })
            }
        }
    }
}

pub fn handle_request(request: &PathRequest) -> PathResult {
    handle_request_with(request, Pathfinder::default())
}

/// Handle a request with a preconfigured pathfinder, e.g. one with an expansion budget. The
/// request's own algorithm choice wins.
pub fn handle_request_with(request: &PathRequest, finder: Pathfinder) -> PathResult {
    finder.with_algorithm(request.algorithm())
        .find_path(&request.maze, request.start, request.end)
}

/// Parse a JSON request and answer with a JSON `PathResult`. Malformed input produces a failed
/// result carrying the parse error rather than an `Err`.
pub fn handle_request_json(body: &str) -> String {
    handle_request_json_with(body, Pathfinder::default())
}

/// `handle_request_json` with a preconfigured pathfinder.
pub fn handle_request_json_with(body: &str, finder: Pathfinder) -> String {
    let result = match serde_json::from_str::<PathRequest>(body) {
        Ok(request) => handle_request_with(&request, finder),
        Err(err) => {
            warn!("rejected path request: {}", err);
            PathResult::rejected(Algorithm::default(), format!("invalid request: {}", err))
        }
    };
    result_to_json(&result)
}

fn result_to_json(result: &PathResult) -> String {
    serde_json::to_string(result).unwrap_or_else(|err| {
        json!({
            "algorithm": result.algorithm.name(),
            "success": false,
            "error": err.to_string()
        })
        .to_string()
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::geometry::WorldFrame;
    use crate::occupancy::GridPoint;

    const CORRIDOR: &str = r#"[[1, 1, 1, 1, 1],
                               [1, 0, 0, 0, 1],
                               [1, 1, 1, 1, 1]]"#;

    fn world(maze: &OccupancyGrid, x: usize, z: usize) -> [f32; 2] {
        let p = WorldFrame::for_occupancy(maze).occupancy_centre(GridPoint::new(x, z));
        [p.x, p.z]
    }

    fn corridor_request(algorithm: Option<&str>) -> PathRequest {
        let maze: OccupancyGrid = serde_json::from_str(CORRIDOR).unwrap();
        PathRequest {
            start: world(&maze, 1, 1),
            end: world(&maze, 3, 1),
            maze,
            algorithm: algorithm.map(|a| a.to_string()),
        }
    }

    #[test]
    fn algorithm_selection() {
        assert_eq!(corridor_request(None).algorithm(), Algorithm::AStar);
        assert_eq!(corridor_request(Some("BFS")).algorithm(), Algorithm::BreadthFirst);
        assert_eq!(corridor_request(Some("dijkstra")).algorithm(), Algorithm::Dijkstra);
        assert_eq!(corridor_request(Some("flood")).algorithm(), Algorithm::AStar);
    }

    #[test]
    fn answers_a_request() {
        let result = handle_request(&corridor_request(Some("bfs")));
        assert!(result.success);
        assert_eq!(result.algorithm, Algorithm::BreadthFirst);
        assert_eq!(result.route(),
                   &[GridPoint::new(1, 1), GridPoint::new(2, 1), GridPoint::new(3, 1)]);
    }

    #[test]
    fn budget_is_carried_over() {
        let request = corridor_request(Some("dijkstra"));
        let result = handle_request_with(&request, Pathfinder::default().with_max_expansions(1));
        assert!(!result.success);
        assert_eq!(result.algorithm, Algorithm::Dijkstra);
    }

    #[test]
    fn json_round_trip() {
        let request = corridor_request(Some("astar"));
        let body = serde_json::to_string(&request).unwrap();
        let response: Value = serde_json::from_str(&handle_request_json(&body)).unwrap();
        assert_eq!(response["success"], true);
        assert_eq!(response["algorithm"], "A*");
        assert_eq!(response["length"], 3);
        assert_eq!(response["cost"], 2);
        assert_eq!(response["gridPath"], json!([[1, 1], [1, 2], [1, 3]]));
        assert_eq!(response["worldPath"][0][1], 2.0);
    }

    #[test]
    fn off_grid_request_fails_cleanly() {
        let body = json!({
            "maze": [[0, 0], [0, 0]],
            "start": [100.0, 100.0],
            "end": [0.0, 0.0]
        });
        let response: Value = serde_json::from_str(&handle_request_json(&body.to_string())).unwrap();
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().contains("start position"));
        assert!(response.get("worldPath").is_none());
    }

    #[test]
    fn malformed_requests_fail_cleanly() {
        for body in ["not json", r#"{"maze": [[0, 3]], "start": [0, 0], "end": [0, 0]}"#,
                     r#"{"maze": [[0, 0], [0]], "start": [0, 0], "end": [0, 0]}"#]
            .iter() {
            let response: Value = serde_json::from_str(&handle_request_json(body)).unwrap();
            assert_eq!(response["success"], false);
            assert!(response["error"].as_str().unwrap().starts_with("invalid request"));
        }
    }

    #[test]
    fn budgeted_json_requests_always_answer() {
        let budgeted = || Pathfinder::default().with_max_expansions(1);

        let response: Value = serde_json::from_str(&handle_request_json_with("{", budgeted())).unwrap();
        assert_eq!(response["success"], false);
        assert!(response["error"].as_str().unwrap().starts_with("invalid request"));

        let body = serde_json::to_string(&corridor_request(Some("bfs"))).unwrap();
        let response: Value = serde_json::from_str(&handle_request_json_with(&body, budgeted())).unwrap();
        assert_eq!(response["success"], false);
        assert_eq!(response["algorithm"], "BFS");
        assert!(response.get("gridPath").is_none());

        let response: Value =
            serde_json::from_str(&handle_request_json_with(&body, Pathfinder::default())).unwrap();
        assert_eq!(response["success"], true);
    }
}
