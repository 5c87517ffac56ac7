// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Small road-network routing engine over [OpenStreetMap](https://www.openstreetmap.org/) data.
//!
//! Map data (either loaded from an OSM XML file through the [osm] module,
//! or provided directly as [Nodes](Node) and [Ways](Way)) is turned into an undirected
//! [Graph], weighted by great-circle distance. On top of the graph, mapnav can:
//! - find the closest node to an arbitrary position ([Graph::find_nearest_node]),
//! - find shortest routes with A* ([find_route], [shortest_path]),
//! - turn routes into turn-by-turn directions ([route_directions]).
//!
//! Independently of the graph, [TileConfig::rasterize] selects the grid of map image tiles
//! covering an arbitrary viewport at the most appropriate zoom depth.
//!
//! # Example
//!
//! ```no_run
//! let options = mapnav::osm::Options {
//!     profile: &mapnav::osm::CAR_PROFILE,
//!     file_format: mapnav::osm::FileFormat::Xml,
//!     bbox: [0.0; 4],
//! };
//! let g = mapnav::osm::load_from_file(&options, "path/to/berkeley.osm")
//!     .expect("failed to load berkeley.osm");
//!
//! let route = mapnav::shortest_path(&g, -122.2591, 37.8700, -122.2548, 37.8757);
//! for maneuver in mapnav::route_directions(&g, &route) {
//!     println!("{}", maneuver);
//! }
//! ```

use std::collections::{BTreeSet, HashMap};

mod astar;
mod directions;
mod distance;
mod graph;
pub mod osm;
mod raster;

pub use astar::{find_route, path_length, shortest_path, AStarError};
pub use directions::{route_directions, Maneuver, ParseManeuverError, Turn, UNKNOWN_ROAD};
pub use distance::{earth_distance, initial_bearing, normalize_bearing, EARTH_RADIUS_MILES};
pub use graph::{Graph, GraphError};
pub use raster::{
    BoundingBox, Raster, RasterError, Tile, TileConfig, Viewport, DEFAULT_TILE_CONFIG, MAX_TILE_DEPTH,
};

/// Represents an intersection (or any other point) of the [Graph].
///
/// `ways` lists ids of all routable [Ways](Way) passing through this node;
/// it is filled in by [Graph::build_adjacency] and should be left empty by callers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub ways: BTreeSet<i64>,
    pub tags: HashMap<String, String>,
}

impl Node {
    /// Creates a new, untagged node at the provided position.
    pub fn new(id: i64, lon: f64, lat: f64) -> Self {
        Self {
            id,
            lon,
            lat,
            ..Default::default()
        }
    }

    /// Returns the value of the `name` tag, if present.
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(|s| s.as_str())
    }
}

/// Represents a sequence of [Nodes](Node), usually a road.
///
/// Only `routable` ways contribute connections to the [Graph]; the rest
/// (e.g. buildings, rivers or administrative boundaries) are kept purely for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Way {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub routable: bool,
    pub tags: HashMap<String, String>,
}

impl Way {
    /// Creates a new, untagged way over the provided nodes.
    pub fn new(id: i64, nodes: Vec<i64>, routable: bool) -> Self {
        Self {
            id,
            nodes,
            routable,
            tags: HashMap::default(),
        }
    }

    /// Sets the `name` tag of the way.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.tags.insert("name".to_string(), name.into());
        self
    }

    /// Returns the value of the `name` tag, if present.
    pub fn name(&self) -> Option<&str> {
        self.tags.get("name").map(|s| s.as_str())
    }

    /// Checks whether `a` and `b` are directly connected by this way,
    /// in either direction.
    pub fn connects(&self, a: i64, b: i64) -> bool {
        self.nodes
            .windows(2)
            .any(|pair| (pair[0] == a && pair[1] == b) || (pair[0] == b && pair[1] == a))
    }
}
