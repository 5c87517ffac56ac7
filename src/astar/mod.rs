// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

mod error;
mod flat;

pub use error::AStarError;
pub use flat::{find_route, path_length, shortest_path};
