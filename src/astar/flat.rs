// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{earth_distance, AStarError, Graph};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    score: f64,
    seq: u64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower scores (and earlier insertions) are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&nd) = came_from.get(&last) {
        path.push(nd);
        last = nd;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two nodes in the provided graph.
///
/// Connections are weighted by their great-circle length, and the great-circle distance
/// to the destination is used as the heuristic, so the returned route is the shortest one
/// by distance, not by the number of nodes.
///
/// Returns an empty vector if there is no route between the two nodes.
pub fn find_route(g: &Graph, from_id: i64, to_id: i64) -> Result<Vec<i64>, AStarError> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();
    let mut seq: u64 = 0;
    let mut steps: usize = 0;

    let to_node = g
        .get_node(to_id)
        .ok_or(AStarError::InvalidReference(to_id))?;

    {
        let from_node = g
            .get_node(from_id)
            .ok_or(AStarError::InvalidReference(from_id))?;

        queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
            score: earth_distance(from_node.lon, from_node.lat, to_node.lon, to_node.lat),
            seq,
        });
        known_costs.insert(from_id, 0.0);
    }

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            log::debug!("route {} -> {} found after {} steps", from_id, to_id, steps);
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same node.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }
        steps += 1;

        for neighbor_id in g.neighbors(item.at) {
            // Check if the referred node exists
            let Some(neighbor) = g.get_node(neighbor_id) else {
                continue;
            };
            let Some(edge_cost) = g.distance(item.at, neighbor_id) else {
                continue;
            };

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + edge_cost;
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            // Push the new item into the queue
            seq += 1;
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                score: neighbor_cost
                    + earth_distance(neighbor.lon, neighbor.lat, to_node.lon, to_node.lat),
                seq,
            });
        }
    }

    log::debug!("no route {} -> {} after {} steps", from_id, to_id, steps);
    Ok(vec![])
}

/// Finds the shortest route between the nodes closest to the provided start and
/// destination positions.
///
/// Returns an empty vector if the graph is empty or there is no route
/// between the two positions.
pub fn shortest_path(
    g: &Graph,
    start_lon: f64,
    start_lat: f64,
    dest_lon: f64,
    dest_lat: f64,
) -> Vec<i64> {
    let (Some(start), Some(dest)) = (
        g.find_nearest_node(start_lon, start_lat),
        g.find_nearest_node(dest_lon, dest_lat),
    ) else {
        return vec![];
    };

    match find_route(g, start.id, dest.id) {
        Ok(route) => route,
        Err(e) => {
            log::warn!("route search failed: {}", e);
            vec![]
        }
    }
}

/// Returns the total great-circle length of a route, in miles.
/// Nodes missing from the graph contribute nothing.
pub fn path_length(g: &Graph, route: &[i64]) -> f64 {
    route
        .windows(2)
        .filter_map(|pair| g.distance(pair[0], pair[1]))
        .sum()
}
