// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::BTreeSet;

use crate::{earth_distance, initial_bearing, Node, Way};

/// Errors detected while building a [Graph].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A [Way] references a [Node] which was never added to the graph.
    #[error("way {way} references unknown node {node}")]
    UnknownNode { way: i64, node: i64 },
}

/// Represents a road network as a set of [Nodes](Node), [Ways](Way) and
/// undirected connections between nodes.
///
/// A graph is built in two disjoint phases. First, nodes and ways are added with
/// [Graph::add_node] and [Graph::add_way], then [Graph::build_adjacency] and [Graph::prune]
/// are called (or everything is done at once with [Graph::build]). After that, the graph
/// is only queried through shared references.
///
/// Once pruned, every node in the graph has at least one neighbor, and every neighbor
/// of a node exists in the graph.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    nodes: BTreeMap<i64, Node>,
    ways: BTreeMap<i64, Way>,
    adjacency: BTreeMap<i64, BTreeSet<i64>>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a routable graph from the provided nodes and ways:
    /// adds all of them, builds the adjacency relation, and removes disconnected nodes.
    ///
    /// Fails if any way references a node not present in `nodes`.
    pub fn build<N, W>(nodes: N, ways: W) -> Result<Self, GraphError>
    where
        N: IntoIterator<Item = Node>,
        W: IntoIterator<Item = Way>,
    {
        let mut g = Self::new();
        nodes.into_iter().for_each(|n| g.add_node(n));
        ways.into_iter().for_each(|w| g.add_way(w));
        g.build_adjacency()?;
        g.prune();
        log::debug!(
            "built graph with {} nodes, {} ways and {} edges",
            g.len(),
            g.ways.len(),
            g.edge_count()
        );
        Ok(g)
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of undirected connections in the graph.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Returns an iterator over all [Nodes](Node) in the graph, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Retrieves a [Node] with the provided id.
    pub fn get_node(&self, id: i64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Retrieves a [Way] with the provided id.
    pub fn get_way(&self, id: i64) -> Option<&Way> {
        self.ways.get(&id)
    }

    /// Returns ids of all nodes directly connected to the node with a given id,
    /// in ascending order.
    pub fn neighbors(&self, id: i64) -> impl Iterator<Item = i64> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }

    /// Inserts a [Node] into the graph, replacing any node with the same id.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id, node);
    }

    /// Inserts a [Way] into the graph, replacing any way with the same id.
    ///
    /// The way doesn't contribute any connections until [Graph::build_adjacency] is called.
    pub fn add_way(&mut self, way: Way) {
        self.ways.insert(way.id, way);
    }

    /// Connects every pair of consecutive nodes of every routable [Way] with
    /// an undirected edge, and records the way in the owning-ways set of its nodes.
    ///
    /// Ways with fewer than two nodes contribute no edges. Fails, without modifying
    /// the graph, if any way references an unknown node.
    pub fn build_adjacency(&mut self) -> Result<(), GraphError> {
        for way in self.ways.values() {
            if let Some(&node) = way.nodes.iter().find(|&id| !self.nodes.contains_key(id)) {
                return Err(GraphError::UnknownNode { way: way.id, node });
            }
        }

        for way in self.ways.values().filter(|w| w.routable) {
            for node_id in &way.nodes {
                if let Some(node) = self.nodes.get_mut(node_id) {
                    node.ways.insert(way.id);
                }
            }

            for pair in way.nodes.windows(2) {
                if pair[0] != pair[1] {
                    add_edge(&mut self.adjacency, pair[0], pair[1]);
                }
            }
        }

        Ok(())
    }

    /// Removes all nodes without any connections, together with any
    /// dangling or empty adjacency entries.
    ///
    /// Must be called after all ways are added and [Graph::build_adjacency] has run.
    /// Calling it repeatedly has no further effect.
    pub fn prune(&mut self) {
        let connected: BTreeSet<i64> = self
            .adjacency
            .iter()
            .filter(|(id, neighbors)| !neighbors.is_empty() && self.nodes.contains_key(*id))
            .flat_map(|(&id, neighbors)| std::iter::once(id).chain(neighbors.iter().copied()))
            .filter(|id| self.nodes.contains_key(id))
            .collect();

        let before = self.nodes.len();
        self.nodes.retain(|id, _| connected.contains(id));
        self.adjacency.retain(|id, neighbors| {
            neighbors.retain(|n| connected.contains(n));
            connected.contains(id) && !neighbors.is_empty()
        });

        // Dropping dangling neighbors may have isolated further nodes
        if self.adjacency.len() != self.nodes.len() {
            let adjacency = &self.adjacency;
            self.nodes.retain(|id, _| adjacency.contains_key(id));
        }

        log::debug!("pruned {} disconnected nodes", before - self.nodes.len());
    }

    /// Finds the closest [Node] to the given position.
    ///
    /// If multiple nodes are equally close, the one with the smallest id is returned.
    /// Returns `None` if the graph is empty or no distance to the position can be computed
    /// (e.g. for NaN coordinates).
    ///
    /// This function requires computing the distance to every [Node] in the graph.
    pub fn find_nearest_node(&self, lon: f64, lat: f64) -> Option<&Node> {
        let mut best: Option<(&Node, f64)> = None;
        for nd in self.nodes.values() {
            let dist = earth_distance(lon, lat, nd.lon, nd.lat);
            if !dist.is_finite() {
                continue;
            }
            match best {
                Some((_, best_dist)) if best_dist <= dist => {}
                _ => best = Some((nd, dist)),
            }
        }
        best.map(|(nd, _)| nd)
    }

    /// Returns the great-circle distance between two nodes, in miles.
    pub fn distance(&self, from_id: i64, to_id: i64) -> Option<f64> {
        let a = self.nodes.get(&from_id)?;
        let b = self.nodes.get(&to_id)?;
        Some(earth_distance(a.lon, a.lat, b.lon, b.lat))
    }

    /// Returns the initial bearing from one node to another, in degrees.
    /// See [initial_bearing](crate::initial_bearing).
    pub fn bearing(&self, from_id: i64, to_id: i64) -> Option<f64> {
        let a = self.nodes.get(&from_id)?;
        let b = self.nodes.get(&to_id)?;
        Some(initial_bearing(a.lon, a.lat, b.lon, b.lat))
    }

    /// Returns the name of the road directly connecting two nodes.
    ///
    /// If multiple ways connect the nodes, the one with the smallest id is used.
    /// Returns `None` if no way connects the nodes, or that way has no name.
    pub fn find_way_name(&self, a: i64, b: i64) -> Option<&str> {
        self.nodes
            .get(&a)?
            .ways
            .iter()
            .filter_map(|way_id| self.ways.get(way_id))
            .find(|way| way.connects(a, b))
            .and_then(|way| way.name())
    }
}

fn add_edge(adjacency: &mut BTreeMap<i64, BTreeSet<i64>>, a: i64, b: i64) {
    for (from, to) in [(a, b), (b, a)] {
        match adjacency.entry(from) {
            Entry::Vacant(e) => {
                e.insert(BTreeSet::from([to]));
            }
            Entry::Occupied(mut e) => {
                e.get_mut().insert(to);
            }
        }
    }
}
