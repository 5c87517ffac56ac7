// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{Graph, Node, Way};

use super::{model, Error, Options};

/// Helper object used for storing state related to converting [OSM features](super::model::Feature)
/// into a [Graph].
pub(super) struct GraphBuilder<'a> {
    g: Graph,
    options: &'a Options<'a>,
    ways: Vec<model::Way>,
    ignore_bbox: bool,
}

impl<'a> GraphBuilder<'a> {
    /// Create a new, empty graph builder.
    pub(super) fn new(options: &'a Options<'a>) -> Self {
        let ignore_bbox =
            options.bbox.iter().all(|&x| x == 0.0) || options.bbox.iter().any(|x| !x.is_finite());
        if !ignore_bbox {
            log::debug!("only loading nodes within {:?}", options.bbox);
        }

        Self {
            g: Graph::new(),
            options,
            ways: Vec::default(),
            ignore_bbox,
        }
    }

    /// Add all features from the provided reader, and build the routable [Graph].
    pub(super) fn add_features<I>(mut self, features: I) -> Result<Graph, Error>
    where
        I: Iterator<Item = Result<model::Feature, quick_xml::Error>>,
    {
        for f in features {
            match f? {
                model::Feature::Node(n) => self.add_node(n),
                model::Feature::Way(w) => self.ways.push(w),
            }
        }
        self.finish()
    }

    fn add_node(&mut self, n: model::Node) {
        if self.is_in_bbox(n.lat, n.lon) {
            self.g.add_node(Node {
                id: n.id,
                lon: n.lon,
                lat: n.lat,
                ways: Default::default(),
                tags: n.tags,
            });
        }
    }

    fn is_in_bbox(&self, lat: f64, lon: f64) -> bool {
        if self.ignore_bbox {
            return true;
        }
        let [min_lon, min_lat, max_lon, max_lat] = self.options.bbox;
        lat >= min_lat && lat <= max_lat && lon >= min_lon && lon <= max_lon
    }

    fn finish(mut self) -> Result<Graph, Error> {
        let mut incomplete_ways = 0;
        let mut cut_ways = 0;
        let mut routable_ways = 0;

        let ways = std::mem::take(&mut self.ways);
        let mut next_way_id = ways
            .iter()
            .map(|w| w.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);

        for w in ways {
            let original_len = w.nodes.len();
            let pieces = self.convert_way(w, &mut next_way_id);

            let known_nodes: usize = pieces.iter().map(|p| p.nodes.len()).sum();
            if known_nodes < original_len {
                cut_ways += 1;
            }

            if pieces[0].routable {
                routable_ways += 1;
                if pieces[0].nodes.len() < 2 {
                    incomplete_ways += 1;
                }
            }

            pieces.into_iter().for_each(|p| self.g.add_way(p));
        }

        if cut_ways > 0 {
            log::warn!(
                "{} ways reference unknown nodes; they were split at every missing node",
                cut_ways
            );
        }

        if incomplete_ways > 0 {
            log::warn!(
                "{} routable ways have less than 2 known nodes and contribute no connections",
                incomplete_ways
            );
        }

        self.g.build_adjacency()?;
        self.g.prune();

        log::info!(
            "loaded {} nodes and {} routable ways ({} connections) using the {} profile",
            self.g.len(),
            routable_ways,
            self.g.edge_count(),
            self.options.profile.name,
        );

        Ok(self.g)
    }

    /// Converts an OSM way into one or more graph [Ways](Way).
    ///
    /// References to unknown nodes (outside of the bounding box or missing from the file)
    /// split the way into runs of consecutive known nodes, so that no connections
    /// are made between nodes which were not adjacent in the source data.
    /// The first run keeps the way id, further runs with at least 2 nodes get fresh ids
    /// taken from `next_way_id`. The result is never empty.
    fn convert_way(&self, w: model::Way, next_way_id: &mut i64) -> Vec<Way> {
        let mut runs: Vec<Vec<i64>> = Vec::new();
        let mut run: Vec<i64> = Vec::new();
        for &node_id in &w.nodes {
            if self.g.get_node(node_id).is_some() {
                run.push(node_id);
            } else if !run.is_empty() {
                runs.push(std::mem::take(&mut run));
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }

        let fallback = runs.first().cloned().unwrap_or_default();
        let mut runs: Vec<Vec<i64>> = runs.into_iter().filter(|r| r.len() >= 2).collect();
        if runs.is_empty() {
            runs.push(fallback);
        }

        if runs.len() > 1 {
            log::debug!("way {} split into {} parts", w.id, runs.len());
        }

        let routable = self.options.profile.is_routable(&w.tags);
        let mut ways = Vec::with_capacity(runs.len());
        for (i, nodes) in runs.into_iter().enumerate() {
            let id = if i == 0 {
                w.id
            } else {
                let id = *next_way_id;
                *next_way_id = next_way_id.saturating_add(1);
                id
            };
            ways.push(Way {
                id,
                nodes,
                routable,
                tags: w.tags.clone(),
            });
        }
        ways
    }
}
