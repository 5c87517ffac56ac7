// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Axis-aligned geographic rectangle, described by its upper-left
/// and lower-right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub ullon: f64,
    pub ullat: f64,
    pub lrlon: f64,
    pub lrlat: f64,
}

impl BoundingBox {
    pub fn lon_span(&self) -> f64 {
        self.lrlon - self.ullon
    }

    pub fn lat_span(&self) -> f64 {
        self.ullat - self.lrlat
    }

    /// Returns `true` unless the upper-left corner lies strictly above and to the left
    /// of the lower-right corner.
    pub fn is_inverted(&self) -> bool {
        !(self.ullon < self.lrlon && self.ullat > self.lrlat)
    }

    /// Returns `true` if both boxes share a region of non-zero area.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.ullon < other.lrlon
            && self.lrlon > other.ullon
            && self.ullat > other.lrlat
            && self.lrlat < other.ullat
    }
}

/// Size of the area (in pixels) in which a [Raster] is going to be displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A single map image at a specific zoom depth.
///
/// Depth 0 consists of a single tile covering the whole [TileConfig::root];
/// every next depth splits each tile into 4 quadrants. `x` grows to the east,
/// and `y` grows to the south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub depth: u8,
    pub x: u32,
    pub y: u32,
    pub bounds: BoundingBox,
}

impl Tile {
    /// Returns the conventional file name of the image of this tile,
    /// e.g. `d2_x1_y3.png`.
    pub fn image_name(&self) -> String {
        format!("d{}_x{}_y{}.png", self.depth, self.x, self.y)
    }
}

/// Grid of [Tiles](Tile) to be assembled into a single image.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub depth: u8,

    /// Tiles in row-major order: `grid[row][column]`, with rows going north-to-south
    /// and columns going west-to-east.
    pub grid: Vec<Vec<Tile>>,

    /// Geographic extent of the assembled image. Usually slightly larger than
    /// the requested area, as it's aligned to whole tiles.
    pub bounds: BoundingBox,
}

impl Raster {
    /// Returns an iterator over all tiles of the raster, in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.grid.iter().flatten()
    }
}

/// Errors returned by [TileConfig::rasterize] for malformed queries.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RasterError {
    /// The upper-left corner of the query isn't above and to the left of the lower-right one.
    #[error("inverted query box: {0:?}")]
    InvertedBox(BoundingBox),

    /// The viewport dimensions are not positive, finite numbers.
    #[error("invalid viewport: {0:?}")]
    InvalidViewport(Viewport),
}

/// Describes the pyramid of map tiles available for rasterization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileConfig {
    /// Area covered by the single depth-0 tile.
    pub root: BoundingBox,

    /// Width and height of every tile image, in pixels.
    pub tile_size: u32,

    /// Deepest available zoom depth. Values above [MAX_TILE_DEPTH] are treated as [MAX_TILE_DEPTH].
    pub max_depth: u8,
}

/// Deepest depth whose tile indices still fit in a `u32`.
pub const MAX_TILE_DEPTH: u8 = 31;

/// Tile pyramid of the Berkeley area, 256-pixel tiles at depths 0 to 7.
pub const DEFAULT_TILE_CONFIG: TileConfig = TileConfig {
    root: BoundingBox {
        ullon: -122.2998046875,
        ullat: 37.892195547244356,
        lrlon: -122.2119140625,
        lrlat: 37.82280243352756,
    },
    tile_size: 256,
    max_depth: 7,
};

impl Default for TileConfig {
    fn default() -> Self {
        DEFAULT_TILE_CONFIG
    }
}

impl TileConfig {
    /// Number of tiles along each axis at the given depth.
    pub fn tiles_per_side(&self, depth: u8) -> u32 {
        1 << depth.min(MAX_TILE_DEPTH)
    }

    fn lon_per_tile(&self, depth: u8) -> f64 {
        self.root.lon_span() / self.tiles_per_side(depth) as f64
    }

    fn lat_per_tile(&self, depth: u8) -> f64 {
        self.root.lat_span() / self.tiles_per_side(depth) as f64
    }

    /// Longitudinal distance per pixel of tiles at the given depth.
    pub fn lon_dpp(&self, depth: u8) -> f64 {
        self.root.lon_span() / (self.tile_size as f64 * self.tiles_per_side(depth) as f64)
    }

    /// Picks the shallowest depth whose resolution is at least as fine as `target_lon_dpp`,
    /// falling back to [TileConfig::max_depth] if no depth is fine enough.
    ///
    /// Shallower depths mean fewer, larger tiles, so no more resolution than
    /// requested is ever used.
    pub fn select_depth(&self, target_lon_dpp: f64) -> u8 {
        let max_depth = self.max_depth.min(MAX_TILE_DEPTH);
        (0..=max_depth)
            .find(|&depth| self.lon_dpp(depth) <= target_lon_dpp)
            .unwrap_or(max_depth)
    }

    /// Returns the [Tile] at the given position. No bounds checking is performed.
    pub fn tile(&self, depth: u8, x: u32, y: u32) -> Tile {
        let lon_per_tile = self.lon_per_tile(depth);
        let lat_per_tile = self.lat_per_tile(depth);
        Tile {
            depth,
            x,
            y,
            bounds: BoundingBox {
                ullon: self.root.ullon + x as f64 * lon_per_tile,
                ullat: self.root.ullat - y as f64 * lat_per_tile,
                lrlon: self.root.ullon + (x + 1) as f64 * lon_per_tile,
                lrlat: self.root.ullat - (y + 1) as f64 * lat_per_tile,
            },
        }
    }

    /// Selects the grid of tiles covering the `query` box, at the depth most appropriate
    /// for displaying the box in the provided viewport.
    ///
    /// Returns `Ok(None)` if the query box lies completely outside of [TileConfig::root].
    pub fn rasterize(
        &self,
        query: &BoundingBox,
        viewport: Viewport,
    ) -> Result<Option<Raster>, RasterError> {
        if query.is_inverted() {
            return Err(RasterError::InvertedBox(*query));
        }

        if !(viewport.width.is_finite() && viewport.width > 0.0)
            || !(viewport.height.is_finite() && viewport.height > 0.0)
        {
            return Err(RasterError::InvalidViewport(viewport));
        }

        if !query.intersects(&self.root) {
            log::debug!("query {:?} is outside of the tiled area", query);
            return Ok(None);
        }

        let depth = self.select_depth(query.lon_span() / viewport.width);
        let last = self.tiles_per_side(depth) - 1;
        let lon_per_tile = self.lon_per_tile(depth);
        let lat_per_tile = self.lat_per_tile(depth);

        let x_start = tile_index(query.ullon - self.root.ullon, lon_per_tile, last);
        let x_end = tile_index(query.lrlon - self.root.ullon, lon_per_tile, last);
        let y_start = tile_index(self.root.ullat - query.ullat, lat_per_tile, last);
        let y_end = tile_index(self.root.ullat - query.lrlat, lat_per_tile, last);

        let grid: Vec<Vec<Tile>> = (y_start..=y_end)
            .map(|y| {
                (x_start..=x_end)
                    .map(|x| self.tile(depth, x, y))
                    .collect()
            })
            .collect();

        let upper_left = self.tile(depth, x_start, y_start).bounds;
        let lower_right = self.tile(depth, x_end, y_end).bounds;

        log::debug!(
            "rasterized {:?} at depth {} into {}x{} tiles",
            query,
            depth,
            x_end - x_start + 1,
            y_end - y_start + 1,
        );

        Ok(Some(Raster {
            depth,
            grid,
            bounds: BoundingBox {
                ullon: upper_left.ullon,
                ullat: upper_left.ullat,
                lrlon: lower_right.lrlon,
                lrlat: lower_right.lrlat,
            },
        }))
    }
}

/// Converts an offset from the root's upper-left corner into a tile index,
/// clamped to [0, last].
fn tile_index(offset: f64, per_tile: f64, last: u32) -> u32 {
    (offset / per_tile).floor().clamp(0.0, last as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-9),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    macro_rules! assert_bbox_almost_eq {
        ($a:expr, $b:expr) => {
            assert_almost_eq!($a.ullon, $b.ullon);
            assert_almost_eq!($a.ullat, $b.ullat);
            assert_almost_eq!($a.lrlon, $b.lrlon);
            assert_almost_eq!($a.lrlat, $b.lrlat);
        };
    }

    const CONFIG: TileConfig = DEFAULT_TILE_CONFIG;

    fn bbox(ullon: f64, ullat: f64, lrlon: f64, lrlat: f64) -> BoundingBox {
        BoundingBox {
            ullon,
            ullat,
            lrlon,
            lrlat,
        }
    }

    fn viewport(width: f64, height: f64) -> Viewport {
        Viewport { width, height }
    }

    #[test]
    fn select_depth() {
        assert_eq!(CONFIG.select_depth(1.0), 0);
        assert_eq!(CONFIG.select_depth(CONFIG.lon_dpp(0)), 0);
        assert_eq!(CONFIG.select_depth(CONFIG.lon_dpp(3)), 3);
        assert_eq!(CONFIG.select_depth(CONFIG.lon_dpp(3) * 0.99), 4);
        assert_eq!(CONFIG.select_depth(CONFIG.lon_dpp(7)), 7);
        assert_eq!(CONFIG.select_depth(CONFIG.lon_dpp(7) / 2.0), 7);
        assert_eq!(CONFIG.select_depth(0.0), 7);
    }

    #[test]
    fn select_depth_caps_max_depth() {
        let config = TileConfig {
            max_depth: 40,
            ..DEFAULT_TILE_CONFIG
        };
        assert_eq!(config.select_depth(0.0), MAX_TILE_DEPTH);
        assert_eq!(config.tiles_per_side(40), 1 << 31);
        assert!(config.lon_dpp(MAX_TILE_DEPTH) > 0.0);
    }

    #[test]
    fn lon_dpp_halves_with_each_depth() {
        for depth in 1..=CONFIG.max_depth {
            assert_almost_eq!(CONFIG.lon_dpp(depth) * 2.0, CONFIG.lon_dpp(depth - 1));
        }
    }

    #[test]
    fn rasterize_root() {
        let raster = CONFIG
            .rasterize(&CONFIG.root, viewport(256.0, 256.0))
            .unwrap()
            .unwrap();

        assert_eq!(raster.depth, 0);
        assert_eq!(raster.grid.len(), 1);
        assert_eq!(raster.grid[0].len(), 1);
        assert_eq!(raster.grid[0][0].image_name(), "d0_x0_y0.png");
        assert_bbox_almost_eq!(raster.bounds, CONFIG.root);
    }

    #[test]
    fn rasterize_small_area() {
        let raster = CONFIG
            .rasterize(
                &bbox(-122.241632, 37.87655, -122.24053, 37.87548),
                viewport(892.0, 875.0),
            )
            .unwrap()
            .unwrap();

        assert_eq!(raster.depth, 7);
        assert_eq!(raster.grid.len(), 3);
        assert!(raster.grid.iter().all(|row| row.len() == 3));
        assert_eq!(raster.grid[0][0].image_name(), "d7_x84_y28.png");
        assert_eq!(raster.grid[0][2].image_name(), "d7_x86_y28.png");
        assert_eq!(raster.grid[2][0].image_name(), "d7_x84_y30.png");
        assert_eq!(raster.grid[2][2].image_name(), "d7_x86_y30.png");
        assert_bbox_almost_eq!(
            raster.bounds,
            bbox(
                -122.24212646484375,
                37.87701580361881,
                -122.24006652832031,
                37.87538940251607,
            )
        );
    }

    #[test]
    fn rasterize_clamps_to_root() {
        let raster = CONFIG
            .rasterize(&bbox(-122.35, 37.95, -122.28, 37.85), viewport(700.0, 1000.0))
            .unwrap()
            .unwrap();

        assert_eq!(raster.depth, 2);
        assert_eq!(raster.grid.len(), 3);
        assert_eq!(raster.grid[0].len(), 1);
        assert_eq!(raster.grid[0][0].image_name(), "d2_x0_y0.png");
        assert_eq!(raster.grid[2][0].image_name(), "d2_x0_y2.png");
        assert_almost_eq!(raster.bounds.ullon, CONFIG.root.ullon);
        assert_almost_eq!(raster.bounds.ullat, CONFIG.root.ullat);
        assert_almost_eq!(raster.bounds.lrlon, -122.27783203125);
        assert_almost_eq!(raster.bounds.lrlat, 37.84015071195676);
    }

    #[test]
    fn rasterize_grid_is_contiguous() {
        let raster = CONFIG
            .rasterize(
                &bbox(-122.30410170759153, 37.870213571328854, -122.2104604264636, 37.8318576119893),
                viewport(1091.0, 566.0),
            )
            .unwrap()
            .unwrap();

        assert_eq!(raster.depth, 2);
        assert_eq!(raster.tiles().count(), 12);
        for (row_idx, row) in raster.grid.iter().enumerate() {
            for (col_idx, tile) in row.iter().enumerate() {
                assert_eq!(tile.x, col_idx as u32);
                assert_eq!(tile.y, row_idx as u32 + 1);
                if col_idx > 0 {
                    assert_eq!(tile.bounds.ullon, row[col_idx - 1].bounds.lrlon);
                }
            }
        }
    }

    #[test]
    fn rasterize_outside_of_root() {
        let query = bbox(-123.0, 38.5, -122.9, 38.4);
        assert_eq!(CONFIG.rasterize(&query, viewport(256.0, 256.0)), Ok(None));

        // Touching the edge doesn't count as an intersection
        let query = bbox(-122.4, 37.9, CONFIG.root.ullon, 37.85);
        assert_eq!(CONFIG.rasterize(&query, viewport(256.0, 256.0)), Ok(None));
    }

    #[test]
    fn rasterize_rejects_inverted_boxes() {
        let query = bbox(-122.22, 37.85, -122.25, 37.87);
        assert_eq!(
            CONFIG.rasterize(&query, viewport(256.0, 256.0)),
            Err(RasterError::InvertedBox(query)),
        );

        let flat = bbox(-122.25, 37.85, -122.22, 37.85);
        assert!(matches!(
            CONFIG.rasterize(&flat, viewport(256.0, 256.0)),
            Err(RasterError::InvertedBox(_))
        ));
    }

    #[test]
    fn rasterize_rejects_invalid_viewports() {
        for vp in [
            viewport(0.0, 256.0),
            viewport(256.0, -1.0),
            viewport(f64::NAN, 256.0),
        ] {
            assert!(matches!(
                CONFIG.rasterize(&CONFIG.root, vp),
                Err(RasterError::InvalidViewport(_))
            ));
        }
    }
}
