// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use mapnav::osm;

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct GraphLoadError(PathBuf, #[source] osm::Error);

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileName {
    Car,
    Foot,
}

#[derive(Subcommand)]
enum Command {
    /// Find the shortest route between two points and print turn-by-turn directions
    Route {
        /// The path to the OSM XML file (optionally .gz or .bz2 compressed)
        osm_file: PathBuf,

        /// Longitude of the start point
        #[arg(allow_hyphen_values = true)]
        start_lon: f64,

        /// Latitude of the start point
        #[arg(allow_hyphen_values = true)]
        start_lat: f64,

        /// Longitude of the end point
        #[arg(allow_hyphen_values = true)]
        end_lon: f64,

        /// Latitude of the end point
        #[arg(allow_hyphen_values = true)]
        end_lat: f64,

        /// Which ways are considered routable
        #[arg(long, value_enum, default_value_t = ProfileName::Car)]
        profile: ProfileName,
    },

    /// Select map tiles covering a bounding box displayed in a viewport
    Raster {
        /// Upper-left longitude of the query box
        #[arg(allow_hyphen_values = true)]
        ullon: f64,

        /// Upper-left latitude of the query box
        #[arg(allow_hyphen_values = true)]
        ullat: f64,

        /// Lower-right longitude of the query box
        #[arg(allow_hyphen_values = true)]
        lrlon: f64,

        /// Lower-right latitude of the query box
        #[arg(allow_hyphen_values = true)]
        lrlat: f64,

        /// Width of the viewport, in pixels
        width: f64,

        /// Height of the viewport, in pixels
        height: f64,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            osm_file,
            start_lon,
            start_lat,
            end_lon,
            end_lat,
            profile,
        } => {
            let profile = match profile {
                ProfileName::Car => &osm::CAR_PROFILE,
                ProfileName::Foot => &osm::FOOT_PROFILE,
            };
            let g = load_graph(&osm_file, profile)?;

            let route = mapnav::shortest_path(&g, start_lon, start_lat, end_lon, end_lat);
            if route.is_empty() {
                println!("No route found.");
                return Ok(());
            }

            for maneuver in mapnav::route_directions(&g, &route) {
                println!("{}", maneuver);
            }
            println!("Total: {:.3} miles.", mapnav::path_length(&g, &route));
        }

        Command::Raster {
            ullon,
            ullat,
            lrlon,
            lrlat,
            width,
            height,
        } => {
            let query = mapnav::BoundingBox {
                ullon,
                ullat,
                lrlon,
                lrlat,
            };
            let viewport = mapnav::Viewport { width, height };

            match mapnav::DEFAULT_TILE_CONFIG.rasterize(&query, viewport)? {
                None => println!("Query box is outside of the tiled area."),
                Some(raster) => {
                    println!("depth: {}", raster.depth);
                    println!(
                        "bounds: {} {} {} {}",
                        raster.bounds.ullon,
                        raster.bounds.ullat,
                        raster.bounds.lrlon,
                        raster.bounds.lrlat
                    );
                    for row in &raster.grid {
                        let names: Vec<String> = row.iter().map(|t| t.image_name()).collect();
                        println!("{}", names.join(" "));
                    }
                }
            }
        }
    }

    Ok(())
}

fn load_graph<P: AsRef<Path>>(
    path: P,
    profile: &osm::Profile<'_>,
) -> Result<mapnav::Graph, GraphLoadError> {
    let options = osm::Options {
        profile,
        file_format: osm::FileFormat::from_path(&path),
        bbox: [0.0; 4],
    };
    osm::load_from_file(&options, path.as_ref())
        .map_err(|e| GraphLoadError(PathBuf::from(path.as_ref()), e))
}
