// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Loading of [OpenStreetMap](https://www.openstreetmap.org/) data into a [Graph](crate::Graph).

mod profile;
mod reader;

pub use profile::{Profile, CAR_PROFILE, FOOT_PROFILE};
pub use reader::{load_from_buffer, load_from_file, load_from_io, Error, FileFormat, Options};
