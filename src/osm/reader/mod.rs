// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io;
use std::path::Path;

use graph_builder::GraphBuilder;

use crate::osm::Profile;
use crate::{Graph, GraphError};

mod graph_builder;
mod model;
mod xml;

/// Format of the input OSM file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Uncompressed [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    Xml,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [gzip](https://en.wikipedia.org/wiki/Gzip) compression
    XmlGz,

    /// [OSM XML](https://wiki.openstreetmap.org/wiki/OSM_XML)
    /// with [bzip2](https://en.wikipedia.org/wiki/Bzip2) compression
    XmlBz2,
}

impl FileFormat {
    /// Guesses the file format based on the extension of the provided path:
    /// `.gz` is [FileFormat::XmlGz], `.bz2` is [FileFormat::XmlBz2], and
    /// anything else is [FileFormat::Xml].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("gz") => Self::XmlGz,
            Some("bz2") => Self::XmlBz2,
            _ => Self::Xml,
        }
    }
}

/// Additional controls for interpreting OSM data as a routing [Graph].
#[derive(Debug)]
pub struct Options<'a> {
    /// Decides which OSM ways are routable.
    pub profile: &'a Profile<'a>,

    /// Format of the input data.
    pub file_format: FileFormat,

    /// Filter nodes by a specific bounding box. In order: left (min lon), bottom (min lat),
    /// right (max lon), top (max lat). Ignored if all values are set to zero, or at least one
    /// of them is not finite.
    pub bbox: [f64; 4],
}

/// Errors which may occur while loading OSM data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("invalid OSM XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Parse OSM features from a reader into a [Graph] as per the provided [Options].
///
/// The provided stream will be automatically wrapped in a buffered reader when needed.
pub fn load_from_io<R: io::Read>(options: &Options<'_>, reader: R) -> Result<Graph, Error> {
    let builder = GraphBuilder::new(options);
    match options.file_format {
        FileFormat::Xml => {
            let b = io::BufReader::new(reader);
            builder.add_features(xml::Reader::from_io(b))
        }

        FileFormat::XmlGz => {
            let d = flate2::read::MultiGzDecoder::new(reader);
            let b = io::BufReader::new(d);
            builder.add_features(xml::Reader::from_io(b))
        }

        FileFormat::XmlBz2 => {
            let d = bzip2::read::MultiBzDecoder::new(reader);
            let b = io::BufReader::new(d);
            builder.add_features(xml::Reader::from_io(b))
        }
    }
}

/// Parse OSM features from a file at the provided path into a [Graph] as per the provided [Options].
pub fn load_from_file<P: AsRef<Path>>(options: &Options<'_>, path: P) -> Result<Graph, Error> {
    let f = File::open(path)?;
    load_from_io(options, f)
}

/// Parse OSM features from a static buffer into a [Graph] as per the provided [Options].
pub fn load_from_buffer(options: &Options<'_>, data: &[u8]) -> Result<Graph, Error> {
    if options.file_format == FileFormat::Xml {
        // Fast path is available for in-memory XML data
        GraphBuilder::new(options).add_features(xml::Reader::from_buffer(data))
    } else {
        // Wrap the buffer in a cursor and use the IO path
        load_from_io(options, io::Cursor::new(data))
    }
}
