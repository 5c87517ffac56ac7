// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::io;

use quick_xml::events::{BytesStart, Event};

use super::model;

/// Parser is a trait for objects which can parse XML.
///
/// This trait only exists to fix the mismatch of
/// [quick_xml::Reader::read_event] when working on buffered data
/// and [quick_xml::Reader::read_event_into] when working on IO.
pub(super) trait Parser {
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>>;
}

/// IoParser implements [Parser] over an [std::io::BufRead].
pub(super) struct IoParser<R: io::BufRead>(quick_xml::Reader<R>, Vec<u8>);

impl<R: io::BufRead> IoParser<R> {
    #[inline]
    fn new(reader: R) -> Self {
        Self(quick_xml::Reader::from_reader(reader), Vec::default())
    }
}

impl<R: io::BufRead> Parser for IoParser<R> {
    #[inline]
    fn read_event<'a>(&'a mut self) -> quick_xml::Result<Event<'a>> {
        self.1.clear();
        self.0.read_event_into(&mut self.1)
    }
}

/// BufParser implements [Parser] over a slice of bytes (`&[u8]`).
pub(super) struct BufParser<'a>(quick_xml::Reader<&'a [u8]>);

impl<'a> BufParser<'a> {
    #[inline]
    fn new(data: &'a [u8]) -> Self {
        Self(quick_xml::Reader::from_reader(data))
    }
}

impl<'a> Parser for BufParser<'a> {
    #[inline]
    fn read_event<'b>(&'b mut self) -> quick_xml::Result<Event<'b>> {
        self.0.read_event()
    }
}

/// Reader reads osm [Features](model::Feature) from an XML file.
pub(super) struct Reader<P: Parser> {
    parser: P,
    eof: bool,
}

impl<P: Parser> Reader<P> {
    #[inline]
    fn new(parser: P) -> Self {
        Self { parser, eof: false }
    }
}

impl<P: Parser> Iterator for Reader<P> {
    type Item = Result<model::Feature, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut f: Option<model::Feature> = None;

        while !self.eof {
            let event = match self.parser.read_event() {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"node" => {
                        if let Some(n) = parse_node(&start) {
                            return Some(Ok(model::Feature::Node(n)));
                        }
                    }
                    // "way" can't be self-closing
                    b"tag" => {
                        if let Some(tags) = feature_tags(&mut f) {
                            if let Some((k, v)) = parse_tag(&start) {
                                tags.insert(k, v);
                            }
                        }
                    }
                    b"nd" => {
                        if let Some(nodes) = feature_nodes(&mut f) {
                            if let Some(ref_) = parse_nd(&start) {
                                nodes.push(ref_);
                            }
                        }
                    }
                    _ => {}
                },

                Event::Start(start) => match start.local_name().as_ref() {
                    b"node" => f = parse_node(&start).map(model::Feature::Node),
                    b"way" => f = parse_way(&start).map(model::Feature::Way),
                    // Tags of relations (and of any other elements) must not
                    // be attached to the previous feature
                    _ => f = None,
                },

                Event::End(end) => match end.local_name().as_ref() {
                    b"node" | b"way" => {
                        if let Some(f) = f.take() {
                            return Some(Ok(f));
                        }
                    }
                    _ => {}
                },

                Event::Eof => {
                    self.eof = true;
                }

                _ => {}
            }
        }

        f.map(Ok)
    }
}

impl<'a> Reader<BufParser<'a>> {
    #[inline]
    pub(super) fn from_buffer(data: &'a [u8]) -> Self {
        Self::new(BufParser::new(data))
    }
}

impl<R: io::BufRead> Reader<IoParser<R>> {
    #[inline]
    pub(super) fn from_io(reader: R) -> Self {
        Self::new(IoParser::new(reader))
    }
}

/// Returns the value of the attribute with the given key, parsed with [str::parse].
fn parse_attribute<T: std::str::FromStr>(start: &BytesStart<'_>, key: &[u8]) -> Option<T> {
    start
        .attributes()
        .filter_map(|attr| attr.ok())
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok()?.parse().ok())
}

fn parse_node(start: &BytesStart<'_>) -> Option<model::Node> {
    let id: i64 = parse_attribute(start, b"id").unwrap_or(0);
    let lat: f64 = parse_attribute(start, b"lat").unwrap_or(f64::NAN);
    let lon: f64 = parse_attribute(start, b"lon").unwrap_or(f64::NAN);

    if id != 0 && lat.is_finite() && lon.is_finite() {
        Some(model::Node {
            id,
            lat,
            lon,
            tags: HashMap::default(),
        })
    } else {
        log::warn!("skipping invalid node (id={}, lat={}, lon={})", id, lat, lon);
        None
    }
}

fn parse_way(start: &BytesStart<'_>) -> Option<model::Way> {
    match parse_attribute::<i64>(start, b"id") {
        Some(id) if id != 0 => Some(model::Way {
            id,
            nodes: Vec::default(),
            tags: HashMap::default(),
        }),
        _ => {
            log::warn!("skipping way without a valid id");
            None
        }
    }
}

fn parse_tag(start: &BytesStart<'_>) -> Option<(String, String)> {
    let k: String = parse_attribute(start, b"k")?;
    let v: String = parse_attribute(start, b"v").unwrap_or_default();
    Some((k, v))
}

fn parse_nd(start: &BytesStart<'_>) -> Option<i64> {
    parse_attribute(start, b"ref").filter(|&ref_: &i64| ref_ != 0)
}

fn feature_tags(f: &mut Option<model::Feature>) -> Option<&mut HashMap<String, String>> {
    match f {
        Some(model::Feature::Node(ref mut n)) => Some(&mut n.tags),
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.tags),
        None => None,
    }
}

fn feature_nodes(f: &mut Option<model::Feature>) -> Option<&mut Vec<i64>> {
    match f {
        Some(model::Feature::Way(ref mut w)) => Some(&mut w.nodes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::model::{Feature, Node, Way};
    use super::*;

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    const SIMPLE_XML: &[u8] = include_bytes!("test_fixtures/simple.osm");

    fn node(id: i64, lat: f64, lon: f64) -> Node {
        Node {
            id,
            lat,
            lon,
            tags: HashMap::default(),
        }
    }

    fn get_expected_nodes() -> Vec<Node> {
        vec![
            node(1, 37.8700, -122.2600),
            Node {
                tags: tags! {"highway": "traffic_signals"},
                ..node(2, 37.8700, -122.2590)
            },
            node(3, 37.8700, -122.2580),
            node(4, 37.8710, -122.2590),
            Node {
                tags: tags! {"name": "Sather Tower", "tourism": "attraction"},
                ..node(5, 37.8720, -122.2590)
            },
            node(6, 37.8690, -122.2580),
            node(7, 37.8710, -122.2600),
            node(8, 37.8711, -122.2601),
            node(9, 37.8712, -122.2600),
        ]
    }

    fn get_expected_ways() -> Vec<Way> {
        vec![
            Way {
                id: 100,
                nodes: vec![1, 2, 3],
                tags: tags! {"highway": "residential", "name": "Bancroft Way"},
            },
            Way {
                id: 101,
                nodes: vec![2, 4],
                tags: tags! {"highway": "secondary", "name": "Telegraph Avenue"},
            },
            Way {
                id: 102,
                nodes: vec![3, 6],
                tags: tags! {"highway": "footway", "name": "Campus Path"},
            },
            Way {
                id: 103,
                nodes: vec![7, 8, 9, 7],
                tags: tags! {"building": "yes"},
            },
            Way {
                id: 104,
                nodes: vec![4, 99],
                tags: tags! {"highway": "residential", "name": "Broken Street"},
            },
        ]
    }

    fn check_against_expected<I>(features: I) -> Result<(), quick_xml::Error>
    where
        I: Iterator<Item = Result<Feature, quick_xml::Error>>,
    {
        let mut nodes = vec![];
        let mut ways = vec![];

        for f in features {
            match f? {
                Feature::Node(n) => nodes.push(n),
                Feature::Way(w) => ways.push(w),
            }
        }

        assert_eq!(nodes, get_expected_nodes());
        assert_eq!(ways, get_expected_ways());
        Ok(())
    }

    #[test]
    fn parse_from_buf() -> Result<(), quick_xml::Error> {
        check_against_expected(Reader::from_buffer(SIMPLE_XML))
    }

    #[test]
    fn parse_from_io() -> Result<(), quick_xml::Error> {
        check_against_expected(Reader::from_io(io::Cursor::new(SIMPLE_XML)))
    }

    #[test]
    fn parse_malformed() {
        let data = b"<osm><way id=\"1\"><nd ref=\"1\"/></osm>";
        assert!(Reader::from_buffer(data).any(|f| f.is_err()));
    }
}
