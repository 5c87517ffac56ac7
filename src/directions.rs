// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{normalize_bearing, Graph};

/// Road name used for [Maneuvers](Maneuver) over ways without a name.
pub const UNKNOWN_ROAD: &str = "unknown road";

/// Classification of a change of direction between two roads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Start,
    Straight,
    SlightLeft,
    SlightRight,
    Left,
    Right,
    SharpLeft,
    SharpRight,
}

impl Turn {
    /// All possible turns, in the order of their numeric codes.
    pub const ALL: [Turn; 8] = [
        Turn::Start,
        Turn::Straight,
        Turn::SlightLeft,
        Turn::SlightRight,
        Turn::Left,
        Turn::Right,
        Turn::SharpLeft,
        Turn::SharpRight,
    ];

    /// Classifies a relative bearing (difference between the outgoing and incoming bearing,
    /// in degrees, normalized to (-180°, 180°]). Positive values turn right.
    pub fn from_relative_bearing(r: f64) -> Self {
        if (-15.0..=15.0).contains(&r) {
            Turn::Straight
        } else if r > 15.0 && r <= 30.0 {
            Turn::SlightRight
        } else if r > 30.0 && r <= 100.0 {
            Turn::Right
        } else if r > 100.0 {
            Turn::SharpRight
        } else if r >= -30.0 {
            Turn::SlightLeft
        } else if r >= -100.0 {
            Turn::Left
        } else {
            Turn::SharpLeft
        }
    }

    /// Returns the human-readable instruction for this turn.
    pub fn as_str(self) -> &'static str {
        match self {
            Turn::Start => "Start",
            Turn::Straight => "Go straight",
            Turn::SlightLeft => "Slight left",
            Turn::SlightRight => "Slight right",
            Turn::Left => "Turn left",
            Turn::Right => "Turn right",
            Turn::SharpLeft => "Sharp left",
            Turn::SharpRight => "Sharp right",
        }
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Turn {
    type Err = ParseManeuverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Turn::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseManeuverError::UnknownTurn(s.to_string()))
    }
}

/// A single turn-by-turn instruction: follow `road` for `distance` miles
/// after making the `turn`.
#[derive(Debug, Clone, PartialEq)]
pub struct Maneuver {
    pub turn: Turn,
    pub road: String,
    pub distance: f64,
}

impl std::fmt::Display for Maneuver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} on {} and continue for {:.3} miles.",
            self.turn, self.road, self.distance
        )
    }
}

/// Errors returned when parsing the textual representation of a [Maneuver].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseManeuverError {
    #[error("not a maneuver: {0:?}")]
    InvalidFormat(String),

    #[error("unknown turn: {0:?}")]
    UnknownTurn(String),

    #[error("invalid distance: {0:?}")]
    InvalidDistance(String),
}

static MANEUVER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z ]+?) on (.*) and continue for ([0-9.]+) miles\.$")
        .expect("maneuver pattern must be a valid regex")
});

impl FromStr for Maneuver {
    type Err = ParseManeuverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = MANEUVER_PATTERN
            .captures(s.trim())
            .ok_or_else(|| ParseManeuverError::InvalidFormat(s.to_string()))?;

        let turn = caps[1].parse::<Turn>()?;
        let distance: f64 = caps[3]
            .parse()
            .map_err(|_| ParseManeuverError::InvalidDistance(caps[3].to_string()))?;

        Ok(Maneuver {
            turn,
            road: caps[2].to_string(),
            distance,
        })
    }
}

fn road_name(name: Option<&str>) -> String {
    name.unwrap_or(UNKNOWN_ROAD).to_string()
}

fn turn_at(g: &Graph, prev: i64, curr: i64, next: i64) -> Turn {
    let incoming = g.bearing(prev, curr).unwrap_or(0.0);
    let outgoing = g.bearing(curr, next).unwrap_or(0.0);
    Turn::from_relative_bearing(normalize_bearing(outgoing - incoming))
}

/// Converts a route (as returned by [find_route](crate::find_route)) into a list of
/// [Maneuvers](Maneuver), one per stretch of the route along a single road.
///
/// The first maneuver is always a [Turn::Start]. Every subsequent maneuver begins where
/// the road name changes, classified by the angle between the incoming and outgoing
/// connection. Routes with fewer than two nodes produce no maneuvers.
pub fn route_directions(g: &Graph, route: &[i64]) -> Vec<Maneuver> {
    let mut result = Vec::new();
    if route.len() < 2 {
        return result;
    }

    let mut current_road = g.find_way_name(route[0], route[1]);
    let mut current = Maneuver {
        turn: Turn::Start,
        road: road_name(current_road),
        distance: 0.0,
    };

    for i in 0..route.len() - 1 {
        let (from, to) = (route[i], route[i + 1]);
        let road = g.find_way_name(from, to);
        let length = g.distance(from, to).unwrap_or(0.0);

        if road == current_road {
            current.distance += length;
        } else {
            // i >= 1, as the first connection always matches current_road
            let next = Maneuver {
                turn: turn_at(g, route[i - 1], from, to),
                road: road_name(road),
                distance: length,
            };
            result.push(std::mem::replace(&mut current, next));
            current_road = road;
        }
    }

    result.push(current);
    result
}
