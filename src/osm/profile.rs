// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes which OSM ways are roads usable for routing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the routing profile,
    /// customary the most specific [access tag](https://wiki.openstreetmap.org/wiki/Key:access).
    pub name: &'a str,

    /// Values of the [highway](https://wiki.openstreetmap.org/wiki/Key:highway) tag
    /// which mark a way as routable. Ways without a matching `highway` tag
    /// are loaded, but don't contribute any connections to the graph.
    pub highways: &'a [&'a str],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions.
    pub access: &'a [&'a str],

    /// Force no routing over [motorroad=yes](https://wiki.openstreetmap.org/wiki/Key:motorroad) ways.
    pub disallow_motorroad: bool,
}

impl<'a> Profile<'a> {
    /// Checks if a way with given tags has a routable `highway` value,
    /// and is not prohibited by the access tags (see [Profile::is_allowed]).
    pub fn is_routable(&self, tags: &HashMap<String, String>) -> bool {
        let highway = tags.get("highway").map(|v| v.as_str()).unwrap_or("");
        self.highways.iter().any(|&h| h == highway) && self.is_allowed(tags)
    }

    /// Checks if the way is allowed, by considering motor roads ([Profile::disallow_motorroad])
    /// and access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        // Check against the motorroad tag
        if self.disallow_motorroad && tags.get("motorroad").map(|v| v.as_str()) == Some("yes") {
            return false;
        }

        // Check against the access tags; the most specific one wins
        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }
}

/// Routing [Profile] for cars, accepting all kinds of public roads.
pub const CAR_PROFILE: Profile = Profile {
    name: "motorcar",
    highways: &[
        "motorway",
        "trunk",
        "primary",
        "secondary",
        "tertiary",
        "unclassified",
        "residential",
        "living_street",
        "motorway_link",
        "trunk_link",
        "primary_link",
        "secondary_link",
        "tertiary_link",
    ],
    access: &["access", "vehicle", "motor_vehicle", "motorcar"],
    disallow_motorroad: false,
};

/// Routing [Profile] for pedestrians.
pub const FOOT_PROFILE: Profile = Profile {
    name: "foot",
    highways: &[
        "trunk",
        "primary",
        "secondary",
        "tertiary",
        "unclassified",
        "residential",
        "living_street",
        "trunk_link",
        "primary_link",
        "secondary_link",
        "tertiary_link",
        "service",
        "pedestrian",
        "footway",
        "path",
        "steps",
        "track",
    ],
    access: &["access", "foot"],
    disallow_motorroad: true,
};

#[cfg(test)]
mod tests {
    use super::{Profile, CAR_PROFILE, FOOT_PROFILE};
    use std::collections::HashMap;

    const TEST_PROFILE: Profile = Profile {
        name: "cat",
        highways: &["footway", "path"],
        access: &["access", "cat"],
        disallow_motorroad: false,
    };

    const TEST_PROFILE_WITHOUT_MOTORROAD: Profile = Profile {
        name: "cat",
        highways: &["footway", "path"],
        access: &["access", "cat"],
        disallow_motorroad: true,
    };

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    #[test]
    fn is_routable() {
        assert!(TEST_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(TEST_PROFILE.is_routable(&tags! {"highway": "path"}));
        assert!(!TEST_PROFILE.is_routable(&tags! {"highway": "motorway"}));
        assert!(!TEST_PROFILE.is_routable(&tags! {"building": "yes"}));
        assert!(!TEST_PROFILE.is_routable(&tags! {}));
        assert!(!TEST_PROFILE.is_routable(&tags! {"highway": "path", "access": "no"}));
        assert!(TEST_PROFILE
            .is_routable(&tags! {"highway": "path", "access": "no", "cat": "destination"}));
        assert!(TEST_PROFILE.is_routable(&tags! {"highway": "path", "motorroad": "yes"}));
        assert!(!TEST_PROFILE_WITHOUT_MOTORROAD
            .is_routable(&tags! {"highway": "path", "motorroad": "yes"}));
    }

    #[test]
    fn is_allowed() {
        assert!(TEST_PROFILE.is_allowed(&tags! {"highway": "footway"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "no"}));
        assert!(!TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "private"}));
        assert!(TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "destination"}));
        assert!(
            TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "access": "no", "cat": "yes"})
        );
        assert!(!TEST_PROFILE.is_allowed(&tags! {"highway": "footway", "cat": "no"}));
    }

    #[test]
    fn builtin_profiles() {
        assert!(CAR_PROFILE.is_routable(&tags! {"highway": "residential"}));
        assert!(!CAR_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(!CAR_PROFILE.is_routable(&tags! {"highway": "residential", "motor_vehicle": "no"}));

        assert!(FOOT_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(!FOOT_PROFILE.is_routable(&tags! {"highway": "motorway"}));
        assert!(!FOOT_PROFILE.is_routable(&tags! {"highway": "primary", "motorroad": "yes"}));
    }
}
