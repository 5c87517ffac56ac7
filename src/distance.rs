// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Radius of Earth, in miles, as used by all distance computations in this crate.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Calculates the great-circle distance between two lon-lat positions
/// on Earth using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in miles.
pub fn earth_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let sin_dphi_half = ((lat2 - lat1).to_radians() * 0.5).sin();
    let sin_dlambda_half = ((lon2 - lon1).to_radians() * 0.5).sin();

    let a = sin_dphi_half * sin_dphi_half
        + phi1.cos() * phi2.cos() * sin_dlambda_half * sin_dlambda_half;

    // Rounding may push `a` slightly outside of [0, 1] for (nearly) antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Calculates the [initial bearing](https://www.movable-type.co.uk/scripts/latlong.html)
/// when travelling from the first to the second lon-lat position along a great-circle arc.
///
/// The result is in degrees, in the range returned by [f64::atan2] (-180° to 180°),
/// with 0° pointing north and positive values turning clockwise (towards east).
/// The bearing between two identical points is undefined; 0 is returned in that case.
pub fn initial_bearing(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();

    if x == 0.0 && y == 0.0 {
        return 0.0;
    }

    y.atan2(x).to_degrees()
}

/// Maps an angle (in degrees) into the half-open range (-180°, 180°].
pub fn normalize_bearing(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    if r > 180.0 {
        r - 360.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr) => {
            assert!(
                (($a - $b).abs() < 1e-6),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn distance_zero() {
        assert_eq!(earth_distance(-122.25, 37.87, -122.25, 37.87), 0.0);
    }

    #[test]
    fn distance_one_degree_of_latitude() {
        // One degree along a meridian is R * π / 180
        let expected = EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0;
        assert_almost_eq!(earth_distance(0.0, 0.0, 0.0, 1.0), expected);
        assert_almost_eq!(earth_distance(0.0, 1.0, 0.0, 0.0), expected);
    }

    #[test]
    fn distance_antipodal() {
        let d = earth_distance(0.0, 0.0, 180.0, 0.0);
        assert!(d.is_finite());
        assert_almost_eq!(d, EARTH_RADIUS_MILES * std::f64::consts::PI);
    }

    #[test]
    fn bearing_cardinal_directions() {
        assert_almost_eq!(initial_bearing(0.0, 0.0, 0.0, 1.0), 0.0);
        assert_almost_eq!(initial_bearing(0.0, 0.0, 1.0, 0.0), 90.0);
        assert_almost_eq!(initial_bearing(0.0, 0.0, -1.0, 0.0), -90.0);
        assert_almost_eq!(initial_bearing(0.0, 1.0, 0.0, 0.0), 180.0);
    }

    #[test]
    fn bearing_of_identical_points() {
        assert_eq!(initial_bearing(12.5, 45.0, 12.5, 45.0), 0.0);
    }

    #[test]
    fn normalize() {
        assert_almost_eq!(normalize_bearing(0.0), 0.0);
        assert_almost_eq!(normalize_bearing(180.0), 180.0);
        assert_almost_eq!(normalize_bearing(-180.0), 180.0);
        assert_almost_eq!(normalize_bearing(270.0), -90.0);
        assert_almost_eq!(normalize_bearing(-270.0), 90.0);
        assert_almost_eq!(normalize_bearing(725.0), 5.0);
    }
}
