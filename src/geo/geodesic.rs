use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Below this angular distance (radians) two points are treated as the same
/// point when interpolating.
const COINCIDENT_RAD: f64 = 1e-12;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Projection onto the unit sphere as (x, y, z).
    fn to_unit_vector(self) -> (f64, f64, f64) {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        (lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    fn from_vector(x: f64, y: f64, z: f64) -> Self {
        let lat = z.atan2(x.hypot(y));
        let lon = y.atan2(x);
        Self::new(lat.to_degrees(), lon.to_degrees())
    }
}

/// Ordered points along a great circle, origin first and destination last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    points: Vec<Coordinate>,
}

impl Path {
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Coordinate> {
        self.points.get(index).copied()
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }
}

/// Haversine term for two points, clamped to [0, 1] so that rounding on
/// antipodal input never reaches `sqrt`/`asin` out of domain.
fn haversine(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    h.clamp(0.0, 1.0)
}

/// Central angle between two points in radians.
fn angular_distance(a: Coordinate, b: Coordinate) -> f64 {
    2.0 * haversine(a, b).sqrt().asin()
}

/// Great-circle distance in kilometers.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    EARTH_RADIUS_KM * angular_distance(a, b)
}

/// Initial great-circle bearing from `a` towards `b`, in degrees within
/// [0, 360).
///
/// For `a == b` the direction is undefined and 0 is returned; callers must
/// not read meaning into that value.
pub fn bearing(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    let degrees = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // -0.0 + 360.0 style rounding can land exactly on 360
    if !degrees.is_finite() || degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Samples `segments + 1` points along the great circle from `a` to `b`
/// using spherical linear interpolation.
///
/// Coincident endpoints yield `segments + 1` copies of `a`. A `segments` of
/// zero is read as one.
pub fn interpolate_path(a: Coordinate, b: Coordinate, segments: usize) -> Path {
    let segments = segments.max(1);
    let d = angular_distance(a, b);

    if d < COINCIDENT_RAD {
        return Path {
            points: vec![a; segments + 1],
        };
    }

    let (ax, ay, az) = a.to_unit_vector();
    let (bx, by, bz) = b.to_unit_vector();
    let sin_d = d.sin();

    let points = (0..=segments)
        .map(|i| {
            let f = i as f64 / segments as f64;
            let wa = ((1.0 - f) * d).sin() / sin_d;
            let wb = (f * d).sin() / sin_d;
            Coordinate::from_vector(wa * ax + wb * bx, wa * ay + wb * by, wa * az + wb * bz)
        })
        .collect();

    Path { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const JFK: Coordinate = Coordinate::new(40.6413, -73.7781);
    const LHR: Coordinate = Coordinate::new(51.4700, -0.4543);

    fn assert_coord_eq(actual: Coordinate, expected: Coordinate) {
        assert_abs_diff_eq!(actual.lat, expected.lat, epsilon = 1e-6);
        // longitude is compared on the circle so 180 and -180 match
        let d_lon = ((actual.lon - expected.lon + 540.0) % 360.0) - 180.0;
        assert_abs_diff_eq!(d_lon, 0.0, epsilon = 1e-6);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    #[test]
    fn test_distance_jfk_lhr() {
        let km = distance(JFK, LHR);
        assert!((km - 5540.0).abs() < 5.0, "got {km}");
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance(JFK, JFK), 0.0);
    }

    #[test]
    fn test_distance_antipodal_is_half_circumference() {
        let a = Coordinate::new(10.0, 20.0);
        let b = Coordinate::new(-10.0, -160.0);
        let km = distance(a, b);
        assert!(km.is_finite());
        assert_abs_diff_eq!(km, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-2);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = Coordinate::new(0.0, 0.0);
        assert_abs_diff_eq!(bearing(origin, Coordinate::new(10.0, 0.0)), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(origin, Coordinate::new(0.0, 10.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(origin, Coordinate::new(-10.0, 0.0)), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(origin, Coordinate::new(0.0, -10.0)), 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bearing_same_point_is_zero() {
        assert_eq!(bearing(LHR, LHR), 0.0);
    }

    #[test]
    fn test_bearing_jfk_lhr_heads_north_east() {
        let b = bearing(JFK, LHR);
        assert!((50.0..52.0).contains(&b), "got {b}");
    }

    #[test]
    fn test_interpolate_path_endpoints() {
        let path = interpolate_path(JFK, LHR, 2000);
        assert_eq!(path.len(), 2001);
        assert_coord_eq(path.points()[0], JFK);
        assert_coord_eq(path.points()[2000], LHR);
    }

    #[test]
    fn test_interpolate_path_midpoint_is_halfway() {
        let path = interpolate_path(JFK, LHR, 2);
        let mid = path.points()[1];
        assert_abs_diff_eq!(distance(JFK, mid), distance(mid, LHR), epsilon = 1e-6);
        assert_abs_diff_eq!(distance(JFK, mid) * 2.0, distance(JFK, LHR), epsilon = 1e-6);
    }

    #[test]
    fn test_interpolate_path_coincident_points() {
        let path = interpolate_path(JFK, JFK, 5);
        assert_eq!(path.len(), 6);
        assert!(path.points().iter().all(|p| *p == JFK));
    }

    #[test]
    fn test_interpolate_path_zero_segments() {
        let path = interpolate_path(JFK, LHR, 0);
        assert_eq!(path.len(), 2);
        assert_coord_eq(path.last().unwrap(), LHR);
    }

    #[test]
    fn test_interpolate_path_crosses_antimeridian() {
        let a = Coordinate::new(35.0, 170.0);
        let b = Coordinate::new(35.0, -170.0);
        let path = interpolate_path(a, b, 10);
        // every sample stays on the short side of the globe
        assert!(path.points().iter().all(|p| p.lon.abs() >= 169.9));
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = distance(a, b);
            let ba = distance(b, a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() <= 1e-6 * ab.max(1.0));
        }

        #[test]
        fn prop_bearing_in_range(a in coordinate(), b in coordinate()) {
            let deg = bearing(a, b);
            prop_assert!(deg.is_finite());
            prop_assert!((0.0..360.0).contains(&deg));
        }

        #[test]
        fn prop_path_hits_both_endpoints(a in coordinate(), b in coordinate(), n in 1usize..64) {
            // poles and antipodes have no unique longitude or arc
            prop_assume!(a.lat.abs() < 89.0 && b.lat.abs() < 89.0);
            prop_assume!(distance(a, b) > 1.0 && distance(a, b) < 20_000.0);
            let path = interpolate_path(a, b, n);
            prop_assert_eq!(path.len(), n + 1);
            let first = path.first().unwrap();
            let last = path.last().unwrap();
            prop_assert!(distance(first, a) < 1e-6);
            prop_assert!(distance(last, b) < 1e-6);
        }

        #[test]
        fn prop_degenerate_path_never_nan(a in coordinate(), n in 1usize..64) {
            let path = interpolate_path(a, a, n);
            prop_assert_eq!(path.len(), n + 1);
            prop_assert!(path.points().iter().all(|p| *p == a && !p.lat.is_nan()));
        }
    }
}
