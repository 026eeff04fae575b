//! Spherical-earth geometry: distance, bearing and great-circle paths.

mod geodesic;

pub use geodesic::{Coordinate, EARTH_RADIUS_KM, Path, bearing, distance, interpolate_path};
