//! Marker animation along a route.
//!
//! The animation runs on its own fixed-length visual clock: the whole path is
//! traversed in [`TRAVERSAL`] no matter how long the flight really lasts.

use std::time::Duration;

use serde::Serialize;

use crate::geo::{self, Coordinate, Path};

pub const TRAVERSAL: Duration = Duration::from_secs(180);

/// Points ahead of the current one used to orient the marker.
pub const LOOK_AHEAD: usize = 2;

/// The plane glyph points north-east, so its rotation is the heading minus
/// this offset.
pub const MARKER_ICON_OFFSET_DEG: f64 = 45.0;

/// Re-centre the map every this many path points.
pub const PAN_EVERY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub index: usize,
    pub position: Coordinate,
    pub heading: f64,
    pub rotation: f64,
    pub progress: f64,
    pub pan: bool,
    pub done: bool,
}

#[derive(Debug, Clone)]
pub struct FlightAnimation {
    path: Path,
    traversal: Duration,
    last_heading: f64,
}

impl FlightAnimation {
    pub fn new(path: Path) -> Self {
        Self::with_traversal(path, TRAVERSAL)
    }

    pub fn with_traversal(path: Path, traversal: Duration) -> Self {
        let ahead = LOOK_AHEAD.min(path.len().saturating_sub(1));
        let last_heading = match (path.first(), path.get(ahead)) {
            (Some(a), Some(b)) => geo::bearing(a, b),
            _ => 0.0,
        };
        Self {
            path,
            traversal,
            last_heading,
        }
    }

    /// Samples the marker after `elapsed` time on the visual clock. `None`
    /// only for an empty path.
    pub fn frame(&mut self, elapsed: Duration) -> Option<Frame> {
        let last = self.path.len().checked_sub(1)?;
        let progress = if self.traversal.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.traversal.as_secs_f64()).min(1.0)
        };

        let index = ((progress * last as f64).floor() as usize).min(last);
        let position = self.path.get(index)?;
        let ahead = self.path.get((index + LOOK_AHEAD).min(last))?;

        // at the end of the path there is nothing ahead to aim at
        if ahead != position {
            self.last_heading = geo::bearing(position, ahead);
        }
        let heading = self.last_heading;

        Some(Frame {
            index,
            position,
            heading,
            rotation: heading - MARKER_ICON_OFFSET_DEG,
            progress,
            pan: index % PAN_EVERY == 0,
            done: progress >= 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn equator_path() -> Path {
        geo::interpolate_path(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 40.0), 100)
    }

    #[test]
    fn test_frame_at_start() {
        let mut animation = FlightAnimation::new(equator_path());
        let frame = animation.frame(Duration::ZERO).unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.progress, 0.0);
        assert!(frame.pan);
        assert!(!frame.done);
        assert_abs_diff_eq!(frame.heading, 90.0, epsilon = 1e-6);
        assert_abs_diff_eq!(frame.rotation, 45.0, epsilon = 1e-6);
    }

    #[test]
    fn test_frame_progress_ignores_flight_length() {
        let mut animation = FlightAnimation::new(equator_path());
        let frame = animation.frame(Duration::from_secs(90)).unwrap();
        assert_eq!(frame.index, 50);
        assert_abs_diff_eq!(frame.progress, 0.5);
        assert_abs_diff_eq!(frame.position.lon, 20.0, epsilon = 1e-6);
    }

    #[test]
    fn test_frame_clamps_at_end() {
        let mut animation = FlightAnimation::new(equator_path());
        let frame = animation.frame(Duration::from_secs(3600)).unwrap();
        assert_eq!(frame.index, 100);
        assert!(frame.done);
        assert_abs_diff_eq!(frame.position.lon, 40.0, epsilon = 1e-6);
        // keeps the last heading instead of the degenerate bearing(p, p)
        assert_abs_diff_eq!(frame.heading, 90.0, epsilon = 1e-3);
    }

    #[test]
    fn test_pan_hint_every_twenty_points() {
        let mut animation =
            FlightAnimation::with_traversal(equator_path(), Duration::from_secs(100));
        assert!(!animation.frame(Duration::from_secs(19)).unwrap().pan);
        assert!(animation.frame(Duration::from_secs(20)).unwrap().pan);
    }

    #[test]
    fn test_degenerate_path_stays_finite() {
        let here = Coordinate::new(48.0, 11.0);
        let mut animation = FlightAnimation::new(geo::interpolate_path(here, here, 10));
        let frame = animation.frame(Duration::from_secs(60)).unwrap();
        assert_eq!(frame.position, here);
        assert!(frame.heading.is_finite());
    }
}
