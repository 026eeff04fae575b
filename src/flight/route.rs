use serde::Serialize;
use thiserror::Error;

use crate::airport::Airport;
use crate::geo::{self, Path};

pub const CRUISE_SPEED_KMH: f64 = 850.0;

/// Points sampled along the route for drawing and animating it.
pub const PATH_SEGMENTS: usize = 2000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("origin and destination are both {iata}")]
    DegenerateRoute { iata: String },
}

/// A flight between two distinct airports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    origin: Airport,
    destination: Airport,
}

impl Route {
    pub fn new(origin: Airport, destination: Airport) -> Result<Self, RouteError> {
        if origin.iata == destination.iata {
            return Err(RouteError::DegenerateRoute { iata: origin.iata });
        }
        Ok(Self {
            origin,
            destination,
        })
    }

    pub fn origin(&self) -> &Airport {
        &self.origin
    }

    pub fn destination(&self) -> &Airport {
        &self.destination
    }

    pub fn distance_km(&self) -> f64 {
        geo::distance(self.origin.coordinate(), self.destination.coordinate())
    }

    pub fn initial_bearing(&self) -> f64 {
        geo::bearing(self.origin.coordinate(), self.destination.coordinate())
    }

    pub fn estimated_flight_seconds(&self) -> u64 {
        estimate_flight_seconds(self.distance_km())
    }

    pub fn path(&self) -> Path {
        geo::interpolate_path(
            self.origin.coordinate(),
            self.destination.coordinate(),
            PATH_SEGMENTS,
        )
    }
}

/// Whole seconds needed to cover `distance_km` at cruise speed.
pub fn estimate_flight_seconds(distance_km: f64) -> u64 {
    (distance_km / CRUISE_SPEED_KMH * 3600.0).floor().max(0.0) as u64
}

/// `HH:MM:SS`, hours not wrapped at 24.
pub fn format_hms(total_seconds: u64) -> String {
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// What the passenger booked: the route, a seat and the time aloft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightContext {
    pub route: Route,
    pub seat: Option<String>,
    pub estimated_flight_seconds: u64,
}

impl FlightContext {
    pub fn new(route: Route, seat: Option<String>) -> Self {
        let estimated_flight_seconds = route.estimated_flight_seconds();
        Self {
            route,
            seat,
            estimated_flight_seconds,
        }
    }
}
