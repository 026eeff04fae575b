pub mod route;
pub mod seat;

pub use route::{
    CRUISE_SPEED_KMH, FlightContext, PATH_SEGMENTS, Route, RouteError, estimate_flight_seconds,
    format_hms,
};
pub use seat::{Seat, SeatError, SeatStatus};
