use thiserror::Error;

use crate::airport::CatalogError;
use crate::config::ConfigError;
use crate::flight::{RouteError, SeatError};
use crate::session::{DriverError, SessionError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error(transparent)]
    Seat(#[from] SeatError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error("no airport catalog configured (use --airports or airports_path in the config)")]
    NoCatalog,
    #[error("pick an origin and a destination first")]
    NoRoute,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
