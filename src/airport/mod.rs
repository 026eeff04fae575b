pub mod catalog;
pub mod picker;

pub use catalog::{Airport, AirportCatalog, CatalogError};
pub use picker::RoutePicker;
