pub mod driver;
pub mod engine;

pub use driver::{DriverConfig, DriverError, SessionDriver, SessionHandle, SessionUpdate, Snapshot};
pub use engine::{
    FocusStrategy, SessionEngine, SessionError, SessionEvent, SessionMode, SessionState, Tick,
};
