pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, IntersectionConfig};
pub use error::{Result, SignalError};
pub use types::{CycleId, SignalHeadId, Tick, Vec3, VehicleId};
