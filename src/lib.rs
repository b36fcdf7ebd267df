//! Stunt Race - turn-based race simulator
//!
//! Cars, motorcycles, trucks and quads race toward a fixed distance. Each
//! turn a random vehicle drives a random stretch in 20 km segments,
//! refuelling when the tank runs dry and showing off with skids and
//! wheelies along the way.

pub mod error;
pub mod race_engine;
pub mod report;

pub use error::{ConfigError, RaceError, SessionError, TelemetryError, ValidationError};
pub use race_engine::{
    Race, RaceConfig, RaceDice, RaceResult, RaceSession, RaceStatus, RandomDice, Vehicle,
    VehicleClass, VehicleKind,
};
