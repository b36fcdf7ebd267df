//! Error types for the race engine

use thiserror::Error;

/// Vehicle construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("vehicle name cannot be blank")]
    BlankName,

    #[error("a vehicle named {0} already exists")]
    DuplicateName(String),

    #[error("tank capacity must be positive (got {0:.2})")]
    NonPositiveCapacity(f64),

    #[error("current fuel cannot be negative (got {0:.2})")]
    NegativeFuel(f64),

    #[error("current fuel {fuel:.2} exceeds tank capacity {capacity:.2}")]
    FuelOverCapacity { fuel: f64, capacity: f64 },

    #[error("odometer cannot be negative (got {0:.2})")]
    NegativeOdometer(f64),

    #[error("cargo weight must be between 1000 and 10000 kg (got {0} kg)")]
    CargoWeightOutOfRange(u32),
}

/// Race configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("race distance must be at least {minimum:.0} (got {distance:.2})")]
    DistanceTooShort { distance: f64, minimum: f64 },

    #[error("race distance must be at most {maximum:.0} (got {distance:.2})")]
    DistanceTooLong { distance: f64, maximum: f64 },

    #[error("race distance must be a finite number (got {0})")]
    NonFiniteDistance(f64),

    #[error("a race needs at least one participant")]
    NoParticipants,
}

/// Ledger lookups for a vehicle that was never registered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("vehicle {0} is not part of the race ledger")]
    UnknownVehicle(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RaceError {
    #[error("race is not running")]
    NotRunning,

    #[error("race has not finished yet")]
    NotFinished,

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Internal invariant violation: the ledger and participant list disagree.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

/// Errors from driving a race session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("vehicles can only be enrolled before the race starts")]
    EnrollmentClosed,

    #[error("no race has been started")]
    NoRace,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Race(#[from] RaceError),
}
