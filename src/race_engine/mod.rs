//! Race Engine Module
//!
//! Vehicle model, race ledger and the turn-based orchestrator, plus the
//! session wrapper and vehicle generation used by the CLI.

pub mod dice;
pub mod factory;
pub mod race;
pub mod session;
pub mod telemetry;
pub mod vehicle;

pub use dice::{RaceDice, RandomDice};
pub use factory::{generate_random_vehicle, VehicleClass};
pub use race::{Race, RaceConfig, RaceSnapshot, RaceStatus, TurnSummary};
pub use session::{RaceSession, SessionState, SessionStats};
pub use telemetry::{RaceResult, Telemetry};
pub use vehicle::{Displacement, NameRegistry, QuadType, Stunt, Vehicle, VehicleKind};
