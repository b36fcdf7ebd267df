//! Race - Turn loop, segmented travel and finish detection
//!
//! Each turn one vehicle is drawn at random and asked to cover a random
//! distance in 20 km segments, refuelling whenever the tank runs dry and
//! trying two stunts after every segment.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RaceError};
use crate::race_engine::dice::RaceDice;
use crate::race_engine::telemetry::{RaceResult, Telemetry};
use crate::race_engine::vehicle::{round2, Vehicle};

/// Race configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Race name shown in reports
    pub name: String,
    /// Total race distance in km
    pub distance: f64,
    /// Pause between turns in milliseconds
    pub pace_ms: u64,
}

impl RaceConfig {
    pub const MIN_DISTANCE: f64 = 1000.0;
    /// Longest race whose hundredths are still exact in an `f64`
    pub const MAX_DISTANCE: f64 = 1_000_000_000.0;

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.distance.is_finite() {
            return Err(ConfigError::NonFiniteDistance(self.distance));
        }
        if self.distance > Self::MAX_DISTANCE {
            return Err(ConfigError::DistanceTooLong {
                distance: self.distance,
                maximum: Self::MAX_DISTANCE,
            });
        }
        if self.distance < Self::MIN_DISTANCE {
            return Err(ConfigError::DistanceTooShort {
                distance: self.distance,
                minimum: Self::MIN_DISTANCE,
            });
        }
        Ok(())
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            name: "Grand Stunt Race".to_string(),
            distance: Self::MIN_DISTANCE,
            pace_ms: 0,
        }
    }
}

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    Running,
    Finished,
}

/// What happened during one turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnSummary {
    pub vehicle: String,
    pub target: f64,
    pub segments: u32,
    pub refuels: u32,
    pub stunts: u32,
    /// The race ended on this turn
    pub finished: bool,
}

/// Complete race state
#[derive(Debug)]
pub struct Race<D> {
    config: RaceConfig,
    status: RaceStatus,
    participants: Vec<Vehicle>,
    telemetry: Telemetry,
    dice: D,
    winner: Option<usize>,
    turns: u32,
}

impl<D: RaceDice> Race<D> {
    /// Length of a segment between stunt attempts
    pub const SEGMENT_KM: f64 = 20.0;
    /// Stunt attempts after every segment
    pub const STUNT_ATTEMPTS: u32 = 2;

    /// Create a race and open a ledger entry for every participant.
    ///
    /// The distance is snapped to the 0.01 km grid that every odometer moves
    /// on, so the leader can always land on the finish line.
    pub fn new(mut config: RaceConfig, participants: Vec<Vehicle>, dice: D) -> Result<Self, ConfigError> {
        config.validate()?;
        if participants.is_empty() {
            return Err(ConfigError::NoParticipants);
        }
        config.distance = round2(config.distance);

        let mut telemetry = Telemetry::new();
        telemetry.initialize(&participants);

        Ok(Self {
            config,
            status: RaceStatus::NotStarted,
            participants,
            telemetry,
            dice,
            winner: None,
            turns: 0,
        })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn participants(&self) -> &[Vehicle] {
        &self.participants
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn winner(&self) -> Option<&Vehicle> {
        self.winner.map(|index| &self.participants[index])
    }

    /// Start the race. Has no effect once started.
    pub fn start(&mut self) {
        if self.status == RaceStatus::NotStarted {
            self.status = RaceStatus::Running;
            log::info!(
                "{} started: {} vehicles, {:.2} km",
                self.config.name,
                self.participants.len(),
                self.config.distance
            );
        }
    }

    /// Play one turn
    pub fn step(&mut self) -> Result<TurnSummary, RaceError> {
        if self.status != RaceStatus::Running {
            return Err(RaceError::NotRunning);
        }

        let index = self.dice.pick_mover(self.participants.len());
        let mut summary = self.advance_vehicle(index)?;
        self.turns += 1;

        if let Some(winner) = self.detect_winner() {
            self.status = RaceStatus::Finished;
            self.winner = Some(winner);
            summary.finished = true;
            log::info!(
                "{} finished after {} turns, winner: {}",
                self.config.name,
                self.turns,
                self.participants[winner].name()
            );
        }

        Ok(summary)
    }

    /// Start if needed and play turns until a winner is found
    pub fn run(&mut self) -> Result<&Vehicle, RaceError> {
        self.start();
        while self.status == RaceStatus::Running {
            self.step()?;
        }
        self.winner().ok_or(RaceError::NotFinished)
    }

    /// Final standings, farthest first
    pub fn results(&self) -> Result<Vec<RaceResult>, RaceError> {
        if self.status != RaceStatus::Finished {
            return Err(RaceError::NotFinished);
        }
        Ok(self.telemetry.compute_results(&self.participants))
    }

    /// Random turn distance, cut so the final leg ends on the finish line
    fn turn_target(&mut self, odometer: f64) -> f64 {
        let drawn = self.dice.turn_distance();
        let remaining = round2(self.config.distance - odometer).max(0.0);
        drawn.min(remaining)
    }

    fn advance_vehicle(&mut self, index: usize) -> Result<TurnSummary, RaceError> {
        let target = self.turn_target(self.participants[index].odometer());

        let Self {
            participants,
            telemetry,
            dice,
            ..
        } = self;
        let vehicle = &mut participants[index];
        let name = vehicle.name().to_string();

        let mut summary = TurnSummary {
            vehicle: name.clone(),
            target,
            segments: 0,
            refuels: 0,
            stunts: 0,
            finished: false,
        };

        telemetry.record_action(
            &name,
            format!(
                "Trip started: {:.2} km to cover ({:.2} km, {:.2} L)",
                target,
                vehicle.odometer(),
                vehicle.fuel()
            ),
        )?;

        let mut remaining = target;
        while remaining > 0.0 {
            let segment = remaining.min(Self::SEGMENT_KM);
            summary.segments += 1;

            let mut shortfall = vehicle.travel(segment);
            telemetry.record_action(&name, format!("Segment: covered {:.2} km", segment - shortfall))?;

            while shortfall > 0.0 {
                let added = vehicle.fill_up();
                summary.refuels += 1;
                telemetry.record_action(&name, format!("Refuel: {:.2} L", added))?;
                log::debug!("{} refuelled {:.2} L mid-segment", name, added);

                let requested = shortfall;
                shortfall = vehicle.travel(requested);
                telemetry.record_action(&name, format!("Segment: covered {:.2} km", requested - shortfall))?;
            }

            for _ in 0..Self::STUNT_ATTEMPTS {
                if !dice.stunt_roll() {
                    continue;
                }
                if let Some((stunt, fuel_left)) = vehicle.perform_stunt() {
                    summary.stunts += 1;
                    telemetry.record_action(&name, format!("{}: {:.2} L left", stunt.label(), fuel_left))?;
                }
            }

            remaining = round2(remaining - segment);
        }

        telemetry.record_action(
            &name,
            format!(
                "Trip finished: {:.2} km covered ({:.2} km, {:.2} L)",
                target,
                vehicle.odometer(),
                vehicle.fuel()
            ),
        )?;
        telemetry.update_position(&name, target)?;

        log::debug!(
            "{} moved {:.2} km in {} segments ({} refuels, {} stunts)",
            name,
            target,
            summary.segments,
            summary.refuels,
            summary.stunts
        );
        Ok(summary)
    }

    /// The leader (first on ties) if it has reached the finish line
    fn detect_winner(&self) -> Option<usize> {
        let (index, leader) = self
            .participants
            .iter()
            .enumerate()
            .reduce(|best, current| if current.1.odometer() > best.1.odometer() { current } else { best })?;

        (leader.odometer() >= self.config.distance).then_some(index)
    }

    /// Get compact snapshot of the race
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            turns: self.turns,
            vehicles: self.participants.iter().map(VehicleSnapshot::from).collect(),
            winner: self.winner().map(|vehicle| vehicle.name().to_string()),
        }
    }
}

/// Compact vehicle state for progress reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub name: String,
    pub odometer: f64,
    pub fuel: f64,
}

impl From<&Vehicle> for VehicleSnapshot {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            name: vehicle.name().to_string(),
            odometer: vehicle.odometer(),
            fuel: vehicle.fuel(),
        }
    }
}

/// Compact race snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub turns: u32,
    pub vehicles: Vec<VehicleSnapshot>,
    pub winner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_engine::vehicle::{NameRegistry, VehicleKind};
    use std::collections::VecDeque;

    /// Dice replaying fixed sequences. Exhausted queues fall back to the
    /// first vehicle, the longest turn and failed stunts.
    #[derive(Debug, Default)]
    struct ScriptedDice {
        movers: VecDeque<usize>,
        distances: VecDeque<f64>,
        rolls: VecDeque<bool>,
    }

    impl ScriptedDice {
        fn new(movers: &[usize], distances: &[f64], rolls: &[bool]) -> Self {
            Self {
                movers: movers.iter().copied().collect(),
                distances: distances.iter().copied().collect(),
                rolls: rolls.iter().copied().collect(),
            }
        }
    }

    impl RaceDice for ScriptedDice {
        fn pick_mover(&mut self, count: usize) -> usize {
            self.movers.pop_front().unwrap_or(0) % count
        }

        fn turn_distance(&mut self) -> f64 {
            self.distances.pop_front().unwrap_or(200.0)
        }

        fn stunt_roll(&mut self) -> bool {
            self.rolls.pop_front().unwrap_or(false)
        }
    }

    fn car(registry: &mut NameRegistry, name: &str, fuel: f64, odometer: f64) -> Vehicle {
        Vehicle::new(
            registry,
            name,
            40.0,
            fuel,
            odometer,
            VehicleKind::Car {
                brand: "Honda".into(),
                model: "Basic A".into(),
                sporty: false,
            },
        )
        .unwrap()
    }

    fn truck(registry: &mut NameRegistry, name: &str) -> Vehicle {
        Vehicle::new(registry, name, 100.0, 100.0, 0.0, VehicleKind::Truck { cargo_kg: 5000 }).unwrap()
    }

    #[test]
    fn rejects_short_races() {
        let mut registry = NameRegistry::new();
        let config = RaceConfig {
            distance: 999.99,
            ..Default::default()
        };
        let err = Race::new(config, vec![truck(&mut registry, "rig")], ScriptedDice::default()).unwrap_err();
        assert!(matches!(err, ConfigError::DistanceTooShort { .. }));
    }

    #[test]
    fn rejects_non_finite_and_oversized_distances() {
        for distance in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut registry = NameRegistry::new();
            let config = RaceConfig {
                distance,
                ..Default::default()
            };
            let err = Race::new(config, vec![truck(&mut registry, "rig")], ScriptedDice::default()).unwrap_err();
            assert!(matches!(err, ConfigError::NonFiniteDistance(_)), "{distance}: {err:?}");
        }

        let config = RaceConfig {
            distance: RaceConfig::MAX_DISTANCE + 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::DistanceTooLong { .. })));
    }

    #[test]
    fn off_grid_distance_is_snapped_and_still_finishes() {
        let mut registry = NameRegistry::new();
        let config = RaceConfig {
            distance: 1000.004,
            ..Default::default()
        };
        let mut race = Race::new(config, vec![truck(&mut registry, "rig")], ScriptedDice::default()).unwrap();
        assert_eq!(race.config().distance, 1000.0);

        race.run().unwrap();

        assert_eq!(race.status(), RaceStatus::Finished);
        assert_eq!(race.turns(), 5);
        assert_eq!(race.participants()[0].odometer(), 1000.0);
    }

    #[test]
    fn rejects_empty_grid() {
        let err = Race::new(RaceConfig::default(), Vec::new(), ScriptedDice::default()).unwrap_err();
        assert_eq!(err, ConfigError::NoParticipants);
    }

    #[test]
    fn turns_require_a_running_race() {
        let mut registry = NameRegistry::new();
        let mut race = Race::new(
            RaceConfig::default(),
            vec![truck(&mut registry, "rig")],
            ScriptedDice::default(),
        )
        .unwrap();

        assert_eq!(race.status(), RaceStatus::NotStarted);
        assert_eq!(race.step().unwrap_err(), RaceError::NotRunning);
        assert_eq!(race.results().unwrap_err(), RaceError::NotFinished);
    }

    #[test]
    fn splits_turn_into_segments_and_updates_ledger() {
        let mut registry = NameRegistry::new();
        let mut race = Race::new(
            RaceConfig::default(),
            vec![truck(&mut registry, "rig")],
            ScriptedDice::new(&[0], &[45.5], &[]),
        )
        .unwrap();
        race.start();

        let summary = race.step().unwrap();

        assert_eq!(summary.segments, 3);
        assert_eq!(summary.refuels, 0);
        assert_eq!(summary.stunts, 0);
        assert!(!summary.finished);
        assert_eq!(race.telemetry().distance("Rig"), Some(45.5));
        assert_eq!(race.participants()[0].odometer(), 45.5);

        let history = race.telemetry().history("Rig").unwrap();
        assert_eq!(history.len(), 5);
        assert!(history[0].starts_with("Trip started: 45.50 km"));
        assert_eq!(history[3], "Segment: covered 5.50 km");
        assert!(history[4].starts_with("Trip finished: 45.50 km covered (45.50 km"));
    }

    #[test]
    fn refuels_mid_segment_and_finishes_on_the_line() {
        let mut registry = NameRegistry::new();
        let mut race = Race::new(
            RaceConfig::default(),
            vec![car(&mut registry, "dry", 1.0, 980.0)],
            ScriptedDice::new(&[0], &[150.0], &[false, false]),
        )
        .unwrap();
        race.start();

        let summary = race.step().unwrap();

        assert_eq!(summary.target, 20.0);
        assert_eq!(summary.refuels, 1);
        assert!(summary.finished);
        assert_eq!(
            race.telemetry().history("Dry").unwrap(),
            &[
                "Trip started: 20.00 km to cover (980.00 km, 1.00 L)".to_string(),
                "Segment: covered 10.00 km".to_string(),
                "Refuel: 40.00 L".to_string(),
                "Segment: covered 10.00 km".to_string(),
                "Trip finished: 20.00 km covered (1000.00 km, 39.00 L)".to_string(),
            ]
        );

        let results = race.results().unwrap();
        assert_eq!(results[0].refuel_stops, 1);
        assert_eq!(results[0].distance, 20.0);
    }

    #[test]
    fn declares_winner_exactly_at_the_finish_line() {
        let mut registry = NameRegistry::new();
        let mut race = Race::new(
            RaceConfig::default(),
            vec![
                car(&mut registry, "close", 40.0, 990.0),
                car(&mut registry, "far", 40.0, 0.0),
            ],
            ScriptedDice::new(&[1, 0], &[10.0, 50.0], &[]),
        )
        .unwrap();
        race.start();

        assert!(!race.step().unwrap().finished);
        let summary = race.step().unwrap();

        assert!(summary.finished);
        assert_eq!(summary.target, 10.0);
        assert_eq!(race.status(), RaceStatus::Finished);
        assert_eq!(race.winner().map(Vehicle::name), Some("Close"));
        assert_eq!(race.participants()[0].odometer(), 1000.0);
        assert_eq!(race.step().unwrap_err(), RaceError::NotRunning);
    }

    #[test]
    fn only_cars_and_bikes_perform_stunts() {
        let mut registry = NameRegistry::new();
        let mut race = Race::new(
            RaceConfig::default(),
            vec![car(&mut registry, "drifter", 40.0, 0.0), truck(&mut registry, "hauler")],
            ScriptedDice::new(&[0, 1], &[20.0, 20.0], &[true, true, true, true]),
        )
        .unwrap();
        race.start();

        assert_eq!(race.step().unwrap().stunts, 2);
        assert_eq!(race.step().unwrap().stunts, 0);

        let drifter = race.telemetry().history("Drifter").unwrap();
        assert_eq!(drifter[2], "Skid: 37.25 L left");
        assert_eq!(drifter[3], "Skid: 36.50 L left");
        assert!(!race
            .telemetry()
            .history("Hauler")
            .unwrap()
            .iter()
            .any(|action| action.starts_with("Skid")));
    }

    #[test]
    fn run_plays_until_someone_wins() {
        let mut registry = NameRegistry::new();
        let mut race = Race::new(
            RaceConfig::default(),
            vec![truck(&mut registry, "solo")],
            ScriptedDice::default(),
        )
        .unwrap();

        let winner = race.run().unwrap().name().to_string();

        assert_eq!(winner, "Solo");
        assert_eq!(race.turns(), 5);
        assert_eq!(race.telemetry().distance("Solo"), Some(1000.0));
        assert_eq!(race.snapshot().winner.as_deref(), Some("Solo"));
    }
}
