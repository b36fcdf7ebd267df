//! Session - Enrolment, paced turns and results for one race
//!
//! Owns the name registry, the enrolled vehicles and the race itself, and
//! keeps timing statistics for the turns played.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SessionError};
use crate::race_engine::dice::RandomDice;
use crate::race_engine::factory::{generate_random_vehicle, VehicleClass};
use crate::race_engine::race::{Race, RaceConfig, RaceSnapshot, RaceStatus, TurnSummary};
use crate::race_engine::telemetry::RaceResult;
use crate::race_engine::vehicle::{NameRegistry, Vehicle};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Enrolling,
    Racing,
    Results,
}

/// Session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub turns: u32,
    pub avg_turn_time_ms: f32,
    pub participant_count: u32,
    pub state: SessionState,
}

/// Main race session
#[derive(Debug)]
pub struct RaceSession {
    /// Current session state
    state: SessionState,
    config: RaceConfig,
    registry: NameRegistry,
    /// Vehicles enrolled before the start
    entrants: Vec<Vehicle>,
    /// Active race (if any)
    race: Option<Race<RandomDice>>,
    /// Drives vehicle generation and seeds the race dice
    rng: StdRng,
    /// Recent turn times for averaging
    turn_times: Vec<f32>,
}

impl RaceSession {
    const TURN_WINDOW: usize = 60;

    /// Create a session. A seed makes the whole race reproducible.
    pub fn new(config: RaceConfig, seed: Option<u64>) -> Result<Self, SessionError> {
        config.validate()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            state: SessionState::Enrolling,
            config,
            registry: NameRegistry::new(),
            entrants: Vec::new(),
            race: None,
            rng,
            turn_times: Vec::with_capacity(Self::TURN_WINDOW),
        })
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn race(&self) -> Option<&Race<RandomDice>> {
        self.race.as_ref()
    }

    /// Enrolled vehicles, or the racing ones once started
    pub fn participants(&self) -> &[Vehicle] {
        match &self.race {
            Some(race) => race.participants(),
            None => &self.entrants,
        }
    }

    /// Generate a vehicle of random class for `name`
    pub fn enroll(&mut self, name: &str) -> Result<&Vehicle, SessionError> {
        self.ensure_enrolling()?;
        let vehicle = generate_random_vehicle(&mut self.registry, name, &mut self.rng)?;
        Ok(self.push_entrant(vehicle))
    }

    /// Generate a vehicle of the given class for `name`
    pub fn enroll_as(&mut self, class: VehicleClass, name: &str) -> Result<&Vehicle, SessionError> {
        self.ensure_enrolling()?;
        let vehicle = class.generate(&mut self.registry, name, &mut self.rng)?;
        Ok(self.push_entrant(vehicle))
    }

    fn ensure_enrolling(&self) -> Result<(), SessionError> {
        if self.state != SessionState::Enrolling {
            return Err(SessionError::EnrollmentClosed);
        }
        Ok(())
    }

    fn push_entrant(&mut self, vehicle: Vehicle) -> &Vehicle {
        log::info!("Enrolled {}", vehicle.name());
        self.entrants.push(vehicle);
        &self.entrants[self.entrants.len() - 1]
    }

    /// Close enrolment and start the race
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.ensure_enrolling()?;
        if self.entrants.is_empty() {
            return Err(ConfigError::NoParticipants.into());
        }

        let dice = RandomDice::seeded(self.rng.gen());
        let entrants = std::mem::take(&mut self.entrants);
        let mut race = Race::new(self.config.clone(), entrants, dice)?;
        race.start();

        self.race = Some(race);
        self.state = SessionState::Racing;
        Ok(())
    }

    /// Play a single turn, then wait for the configured pace
    pub fn tick(&mut self) -> Result<TurnSummary, SessionError> {
        let race = self.race.as_mut().ok_or(SessionError::NoRace)?;

        let turn_start = Instant::now();
        let summary = race.step()?;
        let turn_time = turn_start.elapsed().as_secs_f32() * 1000.0;

        if race.status() == RaceStatus::Finished {
            self.state = SessionState::Results;
        }

        self.turn_times.push(turn_time);
        if self.turn_times.len() > Self::TURN_WINDOW {
            self.turn_times.remove(0);
        }

        if self.config.pace_ms > 0 && self.state == SessionState::Racing {
            thread::sleep(Duration::from_millis(self.config.pace_ms));
        }

        Ok(summary)
    }

    /// Tick until the race is over, calling `on_turn` after every turn
    pub fn run_to_finish<F>(&mut self, mut on_turn: F) -> Result<Vec<RaceResult>, SessionError>
    where
        F: FnMut(&TurnSummary),
    {
        if self.state == SessionState::Enrolling {
            self.start()?;
        }
        while self.state == SessionState::Racing {
            let summary = self.tick()?;
            on_turn(&summary);
        }
        self.results()
    }

    /// Get race results
    pub fn results(&self) -> Result<Vec<RaceResult>, SessionError> {
        let race = self.race.as_ref().ok_or(SessionError::NoRace)?;
        Ok(race.results()?)
    }

    /// Get current race snapshot
    pub fn snapshot(&self) -> Option<RaceSnapshot> {
        self.race.as_ref().map(|race| race.snapshot())
    }

    /// Get session statistics
    pub fn stats(&self) -> SessionStats {
        let avg_turn_time = if self.turn_times.is_empty() {
            0.0
        } else {
            self.turn_times.iter().sum::<f32>() / self.turn_times.len() as f32
        };

        SessionStats {
            turns: self.race.as_ref().map(|race| race.turns()).unwrap_or(0),
            avg_turn_time_ms: avg_turn_time,
            participant_count: self.participants().len() as u32,
            state: self.state,
        }
    }

    /// Back to enrolment with a fresh registry
    pub fn reset(&mut self) {
        self.state = SessionState::Enrolling;
        self.registry = NameRegistry::new();
        self.entrants.clear();
        self.race = None;
        self.turn_times.clear();
    }
}
