//! Vehicle - Fuel, range and stunt model for every race participant
//!
//! A single `Vehicle` record carries the shared state (name, tank, fuel,
//! odometer) and a `VehicleKind` payload. Efficiency and stunts dispatch on
//! the kind.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Round to 2 decimals, the granularity of every fuel and distance value.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Trim, collapse inner whitespace and capitalize every word.
///
/// `"  fAST   lane "` becomes `"Fast Lane"`.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Names already taken in this run
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    names: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the normalized form of `name` is already taken
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&normalize_name(name))
    }

    /// Reserve a normalized name. Returns false if it was already taken.
    pub fn claim(&mut self, name: &str) -> bool {
        self.names.insert(normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Engine displacement classes for motorcycles and quads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Displacement {
    Cc125,
    Cc250,
    Cc400,
    Cc500,
    Cc750,
    Cc900,
    Cc1000,
}

impl Displacement {
    pub const ALL: [Displacement; 7] = [
        Displacement::Cc125,
        Displacement::Cc250,
        Displacement::Cc400,
        Displacement::Cc500,
        Displacement::Cc750,
        Displacement::Cc900,
        Displacement::Cc1000,
    ];

    pub fn cc(self) -> u32 {
        match self {
            Displacement::Cc125 => 125,
            Displacement::Cc250 => 250,
            Displacement::Cc400 => 400,
            Displacement::Cc500 => 500,
            Displacement::Cc750 => 750,
            Displacement::Cc900 => 900,
            Displacement::Cc1000 => 1000,
        }
    }
}

/// Quad subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuadType {
    Sport,
    Utility,
    Racing,
}

impl QuadType {
    pub const ALL: [QuadType; 3] = [QuadType::Sport, QuadType::Utility, QuadType::Racing];

    pub fn label(self) -> &'static str {
        match self {
            QuadType::Sport => "sport",
            QuadType::Utility => "utility",
            QuadType::Racing => "racing",
        }
    }
}

/// Kind-specific vehicle attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VehicleKind {
    Car {
        brand: String,
        model: String,
        sporty: bool,
    },
    Motorcycle {
        brand: String,
        model: String,
        displacement: Displacement,
    },
    Truck {
        cargo_kg: u32,
    },
    Quad {
        displacement: Displacement,
        subtype: QuadType,
    },
}

/// Cosmetic stunts performed between segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stunt {
    Skid,
    Wheelie,
}

impl Stunt {
    pub fn label(self) -> &'static str {
        match self {
            Stunt::Skid => "Skid",
            Stunt::Wheelie => "Wheelie",
        }
    }
}

/// Complete state for a single vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    name: String,
    tank_capacity: f64,
    fuel: f64,
    odometer: f64,
    kind: VehicleKind,
}

impl Vehicle {
    /// Constants
    pub const BASE_KM_PER_LITRE: f64 = 10.0;
    pub const MOTORCYCLE_KM_PER_LITRE: f64 = 20.0;
    pub const TRUCK_KM_PER_LITRE: f64 = 6.25;
    pub const TRUCK_REDUCTION_PER_TONNE: f64 = 0.2;
    pub const MIN_CARGO_KG: u32 = 1000;
    pub const MAX_CARGO_KG: u32 = 10000;
    /// Distance-equivalent burned by a skid
    pub const SKID_KM: f64 = 7.5;
    /// Assumed surcharge for sporty cars, which skid harder
    pub const SPORTY_SKID_KM: f64 = 10.0;
    /// Distance-equivalent burned by a wheelie
    pub const WHEELIE_KM: f64 = 6.5;

    /// Validate and build a vehicle, claiming its name in `registry`.
    ///
    /// The name is only claimed once every other check has passed, so a
    /// rejected vehicle does not burn its name.
    pub fn new(
        registry: &mut NameRegistry,
        name: &str,
        tank_capacity: f64,
        fuel: f64,
        odometer: f64,
        kind: VehicleKind,
    ) -> Result<Self, ValidationError> {
        let name = normalize_name(name);
        if name.is_empty() {
            return Err(ValidationError::BlankName);
        }

        let tank_capacity = round2(tank_capacity);
        if tank_capacity <= 0.0 {
            return Err(ValidationError::NonPositiveCapacity(tank_capacity));
        }
        if fuel < 0.0 {
            return Err(ValidationError::NegativeFuel(fuel));
        }
        let fuel = round2(fuel);
        if fuel > tank_capacity {
            return Err(ValidationError::FuelOverCapacity {
                fuel,
                capacity: tank_capacity,
            });
        }
        if odometer < 0.0 {
            return Err(ValidationError::NegativeOdometer(odometer));
        }
        if let VehicleKind::Truck { cargo_kg } = &kind {
            if !(Self::MIN_CARGO_KG..=Self::MAX_CARGO_KG).contains(cargo_kg) {
                return Err(ValidationError::CargoWeightOutOfRange(*cargo_kg));
            }
        }

        if !registry.claim(&name) {
            return Err(ValidationError::DuplicateName(name));
        }

        Ok(Self {
            name,
            tank_capacity,
            fuel,
            odometer: round2(odometer),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tank_capacity(&self) -> f64 {
        self.tank_capacity
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn odometer(&self) -> f64 {
        self.odometer
    }

    pub fn kind(&self) -> &VehicleKind {
        &self.kind
    }

    /// Distance covered per litre of fuel.
    ///
    /// The motorcycle displacement term divides whole cubic centimetres by
    /// 1000 with integer division, so every class below 1000 cc yields 19.0.
    pub fn adjusted_efficiency(&self) -> f64 {
        match &self.kind {
            VehicleKind::Car { .. } => Self::BASE_KM_PER_LITRE,
            VehicleKind::Motorcycle { displacement, .. } => {
                Self::motorcycle_efficiency(*displacement)
            }
            VehicleKind::Truck { cargo_kg } => {
                let tonnes = (cargo_kg / 1000) as f64;
                Self::TRUCK_KM_PER_LITRE - tonnes * Self::TRUCK_REDUCTION_PER_TONNE
            }
            VehicleKind::Quad { displacement, .. } => {
                Self::motorcycle_efficiency(*displacement) / 2.0
            }
        }
    }

    fn motorcycle_efficiency(displacement: Displacement) -> f64 {
        let whole_litres = displacement.cc() / 1000;
        Self::MOTORCYCLE_KM_PER_LITRE - (1 - whole_litres) as f64
    }

    /// Distance reachable with the fuel left, on the 2-decimal grid
    fn range(&self) -> f64 {
        round2(self.fuel * self.adjusted_efficiency())
    }

    fn set_fuel(&mut self, value: f64) {
        self.fuel = if value < 0.0 { 0.0 } else { round2(value) };
    }

    fn burn_fuel_for(&mut self, distance: f64) {
        let burned = distance / self.adjusted_efficiency();
        self.set_fuel(self.fuel - burned);
    }

    /// Try to cover `requested` distance on the fuel in the tank.
    ///
    /// Returns the distance that could not be covered (0 when the trip was
    /// completed).
    pub fn travel(&mut self, requested: f64) -> f64 {
        let requested = requested.max(0.0);
        if requested == 0.0 {
            return 0.0;
        }

        let covered = self.range().min(requested);
        self.burn_fuel_for(covered);
        self.odometer = round2(self.odometer + covered);
        round2(requested - covered)
    }

    /// Add `amount` litres, capped at the tank capacity. Zero or a negative
    /// amount fills the tank. Returns the litres actually added.
    pub fn refuel(&mut self, amount: f64) -> f64 {
        let previous = self.fuel;
        if amount <= 0.0 {
            self.fuel = self.tank_capacity;
        } else {
            self.set_fuel((self.fuel + amount).min(self.tank_capacity));
        }
        round2(self.fuel - previous)
    }

    /// Fill the tank up
    pub fn fill_up(&mut self) -> f64 {
        self.refuel(0.0)
    }

    /// The stunt this vehicle can perform, if any. Trucks never stunt.
    pub fn stunt(&self) -> Option<Stunt> {
        match self.kind {
            VehicleKind::Car { .. } => Some(Stunt::Skid),
            VehicleKind::Motorcycle { .. } | VehicleKind::Quad { .. } => Some(Stunt::Wheelie),
            VehicleKind::Truck { .. } => None,
        }
    }

    fn stunt_distance(&self) -> Option<f64> {
        match self.kind {
            VehicleKind::Car { sporty: true, .. } => Some(Self::SPORTY_SKID_KM),
            VehicleKind::Car { sporty: false, .. } => Some(Self::SKID_KM),
            VehicleKind::Motorcycle { .. } | VehicleKind::Quad { .. } => Some(Self::WHEELIE_KM),
            VehicleKind::Truck { .. } => None,
        }
    }

    /// Perform the vehicle's stunt regardless of the fuel left.
    ///
    /// Returns the stunt and the remaining fuel, or `None` for vehicles
    /// without a stunt.
    pub fn perform_stunt(&mut self) -> Option<(Stunt, f64)> {
        let stunt = self.stunt()?;
        let distance = self.stunt_distance()?;
        self.burn_fuel_for(distance);
        Some((stunt, self.fuel))
    }

    /// One-line introduction shown when the vehicle is assigned
    pub fn introduction(&self) -> String {
        format!("You got a {}", self)
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            VehicleKind::Car {
                brand,
                model,
                sporty,
            } => write!(
                f,
                "Car(name={}, brand={}, model={}, sporty={}",
                self.name, brand, model, sporty
            )?,
            VehicleKind::Motorcycle {
                brand,
                model,
                displacement,
            } => write!(
                f,
                "Motorcycle(name={}, brand={}, model={}, displacement={}cc",
                self.name,
                brand,
                model,
                displacement.cc()
            )?,
            VehicleKind::Truck { cargo_kg } => {
                write!(f, "Truck(name={}, cargo={}kg", self.name, cargo_kg)?
            }
            VehicleKind::Quad {
                displacement,
                subtype,
            } => write!(
                f,
                "Quad(name={}, displacement={}cc, type={}",
                self.name,
                displacement.cc(),
                subtype.label()
            )?,
        }
        write!(
            f,
            ", tank={:.2} L, fuel={:.2} L, odometer={:.2} km)",
            self.tank_capacity, self.fuel, self.odometer
        )
    }
}
