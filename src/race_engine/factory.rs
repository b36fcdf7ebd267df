//! Factory - Random vehicle generation
//!
//! Draws tank size, starting fuel and kind-specific attributes for a named
//! vehicle. Validation errors (blank or taken names) are returned so the
//! caller can ask for another name.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::race_engine::vehicle::{round2, Displacement, NameRegistry, QuadType, Vehicle, VehicleKind};

pub const CAR_BRANDS: [&str; 4] = ["Toyota", "Honda", "BMW", "Ford"];
pub const CAR_MODELS: [&str; 4] = ["Basic", "Basic A", "Premium A", "Premium B"];
pub const MOTORCYCLE_BRANDS: [&str; 9] = [
    "Harley Davidson",
    "Ducati",
    "Aprilia",
    "BMW",
    "Yamaha",
    "Honda",
    "Suzuki",
    "Kawasaki",
    "KTM",
];
pub const MOTORCYCLE_MODELS: [&str; 4] = ["Moto A", "Moto B", "Moto C", "Moto D"];

/// Vehicle classes that can be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Truck,
    Quad,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Truck,
        VehicleClass::Quad,
    ];

    /// Whole-litre tank sizes to draw from
    pub fn tank_range(self) -> std::ops::RangeInclusive<u32> {
        match self {
            VehicleClass::Car => 30..=60,
            VehicleClass::Motorcycle => 15..=30,
            VehicleClass::Truck => 90..=150,
            VehicleClass::Quad => 20..=40,
        }
    }

    /// Build a vehicle of this class with random attributes
    pub fn generate<R: Rng>(
        self,
        registry: &mut NameRegistry,
        name: &str,
        rng: &mut R,
    ) -> Result<Vehicle, ValidationError> {
        let tank_capacity = rng.gen_range(self.tank_range()) as f64;
        // Tanks start between 20% and 100% full
        let fuel = round2(tank_capacity * rng.gen_range(0.2_f64..1.0));

        let kind = match self {
            VehicleClass::Car => VehicleKind::Car {
                brand: pick(&CAR_BRANDS, rng),
                model: pick(&CAR_MODELS, rng),
                sporty: rng.gen_bool(0.5),
            },
            VehicleClass::Motorcycle => VehicleKind::Motorcycle {
                brand: pick(&MOTORCYCLE_BRANDS, rng),
                model: pick(&MOTORCYCLE_MODELS, rng),
                displacement: random_displacement(rng),
            },
            VehicleClass::Truck => VehicleKind::Truck {
                cargo_kg: rng.gen_range(Vehicle::MIN_CARGO_KG..=Vehicle::MAX_CARGO_KG),
            },
            VehicleClass::Quad => VehicleKind::Quad {
                displacement: random_displacement(rng),
                subtype: *QuadType::ALL.choose(rng).unwrap_or(&QuadType::Sport),
            },
        };

        let vehicle = Vehicle::new(registry, name, tank_capacity, fuel, 0.0, kind)?;
        log::debug!("Generated {}", vehicle);
        Ok(vehicle)
    }
}

fn pick<R: Rng>(options: &[&str], rng: &mut R) -> String {
    options.choose(rng).copied().unwrap_or_default().to_string()
}

fn random_displacement<R: Rng>(rng: &mut R) -> Displacement {
    *Displacement::ALL.choose(rng).unwrap_or(&Displacement::Cc125)
}

/// Build a vehicle of a random class
pub fn generate_random_vehicle<R: Rng>(
    registry: &mut NameRegistry,
    name: &str,
    rng: &mut R,
) -> Result<Vehicle, ValidationError> {
    let class = *VehicleClass::ALL.choose(rng).unwrap_or(&VehicleClass::Car);
    class.generate(registry, name, rng)
}
