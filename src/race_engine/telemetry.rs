//! Telemetry - Per-vehicle action history and distance ledger
//!
//! Entries keep participant order, which breaks ties when ranking.

use serde::Serialize;

use crate::error::TelemetryError;
use crate::race_engine::vehicle::{round2, Vehicle};

/// Log entries containing this marker count as refuel stops
pub const REFUEL_MARKER: &str = "Refuel";

#[derive(Debug, Clone, Default, Serialize)]
struct LedgerEntry {
    name: String,
    history: Vec<String>,
    distance: f64,
}

/// Final standing of one vehicle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResult {
    pub position: u32,
    pub vehicle: Vehicle,
    pub distance: f64,
    pub refuel_stops: u32,
    pub history: Vec<String>,
}

impl RaceResult {
    pub fn name(&self) -> &str {
        self.vehicle.name()
    }
}

/// Race ledger
#[derive(Debug, Clone, Default, Serialize)]
pub struct Telemetry {
    entries: Vec<LedgerEntry>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the ledger with an empty history and zero distance per vehicle
    pub fn initialize(&mut self, participants: &[Vehicle]) {
        self.entries = participants
            .iter()
            .map(|vehicle| LedgerEntry {
                name: vehicle.name().to_string(),
                ..Default::default()
            })
            .collect();
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut LedgerEntry, TelemetryError> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name == name)
            .ok_or_else(|| TelemetryError::UnknownVehicle(name.to_string()))
    }

    fn entry(&self, name: &str) -> Option<&LedgerEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn record_action(&mut self, name: &str, text: impl Into<String>) -> Result<(), TelemetryError> {
        let text = text.into();
        log::trace!("{}: {}", name, text);
        self.entry_mut(name)?.history.push(text);
        Ok(())
    }

    /// Add `delta` to the cumulative distance of `name`
    pub fn update_position(&mut self, name: &str, delta: f64) -> Result<(), TelemetryError> {
        let entry = self.entry_mut(name)?;
        entry.distance = round2(entry.distance + delta.max(0.0));
        Ok(())
    }

    pub fn history(&self, name: &str) -> Option<&[String]> {
        self.entry(name).map(|entry| entry.history.as_slice())
    }

    pub fn distance(&self, name: &str) -> Option<f64> {
        self.entry(name).map(|entry| entry.distance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank vehicles by cumulative distance, farthest first.
    ///
    /// Ledger names without a matching vehicle are skipped.
    pub fn compute_results(&self, participants: &[Vehicle]) -> Vec<RaceResult> {
        let mut standings: Vec<&LedgerEntry> = self.entries.iter().collect();
        // Stable: ties keep ledger order
        standings.sort_by(|a, b| b.distance.total_cmp(&a.distance));

        standings
            .into_iter()
            .filter_map(|entry| {
                let vehicle = participants.iter().find(|v| v.name() == entry.name)?;
                Some((entry, vehicle))
            })
            .enumerate()
            .map(|(index, (entry, vehicle))| RaceResult {
                position: index as u32 + 1,
                vehicle: vehicle.clone(),
                distance: round2(entry.distance),
                refuel_stops: entry
                    .history
                    .iter()
                    .filter(|action| action.contains(REFUEL_MARKER))
                    .count() as u32,
                history: entry.history.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_engine::vehicle::{NameRegistry, VehicleKind};

    fn fleet(names: &[&str]) -> Vec<Vehicle> {
        let mut registry = NameRegistry::new();
        names
            .iter()
            .map(|name| {
                Vehicle::new(
                    &mut registry,
                    name,
                    100.0,
                    50.0,
                    0.0,
                    VehicleKind::Truck { cargo_kg: 2000 },
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn initialize_creates_empty_entries() {
        let vehicles = fleet(&["Alpha", "Bravo"]);
        let mut telemetry = Telemetry::new();
        telemetry.initialize(&vehicles);

        assert_eq!(telemetry.len(), 2);
        assert_eq!(telemetry.history("Alpha"), Some(&[][..]));
        assert_eq!(telemetry.distance("Bravo"), Some(0.0));
    }

    #[test]
    fn unknown_vehicles_are_rejected() {
        let vehicles = fleet(&["Alpha"]);
        let mut telemetry = Telemetry::new();
        telemetry.initialize(&vehicles);

        assert_eq!(
            telemetry.record_action("Ghost", "Trip started"),
            Err(TelemetryError::UnknownVehicle("Ghost".into()))
        );
        assert!(telemetry.update_position("Ghost", 10.0).is_err());
    }

    #[test]
    fn ranks_by_distance_descending() {
        let vehicles = fleet(&["Alpha", "Bravo", "Charlie"]);
        let mut telemetry = Telemetry::new();
        telemetry.initialize(&vehicles);
        telemetry.update_position("Alpha", 1000.0).unwrap();
        telemetry.update_position("Bravo", 800.0).unwrap();
        telemetry.update_position("Charlie", 950.0).unwrap();

        let results = telemetry.compute_results(&vehicles);
        let order: Vec<(u32, &str, f64)> = results
            .iter()
            .map(|r| (r.position, r.name(), r.distance))
            .collect();

        assert_eq!(
            order,
            vec![
                (1, "Alpha", 1000.0),
                (2, "Charlie", 950.0),
                (3, "Bravo", 800.0)
            ]
        );
    }

    #[test]
    fn ties_keep_ledger_order() {
        let vehicles = fleet(&["Alpha", "Bravo", "Charlie"]);
        let mut telemetry = Telemetry::new();
        telemetry.initialize(&vehicles);
        telemetry.update_position("Charlie", 300.0).unwrap();
        telemetry.update_position("Bravo", 120.5).unwrap();
        telemetry.update_position("Alpha", 120.5).unwrap();

        let results = telemetry.compute_results(&vehicles);
        let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Charlie", "Alpha", "Bravo"]);
    }

    #[test]
    fn counts_refuel_stops_from_history() {
        let vehicles = fleet(&["Alpha"]);
        let mut telemetry = Telemetry::new();
        telemetry.initialize(&vehicles);
        telemetry.record_action("Alpha", "Segment: covered 20.00 km").unwrap();
        telemetry.record_action("Alpha", "Refuel: 40.00 L").unwrap();
        telemetry.record_action("Alpha", "Segment: covered 5.00 km").unwrap();
        telemetry.record_action("Alpha", "Refuel: 12.30 L").unwrap();

        let results = telemetry.compute_results(&vehicles);
        assert_eq!(results[0].refuel_stops, 2);
        assert_eq!(results[0].history.len(), 4);
    }

    #[test]
    fn skips_ledger_names_without_vehicle() {
        let vehicles = fleet(&["Alpha", "Bravo"]);
        let mut telemetry = Telemetry::new();
        telemetry.initialize(&vehicles);
        telemetry.update_position("Alpha", 50.0).unwrap();

        let results = telemetry.compute_results(&vehicles[1..]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name(), "Bravo");
        assert_eq!(results[0].position, 1);
    }
}
