//! Report - Text and JSON rendering of race results

use serde::Serialize;

use crate::race_engine::RaceResult;

/// Everything printed at the end of a race
#[derive(Debug, Clone, Serialize)]
pub struct RaceReport<'a> {
    pub race: &'a str,
    pub distance: f64,
    pub winner: Option<&'a str>,
    pub results: &'a [RaceResult],
}

impl<'a> RaceReport<'a> {
    pub fn new(race: &'a str, distance: f64, results: &'a [RaceResult]) -> Self {
        Self {
            race,
            distance,
            winner: results.first().map(RaceResult::name),
            results,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// `1 -> Name (1000.00 km)` per vehicle
    pub fn standings(&self) -> String {
        self.results
            .iter()
            .map(|result| {
                format!(
                    "{} -> {} ({:.2} km)\n",
                    result.position,
                    result.name(),
                    result.vehicle.odometer()
                )
            })
            .collect()
    }

    /// One summary line per result
    pub fn summaries(&self) -> String {
        self.results
            .iter()
            .map(|result| {
                format!(
                    "#{} {}: {:.2} km raced, {} refuel stops, {}\n",
                    result.position,
                    result.name(),
                    result.distance,
                    result.refuel_stops,
                    result.vehicle
                )
            })
            .collect()
    }

    /// Full action history per vehicle
    pub fn details(&self) -> String {
        let mut out = String::new();
        for result in self.results {
            out.push_str(&format!("{} -> {}\n", result.position, result.name()));
            for action in &result.history {
                out.push_str(&format!("  {}\n", action));
            }
            out.push('\n');
        }
        out
    }

    /// Complete text report
    pub fn render(&self) -> String {
        let mut out = format!("*** {} ({:.0} km) ***\n\n", self.race, self.distance);
        if let Some(winner) = self.winner {
            out.push_str(&format!("Congratulations {}!\n\n", winner));
        }
        out.push_str(&format!("* Standings:\n\n{}\n", self.standings()));
        out.push_str(&format!("* Summary:\n\n{}\n", self.summaries()));
        out.push_str(&format!("* Detailed history:\n\n{}", self.details()));
        out
    }
}
