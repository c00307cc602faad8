//! Lot-level occupancy tallies

use serde::{Deserialize, Serialize};

use crate::fusion::ZoneAnalysis;

/// Occupancy statistics over one frame's zone verdicts
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OccupancySummary {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    /// Percentage in [0, 100]
    pub occupancy_rate: f64,
}

impl OccupancySummary {
    pub fn from_zones(zones: &[ZoneAnalysis]) -> Self {
        let total = zones.len();
        let occupied = zones.iter().filter(|zone| zone.occupied).count();
        let occupancy_rate = if total > 0 {
            occupied as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total,
            occupied,
            available: total - occupied,
            occupancy_rate,
        }
    }

    /// Rate rounded to one decimal, as reported to clients
    pub fn rounded_rate(&self) -> f64 {
        (self.occupancy_rate * 10.0).round() / 10.0
    }
}
