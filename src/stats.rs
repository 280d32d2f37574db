//! Statistics tracking for the simulation.

use crate::bio::{Fate, Well};
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a simulation frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Current simulation frame
    pub frame: u64,
    /// Simulated seconds at this frame
    pub simulation_seconds: u64,
    /// Number of living colonies
    pub colonies: usize,
    /// Total cell count
    pub cells: usize,
    pub largest_colony: usize,
    /// Deepest generation present
    pub generation_max: usize,
    /// Mean signal value across all cells
    pub signal_mean: f64,
    pub division_threshold_mean: f64,
    pub death_threshold_mean: f64,
    /// Cells about to divide on the next tick
    pub dividing: usize,
    /// Cells about to die on the next tick
    pub dying: usize,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats from the current well state
    pub fn update(&mut self, well: &Well, frame: u64, simulation_seconds: u64) {
        self.frame = frame;
        self.simulation_seconds = simulation_seconds;
        self.colonies = well.len();
        self.cells = well.cell_count();
        self.largest_colony = well.largest_colony_size().unwrap_or(0);

        if self.cells == 0 {
            self.generation_max = 0;
            self.signal_mean = 0.0;
            self.division_threshold_mean = 0.0;
            self.death_threshold_mean = 0.0;
            self.dividing = 0;
            self.dying = 0;
            return;
        }

        let n = self.cells as f64;
        let mut generation_max = 0;
        let (mut signal, mut division, mut death) = (0.0, 0.0, 0.0);
        let (mut dividing, mut dying) = (0, 0);
        for cell in well.cells() {
            generation_max = generation_max.max(cell.generation());
            signal += cell.signal_value();
            division += cell.division_threshold;
            death += cell.death_threshold;
            match cell.fate {
                Fate::Division => dividing += 1,
                Fate::Death => dying += 1,
                Fate::Migration => {}
            }
        }
        self.generation_max = generation_max;
        self.signal_mean = signal / n;
        self.division_threshold_mean = division / n;
        self.death_threshold_mean = death / n;
        self.dividing = dividing;
        self.dying = dying;
    }

    /// One-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "F:{:5} | {:7.1}h | Col:{:4} | Cells:{:6} | Max:{:5} | Gen:{:3} | Sig:{:+.2} | Div:{} Die:{}",
            self.frame,
            self.simulation_seconds as f64 / 3600.0,
            self.colonies,
            self.cells,
            self.largest_colony,
            self.generation_max,
            self.signal_mean,
            self.dividing,
            self.dying,
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stats snapshot
    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    pub fn last(&self) -> Option<&Stats> {
        self.snapshots.last()
    }

    /// Cell count over frames
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.frame, s.cells)).collect()
    }

    /// Deepest generation over frames
    pub fn generation_series(&self) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.frame, s.generation_max))
            .collect()
    }
}
