//! # CloVarS
//!
//! Clonal variability simulator: stochastic growth of cell colonies
//! inside a well.
//!
//! ## Features
//!
//! - **Stochastic fates**: every cell migrates, divides or dies according
//!   to age-dependent probability curves and its own fixed thresholds
//! - **Inheritance**: children perturb their parent's thresholds through
//!   bounded Brownian motion scaled by fitness memory
//! - **Treatments**: colonies switch curves, signals and fitness memory
//!   on scheduled frames
//! - **Reproducible**: seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use clovars::{Config, CsvWriter, Simulation};
//!
//! let config = Config::default();
//! let mut writer = CsvWriter::create(&config.output).unwrap();
//! let mut simulation = Simulation::new(config).unwrap();
//!
//! let summary = simulation.run(&mut writer).unwrap();
//! println!("Stopped after {} frames: {}", summary.frames_run, summary.stop_reason);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use clovars::Config;
//!
//! let mut config = Config::default();
//! config.well.well_radius = 1500.0;
//! config.colonies[0].copies = 10;
//! config.run.stop_conditions.stop_at_frame = Some(120);
//! assert!(config.validate().is_ok());
//! ```

pub mod bio;
pub mod circle;
pub mod config;
pub mod error;
pub mod loader;
pub mod runner;
pub mod scientific;
pub mod simulation;
pub mod stats;
pub mod writer;

// Re-export main types
pub use bio::{Cell, Colony, Fate, Treatment, Well};
pub use config::Config;
pub use error::{Result, SimulationError};
pub use runner::{RunSummary, SimulationRunner, StopReason};
pub use simulation::Simulation;
pub use writer::{CsvWriter, NullWriter, SimulationWriter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark: `colonies` single-cell colonies under the
/// control treatment, one hour per frame, no output.
pub fn benchmark(frames: u64, colonies: usize) -> Result<BenchmarkResult> {
    use std::time::Instant;

    let mut config = Config::default();
    config.well.well_radius = 2000.0;
    config.colonies[0].copies = colonies;
    config.run.stop_conditions = config::StopConditions {
        stop_at_frame: Some(frames),
        ..Default::default()
    };
    config.logging.stats_interval = 0;

    let mut simulation = Simulation::new(config)?;
    let initial_cells = simulation.population();

    let start = Instant::now();
    let summary = simulation.run(&mut NullWriter)?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        frames: summary.frames_run,
        initial_cells,
        final_cells: summary.final_cells,
        elapsed_secs: elapsed.as_secs_f64(),
        frames_per_second: summary.frames_run as f64 / elapsed.as_secs_f64(),
        max_generation: simulation
            .well
            .cells()
            .map(Cell::generation)
            .max()
            .unwrap_or(0),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub frames: u64,
    pub initial_cells: usize,
    pub final_cells: usize,
    pub elapsed_secs: f64,
    pub frames_per_second: f64,
    pub max_generation: usize,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Frames: {}", self.frames)?;
        writeln!(f, "Cells: {} -> {}", self.initial_cells, self.final_cells)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} frames/s", self.frames_per_second)?;
        writeln!(f, "Max generation: {}", self.max_generation)?;
        Ok(())
    }
}
