//! The discrete-time scheduler driving a well to termination.

use crate::bio::{IdAllocator, Well};
use crate::config::{RunSettings, StopConditions};
use crate::error::Result;
use crate::stats::{Stats, StatsHistory};
use crate::writer::SimulationWriter;
use rand::Rng;
use std::fmt;

/// Hard cap on iterations, whatever the stop conditions say.
pub const MAX_ITERATION: u64 = 10_000;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `stop_at_frame` reached
    FrameLimit(u64),
    /// Some colony reached `stop_at_single_colony_size`
    SingleColonySize(usize),
    /// Every colony reached `stop_at_all_colonies_size`
    AllColoniesSize(usize),
    /// No stop condition met before the iteration cap
    MaxIterations,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FrameLimit(limit) => write!(f, "the current frame is >= {}", limit),
            StopReason::SingleColonySize(limit) => write!(f, "a colony size is >= {}", limit),
            StopReason::AllColoniesSize(limit) => write!(f, "all colony sizes are >= {}", limit),
            StopReason::MaxIterations => write!(f, "no stop condition met within the iteration cap"),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of ticks executed (`pass_time` calls)
    pub frames_run: u64,
    /// Last frame written to output
    pub last_frame: u64,
    pub stop_reason: StopReason,
    pub final_colonies: usize,
    pub final_cells: usize,
    /// Snapshots taken every `stats_interval` frames, plus the last one
    pub history: StatsHistory,
}

/// Runs the frame loop: regimen changes, fate decisions, output, stop
/// check, then time passes.
#[derive(Debug, Clone)]
pub struct SimulationRunner {
    settings: RunSettings,
    stats_interval: u64,
    max_iteration: u64,
}

impl SimulationRunner {
    pub fn new(settings: RunSettings) -> Self {
        Self {
            settings,
            stats_interval: 0,
            max_iteration: MAX_ITERATION,
        }
    }

    /// Log and record a [`Stats`] snapshot every `interval` frames (0 disables).
    pub fn with_stats_interval(mut self, interval: u64) -> Self {
        self.stats_interval = interval;
        self
    }

    /// Lower the iteration cap.
    pub fn with_max_iteration(mut self, max_iteration: u64) -> Self {
        self.max_iteration = max_iteration.min(MAX_ITERATION);
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn simulation_seconds(delta: u64, current_frame: u64) -> u64 {
        delta * current_frame
    }

    pub fn simulation_hours(delta: u64, current_frame: u64) -> f64 {
        Self::simulation_seconds(delta, current_frame) as f64 / 3600.0
    }

    /// Runs until a stop condition holds or the iteration cap is hit.
    pub fn run<W, R>(
        &self,
        writer: &mut W,
        well: &mut Well,
        ids: &mut IdAllocator,
        rng: &mut R,
    ) -> Result<RunSummary>
    where
        W: SimulationWriter + ?Sized,
        R: Rng + ?Sized,
    {
        let delta = self.settings.delta;
        let mut history = StatsHistory::new();
        let mut stats = Stats::new();
        let mut frames_run = 0;
        let mut last_frame = 0;
        let mut stop_reason = StopReason::MaxIterations;

        for current_frame in 0..self.max_iteration {
            let simulation_seconds = Self::simulation_seconds(delta, current_frame);
            log::debug!(
                "Current frame: {} ({:.2} h)",
                current_frame,
                Self::simulation_hours(delta, current_frame)
            );
            well.modify_colony_treatment_regimens(current_frame, rng)?;
            well.set_cell_fate(delta);
            writer.write_frame(well, current_frame, simulation_seconds)?;
            last_frame = current_frame;

            if self.stats_interval > 0 && current_frame % self.stats_interval == 0 {
                stats.update(well, current_frame, simulation_seconds);
                log::info!("{}", stats.summary());
                history.record(stats.clone());
            }

            if let Some(reason) = self.reached_stop_condition(well, current_frame) {
                log::info!("Reached stop condition: {}", reason);
                stop_reason = reason;
                break;
            }
            well.pass_time(delta, simulation_seconds, ids, rng);
            frames_run += 1;
        }

        if stop_reason == StopReason::MaxIterations {
            log::info!(
                "No stop condition met, ran for {} iterations",
                self.max_iteration
            );
        }

        if history.last().map(|s| s.frame) != Some(last_frame) {
            stats.update(well, last_frame, Self::simulation_seconds(delta, last_frame));
            history.record(stats);
        }

        Ok(RunSummary {
            frames_run,
            last_frame,
            stop_reason,
            final_colonies: well.len(),
            final_cells: well.cell_count(),
            history,
        })
    }

    /// First stop condition that holds, checked in the order frame,
    /// single colony, all colonies.
    pub fn reached_stop_condition(&self, well: &Well, current_frame: u64) -> Option<StopReason> {
        let StopConditions {
            stop_at_frame,
            stop_at_single_colony_size,
            stop_at_all_colonies_size,
        } = self.settings.stop_conditions;

        if let Some(limit) = stop_at_frame {
            if Self::reached_frame_limit(current_frame, limit) {
                return Some(StopReason::FrameLimit(limit));
            }
        }
        if let Some(limit) = stop_at_single_colony_size {
            if Self::reached_single_colony_size_limit(well.largest_colony_size(), limit) {
                return Some(StopReason::SingleColonySize(limit));
            }
        }
        if let Some(limit) = stop_at_all_colonies_size {
            if Self::reached_all_colonies_size_limit(&well.colony_sizes(), limit) {
                return Some(StopReason::AllColoniesSize(limit));
            }
        }
        None
    }

    pub fn reached_frame_limit(current_frame: u64, frame_limit: u64) -> bool {
        current_frame >= frame_limit
    }

    /// False when there are no colonies.
    pub fn reached_single_colony_size_limit(largest_colony_size: Option<usize>, limit: usize) -> bool {
        largest_colony_size.is_some_and(|size| size >= limit)
    }

    /// True when there are no colonies: an empty well has nothing left
    /// to grow.
    pub fn reached_all_colonies_size_limit(colony_sizes: &[usize], limit: usize) -> bool {
        colony_sizes.iter().all(|&size| size >= limit)
    }
}
