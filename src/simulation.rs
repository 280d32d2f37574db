//! Simulation facade: wires configuration, loaders, RNG and runner
//! together.

use crate::bio::{IdAllocator, Well};
use crate::config::Config;
use crate::error::Result;
use crate::loader::{ColonyLoader, WellLoader};
use crate::runner::{RunSummary, SimulationRunner};
use crate::writer::SimulationWriter;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// A fully initialised simulation: a populated well plus everything
/// needed to advance it.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub well: Well,
    pub config: Config,

    /// Next frame `step` will run
    pub frame: u64,

    // ID generation
    ids: IdAllocator,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl Simulation {
    /// Create a simulation, using the config seed or a fresh random one.
    pub fn new(config: Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::new_with_seed(config, seed)
    }

    /// Create a simulation with a specific seed for reproducibility.
    ///
    /// The seed is stored back into the config so the parameter snapshot
    /// is enough to replay the run.
    pub fn new_with_seed(mut config: Config, seed: u64) -> Result<Self> {
        config.validate()?;
        config.seed = Some(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ids = IdAllocator::new();

        let colonies = ColonyLoader::new(&config.colonies).load(&mut ids, &mut rng)?;
        let mut well = WellLoader::load(&config.well);
        well.set_initial_colonies(colonies, &mut rng);

        log::info!(
            "Simulation initialised: seed {}, {} colonies, {} cells",
            seed,
            well.len(),
            well.cell_count()
        );

        Ok(Self {
            well,
            config,
            frame: 0,
            ids,
            rng,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Total number of cells
    pub fn population(&self) -> usize {
        self.well.cell_count()
    }

    pub fn is_extinct(&self) -> bool {
        self.well.is_empty()
    }

    pub fn runner(&self) -> SimulationRunner {
        SimulationRunner::new(self.config.run.clone()).with_stats_interval(self.config.logging.stats_interval)
    }

    /// Writes the parameter snapshot, then runs the frame loop from
    /// frame 0 until a stop condition holds.
    pub fn run<W: SimulationWriter + ?Sized>(&mut self, writer: &mut W) -> Result<RunSummary> {
        writer.write_params(&self.config)?;
        let summary = self
            .runner()
            .run(writer, &mut self.well, &mut self.ids, &mut self.rng)?;
        // a stop condition ends the loop before the last frame's tick
        self.frame = summary.frames_run;
        Ok(summary)
    }

    /// Advances one frame without output or stop checks: regimen
    /// changes and fate decisions for every cell, then execution.
    pub fn step(&mut self) -> Result<()> {
        let delta = self.config.run.delta;
        let seconds = SimulationRunner::simulation_seconds(delta, self.frame);
        self.well
            .modify_colony_treatment_regimens(self.frame, &mut self.rng)?;
        self.well.set_cell_fate(delta);
        self.well.pass_time(delta, seconds, &mut self.ids, &mut self.rng);
        self.frame += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColonySpec, StopConditions};
    use crate::writer::NullWriter;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.well.well_radius = 500.0;
        config.colonies = vec![ColonySpec {
            copies: 3,
            initial_size: 2,
            ..ColonySpec::default()
        }];
        config.run.stop_conditions = StopConditions {
            stop_at_frame: Some(48),
            ..StopConditions::default()
        };
        config.logging.stats_interval = 0;
        config
    }

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new_with_seed(test_config(), 42).unwrap();
        assert_eq!(sim.well.len(), 3);
        assert_eq!(sim.population(), 6);
        assert_eq!(sim.seed(), 42);
        assert_eq!(sim.config.seed, Some(42));
        for cell in sim.well.cells() {
            assert!(sim.well.circle.distance_to(&cell.circle) <= 500.0 + 15.0);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = test_config();
        config.colonies[0].initial_size = 0;
        assert!(Simulation::new_with_seed(config, 1).is_err());
    }

    #[test]
    fn test_simulation_step() {
        let mut sim = Simulation::new_with_seed(test_config(), 42).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.frame, 1);
    }

    #[test]
    fn test_simulation_run() {
        let mut sim = Simulation::new_with_seed(test_config(), 42).unwrap();
        let summary = sim.run(&mut NullWriter).unwrap();
        assert_eq!(summary.frames_run, 48);
        assert_eq!(summary.final_cells, sim.population());
    }

    #[test]
    fn test_step_resumes_at_unticked_frame() {
        let mut sim = Simulation::new_with_seed(test_config(), 42).unwrap();
        let summary = sim.run(&mut NullWriter).unwrap();
        assert_eq!(summary.last_frame, 48);
        // frame 48 was written but its fates never ran
        assert_eq!(sim.frame, 48);
        sim.step().unwrap();
        assert_eq!(sim.frame, 49);

        let mut capped = Simulation::new_with_seed(test_config(), 42).unwrap();
        capped.config.run.stop_conditions.stop_at_frame = None;
        let summary = capped
            .runner()
            .with_max_iteration(10)
            .run(&mut NullWriter, &mut capped.well, &mut capped.ids, &mut capped.rng)
            .unwrap();
        assert_eq!(summary.stop_reason, crate::runner::StopReason::MaxIterations);
        assert_eq!(summary.frames_run, 10);
    }

    #[test]
    fn test_reproducibility() {
        let mut a = Simulation::new_with_seed(test_config(), 12345).unwrap();
        let mut b = Simulation::new_with_seed(test_config(), 12345).unwrap();
        for _ in 0..40 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.population(), b.population());
        let names_a: Vec<&str> = a.well.cells().map(|c| c.name.as_str()).collect();
        let names_b: Vec<&str> = b.well.cells().map(|c| c.name.as_str()).collect();
        assert_eq!(names_a, names_b);
        let xs_a: Vec<f64> = a.well.cells().map(|c| c.x()).collect();
        let xs_b: Vec<f64> = b.well.cells().map(|c| c.x()).collect();
        assert_eq!(xs_a, xs_b);
    }
}
