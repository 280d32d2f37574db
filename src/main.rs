//! CloVarS - CLI Entry Point
//!
//! Clonal variability simulator.

use clap::{Parser, Subcommand};
use clovars::{benchmark, Config, CsvWriter, Simulation};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "clovars")]
#[command(version)]
#[command(about = "Clonal variability simulator: stochastic growth of cell colonies")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output directory for params.json, cells.csv and colonies.csv
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (warnings and errors only)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of frames
        #[arg(short, long, default_value = "200")]
        frames: u64,

        /// Number of seed colonies
        #[arg(short, long, default_value = "100")]
        colonies: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output,
            seed,
            quiet,
        } => run_simulation(config, output, seed, quiet),

        Commands::Benchmark { frames, colonies } => {
            init_logging("warn");
            run_benchmark(frames, colonies)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn run_simulation(
    config_path: PathBuf,
    output: Option<PathBuf>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let (mut config, source) = if config_path.exists() {
        (Config::from_file(&config_path)?, format!("{:?}", config_path))
    } else {
        (Config::default(), "defaults".to_string())
    };

    let level = if quiet { "warn" } else { config.logging.log_level.as_str() };
    init_logging(level);
    log::info!("Loaded configuration from {}", source);

    if let Some(output) = output {
        config.output.output_folder = output.to_string_lossy().to_string();
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let mut writer = CsvWriter::create(&config.output)?;
    let mut simulation = Simulation::new(config)?;

    if !quiet {
        println!("Starting simulation");
        println!("  Seed: {}", simulation.seed());
        println!("  Colonies: {}", simulation.well.len());
        println!("  Cells: {}", simulation.population());
        println!("  Delta: {}s", simulation.config.run.delta);
        println!();
    }

    let start = Instant::now();
    let summary = simulation.run(&mut writer)?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Frames: {}", summary.frames_run);
    println!("Stopped: {}", summary.stop_reason);
    println!("Final colonies: {}", summary.final_colonies);
    println!("Final cells: {}", summary.final_cells);
    println!("Output: {}", simulation.config.output.output_folder);

    Ok(())
}

fn run_benchmark(frames: u64, colonies: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== CloVarS Benchmark ===");
    println!("Frames: {}", frames);
    println!("Colonies: {}", colonies);
    println!();

    let result = benchmark(frames, colonies)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
