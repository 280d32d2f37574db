//! Simulation output: a JSON snapshot of the parameters plus one CSV row
//! per cell and per colony for every frame.

use crate::bio::{Cell, Colony, Well};
use crate::config::{Config, OutputConfig};
use crate::error::{Result, SimulationError};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CELL_CSV_HEADER: &str = "index,id,name,branch_name,colony_name,generation,x,y,radius,signal_value,seconds_since_birth,fate_at_next_frame,treatment_name,death_threshold,division_threshold,fitness_memory,simulation_frames,simulation_seconds,simulation_hours,simulation_days";

pub const COLONY_CSV_HEADER: &str = "index,id,name,size,seconds_since_birth,signal_mean,signal_std,simulation_frames,simulation_seconds,simulation_hours,simulation_days";

/// Sink for everything a run produces.
pub trait SimulationWriter {
    /// Called once, before the first frame.
    fn write_params(&mut self, config: &Config) -> Result<()>;

    /// Called once per frame, after fates are decided and before they run.
    fn write_frame(&mut self, well: &Well, current_frame: u64, simulation_seconds: u64) -> Result<()>;
}

/// Discards all output.
#[derive(Debug, Default)]
pub struct NullWriter;

impl SimulationWriter for NullWriter {
    fn write_params(&mut self, _config: &Config) -> Result<()> {
        Ok(())
    }

    fn write_frame(&mut self, _well: &Well, _current_frame: u64, _simulation_seconds: u64) -> Result<()> {
        Ok(())
    }
}

/// Writes `params.json`, `cells.csv` and `colonies.csv` into the output
/// folder.
pub struct CsvWriter {
    cells: BufWriter<File>,
    colonies: BufWriter<File>,
    parameters_path: PathBuf,
    cell_index: u64,
    colony_index: u64,
}

impl CsvWriter {
    /// Creates the output folder and files and writes both CSV headers.
    ///
    /// Existing files are truncated when `overwrite` is set; otherwise
    /// their presence is a configuration error.
    pub fn create(settings: &OutputConfig) -> Result<Self> {
        let folder = Path::new(&settings.output_folder);
        std::fs::create_dir_all(folder)?;
        let cell_path = folder.join(&settings.cell_csv_file_name);
        let colony_path = folder.join(&settings.colony_csv_file_name);
        let parameters_path = folder.join(&settings.parameters_file_name);

        if !settings.overwrite {
            let existing: Vec<String> = [&cell_path, &colony_path, &parameters_path]
                .iter()
                .filter(|path| path.exists())
                .map(|path| path.display().to_string())
                .collect();
            if !existing.is_empty() {
                return Err(SimulationError::config(format!(
                    "output files already exist and overwrite is disabled: {}",
                    existing.join(", ")
                )));
            }
        }

        let mut cells = BufWriter::new(File::create(&cell_path)?);
        let mut colonies = BufWriter::new(File::create(&colony_path)?);
        writeln!(cells, "{}", CELL_CSV_HEADER)?;
        writeln!(colonies, "{}", COLONY_CSV_HEADER)?;
        log::debug!("Writing output to {}", folder.display());

        Ok(Self {
            cells,
            colonies,
            parameters_path,
            cell_index: 0,
            colony_index: 0,
        })
    }

    fn write_cell(&mut self, cell: &Cell, time: &FrameTime) -> Result<()> {
        writeln!(
            self.cells,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.cell_index,
            cell.id,
            csv_field(&cell.name),
            csv_field(cell.branch_name()),
            csv_field(cell.colony_name()),
            cell.generation(),
            cell.x(),
            cell.y(),
            cell.radius(),
            cell.signal_value(),
            cell.seconds_since_birth,
            cell.fate,
            csv_field(&cell.treatment.name),
            cell.death_threshold,
            cell.division_threshold,
            cell.fitness_memory,
            time,
        )?;
        self.cell_index += 1;
        Ok(())
    }

    fn write_colony(&mut self, colony: &Colony, time: &FrameTime) -> Result<()> {
        writeln!(
            self.colonies,
            "{},{},{},{},{},{},{},{}",
            self.colony_index,
            colony.id,
            csv_field(colony.name().unwrap_or("")),
            colony.len(),
            colony.seconds_since_birth,
            colony.signal_mean(),
            colony.signal_std(),
            time,
        )?;
        self.colony_index += 1;
        Ok(())
    }
}

impl SimulationWriter for CsvWriter {
    fn write_params(&mut self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.parameters_path, json)?;
        Ok(())
    }

    fn write_frame(&mut self, well: &Well, current_frame: u64, simulation_seconds: u64) -> Result<()> {
        let time = FrameTime {
            frame: current_frame,
            seconds: simulation_seconds,
        };
        for cell in well.cells() {
            self.write_cell(cell, &time)?;
        }
        for colony in well {
            self.write_colony(colony, &time)?;
        }
        self.cells.flush()?;
        self.colonies.flush()?;
        Ok(())
    }
}

/// Quotes a text field when it contains a separator, quote or line
/// break, doubling inner quotes (RFC 4180).
fn csv_field(text: &str) -> Cow<'_, str> {
    if text.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

/// Trailing time columns shared by both tables.
struct FrameTime {
    frame: u64,
    seconds: u64,
}

impl std::fmt::Display for FrameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seconds = self.seconds as f64;
        write!(
            f,
            "{},{},{},{}",
            self.frame,
            self.seconds,
            seconds / 3600.0,
            seconds / 86_400.0
        )
    }
}
