//! Configuration system for CloVarS runs.
//!
//! Supports YAML configuration files with sensible defaults. The `run`
//! section is required and checked field by field before anything else
//! is deserialised, so a bad `delta` or `stop_conditions` is reported
//! with a precise message.

use crate::bio::TreatmentParams;
use crate::error::{Result, SimulationError};
use crate::scientific::SignalParams;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub well: WellConfig,
    #[serde(default)]
    pub colonies: Vec<ColonySpec>,
    #[serde(default)]
    pub output: OutputConfig,
    pub run: RunSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// RNG seed; a random one is drawn (and logged) when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Well geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellConfig {
    /// Well radius in micrometres
    pub well_radius: f64,
}

/// One entry of the colony list; expands into `copies` colonies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonySpec {
    /// Number of replicate colonies
    pub copies: usize,
    /// Seed cells per colony
    pub initial_size: usize,
    pub cells: CellSpec,
    /// Treatments keyed by the frame at which they start
    pub treatment_data: BTreeMap<u64, TreatmentParams>,
}

/// Attributes shared by every seed cell of a colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellSpec {
    pub radius: f64,
    pub max_speed: f64,
    pub fitness_memory: f64,
    pub linked_sister_inheritance: bool,
    /// Constant signal at zero when absent
    pub signal: Option<SignalParams>,
}

/// Output files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_folder: String,
    pub cell_csv_file_name: String,
    pub colony_csv_file_name: String,
    pub parameters_file_name: String,
    /// Truncate existing output files instead of refusing to start
    pub overwrite: bool,
}

/// Scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Seconds of simulated time per frame
    pub delta: u64,
    pub stop_conditions: StopConditions,
}

/// Stop conditions; an absent entry never triggers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StopConditions {
    pub stop_at_frame: Option<u64>,
    pub stop_at_single_colony_size: Option<usize>,
    pub stop_at_all_colonies_size: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Frames between population summaries (0 disables them)
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            well: WellConfig::default(),
            colonies: vec![ColonySpec::default()],
            output: OutputConfig::default(),
            run: RunSettings::default(),
            logging: LoggingConfig::default(),
            seed: None,
        }
    }
}

impl Default for WellConfig {
    fn default() -> Self {
        Self { well_radius: 1.0 }
    }
}

impl Default for ColonySpec {
    fn default() -> Self {
        Self {
            copies: 1,
            initial_size: 1,
            cells: CellSpec::default(),
            treatment_data: BTreeMap::new(),
        }
    }
}

impl Default for CellSpec {
    fn default() -> Self {
        Self {
            radius: 1.0,
            max_speed: 1.0,
            fitness_memory: 1.0,
            linked_sister_inheritance: false,
            signal: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_folder: ".".to_string(),
            cell_csv_file_name: "cells.csv".to_string(),
            colony_csv_file_name: "colonies.csv".to_string(),
            parameters_file_name: "params.json".to_string(),
            overwrite: true,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            delta: 3600,
            stop_conditions: StopConditions {
                stop_at_frame: Some(100),
                stop_at_single_colony_size: None,
                stop_at_all_colonies_size: None,
            },
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10,
            log_level: "info".to_string(),
        }
    }
}

impl RunSettings {
    /// Parses the `run` section, rejecting a missing or non-integer
    /// `delta` and a missing or non-mapping `stop_conditions`.
    pub fn from_yaml_value(value: &Value) -> Result<Self> {
        let mapping = value
            .as_mapping()
            .ok_or_else(|| SimulationError::config("run settings must be a mapping"))?;

        let delta = mapping
            .get("delta")
            .ok_or_else(|| SimulationError::config("delta parameter not found in run settings"))?;
        let delta = delta.as_u64().ok_or_else(|| {
            SimulationError::config(format!(
                "delta parameter must be a non-negative integer, not {}",
                describe(delta)
            ))
        })?;

        let stop_conditions = mapping.get("stop_conditions").ok_or_else(|| {
            SimulationError::config("stop_conditions parameter not found in run settings")
        })?;
        if !stop_conditions.is_mapping() {
            return Err(SimulationError::config(format!(
                "stop_conditions parameter must be a mapping, not {}",
                describe(stop_conditions)
            )));
        }
        let stop_conditions: StopConditions = serde_yaml::from_value(stop_conditions.clone())
            .map_err(|e| SimulationError::config(format!("invalid stop_conditions: {}", e)))?;

        Ok(Self {
            delta,
            stop_conditions,
        })
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "a negative integer",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(contents)?;
        let run = value
            .get("run")
            .ok_or_else(|| SimulationError::config("run settings not found"))?;
        RunSettings::from_yaml_value(run)?;
        let config: Config = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.run.delta == 0 {
            return Err(SimulationError::config("delta must be > 0"));
        }
        if !(self.well.well_radius > 0.0) {
            return Err(SimulationError::config("well_radius must be > 0"));
        }
        for (index, spec) in self.colonies.iter().enumerate() {
            let n = index + 1;
            if spec.copies == 0 {
                return Err(SimulationError::config(format!("colony {}: copies must be >= 1", n)));
            }
            if spec.initial_size == 0 {
                return Err(SimulationError::config(format!(
                    "colony {}: initial_size must be >= 1",
                    n
                )));
            }
            if !(spec.cells.radius > 0.0) {
                return Err(SimulationError::config(format!("colony {}: cell radius must be > 0", n)));
            }
            if !(spec.cells.max_speed >= 0.0) {
                return Err(SimulationError::config(format!(
                    "colony {}: cell max_speed must be >= 0",
                    n
                )));
            }
            crate::error::check_range("fitness_memory", spec.cells.fitness_memory, 0.0, 1.0)?;
            if let Some(signal) = &spec.cells.signal {
                signal.validate()?;
            }
            for params in spec.treatment_data.values() {
                if let Some(signal) = &params.signal_disturbance {
                    signal.validate()?;
                }
                if let Some(memory) = params.fitness_memory_disturbance {
                    crate::error::check_range("fitness_memory_disturbance", memory, 0.0, 1.0)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = Config::from_yaml_str("run:\n  delta: 1800\n  stop_conditions: {}\n").unwrap();
        assert_eq!(config.run.delta, 1800);
        assert_eq!(config.run.stop_conditions, StopConditions::default());
        assert_eq!(config.well.well_radius, 1.0);
        assert!(config.colonies.is_empty());
        assert_eq!(config.output.cell_csv_file_name, "cells.csv");
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
seed: 42
well:
  well_radius: 1500.0
colonies:
  - copies: 3
    initial_size: 2
    cells:
      max_speed: 0.02
      fitness_memory: 0.7
      signal:
        name: Sinusoidal
        period: 7200
    treatment_data:
      0:
        name: Control
      48:
        name: TMZ
        death_curve:
          name: EMGaussian
          mean: 20.0
          std: 4.0
          k: 1.5
run:
  delta: 3600
  stop_conditions:
    stop_at_frame: 96
    stop_at_single_colony_size: 500
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.colonies[0].copies, 3);
        assert_eq!(config.colonies[0].cells.radius, 1.0);
        assert_eq!(config.colonies[0].treatment_data.len(), 2);
        assert_eq!(config.colonies[0].treatment_data[&48].name, "TMZ");
        assert_eq!(config.run.stop_conditions.stop_at_frame, Some(96));
        assert_eq!(config.run.stop_conditions.stop_at_all_colonies_size, None);
    }

    #[test]
    fn test_run_settings_errors() {
        let missing_run = Config::from_yaml_str("seed: 1\n").unwrap_err();
        assert!(missing_run.to_string().contains("run settings not found"));

        let missing_delta = Config::from_yaml_str("run:\n  stop_conditions: {}\n").unwrap_err();
        assert!(missing_delta.to_string().contains("delta parameter not found"));

        let float_delta =
            Config::from_yaml_str("run:\n  delta: 1.5\n  stop_conditions: {}\n").unwrap_err();
        assert!(float_delta.to_string().contains("a float"));

        let text_delta =
            Config::from_yaml_str("run:\n  delta: \"60\"\n  stop_conditions: {}\n").unwrap_err();
        assert!(text_delta.to_string().contains("a string"));

        let missing_stop = Config::from_yaml_str("run:\n  delta: 60\n").unwrap_err();
        assert!(missing_stop.to_string().contains("stop_conditions parameter not found"));

        let list_stop =
            Config::from_yaml_str("run:\n  delta: 60\n  stop_conditions: [1, 2]\n").unwrap_err();
        assert!(list_stop.to_string().contains("must be a mapping"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.run.delta = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.colonies[0].copies = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.colonies[0].cells.fitness_memory = 1.2;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.well.well_radius = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_signal_parameters_rejected_on_load() {
        let yaml = r#"
colonies:
  - treatment_data:
      3:
        name: Drug
        signal_disturbance:
          name: Stochastic
          noise: 5.0
run:
  delta: 3600
  stop_conditions:
    stop_at_frame: 10
"#;
        let err = Config::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("noise"));

        let mut config = Config::default();
        config.colonies[0].cells.signal = Some(SignalParams {
            name: crate::scientific::SignalName::Sinusoidal,
            period: Some(-60.0),
            ..SignalParams::default()
        });
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.colonies[0].treatment_data.insert(
            0,
            TreatmentParams {
                fitness_memory_disturbance: Some(1.5),
                ..TreatmentParams::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clovars.yaml");
        let mut config = Config::default();
        config.seed = Some(7);
        config.save(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.seed, Some(7));
    }
}
