//! Treatments: named pairs of division/death curves plus optional
//! disturbances applied when a colony switches regimen.

use crate::error::{check_range, Result};
use crate::scientific::{Curve, CurveParams, SignalParams};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Treatment parameters as they appear in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentParams {
    pub name: String,
    pub division_curve: CurveParams,
    pub death_curve: CurveParams,
    /// Parameters of a fresh signal given to every cell on switch
    pub signal_disturbance: Option<SignalParams>,
    /// Fitness memory forced onto every cell on switch
    pub fitness_memory_disturbance: Option<f64>,
}

impl Default for TreatmentParams {
    fn default() -> Self {
        Self {
            name: "Treatment".to_string(),
            division_curve: CurveParams::default(),
            death_curve: CurveParams::default(),
            signal_disturbance: None,
            fitness_memory_disturbance: None,
        }
    }
}

/// Immutable once built; cells share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Treatment {
    pub name: String,
    pub division_curve: Curve,
    pub death_curve: Curve,
    pub signal_disturbance: Option<SignalParams>,
    pub fitness_memory_disturbance: Option<f64>,
}

impl Treatment {
    pub fn new(name: impl Into<String>, division_curve: Curve, death_curve: Curve) -> Self {
        Self {
            name: name.into(),
            division_curve,
            death_curve,
            signal_disturbance: None,
            fitness_memory_disturbance: None,
        }
    }

    /// Untreated cells: division around 24h, death around 32h.
    pub fn control() -> Self {
        Self::new(
            "Control",
            Curve::Gaussian {
                mean: 24.0,
                std: 5.0,
            },
            Curve::Gaussian {
                mean: 32.0,
                std: 5.0,
            },
        )
    }

    pub fn with_signal_disturbance(mut self, params: SignalParams) -> Self {
        self.signal_disturbance = Some(params);
        self
    }

    pub fn with_fitness_memory_disturbance(mut self, fitness_memory: f64) -> Result<Self> {
        check_range("fitness_memory_disturbance", fitness_memory, 0.0, 1.0)?;
        self.fitness_memory_disturbance = Some(fitness_memory);
        Ok(self)
    }

    /// Builds a treatment from raw parameters, constructing both curves and
    /// checking the signal disturbance up front.
    pub fn from_params<R: Rng + ?Sized>(params: &TreatmentParams, rng: &mut R) -> Result<Self> {
        let mut treatment = Self::new(
            params.name.clone(),
            Curve::from_params(&params.division_curve, rng)?,
            Curve::from_params(&params.death_curve, rng)?,
        );
        if let Some(signal) = &params.signal_disturbance {
            signal.validate()?;
            treatment.signal_disturbance = Some(signal.clone());
        }
        if let Some(memory) = params.fitness_memory_disturbance {
            treatment = treatment.with_fitness_memory_disturbance(memory)?;
        }
        Ok(treatment)
    }

    /// Division probability at age `x` hours.
    pub fn division_chance(&self, x: f64) -> f64 {
        self.division_curve.cdf(x)
    }

    /// Death probability at age `x` hours.
    pub fn death_chance(&self, x: f64) -> f64 {
        self.death_curve.cdf(x)
    }
}

impl Default for Treatment {
    fn default() -> Self {
        Self::control()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scientific::{CurveName, SignalName};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_control_treatment() {
        let control = Treatment::control();
        assert_eq!(control.name, "Control");
        assert!((control.division_chance(24.0) - 0.5).abs() < 1e-9);
        assert!((control.death_chance(32.0) - 0.5).abs() < 1e-9);
        assert!(control.division_chance(0.0) < control.death_chance(40.0));
        assert!(control.signal_disturbance.is_none());
    }

    #[test]
    fn test_from_params_builds_curves() {
        let params = TreatmentParams {
            name: "TMZ".to_string(),
            division_curve: CurveParams {
                name: CurveName::Gamma,
                mean: Some(10.0),
                std: Some(2.0),
                a: Some(3.0),
                ..CurveParams::default()
            },
            death_curve: CurveParams::gaussian(50.0, 8.0),
            signal_disturbance: Some(SignalParams {
                name: SignalName::Sinusoidal,
                ..SignalParams::default()
            }),
            fitness_memory_disturbance: Some(0.2),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let treatment = Treatment::from_params(&params, &mut rng).unwrap();
        assert_eq!(treatment.name, "TMZ");
        assert_eq!(treatment.division_curve, Curve::Gamma { a: 3.0, mean: 10.0, std: 2.0 });
        assert_eq!(treatment.death_curve, Curve::Gaussian { mean: 50.0, std: 8.0 });
        assert_eq!(treatment.fitness_memory_disturbance, Some(0.2));
        assert!(treatment.signal_disturbance.is_some());
    }

    #[test]
    fn test_fitness_memory_disturbance_is_validated() {
        assert!(Treatment::control().with_fitness_memory_disturbance(1.5).is_err());
        let params = TreatmentParams {
            fitness_memory_disturbance: Some(-0.1),
            ..TreatmentParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(Treatment::from_params(&params, &mut rng).is_err());
    }

    #[test]
    fn test_bad_signal_disturbance_fails_at_construction() {
        let params = TreatmentParams {
            signal_disturbance: Some(SignalParams {
                name: SignalName::Stochastic,
                noise: Some(5.0),
                ..SignalParams::default()
            }),
            ..TreatmentParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(Treatment::from_params(&params, &mut rng).is_err());
    }

    #[test]
    fn test_params_from_yaml() {
        let yaml = "name: Drug\ndivision_curve:\n  name: Lognormal\n  mean: 5.0\n  std: 10.0\n  s: 0.4\n";
        let params: TreatmentParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(params.name, "Drug");
        assert_eq!(params.division_curve.name, CurveName::Lognormal);
        assert_eq!(params.death_curve, CurveParams::default());
    }
}
