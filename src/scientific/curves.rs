//! Probability curves converting a cell's age (in hours) into a chance.
//!
//! All curves follow the location/scale convention: the standard form of
//! the distribution is evaluated at `(x - mean) / std`.

use crate::error::{Result, SimulationError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma, LogNormal};
use statrs::function::erf::erfc;
use std::f64::consts::{PI, SQRT_2};

/// Curve family names accepted in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurveName {
    #[default]
    Gaussian,
    EMGaussian,
    Gamma,
    Lognormal,
    /// Picks one of the concrete families at random.
    Random,
}

/// Raw curve parameters as they appear in configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveParams {
    pub name: CurveName,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub k: Option<f64>,
    pub a: Option<f64>,
    pub s: Option<f64>,
}

impl CurveParams {
    pub fn gaussian(mean: f64, std: f64) -> Self {
        Self {
            name: CurveName::Gaussian,
            mean: Some(mean),
            std: Some(std),
            ..Self::default()
        }
    }
}

/// A continuous distribution whose CDF is read as a probability at age `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Gaussian { mean: f64, std: f64 },
    EMGaussian { k: f64, mean: f64, std: f64 },
    Gamma { a: f64, mean: f64, std: f64 },
    Lognormal { s: f64, mean: f64, std: f64 },
}

impl Curve {
    /// Builds a curve from raw parameters, filling in defaults
    /// (`mean = 0`, `std = 1`, `k = a = s = 1`).
    pub fn from_params<R: Rng + ?Sized>(params: &CurveParams, rng: &mut R) -> Result<Self> {
        let mean = params.mean.unwrap_or(0.0);
        let std = params.std.unwrap_or(1.0);
        let k = params.k.unwrap_or(1.0);
        let a = params.a.unwrap_or(1.0);
        let s = params.s.unwrap_or(1.0);

        let curve = match params.name {
            CurveName::Random => {
                const CONCRETE: [CurveName; 4] = [
                    CurveName::Gaussian,
                    CurveName::EMGaussian,
                    CurveName::Gamma,
                    CurveName::Lognormal,
                ];
                let name = CONCRETE[rng.gen_range(0..CONCRETE.len())];
                return Self::from_params(&CurveParams { name, ..params.clone() }, rng);
            }
            CurveName::Gaussian => Curve::Gaussian { mean, std },
            CurveName::EMGaussian => Curve::EMGaussian { k, mean, std },
            CurveName::Gamma => Curve::Gamma { a, mean, std },
            CurveName::Lognormal => Curve::Lognormal { s, mean, std },
        };
        curve.validate()?;
        Ok(curve)
    }

    fn validate(&self) -> Result<()> {
        let (std, shape) = match *self {
            Curve::Gaussian { std, .. } => (std, None),
            Curve::EMGaussian { k, std, .. } => (std, Some(("k", k))),
            Curve::Gamma { a, std, .. } => (std, Some(("a", a))),
            Curve::Lognormal { s, std, .. } => (std, Some(("s", s))),
        };
        if !(std > 0.0 && std.is_finite()) {
            return Err(SimulationError::config(format!(
                "{} curve std must be > 0, got {}",
                self.name(),
                std
            )));
        }
        if let Some((label, value)) = shape {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimulationError::config(format!(
                    "{} curve {} must be > 0, got {}",
                    self.name(),
                    label,
                    value
                )));
            }
        }
        Ok(())
    }

    /// Family name
    pub fn name(&self) -> &'static str {
        match self {
            Curve::Gaussian { .. } => "Gaussian",
            Curve::EMGaussian { .. } => "EMGaussian",
            Curve::Gamma { .. } => "Gamma",
            Curve::Lognormal { .. } => "Lognormal",
        }
    }

    /// Cumulative distribution function at `x`, always in [0, 1].
    pub fn cdf(&self, x: f64) -> f64 {
        debug_assert!(self.validate().is_ok(), "invalid curve {:?}", self);
        let value = match *self {
            Curve::Gaussian { mean, std } => std_normal_cdf((x - mean) / std),
            Curve::EMGaussian { k, mean, std } => emg_cdf((x - mean) / std, k),
            Curve::Gamma { a, mean, std } => match Gamma::new(a, 1.0) {
                Ok(gamma) => gamma.cdf((x - mean) / std),
                Err(_) => 0.0,
            },
            Curve::Lognormal { s, mean, std } => {
                let z = (x - mean) / std;
                if z <= 0.0 {
                    0.0
                } else {
                    std_normal_cdf(z.ln() / s)
                }
            }
        };
        value.clamp(0.0, 1.0)
    }

    /// Probability density function at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        debug_assert!(self.validate().is_ok(), "invalid curve {:?}", self);
        match *self {
            Curve::Gaussian { mean, std } => std_normal_pdf((x - mean) / std) / std,
            Curve::EMGaussian { k, mean, std } => emg_pdf((x - mean) / std, k) / std,
            Curve::Gamma { a, mean, std } => {
                let z = (x - mean) / std;
                if z < 0.0 {
                    return 0.0;
                }
                match Gamma::new(a, 1.0) {
                    Ok(gamma) => gamma.pdf(z) / std,
                    Err(_) => 0.0,
                }
            }
            Curve::Lognormal { s, mean, std } => {
                let z = (x - mean) / std;
                match LogNormal::new(0.0, s) {
                    Ok(lognormal) if z > 0.0 => lognormal.pdf(z) / std,
                    _ => 0.0,
                }
            }
        }
    }
}

fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Standardised exponentially-modified Gaussian CDF with shape `k`
/// (`k = 1 / (std * rate)`).
///
/// The correction term is computed in log space.
fn emg_cdf(z: f64, k: f64) -> f64 {
    let inv_k = 1.0 / k;
    let exponent = 0.5 * inv_k * inv_k - z * inv_k;
    let tail = std_normal_cdf(z - inv_k);
    let correction = if tail > 0.0 {
        (exponent + tail.ln()).exp()
    } else {
        0.0
    };
    std_normal_cdf(z) - correction
}

fn emg_pdf(z: f64, k: f64) -> f64 {
    let inv_k = 1.0 / k;
    let exponent = 0.5 * inv_k * inv_k - z * inv_k;
    let tail = std_normal_cdf(z - inv_k);
    if tail > 0.0 {
        inv_k * (exponent + tail.ln()).exp()
    } else {
        0.0
    }
}
