//! Cell signals: scalar traits in [-1, 1] that evolve with simulation time.

use crate::error::{check_range, Result, SimulationError};
use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const SIGNAL_MIN: f64 = -1.0;
const SIGNAL_MAX: f64 = 1.0;

/// Signal kind names accepted in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignalName {
    Sinusoidal,
    Stochastic,
    StochasticSinusoidal,
    #[default]
    Gaussian,
    EMGaussian,
    Constant,
    /// Picks one of the concrete kinds at random.
    Random,
}

/// Raw signal parameters; only the fields relevant to `name` are read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    pub name: SignalName,
    pub initial_value: Option<f64>,
    pub period: Option<f64>,
    pub noise: Option<f64>,
    pub stochastic_weight: Option<f64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub k: Option<f64>,
}

impl SignalName {
    /// Every kind `Random` may resolve to.
    pub const CONCRETE: [SignalName; 6] = [
        SignalName::Sinusoidal,
        SignalName::Stochastic,
        SignalName::StochasticSinusoidal,
        SignalName::Gaussian,
        SignalName::EMGaussian,
        SignalName::Constant,
    ];
}

impl SignalParams {
    /// Checks that [`CellSignal::from_params`] will accept these
    /// parameters. For `Random`, every kind it may pick is checked.
    pub fn validate(&self) -> Result<()> {
        match self.name {
            SignalName::Random => {
                for name in SignalName::CONCRETE {
                    CellSignal::build(name, self)?;
                }
            }
            name => {
                CellSignal::build(name, self)?;
            }
        }
        Ok(())
    }
}

/// Deterministic sine component, period in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sine {
    pub period: f64,
}

impl Sine {
    pub fn new(period: f64) -> Result<Self> {
        if !(period > 0.0 && period.is_finite()) {
            return Err(SimulationError::config(format!(
                "signal period must be > 0, got {}",
                period
            )));
        }
        Ok(Self { period })
    }

    /// `sin(2π t / period)`
    pub fn sine(&self, current_seconds: u64) -> f64 {
        (2.0 * PI * current_seconds as f64 / self.period).sin()
    }
}

/// Uniform noise component around the signal's initial value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Noise {
    pub noise: f64,
}

impl Noise {
    pub fn new(noise: f64) -> Result<Self> {
        Ok(Self {
            noise: check_range("noise", noise, 0.0, 1.0)?,
        })
    }

    pub fn stochastic<R: Rng + ?Sized>(&self, initial_value: f64, rng: &mut R) -> f64 {
        let offset = if self.noise > 0.0 {
            rng.gen_range(-self.noise..=self.noise)
        } else {
            0.0
        };
        (initial_value + offset).clamp(SIGNAL_MIN, SIGNAL_MAX)
    }
}

/// The closed set of signal behaviours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalKind {
    Sinusoidal(Sine),
    Stochastic(Noise),
    /// Weighted blend of a sine and a noise component.
    StochasticSinusoidal {
        sine: Sine,
        noise: Noise,
        stochastic_weight: f64,
    },
    /// Gaussian random walk.
    Gaussian { mean: f64, std: f64 },
    /// Random walk with exponentially-modified Gaussian steps.
    EMGaussian { mean: f64, std: f64, k: f64 },
    Constant,
}

impl SignalKind {
    fn validate(&self) -> Result<()> {
        match *self {
            SignalKind::StochasticSinusoidal {
                stochastic_weight, ..
            } => {
                check_range("stochastic_weight", stochastic_weight, 0.0, 1.0)?;
            }
            SignalKind::Gaussian { std, .. } => positive("std", std)?,
            SignalKind::EMGaussian { std, k, .. } => {
                positive("std", std)?;
                positive("k", k)?;
            }
            SignalKind::Sinusoidal(_) | SignalKind::Stochastic(_) | SignalKind::Constant => {}
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::config(format!(
            "signal {} must be > 0, got {}",
            field, value
        )))
    }
}

/// A per-cell signal. Each cell owns its own copy; [`CellSignal::split`]
/// hands an independent copy to each child on division.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSignal {
    pub initial_value: f64,
    pub value: f64,
    pub kind: SignalKind,
}

impl Default for CellSignal {
    /// Constant signal at zero.
    fn default() -> Self {
        Self {
            initial_value: 0.0,
            value: 0.0,
            kind: SignalKind::Constant,
        }
    }
}

impl CellSignal {
    pub fn new(kind: SignalKind, initial_value: f64) -> Result<Self> {
        check_range("signal initial_value", initial_value, SIGNAL_MIN, SIGNAL_MAX)?;
        kind.validate()?;
        Ok(Self {
            initial_value,
            value: initial_value,
            kind,
        })
    }

    /// A signal that never changes. Used when a cell has no signal configured.
    pub fn constant(initial_value: f64) -> Result<Self> {
        Self::new(SignalKind::Constant, initial_value)
    }

    /// Builds a signal from raw parameters, using defaults for anything
    /// left out.
    pub fn from_params<R: Rng + ?Sized>(params: &SignalParams, rng: &mut R) -> Result<Self> {
        let name = match params.name {
            SignalName::Random => SignalName::CONCRETE[rng.gen_range(0..SignalName::CONCRETE.len())],
            name => name,
        };
        Self::build(name, params)
    }

    fn build(name: SignalName, params: &SignalParams) -> Result<Self> {
        let initial_value = params.initial_value.unwrap_or(0.0);
        let period = params.period.unwrap_or(3600.0);
        let noise = params.noise.unwrap_or(0.2);
        let stochastic_weight = params.stochastic_weight.unwrap_or(0.5);
        let mean = params.mean.unwrap_or(0.0);
        let std = params.std.unwrap_or(0.05);
        let k = params.k.unwrap_or(1.0);

        let kind = match name {
            SignalName::Sinusoidal => SignalKind::Sinusoidal(Sine::new(period)?),
            SignalName::Stochastic => SignalKind::Stochastic(Noise::new(noise)?),
            SignalName::StochasticSinusoidal => SignalKind::StochasticSinusoidal {
                sine: Sine::new(period)?,
                noise: Noise::new(noise)?,
                stochastic_weight,
            },
            SignalName::Gaussian => SignalKind::Gaussian { mean, std },
            SignalName::EMGaussian => SignalKind::EMGaussian { mean, std, k },
            SignalName::Constant | SignalName::Random => SignalKind::Constant,
        };
        Self::new(kind, initial_value)
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            SignalKind::Sinusoidal(_) => "Sinusoidal",
            SignalKind::Stochastic(_) => "Stochastic",
            SignalKind::StochasticSinusoidal { .. } => "StochasticSinusoidal",
            SignalKind::Gaussian { .. } => "Gaussian",
            SignalKind::EMGaussian { .. } => "EMGaussian",
            SignalKind::Constant => "Constant",
        }
    }

    /// Advances the signal to `current_seconds` of simulation time.
    pub fn oscillate<R: Rng + ?Sized>(&mut self, current_seconds: u64, rng: &mut R) {
        self.value = self.next_value(current_seconds, rng);
    }

    /// Computes the value the signal would take at `current_seconds`
    /// without storing it.
    pub fn next_value<R: Rng + ?Sized>(&self, current_seconds: u64, rng: &mut R) -> f64 {
        match self.kind {
            SignalKind::Sinusoidal(sine) => sine.sine(current_seconds),
            SignalKind::Stochastic(noise) => noise.stochastic(self.initial_value, rng),
            SignalKind::StochasticSinusoidal {
                sine,
                noise,
                stochastic_weight,
            } => {
                let stochastic = noise.stochastic(self.initial_value, rng);
                let sine = sine.sine(current_seconds);
                stochastic_weight * stochastic + (1.0 - stochastic_weight) * sine
            }
            SignalKind::Gaussian { mean, std } => {
                let z: f64 = StandardNormal.sample(rng);
                (self.value + mean + std * z).clamp(SIGNAL_MIN, SIGNAL_MAX)
            }
            SignalKind::EMGaussian { mean, std, k } => {
                let z: f64 = StandardNormal.sample(rng);
                let e: f64 = Exp1.sample(rng);
                // exponential term has mean k * std
                (self.value + mean + std * z + k * std * e).clamp(SIGNAL_MIN, SIGNAL_MAX)
            }
            SignalKind::Constant => self.initial_value,
        }
    }

    /// Independent copy carrying the current value and parameters.
    pub fn split(&self) -> Self {
        self.clone()
    }
}
