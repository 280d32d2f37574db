//! Stochastic building blocks: bounded Brownian motion, probability
//! curves and cell signals.

pub mod brownian;
pub mod curves;
pub mod signal;

pub use brownian::{bounded_brownian_motion, reflect_around_interval};
pub use curves::{Curve, CurveName, CurveParams};
pub use signal::{CellSignal, SignalKind, SignalName, SignalParams};
