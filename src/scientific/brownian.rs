//! Bounded Brownian motion used for fitness-trait inheritance.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Perturbs `current_value` with Gaussian noise and reflects the result back
/// into `[lower_bound, upper_bound]`.
pub fn bounded_brownian_motion<R: Rng + ?Sized>(
    current_value: f64,
    scale: f64,
    lower_bound: f64,
    upper_bound: f64,
    rng: &mut R,
) -> f64 {
    let new_value = brownian_motion(current_value, scale, rng);
    reflect_around_interval(new_value, lower_bound, upper_bound)
}

/// One Brownian step: `current_value + N(0, (1 - scale)^2)`.
///
/// `scale` must be in [0, 1]; at 1 the value is returned unchanged.
pub fn brownian_motion<R: Rng + ?Sized>(current_value: f64, scale: f64, rng: &mut R) -> f64 {
    debug_assert!((0.0..=1.0).contains(&scale), "scale {} not in [0, 1]", scale);
    let std_dev = (1.0 - scale).powi(2);
    let z: f64 = StandardNormal.sample(rng);
    current_value + std_dev * z
}

/// Folds `x` back into `[lower_bound, upper_bound]` as if the interval
/// edges were mirrors.
///
/// Requires `lower_bound <= upper_bound`. A single-point interval maps
/// everything onto that point.
pub fn reflect_around_interval(x: f64, lower_bound: f64, upper_bound: f64) -> f64 {
    debug_assert!(
        lower_bound <= upper_bound,
        "empty interval [{}, {}]",
        lower_bound,
        upper_bound
    );
    if (lower_bound..=upper_bound).contains(&x) {
        return x;
    }
    if upper_bound <= lower_bound {
        return lower_bound;
    }
    let interval = upper_bound - lower_bound;
    let period = 2.0 * interval;
    let amplitude = interval / 2.0;
    let shift = lower_bound + amplitude;
    let reflected = triangular_wave(x - shift, period, amplitude) + shift;
    reflected.clamp(lower_bound, upper_bound)
}

/// Triangle wave with the given period and amplitude, evaluated at `x`.
///
/// Passes through zero at `x = 0` rising, peaks at `x = period / 4`.
pub fn triangular_wave(x: f64, period: f64, amplitude: f64) -> f64 {
    let phase = (x - period / 4.0).rem_euclid(period);
    (4.0 * amplitude / period) * (phase - period / 2.0).abs() - amplitude
}
