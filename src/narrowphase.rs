//! Narrow-Phase Refiner (NR): given a candidate pair flagged at a grid
//! time, finds the pair's true minimum separation in the continuous
//! interval bracketing that grid time, by directed binary subdivision.

use crate::config::Config;
use crate::time::Instant;
use crate::trajectory::Propagator;

/// One refined conjunction: the continuous-time instant of closest
/// approach and the minimum separation found there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConjunctionEvent {
    pub time: Instant,
    pub min_distance_km: f64,
}

/// Distance between two propagators at `at`, treating a propagator failure
/// at either end as `+infinity` so the subdivision always has a defined
/// direction to walk toward (spec §4.4 contract).
fn separation(a: &Propagator, b: &Propagator, at: Instant) -> f64 {
    match (a.position_at(at), b.position_at(at)) {
        (Some(pa), Some(pb)) => crate::broadphase::euclidean_distance(pa, pb),
        _ => f64::INFINITY,
    }
}

/// Directed binary subdivision (spec §4.4 algorithm).
///
/// Maintains `[t_lo, t_hi]`; at each step evaluates the midpoint and a
/// 1-second-earlier probe, and recurses into whichever half the slope
/// points into. Terminates once the bracket is under one second wide (or
/// the configured tolerance).
fn subdivide(a: &Propagator, b: &Propagator, mut lo: Instant, mut hi: Instant, tolerance_seconds: f64) -> ConjunctionEvent {
    loop {
        if lo.diff_seconds(hi).abs() < tolerance_seconds {
            return ConjunctionEvent { time: lo, min_distance_km: separation(a, b, lo) };
        }
        let mid = lo.midpoint(hi);
        let d_mid = separation(a, b, mid);
        let left = mid.add_seconds(-1.0);
        let d_left = separation(a, b, left);

        if d_left < d_mid {
            hi = mid;
        } else {
            lo = mid;
        }
    }
}

/// Refine a candidate pair/time into its continuous-time minimum
/// separation, bracketing the grid time with a symmetric window of
/// `config.refine_window_seconds`.
///
/// If every probe in the bracket fails (propagator returns a nonzero
/// status throughout), returns `(t_m, +infinity)` and leaves it to the
/// caller to drop the pair (spec §4.4 contract).
#[tracing::instrument(skip(a, b, config))]
pub fn refine(a: &Propagator, b: &Propagator, at_grid_time: Instant, config: &Config) -> ConjunctionEvent {
    let lo = at_grid_time.add_seconds(-config.refine_window_seconds);
    let hi = at_grid_time.add_seconds(config.refine_window_seconds);
    subdivide(a, b, lo, hi, config.refine_tolerance_seconds)
}
