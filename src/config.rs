//! Pipeline configuration.
//!
//! A plain, immutable struct mirroring the enumerated configuration table.
//! Constructed once at pipeline start and passed by reference to every
//! component; no global mutable state.

use crate::error::{ConjunctionError, Result};
use crate::time::Instant;

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Total forward propagation span, in minutes.
    pub horizon_minutes: f64,
    /// Grid step, in minutes.
    pub interval_minutes: f64,
    /// Broad-phase threshold `D`, in km.
    pub collision_distance_km: f64,
    /// Spatial-hash cell side `B`, in km. Must satisfy `B >= D`.
    pub box_size_km: f64,
    /// Julian date of the grid origin.
    pub start_time: Instant,
    /// Narrow-phase bracket half-width `W`, in seconds.
    pub refine_window_seconds: f64,
    /// Narrow-phase convergence threshold, in seconds.
    pub refine_tolerance_seconds: f64,
    /// Number of ranked pairs to emit.
    pub top_k: usize,
    /// Reject pairs whose exact distance is `0` (data-duplication hygiene
    /// rule) — always on by default, but configurable per spec §9.
    pub filter_zero_distance: bool,
}

impl Config {
    /// Number of grid steps, `floor(horizon_minutes / interval_minutes)`.
    pub fn num_steps(&self) -> usize {
        (self.horizon_minutes / self.interval_minutes).floor() as usize
    }

    /// Validate cross-field invariants the rest of the pipeline relies on.
    ///
    /// `box_size_km >= collision_distance_km` must hold for the 6-neighbor
    /// broad-phase gathering to be complete (spec §9, open question 2).
    pub fn validate(&self) -> Result<()> {
        if self.box_size_km < self.collision_distance_km {
            return Err(ConjunctionError::InvalidConfig(format!(
                "box_size_km ({}) must be >= collision_distance_km ({})",
                self.box_size_km, self.collision_distance_km
            )));
        }
        if self.interval_minutes <= 0.0 {
            return Err(ConjunctionError::InvalidConfig(
                "interval_minutes must be positive".to_owned(),
            ));
        }
        if self.horizon_minutes <= 0.0 {
            return Err(ConjunctionError::InvalidConfig(
                "horizon_minutes must be positive".to_owned(),
            ));
        }
        if self.num_steps() == 0 {
            return Err(ConjunctionError::InvalidConfig(
                "horizon_minutes / interval_minutes must yield at least one grid step".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            horizon_minutes: 1440.0,
            interval_minutes: 4.0,
            collision_distance_km: 100.0,
            box_size_km: 1200.0,
            start_time: Instant::new(2_451_545.0, 0.0),
            refine_window_seconds: 600.0,
            refine_tolerance_seconds: 1.0,
            top_k: 100,
            filter_zero_distance: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_box_smaller_than_collision_distance() {
        let mut cfg = Config::default();
        cfg.box_size_km = 50.0;
        cfg.collision_distance_km = 100.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn num_steps_is_floor_division() {
        let mut cfg = Config::default();
        cfg.horizon_minutes = 1441.0;
        cfg.interval_minutes = 4.0;
        assert_eq!(cfg.num_steps(), 360);
    }
}
