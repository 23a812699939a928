//! Two-part high-precision date representation and arithmetic.
//!
//! An instant is `(whole, fraction)`, both `f64`, representing a Julian
//! Date. This is the foundation every other component schedules against:
//! the time grid, the narrow-phase bracket, and civil-datetime reporting.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Julian Date of 2000-01-01T12:00:00Z (the J2000.0 epoch).
const J2000_JD: f64 = 2_451_545.0;

/// Julian Date of the Unix epoch, 1970-01-01T00:00:00Z.
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// A single time instant as a two-part Julian Date `(whole_day, fraction)`.
///
/// Invariant `0 <= fraction < 1` holds after [`Instant::normalize`], but is
/// not enforced on every intermediate result — only assumed by conversion
/// to a civil datetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instant {
    pub whole: f64,
    pub frac: f64,
}

impl Instant {
    pub fn new(whole: f64, frac: f64) -> Self {
        Instant { whole, frac }
    }

    /// Collapse to a single `f64` Julian Date.
    pub fn to_float(self) -> f64 {
        self.whole + self.frac
    }

    /// Split a single `f64` Julian Date back into `(whole, frac)`.
    pub fn from_float(value: f64) -> Self {
        let whole = value.floor();
        Instant { whole, frac: value - whole }
    }

    /// Re-split so that `0 <= frac < 1`.
    pub fn normalize(self) -> Self {
        Self::from_float(self.to_float())
    }

    /// `add_seconds(t, s)` — collapses to one `f64` and re-splits.
    ///
    /// This loses the two-part representation's precision advantage for a
    /// single call, but over the horizons this system schedules (on the
    /// order of a day, in second-scale steps) drift stays under one second,
    /// which is the resolution the pipeline actually needs.
    pub fn add_seconds(self, seconds: f64) -> Self {
        Self::from_float(self.to_float() + seconds / 86_400.0)
    }

    /// `diff_seconds(a, b)` = `(a - b)` in seconds.
    pub fn diff_seconds(self, other: Instant) -> f64 {
        (self.to_float() - other.to_float()) * 86_400.0
    }

    /// `midpoint(a, b)`.
    pub fn midpoint(self, other: Instant) -> Instant {
        Self::from_float((self.to_float() + other.to_float()) / 2.0)
    }

    /// Convert to a civil UTC datetime, for reporting only.
    ///
    /// `datetime = 2000-01-01T12:00:00Z + (whole - 2451545.0 + frac) days`.
    pub fn to_datetime(self) -> DateTime<Utc> {
        let days = self.whole - J2000_JD + self.frac;
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        j2000 + Duration::nanoseconds((days * 86_400.0 * 1e9) as i64)
    }

    /// Convert a `chrono::NaiveDateTime` (UTC) — e.g. an `sgp4::Elements`
    /// epoch — to a Julian Date instant.
    pub fn from_naive_datetime(dt: NaiveDateTime) -> Self {
        let unix_seconds = dt.and_utc().timestamp() as f64
            + dt.and_utc().timestamp_subsec_nanos() as f64 / 1e9;
        Self::from_float(UNIX_EPOCH_JD + unix_seconds / 86_400.0)
    }
}

/// Ordered sequence of time instants on a uniform grid.
///
/// `num_steps = floor(horizon_minutes / interval_minutes)` (see
/// [`crate::config::Config::num_steps`]); built once at pipeline start and
/// never mutated thereafter.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    instants: Vec<Instant>,
    interval_seconds: f64,
}

impl TimeGrid {
    /// Build a grid of `num_steps` instants starting at `start`, each
    /// `interval_minutes` apart.
    pub fn new(start: Instant, interval_minutes: f64, num_steps: usize) -> Self {
        let interval_seconds = interval_minutes * 60.0;
        let instants = (0..num_steps)
            .map(|i| start.add_seconds(i as f64 * interval_seconds))
            .collect();
        TimeGrid { instants, interval_seconds }
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn get(&self, index: usize) -> Instant {
        self.instants[index]
    }

    pub fn as_slice(&self) -> &[Instant] {
        &self.instants
    }

    pub fn interval_seconds(&self) -> f64 {
        self.interval_seconds
    }
}
