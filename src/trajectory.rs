//! Trajectory Precomputer (TP): turns a catalog of TLE descriptors and a
//! time grid into a dense `[N × T × 3]` position tensor (km, Earth-centered
//! inertial frame), plus index <-> identifier / time lookups.

use ndarray::{Array3, Axis};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::catalog::{filter_catalog, CatalogEntry};
use crate::error::{ConjunctionError, Result};
use crate::time::{Instant, TimeGrid};

/// Dense `[N × T × 3]` position tensor, read-only once built.
///
/// If the underlying propagator returned a nonzero status at slot `(i, t)`,
/// all three components of that slot are `NaN`.
pub struct PositionTensor {
    positions: Array3<f64>,
    /// Retained catalog entries, in the same order as the tensor's first
    /// axis — kept (not just their identifiers) so the narrow phase can
    /// construct fresh, per-task propagators from TLE text.
    entries: Vec<CatalogEntry>,
}

impl PositionTensor {
    pub fn num_objects(&self) -> usize {
        self.entries.len()
    }

    pub fn num_times(&self) -> usize {
        self.positions.shape()[1]
    }

    pub fn identifier(&self, index: usize) -> &str {
        &self.entries[index].object_id
    }

    pub fn entry(&self, index: usize) -> &CatalogEntry {
        &self.entries[index]
    }

    /// Position of object `index` at time `t` (NaN-filled if propagation
    /// failed at that slot).
    pub fn position(&self, index: usize, t: usize) -> [f64; 3] {
        [
            self.positions[[index, t, 0]],
            self.positions[[index, t, 1]],
            self.positions[[index, t, 2]],
        ]
    }

    /// Read-only view of one time slice, `[N × 3]`.
    pub fn slice_at(&self, t: usize) -> ndarray::ArrayView2<'_, f64> {
        self.positions.index_axis(Axis(1), t)
    }
}

/// Counts of recoverable anomalies encountered while building the pipeline's
/// intermediate products, surfaced to the caller rather than printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Objects dropped before precomputation (propagator init failure).
    pub dropped_objects: usize,
    /// Tensor slots that hold NaN due to a per-call propagator failure.
    pub nan_slots: usize,
    /// Candidate pairs rejected by the distance-zero hygiene rule.
    pub zero_distance_pairs: usize,
}

/// A per-object propagator handle paired with its epoch instant, used both
/// by TP (to fill the tensor) and, independently, by NR (constructed fresh
/// per candidate pair).
pub struct Propagator {
    pub constants: sgp4::Constants,
    pub epoch: Instant,
}

impl Propagator {
    /// Build a propagator from two raw TLE lines.
    pub fn from_tle(object_id: &str, line1: &str, line2: &str) -> std::result::Result<Self, sgp4::Error> {
        let elements = sgp4::Elements::from_tle(
            Some(object_id.to_owned()),
            line1.as_bytes(),
            line2.as_bytes(),
        )?;
        let epoch = Instant::from_naive_datetime(elements.datetime);
        let constants = sgp4::Constants::from_elements(&elements)?;
        Ok(Propagator { constants, epoch })
    }

    /// Propagate to a grid instant, in km, ECI/TEME frame. Returns `None`
    /// if the propagator reports a nonzero status at this sample.
    pub fn position_at(&self, at: Instant) -> Option<[f64; 3]> {
        let minutes = at.diff_seconds(self.epoch) / 60.0;
        self.constants.propagate(minutes).ok().map(|p| p.position)
    }
}

/// Build the dense position tensor for every retained catalog entry over
/// the whole time grid.
///
/// `"UNKNOWN"`-identified entries are filtered first; entries whose
/// propagator fails to initialize are dropped and counted in
/// `PipelineStats::dropped_objects` (spec §7 kind 2 — fatal for the object,
/// not the run). A propagator failure at a single grid sample is recorded
/// as `(NaN, NaN, NaN)` and counted in `PipelineStats::nan_slots` (kind 1 —
/// recoverable).
#[tracing::instrument(skip(entries, grid))]
pub fn precompute(
    entries: Vec<CatalogEntry>,
    grid: &TimeGrid,
) -> Result<(PositionTensor, PipelineStats)> {
    let filtered = filter_catalog(entries);
    if filtered.is_empty() {
        return Err(ConjunctionError::EmptyCatalog);
    }

    let mut dropped_objects = 0usize;
    let mut retained: Vec<(CatalogEntry, Propagator)> = Vec::with_capacity(filtered.len());
    for entry in filtered {
        match Propagator::from_tle(&entry.object_id, &entry.tle_line1, &entry.tle_line2) {
            Ok(prop) => retained.push((entry, prop)),
            Err(source) => {
                let err = ConjunctionError::CatalogInit { object_id: entry.object_id.clone(), source };
                warn!(object_id = %entry.object_id, "dropping object: {err}");
                dropped_objects += 1;
            }
        }
    }

    if retained.is_empty() {
        return Err(ConjunctionError::EmptyCatalog);
    }

    let num_objects = retained.len();
    let num_times = grid.len();
    let mut positions = Array3::<f64>::zeros((num_objects, num_times, 3));
    let nan_slots = std::sync::atomic::AtomicUsize::new(0);

    positions
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .zip(retained.par_iter())
        .for_each(|(mut row, (entry, propagator))| {
            for t in 0..num_times {
                match propagator.position_at(grid.get(t)) {
                    Some(pos) => {
                        row[[t, 0]] = pos[0];
                        row[[t, 1]] = pos[1];
                        row[[t, 2]] = pos[2];
                    }
                    None => {
                        row[[t, 0]] = f64::NAN;
                        row[[t, 1]] = f64::NAN;
                        row[[t, 2]] = f64::NAN;
                        debug!(object_id = %entry.object_id, t, "propagation failed at this slot, filling NaN");
                        nan_slots.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                    }
                }
            }
        });

    let entries = retained.into_iter().map(|(entry, _)| entry).collect();
    let stats = PipelineStats {
        dropped_objects,
        nan_slots: nan_slots.load(std::sync::atomic::Ordering::Relaxed),
        zero_distance_pairs: 0,
    };

    Ok((PositionTensor { positions, entries }, stats))
}
