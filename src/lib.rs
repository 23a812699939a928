//! Forward-horizon conjunction screening pipeline: Time Arithmetic,
//! Trajectory Precomputer, Broad-Phase Engine, Narrow-Phase Refiner, and
//! report aggregation, wired together by [`run`].

pub mod broadphase;
pub mod catalog;
pub mod config;
pub mod error;
pub mod narrowphase;
pub mod report;
pub mod time;
pub mod trajectory;

use rayon::prelude::*;

pub use catalog::CatalogEntry;
pub use config::Config;
pub use error::{ConjunctionError, Result};
pub use report::ConjunctionReport;
pub use trajectory::PipelineStats;

use report::RawEvent;
use time::TimeGrid;
use trajectory::Propagator;

/// Run the full pipeline over `catalog` under `config`: build the time grid,
/// precompute trajectories, broad-phase every time slice, narrow-phase
/// refine every surviving candidate, and rank the resulting reports.
///
/// Each candidate pair is refined once per grid time it was flagged at,
/// reconstructing fresh propagator handles from the pair's TLE text for
/// every refinement (spec §9: narrow-phase tasks are stateless given their
/// inputs, so they parallelize without sharing propagator state).
pub fn run(catalog: Vec<CatalogEntry>, config: &Config) -> Result<(Vec<ConjunctionReport>, PipelineStats)> {
    config.validate()?;

    let grid = TimeGrid::new(config.start_time, config.interval_minutes, config.num_steps());
    let (tensor, mut stats) = trajectory::precompute(catalog, &grid)?;
    let (candidates, zero_filtered) = broadphase::run_broad_phase(&tensor, config);
    stats.zero_distance_pairs = zero_filtered;

    let raw: Vec<RawEvent> = candidates
        .into_par_iter()
        .filter_map(|(t, pair)| {
            let (i, j) = pair;
            let entry_a = tensor.entry(i);
            let entry_b = tensor.entry(j);
            let prop_a = Propagator::from_tle(&entry_a.object_id, &entry_a.tle_line1, &entry_a.tle_line2).ok()?;
            let prop_b = Propagator::from_tle(&entry_b.object_id, &entry_b.tle_line1, &entry_b.tle_line2).ok()?;

            let event = narrowphase::refine(&prop_a, &prop_b, grid.get(t), config);
            if !event.min_distance_km.is_finite() {
                return None;
            }
            let pos_a = prop_a.position_at(event.time)?;
            let pos_b = prop_b.position_at(event.time)?;
            Some(RawEvent { pair, event, pos_a, pos_b })
        })
        .collect();

    let reports = report::aggregate(&tensor, raw, config.top_k);
    Ok((reports, stats))
}
