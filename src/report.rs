//! Aggregation and ranking of narrow-phase events into the final
//! per-pair conjunction report (spec §4.4 "Aggregation", §6 "Reporting
//! output").

use std::collections::HashMap;

use serde::Serialize;

use crate::broadphase::CandidatePair;
use crate::narrowphase::ConjunctionEvent;
use crate::trajectory::PositionTensor;

/// One refined close-approach instant, in the reporting schema's shape.
#[derive(Debug, Clone, Serialize)]
pub struct ConjunctionEventOut {
    pub date_iso: String,
    pub julian_date: f64,
    pub min_distance_km: f64,
}

/// A ranked pair record: the two objects, their position at the moment of
/// closest approach (human-readable, per spec §6), and every refined
/// event for that pair sorted ascending by distance.
#[derive(Debug, Clone, Serialize)]
pub struct ConjunctionReport {
    pub sat_1_id: String,
    pub sat_2_id: String,
    pub sat_1_xyz: String,
    pub sat_2_xyz: String,
    pub collisions: Vec<ConjunctionEventOut>,
}

fn format_xyz(pos: [f64; 3]) -> String {
    format!("X={} Y={} Z={}", pos[0], pos[1], pos[2])
}

/// One raw refinement result, carried alongside the positions of both
/// objects at the event's time so the report can render `sat_*_xyz`.
pub struct RawEvent {
    pub pair: CandidatePair,
    pub event: ConjunctionEvent,
    pub pos_a: [f64; 3],
    pub pos_b: [f64; 3],
}

/// Group raw refinement results by pair, sort each pair's events ascending
/// by distance, then rank pairs by their best (smallest) event distance
/// and truncate to `top_k`.
///
/// The reported `sat_*_xyz` is taken from the pair's best (first, closest)
/// event, matching the original aggregator's behavior of recording
/// position only once per pair, from the first (smallest-distance) event
/// it encounters in distance-sorted order.
pub fn aggregate(tensor: &PositionTensor, mut raw: Vec<RawEvent>, top_k: usize) -> Vec<ConjunctionReport> {
    raw.sort_by(|a, b| {
        a.event
            .min_distance_km
            .partial_cmp(&b.event.min_distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut by_pair: HashMap<CandidatePair, ConjunctionReport> = HashMap::new();
    let mut order: Vec<CandidatePair> = Vec::new();

    for raw_event in raw {
        let (i, j) = raw_event.pair;
        let entry = by_pair.entry(raw_event.pair).or_insert_with(|| {
            order.push(raw_event.pair);
            ConjunctionReport {
                sat_1_id: tensor.identifier(i).to_owned(),
                sat_2_id: tensor.identifier(j).to_owned(),
                sat_1_xyz: format_xyz(raw_event.pos_a),
                sat_2_xyz: format_xyz(raw_event.pos_b),
                collisions: Vec::new(),
            }
        });
        entry.collisions.push(ConjunctionEventOut {
            date_iso: raw_event.event.time.to_datetime().to_rfc3339(),
            julian_date: raw_event.event.time.to_float(),
            min_distance_km: raw_event.event.min_distance_km,
        });
    }

    for pair in &order {
        if let Some(report) = by_pair.get_mut(pair) {
            report
                .collisions
                .sort_by(|a, b| a.min_distance_km.partial_cmp(&b.min_distance_km).unwrap());
        }
    }

    let mut reports: Vec<ConjunctionReport> = order
        .into_iter()
        .filter_map(|pair| by_pair.remove(&pair))
        .collect();

    reports.sort_by(|a, b| {
        let best_a = a.collisions.first().map(|e| e.min_distance_km).unwrap_or(f64::INFINITY);
        let best_b = b.collisions.first().map(|e| e.min_distance_km).unwrap_or(f64::INFINITY);
        best_a.partial_cmp(&best_b).unwrap_or(std::cmp::Ordering::Equal)
    });
    reports.truncate(top_k);
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use crate::time::Instant;

    fn tiny_tensor() -> PositionTensor {
        let grid = crate::time::TimeGrid::new(Instant::new(2_460_000.0, 0.0), 4.0, 1);
        let entries = vec![
            CatalogEntry::new("A", "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992", "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008"),
            CatalogEntry::new("B", "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992", "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008"),
        ];
        crate::trajectory::precompute(entries, &grid).unwrap().0
    }

    #[test]
    fn ranks_pairs_ascending_by_best_distance_and_truncates() {
        let tensor = tiny_tensor();
        let t0 = Instant::new(2_460_000.0, 0.0);
        let raw = vec![
            RawEvent {
                pair: (0, 1),
                event: ConjunctionEvent { time: t0, min_distance_km: 50.0 },
                pos_a: [1.0, 0.0, 0.0],
                pos_b: [2.0, 0.0, 0.0],
            },
            RawEvent {
                pair: (0, 1),
                event: ConjunctionEvent { time: t0, min_distance_km: 10.0 },
                pos_a: [1.0, 0.0, 0.0],
                pos_b: [1.5, 0.0, 0.0],
            },
        ];
        let reports = aggregate(&tensor, raw, 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].collisions[0].min_distance_km, 10.0);
        assert_eq!(reports[0].collisions[1].min_distance_km, 50.0);
        assert_eq!(reports[0].sat_1_xyz, "X=1 Y=0 Z=0");
    }
}
