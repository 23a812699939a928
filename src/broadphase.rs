//! Broad-Phase Engine (BP): per time slice, bucket objects into a uniform
//! cubic grid, scan each bucket plus its 6 axis-aligned neighbors, run a
//! 3-axis sweep-and-prune on the union, and filter to an exact-distance
//! candidate set. The algorithmic centerpiece of the pipeline.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::config::Config;
use crate::trajectory::PositionTensor;

/// Integer lattice cell coordinates, `floor(coord / box_size)` per axis.
pub type CellKey = (i64, i64, i64);

/// A candidate pair of distinct object indices, canonically ordered
/// `(min, max)` so pair identity survives set membership and hashing.
pub type CandidatePair = (usize, usize);

fn canonical_pair(a: usize, b: usize) -> CandidatePair {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

fn bucket_key(pos: [f64; 3], box_size: f64) -> CellKey {
    (
        (pos[0] / box_size).floor() as i64,
        (pos[1] / box_size).floor() as i64,
        (pos[2] / box_size).floor() as i64,
    )
}

/// Stage A: bucket every object with a finite position at this slice into
/// its lattice cell.
///
/// Objects with a NaN coordinate are skipped entirely (the Open Question
/// resolution recorded in DESIGN.md: the original placed them in a shared
/// `(0,0,0)` sentinel bucket, which is equivalent once Stage C's NaN filter
/// runs, but skipping avoids the latent data-hygiene smell).
pub fn build_clusters(slice: ndarray::ArrayView2<'_, f64>, box_size_km: f64) -> HashMap<CellKey, Vec<usize>> {
    let mut clusters: HashMap<CellKey, Vec<usize>> = HashMap::new();
    for i in 0..slice.shape()[0] {
        let pos = [slice[[i, 0]], slice[[i, 1]], slice[[i, 2]]];
        if pos.iter().any(|c| c.is_nan()) {
            continue;
        }
        clusters.entry(bucket_key(pos, box_size_km)).or_default().push(i);
    }
    clusters
}

/// Six axis-adjacent neighbor cells of `key`, not including `key` itself.
fn face_neighbors(key: CellKey) -> [CellKey; 6] {
    let (x, y, z) = key;
    [
        (x + 1, y, z),
        (x - 1, y, z),
        (x, y + 1, z),
        (x, y - 1, z),
        (x, y, z + 1),
        (x, y, z - 1),
    ]
}

/// Sort-and-sweep one axis: emit every canonical pair whose 1-D gap is
/// `<= threshold`. The inner scan stops at the first violation since the
/// list is sorted (monotone termination).
fn sweep_axis(mut items: Vec<(usize, f64)>, threshold: f64) -> HashSet<CandidatePair> {
    items.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("coordinates must not be NaN here"));
    let mut pairs = HashSet::new();
    for i in 0..items.len() {
        let (id_i, val_i) = items[i];
        for j in (i + 1)..items.len() {
            let (id_j, val_j) = items[j];
            if val_j - val_i <= threshold {
                pairs.insert(canonical_pair(id_i, id_j));
            } else {
                break;
            }
        }
    }
    pairs
}

/// Stage B + C for a single non-empty bucket neighborhood: gather the union
/// of the bucket and its 6 face neighbors, sweep-and-prune per axis,
/// intersect, then apply the exact-distance filter.
fn candidates_for_bucket(
    key: CellKey,
    clusters: &HashMap<CellKey, Vec<usize>>,
    slice: ndarray::ArrayView2<'_, f64>,
    config: &Config,
) -> (HashSet<CandidatePair>, usize) {
    let mut union_ids: Vec<usize> = Vec::new();
    if let Some(ids) = clusters.get(&key) {
        union_ids.extend(ids.iter().copied());
    }
    for neighbor in face_neighbors(key) {
        if let Some(ids) = clusters.get(&neighbor) {
            union_ids.extend(ids.iter().copied());
        }
    }

    let coord = |axis: usize| -> Vec<(usize, f64)> {
        union_ids.iter().map(|&i| (i, slice[[i, axis]])).collect()
    };

    let pairs_x = sweep_axis(coord(0), config.collision_distance_km);
    let pairs_y = sweep_axis(coord(1), config.collision_distance_km);
    let pairs_z = sweep_axis(coord(2), config.collision_distance_km);

    let broad: HashSet<CandidatePair> = pairs_x
        .intersection(&pairs_y)
        .copied()
        .collect::<HashSet<_>>()
        .intersection(&pairs_z)
        .copied()
        .collect();

    let mut zero_filtered = 0usize;
    let mut exact = HashSet::new();
    for (a, b) in broad {
        let pa = [slice[[a, 0]], slice[[a, 1]], slice[[a, 2]]];
        let pb = [slice[[b, 0]], slice[[b, 1]], slice[[b, 2]]];
        if pa.iter().chain(pb.iter()).any(|c| c.is_nan()) {
            continue;
        }
        let dist = euclidean_distance(pa, pb);
        if config.filter_zero_distance && dist == 0.0 {
            zero_filtered += 1;
            debug!(a, b, "filtered zero-distance pair (hygiene rule)");
            continue;
        }
        exact.insert((a, b));
    }

    (exact, zero_filtered)
}

pub fn euclidean_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Run the full broad-phase (Stage A–C) for one time slice.
///
/// Returns the deduplicated candidate pair set and the count of pairs
/// rejected by the distance-zero hygiene rule (re-discovery across
/// neighboring buckets is expected and absorbed by set semantics; no
/// global visited-cell marking is required).
pub fn broad_phase_slice(
    tensor: &PositionTensor,
    t: usize,
    config: &Config,
) -> (HashSet<CandidatePair>, usize) {
    let slice = tensor.slice_at(t);
    let clusters = build_clusters(slice, config.box_size_km);

    let mut pairs = HashSet::new();
    let mut zero_filtered = 0usize;
    for &key in clusters.keys() {
        let (bucket_pairs, bucket_zero) = candidates_for_bucket(key, &clusters, slice, config);
        pairs.extend(bucket_pairs);
        zero_filtered += bucket_zero;
    }
    (pairs, zero_filtered)
}

/// Run the broad phase over every time index in parallel (spec §5: BP is
/// embarrassingly parallel over the `T` time indices, each worker reading
/// the shared tensor).
///
/// Returns one flattened `(time_index, pair)` entry per surviving
/// candidate, plus the total distance-zero-filtered count.
#[tracing::instrument(skip(tensor, config))]
pub fn run_broad_phase(tensor: &PositionTensor, config: &Config) -> (Vec<(usize, CandidatePair)>, usize) {
    let per_slice: Vec<(HashSet<CandidatePair>, usize)> = (0..tensor.num_times())
        .into_par_iter()
        .map(|t| broad_phase_slice(tensor, t, config))
        .collect();

    let mut flat = Vec::new();
    let mut zero_filtered_total = 0usize;
    for (t, (pairs, zero_filtered)) in per_slice.into_iter().enumerate() {
        zero_filtered_total += zero_filtered;
        flat.extend(pairs.into_iter().map(|pair| (t, pair)));
    }
    (flat, zero_filtered_total)
}
