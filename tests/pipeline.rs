use conjunction_core::config::Config;
use conjunction_core::trajectory::Propagator;
use conjunction_core::{run, CatalogEntry, ConjunctionError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const ISS_L1: &str = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
const ISS_L2: &str = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";

// A second, genuinely distinct object (a NOAA polar orbiter) so the
// full-pipeline smoke test below exercises both the "kept" and "rejected"
// branches of the broad phase.
const NOAA_L1: &str = "1 33591U 09005A   20194.54037539  .00000023  00000-0  24589-4 0  9999";
const NOAA_L2: &str = "2 33591  99.0522 154.6619 0013870  97.0155 263.2609 14.12501047576612";

fn iss_epoch() -> conjunction_core::time::Instant {
    Propagator::from_tle("ISS", ISS_L1, ISS_L2).unwrap().epoch
}

#[test]
fn duplicate_tle_catalog_yields_one_near_zero_conjunction_report() {
    init_tracing();
    let catalog = vec![
        CatalogEntry::new("ISS-A", ISS_L1, ISS_L2),
        CatalogEntry::new("ISS-B", ISS_L1, ISS_L2),
    ];
    let config = Config {
        start_time: iss_epoch(),
        horizon_minutes: 20.0,
        interval_minutes: 4.0,
        collision_distance_km: 1000.0,
        box_size_km: 1200.0,
        filter_zero_distance: false,
        top_k: 10,
        ..Config::default()
    };

    let (reports, stats) = run(catalog, &config).expect("duplicate-TLE run must succeed");

    assert_eq!(stats.dropped_objects, 0);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(!report.collisions.is_empty());
    assert!(report.collisions[0].min_distance_km < 1.0);
    // collisions are sorted ascending by distance within a pair.
    for pair in report.collisions.windows(2) {
        assert!(pair[0].min_distance_km <= pair[1].min_distance_km);
    }
    assert!(report.sat_1_xyz.starts_with("X="));
}

#[test]
fn mixed_catalog_only_reports_the_genuinely_close_pair() {
    init_tracing();
    let catalog = vec![
        CatalogEntry::new("ISS-A", ISS_L1, ISS_L2),
        CatalogEntry::new("ISS-B", ISS_L1, ISS_L2),
        CatalogEntry::new("NOAA", NOAA_L1, NOAA_L2),
    ];
    let config = Config {
        start_time: iss_epoch(),
        horizon_minutes: 20.0,
        interval_minutes: 4.0,
        collision_distance_km: 1000.0,
        box_size_km: 1200.0,
        filter_zero_distance: false,
        top_k: 10,
        ..Config::default()
    };

    let (reports, _) = run(catalog, &config).expect("mixed catalog run must succeed");

    assert_eq!(reports.len(), 1);
    let ids: Vec<&str> = vec![reports[0].sat_1_id.as_str(), reports[0].sat_2_id.as_str()];
    assert!(ids.contains(&"ISS-A"));
    assert!(ids.contains(&"ISS-B"));
    assert!(!ids.contains(&"NOAA"));
}

#[test]
fn malformed_tle_is_dropped_and_does_not_abort_the_run() {
    init_tracing();
    let catalog = vec![
        CatalogEntry::new("GOOD", ISS_L1, ISS_L2),
        CatalogEntry::new("BAD", "garbage", "garbage"),
    ];
    let config = Config { start_time: iss_epoch(), horizon_minutes: 8.0, interval_minutes: 4.0, ..Config::default() };

    let (reports, stats) = run(catalog, &config).expect("one malformed entry must not abort the run");

    assert_eq!(stats.dropped_objects, 1);
    assert!(reports.is_empty());
}

#[test]
fn empty_catalog_after_filtering_is_a_fatal_error() {
    init_tracing();
    let catalog = vec![CatalogEntry::new("UNKNOWN", ISS_L1, ISS_L2)];
    let config = Config { start_time: iss_epoch(), ..Config::default() };

    let err = run(catalog, &config).unwrap_err();
    assert!(matches!(err, ConjunctionError::EmptyCatalog));
}

#[test]
fn top_k_truncates_the_ranked_report_list() {
    init_tracing();
    // Five near-duplicate ISS clones all within the collision threshold of
    // one another: C(5, 2) = 10 candidate pairs, truncated to top_k = 2.
    let catalog: Vec<CatalogEntry> = (0..5)
        .map(|i| CatalogEntry::new(format!("ISS-{i}"), ISS_L1, ISS_L2))
        .collect();
    let config = Config {
        start_time: iss_epoch(),
        horizon_minutes: 8.0,
        interval_minutes: 4.0,
        collision_distance_km: 1000.0,
        box_size_km: 1200.0,
        filter_zero_distance: false,
        top_k: 2,
        ..Config::default()
    };

    let (reports, _) = run(catalog, &config).expect("top_k run must succeed");
    assert_eq!(reports.len(), 2);
}
