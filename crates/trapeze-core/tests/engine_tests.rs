//! Engine integration tests: files in, output files out

mod common;

use common::fixtures::fixture_path;
use proptest::prelude::*;
use rstest::rstest;
use std::fs;
use tempfile::tempdir;
use trapeze_cluster::{Label, Linkage, Method, Observation};
use trapeze_core::output::{CALCULATED_FILE, CLUSTERED_FILE, LOG2_MARKER_FILE, STATISTICS_FILE, SUMMARY_FILE};
use trapeze_core::{write_outputs, Engine, EngineConfig, RunReport, LOG2_FLOOR};
use trapeze_io::read_clustered_file;

fn engine(method: Method) -> Engine {
    let mut config = EngineConfig::default();
    config.clustering.method = method;
    config.clustering.min_cluster_size = 3;
    config.clustering.min_samples = Some(2);
    Engine::new(config).unwrap()
}

// === End-to-end scenarios ===

#[test]
fn test_four_pairs_kmeans_elbow() {
    let out = engine(Method::KMeansElbow)
        .run_file(fixture_path("four_pairs.txt"))
        .unwrap();

    assert_eq!(out.observations.len(), 4);
    assert_eq!(
        out.labels,
        vec![
            Label::Cluster(0),
            Label::Cluster(0),
            Label::Cluster(1),
            Label::Cluster(1)
        ]
    );
    assert_eq!(out.report.total_clusters, 2);
    assert!(out.report.groups.iter().all(|g| g.target_k == Some(1)));
}

#[rstest]
#[case(Method::Hierarchical)]
#[case(Method::KMeansElbow)]
#[case(Method::Hdbscan)]
fn test_four_blob_file(#[case] method: Method) {
    let out = engine(method)
        .run_file(fixture_path("paired_header.csv"))
        .unwrap();

    assert_eq!(out.report.total_clusters, 4);
    assert_eq!(out.report.noise, 0);
    assert_eq!(out.report.groups[0].cluster_ids, vec![0, 1]);
    assert_eq!(out.report.groups[1].cluster_ids, vec![2, 3]);
    assert!(out.statistics.values().all(|s| s.n == 5));
}

#[test]
fn test_log2_floors_non_positive_values() {
    let mut config = EngineConfig::default();
    config.preprocess.log2_transform = true;
    let out = Engine::new(config)
        .unwrap()
        .run_file(fixture_path("non_positive.txt"))
        .unwrap();

    let floor = LOG2_FLOOR.log2();
    assert!((floor + 33.22).abs() < 0.01);
    assert_eq!(out.observations[0].x, floor);
    assert_eq!(out.observations[0].y, 2.0);
    assert_eq!(out.observations[1].y, floor);
    assert_eq!(out.observations[2].x, -1.0);
    assert!(out.report.log2_transformed);
}

// === Output files ===

#[test]
fn test_outputs_written() {
    let dir = tempdir().unwrap();
    let out = engine(Method::Hierarchical)
        .run_file(fixture_path("paired_header.csv"))
        .unwrap();
    let files = write_outputs(&out, dir.path()).unwrap();

    let rows = read_clustered_file(&files.clustered).unwrap();
    assert_eq!(rows.len(), 20);
    assert_eq!(rows[0].x, 1.0);
    assert_eq!(rows[0].cluster, 0);

    let clustered = fs::read_to_string(dir.path().join(CLUSTERED_FILE)).unwrap();
    assert!(clustered.starts_with("X Y Cluster\n1 6 0\n"));

    let calculated = fs::read_to_string(dir.path().join(CALCULATED_FILE)).unwrap();
    let lines: Vec<&str> = calculated.lines().collect();
    assert_eq!(
        lines[0],
        "Group\tX_Mean\tY_Calculated_Mean\tX_Median\tY_Calculated_Median\tg_num"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("0\t1.1000\t"));
    assert!(lines[1].ends_with("\t5"));

    let report = fs::read_to_string(dir.path().join(STATISTICS_FILE)).unwrap();
    assert!(report.starts_with("Statistics for Group 0:\n"));

    let summary: RunReport =
        serde_json::from_str(&fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap()).unwrap();
    assert_eq!(summary.total_clusters, 4);
    assert_eq!(summary.counts, out.report.counts);
    assert_eq!(summary.groups, out.report.groups);
    assert_eq!(summary.config, out.report.config);

    assert!(!dir.path().join(LOG2_MARKER_FILE).exists());
}

#[test]
fn test_marker_follows_last_run() {
    let dir = tempdir().unwrap();
    let marker = dir.path().join(LOG2_MARKER_FILE);

    let mut config = EngineConfig::default();
    config.preprocess.log2_transform = true;
    let transformed = Engine::new(config)
        .unwrap()
        .run_file(fixture_path("four_pairs.txt"))
        .unwrap();
    write_outputs(&transformed, dir.path()).unwrap();
    assert!(marker.exists());

    let plain = engine(Method::Hierarchical)
        .run_file(fixture_path("four_pairs.txt"))
        .unwrap();
    write_outputs(&plain, dir.path()).unwrap();
    assert!(!marker.exists());
}

// === Reproducibility ===

#[rstest]
#[case(Method::Hierarchical, Linkage::Ward)]
#[case(Method::Hierarchical, Linkage::Single)]
#[case(Method::KMeansElbow, Linkage::Ward)]
#[case(Method::Hdbscan, Linkage::Ward)]
fn test_reruns_are_byte_identical(#[case] method: Method, #[case] linkage: Linkage) {
    let mut config = EngineConfig::default();
    config.clustering.method = method;
    config.clustering.linkage = linkage;
    let engine = Engine::new(config).unwrap();

    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    for dir in [&first, &second] {
        let out = engine.run_file(fixture_path("paired_header.csv")).unwrap();
        write_outputs(&out, dir.path()).unwrap();
    }

    for name in [CLUSTERED_FILE, CALCULATED_FILE, STATISTICS_FILE, SUMMARY_FILE] {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

proptest! {
    #[test]
    fn prop_counts_cover_every_clustered_point(
        pairs in prop::collection::vec((0.1f64..100.0, 0.1f64..100.0), 1..40),
        log2 in any::<bool>(),
    ) {
        let mut config = EngineConfig::default();
        config.preprocess.log2_transform = log2;
        let points: Vec<Observation> = pairs.into_iter().map(Observation::from).collect();
        let out = Engine::new(config).unwrap().run(&points).unwrap();

        let counted: usize = out.statistics.values().map(|s| s.n).sum();
        prop_assert_eq!(counted + out.report.noise, points.len());
        prop_assert_eq!(
            out.statistics.keys().copied().collect::<Vec<_>>(),
            (0..out.report.total_clusters).collect::<Vec<_>>()
        );
    }
}
