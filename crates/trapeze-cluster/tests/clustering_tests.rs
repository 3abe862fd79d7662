//! Direction split, per-group clustering and label merge, end to end

mod common;

use common::{four_blobs, observations};
use proptest::prelude::*;
use rstest::rstest;
use std::collections::BTreeSet;
use trapeze_cluster::{
    cluster_group, merge_group_labels, split_by_direction, ClusterCount, ClusterParams,
    DensityParams, GroupLabels, Label, Linkage, Method, Observation,
};

fn label_all(points: &[Observation], params: &ClusterParams) -> Vec<Label> {
    let split = split_by_direction(points);
    let asc = cluster_group(&split.ascending.points, params).unwrap();
    let desc = cluster_group(&split.descending.points, params).unwrap();
    merge_group_labels(
        points.len(),
        &[
            GroupLabels {
                indices: &split.ascending.indices,
                labels: &asc.labels,
            },
            GroupLabels {
                indices: &split.descending.indices,
                labels: &desc.labels,
            },
        ],
    )
}

fn params(method: Method) -> ClusterParams {
    ClusterParams {
        method,
        density: DensityParams::new(3).with_min_samples(2),
        ..ClusterParams::default()
    }
}

// === Small groups ===

#[test]
fn test_four_pairs_give_two_clusters() {
    let points = observations(&[(1.0, 1.0), (2.0, 4.0), (3.0, 2.0), (10.0, 1.0)]);
    let labels = label_all(&points, &params(Method::KMeansElbow));

    assert_eq!(
        labels,
        vec![
            Label::Cluster(0),
            Label::Cluster(0),
            Label::Cluster(1),
            Label::Cluster(1)
        ]
    );
}

#[test]
fn test_only_descending_starts_at_zero() {
    let points = observations(&[(5.0, 1.0), (6.0, 2.0), (7.0, 3.0)]);
    let labels = label_all(&points, &params(Method::Hierarchical));
    assert_eq!(labels, vec![Label::Cluster(0); 3]);
}

// === Separated blobs ===

#[rstest]
#[case(Method::Hierarchical)]
#[case(Method::KMeansElbow)]
#[case(Method::Hdbscan)]
fn test_four_blobs_recovered(#[case] method: Method) {
    let points = four_blobs();
    let labels = label_all(&points, &params(method));

    let expected: Vec<Label> = (0..points.len())
        .map(|i| Label::Cluster([0, 2, 1, 3][i % 4]))
        .collect();
    assert_eq!(labels, expected);
}

#[rstest]
#[case(Linkage::Ward)]
#[case(Linkage::Complete)]
#[case(Linkage::Average)]
#[case(Linkage::Single)]
fn test_four_blobs_every_linkage(#[case] linkage: Linkage) {
    let p = ClusterParams {
        linkage,
        ..params(Method::Hierarchical)
    };
    let labels = label_all(&four_blobs(), &p);
    let ids: BTreeSet<i64> = labels.iter().map(Label::as_i64).collect();
    assert_eq!(ids, BTreeSet::from([0, 1, 2, 3]));
}

#[test]
fn test_fixed_k_uses_max_k() {
    let p = ClusterParams {
        count: ClusterCount {
            max_k: 1,
            auto_k: false,
        },
        ..params(Method::Hierarchical)
    };
    let labels = label_all(&four_blobs(), &p);
    let ids: BTreeSet<i64> = labels.iter().map(Label::as_i64).collect();
    assert_eq!(ids, BTreeSet::from([0, 1]));
}

// === Invariants ===

fn method_strategy() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Hierarchical),
        Just(Method::Hdbscan),
        Just(Method::KMeansElbow),
    ]
}

proptest! {
    #[test]
    fn prop_ids_disjoint_and_contiguous(
        pairs in prop::collection::vec((-20.0f64..20.0, -20.0f64..20.0), 0..40),
        method in method_strategy(),
    ) {
        let points = observations(&pairs);
        let split = split_by_direction(&points);
        let p = params(method);
        let asc = cluster_group(&split.ascending.points, &p).unwrap();
        let desc = cluster_group(&split.descending.points, &p).unwrap();
        let labels = label_all(&points, &p);

        let asc_ids: BTreeSet<usize> = split.ascending.indices.iter()
            .filter_map(|&i| labels[i].cluster())
            .collect();
        let desc_ids: BTreeSet<usize> = split.descending.indices.iter()
            .filter_map(|&i| labels[i].cluster())
            .collect();

        prop_assert_eq!(asc_ids.clone(), (0..asc.clusters).collect::<BTreeSet<_>>());
        prop_assert_eq!(
            desc_ids,
            (asc.clusters..asc.clusters + desc.clusters).collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn prop_labels_reproducible(
        pairs in prop::collection::vec((0.0f64..50.0, 0.0f64..50.0), 0..30),
        method in method_strategy(),
    ) {
        let points = observations(&pairs);
        let p = params(method);
        prop_assert_eq!(label_all(&points, &p), label_all(&points, &p));
    }
}
