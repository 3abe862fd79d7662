//! Label normalisation and the merge of both direction groups into one id
//! space.
//!
//! Inside a group, cluster ids are renumbered by first appearance in input
//! order. When the groups are merged, descending ids are offset past the
//! largest ascending id; a group with no clusters contributes no offset.

use crate::types::Label;
use std::collections::HashMap;
use std::hash::Hash;

/// Number each distinct key by the position of its first occurrence
pub fn first_appearance_labels<T: Copy + Eq + Hash>(keys: &[T]) -> Vec<usize> {
    let mut ids: HashMap<T, usize> = HashMap::new();
    keys.iter()
        .map(|key| {
            let next = ids.len();
            *ids.entry(*key).or_insert(next)
        })
        .collect()
}

/// Renumber cluster ids by first appearance, keeping noise as noise
pub fn compact_labels(labels: &[Label]) -> Vec<Label> {
    let mut ids: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|label| match label {
            Label::Cluster(id) => {
                let next = ids.len();
                Label::Cluster(*ids.entry(*id).or_insert(next))
            }
            Label::Noise => Label::Noise,
        })
        .collect()
}

/// Number of distinct clusters in a compact labelling (max id + 1)
pub fn cluster_count(labels: &[Label]) -> usize {
    labels
        .iter()
        .filter_map(Label::cluster)
        .max()
        .map_or(0, |max| max + 1)
}

/// Number of noise labels
pub fn noise_count(labels: &[Label]) -> usize {
    labels.iter().filter(|l| l.is_noise()).count()
}

/// Labels of one direction group, parallel to its input positions
#[derive(Debug, Clone, Copy)]
pub struct GroupLabels<'a> {
    pub indices: &'a [usize],
    pub labels: &'a [Label],
}

/// Scatter per-group labels back into input order with disjoint ids
///
/// Groups are offset in the order given. Positions not covered by any group
/// are left as noise.
pub fn merge_group_labels(total: usize, groups: &[GroupLabels<'_>]) -> Vec<Label> {
    let mut merged = vec![Label::Noise; total];
    let mut offset = 0;

    for group in groups {
        for (&index, label) in group.indices.iter().zip(group.labels) {
            merged[index] = match label {
                Label::Cluster(id) => Label::Cluster(id + offset),
                Label::Noise => Label::Noise,
            };
        }
        offset += cluster_count(group.labels);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Cluster, Noise};

    #[test]
    fn test_first_appearance() {
        assert_eq!(first_appearance_labels(&[7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
        assert!(first_appearance_labels::<usize>(&[]).is_empty());
    }

    #[test]
    fn test_compact_keeps_noise() {
        let labels = [Cluster(4), Noise, Cluster(2), Cluster(4)];
        assert_eq!(
            compact_labels(&labels),
            vec![Cluster(0), Noise, Cluster(1), Cluster(0)]
        );
    }

    #[test]
    fn test_merge_offsets_descending() {
        let asc = [Cluster(0), Cluster(1), Cluster(0)];
        let desc = [Cluster(0), Noise];
        let merged = merge_group_labels(
            5,
            &[
                GroupLabels {
                    indices: &[0, 2, 4],
                    labels: &asc,
                },
                GroupLabels {
                    indices: &[1, 3],
                    labels: &desc,
                },
            ],
        );
        assert_eq!(
            merged,
            vec![Cluster(0), Cluster(2), Cluster(1), Noise, Cluster(0)]
        );
    }

    #[test]
    fn test_merge_empty_ascending_adds_no_offset() {
        let desc = [Cluster(0), Cluster(1)];
        let merged = merge_group_labels(
            2,
            &[
                GroupLabels {
                    indices: &[],
                    labels: &[],
                },
                GroupLabels {
                    indices: &[0, 1],
                    labels: &desc,
                },
            ],
        );
        assert_eq!(merged, vec![Cluster(0), Cluster(1)]);
    }

    #[test]
    fn test_all_noise_group_adds_no_offset() {
        let asc = [Noise, Noise];
        let desc = [Cluster(0)];
        let merged = merge_group_labels(
            3,
            &[
                GroupLabels {
                    indices: &[0, 1],
                    labels: &asc,
                },
                GroupLabels {
                    indices: &[2],
                    labels: &desc,
                },
            ],
        );
        assert_eq!(merged, vec![Noise, Noise, Cluster(0)]);
        assert_eq!(noise_count(&merged), 2);
        assert_eq!(cluster_count(&merged), 1);
    }
}
