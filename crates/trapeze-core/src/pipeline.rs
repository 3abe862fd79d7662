//! End-to-end engine
//!
//! raw pairs → log2 (optional) → direction split → per-group clustering →
//! label merge → per-cluster statistics → outlier gate → report
//!
//! The two direction groups never share state; with the `parallel` feature
//! they are clustered concurrently, with identical results.

use crate::config::EngineConfig;
use crate::error::{TrapezeError, TrapezeResult};
use crate::preprocess::log2_transform;
use crate::report::{AxisExtent, Diagnostic, DirectionReport, RunReport, Stage};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use trapeze_cluster::{
    cluster_group, merge_group_labels, split_by_direction, ClusterParams, ClusterResult,
    DirectionCounts, DirectionGroup, GroupClustering, GroupLabels, Label, Observation,
};
use trapeze_io::{read_pairs, ClusteredRow, IoError};
use trapeze_stats::{outliers_dominate, whisker_range, ClusterStatistics, OutlierFlag, OutlierGate};

/// Everything a run produces
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    /// Observations as clustered (after any log2 transform), input order
    pub observations: Vec<Observation>,
    /// Global label per observation
    pub labels: Vec<Label>,
    /// Statistics per cluster id; noise is excluded
    pub statistics: BTreeMap<usize, ClusterStatistics>,
    /// Outlier flag per cluster id
    pub outliers: BTreeMap<usize, OutlierFlag>,
    /// Whiskers of all observations, `None` for empty input
    pub gate: Option<OutlierGate>,
    pub report: RunReport,
}

impl RunOutput {
    /// Rows of the clustered-data table
    pub fn clustered_rows(&self) -> Vec<ClusteredRow> {
        self.observations
            .iter()
            .zip(&self.labels)
            .map(|(o, label)| ClusteredRow {
                x: o.x,
                y: o.y,
                cluster: label.as_i64(),
            })
            .collect()
    }

    /// Clusters kept for geometry: statistics minus outlier-flagged ones
    ///
    /// When the gate would drop every cluster, all clusters are kept. Sample
    /// counts in the statistics are never changed by the gate.
    pub fn geometry_clusters(&self) -> Vec<(usize, &ClusterStatistics)> {
        let kept: Vec<(usize, &ClusterStatistics)> = self
            .statistics
            .iter()
            .filter(|(id, _)| !self.outliers.get(*id).is_some_and(OutlierFlag::is_outlier))
            .map(|(&id, stats)| (id, stats))
            .collect();

        if kept.is_empty() && !self.statistics.is_empty() {
            warn!("Every cluster lies outside the whiskers, keeping all for geometry");
            return self.statistics.iter().map(|(&id, stats)| (id, stats)).collect();
        }
        kept
    }
}

/// The clustering-and-statistics engine
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    params: ClusterParams,
}

impl Engine {
    /// Create an engine; parameters are validated up front
    pub fn new(config: EngineConfig) -> TrapezeResult<Self> {
        config.validate()?;
        let params = config.clustering.params();
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read a two-column file and run on it
    pub fn run_file(&self, path: impl AsRef<Path>) -> TrapezeResult<RunOutput> {
        let table = read_pairs(path)?;
        let observations: Vec<Observation> =
            table.pairs.into_iter().map(Observation::from).collect();
        self.run(&observations)
    }

    /// Run the full pipeline on materialised observations
    pub fn run(&self, observations: &[Observation]) -> TrapezeResult<RunOutput> {
        if observations.is_empty() {
            return Err(IoError::NoData("input".to_string()).into());
        }

        let mut diagnostics = Vec::new();

        let observations = if self.config.preprocess.log2_transform {
            log2_transform(observations)
        } else {
            observations.to_vec()
        };

        let counts = DirectionCounts::from_observations(&observations);
        let split = split_by_direction(&observations);
        info!(
            total = counts.total,
            ascending = counts.ascending,
            descending = counts.descending,
            ties = counts.ties,
            "Split observations by direction"
        );

        let (ascending, descending) = self.cluster_groups(&split.ascending, &split.descending);
        let ascending = tag(ascending, &split.ascending)?;
        let descending = tag(descending, &split.descending)?;

        let labels = merge_group_labels(
            observations.len(),
            &[
                GroupLabels {
                    indices: &split.ascending.indices,
                    labels: &ascending.labels,
                },
                GroupLabels {
                    indices: &split.descending.indices,
                    labels: &descending.labels,
                },
            ],
        );

        let mut groups = Vec::with_capacity(2);
        let mut offset = 0;
        for (group, result) in [(&split.ascending, &ascending), (&split.descending, &descending)] {
            for message in &result.warnings {
                let diagnostic = Diagnostic {
                    stage: Stage::Cluster,
                    direction: Some(group.direction),
                    message: message.clone(),
                };
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }

            info!(
                direction = %group.direction,
                points = group.len(),
                target_k = ?result.target_k,
                clusters = result.clusters,
                noise = result.noise,
                "Clustered direction group"
            );

            groups.push(DirectionReport {
                direction: group.direction,
                points: group.len(),
                target_k: result.target_k,
                clusters: result.clusters,
                noise: result.noise,
                cluster_ids: (offset..offset + result.clusters).collect(),
            });
            offset += result.clusters;
        }

        let statistics = cluster_statistics(&observations, &labels);

        let xs: Vec<f64> = observations.iter().map(|o| o.x).collect();
        let ys: Vec<f64> = observations.iter().map(|o| o.y).collect();
        let gate = OutlierGate::from_columns(&xs, &ys);
        let outliers: BTreeMap<usize, OutlierFlag> = match &gate {
            Some(gate) => statistics
                .iter()
                .map(|(&id, stats)| (id, gate.classify(stats)))
                .collect(),
            None => BTreeMap::new(),
        };
        let outlier_clusters: Vec<usize> = outliers
            .iter()
            .filter(|(_, flag)| flag.is_outlier())
            .map(|(&id, _)| id)
            .collect();
        if !outlier_clusters.is_empty() {
            debug!(clusters = ?outlier_clusters, "Clusters outside the whiskers");
        }

        let pairs: Vec<(f64, f64)> = observations.iter().map(|o| (o.x, o.y)).collect();
        let inlier_points = gate.map_or(pairs.len(), |g| g.retain_points(&pairs).len());

        let noise = labels.iter().filter(|l| l.is_noise()).count();
        let report = RunReport {
            config: self.config.clone(),
            log2_transformed: self.config.preprocess.log2_transform,
            counts,
            groups,
            total_clusters: statistics.len(),
            noise,
            outlier_clusters,
            inlier_points,
            x_extent: axis_extent(&xs),
            y_extent: axis_extent(&ys),
            diagnostics,
        };

        info!(
            clusters = report.total_clusters,
            noise = report.noise,
            diagnostics = report.diagnostics.len(),
            "Run complete"
        );

        Ok(RunOutput {
            observations,
            labels,
            statistics,
            outliers,
            gate,
            report,
        })
    }

    #[cfg(feature = "parallel")]
    fn cluster_groups(
        &self,
        ascending: &DirectionGroup,
        descending: &DirectionGroup,
    ) -> (ClusterResult<GroupClustering>, ClusterResult<GroupClustering>) {
        rayon::join(
            || cluster_group(&ascending.points, &self.params),
            || cluster_group(&descending.points, &self.params),
        )
    }

    #[cfg(not(feature = "parallel"))]
    fn cluster_groups(
        &self,
        ascending: &DirectionGroup,
        descending: &DirectionGroup,
    ) -> (ClusterResult<GroupClustering>, ClusterResult<GroupClustering>) {
        (
            cluster_group(&ascending.points, &self.params),
            cluster_group(&descending.points, &self.params),
        )
    }
}

/// Attach stage and direction to a group failure
fn tag(
    result: ClusterResult<GroupClustering>,
    group: &DirectionGroup,
) -> TrapezeResult<GroupClustering> {
    result.map_err(|source| TrapezeError::Cluster {
        stage: Stage::Cluster,
        direction: group.direction,
        source,
    })
}

/// Statistics for every non-noise cluster, keyed by global id
pub fn cluster_statistics(
    observations: &[Observation],
    labels: &[Label],
) -> BTreeMap<usize, ClusterStatistics> {
    let mut columns: BTreeMap<usize, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for (o, label) in observations.iter().zip(labels) {
        if let Some(id) = label.cluster() {
            let (xs, ys) = columns.entry(id).or_default();
            xs.push(o.x);
            ys.push(o.y);
        }
    }

    columns
        .into_iter()
        .filter_map(|(id, (xs, ys))| ClusterStatistics::from_columns(&xs, &ys).map(|s| (id, s)))
        .collect()
}

fn axis_extent(values: &[f64]) -> Option<AxisExtent> {
    Some(AxisExtent {
        whisker_range: whisker_range(values)?,
        outliers_dominate: outliers_dominate(values),
    })
}
