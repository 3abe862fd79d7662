//! Clustered-data and statistics tables
//!
//! Formats consumed by the downstream plotting scripts:
//!
//! - `clustered_data.txt`: `X Y Cluster`, space separated, one row per
//!   observation, `-1` for noise
//! - `calculated_points.txt`: fitted mean/median points per cluster, tab
//!   separated, 4 decimals
//! - `group_statistics.txt`: human-readable quartile report

use crate::reader::{IoError, IoResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use trapeze_stats::{ClusterStatistics, Quartiles};

/// Cluster id written for unclustered (noise) points
pub const NOISE_ID: i64 = -1;

/// Header of the clustered-data table
pub const CLUSTERED_HEADER: [&str; 3] = ["X", "Y", "Cluster"];

/// Header of the calculated-points table
pub const STATISTICS_HEADER: [&str; 6] = [
    "Group",
    "X_Mean",
    "Y_Calculated_Mean",
    "X_Median",
    "Y_Calculated_Median",
    "g_num",
];

/// One row of the clustered-data table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusteredRow {
    pub x: f64,
    pub y: f64,
    /// Cluster id, or [`NOISE_ID`]
    pub cluster: i64,
}

/// One row of the calculated-points table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatisticsRow {
    pub cluster: usize,
    pub x_mean: f64,
    pub y_mean_fit: f64,
    pub x_median: f64,
    pub y_median_fit: f64,
    pub n: usize,
}

impl StatisticsRow {
    pub fn from_stats(cluster: usize, stats: &ClusterStatistics) -> Self {
        Self {
            cluster,
            x_mean: stats.mean_point.x,
            y_mean_fit: stats.mean_point.y,
            x_median: stats.median_point.x,
            y_median_fit: stats.median_point.y,
            n: stats.n,
        }
    }
}

/// Create (truncate) an output file behind a buffered writer
pub fn create_output(path: impl AsRef<Path>) -> IoResult<BufWriter<File>> {
    let path = path.as_ref();
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| IoError::OpenFailed(format!("{}: {}", path.display(), e)))
}

/// Write the clustered-data table
pub fn write_clustered_table<W: Write>(writer: W, rows: &[ClusteredRow]) -> IoResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b' ')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(CLUSTERED_HEADER).map_err(csv_error)?;
    for row in rows {
        wtr.write_record([
            row.x.to_string(),
            row.y.to_string(),
            row.cluster.to_string(),
        ])
        .map_err(csv_error)?;
    }

    wtr.flush().map_err(|e| IoError::Io(e.to_string()))
}

/// Read a clustered-data table back
pub fn read_clustered_table<R: Read>(reader: R) -> IoResult<Vec<ClusteredRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| {
            record.get(i).ok_or_else(|| {
                IoError::InvalidFormat(format!("line {}: expected 3 fields", line))
            })
        };

        let x = parse_field::<f64>(field(0)?, line)?;
        let y = parse_field::<f64>(field(1)?, line)?;
        let cluster = parse_field::<i64>(field(2)?, line)?;
        rows.push(ClusteredRow { x, y, cluster });
    }

    Ok(rows)
}

/// Read a clustered-data table from a file
pub fn read_clustered_file(path: impl AsRef<Path>) -> IoResult<Vec<ClusteredRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
    read_clustered_table(file)
}

/// Write the calculated-points table, one row per cluster in id order
pub fn write_statistics_table<W: Write>(
    writer: W,
    stats: &BTreeMap<usize, ClusterStatistics>,
) -> IoResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(STATISTICS_HEADER).map_err(csv_error)?;
    for (&cluster, s) in stats {
        let row = StatisticsRow::from_stats(cluster, s);
        wtr.write_record([
            row.cluster.to_string(),
            format!("{:.4}", row.x_mean),
            format!("{:.4}", row.y_mean_fit),
            format!("{:.4}", row.x_median),
            format!("{:.4}", row.y_median_fit),
            row.n.to_string(),
        ])
        .map_err(csv_error)?;
    }

    wtr.flush().map_err(|e| IoError::Io(e.to_string()))
}

/// Write the human-readable per-cluster report
pub fn write_group_report<W: Write>(
    mut writer: W,
    stats: &BTreeMap<usize, ClusterStatistics>,
) -> IoResult<()> {
    let io = |e: std::io::Error| IoError::Io(e.to_string());

    for (cluster, s) in stats {
        writeln!(writer, "Statistics for Group {}:", cluster).map_err(io)?;
        writeln!(writer, "X: {}", quartile_line(&s.x)).map_err(io)?;
        writeln!(writer, "Y: {}", quartile_line(&s.y)).map_err(io)?;
        writeln!(
            writer,
            "Slope{}: {}",
            if s.slope_fallback { "(fallback)" } else { "" },
            quartile_line(&s.slope)
        )
        .map_err(io)?;
        writeln!(writer, "Shift: {}", quartile_line(&s.shift)).map_err(io)?;
        writeln!(
            writer,
            "Shift(trapezoid): {}",
            quartile_line(&s.shift_trapezoid)
        )
        .map_err(io)?;
        writeln!(
            writer,
            "Calculated: Mean=({:.4}, {:.4}), Median=({:.4}, {:.4}), N={}",
            s.mean_point.x, s.mean_point.y, s.median_point.x, s.median_point.y, s.n
        )
        .map_err(io)?;
        writeln!(writer).map_err(io)?;
    }

    writer.flush().map_err(io)
}

fn quartile_line(q: &Quartiles) -> String {
    format!(
        "Mean={:.4}, Q1={:.4}, Q2={:.4}, Q3={:.4}",
        q.mean, q.q1, q.q2, q.q3
    )
}

fn parse_field<T: std::str::FromStr>(value: &str, line: u64) -> IoResult<T> {
    value
        .parse()
        .map_err(|_| IoError::InvalidFormat(format!("line {}: invalid value '{}'", line, value)))
}

fn csv_error(e: csv::Error) -> IoError {
    IoError::InvalidFormat(e.to_string())
}
