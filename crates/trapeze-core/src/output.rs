//! Output artefacts of a run
//!
//! One directory holds the clustered table, the calculated-points table,
//! the per-cluster report, the JSON summary and the log2 marker consumed by
//! renderers.

use crate::error::{TrapezeError, TrapezeResult};
use crate::pipeline::RunOutput;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use trapeze_io::{
    create_output, write_clustered_table, write_group_report, write_statistics_table, IoResult,
};

pub const CLUSTERED_FILE: &str = "clustered_data.txt";
pub const CALCULATED_FILE: &str = "calculated_points.txt";
pub const STATISTICS_FILE: &str = "group_statistics.txt";
pub const SUMMARY_FILE: &str = "summary.json";
pub const LOG2_MARKER_FILE: &str = ".log2_transformed";

/// Paths written by [`write_outputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub clustered: PathBuf,
    pub calculated: PathBuf,
    pub statistics: PathBuf,
    pub summary: PathBuf,
    pub log2_marker: PathBuf,
}

impl OutputFiles {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            clustered: dir.join(CLUSTERED_FILE),
            calculated: dir.join(CALCULATED_FILE),
            statistics: dir.join(STATISTICS_FILE),
            summary: dir.join(SUMMARY_FILE),
            log2_marker: dir.join(LOG2_MARKER_FILE),
        }
    }
}

/// Write every artefact of `output` into `dir`, creating it if needed
pub fn write_outputs(output: &RunOutput, dir: impl AsRef<Path>) -> TrapezeResult<OutputFiles> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let files = OutputFiles::in_dir(dir);

    write_file(&files.clustered, |w| {
        write_clustered_table(w, &output.clustered_rows())
    })?;
    write_file(&files.calculated, |w| {
        write_statistics_table(w, &output.statistics)
    })?;
    write_file(&files.statistics, |w| {
        write_group_report(w, &output.statistics)
    })?;

    let json = output.report.to_json()?;
    let mut summary = BufWriter::new(File::create(&files.summary)?);
    writeln!(summary, "{}", json)?;
    summary.flush()?;

    write_log2_marker(&files.log2_marker, output.report.log2_transformed)?;

    info!(
        dir = %dir.display(),
        rows = output.observations.len(),
        clusters = output.statistics.len(),
        "Results written"
    );
    Ok(files)
}

fn write_file<F>(path: &Path, write: F) -> TrapezeResult<()>
where
    F: FnOnce(BufWriter<File>) -> IoResult<()>,
{
    create_output(path)
        .and_then(write)
        .map_err(TrapezeError::Output)
}

/// Create or remove the marker so it always matches the last run
fn write_log2_marker(path: &Path, transformed: bool) -> TrapezeResult<()> {
    if transformed {
        fs::write(path, "log2_transformed=true\n")?;
    } else if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
