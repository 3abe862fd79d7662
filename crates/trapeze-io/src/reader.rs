//! Paired-observation reader
//!
//! Reads two numeric columns (X, Y) from comma-, tab- or
//! whitespace-separated text. The delimiter and an optional header line are
//! detected from the first non-empty line.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("No valid data found in {0}")]
    NoData(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;

/// Field separator of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
    /// Any run of spaces or tabs
    Whitespace,
}

impl Delimiter {
    /// Detect the delimiter from a sample line
    ///
    /// A comma wins over a tab; anything else is whitespace-separated.
    pub fn detect(line: &str) -> Self {
        if line.contains(',') {
            Delimiter::Comma
        } else if line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Whitespace
        }
    }

    /// Single-byte delimiter for the csv reader, if any
    pub fn as_byte(&self) -> Option<u8> {
        match self {
            Delimiter::Comma => Some(b','),
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Whitespace => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Delimiter::Comma => "comma",
            Delimiter::Tab => "tab",
            Delimiter::Whitespace => "whitespace",
        }
    }
}

/// What the reader saw while loading a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadStats {
    /// Detected delimiter
    pub delimiter: Delimiter,
    /// Header line, if one was skipped
    pub header: Option<String>,
    /// Number of rows parsed into pairs
    pub rows: usize,
    /// 1-based line numbers that could not be parsed
    pub skipped_lines: Vec<usize>,
}

/// Parsed (X, Y) pairs plus read diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct PairTable {
    pub pairs: Vec<(f64, f64)>,
    pub stats: ReadStats,
}

impl PairTable {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Read paired observations from a file
///
/// Fails with [`IoError::NoData`] when no line yields a numeric pair.
pub fn read_pairs(path: impl AsRef<Path>) -> IoResult<PairTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }

    let text = fs::read_to_string(path).map_err(|e| IoError::OpenFailed(e.to_string()))?;
    let table = parse_pairs(&text)?;
    if table.is_empty() {
        return Err(IoError::NoData(path.display().to_string()));
    }

    tracing::info!(
        "Loaded {} data points from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Parse paired observations from text
///
/// Returns an empty table (not an error) when nothing parses; callers that
/// need data check [`PairTable::is_empty`].
pub fn parse_pairs(text: &str) -> IoResult<PairTable> {
    let Some(first_line) = text.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(PairTable {
            pairs: Vec::new(),
            stats: ReadStats {
                delimiter: Delimiter::Whitespace,
                header: None,
                rows: 0,
                skipped_lines: Vec::new(),
            },
        });
    };

    let delimiter = Delimiter::detect(first_line.trim());
    tracing::info!("Detected delimiter: {}", delimiter.name());

    let records = split_records(text, delimiter)?;

    let mut pairs = Vec::with_capacity(records.len());
    let mut header = None;
    let mut skipped_lines = Vec::new();

    for (i, (line_num, fields)) in records.iter().enumerate() {
        if i == 0 && is_header(fields) {
            let line = fields.join(" ");
            tracing::info!("Skipping header line: {}", preview(&line));
            header = Some(line);
            continue;
        }

        match parse_fields(fields) {
            Some(pair) => pairs.push(pair),
            None => {
                tracing::warn!(
                    "Could not parse line {}: {}",
                    line_num,
                    preview(&fields.join(" "))
                );
                skipped_lines.push(*line_num);
            }
        }
    }

    let rows = pairs.len();
    Ok(PairTable {
        pairs,
        stats: ReadStats {
            delimiter,
            header,
            rows,
            skipped_lines,
        },
    })
}

/// Split text into non-empty records of trimmed fields, tagged with their
/// 1-based line number
fn split_records(text: &str, delimiter: Delimiter) -> IoResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();

    match delimiter.as_byte() {
        Some(byte) => {
            let mut reader = csv::ReaderBuilder::new()
                .delimiter(byte)
                .has_headers(false)
                .flexible(true)
                .quoting(false)
                .trim(csv::Trim::All)
                .from_reader(text.as_bytes());

            for result in reader.records() {
                let record = result.map_err(|e| IoError::InvalidFormat(e.to_string()))?;
                if record.iter().all(|field| field.is_empty()) {
                    continue;
                }
                let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
                records.push((line, record.iter().map(str::to_string).collect()));
            }
        }
        None => {
            for (i, line) in text.lines().enumerate() {
                let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
                if !fields.is_empty() {
                    records.push((i + 1, fields));
                }
            }
        }
    }

    Ok(records)
}

/// A header has at least two fields and its first two are not both numbers
fn is_header(fields: &[String]) -> bool {
    fields.len() >= 2 && !fields[..2].iter().all(|f| f.parse::<f64>().is_ok())
}

/// Parse the first two fields as finite floats
fn parse_fields(fields: &[String]) -> Option<(f64, f64)> {
    let x = parse_number(fields.first()?)?;
    let y = parse_number(fields.get(1)?)?;
    Some((x, y))
}

fn parse_number(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn preview(line: &str) -> String {
    const LIMIT: usize = 50;
    if line.chars().count() > LIMIT {
        let head: String = line.chars().take(LIMIT).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(Delimiter::detect("1,2"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("1\t2"), Delimiter::Tab);
        assert_eq!(Delimiter::detect("1 2"), Delimiter::Whitespace);
        assert_eq!(Delimiter::detect("1,\t2"), Delimiter::Comma);
    }

    #[test]
    fn test_parse_whitespace_with_header() {
        let table = parse_pairs("X Y\n1 2\n3   4\n").unwrap();
        assert_eq!(table.pairs, vec![(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(table.stats.delimiter, Delimiter::Whitespace);
        assert_eq!(table.stats.header.as_deref(), Some("X Y"));
    }

    #[test]
    fn test_parse_comma_without_header() {
        let table = parse_pairs("1.5, 2.5\n-3,4e1\n").unwrap();
        assert_eq!(table.pairs, vec![(1.5, 2.5), (-3.0, 40.0)]);
        assert_eq!(table.stats.header, None);
    }

    #[test]
    fn test_parse_tab_extra_columns_and_blank_lines() {
        let table = parse_pairs("before\tafter\tgene\n\n1\t2\tA\n\n5\t6\tB\n").unwrap();
        assert_eq!(table.pairs, vec![(1.0, 2.0), (5.0, 6.0)]);
        assert_eq!(table.stats.delimiter, Delimiter::Tab);
    }

    #[test]
    fn test_unparseable_lines_are_skipped() {
        let table = parse_pairs("1 2\nfoo bar\n3\n4 5\n").unwrap();
        assert_eq!(table.pairs, vec![(1.0, 2.0), (4.0, 5.0)]);
        assert_eq!(table.stats.skipped_lines, vec![2, 3]);
    }

    #[test]
    fn test_stray_quote_skips_only_its_line() {
        let table = parse_pairs("1,2\n\"3,4\n5,6\n7,8\n").unwrap();
        assert_eq!(table.pairs, vec![(1.0, 2.0), (5.0, 6.0), (7.0, 8.0)]);
        assert_eq!(table.stats.skipped_lines, vec![2]);
    }

    #[test]
    fn test_header_only_checked_on_first_line() {
        let table = parse_pairs("1 2\nX Y\n").unwrap();
        assert_eq!(table.stats.header, None);
        assert_eq!(table.stats.skipped_lines, vec![2]);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let table = parse_pairs("1 NaN\ninf 2\n3 4\n").unwrap();
        assert_eq!(table.pairs, vec![(3.0, 4.0)]);
    }

    #[test]
    fn test_empty_input() {
        let table = parse_pairs("\n  \n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_preview_truncates() {
        let long = "a".repeat(60);
        assert_eq!(preview(&long).len(), 53);
        assert_eq!(preview("short"), "short");
    }
}
