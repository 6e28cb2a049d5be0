//! Line grammars for the simulator's report formats.
//!
//! Each format is parsed line by line; every line is classified into
//! a per-format line kind first, then the kinds are folded into the
//! result. Lines that don't belong to the format are skipped, lines
//! that look like they do but don't have the expected structure are
//! errors.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

pub mod contact_time;
pub mod copy_count;
pub mod message_stats;
pub mod run_parameters;

/// A line did not have the expected structure. Line numbers are
/// 1-based.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("cannot extract timestamp in line {lineno}: {line:?}")]
    Timestamp { lineno: usize, line: String },
    #[error("cannot extract count in line {lineno}: {line:?}")]
    DataPoint { lineno: usize, line: String },
    #[error("data line {lineno} comes before any timestamp line: {line:?}")]
    DataBeforeTimestamp { lineno: usize, line: String },
    #[error("expecting two numeric columns in line {lineno}: {line:?}")]
    ContactTimeRow { lineno: usize, line: String },
    #[error("cannot extract the value for {key:?} in line {lineno}: {line:?}")]
    StatValue {
        key: &'static str,
        lineno: usize,
        line: String,
    },
}

/// Read a report file and parse it with `parse`, adding the path to
/// errors.
pub fn parse_file<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> Result<T, ParseError>,
) -> Result<T> {
    let s = std::fs::read_to_string(path).with_context(|| anyhow!("reading file {path:?}"))?;
    parse(&s).with_context(|| anyhow!("parsing file {path:?}"))
}
