//! The data parsed from the reports.

use std::fmt::Display;

use kstring::KString;

/// One observation of a named series (e.g. the copy count of one
/// message) at a time step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub time: u64,
    pub series: KString,
    pub value: u64,
}

impl Record {
    pub fn new(time: u64, series: &str, value: u64) -> Self {
        Self {
            time,
            series: KString::from_ref(series),
            value,
        }
    }
}

/// The largest time value, which for valid reports is that of the
/// last timestamp line.
pub fn last_time(records: &[Record]) -> Option<u64> {
    records.iter().map(|r| r.time).max()
}

/// The run parameters encoded in a report's file name, in the format
/// as written there (no number parsing happens, the values are only
/// used for labeling and grouping).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunParameters {
    pub probability: KString,
    pub speed: KString,
}

impl Display for RunParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self { probability, speed } = self;
        write!(f, "P={probability}, {speed}k")
    }
}

/// A `Record` from one of several input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedRecord {
    pub record: Record,
    pub parameters: RunParameters,
}

/// One row of a contact time report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactTimeRow {
    pub time: f64,
    pub contact_time: f64,
}

/// The wedges of the message stats pie chart, in legend order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatLabel {
    Success,
    Aborted,
    Dropped,
    Removed,
    Delivered,
}

impl StatLabel {
    pub const ALL: [StatLabel; 5] = [
        StatLabel::Success,
        StatLabel::Aborted,
        StatLabel::Dropped,
        StatLabel::Removed,
        StatLabel::Delivered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatLabel::Success => "Success",
            StatLabel::Aborted => "Aborted",
            StatLabel::Dropped => "Dropped",
            StatLabel::Removed => "Removed",
            StatLabel::Delivered => "Delivered",
        }
    }
}

impl Display for StatLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatEntry {
    pub label: StatLabel,
    pub value: u64,
}

/// Non-zero entries only, in `StatLabel::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatVector(pub Vec<StatEntry>);

impl StatVector {
    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<u64> {
        self.0.iter().map(|e| e.value).collect()
    }
}
