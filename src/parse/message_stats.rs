//! Message stats reports: `key: value` lines, of which only the
//! message counters are of interest here.
//!
//! ```text
//! Message stats for scenario default_scenario
//! sim_time: 43200.0000
//! created: 120
//! started: 10
//! relayed: 7
//! aborted: 3
//! dropped: 2
//! removed: 0
//! delivered: 1
//! delivery_prob: 0.0083
//! ```

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use strum_macros::EnumString;

use crate::record::{StatEntry, StatLabel, StatVector};

use super::ParseError;

lazy_static! {
    static ref STAT_LINE: Regex =
        Regex::new(r"^(?i)(started|relayed|aborted|dropped|removed|delivered)\s*:\s*(.*)$")
            .expect("valid regex");
}

#[derive(Debug, EnumString, PartialEq, Eq, Clone, Copy)]
#[strum(serialize_all = "snake_case")]
pub enum StatKey {
    Started,
    Relayed,
    /// Ignored, computed as `started - relayed` instead
    Aborted,
    Dropped,
    Removed,
    Delivered,
}

impl StatKey {
    fn as_str(self) -> &'static str {
        match self {
            StatKey::Started => "started",
            StatKey::Relayed => "relayed",
            StatKey::Aborted => "aborted",
            StatKey::Dropped => "dropped",
            StatKey::Removed => "removed",
            StatKey::Delivered => "delivered",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StatLine {
    Stat { key: StatKey, value: Option<u64> },
    Unrecognized,
}

pub fn parse_line(line: &str, lineno: usize) -> Result<StatLine, ParseError> {
    let Some(caps) = STAT_LINE.captures(line.trim_end()) else {
        return Ok(StatLine::Unrecognized);
    };
    let key = StatKey::from_str(&caps[1].to_ascii_lowercase())
        .expect("regex only matches known keys");
    if key == StatKey::Aborted {
        return Ok(StatLine::Stat { key, value: None });
    }
    let value = caps[2]
        .trim()
        .parse()
        .map_err(|_| ParseError::StatValue {
            key: key.as_str(),
            lineno,
            line: line.into(),
        })?;
    Ok(StatLine::Stat {
        key,
        value: Some(value),
    })
}

/// The message counters of a stats report; missing ones are 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MessageStats {
    pub started: u64,
    pub relayed: u64,
    pub dropped: u64,
    pub removed: u64,
    pub delivered: u64,
}

impl MessageStats {
    pub fn parse_str(s: &str) -> Result<Self, ParseError> {
        let mut stats = MessageStats::default();
        for (lineno0, line) in s.lines().enumerate() {
            if let StatLine::Stat {
                key,
                value: Some(value),
            } = parse_line(line, lineno0 + 1)?
            {
                let field = match key {
                    StatKey::Started => &mut stats.started,
                    StatKey::Relayed => &mut stats.relayed,
                    StatKey::Dropped => &mut stats.dropped,
                    StatKey::Removed => &mut stats.removed,
                    StatKey::Delivered => &mut stats.delivered,
                    StatKey::Aborted => continue,
                };
                *field = value;
            }
        }
        Ok(stats)
    }

    /// Transfers that were started but did not complete.
    pub fn aborted(&self) -> u64 {
        self.started.saturating_sub(self.relayed)
    }

    pub fn value(&self, label: StatLabel) -> u64 {
        match label {
            StatLabel::Success => self.relayed,
            StatLabel::Aborted => self.aborted(),
            StatLabel::Dropped => self.dropped,
            StatLabel::Removed => self.removed,
            StatLabel::Delivered => self.delivered,
        }
    }

    /// The pie chart data: zero entries are left out.
    pub fn stat_vector(&self) -> StatVector {
        StatVector(
            StatLabel::ALL
                .iter()
                .map(|label| StatEntry {
                    label: *label,
                    value: self.value(*label),
                })
                .filter(|entry| entry.value != 0)
                .collect(),
        )
    }
}
