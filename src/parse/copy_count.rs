//! Message copy count reports: bracketed timestamp lines, each
//! followed by data lines `<prefix><id> <count>` that belong to that
//! timestamp.
//!
//! ```text
//! [600]
//! M1 3
//! M2 1
//! [1200]
//! M1 5
//! ```

use anyhow::{Result, bail};
use itertools::Itertools;
use kstring::KString;
use lazy_static::lazy_static;
use regex::Regex;

use crate::{ctx, record::Record};

use super::ParseError;

lazy_static! {
    static ref FIRST_INTEGER: Regex = Regex::new(r"\d+").expect("valid regex");
}

/// The kinds of lines in a copy count report.
#[derive(Debug, PartialEq, Eq)]
pub enum CopyCountLine<'l> {
    Timestamp(u64),
    DataPoint { name: &'l str, count: u64 },
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct CopyCountGrammar {
    prefixes: Vec<KString>,
    data_point: Regex,
}

impl CopyCountGrammar {
    /// `prefixes` are the series name prefixes that mark data lines
    /// (e.g. "M" for messages).
    pub fn new<S: AsRef<str>>(prefixes: &[S]) -> Result<Self> {
        if prefixes.is_empty() {
            bail!("need at least one series name prefix")
        }
        if let Some(empty) = prefixes.iter().position(|p| p.as_ref().is_empty()) {
            bail!("series name prefix at index {empty} is the empty string")
        }
        let alternatives = prefixes
            .iter()
            .map(|p| regex::escape(p.as_ref()))
            .join("|");
        let data_point = Regex::new(&format!(r"^((?:{alternatives})\d+)[ \t]+(\d+)"))
            .map_err(ctx!("building regex for series prefixes {alternatives:?}"))?;
        Ok(Self {
            prefixes: prefixes.iter().map(|p| KString::from_ref(p.as_ref())).collect(),
            data_point,
        })
    }

    /// Classify a single line; `lineno` is only used for errors.
    pub fn parse_line<'l>(
        &self,
        line: &'l str,
        lineno: usize,
    ) -> Result<CopyCountLine<'l>, ParseError> {
        if line.starts_with('[') {
            let time = FIRST_INTEGER
                .find(line)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(|| ParseError::Timestamp {
                    lineno,
                    line: line.into(),
                })?;
            Ok(CopyCountLine::Timestamp(time))
        } else if self.prefixes.iter().any(|p| line.starts_with(p.as_str())) {
            let err = || ParseError::DataPoint {
                lineno,
                line: line.into(),
            };
            let caps = self.data_point.captures(line).ok_or_else(err)?;
            let name = caps.get(1).ok_or_else(err)?.as_str();
            let count = caps
                .get(2)
                .ok_or_else(err)?
                .as_str()
                .parse()
                .map_err(|_| err())?;
            Ok(CopyCountLine::DataPoint { name, count })
        } else {
            Ok(CopyCountLine::Unrecognized)
        }
    }

    /// Parse a whole report. Every record gets the time of the
    /// nearest preceding timestamp line.
    pub fn parse_str(&self, s: &str) -> Result<Vec<Record>, ParseError> {
        let mut records = Vec::new();
        let mut current_time = None;
        for (lineno0, line) in s.lines().enumerate() {
            let lineno = lineno0 + 1;
            match self.parse_line(line, lineno)? {
                CopyCountLine::Timestamp(time) => current_time = Some(time),
                CopyCountLine::DataPoint { name, count } => {
                    let time = current_time.ok_or_else(|| ParseError::DataBeforeTimestamp {
                        lineno,
                        line: line.into(),
                    })?;
                    records.push(Record::new(time, name, count));
                }
                CopyCountLine::Unrecognized => (),
            }
        }
        Ok(records)
    }
}

impl Default for CopyCountGrammar {
    fn default() -> Self {
        Self::new(&["M", "R"]).expect("default prefixes are valid")
    }
}
