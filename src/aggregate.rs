//! Folding of series with low values into a single "Others" series,
//! to keep chart legends readable.
//!
//! Decisions are made from the values at the last time step only, and
//! then applied to all time steps: series below `total_threshold`
//! are dropped, the remaining ones below `visibility_threshold` are
//! summed up into `others_label` at every time step.

use std::collections::{BTreeMap, BTreeSet};

use kstring::KString;
use serde::{Deserialize, Serialize};

use crate::{
    debug, info,
    record::{Record, last_time},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AggregationConfig {
    /// Series with a last value below this are dropped
    pub total_threshold: u64,
    /// Series with a last value below this are merged into "Others"
    pub visibility_threshold: u64,
    /// Only aggregate if at least this many series are present at the
    /// last time step
    pub min_distinct_series: usize,
    pub others_label: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            total_threshold: 1,
            visibility_threshold: 2,
            min_distinct_series: 3,
            others_label: "Others".into(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AggregateError {
    #[error("the sum of the merged series at time {time} does not fit into a count")]
    Overflow { time: u64 },
}

/// What `aggregate` decided, for logging and tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AggregationSummary {
    pub dropped: BTreeSet<KString>,
    pub merged: BTreeSet<KString>,
}

/// Fold low-value series into `config.others_label`. Returns the
/// records unchanged if fewer than `config.min_distinct_series`
/// series exist at the last time step. Series that have no value at
/// the last time step are kept as they are.
pub fn aggregate(
    records: Vec<Record>,
    config: &AggregationConfig,
) -> Result<(Vec<Record>, AggregationSummary), AggregateError> {
    let Some(last) = last_time(&records) else {
        return Ok((records, AggregationSummary::default()));
    };

    // Value per series at the last time step (the later line wins if
    // a series appears twice there)
    let mut last_values: BTreeMap<&KString, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.time == last) {
        last_values.insert(&record.series, record.value);
    }
    if last_values.len() < config.min_distinct_series {
        debug!(
            "only {} series at the last time step {last}, not aggregating",
            last_values.len()
        );
        return Ok((records, AggregationSummary::default()));
    }

    let mut summary = AggregationSummary::default();
    for (series, value) in &last_values {
        if *value < config.total_threshold {
            summary.dropped.insert((*series).clone());
        } else if *value < config.visibility_threshold {
            summary.merged.insert((*series).clone());
        }
    }
    drop(last_values);
    info!(
        "aggregation: dropping {} series, merging {} series into {:?}",
        summary.dropped.len(),
        summary.merged.len(),
        config.others_label
    );
    if summary.dropped.is_empty() && summary.merged.is_empty() {
        return Ok((records, summary));
    }

    // Records are grouped by time as they appear; the sum is
    // appended after the kept records of each group.
    let others = KString::from_ref(&config.others_label);
    let mut result = Vec::with_capacity(records.len());
    let mut current: Option<(u64, u64)> = None;
    let flush = |current: Option<(u64, u64)>, result: &mut Vec<Record>| {
        if let Some((time, sum)) = current {
            if !summary.merged.is_empty() {
                result.push(Record {
                    time,
                    series: others.clone(),
                    value: sum,
                });
            }
        }
    };
    for record in records {
        match current {
            Some((time, _)) if time == record.time => (),
            _ => {
                flush(current, &mut result);
                current = Some((record.time, 0));
            }
        }
        if summary.dropped.contains(&record.series) {
            continue;
        }
        if summary.merged.contains(&record.series) {
            if let Some((time, sum)) = &mut current {
                *sum = sum
                    .checked_add(record.value)
                    .ok_or(AggregateError::Overflow { time: *time })?;
            }
            continue;
        }
        result.push(record);
    }
    flush(current, &mut result);

    Ok((result, summary))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    fn r(time: u64, series: &str, value: u64) -> Record {
        Record::new(time, series, value)
    }

    fn three_steps() -> Vec<Record> {
        vec![
            r(0, "M1", 1),
            r(0, "M2", 1),
            r(0, "M3", 1),
            r(600, "M1", 0),
            r(600, "M2", 1),
            r(600, "M3", 5),
            r(600, "M4", 2),
            r(1200, "M1", 0),
            r(1200, "M2", 1),
            r(1200, "M3", 5),
            r(1200, "M5", 1),
        ]
    }

    #[test]
    fn t_drop_and_merge() -> Result<()> {
        let (records, summary) = aggregate(three_steps(), &AggregationConfig::default())?;
        assert_eq!(
            summary.dropped.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            ["M1"]
        );
        assert_eq!(
            summary.merged.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
            ["M2", "M5"]
        );
        assert_eq!(
            records,
            vec![
                r(0, "M3", 1),
                r(0, "Others", 1),
                // M4 is not present at the last time step, thus kept
                r(600, "M3", 5),
                r(600, "M4", 2),
                r(600, "Others", 1),
                r(1200, "M3", 5),
                r(1200, "Others", 2),
            ]
        );
        Ok(())
    }

    #[test]
    fn t_others_is_sum_of_merged() -> Result<()> {
        let input = three_steps();
        let (records, summary) = aggregate(input.clone(), &AggregationConfig::default())?;
        for time in [0, 600, 1200] {
            let expected: u64 = input
                .iter()
                .filter(|r| r.time == time && summary.merged.contains(&r.series))
                .map(|r| r.value)
                .sum();
            let others = records
                .iter()
                .find(|r| r.time == time && r.series.as_str() == "Others")
                .expect("Others present at every time step");
            assert_eq!(others.value, expected);
        }
        Ok(())
    }

    #[test]
    fn t_zero_sum_others() -> Result<()> {
        let input = vec![
            r(0, "M1", 4),
            r(600, "M1", 4),
            r(600, "M2", 1),
            r(600, "M3", 3),
        ];
        let (records, _) = aggregate(input, &AggregationConfig::default())?;
        assert_eq!(
            records,
            vec![
                r(0, "M1", 4),
                r(0, "Others", 0),
                r(600, "M1", 4),
                r(600, "M3", 3),
                r(600, "Others", 1),
            ]
        );
        Ok(())
    }

    #[test]
    fn t_fewer_than_three_series() -> Result<()> {
        let input = vec![r(0, "M1", 0), r(600, "M1", 0), r(600, "M2", 1)];
        let (records, summary) = aggregate(input.clone(), &AggregationConfig::default())?;
        assert_eq!(records, input);
        assert_eq!(summary, AggregationSummary::default());
        Ok(())
    }

    #[test]
    fn t_threshold_is_strict() -> Result<()> {
        // exactly at the thresholds passes
        let input = vec![r(0, "M1", 1), r(0, "M2", 2), r(0, "M3", 2)];
        let (records, summary) = aggregate(
            input.clone(),
            &AggregationConfig {
                total_threshold: 1,
                visibility_threshold: 1,
                ..Default::default()
            },
        )?;
        assert_eq!(records, input);
        assert!(summary.dropped.is_empty() && summary.merged.is_empty());
        Ok(())
    }

    #[test]
    fn t_idempotent() -> Result<()> {
        let config = AggregationConfig::default();
        let (once, _) = aggregate(three_steps(), &config)?;
        let (twice, _) = aggregate(once.clone(), &config)?;
        assert_eq!(once, twice);

        let input = vec![r(0, "M1", 0), r(0, "M2", 1), r(0, "M3", 5), r(0, "M4", 1)];
        let (once, _) = aggregate(input, &config)?;
        let (twice, _) = aggregate(once.clone(), &config)?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn t_empty() -> Result<()> {
        let (records, summary) = aggregate(Vec::new(), &AggregationConfig::default())?;
        assert!(records.is_empty());
        assert_eq!(summary, AggregationSummary::default());
        Ok(())
    }

    #[test]
    fn t_others_overflow() {
        let input = vec![
            r(0, "M1", u64::MAX),
            r(600, "M1", 1),
            r(600, "M2", 1),
            r(600, "M3", 5),
        ];
        // a single merged series at its maximum still fits
        assert!(aggregate(input, &AggregationConfig::default()).is_ok());

        let input = vec![
            r(0, "M1", u64::MAX),
            r(0, "M2", 1),
            r(0, "M3", 5),
            r(600, "M1", 1),
            r(600, "M2", 1),
            r(600, "M3", 5),
        ];
        assert_eq!(
            aggregate(input, &AggregationConfig::default()),
            Err(AggregateError::Overflow { time: 0 })
        );
    }
}
