//! Conversion of parsed report data into plot series.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet, HashMap},
};

use kstring::KString;

use crate::{
    record::{ContactTimeRow, Record, RunParameters, TaggedRecord},
    render::PlotSeries,
};

/// One series per distinct series name, in order of first appearance.
pub fn series_from_records(records: &[Record]) -> Vec<PlotSeries> {
    let mut index: HashMap<&KString, usize> = HashMap::new();
    let mut result: Vec<PlotSeries> = Vec::new();
    for Record {
        time,
        series,
        value,
    } in records
    {
        let i = *index.entry(series).or_insert_with(|| {
            result.push(PlotSeries {
                label: series.clone(),
                points: Vec::new(),
            });
            result.len() - 1
        });
        result[i].points.push((*time as f64, *value as f64));
    }
    result
}

pub fn series_from_contact_times(rows: &[ContactTimeRow]) -> PlotSeries {
    PlotSeries {
        label: KString::from_static("ContactTime"),
        points: rows
            .iter()
            .map(|ContactTimeRow { time, contact_time }| (*time, *contact_time))
            .collect(),
    }
}

/// Compare parameter values numerically if both parse as numbers.
fn cmp_parameter(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(a), Ok(b)) => a.total_cmp(&b),
        _ => a.cmp(b),
    }
}

/// Lines for multi-file mode: the mean value across all series at
/// each time step, one line per probability. If the records carry
/// more than one distinct speed, one line per (probability, speed)
/// instead.
pub fn series_by_run_parameters(records: &[TaggedRecord]) -> Vec<PlotSeries> {
    let speeds: BTreeSet<&KString> = records.iter().map(|r| &r.parameters.speed).collect();
    let by_speed_too = speeds.len() > 1;

    let key = |parameters: &RunParameters| -> RunParameters {
        if by_speed_too {
            parameters.clone()
        } else {
            RunParameters {
                probability: parameters.probability.clone(),
                speed: KString::from_static(""),
            }
        }
    };

    // key -> time -> (sum, count)
    let mut sums: HashMap<RunParameters, BTreeMap<u64, (u128, u64)>> = HashMap::new();
    for TaggedRecord { record, parameters } in records {
        let (sum, count) = sums
            .entry(key(parameters))
            .or_default()
            .entry(record.time)
            .or_default();
        *sum += u128::from(record.value);
        *count += 1;
    }

    let mut keys: Vec<&RunParameters> = sums.keys().collect();
    keys.sort_by(|a, b| {
        cmp_parameter(&a.probability, &b.probability).then_with(|| cmp_parameter(&a.speed, &b.speed))
    });
    keys.into_iter()
        .map(|parameters| {
            let label = if by_speed_too {
                KString::from_string(parameters.to_string())
            } else {
                parameters.probability.clone()
            };
            let points = sums[parameters]
                .iter()
                .map(|(time, (sum, count))| (*time as f64, *sum as f64 / *count as f64))
                .collect();
            PlotSeries { label, points }
        })
        .collect()
}
