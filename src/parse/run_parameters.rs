//! Simulation run parameters encoded in report file names, like
//! `MessageCopyCountReport_P30_D2.5k.txt` for a mutation probability
//! of 30 and a transmission speed of 2.5k.

use std::path::Path;

use kstring::KString;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{record::RunParameters, warn};

lazy_static! {
    static ref SPEED: Regex = Regex::new(r"_D([0-9]+(?:\.[0-9]+)?)k").expect("valid regex");
    static ref PROBABILITY: Regex =
        Regex::new(r"_P([0-9]+(?:\.[0-9]+)?)_D").expect("valid regex");
}

/// Used when a file name does not carry the parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RunParameterDefaults {
    pub default_speed: String,
    pub default_probability: String,
}

impl Default for RunParameterDefaults {
    fn default() -> Self {
        Self {
            default_speed: "1.75".into(),
            default_probability: "0".into(),
        }
    }
}

pub fn extract_speed(file_name: &str) -> Option<&str> {
    Some(SPEED.captures(file_name)?.get(1)?.as_str())
}

pub fn extract_probability(file_name: &str) -> Option<&str> {
    Some(PROBABILITY.captures(file_name)?.get(1)?.as_str())
}

impl RunParameters {
    /// Extract the parameters from the file name of `path`; missing
    /// ones are warned about and taken from `defaults`.
    pub fn from_path(path: &Path, defaults: &RunParameterDefaults) -> Self {
        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        let speed = extract_speed(&file_name).unwrap_or_else(|| {
            warn!(
                "could not extract the transmission speed from {path:?}, \
                 using default {:?}",
                defaults.default_speed
            );
            defaults.default_speed.as_str()
        });
        let probability = extract_probability(&file_name).unwrap_or_else(|| {
            warn!(
                "could not extract the probability from {path:?}, using default {:?}",
                defaults.default_probability
            );
            defaults.default_probability.as_str()
        });
        RunParameters {
            probability: KString::from_ref(probability),
            speed: KString::from_ref(speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::utillib::logging::{LogLevel, set_log_level};

    use super::*;

    #[test]
    fn t_extract() {
        assert_eq!(extract_probability("run_P30_D2.5k.log"), Some("30"));
        assert_eq!(extract_speed("run_P30_D2.5k.log"), Some("2.5"));
        assert_eq!(extract_speed("run_P30_D2.5.log"), None);
        assert_eq!(extract_probability("run_P30.log"), None);
    }

    #[test]
    fn t_from_path_defaults() {
        set_log_level(LogLevel::Quiet);
        let defaults = RunParameterDefaults::default();
        let p = RunParameters::from_path(Path::new("reports/run_D4k.txt"), &defaults);
        assert_eq!(p.speed.as_str(), "4");
        assert_eq!(p.probability.as_str(), "0");

        // the directory part is not looked at
        let p = RunParameters::from_path(Path::new("x_P5_D1k/run.txt"), &defaults);
        assert_eq!(p.speed.as_str(), "1.75");
        assert_eq!(p.probability.as_str(), "0");
    }
}
