//! The configuration file, in JSON5 format.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    aggregate::AggregationConfig,
    ctx, info,
    parse::{copy_count::CopyCountGrammar, run_parameters::RunParameterDefaults},
    utillib::home::home_dir,
};

/// Returns None if the file does not exist
pub fn try_load_json5_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(serde_json5::from_str(&s).with_context(|| {
            anyhow!("decoding JSON5 from config file {path:?}")
        })?)),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(None),
            _ => bail!("loading config file from {path:?}: {e}"),
        },
    }
}

pub trait LoadConfigFile: Default + DeserializeOwned {
    /// None if there is no default location (e.g. no home directory)
    fn default_config_path() -> Result<Option<PathBuf>>;

    /// If `path` is given, the file must exist. Otherwise the default
    /// location is tried, and if there is no file there, the
    /// `Default` instance is used.
    fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(path) = path {
            let path = path.as_ref();
            try_load_json5_file(path)?
                .ok_or_else(|| anyhow!("file with specified location {path:?} does not exist"))
        } else if let Some(path) = Self::default_config_path()? {
            if let Some(config) = try_load_json5_file(&path)? {
                info!("loaded config from {path:?}");
                Ok(config)
            } else {
                info!("no config file at {path:?}, using defaults");
                Ok(Self::default())
            }
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PlotConfig {
    /// Thresholds for folding low-value series into "Others" in
    /// single-file copy count plots
    pub aggregation: AggregationConfig,

    /// Values used when a file name in multi-file mode does not carry
    /// the run parameters
    pub run_parameters: RunParameterDefaults,

    /// The prefixes of data lines in copy count reports
    pub series_prefixes: Vec<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            aggregation: Default::default(),
            run_parameters: Default::default(),
            series_prefixes: vec!["M".into(), "R".into()],
        }
    }
}

impl LoadConfigFile for PlotConfig {
    fn default_config_path() -> Result<Option<PathBuf>> {
        // Without $HOME, only the defaults are used
        Ok(home_dir().ok().map(|home| home.join(".onesim-plot.json5")))
    }
}

impl PlotConfig {
    pub fn copy_count_grammar(&self) -> Result<CopyCountGrammar> {
        CopyCountGrammar::new(self.series_prefixes.as_slice())
            .map_err(ctx!("invalid `series_prefixes` in config"))
    }

    /// The effective configuration as JSON, for `--print-config`.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow!("serializing config: {e}"))
    }
}
