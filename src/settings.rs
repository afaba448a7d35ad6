use crate::nca::NCAOptions;
use crate::paired::Parameter;
use config::Config as eConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of environment variables overriding the settings file
///
/// Sections and keys are separated by a double underscore, e.g.
/// `CROSSNCA_POWER__EFFECT_SIZE=-1.2` or `CROSSNCA_LOG__LEVEL=debug`.
pub const ENV_PREFIX: &str = "CROSSNCA";

/// Name of the resolved settings written to the output folder
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting {key} = {value}")]
    Invalid { key: String, value: String },
}

fn invalid(key: &str, value: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Settings {
    pub paths: Paths,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub nca: NCAOptions,
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub power: Power,
    #[serde(default)]
    pub output: Output,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Paths {
    /// Observation file with the `ID`, `TAD`, `DV`, `IND` and `DOSE` columns
    pub data: String,
    /// Folder receiving every output file
    #[serde(default = "default_output")]
    pub output: String,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Log {
    /// `EnvFilter` directive, e.g. `info` or `crossnca=debug`
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file inside the output folder, none when unset
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Analysis {
    /// Confidence level of the GMR and mean difference intervals
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Parameters compared by the paired tests
    #[serde(default = "default_test_parameters")]
    pub test_parameters: Vec<Parameter>,
    /// Report clearance in L/h instead of mL/h
    #[serde(default = "default_true")]
    pub clearance_in_l_per_h: bool,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            confidence_level: default_confidence_level(),
            test_parameters: default_test_parameters(),
            clearance_in_l_per_h: true,
        }
    }
}

/// Sample size calculation for a paired two-sided t-test
#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Power {
    /// Cohen's d of the expected within-subject difference
    #[serde(default = "default_effect_size")]
    pub effect_size: f64,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_power")]
    pub power: f64,
}

impl Default for Power {
    fn default() -> Self {
        Self {
            effect_size: default_effect_size(),
            alpha: default_alpha(),
            power: default_power(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq)]
pub struct Output {
    #[serde(default = "default_true")]
    pub plots: bool,
    #[serde(default = "default_true")]
    pub write_settings: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            plots: true,
            write_settings: true,
        }
    }
}

impl Settings {
    /// Default settings for a data file and output folder
    pub fn new(data: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            paths: Paths {
                data: data.into(),
                output: output.into(),
            },
            log: Log::default(),
            nca: NCAOptions::default(),
            analysis: Analysis::default(),
            power: Power::default(),
            output: Output::default(),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.paths.output)
    }

    /// Reject values no stage can work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let open_unit = |v: f64| v > 0.0 && v < 1.0;

        if self.paths.data.trim().is_empty() {
            return Err(invalid("paths.data", "\"\""));
        }
        if !open_unit(self.analysis.confidence_level) {
            return Err(invalid(
                "analysis.confidence_level",
                self.analysis.confidence_level,
            ));
        }
        if !open_unit(self.power.alpha) {
            return Err(invalid("power.alpha", self.power.alpha));
        }
        if !open_unit(self.power.power) {
            return Err(invalid("power.power", self.power.power));
        }
        if !self.power.effect_size.is_finite() || self.power.effect_size == 0.0 {
            return Err(invalid("power.effect_size", self.power.effect_size));
        }
        self.nca
            .validate()
            .map_err(|e| invalid("nca", e.to_string()))?;
        Ok(())
    }

    /// Write the resolved settings as JSON into the output folder
    pub fn write(&self) -> Result<PathBuf, std::io::Error> {
        let serialized = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let dir = self.output_dir();
        std::fs::create_dir_all(&dir)?;
        let file_path = dir.join(SETTINGS_FILE);
        std::fs::write(&file_path, serialized)?;
        Ok(file_path)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build(path: &Path, env: config::Environment) -> Result<Settings, SettingsError> {
    let parsed = eConfig::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(env)
        .build()?;

    let settings: Settings = parsed.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

/// Read a TOML settings file, overridden by `CROSSNCA_*` environment variables
pub fn read_settings(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    build(path.as_ref(), environment())
}

// *********************************
// Default values for deserializing
// *********************************
fn default_true() -> bool {
    true
}

fn default_output() -> String {
    "outputs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_test_parameters() -> Vec<Parameter> {
    vec![Parameter::AucLast, Parameter::Tmax]
}

fn default_effect_size() -> f64 {
    -1.68
}

fn default_alpha() -> f64 {
    0.05
}

fn default_power() -> f64 {
    0.8
}
