use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::converter::Converter;
use crate::detector::DEFAULT_THRESHOLD;
use crate::formats::{DEFAULT_DURATION_MS, DETECTION_SAMPLE_LINES};
use crate::timing::FrameRate;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Conversion engine settings
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Output handling
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Conversion engine settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConversionConfig {
    /// Frame rate for frame-based formats when neither the input nor the
    /// command line provides one
    #[serde(default = "default_frame_rate")]
    pub default_frame_rate: f64,

    /// Display time in milliseconds for entries without an end time
    #[serde(default = "default_duration_ms")]
    pub default_duration_ms: u64,

    /// Minimum detection confidence (exclusive), between 0 and 1
    #[serde(default = "default_detection_threshold")]
    pub detection_threshold: f64,

    /// Number of non-blank lines sampled for detection
    #[serde(default = "default_sample_lines")]
    pub sample_lines: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            default_frame_rate: default_frame_rate(),
            default_duration_ms: default_duration_ms(),
            detection_threshold: default_detection_threshold(),
            sample_lines: default_sample_lines(),
        }
    }
}

/// Output handling settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OutputConfig {
    /// Overwrite existing output files
    #[serde(default)]
    pub force_overwrite: bool,

    /// Treat malformed entries as a failure
    #[serde(default)]
    pub strict: bool,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_frame_rate() -> f64 {
    23.976
}

fn default_duration_ms() -> u64 {
    DEFAULT_DURATION_MS
}

fn default_detection_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_sample_lines() -> usize {
    DETECTION_SAMPLE_LINES
}

impl Config {
    /// Load a configuration file, or write and return the defaults if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        config.save(path)?;
        Ok((config, true))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let conversion = &self.conversion;

        FrameRate::new(conversion.default_frame_rate)
            .map_err(|e| anyhow!("conversion.default_frame_rate: {}", e))?;

        if conversion.default_duration_ms == 0 {
            return Err(anyhow!("conversion.default_duration_ms must be greater than 0"));
        }

        if !(0.0..1.0).contains(&conversion.detection_threshold) {
            return Err(anyhow!(
                "conversion.detection_threshold must be in [0, 1), got {}",
                conversion.detection_threshold
            ));
        }

        if conversion.sample_lines == 0 {
            return Err(anyhow!("conversion.sample_lines must be greater than 0"));
        }

        Ok(())
    }

    /// Build a converter with all formats registered and this configuration applied
    pub fn build_converter(&self) -> Result<Converter> {
        self.validate()?;
        let frame_rate = FrameRate::new(self.conversion.default_frame_rate)?;
        Ok(Converter::default()
            .with_default_frame_rate(frame_rate)
            .with_default_duration(self.conversion.default_duration_ms)
            .with_detector_threshold(self.conversion.detection_threshold)
            .with_detector_sample_lines(self.conversion.sample_lines))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            conversion: ConversionConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
