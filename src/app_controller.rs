use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::converter::{Conversion, Converter};
use crate::detector::Detection;
use crate::errors::{AppError, ConversionError};
use crate::file_utils::FileManager;
use crate::formats::SubtitleFormat;

// @module: Application controller for subtitle conversion

/// What to convert to, and how
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    /// Input format name, `None` to detect
    pub source: Option<String>,

    /// Output format name
    pub target: String,

    /// Frame rate hint, e.g. from the video container
    pub frame_rate: Option<f64>,

    /// Overwrite existing output files
    pub force_overwrite: bool,

    /// Fail when any entry is malformed
    pub strict: bool,
}

impl ConvertRequest {
    pub fn new(target: &str) -> Self {
        Self {
            source: None,
            target: target.to_string(),
            frame_rate: None,
            force_overwrite: false,
            strict: false,
        }
    }
}

/// Result of converting one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Output written
    Converted {
        output_path: PathBuf,
        conversion: Conversion,
    },
    /// Output existed and overwriting was not requested
    Skipped { output_path: PathBuf },
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted { output_path, conversion } => write!(
                f,
                "Converted {} -> {}: {:?}",
                conversion.source_format, conversion.target_format, output_path
            ),
            Self::Skipped { output_path } => write!(
                f,
                "Output file already exists: {:?}. Use --force-overwrite to overwrite.",
                output_path
            ),
        }
    }
}

/// Totals of a directory conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Main application controller for subtitle conversion
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Engine built from the configuration
    converter: Converter,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let converter = config.build_converter()?;
        Ok(Self { config, converter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// Detect the format of a subtitle file.
    ///
    /// Returns the accepted detection together with every grammar's score.
    pub fn detect_file<P: AsRef<Path>>(&self, input: P) -> Result<(Detection, Vec<(SubtitleFormat, f64)>)> {
        let input = input.as_ref();
        let content = FileManager::read_to_string(input)?;
        let scores = self.converter.detector().scores(&content);
        let detection = self
            .converter
            .detect(&content)
            .map_err(AppError::from)?;
        debug!("{:?}: {} ({:.2})", input, detection.format, detection.confidence);
        Ok((detection, scores))
    }

    /// Convert a single file to `output_path`
    pub fn convert_file<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input: P1,
        output_path: P2,
        request: &ConvertRequest,
    ) -> Result<FileOutcome> {
        let input = input.as_ref();
        let output_path = output_path.as_ref();

        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input file does not exist: {:?}", input));
        }

        // Fail fast on the target before reading anything
        if request.target.parse::<SubtitleFormat>().is_err() {
            return Err(AppError::Conversion(ConversionError::UnsupportedTargetFormat(
                request.target.clone(),
            ))
            .into());
        }

        if output_path.exists() && !(request.force_overwrite || self.config.output.force_overwrite) {
            let outcome = FileOutcome::Skipped {
                output_path: output_path.to_path_buf(),
            };
            warn!("{}", outcome);
            return Ok(outcome);
        }

        let content = FileManager::read_to_string(input)?;
        let conversion = self
            .converter
            .convert(&content, request.source.as_deref(), &request.target, request.frame_rate)
            .map_err(AppError::from)?;

        for warning in &conversion.warnings {
            warn!("{:?} {}", input, warning);
        }
        if !conversion.warnings.is_empty() && (request.strict || self.config.output.strict) {
            return Err(AppError::Strict {
                path: input.display().to_string(),
                count: conversion.warnings.len(),
            }
            .into());
        }

        FileManager::write_to_file(output_path, &conversion.output)?;
        info!(
            "{:?}: {} -> {} ({} entries)",
            output_path, conversion.source_format, conversion.target_format, conversion.entries
        );

        Ok(FileOutcome::Converted {
            output_path: output_path.to_path_buf(),
            conversion,
        })
    }

    /// Convert every subtitle file under `input_dir` into `output_dir`,
    /// keeping file stems and using the target format's extension
    pub fn convert_folder<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_dir: P1,
        output_dir: P2,
        request: &ConvertRequest,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        let target: SubtitleFormat = request
            .target
            .parse()
            .map_err(|name: String| AppError::Conversion(ConversionError::UnsupportedTargetFormat(name)))?;

        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            warn!("No subtitle files found in directory: {:?}", input_dir);
            return Ok(BatchSummary::default());
        }
        info!("Converting {} file(s) from {:?}", files.len(), input_dir);

        let progress = ProgressBar::new(files.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let mut summary = BatchSummary::default();
        for file in &files {
            let relative = file.strip_prefix(input_dir).unwrap_or(file);
            let target_dir = relative
                .parent()
                .map(|parent| output_dir.join(parent))
                .unwrap_or_else(|| output_dir.to_path_buf());
            let output_path = FileManager::generate_output_path(file, &target_dir, target.extension());
            progress.set_message(relative.display().to_string());

            match self.convert_file(file, &output_path, request) {
                Ok(FileOutcome::Converted { .. }) => summary.converted += 1,
                Ok(FileOutcome::Skipped { .. }) => summary.skipped += 1,
                Err(e) => {
                    error!("Error converting {:?}: {}", file, e);
                    summary.failed.push((file.clone(), e.to_string()));
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!(
            "Finished: {} converted, {} skipped, {} failed",
            summary.converted,
            summary.skipped,
            summary.failed.len()
        );
        Ok(summary)
    }
}
