/*!
 * Conversion orchestration.
 *
 * `Converter::convert` resolves the target grammar, picks the source grammar
 * (explicit or detected), parses into a `SubtitleDocument` and renders it in
 * the target format. Converting a format to itself still goes through the
 * document, so the output is normalised rather than copied.
 */

use std::sync::Arc;

use log::{debug, info, warn};

use crate::detector::{Detection, Detector, NoMatch};
use crate::document::{ParseWarning, SubtitleDocument};
use crate::errors::ConversionError;
use crate::formats::{
    default_grammars, ParseOptions, RenderOptions, SubtitleFormat, SubtitleGrammar, DEFAULT_DURATION_MS,
};
use crate::timing::{AbsoluteTime, FrameRate};

/// Successful conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    /// Rendered text in the target format
    pub output: String,

    /// Format the input was parsed with
    pub source_format: SubtitleFormat,

    /// Format the output was rendered in
    pub target_format: SubtitleFormat,

    /// Detection result, `None` when the source format was given explicitly
    pub detection: Option<Detection>,

    /// Entries skipped as malformed
    pub warnings: Vec<ParseWarning>,

    /// Number of entries written
    pub entries: usize,
}

/// Stateless converter over an explicit set of grammars
#[derive(Clone)]
pub struct Converter {
    grammars: Vec<Arc<dyn SubtitleGrammar>>,
    detector: Detector,
    default_frame_rate: FrameRate,
    default_duration_ms: AbsoluteTime,
}

impl Converter {
    /// Create a converter, and its detector, over the given grammars
    pub fn new(grammars: Vec<Arc<dyn SubtitleGrammar>>) -> Self {
        Self {
            detector: Detector::new(grammars.clone()),
            grammars,
            default_frame_rate: FrameRate::DEFAULT,
            default_duration_ms: DEFAULT_DURATION_MS,
        }
    }

    /// Set the detection threshold.
    pub fn with_detector_threshold(mut self, threshold: f64) -> Self {
        self.detector = self.detector.with_threshold(threshold);
        self
    }

    /// Set the number of lines sampled for detection.
    pub fn with_detector_sample_lines(mut self, sample_lines: usize) -> Self {
        self.detector = self.detector.with_sample_lines(sample_lines);
        self
    }

    /// Set the frame rate used when neither the caller nor the input names one.
    pub fn with_default_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.default_frame_rate = frame_rate;
        self
    }

    /// Set the display time given to entries without an end time.
    pub fn with_default_duration(mut self, duration_ms: AbsoluteTime) -> Self {
        self.default_duration_ms = duration_ms;
        self
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn default_frame_rate(&self) -> FrameRate {
        self.default_frame_rate
    }

    /// Grammar registered for a format name
    fn grammar_named(&self, name: &str) -> Option<&Arc<dyn SubtitleGrammar>> {
        let format: SubtitleFormat = name.parse().ok()?;
        self.grammar_for(format)
    }

    fn grammar_for(&self, format: SubtitleFormat) -> Option<&Arc<dyn SubtitleGrammar>> {
        self.grammars.iter().find(|g| g.format() == format)
    }

    /// Detect the input format
    pub fn detect(&self, input: &str) -> Result<Detection, ConversionError> {
        self.detector
            .detect(input)
            .map_err(|NoMatch { scores }| ConversionError::UnknownFormat { scores })
    }

    /// Parse with an explicit or detected grammar
    pub fn parse(
        &self,
        input: &str,
        source: Option<SubtitleFormat>,
        frame_rate_hint: Option<FrameRate>,
    ) -> Result<(SubtitleDocument, Vec<ParseWarning>, Option<Detection>), ConversionError> {
        let (grammar, detection) = match source {
            Some(format) => {
                let grammar = self
                    .grammar_for(format)
                    .ok_or_else(|| ConversionError::UnsupportedSourceFormat(format.to_string()))?;
                (grammar, None)
            }
            None => {
                let detection = self.detect(input)?;
                info!("IN_FORMAT -> {} ({:.0}%)", detection.format, detection.confidence * 100.0);
                let grammar = self
                    .grammar_for(detection.format)
                    .ok_or_else(|| ConversionError::UnsupportedSourceFormat(detection.format.to_string()))?;
                (grammar, Some(detection))
            }
        };

        let options = ParseOptions {
            frame_rate: frame_rate_hint.or(Some(self.default_frame_rate)),
            default_duration_ms: self.default_duration_ms,
        };
        let outcome = grammar.parse(input, &options)?;
        if !outcome.warnings.is_empty() {
            warn!("{} malformed {} entries skipped", outcome.warnings.len(), grammar.format());
        }
        Ok((outcome.document, outcome.warnings, detection))
    }

    /// Render a document with the named grammar
    pub fn render(
        &self,
        document: &SubtitleDocument,
        target: SubtitleFormat,
        frame_rate_hint: Option<FrameRate>,
    ) -> Result<String, ConversionError> {
        let grammar = self
            .grammar_for(target)
            .ok_or_else(|| ConversionError::UnsupportedTargetFormat(target.to_string()))?;
        let frame_rate = frame_rate_hint
            .or(document.frame_rate)
            .unwrap_or(self.default_frame_rate);
        if target.is_frame_based() {
            debug!("Rendering {} at {} fps", target, frame_rate);
        }
        Ok(grammar.render(document, &RenderOptions { frame_rate }))
    }

    /// Convert text between formats named by their identifiers.
    ///
    /// `source` skips detection when given. `frame_rate_hint` applies to
    /// frame-based input that declares no frame rate of its own, and takes
    /// precedence over the input's frame rate when rendering.
    pub fn convert(
        &self,
        input: &str,
        source: Option<&str>,
        target: &str,
        frame_rate_hint: Option<f64>,
    ) -> Result<Conversion, ConversionError> {
        let target_format = self
            .grammar_named(target)
            .map(|g| g.format())
            .ok_or_else(|| ConversionError::UnsupportedTargetFormat(target.to_string()))?;

        let frame_rate = frame_rate_hint.map(FrameRate::new).transpose()?;

        let source_format = match source {
            Some(name) => Some(
                self.grammar_named(name)
                    .map(|g| g.format())
                    .ok_or_else(|| ConversionError::UnsupportedSourceFormat(name.to_string()))?,
            ),
            None => None,
        };

        self.convert_with(input, source_format, target_format, frame_rate)
    }

    /// Typed variant of [`Converter::convert`]
    pub fn convert_with(
        &self,
        input: &str,
        source: Option<SubtitleFormat>,
        target: SubtitleFormat,
        frame_rate_hint: Option<FrameRate>,
    ) -> Result<Conversion, ConversionError> {
        if self.grammar_for(target).is_none() {
            return Err(ConversionError::UnsupportedTargetFormat(target.to_string()));
        }

        let (document, warnings, detection) = self.parse(input, source, frame_rate_hint)?;
        let source_format = document
            .source_format
            .or(source)
            .or(detection.as_ref().map(|d| d.format))
            .unwrap_or(target);

        let output = self.render(&document, target, frame_rate_hint)?;
        debug!(
            "Converted {} entries {} -> {}",
            document.len(),
            source_format,
            target
        );

        Ok(Conversion {
            output,
            source_format,
            target_format: target,
            detection,
            warnings,
            entries: document.len(),
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(default_grammars())
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("detector", &self.detector)
            .field("default_frame_rate", &self.default_frame_rate)
            .field("default_duration_ms", &self.default_duration_ms)
            .finish()
    }
}
