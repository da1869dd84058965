/*!
 * Input format detection.
 *
 * Every registered grammar scores the same bounded sample of the input. The
 * best score wins; equal scores go to the structurally stricter format
 * (SubRip > SubViewer2 > MicroDVD > MPL2 > TMPlayer). The winner must score
 * strictly above the threshold, because the looser line formats can match
 * fragments of the stricter ones.
 */

use std::sync::Arc;

use log::debug;

use crate::formats::{default_grammars, SubtitleFormat, SubtitleGrammar, DETECTION_SAMPLE_LINES};

/// Minimum confidence a grammar must exceed to be accepted
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Accepted detection result
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub format: SubtitleFormat,
    pub confidence: f64,
}

/// No grammar cleared the threshold; carries every score for diagnosis
#[derive(Debug, Clone, PartialEq)]
pub struct NoMatch {
    pub scores: Vec<(SubtitleFormat, f64)>,
}

/// Scores inputs against an explicit, immutable set of grammars
#[derive(Clone)]
pub struct Detector {
    grammars: Vec<Arc<dyn SubtitleGrammar>>,
    threshold: f64,
    sample_lines: usize,
}

impl Detector {
    /// Create a detector over the given grammars with default settings
    pub fn new(grammars: Vec<Arc<dyn SubtitleGrammar>>) -> Self {
        Self {
            grammars,
            threshold: DEFAULT_THRESHOLD,
            sample_lines: DETECTION_SAMPLE_LINES,
        }
    }

    /// Set the acceptance threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set how many non-blank lines are sampled.
    pub fn with_sample_lines(mut self, sample_lines: usize) -> Self {
        self.sample_lines = sample_lines.max(1);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn sample_lines(&self) -> usize {
        self.sample_lines
    }

    /// Formats this detector can recognise
    pub fn formats(&self) -> Vec<SubtitleFormat> {
        self.grammars.iter().map(|g| g.format()).collect()
    }

    /// Confidence of every grammar, ordered from best to worst
    pub fn scores(&self, text: &str) -> Vec<(SubtitleFormat, f64)> {
        let mut scores: Vec<(SubtitleFormat, f64)> = self
            .grammars
            .iter()
            .map(|grammar| (grammar.format(), grammar.score(text, self.sample_lines)))
            .collect();

        scores.sort_by(|(fa, sa), (fb, sb)| {
            sb.total_cmp(sa).then_with(|| fa.priority().cmp(&fb.priority()))
        });
        scores
    }

    /// Pick the best matching format
    pub fn detect(&self, text: &str) -> Result<Detection, NoMatch> {
        let scores = self.scores(text);
        debug!(
            "Detection scores: {}",
            scores
                .iter()
                .map(|(format, score)| format!("{}={:.2}", format, score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        match scores.first() {
            Some(&(format, confidence)) if confidence > self.threshold => Ok(Detection { format, confidence }),
            _ => Err(NoMatch { scores }),
        }
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(default_grammars())
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("formats", &self.formats())
            .field("threshold", &self.threshold)
            .field("sample_lines", &self.sample_lines)
            .finish()
    }
}
