/*!
 * Format-independent subtitle model.
 *
 * Grammars parse into a `SubtitleDocument` and render from a borrowed one.
 * Entries keep their source order, even when the source file is not
 * monotonic in time.
 */

use std::fmt;

use crate::formats::SubtitleFormat;
use crate::timing::{AbsoluteTime, FrameRate};

// @struct: Single displayed caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: 1-based position in the source
    pub index: usize,

    // @field: Start time in ms
    pub start: AbsoluteTime,

    // @field: End time in ms, never before start
    pub end: AbsoluteTime,

    // @field: Text lines in display order
    pub lines: Vec<String>,
}

impl SubtitleEntry {
    /// Create an entry, clamping `end` so that it never precedes `start`
    pub fn new(index: usize, start: AbsoluteTime, end: AbsoluteTime, lines: Vec<String>) -> Self {
        SubtitleEntry {
            index,
            start,
            end: end.max(start),
            lines,
        }
    }

    /// Create an entry from a single piece of text, splitting on newlines
    pub fn from_text(index: usize, start: AbsoluteTime, end: AbsoluteTime, text: &str) -> Self {
        Self::new(index, start, end, text.lines().map(str::to_string).collect())
    }

    pub fn duration(&self) -> AbsoluteTime {
        self.end - self.start
    }

    /// All lines joined with the given separator
    pub fn joined(&self, separator: &str) -> String {
        self.lines.join(separator)
    }
}

/// Parsed subtitle track plus the metadata needed to render it again
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleDocument {
    /// Entries in source order
    pub entries: Vec<SubtitleEntry>,

    /// Grammar the document was parsed with, if any
    pub source_format: Option<SubtitleFormat>,

    /// Frame rate that governed a frame-based source
    pub frame_rate: Option<FrameRate>,
}

impl SubtitleDocument {
    /// Create an empty document with no metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from programmatically built entries
    pub fn from_entries(entries: Vec<SubtitleEntry>) -> Self {
        Self {
            entries,
            source_format: None,
            frame_rate: None,
        }
    }

    /// Set the source format.
    pub fn with_source_format(mut self, format: SubtitleFormat) -> Self {
        self.source_format = Some(format);
        self
    }

    /// Set the governing frame rate.
    pub fn with_frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this document with indexes reassigned 1..n in the current order
    pub fn renumbered(&self) -> Self {
        let mut copy = self.clone();
        for (i, entry) in copy.entries.iter_mut().enumerate() {
            entry.index = i + 1;
        }
        copy
    }

    /// Whether start times never decrease from one entry to the next
    pub fn is_chronological(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].start <= w[1].start)
    }
}

/// A `MalformedEntry`: one entry that did not match the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number where the entry starts
    pub line: usize,

    /// Why the entry was rejected
    pub reason: String,
}

impl ParseWarning {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Result of a best-effort parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub document: SubtitleDocument,
    pub warnings: Vec<ParseWarning>,
}

impl ParseOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}
