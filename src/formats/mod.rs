/*!
 * Subtitle format grammars.
 *
 * Each supported format implements `SubtitleGrammar`: it scores a sample of
 * text for detection, parses text into a `SubtitleDocument` and renders a
 * document back to text. The set of formats is closed (`SubtitleFormat`),
 * but grammars are handed to the detector and converter as an explicit list
 * so tests can run with a reduced set.
 *
 * # Formats
 *
 * - `microdvd`: `{start}{end}text`, frame indexes
 * - `mpl2`: `[start][end]text`, tenths of a second
 * - `subrip`: numbered blocks with `HH:MM:SS,mmm --> HH:MM:SS,mmm`
 * - `subviewer2`: optional header, `HH:MM:SS.cc,HH:MM:SS.cc` then text
 * - `tmplayer`: `HH:MM:SS:text`, no end time
 */

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::document::{ParseOutcome, ParseWarning, SubtitleDocument, SubtitleEntry};
use crate::errors::SubtitleError;
use crate::timing::{AbsoluteTime, FrameRate};

pub mod microdvd;
pub mod mpl2;
pub mod subrip;
pub mod subviewer2;
pub mod tmplayer;

pub use microdvd::MicroDvd;
pub use mpl2::Mpl2;
pub use subrip::SubRip;
pub use subviewer2::SubViewer2;
pub use tmplayer::TmPlayer;

/// Number of non-blank lines a grammar looks at when scoring an input
pub const DETECTION_SAMPLE_LINES: usize = 100;

/// Display time given to entries whose source format carries no end time
pub const DEFAULT_DURATION_MS: AbsoluteTime = 3000;

/// Supported subtitle formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubtitleFormat {
    MicroDvd,
    Mpl2,
    SubRip,
    SubViewer2,
    TmPlayer,
}

impl SubtitleFormat {
    /// Every format, in detection tie-break order (most specific first)
    pub const ALL: [SubtitleFormat; 5] = [
        SubtitleFormat::SubRip,
        SubtitleFormat::SubViewer2,
        SubtitleFormat::MicroDvd,
        SubtitleFormat::Mpl2,
        SubtitleFormat::TmPlayer,
    ];

    // @returns: Lowercase identifier used on the command line and in reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::MicroDvd => "microdvd",
            Self::Mpl2 => "mpl2",
            Self::SubRip => "subrip",
            Self::SubViewer2 => "subviewer2",
            Self::TmPlayer => "tmplayer",
        }
    }

    /// Tie-break rank: lower wins when two grammars score the same
    pub fn priority(&self) -> u8 {
        match self {
            Self::SubRip => 0,
            Self::SubViewer2 => 1,
            Self::MicroDvd => 2,
            Self::Mpl2 => 3,
            Self::TmPlayer => 4,
        }
    }

    // @returns: Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::MicroDvd => "sub",
            Self::Mpl2 => "txt",
            Self::SubRip => "srt",
            Self::SubViewer2 => "sub",
            Self::TmPlayer => "txt",
        }
    }

    /// Whether the format stores frame indexes instead of clock time
    pub fn is_frame_based(&self) -> bool {
        matches!(self, Self::MicroDvd)
    }

    /// Whether the format stores an end time for each entry
    pub fn has_end_time(&self) -> bool {
        !matches!(self, Self::TmPlayer)
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.name() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

/// Settings a grammar needs while parsing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
    /// Frame rate for frame-based input that declares none itself
    pub frame_rate: Option<FrameRate>,

    /// Display time for entries without an end time
    pub default_duration_ms: AbsoluteTime,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            frame_rate: None,
            default_duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

/// Settings a grammar needs while rendering
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderOptions {
    /// Frame rate used by frame-based targets
    pub frame_rate: FrameRate,
}

/// Capability set shared by all subtitle formats
pub trait SubtitleGrammar: Send + Sync {
    /// Format implemented by this grammar
    fn format(&self) -> SubtitleFormat;

    /// Fraction in `[0, 1]` of the first `sample_lines` non-blank lines (or
    /// the blocks they form) that match this grammar. Never fails.
    fn score(&self, text: &str, sample_lines: usize) -> f64;

    /// Best-effort parse. Entries that do not match become warnings.
    fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParseOutcome, SubtitleError>;

    /// Render a document. Rendering never modifies the document.
    fn render(&self, document: &SubtitleDocument, options: &RenderOptions) -> String;

    /// Score using the default sample size
    fn detect(&self, text: &str) -> f64 {
        self.score(text, DETECTION_SAMPLE_LINES)
    }
}

/// One grammar per supported format, in tie-break order
pub fn default_grammars() -> Vec<Arc<dyn SubtitleGrammar>> {
    SubtitleFormat::ALL.into_iter().map(grammar_for).collect()
}

/// Grammar implementing the given format
pub fn grammar_for(format: SubtitleFormat) -> Arc<dyn SubtitleGrammar> {
    match format {
        SubtitleFormat::MicroDvd => Arc::new(MicroDvd),
        SubtitleFormat::Mpl2 => Arc::new(Mpl2),
        SubtitleFormat::SubRip => Arc::new(SubRip),
        SubtitleFormat::SubViewer2 => Arc::new(SubViewer2),
        SubtitleFormat::TmPlayer => Arc::new(TmPlayer),
    }
}

// Shared helpers for the grammars below.

/// Lines of the input with 1-based numbers and trailing whitespace removed
pub(crate) fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.strip_prefix('\u{feff}')
        .unwrap_or(text)
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end()))
}

/// First `limit` non-blank lines
pub(crate) fn sample_lines(text: &str, limit: usize) -> Vec<&str> {
    numbered_lines(text)
        .map(|(_, line)| line)
        .filter(|line| !line.trim().is_empty())
        .take(limit)
        .collect()
}

/// Blank-line separated group of lines
#[derive(Debug, Clone)]
pub(crate) struct Block<'a> {
    /// 1-based number of the first line
    pub line: usize,
    pub lines: Vec<&'a str>,
}

/// Split into blank-line separated blocks
pub(crate) fn blocks(text: &str) -> Vec<Block<'_>> {
    let mut result = Vec::new();
    let mut current: Option<Block> = None;

    for (number, line) in numbered_lines(text) {
        if line.trim().is_empty() {
            if let Some(block) = current.take() {
                result.push(block);
            }
            continue;
        }
        current
            .get_or_insert_with(|| Block {
                line: number,
                lines: Vec::new(),
            })
            .lines
            .push(line);
    }

    if let Some(block) = current {
        result.push(block);
    }
    result
}

/// Leading blocks covering at most `limit` non-blank lines. The block that
/// crosses the limit is truncated.
pub(crate) fn sample_blocks<'a>(blocks: &[Block<'a>], limit: usize) -> Vec<Block<'a>> {
    let mut remaining = limit;
    let mut sampled = Vec::new();
    for block in blocks {
        if remaining == 0 {
            break;
        }
        let take = block.lines.len().min(remaining);
        remaining -= take;
        sampled.push(Block {
            line: block.line,
            lines: block.lines[..take].to_vec(),
        });
    }
    sampled
}

pub(crate) fn ratio(matched: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        matched as f64 / total as f64
    }
}

/// Split a text field on the `|` line separator, dropping empty lines
pub(crate) fn split_pipe(text: &str) -> Vec<String> {
    text.split('|')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a fraction-of-second field of `digits` significant digits,
/// right-padding shorter input ("5" in a millisecond field is 500)
pub(crate) fn fraction_to_ms(field: &str, digits: u32) -> Option<u64> {
    if field.is_empty() || field.len() > digits as usize {
        return None;
    }
    let value: u64 = field.parse().ok()?;
    let padded = value * 10u64.pow(digits - field.len() as u32);
    Some(padded * 10u64.pow(3 - digits))
}

/// Entry read from a source that may not carry an end time
#[derive(Debug, Clone)]
pub(crate) struct PendingEntry {
    pub start: AbsoluteTime,
    pub end: Option<AbsoluteTime>,
    pub lines: Vec<String>,
    /// Clears the screen: bounds the previous entry, never becomes an entry
    pub is_marker: bool,
}

/// Assign 1-based indexes and fill in missing end times with
/// `min(start + default_duration, next.start - 1)`, never before `start`
pub(crate) fn close_entries(pending: Vec<PendingEntry>, default_duration_ms: AbsoluteTime) -> Vec<SubtitleEntry> {
    let mut entries = Vec::with_capacity(pending.len());

    for (i, item) in pending.iter().enumerate() {
        if item.is_marker {
            continue;
        }
        let end = match item.end {
            Some(end) => end,
            None => {
                let fallback = item.start.saturating_add(default_duration_ms);
                match pending.get(i + 1) {
                    Some(next) => fallback.min(next.start.saturating_sub(1)),
                    None => fallback,
                }
            }
        };
        entries.push(SubtitleEntry::new(entries.len() + 1, item.start, end, item.lines.clone()));
    }

    entries
}

/// Wrap parsed entries, refusing input that had text but no valid entry
pub(crate) fn finish(
    format: SubtitleFormat,
    document: SubtitleDocument,
    warnings: Vec<ParseWarning>,
    had_content: bool,
) -> Result<ParseOutcome, SubtitleError> {
    if document.is_empty() && had_content {
        return Err(SubtitleError::NoEntries {
            format,
            malformed: warnings.len(),
        });
    }
    Ok(ParseOutcome { document, warnings })
}
