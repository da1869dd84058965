/*!
 * SubRip (`.srt`) grammar.
 *
 * ```text
 * 1
 * 00:00:01,000 --> 00:00:03,000
 * Hello world
 *
 * ```
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    blocks, finish, fraction_to_ms, ratio, sample_blocks, Block, ParseOptions, RenderOptions,
    SubtitleFormat, SubtitleGrammar,
};
use crate::document::{ParseOutcome, ParseWarning, SubtitleDocument, SubtitleEntry};
use crate::errors::SubtitleError;
use crate::timing::{clock_to_ms, split_clock, AbsoluteTime};

// @const: SRT time line, optional trailing position coordinates
static TIME_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{1,3})(\s+.*)?$")
        .unwrap()
});

static INDEX_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+\s*$").unwrap());

/// SubRip grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct SubRip;

impl SubRip {
    /// Parse a time line into `(start, end)` milliseconds
    pub fn parse_time_line(line: &str) -> Option<(AbsoluteTime, AbsoluteTime)> {
        let caps = TIME_LINE_REGEX.captures(line)?;
        let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();
        let clock = |first: usize| -> Option<AbsoluteTime> {
            let hours: u64 = field(first).parse().ok()?;
            let minutes: u64 = field(first + 1).parse().ok()?;
            let seconds: u64 = field(first + 2).parse().ok()?;
            let millis = fraction_to_ms(field(first + 3), 3)?;
            if minutes >= 60 || seconds >= 60 {
                return None;
            }
            clock_to_ms(hours, minutes, seconds, millis)
        };
        Some((clock(1)?, clock(5)?))
    }

    /// Format milliseconds as `HH:MM:SS,mmm`
    pub fn format_timestamp(ms: AbsoluteTime) -> String {
        let (hours, minutes, seconds, millis) = split_clock(ms);
        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    fn is_index_line(line: &str) -> bool {
        INDEX_LINE_REGEX.is_match(line)
    }

    /// Blank-line separated blocks, additionally split where a block runs
    /// into the next entry without a separating blank line
    fn entry_blocks(text: &str) -> Vec<Block<'_>> {
        let mut result = Vec::new();
        for block in blocks(text) {
            let mut start = 0;
            for i in 3..block.lines.len() {
                let next = block.lines.get(i + 1).copied().unwrap_or_default();
                if i - start >= 3 && Self::is_index_line(block.lines[i]) && TIME_LINE_REGEX.is_match(next) {
                    result.push(Block {
                        line: block.line + start,
                        lines: block.lines[start..i].to_vec(),
                    });
                    start = i;
                }
            }
            result.push(Block {
                line: block.line + start,
                lines: block.lines[start..].to_vec(),
            });
        }
        result
    }
}

impl SubtitleGrammar for SubRip {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::SubRip
    }

    fn score(&self, text: &str, sample_lines: usize) -> f64 {
        let sampled = sample_blocks(&Self::entry_blocks(text), sample_lines);
        let matched = sampled
            .iter()
            .filter(|block| {
                block.lines.len() >= 2
                    && Self::is_index_line(block.lines[0])
                    && Self::parse_time_line(block.lines[1]).is_some()
            })
            .count();
        ratio(matched, sampled.len())
    }

    fn parse(&self, text: &str, _options: &ParseOptions) -> Result<ParseOutcome, SubtitleError> {
        let all_blocks = Self::entry_blocks(text);
        let mut entries = Vec::with_capacity(all_blocks.len());
        let mut warnings = Vec::new();

        for block in &all_blocks {
            if !Self::is_index_line(block.lines[0]) {
                warnings.push(ParseWarning::new(block.line, "missing sequence number"));
                continue;
            }
            let Some(time_line) = block.lines.get(1) else {
                warnings.push(ParseWarning::new(block.line, "missing time line"));
                continue;
            };
            let Some((start, end)) = Self::parse_time_line(time_line) else {
                warnings.push(ParseWarning::new(
                    block.line,
                    format!("invalid time line: {}", time_line.trim()),
                ));
                continue;
            };
            if block.lines.len() < 3 {
                warnings.push(ParseWarning::new(block.line, "entry has no text"));
                continue;
            }
            if end < start {
                debug!("Entry at line {} ends before it starts, clamping end", block.line);
            }

            let lines = block.lines[2..].iter().map(|l| l.trim().to_string()).collect();
            entries.push(SubtitleEntry::new(entries.len() + 1, start, end, lines));
        }

        for warning in &warnings {
            warn!("Skipping malformed subrip entry at {}", warning);
        }

        let document = SubtitleDocument::from_entries(entries).with_source_format(SubtitleFormat::SubRip);
        finish(SubtitleFormat::SubRip, document, warnings, !all_blocks.is_empty())
    }

    fn render(&self, document: &SubtitleDocument, _options: &RenderOptions) -> String {
        let mut output = String::new();
        for (i, entry) in document.entries.iter().enumerate() {
            output.push_str(&format!("{}\n", i + 1));
            output.push_str(&format!(
                "{} --> {}\n",
                Self::format_timestamp(entry.start),
                Self::format_timestamp(entry.end)
            ));
            for line in &entry.lines {
                output.push_str(line);
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }
}
