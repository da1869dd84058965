/*!
 * TMPlayer grammar: `HH:MM:SS:line one|line two`, one entry per line.
 *
 * The format has no end time. Each entry is shown for the default duration
 * or until just before the next entry starts, whichever comes first. A line
 * with a time and no text (`00:01:10:`) clears the screen: it bounds the
 * previous entry but is not an entry itself.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    close_entries, finish, numbered_lines, ratio, sample_lines, split_pipe, ParseOptions,
    PendingEntry, RenderOptions, SubtitleFormat, SubtitleGrammar,
};
use crate::document::{ParseOutcome, ParseWarning, SubtitleDocument};
use crate::errors::SubtitleError;
use crate::timing::{clock_to_ms, split_clock, AbsoluteTime};

// @const: Time prefix, `=` is accepted as separator for the variant some players write
static LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+):(\d{2}):(\d{2})[:=](.*)$").unwrap());

/// TMPlayer grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct TmPlayer;

impl TmPlayer {
    fn parse_clock(hours: &str, minutes: &str, seconds: &str) -> Option<AbsoluteTime> {
        let hours: u64 = hours.parse().ok()?;
        let minutes: u64 = minutes.parse().ok()?;
        let seconds: u64 = seconds.parse().ok()?;
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        clock_to_ms(hours, minutes, seconds, 0)
    }

    /// Format milliseconds as `HH:MM:SS`, dropping the sub-second part
    pub fn format_timestamp(ms: AbsoluteTime) -> String {
        let (hours, minutes, seconds, _) = split_clock(ms);
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

impl SubtitleGrammar for TmPlayer {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::TmPlayer
    }

    fn score(&self, text: &str, sample_lines_limit: usize) -> f64 {
        let sampled = sample_lines(text, sample_lines_limit);
        let matched = sampled
            .iter()
            .filter(|line| {
                LINE_REGEX
                    .captures(line.trim_start())
                    .is_some_and(|caps| Self::parse_clock(&caps[1], &caps[2], &caps[3]).is_some())
            })
            .count();
        ratio(matched, sampled.len())
    }

    fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParseOutcome, SubtitleError> {
        let mut pending = Vec::new();
        let mut warnings = Vec::new();
        let mut had_content = false;

        for (number, line) in numbered_lines(text) {
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            had_content = true;

            let Some(caps) = LINE_REGEX.captures(trimmed) else {
                warnings.push(ParseWarning::new(number, format!("not a tmplayer entry: {}", trimmed)));
                continue;
            };
            let Some(start) = Self::parse_clock(&caps[1], &caps[2], &caps[3]) else {
                warnings.push(ParseWarning::new(number, format!("invalid time: {}", trimmed)));
                continue;
            };

            let lines = split_pipe(&caps[4]);
            pending.push(PendingEntry {
                start,
                end: None,
                is_marker: lines.is_empty(),
                lines,
            });
        }

        for warning in &warnings {
            warn!("Skipping malformed tmplayer entry at {}", warning);
        }

        let entries = close_entries(pending, options.default_duration_ms);
        let document = SubtitleDocument::from_entries(entries).with_source_format(SubtitleFormat::TmPlayer);
        finish(SubtitleFormat::TmPlayer, document, warnings, had_content)
    }

    fn render(&self, document: &SubtitleDocument, _options: &RenderOptions) -> String {
        let mut output = String::new();
        for entry in &document.entries {
            output.push_str(&Self::format_timestamp(entry.start));
            output.push(':');
            output.push_str(&entry.joined("|"));
            output.push('\n');
        }
        output
    }
}
