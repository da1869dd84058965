/*!
 * SubViewer 2.0 grammar.
 *
 * ```text
 * [INFORMATION]
 * [TITLE]
 * ...
 * [END INFORMATION]
 * [SUBTITLE]
 * [COLF]&HFFFFFF,[STYLE]bd,[SIZE]18,[FONT]Arial
 * 00:00:01.00,00:00:03.00
 * line one|line two
 *
 * ```
 *
 * The bracketed header is optional and skipped on input. Lines inside an
 * entry are separated by `|`; the `[br]` tag is accepted as well.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    finish, fraction_to_ms, numbered_lines, ratio, split_pipe, ParseOptions, RenderOptions,
    SubtitleFormat, SubtitleGrammar,
};
use crate::document::{ParseOutcome, ParseWarning, SubtitleDocument, SubtitleEntry};
use crate::errors::SubtitleError;
use crate::timing::{clock_to_ms, split_clock, AbsoluteTime};

static TIME_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{1,2}),(\d+):(\d{2}):(\d{2})\.(\d{1,2})$").unwrap()
});

// @const: Header tag line such as `[TITLE]`, `[DELAY]0` or `[COLF]&HFFFFFF,...`
static HEADER_LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[[A-Z][A-Z ]*\]").unwrap());

static BREAK_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[br\]").unwrap());

const HEADER: &str = "[INFORMATION]\n\
[TITLE]\n\
[AUTHOR]\n\
[SOURCE]\n\
[PRG]\n\
[FILEPATH]\n\
[DELAY]0\n\
[CD TRACK]0\n\
[COMMENT]\n\
[END INFORMATION]\n\
[SUBTITLE]\n\
[COLF]&HFFFFFF,[STYLE]bd,[SIZE]18,[FONT]Arial\n";

/// SubViewer 2.0 grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct SubViewer2;

impl SubViewer2 {
    /// Parse a time line into `(start, end)` milliseconds
    pub fn parse_time_line(line: &str) -> Option<(AbsoluteTime, AbsoluteTime)> {
        let caps = TIME_LINE_REGEX.captures(line.trim())?;
        let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();
        let clock = |first: usize| -> Option<AbsoluteTime> {
            let hours: u64 = field(first).parse().ok()?;
            let minutes: u64 = field(first + 1).parse().ok()?;
            let seconds: u64 = field(first + 2).parse().ok()?;
            let millis = fraction_to_ms(field(first + 3), 2)?;
            if minutes >= 60 || seconds >= 60 {
                return None;
            }
            clock_to_ms(hours, minutes, seconds, millis)
        };
        Some((clock(1)?, clock(5)?))
    }

    /// Format milliseconds as `HH:MM:SS.cc`
    pub fn format_timestamp(ms: AbsoluteTime) -> String {
        let (hours, minutes, seconds, millis) = split_clock(ms);
        format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, millis / 10)
    }

    /// Non-blank lines after the optional header, with their line numbers
    fn body_lines(text: &str) -> Vec<(usize, &str)> {
        let mut in_header = true;
        numbered_lines(text)
            .filter(|(_, line)| !line.trim().is_empty())
            .filter(|(_, line)| {
                if in_header && HEADER_LINE_REGEX.is_match(line.trim_start()) {
                    return false;
                }
                in_header = false;
                true
            })
            .map(|(number, line)| (number, line.trim()))
            .collect()
    }

    fn split_text(text: &str) -> Vec<String> {
        split_pipe(&BREAK_TAG_REGEX.replace_all(text, "|"))
    }
}

impl SubtitleGrammar for SubViewer2 {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::SubViewer2
    }

    /// Scores units of "time line followed by a text line"; any other line
    /// counts as one unmatched unit.
    fn score(&self, text: &str, sample_lines_limit: usize) -> f64 {
        let lines: Vec<&str> = Self::body_lines(text)
            .into_iter()
            .take(sample_lines_limit)
            .map(|(_, line)| line)
            .collect();

        let mut matched = 0;
        let mut total = 0;
        let mut i = 0;
        while i < lines.len() {
            total += 1;
            let is_entry = Self::parse_time_line(lines[i]).is_some()
                && lines.get(i + 1).is_some_and(|next| Self::parse_time_line(next).is_none());
            if is_entry {
                matched += 1;
                i += 2;
            } else {
                i += 1;
            }
        }
        ratio(matched, total)
    }

    fn parse(&self, text: &str, _options: &ParseOptions) -> Result<ParseOutcome, SubtitleError> {
        let lines = Self::body_lines(text);
        let mut entries: Vec<SubtitleEntry> = Vec::new();
        let mut warnings = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let (number, line) = lines[i];
            let Some((start, end)) = Self::parse_time_line(line) else {
                warnings.push(ParseWarning::new(number, format!("expected a time line: {}", line)));
                // skip the rest of this entry
                i += 1;
                while i < lines.len() && Self::parse_time_line(lines[i].1).is_none() {
                    i += 1;
                }
                continue;
            };
            i += 1;

            let mut text_lines = Vec::new();
            while i < lines.len() && Self::parse_time_line(lines[i].1).is_none() {
                text_lines.extend(Self::split_text(lines[i].1));
                i += 1;
            }
            if text_lines.is_empty() {
                warnings.push(ParseWarning::new(number, "entry has no text"));
                continue;
            }
            entries.push(SubtitleEntry::new(entries.len() + 1, start, end, text_lines));
        }

        for warning in &warnings {
            warn!("Skipping malformed subviewer2 entry at {}", warning);
        }

        let document = SubtitleDocument::from_entries(entries).with_source_format(SubtitleFormat::SubViewer2);
        finish(SubtitleFormat::SubViewer2, document, warnings, !lines.is_empty())
    }

    fn render(&self, document: &SubtitleDocument, _options: &RenderOptions) -> String {
        let mut output = String::from(HEADER);
        for entry in &document.entries {
            output.push_str(&format!(
                "{},{}\n{}\n\n",
                Self::format_timestamp(entry.start),
                Self::format_timestamp(entry.end),
                entry.joined("|")
            ));
        }
        output
    }
}
