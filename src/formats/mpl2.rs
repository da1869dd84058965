/*!
 * MPL2 grammar: `[start][end]line one|line two`, times in tenths of a second.
 *
 * A line without text (`[10][20]`) is not an entry. It only bounds the
 * synthesized end time of the entry before it.
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
use crate::timing::AbsoluteTime;

static LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(\d+)\]\[(\d*)\](.*)$").unwrap());

/// Milliseconds per MPL2 time unit
const MS_PER_UNIT: u64 = 100;

/// MPL2 grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct Mpl2;

impl Mpl2 {
    fn units_to_ms(field: &str) -> Option<AbsoluteTime> {
        field.parse::<u64>().ok()?.checked_mul(MS_PER_UNIT)
    }
}

impl SubtitleGrammar for Mpl2 {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::Mpl2
    }

    fn score(&self, text: &str, sample_lines_limit: usize) -> f64 {
        let sampled = sample_lines(text, sample_lines_limit);
        let matched = sampled.iter().filter(|line| LINE_REGEX.is_match(line.trim_start())).count();
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
                warnings.push(ParseWarning::new(number, format!("not an mpl2 entry: {}", trimmed)));
                continue;
            };
            let Some(start) = Self::units_to_ms(&caps[1]) else {
                warnings.push(ParseWarning::new(number, "start time out of range"));
                continue;
            };
            let end = match &caps[2] {
                "" => None,
                field => match Self::units_to_ms(field) {
                    Some(end) => Some(end),
                    None => {
                        warnings.push(ParseWarning::new(number, "end time out of range"));
                        continue;
                    }
                },
            };

            let lines = split_pipe(&caps[3]);
            pending.push(PendingEntry {
                start,
                end,
                is_marker: lines.is_empty(),
                lines,
            });
        }

        for warning in &warnings {
            warn!("Skipping malformed mpl2 entry at {}", warning);
        }

        let entries = close_entries(pending, options.default_duration_ms);
        let document = SubtitleDocument::from_entries(entries).with_source_format(SubtitleFormat::Mpl2);
        finish(SubtitleFormat::Mpl2, document, warnings, had_content)
    }

    fn render(&self, document: &SubtitleDocument, _options: &RenderOptions) -> String {
        let mut output = String::new();
        for entry in &document.entries {
            output.push_str(&format!(
                "[{}][{}]{}\n",
                entry.start / MS_PER_UNIT,
                entry.end / MS_PER_UNIT,
                entry.joined("|")
            ));
        }
        output
    }
}
