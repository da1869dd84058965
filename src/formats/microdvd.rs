/*!
 * MicroDVD grammar.
 *
 * One entry per line, times are frame indexes: `{start}{end}line one|line two`.
 * A first entry of the form `{1}{1}23.976` declares the frame rate of the file
 * and is not a caption. An empty end field (`{100}{}text`) is accepted and
 * gets a synthesized end time. A line without text (`{100}{110}`) clears the
 * screen and is not an entry.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{
    close_entries, finish, numbered_lines, ratio, sample_lines, split_pipe, ParseOptions,
    PendingEntry, RenderOptions, SubtitleFormat, SubtitleGrammar,
};
use crate::document::{ParseOutcome, ParseWarning, SubtitleDocument};
use crate::errors::SubtitleError;
use crate::timing::{checked_to_milliseconds, to_frame, FrameRate};

static LINE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{(\d+)\}\{(\d*)\}(.*)$").unwrap());

/// MicroDVD grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroDvd;

impl MicroDvd {
    /// Frame rate declared by a `{1}{1}<fps>` (or `{0}{0}<fps>`) line
    fn declared_frame_rate(start: &str, end: &str, text: &str) -> Option<FrameRate> {
        if start != end || !(start == "0" || start == "1") {
            return None;
        }
        let fps: f64 = text.trim().parse().ok()?;
        FrameRate::new(fps).ok()
    }
}

impl SubtitleGrammar for MicroDvd {
    fn format(&self) -> SubtitleFormat {
        SubtitleFormat::MicroDvd
    }

    fn score(&self, text: &str, sample_lines_limit: usize) -> f64 {
        let sampled = sample_lines(text, sample_lines_limit);
        let matched = sampled.iter().filter(|line| LINE_REGEX.is_match(line.trim_start())).count();
        ratio(matched, sampled.len())
    }

    fn parse(&self, text: &str, options: &ParseOptions) -> Result<ParseOutcome, SubtitleError> {
        let mut frame_rate = options.frame_rate.unwrap_or_default();
        let mut pending = Vec::new();
        let mut warnings = Vec::new();
        let mut had_content = false;
        let mut first_entry = true;

        for (number, line) in numbered_lines(text) {
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }
            had_content = true;

            let Some(caps) = LINE_REGEX.captures(trimmed) else {
                warnings.push(ParseWarning::new(number, format!("not a microdvd entry: {}", trimmed)));
                continue;
            };
            let start_field = &caps[1];
            let end_field = &caps[2];
            let body = &caps[3];

            if first_entry {
                first_entry = false;
                if let Some(declared) = Self::declared_frame_rate(start_field, end_field, body) {
                    debug!("MicroDVD input declares {} fps", declared);
                    frame_rate = declared;
                    continue;
                }
            }

            let to_ms = |field: &str| {
                field
                    .parse::<u64>()
                    .ok()
                    .and_then(|frame| checked_to_milliseconds(frame, frame_rate))
            };
            let Some(start) = to_ms(start_field) else {
                warnings.push(ParseWarning::new(number, "frame index out of range"));
                continue;
            };
            let end = if end_field.is_empty() {
                None
            } else {
                match to_ms(end_field) {
                    Some(end) => Some(end),
                    None => {
                        warnings.push(ParseWarning::new(number, "frame index out of range"));
                        continue;
                    }
                }
            };

            let lines = split_pipe(body);
            pending.push(PendingEntry {
                start,
                end,
                is_marker: lines.is_empty(),
                lines,
            });
        }

        for warning in &warnings {
            warn!("Skipping malformed microdvd entry at {}", warning);
        }

        let entries = close_entries(pending, options.default_duration_ms);
        let document = SubtitleDocument::from_entries(entries)
            .with_source_format(SubtitleFormat::MicroDvd)
            .with_frame_rate(frame_rate);
        finish(SubtitleFormat::MicroDvd, document, warnings, had_content)
    }

    fn render(&self, document: &SubtitleDocument, options: &RenderOptions) -> String {
        if document.is_empty() {
            return String::new();
        }
        let rate = options.frame_rate;
        let mut output = format!("{{1}}{{1}}{}\n", rate);
        for entry in &document.entries {
            output.push_str(&format!(
                "{{{}}}{{{}}}{}\n",
                to_frame(entry.start, rate),
                to_frame(entry.end, rate),
                entry.joined("|")
            ));
        }
        output
    }
}
