/*!
 * Tests for the TMPlayer grammar
 */

use anyhow::Result;
use subconv::document::{SubtitleDocument, SubtitleEntry};
use subconv::formats::{ParseOptions, RenderOptions, SubtitleFormat, SubtitleGrammar, TmPlayer};
use crate::common;

/// Test end times bounded by the next entry or the default duration
#[test]
fn test_parse_shouldSynthesizeEndTimes() -> Result<()> {
    let outcome = TmPlayer.parse(common::TMPLAYER_SAMPLE, &ParseOptions::default())?;
    let doc = &outcome.document;

    assert!(outcome.is_clean());
    assert_eq!(doc.source_format, Some(SubtitleFormat::TmPlayer));
    assert_eq!((doc.entries[0].start, doc.entries[0].end), (1000, 3999));
    assert_eq!((doc.entries[1].start, doc.entries[1].end), (4000, 7000));
    assert_eq!(doc.entries[1].lines, vec!["Second line one", "Second line two"]);
    assert_eq!((doc.entries[2].start, doc.entries[2].end), (70_000, 73_000));
    Ok(())
}

/// Test a single entry gets start + default duration
#[test]
fn test_parse_withSingleEntry_shouldUseDefaultDuration() -> Result<()> {
    let outcome = TmPlayer.parse("00:00:05:Line one\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.entries[0].end, 8000);
    Ok(())
}

/// Test a configured default duration
#[test]
fn test_parse_withCustomDuration_shouldUseIt() -> Result<()> {
    let options = ParseOptions {
        frame_rate: None,
        default_duration_ms: 1000,
    };
    let outcome = TmPlayer.parse("00:00:05:Line one\n", &options)?;
    assert_eq!(outcome.document.entries[0].end, 6000);
    Ok(())
}

/// Test that an empty text line clears the screen without becoming an entry
#[test]
fn test_parse_withClearLine_shouldBoundPreviousEntry() -> Result<()> {
    let outcome = TmPlayer.parse("00:00:01:Hello\n00:00:02:\n00:00:10:Next\n", &ParseOptions::default())?;
    let doc = &outcome.document;

    assert_eq!(doc.len(), 2);
    assert_eq!(doc.entries[0].end, 1999);
    assert_eq!((doc.entries[1].index, doc.entries[1].end), (2, 13_000));
    Ok(())
}

/// Test the `=` separator and single-digit hours
#[test]
fn test_parse_withEqualsSeparator_shouldAccept() -> Result<()> {
    let outcome = TmPlayer.parse("0:00:01=Hi\n1:00:00:Later\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.entries[0].start, 1000);
    assert_eq!(outcome.document.entries[1].start, 3_600_000);
    Ok(())
}

/// Test that out-of-range times are reported
#[test]
fn test_parse_withInvalidMinutes_shouldWarn() -> Result<()> {
    let outcome = TmPlayer.parse("00:75:00:Bad\n00:00:01:Ok\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.len(), 1);
    assert_eq!(outcome.warnings[0].line, 1);
    Ok(())
}

/// Test rendering drops the end time and the sub-second part
#[test]
fn test_render_shouldDropEndTime() {
    let doc = SubtitleDocument::from_entries(vec![SubtitleEntry::from_text(1, 1500, 3000, "Hi\nthere")]);
    assert_eq!(TmPlayer.render(&doc, &RenderOptions::default()), "00:00:01:Hi|there\n");
}

/// Test detection scores
#[test]
fn test_score_shouldMatchClockLines() {
    assert_eq!(TmPlayer.detect(common::TMPLAYER_SAMPLE), 1.0);
    assert_eq!(TmPlayer.detect(common::SUBRIP_SAMPLE), 0.0);
    assert_eq!(TmPlayer.detect(common::SUBVIEWER2_SAMPLE), 0.0);
}
