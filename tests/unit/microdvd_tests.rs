/*!
 * Tests for the MicroDVD grammar
 */

use anyhow::Result;
use subconv::document::{SubtitleDocument, SubtitleEntry};
use subconv::formats::{MicroDvd, ParseOptions, RenderOptions, SubtitleFormat, SubtitleGrammar};
use subconv::timing::FrameRate;
use crate::common;

fn options_with_rate(frame_rate: Option<FrameRate>) -> ParseOptions {
    ParseOptions {
        frame_rate,
        ..ParseOptions::default()
    }
}

/// Test that the header line sets the frame rate and is not an entry
#[test]
fn test_parse_withHeader_shouldUseDeclaredRate() -> Result<()> {
    let outcome = MicroDvd.parse(common::MICRODVD_SAMPLE, &ParseOptions::default())?;
    let doc = &outcome.document;

    assert!(outcome.is_clean());
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.frame_rate, Some(FrameRate::PAL));
    assert_eq!(doc.source_format, Some(SubtitleFormat::MicroDvd));
    assert_eq!((doc.entries[0].start, doc.entries[0].end), (1000, 3480));
    assert_eq!((doc.entries[1].start, doc.entries[1].end), (4000, 6240));
    assert_eq!(doc.entries[1].lines, vec!["Second line one", "Second line two"]);
    assert_eq!((doc.entries[2].start, doc.entries[2].end), (70_120, 72_880));
    Ok(())
}

/// Test that the declared rate wins over the caller's hint
#[test]
fn test_parse_withHeaderAndHint_shouldPreferHeader() -> Result<()> {
    let hint = FrameRate::new(50.0)?;
    let outcome = MicroDvd.parse(common::MICRODVD_SAMPLE, &options_with_rate(Some(hint)))?;
    assert_eq!(outcome.document.entries[0].start, 1000);
    assert_eq!(outcome.document.frame_rate, Some(FrameRate::PAL));
    Ok(())
}

/// Test that the hint applies when the file declares no rate
#[test]
fn test_parse_withHintAndNoHeader_shouldUseHint() -> Result<()> {
    let outcome = MicroDvd.parse("{25}{50}Hi\n", &options_with_rate(Some(FrameRate::PAL)))?;
    let entry = &outcome.document.entries[0];
    assert_eq!((entry.start, entry.end), (1000, 2000));
    Ok(())
}

/// Test that 23.976 fps is used when neither the file nor the caller names a rate
#[test]
fn test_parse_withoutRate_shouldUseDefault() -> Result<()> {
    let outcome = MicroDvd.parse("{25}{50}Hi\n", &ParseOptions::default())?;
    let entry = &outcome.document.entries[0];
    assert_eq!((entry.start, entry.end), (1043, 2086));
    assert_eq!(outcome.document.frame_rate, Some(FrameRate::DEFAULT));
    Ok(())
}

/// Test that a header-shaped line after the first entry is an ordinary entry
#[test]
fn test_parse_withLateHeaderShape_shouldKeepAsEntry() -> Result<()> {
    let outcome = MicroDvd.parse("{25}{50}Hi\n{1}{1}25.000\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.len(), 2);
    assert_eq!(outcome.document.entries[1].lines, vec!["25.000"]);
    Ok(())
}

/// Test that an empty end field gets a synthesized end
#[test]
fn test_parse_withEmptyEnd_shouldSynthesizeEnd() -> Result<()> {
    let input = "{25}{}First\n{100}{125}Second\n";
    let outcome = MicroDvd.parse(input, &options_with_rate(Some(FrameRate::PAL)))?;
    assert_eq!(outcome.document.entries[0].end, 3999);
    assert_eq!(outcome.document.entries[1].end, 5000);
    Ok(())
}

/// Test that malformed lines are reported with their line number
#[test]
fn test_parse_withGarbageLine_shouldWarn() -> Result<()> {
    let outcome = MicroDvd.parse("{25}{50}Hi\ngarbage\n{100}{125}Bye\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.len(), 2);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].line, 2);
    Ok(())
}

/// Test rendering writes a header and truncates to whole frames
#[test]
fn test_render_shouldWriteHeaderAndFrames() {
    let doc = SubtitleDocument::from_entries(vec![
        SubtitleEntry::from_text(1, 1000, 3500, "Hello world"),
        SubtitleEntry::from_text(2, 4000, 6250, "One\nTwo"),
    ]);
    let output = MicroDvd.render(&doc, &RenderOptions { frame_rate: FrameRate::PAL });
    assert_eq!(output, "{1}{1}25.000\n{25}{87}Hello world\n{100}{156}One|Two\n");
}

/// Test that an empty document renders as empty text
#[test]
fn test_render_withEmptyDocument_shouldBeEmpty() {
    let output = MicroDvd.render(&SubtitleDocument::new(), &RenderOptions::default());
    assert!(output.is_empty());
}

/// Test detection scores
#[test]
fn test_score_shouldMatchBraceLines() {
    assert_eq!(MicroDvd.detect(common::MICRODVD_SAMPLE), 1.0);
    assert_eq!(MicroDvd.detect(common::MPL2_SAMPLE), 0.0);
    assert_eq!(MicroDvd.detect("{1}{2}ok\nnot ok\n"), 0.5);
}

/// Test that a frame index whose time does not fit is a warning
#[test]
fn test_parse_withFrameBeyondRange_shouldWarn() -> Result<()> {
    let input = "{25}{50}Hi\n{18446744073709551615}{}Big\n";
    let outcome = MicroDvd.parse(input, &options_with_rate(Some(FrameRate::PAL)))?;
    assert_eq!(outcome.document.len(), 1);
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].line, 2);
    Ok(())
}

/// Test that a line without text clears the screen and is not an entry
#[test]
fn test_parse_withEmptyText_shouldNotCreateEntry() -> Result<()> {
    let input = "{25}{}Hi\n{50}{60}\n{100}{125}Bye\n";
    let outcome = MicroDvd.parse(input, &options_with_rate(Some(FrameRate::PAL)))?;
    let doc = &outcome.document;
    assert!(outcome.is_clean());
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.entries[0].end, 1999);
    assert_eq!(doc.entries[1].lines, vec!["Bye"]);
    Ok(())
}
