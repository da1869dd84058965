/*!
 * Tests for the MPL2 grammar
 */

use anyhow::Result;
use subconv::document::{SubtitleDocument, SubtitleEntry};
use subconv::formats::{Mpl2, ParseOptions, RenderOptions, SubtitleFormat, SubtitleGrammar};
use crate::common;

/// Test parsing tenths of a second and pipe-separated lines
#[test]
fn test_parse_withValidFile_shouldReadDeciseconds() -> Result<()> {
    let outcome = Mpl2.parse(common::MPL2_SAMPLE, &ParseOptions::default())?;
    let doc = &outcome.document;

    assert!(outcome.is_clean());
    assert_eq!(doc.source_format, Some(SubtitleFormat::Mpl2));
    assert_eq!(doc.frame_rate, None);
    assert_eq!((doc.entries[0].start, doc.entries[0].end), (1000, 3500));
    assert_eq!((doc.entries[1].start, doc.entries[1].end), (4000, 6200));
    assert_eq!(doc.entries[1].lines, vec!["Second line one", "Second line two"]);
    assert_eq!((doc.entries[2].start, doc.entries[2].end), (70_100, 72_900));
    Ok(())
}

/// Test that an empty end field is synthesized from the default duration
#[test]
fn test_parse_withEmptyEnd_shouldSynthesizeEnd() -> Result<()> {
    let outcome = Mpl2.parse("[10][]Only\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.entries[0].end, 4000);
    Ok(())
}

/// Test rendering truncates to tenths of a second
#[test]
fn test_render_shouldTruncateToDeciseconds() {
    let doc = SubtitleDocument::from_entries(vec![SubtitleEntry::from_text(1, 1050, 3599, "A\nB")]);
    assert_eq!(Mpl2.render(&doc, &RenderOptions::default()), "[10][35]A|B\n");
}

/// Test that non-matching lines are warnings, not failures
#[test]
fn test_parse_withMixedLines_shouldWarn() -> Result<()> {
    let outcome = Mpl2.parse("[10][20]Ok\n{10}{20}Wrong\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.len(), 1);
    assert_eq!(outcome.warnings[0].line, 2);
    Ok(())
}

/// Test detection scores
#[test]
fn test_score_shouldMatchBracketLines() {
    assert_eq!(Mpl2.detect(common::MPL2_SAMPLE), 1.0);
    assert_eq!(Mpl2.detect(common::MICRODVD_SAMPLE), 0.0);
    assert_eq!(Mpl2.detect(common::SUBVIEWER2_SAMPLE), 0.0);
}

/// Test that a line without text bounds the previous entry and is not an entry
#[test]
fn test_parse_withEmptyText_shouldNotCreateEntry() -> Result<()> {
    let outcome = Mpl2.parse("[10][]Hi\n[20][30]\n[40][50]Bye\n", &ParseOptions::default())?;
    let doc = &outcome.document;
    assert!(outcome.is_clean());
    assert_eq!(doc.len(), 2);
    assert_eq!((doc.entries[0].start, doc.entries[0].end), (1000, 1999));
    assert_eq!(doc.entries[1].index, 2);
    assert_eq!(doc.entries[1].lines, vec!["Bye"]);

    let only_empty = Mpl2.parse("[10][20]\n[30][40]Hi\n", &ParseOptions::default())?;
    assert_eq!(only_empty.document.len(), 1);
    Ok(())
}

/// Test that an empty pipe segment does not become an empty line
#[test]
fn test_parse_withEmptyPipeSegment_shouldDropIt() -> Result<()> {
    let outcome = Mpl2.parse("[10][20]One||Two|\n", &ParseOptions::default())?;
    assert_eq!(outcome.document.entries[0].lines, vec!["One", "Two"]);
    Ok(())
}

/// Test that a start time near the limit gets a saturated end instead of overflowing
#[test]
fn test_parse_withStartNearLimit_shouldSaturateEnd() -> Result<()> {
    let outcome = Mpl2.parse("[184467440737095516][]x\n", &ParseOptions::default())?;
    let entry = &outcome.document.entries[0];
    assert_eq!(entry.start, 18_446_744_073_709_551_600);
    assert_eq!(entry.end, u64::MAX);
    Ok(())
}
