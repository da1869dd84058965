/*!
 * Every supported format converted to every other format
 */

use anyhow::Result;
use subconv::converter::Converter;
use subconv::formats::{grammar_for, ParseOptions, SubtitleFormat};
use crate::common;

/// Test that every conversion succeeds and its output detects as the target
#[test]
fn test_convert_everyPair_shouldProduceDetectableOutput() -> Result<()> {
    common::init_logging();
    let converter = Converter::default();

    for source in SubtitleFormat::ALL {
        for target in SubtitleFormat::ALL {
            let conversion = converter.convert(common::sample_for(source), None, target.name(), None)?;

            assert_eq!(conversion.source_format, source, "{} -> {}", source, target);
            assert_eq!(conversion.target_format, target);
            assert_eq!(conversion.entries, 3, "{} -> {}", source, target);
            assert!(conversion.warnings.is_empty());

            let detected = converter.detect(&conversion.output)?;
            assert_eq!(detected.format, target, "{} -> {}", source, target);
        }
    }
    Ok(())
}

/// Test that multi-line text survives every conversion
#[test]
fn test_convert_everyPair_shouldPreserveLines() -> Result<()> {
    let converter = Converter::default();

    for source in SubtitleFormat::ALL {
        for target in SubtitleFormat::ALL {
            let conversion = converter.convert(common::sample_for(source), None, target.name(), None)?;
            let reparsed = grammar_for(target).parse(&conversion.output, &ParseOptions::default())?;

            let entries = &reparsed.document.entries;
            assert_eq!(entries[0].lines, vec!["Hello world"], "{} -> {}", source, target);
            assert_eq!(entries[1].lines, vec!["Second line one", "Second line two"]);
            assert_eq!(entries[2].lines, vec!["Third"]);
        }
    }
    Ok(())
}

/// Test that start times survive conversion to SubRip from every format
#[test]
fn test_convert_everyFormatToSubrip_shouldKeepStartTimes() -> Result<()> {
    let converter = Converter::default();

    for source in SubtitleFormat::ALL {
        let conversion = converter.convert(common::sample_for(source), None, "subrip", None)?;
        let reparsed = grammar_for(SubtitleFormat::SubRip).parse(&conversion.output, &ParseOptions::default())?;

        let starts: Vec<u64> = reparsed.document.entries.iter().map(|e| e.start).collect();
        assert_eq!(&starts[..2], &[1000, 4000], "{}", source);
        assert!(reparsed.document.is_chronological());
    }
    Ok(())
}
