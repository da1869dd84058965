/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use subconv::file_utils::FileManager;
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "movie.srt", "content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.srt"));
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
}

/// Test that generate_output_path keeps the stem and swaps the extension
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let output_path = FileManager::generate_output_path(
        Path::new("/tmp/input/movie.txt"),
        Path::new("/tmp/output"),
        "srt",
    );
    assert_eq!(output_path, Path::new("/tmp/output/movie.srt"));
}

/// Test subtitle extension matching
#[test]
fn test_is_subtitle_file_shouldMatchKnownExtensions() {
    assert!(FileManager::is_subtitle_file("a.srt"));
    assert!(FileManager::is_subtitle_file("a.SUB"));
    assert!(FileManager::is_subtitle_file("a.txt"));
    assert!(!FileManager::is_subtitle_file("a.mkv"));
    assert!(!FileManager::is_subtitle_file("README"));
}

/// Test recursive, ordered discovery of subtitle files
#[test]
fn test_find_subtitle_files_shouldRecurseInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.srt", "")?;
    common::create_test_file(temp_dir.path(), "a.txt", "")?;
    common::create_test_file(temp_dir.path(), "video.mkv", "")?;
    common::create_test_file(temp_dir.path(), "nested/c.sub", "")?;

    let files = FileManager::find_subtitle_files(temp_dir.path())?;
    let names: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();

    assert_eq!(names, vec!["a.txt", "b.srt", "nested/c.sub"]);
    Ok(())
}

/// Test that decoding strips the BOM and replaces invalid bytes
#[test]
fn test_decode_text_shouldStripBomAndReplaceInvalidBytes() {
    assert_eq!(FileManager::decode_text("\u{feff}Hello".as_bytes()), "Hello");
    assert_eq!(FileManager::decode_text(b"caf\xe9"), "caf\u{fffd}");
}

/// Test that writing creates parent directories and reading returns the content
#[test]
fn test_write_to_file_shouldCreateParentsAndRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("deep/er/out.srt");

    FileManager::write_to_file(&path, "1\n00:00:01,000 --> 00:00:02,000\nHi\n")?;
    assert_eq!(fs::read_to_string(&path)?, "1\n00:00:01,000 --> 00:00:02,000\nHi\n");
    assert_eq!(FileManager::read_to_string(&path)?, "1\n00:00:01,000 --> 00:00:02,000\nHi\n");
    Ok(())
}

/// Test that reading a missing file is an error
#[test]
fn test_read_to_string_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("definitely/not/here.srt").is_err());
}
