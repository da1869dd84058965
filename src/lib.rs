/*!
 * # subconv - subtitle format detection and conversion
 *
 * A Rust library for converting text subtitle tracks between formats.
 *
 * ## Features
 *
 * - Detect the format of a subtitle file without a hint
 * - Parse and render five formats:
 *   - MicroDVD (frame based)
 *   - MPL2
 *   - SubRip
 *   - SubViewer 2.0
 *   - TMPlayer (no end times, synthesized on parse)
 * - Exact frame/millisecond conversion for fractional frame rates
 * - Best-effort parsing: malformed entries are reported, not fatal
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timing`: Milliseconds, frame indexes and frame rates
 * - `document`: Format-independent subtitle model
 * - `formats`: One grammar per format behind the `SubtitleGrammar` trait
 * - `detector`: Scores an input against every grammar
 * - `converter`: Detect or accept a format, parse, render
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `app_controller`: File and directory workflows used by the CLI
 * - `errors`: Custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod converter;
pub mod detector;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod formats;
pub mod timing;

// Re-export main types for easier usage
pub use app_config::Config;
pub use converter::{Conversion, Converter};
pub use detector::{Detection, Detector, NoMatch};
pub use document::{ParseOutcome, ParseWarning, SubtitleDocument, SubtitleEntry};
pub use errors::{AppError, ConversionError, SubtitleError};
pub use formats::{SubtitleFormat, SubtitleGrammar};
pub use timing::{to_frame, to_milliseconds, FrameRate};
