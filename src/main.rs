// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use subconv::app_config::{self, Config};
use subconv::app_controller::{ConvertRequest, Controller, FileOutcome};
use subconv::errors::AppError;
use subconv::file_utils::FileManager;
use subconv::formats::SubtitleFormat;

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Microdvd,
    Mpl2,
    Subrip,
    Subviewer2,
    Tmplayer,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(cli_format: CliFormat) -> Self {
        match cli_format {
            CliFormat::Microdvd => SubtitleFormat::MicroDvd,
            CliFormat::Mpl2 => SubtitleFormat::Mpl2,
            CliFormat::Subrip => SubtitleFormat::SubRip,
            CliFormat::Subviewer2 => SubtitleFormat::SubViewer2,
            CliFormat::Tmplayer => SubtitleFormat::TmPlayer,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect the format of a subtitle file
    Detect {
        /// Subtitle file to inspect
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Also print the score of every format
        #[arg(short, long)]
        verbose: bool,
    },

    /// Convert a subtitle file (or every subtitle file in a directory)
    Convert(ConvertArgs),

    /// Generate shell completions for subconv
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input subtitle file or directory
    #[arg(short, long, value_name = "INPUT_PATH")]
    input: PathBuf,

    /// Output file (or directory when the input is a directory)
    #[arg(short, long, value_name = "OUTPUT_PATH")]
    output: PathBuf,

    /// Input format, detected when omitted
    #[arg(short = 'f', long = "from", value_enum)]
    from: Option<CliFormat>,

    /// Output format
    #[arg(long = "of", value_enum)]
    to: CliFormat,

    /// Frame rate for frame-based formats (e.g. 23.976, 25)
    #[arg(long)]
    fps: Option<f64>,

    /// Force overwrite of existing output files
    #[arg(long)]
    force_overwrite: bool,

    /// Fail when any entry is malformed
    #[arg(long)]
    strict: bool,
}

/// subconv - subtitle format detection and conversion
///
/// Converts text subtitles between MicroDVD, MPL2, SubRip, SubViewer 2.0
/// and TMPlayer, detecting the input format when it is not given.
#[derive(Parser, Debug)]
#[command(name = "subconv")]
#[command(version)]
#[command(about = "Subtitle format detection and conversion")]
#[command(long_about = "subconv detects the format of text subtitles and converts them between formats.

EXAMPLES:
    subconv detect -i movie.txt                        # Print IN_FORMAT -> <format>
    subconv detect -v -i movie.txt                     # Also print every format's score
    subconv convert -i movie.txt -o movie.srt --of subrip
    subconv convert -i movie.srt -o movie.sub --of microdvd --fps 25
    subconv convert -i subs/ -o converted/ --of subrip # Convert a whole directory
    subconv completions bash > subconv.bash            # Generate bash completions

SUPPORTED FORMATS:
    microdvd    {start}{end}text, frame based
    mpl2        [start][end]text, tenths of a second
    subrip      numbered blocks, HH:MM:SS,mmm --> HH:MM:SS,mmm
    subviewer2  HH:MM:SS.cc,HH:MM:SS.cc followed by text
    tmplayer    HH:MM:SS:text, no end time")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "subconv.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> ExitCode {
    // Logger starts at trace so the level can be lowered after the config is read
    if CustomLogger::init(LevelFilter::Trace).is_err() {
        eprintln!("Failed to initialize logger");
    }
    log::set_max_level(LevelFilter::Warn);

    let cli = CommandLineOptions::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let kind = match e.downcast_ref::<AppError>() {
                Some(AppError::Conversion(conversion_error)) => conversion_error.kind(),
                Some(AppError::Strict { .. }) => "MalformedEntry",
                Some(AppError::File(_)) => "File",
                Some(AppError::Config(_)) => "Config",
                _ => "Error",
            };
            error!("{}: {:#}", kind, e);
            println!("ERROR -> {}", kind);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "subconv", &mut std::io::stdout());
        return Ok(());
    }

    let (mut config, created) = Config::load_or_create(&cli.config_path)
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    if created {
        warn!("Config file not found at '{}', created default config.", cli.config_path);
    }

    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Detect { input, verbose } => run_detect(&controller, &input, verbose),
        Commands::Convert(args) => run_convert(&controller, args),
        Commands::Completions { .. } => Ok(()),
    }
}

fn run_detect(controller: &Controller, input: &Path, verbose: bool) -> Result<()> {
    let (detection, scores) = controller.detect_file(input)?;
    println!("IN_FORMAT -> {}", detection.format);
    if verbose {
        for (format, score) in scores {
            println!("  {:<10} {:.2}", format.name(), score);
        }
    }
    Ok(())
}

fn run_convert(controller: &Controller, args: ConvertArgs) -> Result<()> {
    let target: SubtitleFormat = args.to.into();
    let request = ConvertRequest {
        source: args.from.map(|f| SubtitleFormat::from(f).name().to_string()),
        target: target.name().to_string(),
        frame_rate: args.fps,
        force_overwrite: args.force_overwrite,
        strict: args.strict,
    };

    if FileManager::dir_exists(&args.input) {
        let summary = controller.convert_folder(&args.input, &args.output, &request)?;
        println!("OUT_FORMAT -> {}", target);
        if !summary.failed.is_empty() {
            return Err(anyhow!("{} file(s) failed to convert", summary.failed.len()));
        }
        return Ok(());
    }

    match controller.convert_file(&args.input, &args.output, &request)? {
        FileOutcome::Converted { output_path, conversion } => {
            println!("IN_FORMAT -> {}", conversion.source_format);
            println!("OUT_FORMAT -> {}", conversion.target_format);
            info!("Success: {:?}", output_path);
        }
        FileOutcome::Skipped { output_path } => {
            info!("Skipped: {:?}", output_path);
        }
    }
    Ok(())
}
