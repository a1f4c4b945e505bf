//! Command-line interface for treecat.
//!
//! Resolves the scan settings (config file first, then flags), picks the
//! output sink and runs the scan, exiting non-zero when the scan fails.

use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::exit;
use treecat::config::{self, DEFAULT_SETTINGS_FILE, OutputChoice, Settings};
use treecat::output::file_timestamp;
use treecat::{
    BinaryDetection, FileSink, OutputSink, ScanOptions, TerminalSink, TextDecoding, run_scan,
};

/// treecat — directory tree and content snapshot tool
#[derive(Parser)]
#[command(name = "treecat", version, about, long_about = None)]
struct Cli {
    /// Directory to scan (default current dir, or the config's targetDir)
    root: Option<PathBuf>,

    /// Allowed file extensions, comma-separated (e.g. .rs,.toml)
    #[arg(short = 'e', long = "ext", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Filename glob patterns, comma-separated (default *)
    #[arg(long = "pattern", value_delimiter = ',')]
    patterns: Vec<String>,

    /// Keyword to highlight and count (case-insensitive regex)
    #[arg(short, long)]
    keyword: Option<String>,

    /// Where the report goes
    #[arg(short, long, value_enum)]
    output: Option<OutputChoice>,

    /// Directory for report files and error logs
    #[arg(long, default_value = "output-treecat")]
    output_dir: PathBuf,

    /// Extra exclusion patterns (can be repeated)
    #[arg(short = 'I', long = "ignore")]
    ignore_patterns: Vec<String>,

    /// Do not read exclusion rules from .gitignore
    #[arg(long)]
    no_gitignore: bool,

    /// Largest file, in bytes, whose content is extracted
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Fail files that are not valid UTF-8 instead of replacing bad bytes
    #[arg(long)]
    strict_utf8: bool,

    /// Binary detection strategy
    #[arg(long, default_value = "simple", value_parser = parse_binary_detection)]
    binary_detection: BinaryDetection,

    /// Sort entries by name instead of filesystem order
    #[arg(long)]
    sort: bool,

    /// Load settings from this JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the effective settings to <root>/.treecatrc.json after the scan
    #[arg(long)]
    save_config: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Parse string into BinaryDetection enum.
fn parse_binary_detection(s: &str) -> Result<BinaryDetection, String> {
    match s {
        "simple" => Ok(BinaryDetection::Simple),
        "accurate" => Ok(BinaryDetection::Accurate),
        "none" => Ok(BinaryDetection::None),
        _ => Err(format!("invalid binary detection method: {}", s)),
    }
}

impl Cli {
    /// Flags override whatever the config file (or the defaults) say.
    fn into_settings(self, base: Settings) -> (Settings, ScanOptions, PathBuf, bool) {
        let mut settings = base;
        if let Some(root) = self.root {
            settings.target_dir = root;
        }
        if !self.extensions.is_empty() {
            settings.extensions = self.extensions;
        }
        if !self.patterns.is_empty() {
            settings.patterns = self.patterns;
        }
        if let Some(keyword) = self.keyword {
            settings.keyword = keyword;
        }
        if let Some(output) = self.output {
            settings.output_choice = output;
        }
        if self.no_gitignore {
            settings.exclude_gitignore = false;
        }
        if let Some(max) = self.max_file_size {
            settings.max_file_size = max;
        }
        if self.strict_utf8 {
            settings.decoding = TextDecoding::Strict;
        }

        let options = settings
            .to_builder()
            .exclude_patterns(self.ignore_patterns)
            .binary_detection(self.binary_detection)
            .sort_entries(self.sort)
            .error_log_dir(Some(self.output_dir.clone()))
            .build();
        (settings, options, self.output_dir, self.save_config)
    }
}

#[cfg(feature = "logging")]
fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    #[cfg(feature = "logging")]
    setup_logging(cli.verbose);

    let base = match cli.config.as_deref() {
        Some(path) => match config::load_settings(path) {
            Ok(settings) => {
                eprintln!("Loaded config from {}", path.display());
                settings
            }
            Err(e) => {
                eprintln!("[ERROR] {} (code: {})", e, e.kind());
                exit(1);
            }
        },
        None => Settings::default(),
    };

    let (settings, options, output_dir, save_config) = cli.into_settings(base);
    let choice = settings.output_choice;

    let success = if choice.is_terminal() {
        scan(&options, choice, &mut TerminalSink)
    } else {
        let path = report_path(&output_dir, choice);
        let mut sink = match FileSink::create(&path) {
            Ok(sink) => sink,
            Err(e) => {
                eprintln!("[FATAL] {} (code: {})", e, e.kind());
                exit(1);
            }
        };
        let success = scan(&options, choice, &mut sink);
        if success {
            eprintln!("Output saved to: {}", path.display());
        }
        success
    };

    if success && save_config {
        let path = options.filter.root.join(DEFAULT_SETTINGS_FILE);
        let settings = Settings::from_options(&options, choice);
        if let Err(e) = config::save_settings(&path, &settings) {
            eprintln!("[ERROR] {} (code: {})", e, e.kind());
            exit(1);
        }
        eprintln!("Configuration saved to {}", path.display());
    }

    exit(if success { 0 } else { 1 });
}

fn scan(options: &ScanOptions, choice: OutputChoice, sink: &mut dyn OutputSink) -> bool {
    let outcome = run_scan(options, choice.format(), sink);
    if let Some(e) = &outcome.error {
        let path = e
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "N/A".to_string());
        eprintln!("[FATAL] {} (code: {}, path: {})", e, e.kind(), path);
        return false;
    }
    if outcome.stats.error_count() > 0 {
        eprintln!("{} file(s) could not be read", outcome.stats.error_count());
        if let Some(log) = &outcome.error_log {
            eprintln!("Errors logged to: {}", log.display());
        }
    }
    outcome.success
}

fn report_path(dir: &Path, choice: OutputChoice) -> PathBuf {
    dir.join(format!(
        "treecat-{}.{}",
        file_timestamp(Utc::now()),
        choice.format().extension()
    ))
}
