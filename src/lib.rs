//! # Treecat
//!
//! `treecat` walks a directory, keeps the files that survive exclusion, extension and
//! filename-pattern filters, renders them as a `tree`-style hierarchy and extracts their
//! contents (optionally keyword-highlighted) into a Markdown, plain-text or JSON report.
//!
//! The pipeline is sequential: [`FileCollector`] → [`build_tree`] → [`TreeNode::render`] →
//! [`ContentExtractor`], sequenced by [`run_scan`]. A single unreadable file never aborts a
//! scan; it is recorded in [`ScanStatistics::errors`] and marked inline in the report.
//!
//! # Features
//!
//! - `logging` (default): Emits diagnostics via the `tracing` crate.
//!
//! # Example
//!
//! ```no_run
//! use treecat::{MemorySink, OutputFormat, ScanBuilder, run_scan};
//!
//! let options = ScanBuilder::new(".")
//!     .extensions(vec![".rs".into()])
//!     .keyword("TODO")
//!     .build();
//!
//! let mut sink = MemorySink::new();
//! let outcome = run_scan(&options, OutputFormat::Markdown, &mut sink);
//!
//! println!("{}", sink.contents());
//! println!("matched {} files, success: {}", outcome.stats.files_matched, outcome.success);
//! ```

mod collector;
pub mod config;
mod error;
mod extract;
mod ignore_rules;
mod matcher;
mod options;
pub mod output;
mod scan;
mod stats;
mod tree;

pub use collector::{Collection, FileCollector};
pub use error::{ErrorKind, TreecatError};
pub use extract::{ContentExtractor, FileContent, FileReadResult, Highlighter};
pub use ignore_rules::IgnoreRuleSet;
pub use matcher::PathMatcher;
pub use options::{
    BinaryDetection, DEFAULT_IGNORE_FILE, DEFAULT_MAX_FILE_SIZE, HighlightStyle, ScanBuilder,
    ScanFilter, ScanOptions, TextDecoding,
};
pub use output::{FileSink, MemorySink, OutputFormat, OutputSink, TerminalSink};
pub use scan::{ScanOrchestrator, ScanOutcome, ScanPhase, run_scan};
pub use stats::{ErrorRecord, ScanStatistics};
pub use tree::{TreeLines, TreeNode, build_tree};
