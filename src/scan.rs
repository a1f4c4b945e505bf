//! End-to-end scan: collect, build, render, extract, summarize.

use crate::collector::{Collection, FileCollector};
use crate::error::TreecatError;
use crate::extract::ContentExtractor;
use crate::ignore_rules::IgnoreRuleSet;
use crate::matcher::PathMatcher;
use crate::options::ScanOptions;
use crate::output::{OutputFormat, OutputSink, ReportWriter, write_error_log};
use crate::stats::ScanStatistics;
use crate::tree::build_tree;
use std::path::PathBuf;

/// Stages of a scan, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Init,
    Collecting,
    TreeBuilding,
    Rendering,
    Extracting,
    Finalizing,
    Done,
    Failed,
}

/// What a scan hands back to its caller.
#[derive(Debug)]
pub struct ScanOutcome {
    pub success: bool,
    /// `Done` or `Failed`.
    pub phase: ScanPhase,
    pub stats: ScanStatistics,
    /// The error that failed the scan. Per-file errors live in `stats.errors`.
    pub error: Option<TreecatError>,
    pub matched_files: Vec<PathBuf>,
    /// Side artifact listing per-file errors, when one was written.
    pub error_log: Option<PathBuf>,
}

/// Runs one scan, streaming the report into `sink`.
///
/// Never returns an error: failures are logged, reflected in
/// [`ScanOutcome::success`] and kept in [`ScanOutcome::error`].
pub fn run_scan(options: &ScanOptions, format: OutputFormat, sink: &mut dyn OutputSink) -> ScanOutcome {
    ScanOrchestrator::new(options).run(format, sink)
}

/// Owns the statistics of one scan and drives it through its phases.
pub struct ScanOrchestrator<'a> {
    options: &'a ScanOptions,
    phase: ScanPhase,
    stats: ScanStatistics,
}

impl<'a> ScanOrchestrator<'a> {
    pub fn new(options: &'a ScanOptions) -> Self {
        Self {
            options,
            phase: ScanPhase::Init,
            stats: ScanStatistics::start(),
        }
    }

    pub fn run(mut self, format: OutputFormat, sink: &mut dyn OutputSink) -> ScanOutcome {
        #[cfg(feature = "logging")]
        tracing::debug!("Starting scan of {}", self.options.filter.root.display());

        let mut report = ReportWriter::new(format, sink);
        let result = match self.pipeline(&mut report) {
            Ok(files) => self.finalize(report).map(|log| (files, log)),
            Err(e) => {
                // Close the sink; nothing past what it already holds is written.
                let _ = report.abandon();
                Err(e)
            }
        };

        match result {
            Ok((matched_files, error_log)) => {
                self.enter(ScanPhase::Done);
                #[cfg(feature = "logging")]
                tracing::info!(
                    "Scanned {} directories, matched {} of {} files, {} errors in {:.2}s",
                    self.stats.directories_scanned,
                    self.stats.files_matched,
                    self.stats.files_processed,
                    self.stats.error_count(),
                    self.stats.elapsed_secs()
                );
                ScanOutcome {
                    success: true,
                    phase: self.phase,
                    stats: self.stats,
                    error: None,
                    matched_files,
                    error_log,
                }
            }
            Err(error) => {
                #[cfg(feature = "logging")]
                tracing::error!("Scan failed during {:?}: {}", self.phase, error);
                self.enter(ScanPhase::Failed);
                self.stats.finish();
                ScanOutcome {
                    success: false,
                    phase: self.phase,
                    stats: self.stats,
                    error: Some(error),
                    matched_files: Vec::new(),
                    error_log: None,
                }
            }
        }
    }

    fn enter(&mut self, phase: ScanPhase) {
        #[cfg(feature = "logging")]
        tracing::debug!("Scan phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn pipeline(&mut self, report: &mut ReportWriter<'_>) -> Result<Vec<PathBuf>, TreecatError> {
        let options = self.options;
        self.enter(ScanPhase::Collecting);
        let collection = self.collect()?;
        self.stats.record_collection(&collection);

        self.enter(ScanPhase::TreeBuilding);
        let root = &options.filter.root;
        let tree = build_tree(root, &collection.files);

        self.enter(ScanPhase::Rendering);
        report.header(root, self.stats.started_at)?;
        report.tree(&tree)?;

        self.enter(ScanPhase::Extracting);
        if collection.files.is_empty() {
            report.no_files()?;
            return Ok(collection.files);
        }
        let extractor = ContentExtractor::from_options(options);
        report.contents_heading()?;
        for file in &collection.files {
            let result = extractor.extract(file);
            #[cfg(feature = "logging")]
            if let Some(e) = result.error() {
                tracing::warn!("{}: {}", e.kind(), e);
            }
            report.file(&result)?;
            self.stats.record_file(&result);
        }
        Ok(collection.files)
    }

    fn collect(&self) -> Result<Collection, TreecatError> {
        let filter = &self.options.filter;
        let mut exclude = match self.options.ignore_file() {
            Some(path) => IgnoreRuleSet::load(&path)?.into_patterns(),
            None => Vec::new(),
        };
        exclude.extend(filter.exclude_patterns.iter().cloned());
        #[cfg(feature = "logging")]
        tracing::debug!("Exclude list: {:?}", exclude);

        let matcher = PathMatcher::new(&filter.root, &exclude, &filter.extensions, &filter.patterns)?;
        FileCollector::new(matcher)
            .sort_entries(self.options.sort_entries)
            .collect(&filter.root)
    }

    fn finalize(&mut self, mut report: ReportWriter<'_>) -> Result<Option<PathBuf>, TreecatError> {
        self.enter(ScanPhase::Finalizing);
        self.stats.finish();
        report.statistics(&self.stats)?;

        let error_log = match &self.options.error_log_dir {
            Some(dir) if self.stats.error_count() > 0 => match write_error_log(dir, &self.stats) {
                Ok(path) => {
                    #[cfg(feature = "logging")]
                    tracing::info!("Errors logged to: {}", path.display());
                    Some(path)
                }
                Err(_e) => {
                    #[cfg(feature = "logging")]
                    tracing::warn!("Could not write error log: {}", _e);
                    None
                }
            },
            _ => None,
        };

        report.finish()?;
        Ok(error_log)
    }
}
