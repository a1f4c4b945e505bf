//! Recursive discovery of the files that survive a [`PathMatcher`].

use crate::error::TreecatError;
use crate::matcher::PathMatcher;
use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Outcome of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Matched files in walk order.
    pub files: Vec<PathBuf>,
    /// Directories descended into, the root excluded.
    pub directories_scanned: u64,
    /// Regular files seen after exclusion, matched or not.
    pub files_processed: u64,
}

#[derive(Debug, Clone)]
pub struct FileCollector {
    matcher: Arc<PathMatcher>,
    sort_entries: bool,
}

impl FileCollector {
    pub fn new(matcher: PathMatcher) -> Self {
        Self {
            matcher: Arc::new(matcher),
            sort_entries: false,
        }
    }

    /// Visit entries sorted by file name rather than in filesystem order.
    pub fn sort_entries(mut self, yes: bool) -> Self {
        self.sort_entries = yes;
        self
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    /// Walks `dir` and returns every matched file below it.
    ///
    /// Excluded directories are pruned. Symlinks are neither followed nor
    /// reported.
    ///
    /// # Errors
    ///
    /// The first directory whose entries cannot be listed fails the whole
    /// call with [`TreecatError::DirectoryScan`] carrying that directory.
    pub fn collect(&self, dir: &Path) -> Result<Collection, TreecatError> {
        let mut builder = WalkBuilder::new(dir);
        builder.standard_filters(false).follow_links(false);
        if self.sort_entries {
            builder.sort_by_file_name(|a, b| a.cmp(b));
        }
        let matcher = Arc::clone(&self.matcher);
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !matcher.is_excluded(entry.path(), is_dir)
        });

        let mut collection = Collection::default();
        for result in builder.build() {
            let entry = result.map_err(|e| walk_error(e, dir))?;
            if entry.depth() == 0 {
                continue;
            }
            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                collection.directories_scanned += 1;
            } else if file_type.is_file() {
                collection.files_processed += 1;
                let name = entry.file_name().to_string_lossy();
                if self.matcher.matches_extension(&name) && self.matcher.matches_pattern(&name) {
                    collection.files.push(entry.into_path());
                }
            }
        }

        #[cfg(feature = "logging")]
        tracing::debug!(
            "Collected {} of {} files across {} directories under {}",
            collection.files.len(),
            collection.files_processed,
            collection.directories_scanned,
            dir.display()
        );
        Ok(collection)
    }
}

fn walk_error(err: ignore::Error, root: &Path) -> TreecatError {
    let path = error_path(&err).unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));
    TreecatError::directory_scan(path, source)
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}
