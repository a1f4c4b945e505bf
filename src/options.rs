use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cap on the size of a file whose content is extracted (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default name of the ignore file looked up in the scan root.
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryDetection {
    Simple,
    Accurate,
    None,
}

/// How file bytes are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDecoding {
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    Lossy,
    /// Invalid UTF-8 fails the file with `INVALID_ENCODING`.
    Strict,
}

/// How keyword matches are marked in extracted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightStyle {
    /// Yellow background, black foreground. Meant for terminals.
    Ansi,
    /// `>>match<<`. Meant for files.
    Markers,
    /// Matches are counted but left untouched.
    None,
}

/// What to scan and which files survive.
///
/// Created once per scan and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanFilter {
    /// Absolute scan root.
    pub root: PathBuf,
    /// Exclusion globs on top of whatever the ignore file contributes.
    pub exclude_patterns: Vec<String>,
    /// Allowed filename suffixes. Empty allows everything.
    pub extensions: Vec<String>,
    /// Filename globs. Empty allows everything.
    pub patterns: Vec<String>,
    pub keyword: Option<String>,
}

impl ScanFilter {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: absolutize(root.as_ref()),
            exclude_patterns: Vec::new(),
            extensions: Vec::new(),
            patterns: Vec::new(),
            keyword: None,
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    pub filter: ScanFilter,
    pub max_file_size: u64,
    pub decoding: TextDecoding,
    pub binary_detection: BinaryDetection,
    pub highlight: HighlightStyle,
    /// Read exclusion rules from `ignore_file_name` in the scan root.
    pub use_ignore_file: bool,
    pub ignore_file_name: String,
    /// Sort directory entries by file name instead of keeping filesystem order.
    pub sort_entries: bool,
    /// Where to write the per-file error log, if anywhere.
    pub error_log_dir: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            filter: ScanFilter::new("."),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            decoding: TextDecoding::Lossy,
            binary_detection: BinaryDetection::Simple,
            highlight: HighlightStyle::Ansi,
            use_ignore_file: true,
            ignore_file_name: DEFAULT_IGNORE_FILE.to_string(),
            sort_entries: false,
            error_log_dir: None,
        }
    }
}

impl ScanOptions {
    /// Path of the ignore file consulted for this scan, if enabled.
    pub fn ignore_file(&self) -> Option<PathBuf> {
        self.use_ignore_file
            .then(|| self.filter.root.join(&self.ignore_file_name))
    }
}

#[derive(Debug, Default)]
pub struct ScanBuilder {
    options: ScanOptions,
}

impl ScanBuilder {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            options: ScanOptions {
                filter: ScanFilter::new(root),
                ..Default::default()
            },
        }
    }
    pub fn exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.filter.exclude_patterns = patterns;
        self
    }
    pub fn extensions(mut self, extensions: Vec<String>) -> Self {
        self.options.filter.extensions = extensions;
        self
    }
    pub fn patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.filter.patterns = patterns;
        self
    }
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.options.filter.keyword = (!keyword.is_empty()).then_some(keyword);
        self
    }
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.options.max_file_size = bytes;
        self
    }
    pub fn decoding(mut self, decoding: TextDecoding) -> Self {
        self.options.decoding = decoding;
        self
    }
    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.options.binary_detection = method;
        self
    }
    pub fn highlight(mut self, style: HighlightStyle) -> Self {
        self.options.highlight = style;
        self
    }
    pub fn use_ignore_file(mut self, yes: bool) -> Self {
        self.options.use_ignore_file = yes;
        self
    }
    pub fn ignore_file_name(mut self, name: impl Into<String>) -> Self {
        self.options.ignore_file_name = name.into();
        self
    }
    pub fn sort_entries(mut self, yes: bool) -> Self {
        self.options.sort_entries = yes;
        self
    }
    pub fn error_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.options.error_log_dir = dir;
        self
    }
    pub fn build(self) -> ScanOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_root_becomes_absolute() {
        let filter = ScanFilter::new("some/dir");
        assert!(filter.root.is_absolute());
        assert!(filter.root.ends_with("some/dir"));
    }

    #[test]
    fn empty_keyword_means_no_keyword() {
        let options = ScanBuilder::new(".").keyword("").build();
        assert_eq!(options.filter.keyword, None);
        let options = ScanBuilder::new(".").keyword("TODO").build();
        assert_eq!(options.filter.keyword.as_deref(), Some("TODO"));
    }

    #[test]
    fn ignore_file_follows_toggle() {
        let options = ScanBuilder::new("/tmp/x").build();
        assert_eq!(options.ignore_file(), Some(PathBuf::from("/tmp/x/.gitignore")));
        let options = ScanBuilder::new("/tmp/x").use_ignore_file(false).build();
        assert_eq!(options.ignore_file(), None);
    }
}
