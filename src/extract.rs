//! Bounded, fault-tolerant reading of matched files.

use crate::error::TreecatError;
use crate::options::{BinaryDetection, HighlightStyle, ScanOptions, TextDecoding};
use regex::{Regex, RegexBuilder};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

const BINARY_SNIFF_LEN: usize = 4096;
const BINARY_PLACEHOLDER: &str = "[Binary file, content omitted]";
const ANSI_HIGHLIGHT: &str = "\x1b[43m\x1b[30m";
const ANSI_RESET: &str = "\x1b[0m";

/// Case-insensitive keyword search that marks every hit.
#[derive(Debug, Clone)]
pub struct Highlighter {
    regex: Regex,
    style: HighlightStyle,
}

impl Highlighter {
    /// Compiles `keyword` as a regex, falling back to a literal match when it
    /// is not valid regex syntax. Returns `None` for an empty keyword.
    pub fn new(keyword: &str, style: HighlightStyle) -> Option<Self> {
        if keyword.is_empty() {
            return None;
        }
        let regex = RegexBuilder::new(keyword)
            .case_insensitive(true)
            .build()
            .or_else(|_| {
                #[cfg(feature = "logging")]
                tracing::debug!("Keyword {keyword:?} is not a valid regex, matching literally");
                RegexBuilder::new(&regex::escape(keyword))
                    .case_insensitive(true)
                    .build()
            })
            .ok()?;
        Some(Self { regex, style })
    }

    /// Returns the marked-up text and the number of hits. Empty matches
    /// are ignored.
    pub fn apply(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        let mut count = 0;
        for m in self.regex.find_iter(text).filter(|m| !m.is_empty()) {
            out.push_str(&text[last..m.start()]);
            match self.style {
                HighlightStyle::Ansi => {
                    out.push_str(ANSI_HIGHLIGHT);
                    out.push_str(m.as_str());
                    out.push_str(ANSI_RESET);
                }
                HighlightStyle::Markers => {
                    out.push_str(">>");
                    out.push_str(m.as_str());
                    out.push_str("<<");
                }
                HighlightStyle::None => out.push_str(m.as_str()),
            }
            last = m.end();
            count += 1;
        }
        out.push_str(&text[last..]);
        (out, count)
    }
}

/// Text extracted from one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub text: String,
    pub size: u64,
    pub is_binary: bool,
    pub keyword_matches: usize,
}

/// Outcome of one extraction attempt.
#[derive(Debug)]
pub struct FileReadResult {
    pub path: PathBuf,
    pub outcome: Result<FileContent, TreecatError>,
}

impl FileReadResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn keyword_matches(&self) -> usize {
        self.outcome.as_ref().map_or(0, |c| c.keyword_matches)
    }

    pub fn error(&self) -> Option<&TreecatError> {
        self.outcome.as_ref().err()
    }
}

#[derive(Debug, Clone)]
pub struct ContentExtractor {
    max_size: u64,
    decoding: TextDecoding,
    binary_detection: BinaryDetection,
    highlighter: Option<Highlighter>,
}

impl ContentExtractor {
    pub fn new(max_size: u64, decoding: TextDecoding) -> Self {
        Self {
            max_size,
            decoding,
            binary_detection: BinaryDetection::None,
            highlighter: None,
        }
    }

    pub fn from_options(options: &ScanOptions) -> Self {
        let highlighter = options
            .filter
            .keyword
            .as_deref()
            .and_then(|k| Highlighter::new(k, options.highlight));
        Self::new(options.max_file_size, options.decoding)
            .binary_detection(options.binary_detection)
            .highlighter(highlighter)
    }

    pub fn binary_detection(mut self, method: BinaryDetection) -> Self {
        self.binary_detection = method;
        self
    }

    pub fn highlighter(mut self, highlighter: Option<Highlighter>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Reads `path`. Never panics and never aborts the caller: every failure
    /// ends up in [`FileReadResult::outcome`].
    pub fn extract(&self, path: &Path) -> FileReadResult {
        let outcome = self.read(path);
        #[cfg(feature = "logging")]
        if let Err(ref e) = outcome {
            tracing::debug!("Extraction failed ({}): {}", e.kind(), e);
        }
        FileReadResult {
            path: path.to_path_buf(),
            outcome,
        }
    }

    fn read(&self, path: &Path) -> Result<FileContent, TreecatError> {
        // Size is judged from the directory entry, before the content is opened.
        let metadata = fs::metadata(path).map_err(|e| TreecatError::file_read(path, e))?;
        if metadata.is_dir() {
            return Err(TreecatError::IsDirectory {
                path: path.to_path_buf(),
            });
        }
        self.check_size(path, metadata.len())?;

        let file = File::open(path).map_err(|e| TreecatError::file_read(path, e))?;
        // The file may grow between the size check and the read.
        let mut bytes = Vec::with_capacity(metadata.len() as usize);
        file.take(self.max_size.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| TreecatError::file_read(path, e))?;
        let size = bytes.len() as u64;
        self.check_size(path, size)?;

        if self.is_binary(&bytes) {
            #[cfg(feature = "logging")]
            tracing::debug!("Binary file detected: {}", path.display());
            return Ok(FileContent {
                text: BINARY_PLACEHOLDER.to_string(),
                size,
                is_binary: true,
                keyword_matches: 0,
            });
        }

        let text = match self.decoding {
            TextDecoding::Lossy => String::from_utf8_lossy(&bytes).into_owned(),
            TextDecoding::Strict => {
                String::from_utf8(bytes).map_err(|e| TreecatError::InvalidEncoding {
                    path: path.to_path_buf(),
                    source: e.utf8_error(),
                })?
            }
        };

        let (text, keyword_matches) = match &self.highlighter {
            Some(highlighter) => highlighter.apply(&text),
            None => (text, 0),
        };
        Ok(FileContent {
            text,
            size,
            is_binary: false,
            keyword_matches,
        })
    }

    fn check_size(&self, path: &Path, size: u64) -> Result<(), TreecatError> {
        if size > self.max_size {
            return Err(TreecatError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max_allowed: self.max_size,
            });
        }
        Ok(())
    }

    fn is_binary(&self, bytes: &[u8]) -> bool {
        let head = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
        match self.binary_detection {
            BinaryDetection::Simple => head.contains(&0),
            BinaryDetection::Accurate => content_inspector::inspect(head).is_binary(),
            BinaryDetection::None => false,
        }
    }
}
