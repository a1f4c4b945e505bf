//! Reading exclusion rules out of a gitignore-style file.

use crate::error::TreecatError;
use std::fs;
use std::io;
use std::path::Path;

/// Ordered, cleaned-up lines of an ignore file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRuleSet {
    patterns: Vec<String>,
}

impl IgnoreRuleSet {
    /// Keeps every non-blank line that is not a `#` comment, trimmed.
    pub fn parse(text: &str) -> Self {
        let patterns = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { patterns }
    }

    /// Loads rules from `path`.
    ///
    /// A missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// Any other read failure (permissions, `path` being a directory, ...)
    /// is returned as [`TreecatError::IgnoreFile`].
    pub fn load(path: &Path) -> Result<Self, TreecatError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Self::parse(&String::from_utf8_lossy(&bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                #[cfg(feature = "logging")]
                tracing::info!("{} not found, no ignore rules applied", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(TreecatError::IgnoreFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn into_patterns(self) -> Vec<String> {
        self.patterns
    }
}
