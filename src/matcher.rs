//! Exclusion, extension and filename-pattern checks for walked entries.

use crate::error::TreecatError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Exclusion globs split by how they are applied.
#[derive(Debug, Clone)]
struct ExcludeSet {
    /// Matched against the full path as produced by the walk.
    paths: GlobSet,
    /// Slash-less patterns, also matched against the entry's file name.
    names: GlobSet,
}

impl ExcludeSet {
    fn is_match(&self, path: &Path) -> bool {
        self.paths.is_match(path)
            || path
                .file_name()
                .is_some_and(|name| self.names.is_match(Path::new(name)))
    }
}

struct ExcludeSetBuilder {
    paths: GlobSetBuilder,
    names: GlobSetBuilder,
}

impl ExcludeSetBuilder {
    fn new() -> Self {
        Self {
            paths: GlobSetBuilder::new(),
            names: GlobSetBuilder::new(),
        }
    }

    fn add(&mut self, root: &Path, pattern: &str) -> Result<(), TreecatError> {
        if let Some(anchored) = pattern.strip_prefix('/') {
            let full = if Path::new(pattern).starts_with(root) {
                pattern.to_string()
            } else {
                root_relative(root, anchored)
            };
            self.paths.add(compile(&full)?);
            return Ok(());
        }
        self.paths.add(compile(pattern)?);
        if pattern.contains('/') {
            self.paths.add(compile(&root_relative(root, pattern))?);
        } else {
            self.names.add(compile(pattern)?);
        }
        Ok(())
    }

    fn build(self) -> Result<ExcludeSet, TreecatError> {
        Ok(ExcludeSet {
            paths: finish(self.paths)?,
            names: finish(self.names)?,
        })
    }
}

fn root_relative(root: &Path, pattern: &str) -> String {
    let root = globset::escape(&root.to_string_lossy());
    format!("{}/{}", root.trim_end_matches('/'), pattern)
}

fn compile(pattern: &str) -> Result<globset::Glob, TreecatError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|source| TreecatError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

fn finish(builder: GlobSetBuilder) -> Result<GlobSet, TreecatError> {
    builder.build().map_err(|source| TreecatError::InvalidPattern {
        pattern: "combined patterns".to_string(),
        source,
    })
}

/// Decides which walked entries are pruned and which files are kept.
///
/// Exclusion patterns use glob syntax with `*` confined to one path segment.
/// A trailing `/` restricts a pattern to directories and a leading `/`
/// anchors it at the scan root.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    root: PathBuf,
    any: ExcludeSet,
    dirs_only: ExcludeSet,
    extensions: Vec<String>,
    patterns: Option<GlobSet>,
}

impl PathMatcher {
    /// Compiles the given pattern lists.
    ///
    /// # Errors
    ///
    /// Returns [`TreecatError::InvalidPattern`] for a glob that does not parse.
    pub fn new(
        root: impl Into<PathBuf>,
        exclude_patterns: &[String],
        extensions: &[String],
        patterns: &[String],
    ) -> Result<Self, TreecatError> {
        let root = root.into();
        let mut any = ExcludeSetBuilder::new();
        let mut dirs_only = ExcludeSetBuilder::new();
        for pattern in exclude_patterns {
            match pattern.strip_suffix('/') {
                Some(dir) if !dir.is_empty() => dirs_only.add(&root, dir)?,
                _ => any.add(&root, pattern)?,
            }
        }

        let patterns = if patterns.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in patterns {
                builder.add(compile(pattern)?);
            }
            Some(finish(builder)?)
        };

        Ok(Self {
            any: any.build()?,
            dirs_only: dirs_only.build()?,
            root,
            extensions: extensions.to_vec(),
            patterns,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True if `path` hits an exclusion rule. Excluded directories are pruned.
    pub fn is_excluded(&self, path: &Path, is_dir: bool) -> bool {
        self.any.is_match(path) || (is_dir && self.dirs_only.is_match(path))
    }

    /// Plain suffix check; an empty extension list allows everything.
    pub fn matches_extension(&self, file_name: &str) -> bool {
        self.extensions.is_empty()
            || self
                .extensions
                .iter()
                .any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// Glob check on the bare file name; no patterns allows everything.
    pub fn matches_pattern(&self, file_name: &str) -> bool {
        self.patterns
            .as_ref()
            .is_none_or(|set| set.is_match(Path::new(file_name)))
    }

    /// The full inclusion test for a regular file.
    pub fn accepts_file(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        !self.is_excluded(path, false)
            && self.matches_extension(&name)
            && self.matches_pattern(&name)
    }
}
