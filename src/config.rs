//! Persisted scan settings (`.treecatrc.json`).

use crate::error::TreecatError;
use crate::options::{
    DEFAULT_MAX_FILE_SIZE, HighlightStyle, ScanBuilder, ScanOptions, TextDecoding,
};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SETTINGS_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_SETTINGS_FILE: &str = ".treecatrc.json";

/// Where the report goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputChoice {
    Terminal,
    Md,
    Txt,
    Json,
}

impl OutputChoice {
    /// Terminal output is laid out as Markdown.
    pub fn format(self) -> OutputFormat {
        match self {
            OutputChoice::Terminal | OutputChoice::Md => OutputFormat::Markdown,
            OutputChoice::Txt => OutputFormat::Text,
            OutputChoice::Json => OutputFormat::Json,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == OutputChoice::Terminal
    }

    pub fn highlight(self) -> HighlightStyle {
        match self {
            OutputChoice::Terminal => HighlightStyle::Ansi,
            _ => HighlightStyle::Markers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub version: String,
    pub target_dir: PathBuf,
    pub exclude_gitignore: bool,
    pub extensions: Vec<String>,
    pub patterns: Vec<String>,
    pub keyword: String,
    pub output_choice: OutputChoice,
    pub max_file_size: u64,
    pub decoding: TextDecoding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION.to_string(),
            target_dir: PathBuf::from("."),
            exclude_gitignore: true,
            extensions: Vec::new(),
            patterns: vec!["*".to_string()],
            keyword: String::new(),
            output_choice: OutputChoice::Terminal,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            decoding: TextDecoding::Lossy,
        }
    }
}

impl Settings {
    pub fn from_options(options: &ScanOptions, output_choice: OutputChoice) -> Self {
        let filter = &options.filter;
        Self {
            version: SETTINGS_VERSION.to_string(),
            target_dir: filter.root.clone(),
            exclude_gitignore: options.use_ignore_file,
            extensions: filter.extensions.clone(),
            patterns: filter.patterns.clone(),
            keyword: filter.keyword.clone().unwrap_or_default(),
            output_choice,
            max_file_size: options.max_file_size,
            decoding: options.decoding,
        }
    }

    /// A builder pre-populated from these settings.
    pub fn to_builder(&self) -> ScanBuilder {
        ScanBuilder::new(&self.target_dir)
            .use_ignore_file(self.exclude_gitignore)
            .extensions(self.extensions.clone())
            .patterns(self.patterns.clone())
            .keyword(self.keyword.clone())
            .max_file_size(self.max_file_size)
            .decoding(self.decoding)
            .highlight(self.output_choice.highlight())
    }
}

/// Loads settings from `path`; keys missing from the file take their defaults.
///
/// A missing file yields [`Settings::default`].
///
/// # Errors
///
/// [`TreecatError::ConfigEmpty`] for a blank file, [`TreecatError::InvalidConfig`]
/// for anything unreadable or unparsable.
pub fn load_settings(path: &Path) -> Result<Settings, TreecatError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            #[cfg(feature = "logging")]
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(e) => {
            return Err(TreecatError::InvalidConfig {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };
    if text.trim().is_empty() {
        return Err(TreecatError::ConfigEmpty {
            path: path.to_path_buf(),
        });
    }
    let settings: Settings =
        serde_json::from_str(&text).map_err(|e| TreecatError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if settings.version != SETTINGS_VERSION {
        #[cfg(feature = "logging")]
        tracing::warn!(
            "Config version {} differs from current {}",
            settings.version,
            SETTINGS_VERSION
        );
    }
    Ok(settings)
}

/// Writes `settings` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`TreecatError::ConfigSave`] if anything along the way fails.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), TreecatError> {
    let save_err = |source: io::Error| TreecatError::ConfigSave {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(save_err)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| save_err(io::Error::other(e)))?;
    fs::write(path, json).map_err(save_err)?;
    #[cfg(feature = "logging")]
    tracing::info!("Configuration saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = load_settings(&dir.path().join(DEFAULT_SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"version": "0.0.1", "keyword": "FIXME", "outputChoice": "txt"}"#).unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.keyword, "FIXME");
        assert_eq!(settings.output_choice, OutputChoice::Txt);
        assert_eq!(settings.patterns, vec!["*".to_string()]);
        assert_eq!(settings.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }

    #[test]
    fn blank_and_broken_files_are_rejected() {
        let dir = tempdir().unwrap();
        let blank = dir.path().join("blank.json");
        fs::write(&blank, "  \n").unwrap();
        assert_eq!(load_settings(&blank).unwrap_err().kind(), ErrorKind::ConfigEmpty);

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert_eq!(load_settings(&broken).unwrap_err().kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/.treecatrc.json");
        let options = ScanBuilder::new(dir.path())
            .extensions(vec![".rs".into()])
            .keyword("TODO")
            .build();
        let settings = Settings::from_options(&options, OutputChoice::Json);
        save_settings(&path, &settings).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"outputChoice\": \"json\""));
        assert!(text.contains("\"excludeGitignore\": true"));
        assert_eq!(load_settings(&path).unwrap(), settings);
    }

    #[test]
    fn save_into_a_file_path_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let err = save_settings(&blocker.join("cfg.json"), &Settings::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigSaveFailed);
    }

    #[test]
    fn builder_follows_settings() {
        let settings = Settings {
            keyword: "x".into(),
            exclude_gitignore: false,
            output_choice: OutputChoice::Md,
            ..Settings::default()
        };
        let options = settings.to_builder().build();
        assert!(!options.use_ignore_file);
        assert_eq!(options.filter.keyword.as_deref(), Some("x"));
        assert_eq!(options.highlight, HighlightStyle::Markers);
        assert_eq!(OutputChoice::Terminal.format(), OutputFormat::Markdown);
    }
}
