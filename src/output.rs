//! Output sinks and the report layout written through them.
//!
//! A scan writes its report line by line into an [`OutputSink`]. Markdown and
//! plain text are streamed as the scan progresses; JSON is buffered and
//! written as a single document once the scan is finalized.

use crate::error::{ErrorKind, TreecatError};
use crate::extract::FileReadResult;
use crate::stats::ScanStatistics;
use crate::tree::TreeNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

const SEPARATOR_WIDTH: usize = 60;

/// Destination of report lines.
pub trait OutputSink {
    /// Writes `line` followed by a newline.
    fn write(&mut self, line: &str) -> Result<(), TreecatError>;
    /// Flushes and closes the destination.
    fn end(&mut self) -> Result<(), TreecatError>;
}

/// Writes to standard output.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn write(&mut self, line: &str) -> Result<(), TreecatError> {
        writeln!(io::stdout().lock(), "{line}").map_err(|e| TreecatError::output("stdout", e))
    }

    fn end(&mut self) -> Result<(), TreecatError> {
        io::stdout()
            .flush()
            .map_err(|e| TreecatError::output("stdout", e))
    }
}

/// Buffered writes to a file.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Creates (or truncates) `path`, creating missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`TreecatError::Output`] if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, TreecatError> {
        let path = path.into();
        let target = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| TreecatError::output(&target, e))?;
        }
        let file = File::create(&path).map_err(|e| TreecatError::output(&target, e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for FileSink {
    fn write(&mut self, line: &str) -> Result<(), TreecatError> {
        writeln!(self.writer, "{line}")
            .map_err(|e| TreecatError::output(self.path.display().to_string(), e))
    }

    fn end(&mut self) -> Result<(), TreecatError> {
        self.writer
            .flush()
            .map_err(|e| TreecatError::output(self.path.display().to_string(), e))
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
    ended: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// All lines joined with `\n`.
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }
}

impl OutputSink for MemorySink {
    fn write(&mut self, line: &str) -> Result<(), TreecatError> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<(), TreecatError> {
        self.ended = true;
        Ok(())
    }
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Markdown,
    Text,
    Json,
}

impl OutputFormat {
    /// Returns the conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Machine-readable form of a finished scan.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub tree: String,
    pub structure: Option<TreeNode>,
    pub files: Vec<FileReport>,
    pub statistics: Option<ScanStatistics>,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub is_binary: bool,
    pub keyword_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FileError>,
}

#[derive(Debug, Serialize)]
pub struct FileError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&FileReadResult> for FileReport {
    fn from(result: &FileReadResult) -> Self {
        match &result.outcome {
            Ok(content) => FileReport {
                path: result.path.clone(),
                content: Some(content.text.clone()),
                size: Some(content.size),
                is_binary: content.is_binary,
                keyword_matches: content.keyword_matches,
                error: None,
            },
            Err(e) => FileReport {
                path: result.path.clone(),
                content: None,
                size: None,
                is_binary: false,
                keyword_matches: 0,
                error: Some(FileError {
                    kind: e.kind(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

/// Lays out report sections in the chosen format.
pub struct ReportWriter<'a> {
    format: OutputFormat,
    sink: &'a mut dyn OutputSink,
    json: Option<ScanReport>,
}

impl<'a> ReportWriter<'a> {
    pub fn new(format: OutputFormat, sink: &'a mut dyn OutputSink) -> Self {
        Self {
            format,
            sink,
            json: None,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn header(&mut self, root: &Path, started_at: DateTime<Utc>) -> Result<(), TreecatError> {
        match self.format {
            OutputFormat::Markdown => {
                self.line(&format!("# Treecat Scan Report - {}", started_at.to_rfc3339()))?;
                self.line(&format!("# Target: {}", root.display()))?;
                self.line("")
            }
            OutputFormat::Text => {
                self.line(&format!("Treecat Scan Report - {}", started_at.to_rfc3339()))?;
                self.line(&format!("Target: {}", root.display()))?;
                self.line("")
            }
            OutputFormat::Json => {
                self.json = Some(ScanReport {
                    root: root.to_path_buf(),
                    generated_at: started_at,
                    tree: String::new(),
                    structure: None,
                    files: Vec::new(),
                    statistics: None,
                });
                Ok(())
            }
        }
    }

    /// Root name, then one line per descendant.
    pub fn tree(&mut self, tree: &TreeNode) -> Result<(), TreecatError> {
        match self.format {
            OutputFormat::Markdown => {
                self.line("## Directory Structure")?;
                self.line("")?;
                self.line("```")?;
                self.line(tree.name())?;
                for line in tree.render() {
                    self.line(&line)?;
                }
                self.line("```")?;
                self.line("")
            }
            OutputFormat::Text => {
                self.line("Directory Tree:")?;
                self.line(tree.name())?;
                for line in tree.render() {
                    self.line(&line)?;
                }
                self.line("")
            }
            OutputFormat::Json => {
                if let Some(report) = self.json.as_mut() {
                    report.tree = tree.to_tree_string();
                    report.structure = Some(tree.clone());
                }
                Ok(())
            }
        }
    }

    pub fn contents_heading(&mut self) -> Result<(), TreecatError> {
        match self.format {
            OutputFormat::Markdown => {
                self.line("## File Contents")?;
                self.line("")
            }
            OutputFormat::Text => self.line("Files:"),
            OutputFormat::Json => Ok(()),
        }
    }

    pub fn no_files(&mut self) -> Result<(), TreecatError> {
        match self.format {
            OutputFormat::Markdown | OutputFormat::Text => {
                self.line("No matching files found")?;
                self.line("")
            }
            OutputFormat::Json => Ok(()),
        }
    }

    /// One file section. Failures are written inline with an `[ERROR]` marker.
    pub fn file(&mut self, result: &FileReadResult) -> Result<(), TreecatError> {
        let path = result.path.display().to_string();
        match (self.format, &result.outcome) {
            (OutputFormat::Markdown, Ok(content)) => {
                let ext = result.path.extension().and_then(|e| e.to_str()).unwrap_or("");
                self.line(&format!("### {path}"))?;
                self.line("")?;
                self.line(&format!("```{}", language_from_extension(ext)))?;
                self.line(trim_newline(&content.text))?;
                self.line("```")?;
                self.line("")
            }
            (OutputFormat::Markdown, Err(e)) => {
                self.line(&format!("### {path}"))?;
                self.line("")?;
                self.line(&format!("[ERROR] {path}"))?;
                self.line(&format!("{} ({})", e, e.kind()))?;
                self.line("")
            }
            (OutputFormat::Text, Ok(content)) => {
                self.line("")?;
                self.line(&path)?;
                self.line(&"-".repeat(path.chars().count()))?;
                self.line(trim_newline(&content.text))?;
                self.line(&"=".repeat(SEPARATOR_WIDTH))
            }
            (OutputFormat::Text, Err(e)) => {
                self.line("")?;
                self.line(&format!("[ERROR] {path}"))?;
                self.line(&format!("{} ({})", e, e.kind()))?;
                self.line(&"=".repeat(SEPARATOR_WIDTH))
            }
            (OutputFormat::Json, _) => {
                if let Some(report) = self.json.as_mut() {
                    report.files.push(FileReport::from(result));
                }
                Ok(())
            }
        }
    }

    pub fn statistics(&mut self, stats: &ScanStatistics) -> Result<(), TreecatError> {
        match self.format {
            OutputFormat::Markdown => {
                self.line("")?;
                self.line("## Scan Statistics")?;
                self.line("")?;
                self.line("```")?;
                for line in stats.summary_lines() {
                    self.line(&line)?;
                }
                self.line("```")
            }
            OutputFormat::Text => {
                self.line("")?;
                self.line("Scan Statistics:")?;
                for line in stats.summary_lines() {
                    self.line(&line)?;
                }
                Ok(())
            }
            OutputFormat::Json => {
                if let Some(report) = self.json.as_mut() {
                    report.statistics = Some(stats.clone());
                }
                Ok(())
            }
        }
    }

    /// Writes any buffered document and closes the sink.
    pub fn finish(mut self) -> Result<(), TreecatError> {
        if let Some(report) = self.json.take() {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| TreecatError::output("json report", io::Error::other(e)))?;
            self.sink.write(&json)?;
        }
        self.sink.end()
    }

    /// Closes the sink without writing anything that is still buffered.
    pub fn abandon(mut self) -> Result<(), TreecatError> {
        self.sink.end()
    }

    fn line(&mut self, line: &str) -> Result<(), TreecatError> {
        self.sink.write(line)
    }
}

/// Writes `treecat-errors-<timestamp>.log` into `dir`, one record per line.
///
/// # Errors
///
/// Returns [`TreecatError::Output`] if the directory or file cannot be written.
pub fn write_error_log(dir: &Path, stats: &ScanStatistics) -> Result<PathBuf, TreecatError> {
    let path = dir.join(format!("treecat-errors-{}.log", file_timestamp(Utc::now())));
    let body = stats
        .errors
        .iter()
        .map(|e| e.log_line())
        .collect::<Vec<_>>()
        .join("\n");
    fs::create_dir_all(dir).map_err(|e| TreecatError::output(dir.display().to_string(), e))?;
    fs::write(&path, body).map_err(|e| TreecatError::output(path.display().to_string(), e))?;
    Ok(path)
}

/// Timestamp safe for use in file names.
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d-%H%M%S").to_string()
}

fn trim_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

fn language_from_extension(ext: &str) -> &'static str {
    match ext {
        "rs" => "rust", "toml" => "toml", "json" => "json", "md" | "markdown" => "markdown",
        "txt" => "text", "html" | "htm" => "html", "css" => "css", "js" | "mjs" => "javascript",
        "ts" => "typescript", "py" => "python", "sh" | "bash" => "bash", "yml" | "yaml" => "yaml",
        "xml" => "xml", "c" => "c", "cpp" | "cc" | "cxx" => "cpp", "h" => "c", "hpp" => "cpp",
        "go" => "go", "rb" => "ruby", "php" => "php", "swift" => "swift",
        "kt" | "kts" => "kotlin", "scala" => "scala", "dart" => "dart",
        _ => "",
    }
}
