use std::fs;
use std::path::Path;
use tempfile::tempdir;
use treecat::{
    ErrorKind, HighlightStyle, MemorySink, OutputFormat, ScanBuilder, ScanOptions, ScanPhase,
    run_scan,
};

fn fixture(root: &Path) {
    fs::write(root.join("a.txt"), "alpha TODO\n").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub/b.txt"), "todo beta todo").unwrap();
    fs::write(root.join("sub/c.txt"), "gamma").unwrap();
}

fn options(root: &Path) -> ScanBuilder {
    ScanBuilder::new(root)
        .sort_entries(true)
        .highlight(HighlightStyle::Markers)
}

fn scan(options: &ScanOptions, format: OutputFormat) -> (treecat::ScanOutcome, MemorySink) {
    let mut sink = MemorySink::new();
    let outcome = run_scan(options, format, &mut sink);
    (outcome, sink)
}

#[test]
fn integration_markdown_report() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let opts = options(dir.path()).keyword("todo").build();
    let (outcome, sink) = scan(&opts, OutputFormat::Markdown);

    assert!(outcome.success);
    assert_eq!(outcome.phase, ScanPhase::Done);
    assert_eq!(outcome.stats.directories_scanned, 1);
    assert_eq!(outcome.stats.files_processed, 3);
    assert_eq!(outcome.stats.files_matched, 3);
    assert_eq!(outcome.stats.matches_found, 3);
    assert_eq!(outcome.stats.error_count(), 0);
    assert!(sink.is_ended());

    let root_name = dir.path().file_name().unwrap().to_string_lossy().into_owned();
    let lines = sink.lines();
    assert!(lines[0].starts_with("# Treecat Scan Report - "));
    let tree_start = lines.iter().position(|l| *l == root_name).unwrap();
    assert_eq!(
        &lines[tree_start..tree_start + 6],
        [
            root_name.as_str(),
            "├── a.txt",
            "└── sub",
            "    ├── b.txt",
            "    └── c.txt",
            "```",
        ]
    );
    let report = sink.contents();
    assert!(report.contains("## File Contents"));
    assert!(report.contains(">>todo<< beta >>todo<<"));
    assert!(report.contains("Keyword matches:     3"));
}

#[test]
fn integration_rendering_is_deterministic_when_sorted() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let opts = options(dir.path()).build();
    let (_, first) = scan(&opts, OutputFormat::Text);
    let (_, second) = scan(&opts, OutputFormat::Text);
    let strip = |sink: &MemorySink| -> Vec<String> {
        sink.lines()
            .iter()
            .filter(|l| !l.starts_with("Treecat Scan Report") && !l.starts_with("Processing time"))
            .cloned()
            .collect()
    };
    assert_eq!(strip(&first), strip(&second));
}

#[test]
fn integration_gitignore_excludes() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fixture(root);
    fs::create_dir_all(root.join("target/debug")).unwrap();
    fs::write(root.join("target/debug/out.txt"), "built").unwrap();
    fs::write(root.join("run.log"), "log").unwrap();
    fs::write(root.join(".gitignore"), "# build\ntarget\n*.log\n.gitignore\n").unwrap();

    let (outcome, _) = scan(&options(root).build(), OutputFormat::Text);
    assert!(outcome.success);
    assert_eq!(outcome.matched_files.len(), 3);
    assert!(outcome.matched_files.iter().all(|p| !p.starts_with(root.join("target"))));

    let (outcome, _) = scan(&options(root).use_ignore_file(false).build(), OutputFormat::Text);
    assert_eq!(outcome.matched_files.len(), 6);
}

#[test]
fn integration_extension_and_pattern_filters() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fixture(root);
    fs::write(root.join("main.rs"), "fn main() {}").unwrap();

    let opts = options(root).extensions(vec![".txt".into()]).patterns(vec!["[ab]*".into()]).build();
    let (outcome, _) = scan(&opts, OutputFormat::Markdown);
    assert_eq!(outcome.matched_files, vec![root.join("a.txt"), root.join("sub/b.txt")]);
    assert_eq!(outcome.stats.files_processed, 4);
}

#[test]
fn integration_local_errors_do_not_stop_the_scan() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("src");
    fs::create_dir(&root).unwrap();
    fixture(&root);
    fs::write(root.join("big.txt"), "B".repeat(2048)).unwrap();
    let logs = dir.path().join("logs");

    let opts = options(&root)
        .max_file_size(1024)
        .error_log_dir(Some(logs.clone()))
        .build();
    let (outcome, sink) = scan(&opts, OutputFormat::Text);

    assert!(outcome.success);
    assert_eq!(outcome.stats.files_matched, 4);
    assert_eq!(outcome.stats.error_count(), 1);
    assert_eq!(outcome.stats.errors[0].kind, ErrorKind::FileTooLarge);
    let report = sink.contents();
    assert!(report.contains(&format!("[ERROR] {}", root.join("big.txt").display())));
    assert!(!report.contains("BBBB"));
    assert!(report.contains("gamma"));
    assert!(report.contains("Errors encountered:  1"));

    let log = outcome.error_log.expect("error log written");
    assert!(log.starts_with(&logs));
    assert!(fs::read_to_string(log).unwrap().contains("big.txt"));
}

#[test]
fn integration_missing_root_is_fatal_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("missing");
    let (outcome, sink) = scan(&options(&root).build(), OutputFormat::Markdown);

    assert!(!outcome.success);
    assert_eq!(outcome.phase, ScanPhase::Failed);
    let err = outcome.error.expect("fatal error");
    assert_eq!(err.kind(), ErrorKind::DirectoryScanFailed);
    assert_eq!(err.path(), Some(root.as_path()));
    assert!(sink.lines().is_empty());
    assert!(sink.is_ended());
}

#[test]
fn integration_unreadable_ignore_file_is_fatal() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    fs::create_dir(dir.path().join(".gitignore")).unwrap();
    let (outcome, sink) = scan(&options(dir.path()).build(), OutputFormat::Markdown);
    assert!(!outcome.success);
    assert_eq!(outcome.error.unwrap().kind(), ErrorKind::IgnoreFileUnreadable);
    assert!(sink.lines().is_empty());
}

#[test]
fn integration_invalid_pattern_is_fatal() {
    let dir = tempdir().unwrap();
    let opts = options(dir.path()).patterns(vec!["[oops".into()]).build();
    let (outcome, _) = scan(&opts, OutputFormat::Markdown);
    assert_eq!(outcome.error.unwrap().kind(), ErrorKind::InvalidPattern);
}

#[test]
fn integration_no_matches() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let opts = options(dir.path()).extensions(vec![".rs".into()]).build();
    let (outcome, sink) = scan(&opts, OutputFormat::Markdown);
    assert!(outcome.success);
    assert!(outcome.matched_files.is_empty());
    assert!(sink.lines().iter().any(|l| l == "No matching files found"));
    assert!(!sink.lines().iter().any(|l| l == "## File Contents"));
}

#[test]
fn integration_json_report() {
    let dir = tempdir().unwrap();
    fixture(dir.path());
    let (outcome, sink) = scan(&options(dir.path()).keyword("TODO").build(), OutputFormat::Json);
    assert!(outcome.success);
    assert_eq!(sink.lines().len(), 1);

    let doc: serde_json::Value = serde_json::from_str(&sink.lines()[0]).unwrap();
    assert_eq!(doc["files"].as_array().unwrap().len(), 3);
    assert_eq!(doc["statistics"]["matches_found"], 3);
    assert_eq!(doc["structure"]["children"][1]["name"], "sub");
    assert!(doc["tree"].as_str().unwrap().ends_with("└── c.txt"));
}
