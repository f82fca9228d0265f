//! Batch runner: collect `.rzn` files under a path and analyze each one.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::analysis::{Analyzer, Diagnostic};
use crate::config::Config;

/// Diagnostics for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }
}

/// A file that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Results of a batch run, sorted by path.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub files: Vec<FileReport>,
    pub skipped: Vec<SkippedFile>,
    /// Number of files analyzed
    pub scanned: usize,
}

impl CheckResult {
    pub fn error_count(&self) -> usize {
        self.files.iter().map(FileReport::error_count).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(FileReport::warning_count).sum()
    }

    /// Whether the run passes under `config`.
    pub fn passed(&self, config: &Config) -> bool {
        self.error_count() == 0 && !(config.fail_on_warnings && self.warning_count() > 0)
    }

    /// Reports that have at least one diagnostic.
    pub fn with_findings(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| !f.diagnostics.is_empty())
    }
}

/// Runs the analyzer over files selected by a [`Config`].
pub struct Runner<'r> {
    analyzer: Analyzer<'r>,
    config: Config,
}

impl Runner<'static> {
    pub fn new(config: Config) -> Self {
        Self::with_analyzer(Analyzer::default(), config)
    }
}

impl<'r> Runner<'r> {
    pub fn with_analyzer(analyzer: Analyzer<'r>, config: Config) -> Self {
        Self { analyzer, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Files to check under `root`. A file path is returned as-is; a
    /// directory is walked, skipping hidden directories and excluded paths.
    pub fn collect_files(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let metadata =
            fs::metadata(root).with_context(|| format!("cannot access {}", root.display()))?;
        if metadata.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let excluded = self.config.excluded_matcher()?;
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let name = e.file_name().to_string_lossy();
                if e.file_type().is_dir() && name.starts_with('.') {
                    return false;
                }
                let relative = e.path().strip_prefix(root).unwrap_or(e.path());
                !excluded.is_match(relative)
            })
        {
            let entry = entry?;
            if entry.file_type().is_file() && self.config.is_source_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        files.sort();
        tracing::debug!(root = %root.display(), files = files.len(), "collected files");
        Ok(files)
    }

    /// Analyze `files` in parallel. Unreadable files are reported as skipped.
    pub fn run(&self, files: &[PathBuf]) -> CheckResult {
        let outcomes: Vec<Result<FileReport, SkippedFile>> =
            files.par_iter().map(|path| self.check_file(path)).collect();

        let mut result = CheckResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(report) => {
                    result.scanned += 1;
                    result.files.push(report);
                }
                Err(skipped) => {
                    tracing::warn!(path = %skipped.path, reason = %skipped.reason, "skipping file");
                    result.skipped.push(skipped);
                }
            }
        }

        result.files.sort_by(|a, b| a.path.cmp(&b.path));
        result.skipped.sort_by(|a, b| a.path.cmp(&b.path));
        result
    }

    fn check_file(&self, path: &Path) -> Result<FileReport, SkippedFile> {
        let display = path.to_string_lossy().to_string();
        let text = fs::read_to_string(path).map_err(|e| SkippedFile {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        let analysis = self.analyzer.analyze(&display, &text);
        Ok(FileReport {
            path: display,
            diagnostics: analysis.diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_collect_files_respects_config() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "main.rzn", "let x = 1\n");
        write(temp.path(), "lib/util.rzn", "let y = 2\n");
        write(temp.path(), "build/gen.rzn", "let z = 3\n");
        write(temp.path(), ".hidden/skip.rzn", "let w = 4\n");
        write(temp.path(), "notes.txt", "let v = 5\n");

        let config = Config {
            excluded_paths: vec!["**/build/**".to_string()],
            ..Config::default()
        };
        let runner = Runner::new(config);
        let files = runner.collect_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["lib/util.rzn", "main.rzn"]);
    }

    #[test]
    fn test_collect_single_file() {
        let temp = TempDir::new().unwrap();
        let path = write(temp.path(), "one.txt", "");
        let files = Runner::new(Config::default()).collect_files(&path).unwrap();
        assert_eq!(files, vec![path]);
    }

    #[test]
    fn test_collect_missing_path_errors() {
        let temp = TempDir::new().unwrap();
        let runner = Runner::new(Config::default());
        assert!(runner.collect_files(&temp.path().join("missing")).is_err());
    }

    #[test]
    fn test_run_counts_and_pass() {
        let temp = TempDir::new().unwrap();
        let clean = write(temp.path(), "a.rzn", "let x = 5\nshow x\n");
        let warn = write(temp.path(), "b.rzn", "let x = \"hello\"\n");
        let err = write(temp.path(), "c.rzn", "mathlib::cube(3)\n");

        let runner = Runner::new(Config::default());
        let result = runner.run(&[err.clone(), clean.clone(), warn.clone()]);
        assert_eq!(result.scanned, 3);
        assert_eq!(result.files[0].path, clean.to_string_lossy());
        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.with_findings().count(), 2);
        assert!(!result.passed(&Config::default()));

        let result = runner.run(&[clean, warn]);
        assert!(result.passed(&Config::default()));
        let strict = Config {
            fail_on_warnings: true,
            ..Config::default()
        };
        assert!(!result.passed(&strict));
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let bad = temp.path().join("bad.rzn");
        fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();
        let result = Runner::new(Config::default()).run(&[bad]);
        assert_eq!(result.scanned, 0);
        assert_eq!(result.skipped.len(), 1);
    }
}
