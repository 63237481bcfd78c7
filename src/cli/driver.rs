//! File discovery and the per-file lint/fix loop.

use anyhow::{Context, Result, bail};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use unlodash_common::Diagnostic;
use unlodash_rules::RuleConfig;
use walkdir::WalkDir;

use super::args::CliArgs;
use super::config::{ResolvedConfig, resolve_config};
use crate::{LintResult, fix_source, lint_source};

/// Stack size for worker threads. Deeply nested sources recurse far in the
/// parser and binder.
const WORKER_STACK_SIZE: usize = 32 * 1024 * 1024;

/// What happened to one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// Path as shown in reports (relative to the working directory when
    /// possible).
    pub display: String,
    /// Text after fixing, or the original text.
    pub text: String,
    /// Findings left after fixing (all findings without `--fix`).
    pub lint: LintResult,
    /// Parse and I/O errors.
    pub diagnostics: Vec<Diagnostic>,
    /// Fixes applied to the file.
    pub fixed: usize,
    /// Whether the fixed text was written back.
    pub written: bool,
}

impl FileReport {
    fn failed(path: &Path, display: String, message: String) -> Self {
        FileReport {
            diagnostics: vec![Diagnostic::error(display.clone(), 0, 0, message, 0)],
            path: path.to_path_buf(),
            display,
            text: String::new(),
            lint: LintResult::default(),
            fixed: 0,
            written: false,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files: usize,
    pub files_with_findings: usize,
    pub files_with_errors: usize,
    pub files_changed: usize,
    pub findings: usize,
    pub fixable: usize,
    pub fixed: usize,
}

#[derive(Debug, Clone)]
pub struct RunResult {
    pub config: ResolvedConfig,
    pub files: Vec<FileReport>,
}

impl RunResult {
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            files: self.files.len(),
            ..RunSummary::default()
        };
        for report in &self.files {
            let findings = report.lint.findings.len();
            summary.findings += findings;
            summary.fixable += report.lint.fixable_count();
            summary.fixed += report.fixed;
            if findings > 0 {
                summary.files_with_findings += 1;
            }
            if report.has_errors() {
                summary.files_with_errors += 1;
            }
            if report.written {
                summary.files_changed += 1;
            }
        }
        summary
    }
}

/// Resolve configuration, discover files and process them in parallel.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<RunResult> {
    let config = resolve_config(args, cwd)?;
    let roots = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths.clone()
    };
    let files = discover_files(&roots, cwd, &config)?;
    info!(files = files.len(), fix = args.fix, "discovered source files");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .stack_size(WORKER_STACK_SIZE)
        .build()
        .context("failed to build worker pool")?;

    let rule = &config.rule;
    let fix = args.fix;
    let reports: Vec<FileReport> = pool.install(|| {
        files
            .par_iter()
            .map(|path| process_file(path, display_path(path, cwd), rule, fix))
            .collect()
    });

    Ok(RunResult {
        config,
        files: reports,
    })
}

/// Lint one file, and with `fix` rewrite it in place.
pub fn process_file(path: &Path, display: String, rule: &RuleConfig, fix: bool) -> FileReport {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read source file");
            return FileReport::failed(path, display, format!("failed to read file: {err}"));
        }
    };

    if !fix {
        let lint = lint_source(&display, &text, rule);
        return FileReport {
            path: path.to_path_buf(),
            diagnostics: lint.diagnostics.clone(),
            display,
            text,
            lint,
            fixed: 0,
            written: false,
        };
    }

    let result = fix_source(&display, &text, rule);
    let mut written = false;
    if result.changed() {
        if let Err(err) = std::fs::write(path, &result.text) {
            warn!(path = %path.display(), %err, "failed to write fixed file");
            return FileReport::failed(path, display, format!("failed to write file: {err}"));
        }
        debug!(
            path = %path.display(),
            fixed = result.applied,
            passes = result.passes,
            "wrote fixed file"
        );
        written = true;
    }

    FileReport {
        path: path.to_path_buf(),
        diagnostics: result.remaining.diagnostics.clone(),
        display,
        text: result.text,
        lint: result.remaining,
        fixed: result.applied,
        written,
    }
}

/// Collect the files under `roots`, sorted and deduplicated.
///
/// Directories are walked and filtered by extension and ignore globs.
/// Files named explicitly are always included.
pub fn discover_files(
    roots: &[PathBuf],
    cwd: &Path,
    config: &ResolvedConfig,
) -> Result<Vec<PathBuf>> {
    let ignore = build_globset(&config.ignore)?;
    let mut files = Vec::new();

    for root in roots {
        let root = cwd.join(root);
        if root.is_file() {
            files.push(root);
            continue;
        }
        if !root.is_dir() {
            bail!("path not found: {}", root.display());
        }

        for entry in WalkDir::new(&root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let has_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.extensions.iter().any(|e| e == ext));
            if !has_extension {
                continue;
            }
            let relative = path.strip_prefix(cwd).unwrap_or(path);
            if ignore.is_match(relative) {
                debug!(path = %relative.display(), "ignored");
                continue;
            }
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("invalid ignore glob: {pattern}"))?;
        builder.add(glob);
    }
    builder.build().context("failed to build ignore globs")
}

fn display_path(path: &Path, cwd: &Path) -> String {
    let relative = path.strip_prefix(cwd).unwrap_or(path);
    let relative = relative.strip_prefix(".").unwrap_or(relative);
    relative.display().to_string()
}
