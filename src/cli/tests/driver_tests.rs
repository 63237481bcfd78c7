use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::args::CliArgs;
use super::config::resolve_config;
use super::driver::{discover_files, run};

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["unlodash"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("args should parse")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create test dir");
    }
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

fn relative_names(files: &[PathBuf], root: &Path) -> Vec<String> {
    files
        .iter()
        .map(|f| {
            f.strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn discovery_filters_extensions_and_ignores() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(root, "a.js", "");
    write_file(root, "b.mjs", "");
    write_file(root, "c.cjs", "");
    write_file(root, "d.ts", "");
    write_file(root, "src/e.js", "");
    write_file(root, "node_modules/lodash/index.js", "");
    write_file(root, "src/node_modules/f.js", "");

    let config = resolve_config(&args(&[]), root).unwrap();
    let files = discover_files(&[PathBuf::from(".")], root, &config).unwrap();
    assert_eq!(
        relative_names(&files, root),
        vec!["a.js", "b.mjs", "c.cjs", "src/e.js"]
    );
}

#[test]
fn discovery_honours_configured_globs_and_extensions() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(root, "src/app.jsx", "");
    write_file(root, "src/app.js", "");
    write_file(root, "dist/bundle.js", "");

    let config =
        resolve_config(&args(&["--ext", "js,.jsx", "--ignore", "dist/**"]), root).unwrap();
    let files = discover_files(&[PathBuf::from(".")], root, &config).unwrap();
    assert_eq!(relative_names(&files, root), vec!["src/app.js", "src/app.jsx"]);
}

#[test]
fn explicit_files_are_always_included_once() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(root, "script.ts", "");
    write_file(root, "lib/a.js", "");

    let config = resolve_config(&args(&[]), root).unwrap();
    let files = discover_files(
        &[
            PathBuf::from("script.ts"),
            PathBuf::from("lib"),
            PathBuf::from("lib/a.js"),
        ],
        root,
        &config,
    )
    .unwrap();
    assert_eq!(relative_names(&files, root), vec!["lib/a.js", "script.ts"]);
}

#[test]
fn missing_path_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = resolve_config(&args(&[]), dir.path()).unwrap();
    let err = discover_files(&[PathBuf::from("missing")], dir.path(), &config).unwrap_err();
    assert!(err.to_string().contains("path not found"));
}

#[test]
fn invalid_ignore_glob_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = resolve_config(&args(&["--ignore", "a/[b"]), dir.path()).unwrap();
    assert!(discover_files(&[PathBuf::from(".")], dir.path(), &config).is_err());
}

#[test]
fn lint_run_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let source = "const r = _.map([1, 2, 3], fn);\n";
    let path = write_file(root, "a.js", source);
    write_file(root, "b.js", "const r = xs.map(fn);\n");

    let result = run(&args(&[]), root).unwrap();
    let summary = result.summary();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.findings, 1);
    assert_eq!(summary.fixable, 1);
    assert_eq!(summary.files_with_findings, 1);
    assert_eq!(summary.fixed, 0);
    assert_eq!(std::fs::read_to_string(path).unwrap(), source);

    let report = &result.files[0];
    assert_eq!(report.display, "a.js");
    assert!(!report.written);
}

#[test]
fn fix_run_rewrites_files_in_place() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let path = write_file(root, "src/app.js", "const r = _.map(getItems(), x => x * 2);\n");

    let result = run(&args(&["--fix", "src"]), root).unwrap();
    let summary = result.summary();
    assert_eq!(summary.fixed, 1);
    assert_eq!(summary.files_changed, 1);
    assert_eq!(summary.findings, 0);

    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        "const collection = getItems();\nconst callback = x => x * 2;\n\
         const r = Array.isArray(collection) ? collection.map(callback) : _.map(collection, callback);\n"
    );
}

#[test]
fn fix_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let path = write_file(root, "a.js", "foo(_.map(col, fn).map(g));\n");

    run(&args(&["--fix"]), root).unwrap();
    let once = std::fs::read_to_string(&path).unwrap();
    let second = run(&args(&["--fix"]), root).unwrap();
    assert_eq!(second.summary().fixed, 0);
    assert!(!second.files[0].written);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), once);
}

#[test]
fn parse_failures_are_reported_and_left_alone() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let source = "const r = _.map([1], fn;\n";
    let path = write_file(root, "broken.js", source);

    let result = run(&args(&["--fix"]), root).unwrap();
    let summary = result.summary();
    assert_eq!(summary.files_with_errors, 1);
    assert_eq!(summary.fixed, 0);
    assert!(!result.files[0].diagnostics.is_empty());
    assert_eq!(result.files[0].diagnostics[0].file, "broken.js");
    assert_eq!(std::fs::read_to_string(path).unwrap(), source);
}

#[test]
fn configured_alias_applies_to_the_run() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write_file(root, "unlodash.json", r#"{ "aliasName": "lodash" }"#);
    write_file(root, "a.js", "lodash.map([1], f);\n_.map([2], g);\n");

    let result = run(&args(&[]), root).unwrap();
    assert_eq!(result.config.rule.alias_name, "lodash");
    assert_eq!(result.summary().findings, 1);
}
