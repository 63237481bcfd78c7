use clap::Parser;
use std::path::Path;
use tempfile::TempDir;

use super::args::CliArgs;
use super::config::{
    CONFIG_FILE_NAME, DEFAULT_EXTENSIONS, DEFAULT_IGNORE, FileConfig, parse_config,
    resolve_config,
};

fn args(extra: &[&str]) -> CliArgs {
    let mut argv = vec!["unlodash"];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).expect("args should parse")
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("failed to write test file");
}

#[test]
fn parses_all_keys() {
    let config = parse_config(
        r#"{
            "aliasName": "lodash",
            "mapMethodName": "collect",
            "nativeMethodName": "map",
            "extensions": ["js", "jsx"],
            "ignore": ["dist/**"]
        }"#,
    )
    .unwrap();

    assert_eq!(config.alias_name.as_deref(), Some("lodash"));
    assert_eq!(config.map_method_name.as_deref(), Some("collect"));
    assert_eq!(config.native_method_name.as_deref(), Some("map"));
    assert_eq!(
        config.extensions,
        Some(vec!["js".to_string(), "jsx".to_string()])
    );
    assert_eq!(config.ignore, Some(vec!["dist/**".to_string()]));
}

#[test]
fn empty_object_is_all_defaults() {
    assert_eq!(parse_config("{}").unwrap(), FileConfig::default());
}

#[test]
fn rejects_unknown_keys_and_bad_json() {
    assert!(parse_config(r#"{ "alias": "lodash" }"#).is_err());
    assert!(parse_config("{ aliasName: ").is_err());
}

#[test]
fn defaults_without_config_file() {
    let dir = TempDir::new().unwrap();
    let resolved = resolve_config(&args(&[]), dir.path()).unwrap();

    assert_eq!(resolved.rule, unlodash_rules::RuleConfig::default());
    assert_eq!(resolved.extensions, DEFAULT_EXTENSIONS);
    assert_eq!(resolved.ignore, DEFAULT_IGNORE);
    assert!(resolved.config_path.is_none());
}

#[test]
fn picks_up_config_from_working_directory() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        CONFIG_FILE_NAME,
        r#"{ "aliasName": "lodash", "extensions": [".js"] }"#,
    );

    let resolved = resolve_config(&args(&[]), dir.path()).unwrap();
    assert_eq!(resolved.rule.alias_name, "lodash");
    assert_eq!(resolved.rule.map_method_name, "map");
    assert_eq!(resolved.extensions, vec!["js".to_string()]);
    assert_eq!(
        resolved.config_path.as_deref(),
        Some(dir.path().join(CONFIG_FILE_NAME).as_path())
    );
}

#[test]
fn cli_flags_override_config_file() {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "custom.json",
        r#"{ "aliasName": "lodash", "mapMethodName": "collect", "ignore": ["a/**"] }"#,
    );

    let resolved = resolve_config(
        &args(&["--config", "custom.json", "--alias", "lo", "--ignore", "b/**"]),
        dir.path(),
    )
    .unwrap();
    assert_eq!(resolved.rule.alias_name, "lo");
    assert_eq!(resolved.rule.map_method_name, "collect");
    assert_eq!(resolved.ignore, vec!["b/**".to_string()]);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = resolve_config(&args(&["--config", "nope.json"]), dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to read config"));
}

#[test]
fn rejects_names_that_are_not_identifiers() {
    let dir = TempDir::new().unwrap();
    for flags in [
        &["--alias", "lo-dash"][..],
        &["--alias", ""][..],
        &["--alias", "this"][..],
        &["--method", "1map"][..],
        &["--native", "map()"][..],
    ] {
        assert!(
            resolve_config(&args(flags), dir.path()).is_err(),
            "{flags:?}"
        );
    }
    assert!(resolve_config(&args(&["--alias", "$"]), dir.path()).is_ok());
}

#[test]
fn rejects_empty_extension_list() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), CONFIG_FILE_NAME, r#"{ "extensions": [] }"#);
    assert!(resolve_config(&args(&[]), dir.path()).is_err());
}
