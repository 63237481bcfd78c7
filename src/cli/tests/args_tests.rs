use clap::Parser;
use std::path::PathBuf;

use super::args::{CliArgs, OutputFormat};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["unlodash"]).expect("default args should parse");

    assert!(args.paths.is_empty());
    assert!(!args.fix);
    assert!(args.alias.is_none());
    assert!(args.method.is_none());
    assert!(args.native.is_none());
    assert!(args.config.is_none());
    assert!(args.ext.is_none());
    assert!(args.ignore.is_none());
    assert_eq!(args.format, OutputFormat::Text);
    assert_eq!(args.pretty, None);
    assert!(!args.quiet);
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "unlodash",
        "--fix",
        "--alias",
        "lodash",
        "--method",
        "collect",
        "--native",
        "map",
        "--config",
        "configs/unlodash.json",
        "--format",
        "json",
        "--quiet",
        "-j",
        "4",
        "src",
        "lib/index.js",
    ])
    .expect("flagged args should parse");

    assert!(args.fix);
    assert_eq!(args.alias.as_deref(), Some("lodash"));
    assert_eq!(args.method.as_deref(), Some("collect"));
    assert_eq!(args.native.as_deref(), Some("map"));
    assert_eq!(
        args.config.as_deref(),
        Some(std::path::Path::new("configs/unlodash.json"))
    );
    assert_eq!(args.format, OutputFormat::Json);
    assert!(args.quiet);
    assert_eq!(args.jobs, Some(4));
    assert_eq!(
        args.paths,
        vec![PathBuf::from("src"), PathBuf::from("lib/index.js")]
    );
}

#[test]
fn list_flags_split_on_commas() {
    let args = CliArgs::try_parse_from([
        "unlodash",
        "--ext",
        "js,jsx",
        "--ignore",
        "dist/**,**/vendor/**",
    ])
    .unwrap();

    assert_eq!(args.ext, Some(vec!["js".to_string(), "jsx".to_string()]));
    assert_eq!(
        args.ignore,
        Some(vec!["dist/**".to_string(), "**/vendor/**".to_string()])
    );
}

#[test]
fn pretty_takes_an_optional_value() {
    let args = CliArgs::try_parse_from(["unlodash", "--pretty", "src"]).unwrap();
    assert_eq!(args.pretty, Some(true));
    assert_eq!(args.paths, vec![PathBuf::from("src")]);

    let args = CliArgs::try_parse_from(["unlodash", "--pretty=false"]).unwrap();
    assert_eq!(args.pretty, Some(false));
}

#[test]
fn rejects_unknown_format() {
    assert!(CliArgs::try_parse_from(["unlodash", "--format", "xml"]).is_err());
}
