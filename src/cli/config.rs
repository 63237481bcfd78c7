use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use unlodash_rules::RuleConfig;
use unlodash_scanner::keyword_kind;
use unlodash_scanner::scanner_impl::{is_identifier_part, is_identifier_start};

use super::args::CliArgs;

/// Config file picked up from the working directory when `--config` is not
/// given.
pub const CONFIG_FILE_NAME: &str = "unlodash.json";

pub const DEFAULT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];
pub const DEFAULT_IGNORE: &[&str] = &["**/node_modules/**"];

/// Contents of `unlodash.json`. Every key is optional.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub alias_name: Option<String>,
    #[serde(default)]
    pub map_method_name: Option<String>,
    #[serde(default)]
    pub native_method_name: Option<String>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub ignore: Option<Vec<String>>,
}

/// Effective settings: CLI flags over the config file over defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub rule: RuleConfig,
    /// Without the leading dot.
    pub extensions: Vec<String>,
    pub ignore: Vec<String>,
    /// The config file that was loaded, if any.
    pub config_path: Option<PathBuf>,
}

pub fn parse_config(source: &str) -> Result<FileConfig> {
    let config = serde_json::from_str(source).context("failed to parse config JSON")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<FileConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

pub(crate) fn find_config(cwd: &Path) -> Option<PathBuf> {
    let candidate = cwd.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

pub fn resolve_config(args: &CliArgs, cwd: &Path) -> Result<ResolvedConfig> {
    let config_path = match &args.config {
        Some(path) => Some(cwd.join(path)),
        None => find_config(cwd),
    };
    let file = match &config_path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_config(path)?
        }
        None => FileConfig::default(),
    };

    let defaults = RuleConfig::default();
    let rule = RuleConfig {
        alias_name: args
            .alias
            .clone()
            .or(file.alias_name)
            .unwrap_or(defaults.alias_name),
        map_method_name: args
            .method
            .clone()
            .or(file.map_method_name)
            .unwrap_or(defaults.map_method_name),
        native_method_name: args
            .native
            .clone()
            .or(file.native_method_name)
            .unwrap_or(defaults.native_method_name),
    };
    validate_rule_config(&rule)?;

    let extensions: Vec<String> = args
        .ext
        .clone()
        .or(file.extensions)
        .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect())
        .iter()
        .map(|ext| ext.trim().trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect();
    if extensions.is_empty() {
        bail!("no file extensions to process");
    }

    let ignore = args
        .ignore
        .clone()
        .or(file.ignore)
        .unwrap_or_else(|| DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect());

    Ok(ResolvedConfig {
        rule,
        extensions,
        ignore,
        config_path,
    })
}

fn validate_rule_config(rule: &RuleConfig) -> Result<()> {
    if !is_identifier_name(&rule.alias_name) || keyword_kind(&rule.alias_name).is_some() {
        bail!(
            "aliasName must be a JavaScript identifier, got {:?}",
            rule.alias_name
        );
    }
    for (key, value) in [
        ("mapMethodName", &rule.map_method_name),
        ("nativeMethodName", &rule.native_method_name),
    ] {
        if !is_identifier_name(value) {
            bail!("{key} must be a JavaScript identifier name, got {value:?}");
        }
    }
    Ok(())
}

fn is_identifier_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_part),
        None => false,
    }
}
