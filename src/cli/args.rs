use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the unlodash binary.
#[derive(Parser, Debug)]
#[command(
    name = "unlodash",
    version,
    about = "Replace lodash _.map calls with native Array.prototype.map"
)]
pub struct CliArgs {
    /// Files or directories to process. Defaults to the current directory.
    pub paths: Vec<PathBuf>,

    /// Write fixes back to the files, repeating until nothing more applies.
    #[arg(long)]
    pub fix: bool,

    // ==================== Rule Options ====================
    /// Identifier bound to the utility library.
    #[arg(long = "alias", value_name = "NAME")]
    pub alias: Option<String>,

    /// Method called on the alias.
    #[arg(long = "method", value_name = "NAME")]
    pub method: Option<String>,

    /// Native array method emitted in its place.
    #[arg(long = "native", value_name = "NAME")]
    pub native: Option<String>,

    /// Path to a JSON config file. `unlodash.json` in the current directory is
    /// used when present.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    // ==================== File Discovery ====================
    /// File extensions to process when walking directories.
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    pub ext: Option<Vec<String>>,

    /// Glob patterns of files to skip when walking directories.
    #[arg(long, value_delimiter = ',', value_name = "GLOB")]
    pub ignore: Option<Vec<String>>,

    /// Number of worker threads (defaults to the number of CPUs).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    // ==================== Output ====================
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Color text output, or indent JSON output. Text output is colored by
    /// default when stdout is a terminal.
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub pretty: Option<bool>,

    /// Text output: print only errors and the summary line.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
