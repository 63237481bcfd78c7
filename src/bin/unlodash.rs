#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use unlodash::cli::args::{CliArgs, OutputFormat};
use unlodash::cli::driver;
use unlodash::cli::reporter::Reporter;

/// No findings left.
const EXIT_SUCCESS: i32 = 0;
/// Findings remain (after fixing, when `--fix` was given).
const EXIT_FINDINGS: i32 = 1;
/// Usage, configuration, I/O or parse failure.
const EXIT_FAILURE: i32 = 2;

fn main() {
    // Initialize tracing if UNLODASH_LOG or RUST_LOG is set (zero cost otherwise).
    unlodash::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            EXIT_FAILURE
        }
    };
    std::process::exit(code);
}

fn run(args: &CliArgs) -> Result<i32> {
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let result = driver::run(args, &cwd)?;
    let summary = result.summary();

    let color = match args.format {
        OutputFormat::Text => args
            .pretty
            .unwrap_or_else(|| std::io::stdout().is_terminal()),
        OutputFormat::Json => std::io::stderr().is_terminal(),
    };
    let mut reporter = Reporter::new(color);

    match args.format {
        OutputFormat::Text => {
            let output = reporter.render_reports(&result.files, !args.quiet);
            if !output.is_empty() {
                println!("{output}\n");
            }
            println!("{}", reporter.format_summary(&summary));
        }
        OutputFormat::Json => {
            // Errors go to stderr so stdout stays valid JSON.
            let errors = reporter.render_reports(&result.files, false);
            if !errors.is_empty() {
                eprintln!("{errors}");
            }
            let findings = reporter.json_findings(&result.files);
            let json = if args.pretty.unwrap_or(false) {
                serde_json::to_string_pretty(&findings)
            } else {
                serde_json::to_string(&findings)
            }
            .context("failed to serialize findings")?;
            println!("{json}");
        }
    }

    Ok(if summary.files_with_errors > 0 {
        EXIT_FAILURE
    } else if summary.findings > 0 {
        EXIT_FINDINGS
    } else {
        EXIT_SUCCESS
    })
}
