use colored::Colorize;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::path::Path;
use unlodash_common::{Diagnostic, DiagnosticCategory, LineMap};

use super::driver::{FileReport, RunSummary};

/// One finding in `--format json` output. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonFinding {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub disposition: &'static str,
    pub message_id: &'static str,
    pub message: String,
    pub fixable: bool,
}

pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, String>,
    line_maps: FxHashMap<String, LineMap>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            sources: FxHashMap::default(),
            line_maps: FxHashMap::default(),
        }
    }

    /// Register the text diagnostics for `file` refer to. Files that were
    /// never registered are read from disk on demand.
    pub fn add_source(&mut self, file: &str, text: impl Into<String>) {
        self.line_maps.remove(file);
        self.sources.insert(file.to_string(), text.into());
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    /// Errors first, then findings, for every file in order.
    pub fn render_reports(&mut self, reports: &[FileReport], include_findings: bool) -> String {
        let mut diagnostics = Vec::new();
        for report in reports {
            self.add_source(&report.display, report.text.as_str());
            diagnostics.extend(report.diagnostics.iter().cloned());
            if include_findings {
                diagnostics.extend(report.lint.finding_diagnostics(&report.display));
            }
        }
        self.render(&diagnostics)
    }

    pub fn json_findings(&mut self, reports: &[FileReport]) -> Vec<JsonFinding> {
        let mut out = Vec::new();
        for report in reports {
            self.add_source(&report.display, report.text.as_str());
            for finding in &report.lint.findings {
                let (line, column) = self
                    .position_for(&report.display, finding.range.start)
                    .unwrap_or((1, 1));
                let (end_line, end_column) = self
                    .position_for(&report.display, finding.range.end)
                    .unwrap_or((line, column));
                out.push(JsonFinding {
                    file: report.display.clone(),
                    line,
                    column,
                    end_line,
                    end_column,
                    disposition: finding.disposition.as_str(),
                    message_id: finding.message_kind.id(),
                    message: finding.message.clone(),
                    fixable: finding.is_fixable(),
                });
            }
        }
        out
    }

    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let location = self.format_location(&diagnostic.file, diagnostic.start);
        let category = self.format_category(diagnostic.category);
        let code = self.format_code(diagnostic.code);

        let mut output = String::new();
        if let Some(location) = location {
            output.push_str(&location);
        } else if !diagnostic.file.is_empty() {
            output.push_str(&diagnostic.file);
        } else {
            output.push_str("<unknown>");
        }

        output.push_str(" - ");
        output.push_str(&category);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }

        output
    }

    /// Source line with the span underlined; multi-line spans are underlined
    /// to the end of their first line.
    ///
    ///   3   const r = _.map(getItems(), f);
    ///                 ~~~~~~~~~~~~~~~~~~~~
    fn format_snippet(&mut self, file: &str, start: u32, length: u32) -> Option<String> {
        if file.is_empty() || length == 0 {
            return None;
        }

        let (line_num, column) = self.position_for(file, start)?;
        let source = self.sources.get(file)?;
        let line_map = self.line_maps.get(file)?;
        let line_text = line_map.line_text(line_num - 1, source)?;

        let end = line_map.offset_to_position(start + length, source);
        let end_column = if end.line + 1 == line_num {
            end.character + 1
        } else {
            line_text.chars().count() as u32 + 1
        };

        let mut underline = String::new();
        let mut col = 1u32;
        for ch in line_text.chars() {
            if col >= end_column {
                break;
            }
            let width = if ch == '\t' { 4 } else { 1 };
            let mark = if col < column { ' ' } else { '~' };
            for _ in 0..width {
                underline.push(mark);
            }
            col += 1;
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let mut snippet = String::new();
        snippet.push('\n');
        snippet.push_str(&format!("  {:>3}   {}", line_num, line_text.replace('\t', "    ")));
        snippet.push('\n');

        let underline_display = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        snippet.push_str(&format!("        {}", underline_display));

        Some(snippet)
    }

    pub fn format_summary(&self, summary: &RunSummary) -> String {
        let mut parts = Vec::new();
        if summary.fixed > 0 {
            parts.push(format!(
                "Fixed {} in {}.",
                plural(summary.fixed, "call site"),
                plural(summary.files_changed, "file")
            ));
        }
        if summary.findings > 0 {
            parts.push(format!(
                "Found {} ({} fixable) in {}.",
                plural(summary.findings, "problem"),
                summary.fixable,
                plural(summary.files_with_findings, "file")
            ));
        } else if summary.fixed == 0 && summary.files_with_errors == 0 {
            parts.push(format!(
                "No problems found in {}.",
                plural(summary.files, "file")
            ));
        }
        if summary.files_with_errors > 0 {
            let text = format!(
                "{} could not be processed.",
                plural(summary.files_with_errors, "file")
            );
            parts.push(if self.color {
                text.red().bold().to_string()
            } else {
                text
            });
        }
        parts.join(" ")
    }

    fn format_location(&mut self, file: &str, offset: u32) -> Option<String> {
        if file.is_empty() {
            return None;
        }

        let (line, column) = self.position_for(file, offset)?;
        Some(format!("{}:{}:{}", file, line, column))
    }

    fn position_for(&mut self, file: &str, offset: u32) -> Option<(u32, u32)> {
        self.ensure_source(file)?;
        if !self.line_maps.contains_key(file) {
            let source = self.sources.get(file)?;
            let map = LineMap::build(source);
            self.line_maps.insert(file.to_string(), map);
        }

        let source = self.sources.get(file)?;
        let line_map = self.line_maps.get(file)?;
        let position = line_map.offset_to_position(offset, source);
        Some((position.line + 1, position.character + 1))
    }

    fn ensure_source(&mut self, file: &str) -> Option<()> {
        if !self.sources.contains_key(file) {
            let contents = std::fs::read_to_string(Path::new(file)).ok()?;
            self.sources.insert(file.to_string(), contents);
        }
        Some(())
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = category.as_str();

        if !self.color {
            return label.to_string();
        }

        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }

        let label = format!("UL{:03}", code);
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
