//! Report generation with multiple output formats
//!
//! CDD Principle: Anti-Corruption Layer - Formatters translate domain objects to external formats
//! - ValidationReport (domain) is converted to various external representations
//! - Each formatter encapsulates the rules for its specific output format
//! - Domain logic remains pure while supporting multiple presentation needs

use crate::domain::{CssError, CssResult, Diagnostic, Severity, ValidationReport};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Supported output formats for validation reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format with colors and context
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// GitHub Actions workflow commands
    GitHub,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "github" => Some(Self::GitHub),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "github"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to show the offending source line
    pub show_context: bool,
    /// Whether to show suggested fixes
    pub show_suggestions: bool,
    /// Maximum number of diagnostics to include
    pub max_diagnostics: Option<usize>,
    /// Minimum severity level to include
    pub min_severity: Option<Severity>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_context: true,
            show_suggestions: true,
            max_diagnostics: None,
            min_severity: None,
        }
    }
}

/// Main report formatter that dispatches to specific formatters
pub struct ReportFormatter {
    options: ReportOptions,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a validation report in the specified format
    pub fn format_report(
        &self,
        report: &ValidationReport,
        format: OutputFormat,
    ) -> CssResult<String> {
        let diagnostics = self.filter_diagnostics(&report.diagnostics);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &diagnostics)),
            OutputFormat::Json => self.format_json(report, &diagnostics),
            OutputFormat::GitHub => Ok(self.format_github(&diagnostics)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &ValidationReport,
        format: OutputFormat,
        mut writer: W,
    ) -> CssResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// Filter diagnostics based on report options
    fn filter_diagnostics<'a>(&self, diagnostics: &'a [Diagnostic]) -> Vec<&'a Diagnostic> {
        let mut filtered: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| self.options.min_severity.map_or(true, |min| d.severity >= min))
            .collect();

        if let Some(max) = self.options.max_diagnostics {
            filtered.truncate(max);
        }

        filtered
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.options.use_colors {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Format report in human-readable format
    fn format_human(&self, report: &ValidationReport, diagnostics: &[&Diagnostic]) -> String {
        let mut output = String::new();

        if diagnostics.is_empty() {
            output.push_str(&format!("✅ {}\n", self.paint("32", "No stylesheet problems found")));
        } else {
            let (icon, color) = if report.has_errors() { ("❌", "31") } else { ("⚠️", "33") };
            output.push_str(&format!("{} {}\n\n", icon, self.paint(color, "Stylesheet Problems Found")));

            let mut by_file: BTreeMap<&Path, Vec<&Diagnostic>> = BTreeMap::new();
            for diagnostic in diagnostics {
                by_file.entry(&diagnostic.file_path).or_default().push(diagnostic);
            }

            for (file_path, file_diagnostics) in by_file {
                output.push_str(&format!("📁 {}\n", file_path.display()));

                for diagnostic in file_diagnostics {
                    let severity_color = match diagnostic.severity {
                        Severity::Error => "31",
                        Severity::Warning => "33",
                        Severity::Info => "36",
                    };

                    let position = match (diagnostic.line_number, diagnostic.column_number) {
                        (Some(line), Some(col)) => format!("{line}:{col}"),
                        (Some(line), None) => line.to_string(),
                        _ => "?".to_string(),
                    };

                    output.push_str(&format!(
                        "  {} [{}] {}\n",
                        self.paint("2", &format!("{}:{}", position, diagnostic.check_id)),
                        self.paint(severity_color, diagnostic.severity.as_str()),
                        diagnostic.message
                    ));

                    if self.options.show_context {
                        if let Some(context) = &diagnostic.context {
                            output.push_str(&format!("    {}\n", self.paint("2", &format!("│ {context}"))));
                        }
                    }

                    if self.options.show_suggestions {
                        if let Some(suggestion) = &diagnostic.suggested_fix {
                            output.push_str(&format!("    {}\n", self.paint("32", &format!("💡 {suggestion}"))));
                        }
                    }

                    output.push('\n');
                }
            }
        }

        output.push_str(&self.format_summary(report));
        output
    }

    /// Format report in JSON format
    fn format_json(
        &self,
        report: &ValidationReport,
        diagnostics: &[&Diagnostic],
    ) -> CssResult<String> {
        let json_diagnostics: Vec<JsonValue> = diagnostics
            .iter()
            .map(|d| {
                serde_json::json!({
                    "check_id": d.check_id,
                    "severity": d.severity.as_str(),
                    "file_path": d.file_path.display().to_string(),
                    "line_number": d.line_number,
                    "column_number": d.column_number,
                    "message": d.message,
                    "context": d.context,
                    "suggested_fix": d.suggested_fix,
                    "detected_at": d.detected_at.to_rfc3339()
                })
            })
            .collect();

        let counts = &report.summary.diagnostics_by_severity;
        let json_report = serde_json::json!({
            "diagnostics": json_diagnostics,
            "summary": {
                "total_files": report.summary.total_files,
                "diagnostics_by_severity": {
                    "error": counts.error,
                    "warning": counts.warning,
                    "info": counts.info
                },
                "execution_time_ms": report.summary.execution_time_ms,
                "validated_at": report.summary.validated_at.to_rfc3339()
            },
            "config_fingerprint": report.config_fingerprint
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| CssError::config(format!("JSON serialization failed: {e}")))
    }

    /// Format report for GitHub Actions
    fn format_github(&self, diagnostics: &[&Diagnostic]) -> String {
        let mut output = String::new();

        for diagnostic in diagnostics {
            let level = match diagnostic.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "notice",
            };

            let position = match (diagnostic.line_number, diagnostic.column_number) {
                (Some(line), Some(col)) => format!(",line={line},col={col}"),
                (Some(line), None) => format!(",line={line}"),
                _ => String::new(),
            };

            output.push_str(&format!(
                "::{} file={},title={}{}::{}\n",
                level,
                diagnostic.file_path.display(),
                diagnostic.check_id,
                position,
                diagnostic.message
            ));
        }

        output
    }

    /// Format the summary section
    fn format_summary(&self, report: &ValidationReport) -> String {
        let counts = &report.summary.diagnostics_by_severity;
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        let mut summary = format!("📊 {} ", self.paint("1", "Summary:"));

        if counts.total() == 0 {
            summary.push_str(&format!(
                "{} in {} files ({:.1}s)\n",
                self.paint("32", "0 problems"),
                report.summary.total_files,
                execution_time
            ));
            return summary;
        }

        let mut parts = Vec::new();
        if counts.error > 0 {
            let plural = if counts.error == 1 { "" } else { "s" };
            parts.push(self.paint("31", &format!("{} error{}", counts.error, plural)));
        }
        if counts.warning > 0 {
            let plural = if counts.warning == 1 { "" } else { "s" };
            parts.push(self.paint("33", &format!("{} warning{}", counts.warning, plural)));
        }
        if counts.info > 0 {
            parts.push(self.paint("36", &format!("{} info", counts.info)));
        }

        summary.push_str(&format!(
            "{} in {} files ({:.1}s)\n",
            parts.join(", "),
            report.summary.total_files,
            execution_time
        ));
        summary
    }
}
