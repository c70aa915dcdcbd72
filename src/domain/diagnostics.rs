//! Diagnostics, validation reports and the crate error type
//!
//! Architecture: Rich Domain Models - Diagnostics are entities with behavior, not just data
//! - A CssError knows which check it belongs to and where in the source it points
//! - ValidationReport acts as an aggregate root managing collections of diagnostics
//! - Extraction failures and batch findings share one error taxonomy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity levels for stylesheet diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational findings such as unused selectors
    Info,
    /// Problems that should be addressed but don't fail a check run
    Warning,
    /// Syntax problems that fail a check run
    Error,
}

impl Severity {
    /// Whether this severity level should cause validation to fail
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Error)
    }

    /// Convert to string for display
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A problem found in a stylesheet during a batch check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Identifier of the check that produced this diagnostic
    pub check_id: String,
    /// Severity level of this diagnostic
    pub severity: Severity,
    /// Stylesheet the diagnostic refers to
    pub file_path: PathBuf,
    /// Line number (1-indexed) of the offending source line
    pub line_number: Option<u32>,
    /// Column number (1-indexed) where the problem starts
    pub column_number: Option<u32>,
    /// Human-readable description
    pub message: String,
    /// Offending source text
    pub context: Option<String>,
    /// Suggested fix (if available)
    pub suggested_fix: Option<String>,
    /// When this diagnostic was produced
    pub detected_at: DateTime<Utc>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(
        check_id: impl Into<String>,
        severity: Severity,
        file_path: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            severity,
            file_path,
            line_number: None,
            column_number: None,
            message: message.into(),
            context: None,
            suggested_fix: None,
            detected_at: Utc::now(),
        }
    }

    /// Set the line, leaving the column unknown
    pub fn with_line(mut self, line: u32) -> Self {
        self.line_number = Some(line);
        self
    }

    /// Set line and column position
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line_number = Some(line);
        self.column_number = Some(column);
        self
    }

    /// Add source context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggested_fix = Some(suggestion.into());
        self
    }

    /// Whether this diagnostic fails a check run
    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }

    /// Format diagnostic for display
    pub fn format_display(&self) -> String {
        let location = match (self.line_number, self.column_number) {
            (Some(line), Some(col)) => format!(":{line}:{col}"),
            (Some(line), None) => format!(":{line}"),
            _ => String::new(),
        };

        format!(
            "{}{} [{}] {}",
            self.file_path.display(),
            location,
            self.severity.as_str(),
            self.message
        )
    }
}

/// Summary statistics for a validation report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Total number of stylesheets checked
    pub total_files: usize,
    /// Number of diagnostics by severity level
    pub diagnostics_by_severity: DiagnosticCounts,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when validation was performed
    pub validated_at: DateTime<Utc>,
}

/// Count of diagnostics by severity level
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl DiagnosticCounts {
    /// Total number of diagnostics across all severities
    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }

    /// Whether there are any blocking diagnostics
    pub fn has_blocking(&self) -> bool {
        self.error > 0
    }

    /// Add a diagnostic to the counts
    pub fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

/// Complete validation report containing all diagnostics and metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// All diagnostics found during validation
    pub diagnostics: Vec<Diagnostic>,
    /// Summary statistics
    pub summary: ValidationSummary,
    /// Fingerprint of the configuration used for this validation
    pub config_fingerprint: Option<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
            summary: ValidationSummary { validated_at: Utc::now(), ..Default::default() },
            config_fingerprint: None,
        }
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.summary.diagnostics_by_severity.add(diagnostic.severity);
        self.diagnostics.push(diagnostic);
    }

    /// Whether the report contains any diagnostics
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Whether the report contains blocking diagnostics (errors)
    pub fn has_errors(&self) -> bool {
        self.summary.diagnostics_by_severity.has_blocking()
    }

    /// Get diagnostics of a specific severity
    pub fn diagnostics_by_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity == severity)
    }

    /// Set the number of stylesheets checked
    pub fn set_files_analyzed(&mut self, count: usize) {
        self.summary.total_files = count;
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Set the configuration fingerprint
    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }

    /// Sort diagnostics by file path and line number for consistent output
    pub fn sort_diagnostics(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then_with(|| a.line_number.unwrap_or(0).cmp(&b.line_number.unwrap_or(0)))
                .then_with(|| b.severity.cmp(&a.severity))
        });
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by extraction, validation and the batch checker
#[derive(Debug, thiserror::Error)]
pub enum CssError {
    /// The raw text has a different number of `{` and `}`
    #[error("CSS syntax error: Unbalanced braces ({open} '{{' vs {close} '}}')")]
    UnbalancedBraces { open: usize, close: usize },

    /// The parser produced an error node
    #[error("CSS parse error{}: {message}", context_suffix(.context))]
    Parse { context: Option<String>, message: String, line: u32, column: u32 },

    /// A failure inside an at-rule body, re-wrapped with the at-rule it came from
    #[error("Error parsing {context} content: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<CssError>,
    },

    /// A declaration line that looks like it lacks its terminating semicolon
    #[error("CSS syntax error: Missing semicolon{} after '{line}'", line_suffix(.line_number))]
    MissingSemicolon { line: String, line_number: Option<usize> },

    /// Stylesheet bytes are not valid UTF-8
    #[error("Stylesheet is not valid UTF-8: {source}")]
    Decode {
        #[from]
        source: std::str::Utf8Error,
    },

    /// File could not be read or accessed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Path pattern compilation failed
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// Checking failed for a specific file
    #[error("Analysis error in {file}: {message}")]
    Analysis { file: String, message: String },
}

fn context_suffix(context: &Option<String>) -> String {
    context.as_ref().map(|c| format!(" {c}")).unwrap_or_default()
}

fn line_suffix(line_number: &Option<usize>) -> String {
    line_number.map(|n| format!(" at line {n}")).unwrap_or_default()
}

impl CssError {
    /// Create a parse error from a parser diagnostic
    pub fn parse(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::Parse { context: None, message: message.into(), line, column }
    }

    /// Attach a context such as "in declaration" to a parse error
    pub fn in_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::Parse { message, line, column, .. } => {
                Self::Parse { context: Some(context.into()), message, line, column }
            }
            other => other,
        }
    }

    /// Wrap a failure raised while reading an at-rule body
    pub fn nested(context: impl Into<String>, source: CssError) -> Self {
        Self::Nested { context: context.into(), source: Box::new(source) }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern { message: message.into() }
    }

    /// Create an analysis error
    pub fn analysis(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Analysis { file: file.into(), message: message.into() }
    }

    /// Whether this is a structural syntax error rather than a heuristic finding
    pub fn is_syntax_error(&self) -> bool {
        match self {
            Self::UnbalancedBraces { .. } | Self::Parse { .. } => true,
            Self::Nested { source, .. } => source.is_syntax_error(),
            _ => false,
        }
    }

    /// Identifier of the check this error belongs to
    pub fn check_id(&self) -> &'static str {
        match self {
            Self::UnbalancedBraces { .. } => "unbalanced_braces",
            Self::Parse { .. } => "parse_error",
            Self::Nested { source, .. } => source.check_id(),
            Self::MissingSemicolon { .. } => "missing_semicolon",
            Self::Decode { .. } => "decode_error",
            Self::Io { .. }
            | Self::Configuration { .. }
            | Self::Pattern { .. }
            | Self::Analysis { .. } => "internal",
        }
    }

    /// 1-based source line the error points at, when known
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Self::Parse { line, .. } => Some(*line),
            Self::Nested { source, .. } => source.line_number(),
            Self::MissingSemicolon { line_number, .. } => line_number.map(|n| n as u32),
            _ => None,
        }
    }
}

/// Result type for stylesheet operations
pub type CssResult<T> = Result<T, CssError>;
