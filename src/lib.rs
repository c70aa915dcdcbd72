//! CSS Inspector - stylesheet extraction and syntax validation
//!
//! Architecture: the library interface is the application layer
//! - `extract` answers questions about a single stylesheet
//! - `analyzer` and `report` run those checks over files and render results
//! - `CssValidator` wires configuration, analysis and reporting together

pub mod analyzer;
pub mod config;
pub mod domain;
pub mod extract;
pub mod parser;
pub mod patterns;
pub mod report;

// Re-export main types for convenient access
pub use domain::diagnostics::{
    CssError, CssResult, Diagnostic, DiagnosticCounts, Severity, ValidationReport,
    ValidationSummary,
};

pub use domain::projections::{
    Animation, AnimationMap, ColorMap, DeclarationMap, FontDeclaration, FontMap, MediaQueryMap,
    MediaRule, PropertyMap,
};

pub use config::{CheckRule, ConfigBuilder, InspectorConfig};

pub use analyzer::{AnalysisOptions, Analyzer, CheckStats};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use extract::{
    extract_animations, extract_colors, extract_fonts, extract_media_queries,
    extract_selectors_by_property, extract_unused_selectors, validate_css,
};

use std::path::Path;

/// High-level entry point for checking stylesheets on disk
pub struct CssValidator {
    analyzer: Analyzer,
    report_formatter: ReportFormatter,
}

impl CssValidator {
    /// Create a new validator with the given configuration
    pub fn new_with_config(config: InspectorConfig) -> CssResult<Self> {
        config.validate()?;
        let analyzer = Analyzer::new(config)?;

        Ok(Self { analyzer, report_formatter: ReportFormatter::default() })
    }

    /// Create a validator with default configuration
    pub fn new() -> CssResult<Self> {
        Self::new_with_config(InspectorConfig::default())
    }

    /// Create a validator loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> CssResult<Self> {
        let config = InspectorConfig::load_from_file(path)?;
        Self::new_with_config(config)
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    /// Validate a single stylesheet
    pub fn validate_file<P: AsRef<Path>>(&self, file_path: P) -> CssResult<ValidationReport> {
        let diagnostics = self.analyzer.analyze_file(file_path)?;

        let mut report = ValidationReport::new();
        for diagnostic in diagnostics {
            report.add_diagnostic(diagnostic);
        }
        report.set_files_analyzed(1);
        report.set_config_fingerprint(self.analyzer.config_fingerprint());

        Ok(report)
    }

    /// Validate a mix of files and directories
    pub fn validate_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> CssResult<ValidationReport> {
        self.analyzer.analyze_paths(paths, options)
    }

    /// Validate entire directory tree
    pub fn validate_directory<P: AsRef<Path>>(
        &self,
        root: P,
        options: &AnalysisOptions,
    ) -> CssResult<ValidationReport> {
        self.analyzer.analyze_directory(root, options)
    }

    /// Format a validation report for output
    pub fn format_report(
        &self,
        report: &ValidationReport,
        format: OutputFormat,
    ) -> CssResult<String> {
        self.report_formatter.format_report(report, format)
    }

    /// Get statistics about the configured checks
    pub fn check_statistics(&self) -> CheckStats {
        self.analyzer.check_stats()
    }
}

/// Convenience function to validate a directory with default settings
pub fn validate_directory<P: AsRef<Path>>(directory: P) -> CssResult<ValidationReport> {
    let validator = CssValidator::new()?;
    validator.validate_directory(directory, &AnalysisOptions::default())
}
