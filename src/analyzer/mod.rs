//! Batch check orchestrator for CSS Inspector
//!
//! CDD Principle: Domain Services - Analyzer turns stylesheet files into validation reports
//! - Coordinates path filtering, syntax validation, and result aggregation
//! - Provides clean interface for checking single files or directory trees
//! - Handles parallel processing and error recovery gracefully

use crate::config::InspectorConfig;
use crate::domain::{CssError, CssResult, Diagnostic, Severity, ValidationReport};
use crate::extract::{extract_unused_selectors, validate_css};
use crate::patterns::PathFilter;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main analyzer that runs the configured checks over stylesheet files
pub struct Analyzer {
    /// Configuration for this analysis
    config: InspectorConfig,
    /// Path filter for determining which files to check
    path_filter: PathFilter,
}

/// Options for customizing analysis behavior
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Whether to use parallel processing
    pub parallel: bool,
    /// Maximum number of files to check
    pub max_files: Option<usize>,
    /// Whether to continue on unreadable files or fail fast
    pub fail_fast: bool,
    /// Additional paths to exclude (temporary)
    pub exclude_patterns: Vec<String>,
    /// Whether to ignore .cssignore files
    pub ignore_ignore_files: bool,
    /// HTML document to search for class and id selectors
    pub html: Option<String>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_files: None,
            fail_fast: false,
            exclude_patterns: Vec::new(),
            ignore_ignore_files: false,
            html: None,
        }
    }
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: InspectorConfig) -> CssResult<Self> {
        let ignore_file = if config.paths.ignore_file.as_deref() == Some("") {
            None
        } else {
            config.paths.ignore_file.clone()
        };

        let path_filter = PathFilter::new(config.paths.patterns.clone(), ignore_file)
            .map_err(|e| CssError::config(format!("Failed to create path filter: {e}")))?
            .with_extensions(config.paths.extensions.clone());

        Ok(Self { config, path_filter })
    }

    /// Create an analyzer with default configuration
    pub fn with_defaults() -> CssResult<Self> {
        Self::new(InspectorConfig::default())
    }

    /// Check a single stylesheet and return its diagnostics
    pub fn analyze_file<P: AsRef<Path>>(&self, file_path: P) -> CssResult<Vec<Diagnostic>> {
        self.check_file(file_path.as_ref(), None)
    }

    fn check_file(&self, file_path: &Path, html: Option<&str>) -> CssResult<Vec<Diagnostic>> {
        let bytes = fs::read(file_path).map_err(|e| {
            CssError::analysis(file_path.display().to_string(), format!("Failed to read file: {e}"))
        })?;

        let source = match validate_css(&bytes) {
            Ok(source) => source,
            Err(error) => {
                let source = String::from_utf8_lossy(&bytes);
                let diagnostic = self.diagnostic_for(file_path, &source, &error);
                match &diagnostic {
                    Some(diagnostic) => tracing::debug!("{}", diagnostic.format_display()),
                    None => tracing::debug!(
                        "{} failed disabled check {}: {}",
                        file_path.display(),
                        error.check_id(),
                        error
                    ),
                }
                return Ok(diagnostic.into_iter().collect());
            }
        };

        let mut diagnostics = Vec::new();

        if let (Some(html), Some(severity)) = (html, self.config.severity_for("unused_selector")) {
            for selector in extract_unused_selectors(&source, html)? {
                let mut diagnostic = Diagnostic::new(
                    "unused_selector",
                    severity,
                    file_path.to_path_buf(),
                    format!("Selector '{selector}' is not referenced by the HTML document"),
                )
                .with_suggestion("Remove the rule or add the class/id to the markup");

                if let Some((line, text)) = locate_line(&source, &selector) {
                    diagnostic = diagnostic.with_line(line).with_context(text);
                }
                diagnostics.push(diagnostic);
            }
        }

        Ok(diagnostics)
    }

    /// Turn a validation failure into a diagnostic, `None` when its check is disabled
    fn diagnostic_for(&self, file_path: &Path, source: &str, error: &CssError) -> Option<Diagnostic> {
        let check_id = error.check_id();
        let severity = self.config.severity_for(check_id)?;

        let mut diagnostic =
            Diagnostic::new(check_id, severity, file_path.to_path_buf(), error.to_string());

        let line = match error {
            CssError::Parse { line, column, .. } => {
                diagnostic = diagnostic.with_position(*line, *column);
                Some(*line)
            }
            CssError::MissingSemicolon { line, line_number: None } => {
                locate_line(source, line).map(|(number, _)| number)
            }
            other => other.line_number(),
        };

        if let Some(line) = line {
            if diagnostic.line_number.is_none() {
                diagnostic = diagnostic.with_line(line);
            }
            if let Some(text) = source.lines().nth(line.saturating_sub(1) as usize) {
                diagnostic = diagnostic.with_context(text.trim());
            }
        }

        if let Some(suggestion) = suggestion_for(check_id) {
            diagnostic = diagnostic.with_suggestion(suggestion);
        }

        Some(diagnostic)
    }

    /// Check multiple paths and return a complete validation report
    pub fn analyze_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        options: &AnalysisOptions,
    ) -> CssResult<ValidationReport> {
        let start_time = Instant::now();
        let mut report = ValidationReport::new();

        let mut path_filter = self.path_filter.clone();
        if options.ignore_ignore_files {
            path_filter = path_filter.without_ignore_files();
        }

        // Collect all files to check
        let mut files_to_analyze = Vec::new();

        for path in paths {
            let path = path.as_ref();

            if path.is_file() {
                files_to_analyze.push(path.to_path_buf());
            } else if path.is_dir() {
                files_to_analyze.extend(path_filter.find_files(path)?);
            } else {
                tracing::warn!("Skipping {}: not a file or directory", path.display());
            }
        }

        // Apply additional exclusions if specified
        if !options.exclude_patterns.is_empty() {
            for pattern in &options.exclude_patterns {
                path_filter.add_pattern(pattern.clone())?;
            }
            files_to_analyze = path_filter.filter_paths(&files_to_analyze)?;
        }

        if let Some(max_files) = options.max_files {
            files_to_analyze.truncate(max_files);
        }

        let total_files = files_to_analyze.len();
        tracing::debug!("Checking {} stylesheet(s)", total_files);

        let diagnostics = if options.parallel && files_to_analyze.len() > 1 {
            self.analyze_files_parallel(&files_to_analyze, options)?
        } else {
            self.analyze_files_sequential(&files_to_analyze, options)?
        };

        for diagnostic in diagnostics {
            report.add_diagnostic(diagnostic);
        }

        report.set_files_analyzed(total_files);
        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(self.config.fingerprint());
        report.sort_diagnostics();

        Ok(report)
    }

    /// Check files one after another
    fn analyze_files_sequential(
        &self,
        files: &[PathBuf],
        options: &AnalysisOptions,
    ) -> CssResult<Vec<Diagnostic>> {
        let mut all_diagnostics = Vec::new();

        for file_path in files {
            match self.check_file(file_path, options.html.as_deref()) {
                Ok(diagnostics) => all_diagnostics.extend(diagnostics),
                Err(e) => {
                    if options.fail_fast {
                        return Err(e);
                    }
                    tracing::warn!("Failed to analyze {}: {}", file_path.display(), e);
                }
            }
        }

        Ok(all_diagnostics)
    }

    /// Check files on the rayon pool; results are gathered in input order
    fn analyze_files_parallel(
        &self,
        files: &[PathBuf],
        options: &AnalysisOptions,
    ) -> CssResult<Vec<Diagnostic>> {
        let results: Vec<_> = files
            .par_iter()
            .map(|file_path| (file_path, self.check_file(file_path, options.html.as_deref())))
            .collect();

        let mut all_diagnostics = Vec::new();

        for (file_path, result) in results {
            match result {
                Ok(diagnostics) => all_diagnostics.extend(diagnostics),
                Err(e) => {
                    if options.fail_fast {
                        return Err(CssError::analysis(
                            file_path.display().to_string(),
                            e.to_string(),
                        ));
                    }
                    tracing::warn!("Failed to analyze {}: {}", file_path.display(), e);
                }
            }
        }

        Ok(all_diagnostics)
    }

    /// Check a directory tree and return a validation report
    pub fn analyze_directory<P: AsRef<Path>>(
        &self,
        root: P,
        options: &AnalysisOptions,
    ) -> CssResult<ValidationReport> {
        self.analyze_paths(&[root.as_ref()], options)
    }

    /// Get configuration fingerprint
    pub fn config_fingerprint(&self) -> String {
        self.config.fingerprint()
    }

    /// Get statistics about the configured checks
    pub fn check_stats(&self) -> CheckStats {
        let mut stats = CheckStats::default();

        for rule in self.config.checks.values() {
            if !rule.enabled {
                stats.disabled_checks += 1;
                continue;
            }

            stats.enabled_checks += 1;
            match rule.severity {
                Severity::Error => stats.error_checks += 1,
                Severity::Warning => stats.warning_checks += 1,
                Severity::Info => stats.info_checks += 1,
            }
        }

        stats
    }
}

/// Statistics about configured checks
#[derive(Debug, Default)]
pub struct CheckStats {
    pub enabled_checks: usize,
    pub disabled_checks: usize,
    pub error_checks: usize,
    pub warning_checks: usize,
    pub info_checks: usize,
}

impl CheckStats {
    pub fn total_checks(&self) -> usize {
        self.enabled_checks + self.disabled_checks
    }
}

/// First source line containing `needle`, 1-based, with its trimmed text
fn locate_line<'a>(source: &'a str, needle: &str) -> Option<(u32, &'a str)> {
    source
        .lines()
        .enumerate()
        .find(|(_, line)| line.contains(needle))
        .map(|(index, line)| (index as u32 + 1, line.trim()))
}

fn suggestion_for(check_id: &str) -> Option<&'static str> {
    match check_id {
        "unbalanced_braces" => Some("Close every '{' with a matching '}'"),
        "missing_semicolon" => Some("Terminate the declaration with ';'"),
        "decode_error" => Some("Save the stylesheet as UTF-8"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::domain::Severity;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_analyzer_creation() {
        let analyzer = Analyzer::with_defaults().unwrap();
        let stats = analyzer.check_stats();

        assert_eq!(stats.total_checks(), 5);
        assert_eq!(stats.error_checks, 4);
        assert_eq!(stats.info_checks, 1);
    }

    #[test]
    fn test_single_file_analysis() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let valid = temp_dir.path().join("valid.css");
        let broken = temp_dir.path().join("broken.css");

        fs::write(&valid, ".a {\n  color: red;\n}\n")?;
        fs::write(&broken, ".a {\n  color: red\n  margin: 0;\n}\n")?;

        let analyzer = Analyzer::with_defaults()?;
        assert!(analyzer.analyze_file(&valid)?.is_empty());

        let diagnostics = analyzer.analyze_file(&broken)?;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].check_id, "missing_semicolon");
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].line_number, Some(2));
        assert_eq!(diagnostics[0].context.as_deref(), Some("color: red"));

        Ok(())
    }

    #[test]
    fn test_decode_and_brace_errors() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let binary = temp_dir.path().join("binary.css");
        let open = temp_dir.path().join("open.css");

        fs::write(&binary, [0xff, 0xfe, 0x00])?;
        fs::write(&open, ".a {\n  color: red;\n")?;

        let analyzer = Analyzer::with_defaults()?;
        assert_eq!(analyzer.analyze_file(&binary)?[0].check_id, "decode_error");

        let diagnostics = analyzer.analyze_file(&open)?;
        assert_eq!(diagnostics[0].check_id, "unbalanced_braces");
        assert!(diagnostics[0].suggested_fix.is_some());

        Ok(())
    }

    #[test]
    fn test_parse_error_position() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("decl.css");
        fs::write(&file, ".a {\n  color: red;\n  width 10px;\n}\n")?;

        let diagnostics = Analyzer::with_defaults()?.analyze_file(&file)?;
        assert_eq!(diagnostics[0].check_id, "parse_error");
        assert_eq!(diagnostics[0].line_number, Some(3));
        assert_eq!(diagnostics[0].context.as_deref(), Some("width 10px;"));

        Ok(())
    }

    #[test]
    fn test_directory_analysis() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::create_dir_all(root.join("styles"))?;
        fs::create_dir_all(root.join("node_modules/lib"))?;

        fs::write(root.join("styles/site.css"), ".a {\n  color: red\n  margin: 0;\n}\n")?;
        fs::write(root.join("styles/ok.css"), ".b { color: blue; }\n")?;
        fs::write(root.join("styles/notes.txt"), "color: red\nmargin: 0\n")?;
        fs::write(root.join("node_modules/lib/x.css"), ".c {")?;

        let analyzer = Analyzer::with_defaults()?;
        let report = analyzer.analyze_directory(root, &AnalysisOptions::default())?;

        assert_eq!(report.summary.total_files, 2);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.has_errors());
        assert!(report.config_fingerprint.is_some());

        Ok(())
    }

    #[test]
    fn test_analysis_options() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::write(root.join("a.css"), ".a {}")?;
        fs::write(root.join("b.css"), ".b {}")?;
        fs::write(root.join("c.css"), ".c {")?;

        let analyzer = Analyzer::with_defaults()?;

        let options = AnalysisOptions { max_files: Some(1), ..Default::default() };
        let report = analyzer.analyze_directory(root, &options)?;
        assert_eq!(report.summary.total_files, 1);

        let options = AnalysisOptions {
            exclude_patterns: vec!["c.css".to_string()],
            parallel: false,
            ..Default::default()
        };
        let report = analyzer.analyze_directory(root, &options)?;
        assert_eq!(report.summary.total_files, 2);
        assert!(!report.has_diagnostics());

        Ok(())
    }

    #[test]
    fn test_unused_selectors_with_html() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let file = temp_dir.path().join("site.css");
        fs::write(&file, ".used { color: red; }\n.unused { color: blue; }\n")?;

        let options = AnalysisOptions {
            html: Some("<div class=\"used\"></div>".to_string()),
            ..Default::default()
        };

        let report = Analyzer::with_defaults()?.analyze_paths(&[&file], &options)?;
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].check_id, "unused_selector");
        assert_eq!(report.diagnostics[0].severity, Severity::Info);
        assert_eq!(report.diagnostics[0].line_number, Some(2));
        assert!(!report.has_errors());

        let quiet = ConfigBuilder::new().disable_check("unused_selector").build()?;
        let report = Analyzer::new(quiet)?.analyze_paths(&[&file], &options)?;
        assert!(!report.has_diagnostics());

        Ok(())
    }

    #[test]
    fn test_fail_fast_on_unreadable_file() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("missing.css");

        let analyzer = Analyzer::with_defaults()?;
        assert!(matches!(analyzer.analyze_file(&missing), Err(CssError::Analysis { .. })));

        Ok(())
    }
}
