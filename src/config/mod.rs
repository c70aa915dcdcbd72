//! Configuration loading and management for CSS Inspector
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain objects
//! - Default configurations are embedded in the domain, not infrastructure
//! - Configuration acts as a repository for check settings and path filters

use crate::domain::{CssError, CssResult, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Every check the analyzer can report
pub const CHECK_IDS: &[&str] =
    &["unbalanced_braces", "parse_error", "missing_semicolon", "decode_error", "unused_selector"];

/// File names picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILES: &[&str] =
    &["css_inspector.yaml", "css_inspector.yml", ".css_inspector.yaml"];

/// Main configuration structure for CSS Inspector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectorConfig {
    /// Configuration format version
    pub version: String,
    /// Path filtering configuration
    pub paths: PathConfig,
    /// Check settings keyed by check id
    #[serde(default = "default_checks")]
    pub checks: BTreeMap<String, CheckRule>,
}

/// Path filtering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Include/exclude patterns (gitignore-style)
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Optional .cssignore file name
    pub ignore_file: Option<String>,
    /// Extensions of files treated as stylesheets
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Settings for one check
#[derive(Debug, Clone, Serialize, Deserialize, Hash)]
pub struct CheckRule {
    /// What the check looks for
    pub description: String,
    /// Severity of diagnostics produced by this check
    pub severity: Severity,
    /// Whether this check is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl CheckRule {
    pub fn new(description: impl Into<String>, severity: Severity) -> Self {
        Self { description: description.into(), severity, enabled: true }
    }
}

impl InspectorConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CssResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            CssError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            CssError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> CssResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| CssError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// First of [`DEFAULT_CONFIG_FILES`] present in `dir`
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES.iter().map(|name| dir.as_ref().join(name)).find(|path| path.is_file())
    }

    /// Get default configuration with every check enabled
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathConfig {
                patterns: vec![
                    // Default exclusions
                    "**/node_modules/".to_string(),
                    "**/.git/".to_string(),
                    "**/*.min.css".to_string(),
                ],
                ignore_file: Some(".cssignore".to_string()),
                extensions: default_extensions(),
            },
            checks: default_checks(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> CssResult<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(CssError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        if self.paths.extensions.is_empty() {
            return Err(CssError::config("At least one stylesheet extension is required"));
        }

        for id in self.checks.keys() {
            if !CHECK_IDS.contains(&id.as_str()) {
                return Err(CssError::config(format!(
                    "Unknown check '{}'. Known checks: {}",
                    id,
                    CHECK_IDS.join(", ")
                )));
            }
        }

        for pattern in &self.paths.patterns {
            glob::Pattern::new(pattern.trim_start_matches('!').trim_matches('/')).map_err(|e| {
                CssError::config(format!("Invalid path pattern '{pattern}': {e}"))
            })?;
        }

        Ok(())
    }

    /// Severity to report for a check, `None` when the check is disabled.
    /// Checks missing from the configuration use their built-in default.
    pub fn severity_for(&self, check_id: &str) -> Option<Severity> {
        match self.checks.get(check_id) {
            Some(rule) if rule.enabled => Some(rule.severity),
            Some(_) => None,
            None => default_checks().get(check_id).map(|rule| rule.severity),
        }
    }

    /// Whether a check should run
    pub fn is_enabled(&self, check_id: &str) -> bool {
        self.severity_for(check_id).is_some()
    }

    /// All enabled checks in id order
    pub fn enabled_checks(&self) -> impl Iterator<Item = (&String, &CheckRule)> {
        self.checks.iter().filter(|(_, rule)| rule.enabled)
    }

    /// Stable fingerprint of the settings that affect a check run
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        self.version.hash(&mut hasher);
        self.paths.patterns.hash(&mut hasher);
        self.paths.ignore_file.hash(&mut hasher);
        self.paths.extensions.hash(&mut hasher);

        // BTreeMap iteration is already ordered
        for (id, rule) in &self.checks {
            id.hash(&mut hasher);
            rule.hash(&mut hasher);
        }

        format!("{:x}", hasher.finish())
    }
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["css".to_string()]
}

fn default_checks() -> BTreeMap<String, CheckRule> {
    [
        (
            "unbalanced_braces",
            CheckRule::new("Number of '{' differs from number of '}'", Severity::Error),
        ),
        ("parse_error", CheckRule::new("The CSS parser rejected a rule or declaration", Severity::Error)),
        (
            "missing_semicolon",
            CheckRule::new("A declaration line appears to lack its terminating ';'", Severity::Error),
        ),
        ("decode_error", CheckRule::new("The file is not valid UTF-8", Severity::Error)),
        (
            "unused_selector",
            CheckRule::new(
                "A class or id selector never appears in the configured HTML document",
                Severity::Info,
            ),
        ),
    ]
    .into_iter()
    .map(|(id, rule)| (id.to_string(), rule))
    .collect()
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: InspectorConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: InspectorConfig::default() }
    }

    /// Add a path pattern
    pub fn add_path_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.paths.patterns.push(pattern.into());
        self
    }

    /// Set the ignore file name
    pub fn ignore_file(mut self, filename: impl Into<String>) -> Self {
        self.config.paths.ignore_file = Some(filename.into());
        self
    }

    /// Treat files with this extension as stylesheets too
    pub fn add_extension(mut self, extension: impl Into<String>) -> Self {
        self.config.paths.extensions.push(extension.into());
        self
    }

    /// Replace the settings of one check
    pub fn check(mut self, id: impl Into<String>, rule: CheckRule) -> Self {
        self.config.checks.insert(id.into(), rule);
        self
    }

    /// Turn a check off
    pub fn disable_check(mut self, id: &str) -> Self {
        if let Some(rule) = self.config.checks.get_mut(id) {
            rule.enabled = false;
        }
        self
    }

    /// Build the final configuration
    pub fn build(self) -> CssResult<InspectorConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
