//! Stylesheet discovery and path filtering using .gitignore-style patterns
//!
//! Architectural Principle: Service Layer - PathFilter decides which files a batch check reads
//! - Include/exclude globs are evaluated in order, last match wins
//! - .cssignore files are discovered by walking up from each candidate
//! - Only files with a stylesheet extension are considered

use crate::domain::{CssError, CssResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manages path filtering using .gitignore-style patterns
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// Include/exclude patterns
    patterns: Vec<FilterPattern>,
    /// Whether to process ignore files
    process_ignore_files: bool,
    /// Name of ignore files to process
    ignore_filename: String,
    /// File extensions (without the dot) treated as stylesheets
    extensions: Vec<String>,
}

/// A single path filter pattern
#[derive(Debug, Clone)]
struct FilterPattern {
    pattern: glob::Pattern,
    /// Pattern started with `!`
    is_include: bool,
    original: String,
}

impl FilterPattern {
    fn parse(raw: &str) -> Result<Self, glob::PatternError> {
        let (is_include, pattern_str) = match raw.strip_prefix('!') {
            Some(stripped) => (true, stripped),
            None => (false, raw),
        };

        Ok(Self {
            pattern: glob::Pattern::new(pattern_str)?,
            is_include,
            original: pattern_str.to_string(),
        })
    }
}

impl PathFilter {
    /// Create a new path filter with the given patterns
    pub fn new(patterns: Vec<String>, ignore_filename: Option<String>) -> CssResult<Self> {
        let mut filter_patterns = Vec::new();

        for pattern_str in patterns {
            let pattern = FilterPattern::parse(&pattern_str).map_err(|e| {
                CssError::pattern(format!("Invalid pattern '{pattern_str}': {e}"))
            })?;
            filter_patterns.push(pattern);
        }

        Ok(Self {
            patterns: filter_patterns,
            process_ignore_files: ignore_filename.is_some(),
            ignore_filename: ignore_filename.unwrap_or_else(|| ".cssignore".to_string()),
            extensions: vec!["css".to_string()],
        })
    }

    /// Create a default path filter with sensible exclusions
    pub fn with_defaults() -> CssResult<Self> {
        Self::new(
            vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
                "**/*.min.css".to_string(),
                "**/dist/**".to_string(),
                "**/build/**".to_string(),
            ],
            Some(".cssignore".to_string()),
        )
    }

    /// Replace the set of stylesheet extensions
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions =
            extensions.into_iter().map(|ext| ext.trim_start_matches('.').to_string()).collect();
        self
    }

    /// Stop reading ignore files
    pub fn without_ignore_files(mut self) -> Self {
        self.process_ignore_files = false;
        self
    }

    /// Whether the path carries one of the stylesheet extensions
    pub fn is_stylesheet<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Check if a file should be analyzed based on all patterns and ignore files
    pub fn should_analyze<P: AsRef<Path>>(&self, path: P) -> CssResult<bool> {
        let path = path.as_ref();

        let mut should_include = true;

        // Apply patterns in order (like .gitignore)
        for pattern in &self.patterns {
            if self.pattern_matches_path(pattern, path) {
                should_include = pattern.is_include;
            }
        }

        if !should_include {
            return Ok(false);
        }

        if self.process_ignore_files && self.is_ignored_by_files(path)? {
            return Ok(false);
        }

        Ok(true)
    }

    /// Check if path is ignored by ignore files in any ancestor directory
    fn is_ignored_by_files(&self, path: &Path) -> CssResult<bool> {
        let mut current_dir = path.parent();
        let mut is_ignored = false;

        while let Some(dir) = current_dir {
            let ignore_file = dir.join(&self.ignore_filename);

            if ignore_file.exists() {
                for pattern in self.load_ignore_file(&ignore_file)? {
                    if let Ok(relative_path) = path.strip_prefix(dir) {
                        if self.pattern_matches_path(&pattern, relative_path) {
                            is_ignored = !pattern.is_include;
                        }
                    }
                }
            }

            current_dir = dir.parent();
        }

        Ok(is_ignored)
    }

    /// Load patterns from an ignore file
    fn load_ignore_file(&self, path: &Path) -> CssResult<Vec<FilterPattern>> {
        let content = fs::read_to_string(path).map_err(|e| {
            CssError::config(format!("Failed to read ignore file '{}': {}", path.display(), e))
        })?;

        let mut patterns = Vec::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match FilterPattern::parse(line) {
                Ok(pattern) => patterns.push(pattern),
                Err(e) => {
                    tracing::warn!("Invalid pattern '{}' in {}: {}", line, path.display(), e);
                }
            }
        }

        Ok(patterns)
    }

    /// Get all stylesheets that should be analyzed in a directory tree
    pub fn find_files<P: AsRef<Path>>(&self, root: P) -> CssResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root.as_ref())
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() && self.is_stylesheet(path) && self.should_analyze(path)? {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Filter a list of paths to only those that should be analyzed
    pub fn filter_paths<P: AsRef<Path>>(&self, paths: &[P]) -> CssResult<Vec<PathBuf>> {
        let mut filtered = Vec::new();

        for path in paths {
            if self.should_analyze(path)? {
                filtered.push(path.as_ref().to_path_buf());
            }
        }

        Ok(filtered)
    }

    /// Add a pattern to the filter
    pub fn add_pattern(&mut self, pattern: String) -> CssResult<()> {
        let parsed = FilterPattern::parse(&pattern)
            .map_err(|e| CssError::pattern(format!("Invalid pattern '{pattern}': {e}")))?;
        self.patterns.push(parsed);
        Ok(())
    }

    /// Describe which patterns match a path, for `--verbose` output
    pub fn debug_patterns<P: AsRef<Path>>(&self, path: P) -> Vec<String> {
        let path = path.as_ref();

        self.patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let prefix = if pattern.is_include { "!" } else { "" };
                let verdict =
                    if self.pattern_matches_path(pattern, path) { "MATCH" } else { "no match" };
                format!("Pattern {}: {}{} -> {}", i, prefix, pattern.original, verdict)
            })
            .collect()
    }

    /// Check if a pattern matches a path using .gitignore-style rules
    fn pattern_matches_path(&self, pattern: &FilterPattern, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if pattern.original.ends_with('/') {
            // Directory pattern: match any path below that directory
            let dir_pattern = pattern.original.trim_end_matches('/');
            return glob::Pattern::new(&format!("{dir_pattern}/**"))
                .map(|p| p.matches(&path_str))
                .unwrap_or(false);
        }

        if let Some(anchored) = pattern.original.strip_prefix('/') {
            return glob::Pattern::new(anchored).map(|p| p.matches(&path_str)).unwrap_or(false);
        }

        if pattern.original.contains('/') {
            return pattern.pattern.matches(&path_str);
        }

        // No slash: match the file name only
        path.file_name()
            .map(|name| pattern.pattern.matches(&name.to_string_lossy()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_basic_pattern_matching() -> CssResult<()> {
        let filter =
            PathFilter::new(vec!["vendor/**".to_string(), "*.min.css".to_string()], None)?;

        assert!(filter.should_analyze(Path::new("styles/site.css"))?);
        assert!(!filter.should_analyze(Path::new("vendor/bootstrap/grid.css"))?);
        assert!(!filter.should_analyze(Path::new("app.min.css"))?);
        Ok(())
    }

    #[test]
    fn test_include_override() -> CssResult<()> {
        let filter = PathFilter::new(
            vec!["vendor/**".to_string(), "!vendor/ours/**".to_string()],
            None,
        )?;

        assert!(!filter.should_analyze(Path::new("vendor/theirs/a.css"))?);
        assert!(filter.should_analyze(Path::new("vendor/ours/a.css"))?);
        Ok(())
    }

    #[test]
    fn test_ignore_file() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::create_dir_all(root.join("styles"))?;
        fs::create_dir_all(root.join("legacy"))?;
        fs::write(root.join(".cssignore"), "legacy/**\n!legacy/keep.css\n# comment\n")?;
        fs::write(root.join("styles/site.css"), "")?;
        fs::write(root.join("legacy/old.css"), "")?;
        fs::write(root.join("legacy/keep.css"), "")?;

        let filter = PathFilter::new(vec![], Some(".cssignore".to_string()))?;

        assert!(filter.should_analyze(root.join("styles/site.css"))?);
        assert!(!filter.should_analyze(root.join("legacy/old.css"))?);
        assert!(filter.should_analyze(root.join("legacy/keep.css"))?);
        Ok(())
    }

    #[test]
    fn test_find_files_only_returns_stylesheets() -> CssResult<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        fs::create_dir_all(root.join("node_modules/pkg"))?;
        fs::write(root.join("a.css"), "")?;
        fs::write(root.join("b.scss"), "")?;
        fs::write(root.join("index.html"), "")?;
        fs::write(root.join("app.min.css"), "")?;
        fs::write(root.join("node_modules/pkg/dep.css"), "")?;

        let filter = PathFilter::with_defaults()?;
        let files = filter.find_files(root)?;
        assert_eq!(files, vec![root.join("a.css")]);

        let filter = PathFilter::with_defaults()?
            .with_extensions(vec!["css".to_string(), ".scss".to_string()]);
        let files = filter.find_files(root)?;
        assert_eq!(files, vec![root.join("a.css"), root.join("b.scss")]);
        Ok(())
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = PathFilter::new(vec!["[invalid".to_string()], None);
        assert!(matches!(result, Err(CssError::Pattern { .. })));
    }

    #[test]
    fn test_debug_patterns() -> CssResult<()> {
        let filter = PathFilter::new(vec!["*.min.css".to_string()], None)?;
        let info = filter.debug_patterns("app.min.css");
        assert_eq!(info, vec!["Pattern 0: *.min.css -> MATCH".to_string()]);
        Ok(())
    }
}
