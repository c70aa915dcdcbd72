//! CSS Inspector CLI - Command-line interface for stylesheet extraction and checking
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to extraction and batch-check operations
//! - Handles external concerns like file I/O, process exit codes, and terminal output

use clap::{Args, Parser, Subcommand, ValueEnum};
use css_inspector::{
    extract_animations, extract_colors, extract_fonts, extract_media_queries,
    extract_selectors_by_property, extract_unused_selectors, validate_css, AnalysisOptions,
    CssError, CssResult, CssValidator, InspectorConfig, OutputFormat, ReportFormatter,
    ReportOptions, Severity,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// CSS Inspector - stylesheet extraction and syntax checking
#[derive(Parser)]
#[command(name = "css-inspector")]
#[command(version)]
#[command(about = "Extract structure from stylesheets and check them for syntax problems")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check stylesheets for syntax problems
    Check(CheckArgs),

    /// Validate a single stylesheet and print `valid` or the first problem
    Validate {
        /// Stylesheet to validate
        file: PathBuf,
    },

    /// Print what a stylesheet contains as JSON
    Extract {
        #[command(subcommand)]
        target: ExtractCommands,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Explain what a specific check does
    Explain {
        /// Check id to explain
        check_id: String,
    },

    /// List available checks
    Checks {
        /// Show only enabled checks
        #[arg(long)]
        enabled_only: bool,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Paths to check (files or directories)
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Minimum severity level to report
    #[arg(short, long, value_enum)]
    severity: Option<SeverityArg>,

    /// Maximum number of diagnostics to report
    #[arg(long)]
    max_diagnostics: Option<usize>,

    /// Additional exclude patterns
    #[arg(long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Ignore .cssignore files
    #[arg(long)]
    no_ignore: bool,

    /// Disable parallel processing
    #[arg(long)]
    no_parallel: bool,

    /// Fail on first unreadable file
    #[arg(long)]
    fail_fast: bool,

    /// HTML document used to report unused class and id selectors
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Subcommand)]
enum ExtractCommands {
    /// Color-bearing declarations per selector
    Colors { file: PathBuf },
    /// Rules inside each top-level @media block
    Media { file: PathBuf },
    /// @keyframes definitions and the selectors using them
    Animations { file: PathBuf },
    /// Font declarations per selector
    Fonts { file: PathBuf },
    /// Selectors declaring one property, with its value
    Property {
        file: PathBuf,
        /// Property name (case-insensitive)
        name: String,
    },
    /// Class and id selectors missing from an HTML document
    Unused {
        file: PathBuf,
        /// HTML document to search
        #[arg(long)]
        html: PathBuf,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Info,
    Warning,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warning => Severity::Warning,
            SeverityArg::Error => Severity::Error,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> CssResult<i32> {
    match cli.command {
        Commands::Check(args) => run_check(cli.config, args, !cli.no_color),
        Commands::Validate { file } => run_validate(&file),
        Commands::Extract { target } => run_extract(target),
        Commands::ValidateConfig { config_file } => run_validate_config(config_file.or(cli.config)),
        Commands::Explain { check_id } => run_explain(cli.config, &check_id),
        Commands::Checks { enabled_only } => run_list_checks(cli.config, enabled_only),
    }
}

/// Explicit `--config`, else a config file in the working directory, else defaults
fn load_config(config_path: Option<PathBuf>) -> CssResult<InspectorConfig> {
    match config_path.or_else(|| InspectorConfig::discover(".")) {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            InspectorConfig::load_from_file(path)
        }
        None => Ok(InspectorConfig::default()),
    }
}

fn read_file(path: &Path) -> CssResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        CssError::analysis(path.display().to_string(), format!("Failed to read file: {e}"))
    })
}

fn run_check(config_path: Option<PathBuf>, args: CheckArgs, use_colors: bool) -> CssResult<i32> {
    let config = load_config(config_path)?;

    let html = match &args.html {
        Some(path) => Some(String::from_utf8_lossy(&read_file(path)?).into_owned()),
        None => None,
    };

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        max_diagnostics: args.max_diagnostics,
        min_severity: args.severity.map(Severity::from),
        ..Default::default()
    });
    let validator = CssValidator::new_with_config(config)?.with_report_formatter(formatter);

    // Use current directory if no paths specified
    let paths = if args.paths.is_empty() { vec![PathBuf::from(".")] } else { args.paths };

    let options = AnalysisOptions {
        parallel: !args.no_parallel,
        fail_fast: args.fail_fast,
        exclude_patterns: args.exclude,
        ignore_ignore_files: args.no_ignore,
        html,
        ..Default::default()
    };

    let report = validator.validate_paths(&paths, &options)?;

    println!("{}", validator.format_report(&report, args.format.into())?);

    Ok(if report.has_errors() { 1 } else { 0 })
}

fn run_validate(file: &Path) -> CssResult<i32> {
    match validate_css(read_file(file)?) {
        Ok(_) => {
            println!("valid");
            Ok(0)
        }
        Err(e) => {
            println!("{e}");
            Ok(1)
        }
    }
}

fn run_extract(target: ExtractCommands) -> CssResult<i32> {
    match target {
        ExtractCommands::Colors { file } => print_json(&extract_colors(read_file(&file)?)?),
        ExtractCommands::Media { file } => print_json(&extract_media_queries(read_file(&file)?)?),
        ExtractCommands::Animations { file } => {
            print_json(&extract_animations(read_file(&file)?)?)
        }
        ExtractCommands::Fonts { file } => print_json(&extract_fonts(read_file(&file)?)?),
        ExtractCommands::Property { file, name } => {
            print_json(&extract_selectors_by_property(read_file(&file)?, &name)?)
        }
        ExtractCommands::Unused { file, html } => {
            let html = String::from_utf8_lossy(&read_file(&html)?).into_owned();
            print_json(&extract_unused_selectors(read_file(&file)?, &html)?)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> CssResult<i32> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CssError::analysis("<output>", format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(0)
}

fn run_validate_config(config_path: Option<PathBuf>) -> CssResult<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("css_inspector.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match InspectorConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("✅ Configuration is valid");

            let enabled = config.enabled_checks().count();

            println!("📊 Configuration summary:");
            println!("  Checks: {} total, {} enabled", config.checks.len(), enabled);
            println!("  Path patterns: {}", config.paths.patterns.len());
            println!("  Extensions: {}", config.paths.extensions.join(", "));

            Ok(0)
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed: {e}");
            Ok(1)
        }
    }
}

fn run_explain(config_path: Option<PathBuf>, check_id: &str) -> CssResult<i32> {
    let config = load_config(config_path)?;

    if let Some(rule) = config.checks.get(check_id) {
        println!("📖 Check: {check_id}");
        println!("⚠️ Severity: {}", rule.severity.as_str());
        println!("✅ Enabled: {}", rule.enabled);
        println!();
        println!("📝 Description:");
        println!("   {}", rule.description);
        return Ok(0);
    }

    eprintln!("❌ Check '{check_id}' not found");
    println!();
    println!("Available checks:");
    for id in config.checks.keys() {
        println!("  - {id}");
    }

    Ok(1)
}

fn run_list_checks(config_path: Option<PathBuf>, enabled_only: bool) -> CssResult<i32> {
    let config = load_config(config_path)?;

    println!("📋 Available Checks\n");

    for (id, rule) in &config.checks {
        if enabled_only && !rule.enabled {
            continue;
        }

        let status = if rule.enabled { "✅" } else { "❌" };
        println!("  {}🔍 {} [{}] - {}", status, id, rule.severity.as_str(), rule.description);
    }

    Ok(0)
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn check_args(paths: Vec<PathBuf>) -> CheckArgs {
        CheckArgs {
            paths,
            format: OutputFormatArg::Json,
            severity: None,
            max_diagnostics: None,
            exclude: vec![],
            no_ignore: false,
            no_parallel: false,
            fail_fast: false,
            html: None,
        }
    }

    #[test]
    fn test_check_command() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("broken.css");
        let clean = temp_dir.path().join("clean.css");

        fs::write(&broken, ".broken{color:red;background:blue;").unwrap();
        fs::write(&clean, ".clean { color: red; }").unwrap();

        let result = run_check(None, check_args(vec![broken]), false);
        assert_eq!(result.unwrap(), 1);

        let result = run_check(None, check_args(vec![clean]), false);
        assert_eq!(result.unwrap(), 0);
    }

    #[test]
    fn test_check_with_exclusions_and_html() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("vendor")).unwrap();
        fs::write(temp_dir.path().join("vendor/broken.css"), ".broken {").unwrap();
        fs::write(temp_dir.path().join("site.css"), ".site { color: red; }").unwrap();
        let html = temp_dir.path().join("index.html");
        fs::write(&html, "<body></body>").unwrap();

        let mut args = check_args(vec![temp_dir.path().to_path_buf()]);
        args.exclude = vec!["**/vendor/**".to_string()];
        args.html = Some(html);

        // Unused selectors are informational only
        assert_eq!(run_check(None, args, false).unwrap(), 0);
    }

    #[test]
    fn test_validate_command() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("site.css");

        fs::write(&file, ".a {\n    color: red; /* comment */\n}\n").unwrap();
        assert_eq!(run_validate(&file).unwrap(), 0);

        fs::write(&file, ".a {\n    color: red\n    margin: 0;\n}\n").unwrap();
        assert_eq!(run_validate(&file).unwrap(), 1);

        assert!(run_validate(&temp_dir.path().join("missing.css")).is_err());
    }

    #[test]
    fn test_extract_commands() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("site.css");
        let html = temp_dir.path().join("index.html");

        fs::write(
            &file,
            ".a { color: red; font-family: serif; animation: fade 1s; }\n@keyframes fade { from { opacity: 0; } }\n@media print { .a { color: black; } }\n",
        )
        .unwrap();
        fs::write(&html, r#"<p class="a"></p>"#).unwrap();

        let targets = vec![
            ExtractCommands::Colors { file: file.clone() },
            ExtractCommands::Media { file: file.clone() },
            ExtractCommands::Animations { file: file.clone() },
            ExtractCommands::Fonts { file: file.clone() },
            ExtractCommands::Property { file: file.clone(), name: "COLOR".to_string() },
            ExtractCommands::Unused { file: file.clone(), html },
        ];

        for target in targets {
            assert_eq!(run_extract(target).unwrap(), 0);
        }
    }

    #[test]
    fn test_extract_propagates_syntax_errors() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("open.css");
        fs::write(&file, ".open {").unwrap();

        let error = run_extract(ExtractCommands::Colors { file }).unwrap_err();
        assert!(matches!(error, CssError::UnbalancedBraces { .. }));
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("css_inspector.yaml");

        let config = InspectorConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        fs::write(&config_file, yaml).unwrap();

        assert_eq!(run_validate_config(Some(config_file.clone())).unwrap(), 0);

        fs::write(&config_file, "version: \"9.9\"\npaths:\n  patterns: []\n").unwrap();
        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 1);
    }

    #[test]
    fn test_explain_check() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("css_inspector.yaml");
        fs::write(&config_file, serde_yaml::to_string(&InspectorConfig::default()).unwrap())
            .unwrap();

        assert_eq!(run_explain(Some(config_file.clone()), "missing_semicolon").unwrap(), 0);
        assert_eq!(run_explain(Some(config_file), "nonexistent_check").unwrap(), 1);
    }

    #[test]
    fn test_list_checks() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("css_inspector.yaml");
        fs::write(&config_file, serde_yaml::to_string(&InspectorConfig::default()).unwrap())
            .unwrap();

        assert_eq!(run_list_checks(Some(config_file.clone()), false).unwrap(), 0);
        assert_eq!(run_list_checks(Some(config_file), true).unwrap(), 0);
    }
}
