//! Command-line interface for razencheck.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use crate::analysis::Analyzer;
use crate::config::{self, Config, ConfigError};
use crate::report;
use crate::runner::Runner;
use crate::server;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Static analyzer for the Razen scripting language.
///
/// Razencheck works on source text alone: it reports unknown libraries and
/// functions, declarations whose keyword disagrees with their initializer,
/// and deprecated call forms, and can rewrite the latter automatically.
#[derive(Parser)]
#[command(name = "razencheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check Razen files and report diagnostics
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Apply every available quick fix to a file
    Fix(FixArgs),
    /// Print the semantic tokens of a file as JSON
    Tokens(TokensArgs),
    /// Run the line-delimited JSON host loop on stdin/stdout
    Serve,
    /// Write a default configuration file
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Sarif,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Arguments for the fix command.
#[derive(Parser)]
pub struct FixArgs {
    /// File to fix
    pub file: PathBuf,

    /// Write the result back instead of printing it
    #[arg(short, long)]
    pub write: bool,
}

/// Arguments for the tokens command.
#[derive(Parser)]
pub struct TokensArgs {
    /// File to tokenize
    pub file: PathBuf,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = config::CONFIG_FILE_NAMES[0])]
    pub output: PathBuf,
}

/// Dispatch a parsed command line to its handler.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Check(args) => run_check(args),
        Commands::Fix(args) => run_fix(args),
        Commands::Tokens(args) => run_tokens(args),
        Commands::Serve => server::run_stdio().map(|_| EXIT_SUCCESS),
        Commands::Init(args) => run_init(args),
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config_path = args.config.clone().or_else(|| config::discover(&cwd));
    let config = match Config::load(config_path.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e @ ConfigError::Io { .. }) | Err(e @ ConfigError::Parse { .. }) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'razencheck init' to create a config file");
            return Ok(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: invalid config: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let abs_path = match args.path.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let runner = Runner::new(config);
    let files = runner.collect_files(&abs_path)?;
    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    tracing::info!(files = files.len(), "checking");
    let result = runner.run(&files);
    let path_str = args.path.to_string_lossy().to_string();

    match args.format {
        OutputFormat::Json => report::write_json(&path_str, &result, runner.config())?,
        OutputFormat::Sarif => report::write_sarif(&abs_path, &result)?,
        OutputFormat::Pretty => {
            let source = config_path
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| "(defaults)".to_string());
            report::write_pretty(&path_str, &source, &result, runner.config());
        }
    }

    if result.passed(runner.config()) {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Run the fix command.
pub fn run_fix(args: &FixArgs) -> anyhow::Result<i32> {
    let text = read_source(&args.file)?;
    let (fixed, applied) = Analyzer::default().fix_all(&text);

    if args.write {
        if applied > 0 {
            fs::write(&args.file, &fixed)
                .with_context(|| format!("failed to write {}", args.file.display()))?;
        }
        eprintln!("Applied {} fix(es) to {}", applied, args.file.display());
    } else {
        print!("{}", fixed);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the tokens command.
pub fn run_tokens(args: &TokensArgs) -> anyhow::Result<i32> {
    let text = read_source(&args.file)?;
    let document = args.file.to_string_lossy();
    let analysis = Analyzer::default().analyze(&document, &text);
    println!("{}", serde_json::to_string_pretty(&analysis.tokens)?);
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = fs::write(&args.output, config::DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: razencheck check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
