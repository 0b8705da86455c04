//! Command-line interface for pyinspect.

use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::{self, InspectorConfig};
use crate::detect::Inspector;
use crate::report;
use crate::scan::{self, Scanner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default configuration written by `init`.
const DEFAULT_TEMPLATE: &str = include_str!("templates/pyinspect.yaml");

/// Python source inspector.
///
/// Scores the cyclomatic complexity of every function, flags PEP 8 line
/// length and naming violations, and reports files opened outside a
/// `with` block.
#[derive(Parser)]
#[command(name = "pyinspect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a Python file or directory
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to inspect (file or directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
    pub format: Format,

    /// Inspect files in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Skip complexity scoring
    #[arg(long)]
    pub no_complexity: bool,

    /// Skip style checks
    #[arg(long)]
    pub no_style: bool,

    /// Skip resource-safety checks
    #[arg(long)]
    pub no_resources: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "pyinspect.yaml")]
    pub output: PathBuf,
}

/// Load the configuration named on the command line, or discover one in
/// the current directory. Falls back to defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<InspectorConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => config::discover(Path::new(".")),
    };

    match path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            InspectorConfig::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", p.display(), e))
        }
        None => Ok(InspectorConfig::default()),
    }
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if args.no_complexity {
        config.checks.complexity = false;
    }
    if args.no_style {
        config.checks.style = false;
    }
    if args.no_resources {
        config.checks.resources = false;
    }

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {}", e);
        return Ok(EXIT_ERROR);
    }

    let inspector = match Inspector::new(&config) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = match scan::collect_files(&args.path, &config.exclusions()?) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if files.is_empty() {
        log::warn!("no python files under {}", args.path.display());
    }

    let scanner = Scanner::new(inspector);
    let outcome = if args.parallel {
        scanner.scan_parallel(&files)
    } else {
        scanner.scan(&files)
    };

    let path_str = args.path.to_string_lossy();
    let mut stdout = io::stdout().lock();
    match args.format {
        Format::Json => report::write_json(&mut stdout, &path_str, &outcome)?,
        Format::Pretty => report::write_pretty(&mut stdout, &path_str, &outcome)?,
    }

    if outcome.has_findings() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
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
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: pyinspect check . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
