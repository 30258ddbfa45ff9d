use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

use vendorsweep::composer::ProjectLayout;
use vendorsweep::config::{Config, ConfigSource, NamespaceMatching};
use vendorsweep::pipeline::Pipeline;
use vendorsweep::report::{ReportFormat, Reporter};

/// vendorsweep - Find and remove unused Composer packages
#[derive(Parser, Debug)]
#[command(name = "vendorsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the PHP project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directories to scan for PHP sources (replaces the configured list)
    #[arg(short, long = "scan-dir")]
    scan_dir: Vec<PathBuf>,

    /// Sub-paths to leave out of the scan (can be specified multiple times)
    #[arg(short, long = "exclude-dir")]
    exclude_dir: Vec<String>,

    /// Package name prefixes that are never removed
    #[arg(long = "exclude-package")]
    exclude_package: Vec<String>,

    /// Package types that are never removed
    #[arg(long = "exclude-type")]
    exclude_type: Vec<String>,

    /// Vendor directory (defaults to composer.json config.vendor-dir, then "vendor")
    #[arg(long)]
    vendor_dir: Option<PathBuf>,

    /// Only report what would be removed
    #[arg(long, conflicts_with = "force")]
    dry_run: bool,

    /// Actually delete unused package directories
    #[arg(long)]
    force: bool,

    /// Confirm each removal
    #[arg(long)]
    interactive: bool,

    /// How autoload prefixes are compared with used names
    #[arg(long, value_enum)]
    matching: Option<MatchingMode>,

    /// Also keep packages that require a kept package
    #[arg(long)]
    protect_dependents: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum MatchingMode {
    Prefix,
    Segment,
}

impl From<MatchingMode> for NamespaceMatching {
    fn from(mode: MatchingMode) -> Self {
        match mode {
            MatchingMode::Prefix => NamespaceMatching::Prefix,
            MatchingMode::Segment => NamespaceMatching::Segment,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("vendorsweep v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli);
    let failed = run_cleanup(&config, &cli)?;

    if failed {
        std::process::exit(1);
    }

    Ok(())
}

/// Run one pass and report it. Returns whether any removal failed.
fn run_cleanup(config: &Config, cli: &Cli) -> Result<bool> {
    let start_time = Instant::now();

    let layout = ProjectLayout::discover(&cli.path, cli.vendor_dir.as_deref())
        .into_diagnostic()?;

    let show_progress = !cli.quiet && matches!(cli.format, OutputFormat::Terminal);
    let run = Pipeline::new(config, layout)
        .with_progress(show_progress)
        .with_interactive(cli.interactive)
        .run()?;

    Reporter::new(cli.format.into(), cli.output.clone())
        .with_verbose(config.verbose)
        .report(&run)?;

    if !cli.quiet && matches!(cli.format, OutputFormat::Terminal) && !run.skipped {
        println!(
            "{}",
            format!("Completed in {:.2}s", start_time.elapsed().as_secs_f64()).dimmed()
        );
    }

    Ok(run.has_failures())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries the report
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Config {
    let loaded = Config::load_or_default(&cli.path, cli.config.as_deref());

    match &loaded.source {
        ConfigSource::File(path) => debug!("Using configuration {}", path.display()),
        ConfigSource::Defaults => debug!("Using default configuration"),
        ConfigSource::Fallback(e) => {
            if cli.quiet {
                eprintln!("{} {}; using default configuration", "warning:".yellow().bold(), e);
            }
        }
    }

    let mut config = loaded.config;

    // Override with CLI arguments
    if !cli.scan_dir.is_empty() {
        config.scan_directories = cli.scan_dir.clone();
    }
    config.exclude_directories.extend(cli.exclude_dir.iter().cloned());
    config.exclude_packages.extend(cli.exclude_package.iter().cloned());
    config.exclude_package_types.extend(cli.exclude_type.iter().cloned());

    if cli.force {
        config.dry_run = false;
    } else if cli.dry_run {
        config.dry_run = true;
    }
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(mode) = cli.matching {
        config.namespace_matching = mode.into();
    }
    if cli.protect_dependents {
        config.protect_dependents = true;
    }

    // The exclusions the user wrote are lost with the file, so never delete
    if matches!(loaded.source, ConfigSource::Fallback(_)) && !config.dry_run {
        warn!("Configuration could not be loaded; running as a dry run despite --force");
        if cli.quiet {
            eprintln!(
                "{} configuration could not be loaded; running as a dry run despite --force",
                "warning:".yellow().bold()
            );
        }
        config.dry_run = true;
    }

    config
}
