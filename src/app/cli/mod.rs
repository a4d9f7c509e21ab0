//! CLI Adapter.

mod recent;
mod wizard;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::api;
use crate::domain::{AppError, CandidateKind, ProbeReport};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "VMLAUNCH_LOG";

#[derive(Parser)]
#[command(name = "vmlaunch")]
#[command(version)]
#[command(
    about = "Discover emulator parameters and assemble VM launch configurations",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to $VMLAUNCH_CONFIG, then ./vmlaunch.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a configuration interactively
    #[clap(visible_alias = "n")]
    New {
        /// Write the launch manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List catalog candidates
    #[clap(visible_alias = "ls")]
    List {
        /// machines, cpus or devices
        kind: String,
        /// Device category (network, storage, serial, usb, misc)
        #[arg(long)]
        category: Option<String>,
    },
    /// Show the parameters a machine or device accepts
    #[clap(visible_alias = "p")]
    Probe {
        /// machine or device
        kind: String,
        /// Candidate token, e.g. virtio-net-device
        token: String,
        /// Print the parsed report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assemble a configuration from a TOML session plan
    #[clap(visible_alias = "b")]
    Build {
        /// Session plan file
        #[arg(short, long)]
        plan: PathBuf,
        /// Write the launch manifest here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Manage vmlaunch.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a starter configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Entry point for the CLI.
pub fn run() {
    init_logging();
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result: Result<(), AppError> = match cli.command {
        Commands::New { output } => wizard::run_wizard(config, output),
        Commands::List { kind, category } => run_list(&kind, category.as_deref()),
        Commands::Probe { kind, token, json } => run_probe(config, &kind, &token, json),
        Commands::Build { plan, output } => run_build(config, &plan, output),
        Commands::Config { command } => match command {
            ConfigCommands::Init { force } => run_config_init(config, force),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so manifests on stdout stay machine-readable.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn parse_kind(value: &str) -> Result<CandidateKind, AppError> {
    CandidateKind::from_name(value).ok_or_else(|| AppError::UnknownCandidate {
        kind: "kind".to_string(),
        token: format!("{} (expected machines, cpus or devices)", value),
    })
}

fn run_list(kind: &str, category: Option<&str>) -> Result<(), AppError> {
    let kind = parse_kind(kind)?;
    let candidates = api::list_candidates(kind, category)?;

    for candidate in candidates {
        let argument = if candidate.is_default() { "(default)" } else { candidate.argument.as_str() };
        println!("{:<24} {}", argument, candidate.description);
        if !candidate.tooltip_text().is_empty() {
            println!("{:<24}   {}", "", candidate.tooltip_text());
        }
    }
    Ok(())
}

fn run_probe(
    config: Option<&Path>,
    kind: &str,
    token: &str,
    json: bool,
) -> Result<(), AppError> {
    let kind = parse_kind(kind)?;
    let report = api::probe_parameters(config, kind, token)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ProbeReport) {
    if report.descriptors.is_empty() {
        println!("'{}' reports no configurable parameters", report.token);
    }
    for descriptor in &report.descriptors {
        if descriptor.notes.is_empty() {
            println!("{:<24} {}", descriptor.name, descriptor.kind);
        } else {
            println!("{:<24} {:<10} {}", descriptor.name, descriptor.kind, descriptor.notes);
        }
    }
    if !report.warnings.is_empty() {
        eprintln!("⚠️  Skipped {} unparseable line(s):", report.warnings.len());
        for warning in &report.warnings {
            eprintln!("  • {}", warning);
        }
    }
}

fn run_build(
    config: Option<&Path>,
    plan: &Path,
    output: Option<PathBuf>,
) -> Result<(), AppError> {
    let written_to = output.clone();
    let outcome = api::build_from_plan(config, plan, output)?;

    for warning in &outcome.warnings {
        eprintln!("⚠️  {}", warning);
    }
    if let Some(path) = written_to {
        println!("✅ Built '{}' -> {}", outcome.configuration.name(), path.display());
    }
    Ok(())
}

fn run_config_init(config: Option<&Path>, force: bool) -> Result<(), AppError> {
    let path = api::init_config(config, force)?;
    println!("✅ Wrote {}", path.display());
    Ok(())
}
