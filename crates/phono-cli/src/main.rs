//! Phono CLI - RIAA equalization, declicking and click analysis for needle drops.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "phono")]
#[command(author, version, about = "Phono restoration: RIAA equalization, declicking and click analysis", long_about = None)]
struct Cli {
    /// Log debug detail to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore a WAV file: declick, equalize, notch and gain
    Process(commands::process::ProcessArgs),

    /// Report clicks and prediction error without modifying anything
    Scan(commands::scan::ScanArgs),

    /// Show, reset or edit the stored settings
    Settings(commands::settings::SettingsArgs),

    /// List every control with its range and default
    Controls(commands::controls::ControlsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Settings(args) => commands::settings::run(args),
        Commands::Controls(args) => commands::controls::run(args),
    }
}
