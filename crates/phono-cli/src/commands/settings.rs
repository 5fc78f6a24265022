//! Stored settings commands.
//!
//! Shows where settings live, what they resolve to, and resets them to
//! defaults.

use clap::{Args, Subcommand};
use phono_config::{ControlRegistry, Settings, resolve_settings_path};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,

    /// Settings file [default: ~/.state/phono/settings.toml]
    #[arg(long, value_name = "PATH", global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show the effective value of every control
    Show,

    /// Print the settings file location
    Path,

    /// Overwrite the settings file with defaults
    Reset,
}

pub fn run(args: SettingsArgs) -> anyhow::Result<()> {
    let path = resolve_settings_path(args.settings.as_deref());
    match args.command {
        SettingsCommand::Show => show_settings(&path),
        SettingsCommand::Path => {
            println!("{}", path.display());
            Ok(())
        }
        SettingsCommand::Reset => reset_settings(&path),
    }
}

fn show_settings(path: &Path) -> anyhow::Result<()> {
    let registry = ControlRegistry::new();
    let settings = Settings::load_or_default(path)?;

    println!("Settings: {}", path.display());
    if settings.is_empty() {
        println!("  (no stored values, showing defaults)");
    }
    println!();

    for control in registry.inputs() {
        let value = control.format(registry.value(&settings, control.name));
        let source = match settings.get(control.name) {
            Some(raw) if raw.trim() == value => "",
            Some(_) => " (adjusted)",
            None => " (default)",
        };
        println!("  {:24} {value}{source}", control.name);
    }

    let unknown: Vec<&str> = settings
        .iter()
        .map(|(key, _)| key)
        .filter(|key| registry.get(key).is_none())
        .collect();
    if !unknown.is_empty() {
        println!();
        println!("Unrecognized keys (kept on save):");
        for key in unknown {
            println!("  {key}");
        }
    }
    Ok(())
}

fn reset_settings(path: &Path) -> anyhow::Result<()> {
    ControlRegistry::new().default_settings().save(path)?;
    println!("Reset settings in {}", path.display());
    Ok(())
}
