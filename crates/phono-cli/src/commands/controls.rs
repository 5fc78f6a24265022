//! Control registry listing.

use clap::Args;
use phono_config::ControlRegistry;

#[derive(Args)]
pub struct ControlsArgs {
    /// Show only writable controls
    #[arg(long)]
    inputs: bool,
}

pub fn run(args: ControlsArgs) -> anyhow::Result<()> {
    let registry = ControlRegistry::new();

    println!("{:24} {:10} {:>8} {:>8} {:>8}", "Control", "Kind", "Min", "Max", "Default");
    println!("{}", "=".repeat(62));
    for control in registry.controls() {
        if control.is_meter() {
            if args.inputs {
                continue;
            }
            println!("{:24} {:10}", control.name, control.kind.label());
        } else {
            println!(
                "{:24} {:10} {:>8} {:>8} {:>8}",
                control.name,
                control.kind.label(),
                control.format(control.min),
                control.format(control.max),
                control.format(control.default)
            );
        }
    }
    Ok(())
}
