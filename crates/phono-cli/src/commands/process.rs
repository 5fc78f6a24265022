//! File-based restoration command.

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use phono_config::{ControlRegistry, Settings, names, resolve_settings_path};
use phono_core::voltage_to_db;
use phono_io::{Encoding, StereoSamples, read_wav_stereo, write_wav_stereo};
use phono_restore::{DeclickConfig, StereoProcessor};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono or stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file (stereo)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Settings file [default: ~/.state/phono/settings.toml]
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Output gain in dB
    #[arg(long, allow_hyphen_values = true)]
    gain: Option<f32>,

    /// Subsonic filter: 0 off, 1 first order, 2 second order
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    subsonic: Option<u8>,

    /// Bypass RIAA playback equalization
    #[arg(long)]
    no_riaa: bool,

    /// Enable the declicker
    #[arg(long)]
    declick: bool,

    /// Declick spike threshold (1-900)
    #[arg(long)]
    spike_threshold: Option<f32>,

    /// Declick spike threshold in dB, mapped to the linear scale
    #[arg(long, allow_hyphen_values = true, conflicts_with = "spike_threshold")]
    spike_threshold_db: Option<f32>,

    /// Declick spike width in milliseconds
    #[arg(long)]
    spike_width: Option<f32>,

    /// Enable the hum notch
    #[arg(long)]
    notch: bool,

    /// Notch centre frequency in Hz
    #[arg(long)]
    notch_freq: Option<f32>,

    /// Notch quality factor
    #[arg(long)]
    notch_q: Option<f32>,

    /// Processing block size in frames
    #[arg(long, default_value = "8192")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32) [default: same as input]
    #[arg(long)]
    bit_depth: Option<u16>,

    /// Save the effective settings for later runs
    #[arg(long)]
    store_settings: bool,
}

impl ProcessArgs {
    /// Applies command-line overrides on top of stored settings.
    fn apply_overrides(&self, registry: &ControlRegistry, settings: &mut Settings) -> anyhow::Result<()> {
        let numeric = [
            (names::GAIN, self.gain),
            (names::SUBSONIC, self.subsonic.map(f32::from)),
            (names::SPIKE_THRESHOLD, self.spike_threshold),
            (names::SPIKE_WIDTH, self.spike_width),
            (names::NOTCH_FREQUENCY, self.notch_freq),
            (names::NOTCH_Q, self.notch_q),
        ];
        for (name, value) in numeric {
            if let Some(value) = value {
                registry.set_value(settings, name, value)?;
            }
        }
        if let Some(db) = self.spike_threshold_db {
            let width = registry.value(settings, names::SPIKE_WIDTH);
            let declick = DeclickConfig::from_threshold_db(db, width);
            registry.set_value(settings, names::SPIKE_THRESHOLD, declick.threshold)?;
        }

        let switches = [
            (names::RIAA_ENABLE, self.no_riaa, 0.0),
            (names::DECLICK_ENABLE, self.declick, 1.0),
            (names::NOTCH_ENABLE, self.notch, 1.0),
        ];
        for (name, given, value) in switches {
            if given {
                registry.set_value(settings, name, value)?;
            }
        }
        Ok(())
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }

    let registry = ControlRegistry::new();
    let settings_path = resolve_settings_path(args.settings.as_deref());
    let mut settings = Settings::load_or_default(&settings_path)?;
    args.apply_overrides(&registry, &mut settings)?;
    let params = registry.params_from_settings(&settings);
    tracing::debug!(settings = %settings_path.display(), ?params, "resolved parameters");

    println!("Reading {}...", args.input.display());
    let (input, info) =
        read_wav_stereo(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        input.len(),
        info.channels,
        info.sample_rate,
        info.duration_secs()
    );

    let mut processor = StereoProcessor::new(info.sample_rate, args.block_size)?;
    let encoding = match args.bit_depth {
        Some(bits) => Encoding::from_bits(bits)?,
        None => Encoding::matching(&info),
    };

    println!(
        "Processing: RIAA {}, subsonic {:?}, declick {}, notch {}, gain {:.1} dB",
        on_off(params.riaa_enabled),
        params.subsonic,
        on_off(params.declick.is_some()),
        on_off(params.notch.is_some()),
        params.gain_db
    );

    let pb = ProgressBar::new(input.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut output = StereoSamples::silence(input.len());
    let mut start = 0;
    while start < input.len() {
        let end = (start + args.block_size).min(input.len());
        processor.process(
            &params,
            &input.left[start..end],
            &input.right[start..end],
            &mut output.left[start..end],
            &mut output.right[start..end],
        )?;
        pb.set_position(end as u64);
        start = end;
    }
    pb.finish_with_message("done");

    let meters = processor.meters();
    println!("\nMeters:");
    println!("  Clipped samples: {}", meters.clipped_samples);
    println!("  Detected clicks: {}", meters.detected_clicks);
    if meters.detected_clicks > 0 {
        println!("  Average spike length: {:.1} samples", meters.average_spike_length);
        println!("  Average spike ratio: {:.1} dB", meters.average_spike_ratio_db);
    }
    println!(
        "  Peak: {:.1} dB in, {:.1} dB out",
        peak_db(&input),
        peak_db(&output)
    );

    println!("\nWriting {} ({}-bit)...", args.output.display(), encoding.bits());
    write_wav_stereo(&args.output, &output, info.sample_rate, encoding)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if args.store_settings {
        settings.save(&settings_path)?;
        println!("Stored settings in {}", settings_path.display());
    }

    println!("Done!");
    Ok(())
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn peak_db(samples: &StereoSamples) -> f32 {
    let peak = samples
        .left
        .iter()
        .chain(&samples.right)
        .map(|s| s.abs())
        .fold(0.0, f32::max);
    if peak > 0.0 { voltage_to_db(peak) } else { -120.0 }
}
