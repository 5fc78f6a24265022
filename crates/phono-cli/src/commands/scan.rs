//! Click and prediction-error analysis command.

use anyhow::Context;
use clap::Args;
use phono_core::ms_to_samples;
use phono_io::read_wav_stereo;
use phono_restore::{ClickDetector, ClickDetectorConfig, LpcPredictor};
use std::path::PathBuf;

#[derive(Args)]
pub struct ScanArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Robust score above which a sample is anomalous
    #[arg(long, default_value = "7.0")]
    threshold: f32,

    /// Half-width of the scoring window in milliseconds
    #[arg(long, default_value = "0.75")]
    window_ms: f32,

    /// Longest run accepted as a click, in milliseconds [default: window]
    #[arg(long)]
    max_click_ms: Option<f32>,

    /// Minimum summed |emphasized sample| over a run for it to count
    #[arg(long, default_value = "0.0")]
    min_energy: f32,

    /// Emphasis highpass order (2 or 4)
    #[arg(long, default_value = "2")]
    hpf_order: u8,

    /// LPC order for the prediction-error report (1-32)
    #[arg(long, default_value = "16")]
    lpc_order: usize,

    /// LPC analysis frame length in samples
    #[arg(long, default_value = "1024")]
    lpc_frame: usize,

    /// Number of detection times to list per channel
    #[arg(long, default_value = "10")]
    show: usize,
}

/// Per-channel LPC summary.
#[derive(Debug, PartialEq)]
struct LpcReport {
    frames: usize,
    rejected: usize,
    /// Trailing frames too short to fit at this order.
    skipped: usize,
    mean_abs_error: f32,
}

pub fn run(args: ScanArgs) -> anyhow::Result<()> {
    let (samples, info) =
        read_wav_stereo(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
    let sample_rate = info.sample_rate;
    let rate = sample_rate as f32;

    let window_size = ms_to_samples(args.window_ms, rate).max(1);
    let config = ClickDetectorConfig {
        window_size,
        threshold: args.threshold,
        max_click_length: args
            .max_click_ms
            .map_or(window_size, |ms| ms_to_samples(ms, rate).max(1)),
        min_energy: args.min_energy,
        hpf_order: args.hpf_order,
        ..ClickDetectorConfig::for_sample_rate(sample_rate)
    };
    let mut detector = ClickDetector::new(config, sample_rate)?;
    let mut lpc = LpcPredictor::new(args.lpc_order)?;
    if args.lpc_frame <= args.lpc_order {
        anyhow::bail!(
            "LPC frame of {} samples is too short for order {}",
            args.lpc_frame,
            args.lpc_order
        );
    }

    println!(
        "Scanning {}: {} Hz, {:.2}s",
        args.input.display(),
        sample_rate,
        info.duration_secs()
    );
    println!(
        "  Detector: window {} samples, threshold {}, max click {} samples",
        window_size,
        args.threshold,
        detector.config().max_click_length
    );

    let channels: Vec<(&str, &[f32])> = if info.channels == 1 {
        vec![("mono", samples.left.as_slice())]
    } else {
        vec![("left", samples.left.as_slice()), ("right", samples.right.as_slice())]
    };

    let mut total = 0;
    for (label, channel) in channels {
        detector.reset();
        let detections = detector.scan(channel);
        total += detections.len();

        println!("\n{label}: {} click(s)", detections.len());
        for &offset in detections.iter().take(args.show) {
            let position = offset.saturating_sub(detector.latency());
            println!("  {:>10.4}s  (sample {position})", position as f32 / rate);
        }
        if detections.len() > args.show {
            println!("  ... {} more", detections.len() - args.show);
        }

        lpc.reset();
        let report = lpc_report(&mut lpc, channel, args.lpc_frame);
        println!(
            "  LPC order {}: mean |error| {:.6} over {} frame(s), {} rejected",
            lpc.order(),
            report.mean_abs_error,
            report.frames,
            report.rejected
        );
        if report.skipped > 0 {
            println!("  LPC skipped {} short trailing frame(s)", report.skipped);
        }
    }

    println!("\nTotal clicks: {total}");
    Ok(())
}

/// Fits each frame and measures the error of predicting it.
///
/// Rejected frames keep the previous coefficients and are left out of the
/// error average, but still advance the history. A tail of `order` samples
/// or fewer cannot be fitted and is counted as skipped.
fn lpc_report(lpc: &mut LpcPredictor, channel: &[f32], frame_len: usize) -> LpcReport {
    let mut report = LpcReport {
        frames: 0,
        rejected: 0,
        skipped: 0,
        mean_abs_error: 0.0,
    };
    let mut error_sum = 0.0;
    let mut measured = 0;

    for frame in channel.chunks(frame_len) {
        if frame.len() <= lpc.order() {
            report.skipped += 1;
            continue;
        }
        report.frames += 1;
        match lpc.analyze(frame) {
            Ok(()) => {
                error_sum += lpc.mean_abs_error(frame);
                measured += 1;
            }
            Err(err) => {
                tracing::debug!(frame = report.frames - 1, %err, "LPC frame rejected");
                report.rejected += 1;
                for &x in frame {
                    lpc.update(x);
                }
            }
        }
    }

    if measured > 0 {
        report.mean_abs_error = error_sum / measured as f32;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A tone with a little LCG noise so every fit stays well conditioned.
    fn tone(len: usize) -> Vec<f32> {
        let mut state: u32 = 12345;
        (0..len)
            .map(|i| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345) & 0x7fff_ffff;
                let noise = state as f32 / 0x7fff_ffff as f32 - 0.5;
                0.3 * (i as f32 * 0.13).sin() + 0.05 * noise
            })
            .collect()
    }

    #[test]
    fn test_short_tail_is_skipped_not_rejected() {
        let mut lpc = LpcPredictor::new(16).unwrap();
        let report = lpc_report(&mut lpc, &tone(2 * 1024 + 5), 1024);

        assert_eq!(report.frames, 2);
        assert_eq!(report.rejected, 0);
        assert_eq!(report.skipped, 1);
        assert!(report.mean_abs_error > 0.0 && report.mean_abs_error < 0.3);
    }

    #[test]
    fn test_tail_longer_than_order_is_fitted() {
        let mut lpc = LpcPredictor::new(16).unwrap();
        let report = lpc_report(&mut lpc, &tone(1024 + 200), 1024);

        assert_eq!(report.frames, 2);
        assert_eq!(report.skipped, 0);
    }

    #[test]
    fn test_silent_frames_are_rejected() {
        let mut lpc = LpcPredictor::new(8).unwrap();
        let mut channel = vec![0.0; 512];
        channel.extend(tone(512));
        let report = lpc_report(&mut lpc, &channel, 512);

        assert_eq!(report.frames, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.skipped, 0);
    }
}
