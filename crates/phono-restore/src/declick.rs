//! Block declicker: narrow-window power against a coarse background.
//!
//! Clicks are short regions whose power is far above the surrounding
//! program. For each position the engine compares the mean square of a
//! narrow window against a 4096-sample mean-square reference:
//!
//! ```text
//! elevated  <=>  mean(x²)[narrow, ww] >= threshold * mean(x²)[coarse, 4096] / 10
//! ```
//!
//! A run of elevated positions no wider than `2 * ww` is a spike and is
//! replaced by a straight line between its boundary samples. Wider runs are
//! musical transients and are left alone.
//!
//! # Algorithm
//!
//! 1. `b2[i] = x[i]²`
//! 2. The coarse reference is built by log-doubling partial sums: adding
//!    `ms[j + i]` into `ms[j]` for `i = 1, 2, 4, ..., 2048` leaves `ms[j]`
//!    holding the sum of `b2[j..j + 4096]`, which is then divided by 4096.
//!    Positions `0..len - 4096` are scanned, so a block of exactly 4096
//!    samples is never modified and the last 4096 samples of any block are
//!    only reached through the narrow window.
//!    The narrow window for position `i` starts at `i + 1024`, a quarter of
//!    the way into that span.
//! 3. Narrow widths are swept coarse to fine: `wrc` starts at
//!    `click_width / 4` and halves down to 1, with `ww = click_width / wrc`.
//!    Each pass sees the repairs made by the previous one.
//!
//! # Memory
//!
//! The two working arrays are allocated once by [`DeclickEngine::new`] for
//! the largest block the host will send. Longer blocks are passed through.

use phono_core::{db_to_voltage, ms_to_samples, power_ratio_to_db};

/// Blocks shorter than this are passed through untouched.
pub const MIN_BLOCK_LEN: usize = 4096;

/// Span of the coarse mean-square reference.
const SEPARATION: usize = 4096;
/// Last doubling step of the coarse sum; also the narrow window offset base.
const DOUBLING_LIMIT: usize = 2049;
/// Offset of the narrow window into the coarse span.
const NARROW_OFFSET: usize = DOUBLING_LIMIT / 2;
/// Widest narrow window whose right edge stays inside every scanned block.
///
/// About 16 ms at 192 kHz, above the 10 ms control maximum at every rate.
pub const MAX_CLICK_WIDTH: usize = SEPARATION - NARROW_OFFSET - 1;

/// Lower bound of the linear threshold.
pub const THRESHOLD_MIN: f32 = 1.0;
/// Upper bound of the linear threshold.
pub const THRESHOLD_MAX: f32 = 900.0;

/// Declicker settings. Stateless between blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclickConfig {
    /// Power ratio (x10) a narrow window must reach; 0 disables the engine.
    pub threshold: f32,
    /// Widest click to repair, in milliseconds.
    pub click_width_ms: f32,
}

impl Default for DeclickConfig {
    fn default() -> Self {
        Self {
            threshold: 150.0,
            click_width_ms: 1.0,
        }
    }
}

impl DeclickConfig {
    /// Maps a spike threshold in dB to the linear threshold:
    /// `round(10^(db/20) * 9)`, clamped to `1..=900`.
    pub fn from_threshold_db(threshold_db: f32, click_width_ms: f32) -> Self {
        let linear = (db_to_voltage(threshold_db) * 9.0).round();
        Self {
            threshold: linear.clamp(THRESHOLD_MIN, THRESHOLD_MAX),
            click_width_ms,
        }
    }

    /// True when a block processed with these settings may be modified.
    pub fn is_active(&self) -> bool {
        self.threshold != 0.0 && self.click_width_ms > 0.0
    }
}

/// Repairs made in one or more blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DeclickStats {
    /// Spikes replaced.
    pub clicks: usize,
    /// Sum of repaired span lengths, in samples.
    pub total_spike_length: usize,
    /// Sum over spikes of peak-narrow-to-background power ratios (linear).
    pub ratio_sum: f32,
}

impl DeclickStats {
    /// True when nothing was repaired.
    pub fn is_empty(&self) -> bool {
        self.clicks == 0
    }

    /// Mean repaired span in samples, `0.0` when empty.
    pub fn average_spike_length(&self) -> f32 {
        if self.clicks == 0 {
            0.0
        } else {
            self.total_spike_length as f32 / self.clicks as f32
        }
    }

    /// Mean spike-to-background power ratio in dB, `0.0` when empty.
    pub fn average_ratio_db(&self) -> f32 {
        if self.clicks == 0 {
            0.0
        } else {
            power_ratio_to_db(self.ratio_sum / self.clicks as f32)
        }
    }

    /// Folds another set of repairs into this one.
    pub fn merge(&mut self, other: &DeclickStats) {
        self.clicks += other.clicks;
        self.total_spike_length += other.total_spike_length;
        self.ratio_sum += other.ratio_sum;
    }
}

/// An elevated run being tracked.
#[derive(Debug, Clone, Copy)]
struct Run {
    left: usize,
    peak: f32,
    background: f32,
}

/// Block declicker with a pre-sized working arena.
#[derive(Debug, Clone)]
pub struct DeclickEngine {
    ms_seq: Vec<f32>,
    b2: Vec<f32>,
}

impl DeclickEngine {
    /// Allocates working space for blocks of up to `max_block_len` samples.
    pub fn new(max_block_len: usize) -> Self {
        tracing::debug!(max_block_len, "declick arena allocated");
        Self {
            ms_seq: vec![0.0; max_block_len],
            b2: vec![0.0; max_block_len],
        }
    }

    /// Largest block this engine will process.
    pub fn capacity(&self) -> usize {
        self.b2.len()
    }

    /// Finds and repairs clicks in `buffer` in place.
    ///
    /// Blocks shorter than [`MIN_BLOCK_LEN`], longer than the arena, or
    /// processed with an inactive config are left bit-for-bit unchanged and
    /// report no clicks.
    pub fn process(&mut self, buffer: &mut [f32], config: &DeclickConfig, sample_rate: u32) -> DeclickStats {
        let mut stats = DeclickStats::default();
        let len = buffer.len();
        if len < MIN_BLOCK_LEN || !config.is_active() {
            return stats;
        }
        if len > self.capacity() {
            tracing::warn!(len, capacity = self.capacity(), "declick block exceeds arena, skipped");
            return stats;
        }

        let click_width = ms_to_samples(config.click_width_ms, sample_rate as f32).clamp(1, MAX_CLICK_WIDTH);

        let b2 = &mut self.b2[..len];
        let ms = &mut self.ms_seq[..len];
        for (sq, &x) in b2.iter_mut().zip(buffer.iter()) {
            *sq = x * x;
        }
        ms.copy_from_slice(b2);

        let mut step = 1;
        while step < DOUBLING_LIMIT {
            for j in 0..len - step {
                ms[j] += ms[j + step];
            }
            step *= 2;
        }
        debug_assert_eq!(step, SEPARATION);
        let positions = len - SEPARATION;
        for m in &mut ms[..positions] {
            *m /= SEPARATION as f32;
        }

        let mut wrc = click_width / 4;
        while wrc >= 1 {
            let ww = click_width / wrc;
            let mut run: Option<Run> = None;

            for i in 0..positions {
                let start = i + NARROW_OFFSET;
                let msw = b2[start..start + ww].iter().sum::<f32>() / ww as f32;

                if msw >= config.threshold * ms[i] / 10.0 {
                    match &mut run {
                        Some(r) => r.peak = r.peak.max(msw),
                        None => {
                            run = Some(Run {
                                left: start,
                                peak: msw,
                                background: ms[i],
                            });
                        }
                    }
                } else if let Some(r) = run.take() {
                    // Run width is i - (r.left - NARROW_OFFSET).
                    if start - r.left <= 2 * ww {
                        let right = start + ww;
                        interpolate(buffer, b2, r.left, right);
                        stats.clicks += 1;
                        stats.total_spike_length += right - r.left;
                        stats.ratio_sum += if r.background > 0.0 { r.peak / r.background } else { 1.0 };
                    }
                }
            }
            wrc /= 2;
        }

        stats
    }
}

/// Replaces `buffer[left..right]` with the line from `buffer[left]` to
/// `buffer[right]` and refreshes the squared copy.
fn interpolate(buffer: &mut [f32], b2: &mut [f32], left: usize, right: usize) {
    let lv = buffer[left];
    let rv = buffer[right];
    let span = (right - left) as f32;
    for j in left..right {
        let value = (rv * (j - left) as f32 + lv * (right - j) as f32) / span;
        buffer[j] = value;
        b2[j] = value * value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44100;

    fn sine(len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn test_threshold_db_mapping() {
        assert_eq!(DeclickConfig::from_threshold_db(0.0, 1.0).threshold, 9.0);
        assert_eq!(DeclickConfig::from_threshold_db(20.0, 1.0).threshold, 90.0);
        assert_eq!(DeclickConfig::from_threshold_db(-40.0, 1.0).threshold, 1.0);
        assert_eq!(DeclickConfig::from_threshold_db(60.0, 1.0).threshold, 900.0);
    }

    #[test]
    fn test_short_block_is_noop() {
        let mut engine = DeclickEngine::new(8192);
        let mut buffer = sine(4095, 0.1);
        buffer[2000] = 0.9;
        let before = buffer.clone();
        let stats = engine.process(&mut buffer, &DeclickConfig::default(), SR);
        assert!(stats.is_empty());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_disabled_config_is_noop() {
        let mut engine = DeclickEngine::new(8192);
        let mut buffer = sine(8192, 0.1);
        buffer[3000] = 0.9;
        let before = buffer.clone();
        for config in [
            DeclickConfig { threshold: 0.0, click_width_ms: 1.0 },
            DeclickConfig { threshold: 150.0, click_width_ms: 0.0 },
        ] {
            assert!(engine.process(&mut buffer, &config, SR).is_empty());
            assert_eq!(buffer, before);
        }
    }

    #[test]
    fn test_oversized_block_is_noop() {
        let mut engine = DeclickEngine::new(4096);
        let mut buffer = sine(8192, 0.1);
        buffer[3000] += 0.9;
        let before = buffer.clone();
        assert!(engine.process(&mut buffer, &DeclickConfig::default(), SR).is_empty());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_repairs_spike() {
        let mut engine = DeclickEngine::new(8192);
        let clean = sine(8192, 0.1);
        let mut buffer = clean.clone();
        buffer[3000] += 0.9;
        buffer[3001] -= 0.7;

        let config = DeclickConfig { threshold: 200.0, click_width_ms: 0.5 };
        let stats = engine.process(&mut buffer, &config, SR);
        assert_eq!(stats.clicks, 1);
        assert!(stats.average_spike_length() > 1.0 && stats.average_spike_length() < 30.0);
        assert!(stats.average_ratio_db() > 10.0);
        assert!((buffer[3000] - clean[3000]).abs() < 0.05);
        assert!((buffer[3001] - clean[3001]).abs() < 0.05);
    }

    #[test]
    fn test_widest_width_stays_in_block() {
        assert!(ms_to_samples(10.0, 192_000.0) <= MAX_CLICK_WIDTH);

        let mut engine = DeclickEngine::new(8192);
        let mut buffer = sine(8192, 0.1);
        buffer[8190] += 0.9;
        let config = DeclickConfig { threshold: 1.0, click_width_ms: 20.0 };
        engine.process(&mut buffer, &config, 192_000);
    }

    #[test]
    fn test_clean_signal_untouched() {
        let mut engine = DeclickEngine::new(8192);
        let mut buffer = sine(8192, 0.3);
        let before = buffer.clone();
        assert!(engine.process(&mut buffer, &DeclickConfig::default(), SR).is_empty());
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_silence_reports_nothing() {
        let mut engine = DeclickEngine::new(8192);
        let mut buffer = vec![0.0; 8192];
        assert!(engine.process(&mut buffer, &DeclickConfig::default(), SR).is_empty());
        assert!(buffer.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_interpolate_is_linear() {
        let mut buffer = vec![0.0, 1.0, 9.0, -4.0, 7.0, 3.0];
        let mut b2 = vec![0.0; 6];
        interpolate(&mut buffer, &mut b2, 1, 5);
        assert_eq!(buffer, vec![0.0, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(b2[2], 2.25);
    }

    #[test]
    fn test_stats_merge_and_averages() {
        let mut total = DeclickStats::default();
        assert_eq!(total.average_spike_length(), 0.0);
        assert_eq!(total.average_ratio_db(), 0.0);
        total.merge(&DeclickStats { clicks: 2, total_spike_length: 20, ratio_sum: 200.0 });
        total.merge(&DeclickStats { clicks: 2, total_spike_length: 4, ratio_sum: 200.0 });
        assert_eq!(total.clicks, 4);
        assert_eq!(total.average_spike_length(), 6.0);
        assert!((total.average_ratio_db() - 20.0).abs() < 1e-4);
    }
}
