//! Stereo phono processor: declick, equalize, notch, gain, meter.
//!
//! This is the object a host adapter drives once per audio block. Control
//! values arrive as a typed [`ProcessParams`] that is validated at the start
//! of every block; after that nothing on the block path can fail.
//!
//! Per block:
//!
//! 1. input is copied to output
//! 2. with declick enabled, each output channel is declicked in place
//! 3. per sample: subsonic + RIAA, optional notch, gain
//! 4. output samples with `|y| > 1` are counted as clipped
//!
//! Counters and declick statistics accumulate until [`StereoProcessor::reset`].

use phono_core::{
    BiquadCoefficients, BiquadState, EqualizationChannel, EqualizationTables, SampleRate,
    SubsonicMode, db_to_voltage, evaluate, notch_coefficients,
};

use crate::declick::{DeclickConfig, DeclickEngine, DeclickStats};
use crate::error::{RestoreError, RestoreResult};

/// Lowest accepted gain.
pub const GAIN_MIN_DB: f32 = -40.0;
/// Highest accepted gain.
pub const GAIN_MAX_DB: f32 = 40.0;

/// Notch filter settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotchParams {
    /// Center frequency in Hz.
    pub frequency: f32,
    /// Quality factor.
    pub q: f32,
}

impl Default for NotchParams {
    fn default() -> Self {
        Self {
            frequency: 50.0,
            q: 10.0,
        }
    }
}

/// Control values for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessParams {
    /// Output gain in dB, within [`GAIN_MIN_DB`]..=[`GAIN_MAX_DB`].
    pub gain_db: f32,
    /// Rumble filter selection.
    pub subsonic: SubsonicMode,
    /// Apply RIAA de-emphasis.
    pub riaa_enabled: bool,
    /// Declicker settings; `None` disables it.
    pub declick: Option<DeclickConfig>,
    /// Notch settings; `None` disables it.
    pub notch: Option<NotchParams>,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            gain_db: 0.0,
            subsonic: SubsonicMode::Off,
            riaa_enabled: true,
            declick: None,
            notch: None,
        }
    }
}

impl ProcessParams {
    /// Checks every value against `sample_rate`.
    pub fn validate(&self, sample_rate: u32) -> RestoreResult<()> {
        if !(GAIN_MIN_DB..=GAIN_MAX_DB).contains(&self.gain_db) {
            return Err(RestoreError::InvalidConfig(format!(
                "gain {} dB outside {GAIN_MIN_DB}..={GAIN_MAX_DB}",
                self.gain_db
            )));
        }
        if let Some(declick) = &self.declick {
            if !(0.0..=crate::declick::THRESHOLD_MAX).contains(&declick.threshold) {
                return Err(RestoreError::InvalidConfig(format!(
                    "declick threshold {} outside 0..={}",
                    declick.threshold,
                    crate::declick::THRESHOLD_MAX
                )));
            }
            if !(declick.click_width_ms.is_finite() && declick.click_width_ms >= 0.0) {
                return Err(RestoreError::InvalidConfig(format!(
                    "click width {} ms must be non-negative",
                    declick.click_width_ms
                )));
            }
        }
        if let Some(notch) = &self.notch {
            let nyquist = sample_rate as f32 / 2.0;
            if !(notch.frequency > 0.0 && notch.frequency < nyquist) {
                return Err(RestoreError::InvalidConfig(format!(
                    "notch frequency {} Hz outside (0, {nyquist})",
                    notch.frequency
                )));
            }
            if !(notch.q.is_finite() && notch.q > 0.0) {
                return Err(RestoreError::InvalidConfig(format!("notch Q {} must be positive", notch.q)));
            }
        }
        Ok(())
    }
}

/// Running counters and declick diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Meters {
    /// Output samples with magnitude above 1.0, both channels.
    pub clipped_samples: u64,
    /// Spikes repaired by the declicker, both channels.
    pub detected_clicks: u64,
    /// Mean repaired span in samples.
    pub average_spike_length: f32,
    /// Mean spike-to-background power ratio in dB.
    pub average_spike_ratio_db: f32,
}

/// Notch coefficients shared by both channels, recomputed only on change.
#[derive(Debug, Clone)]
struct NotchStage {
    current: Option<NotchParams>,
    coeffs: BiquadCoefficients,
    states: [BiquadState; 2],
}

impl NotchStage {
    fn new() -> Self {
        Self {
            current: None,
            coeffs: BiquadCoefficients::IDENTITY,
            states: [BiquadState::new(); 2],
        }
    }

    fn configure(&mut self, params: Option<NotchParams>, sample_rate: f32) {
        match (params, self.current) {
            (Some(p), Some(current)) if p == current => {}
            (Some(p), previous) => {
                self.coeffs = notch_coefficients(p.frequency, p.q, sample_rate);
                if previous.is_none() {
                    self.states = [BiquadState::new(); 2];
                }
                self.current = Some(p);
            }
            (None, _) => self.current = None,
        }
    }

    fn reset(&mut self) {
        self.current = None;
        self.states = [BiquadState::new(); 2];
    }
}

/// Two-channel processing instance.
#[derive(Debug, Clone)]
pub struct StereoProcessor {
    rate: SampleRate,
    max_block_len: usize,
    channels: [EqualizationChannel; 2],
    notch: NotchStage,
    declick: DeclickEngine,
    declick_totals: DeclickStats,
    clipped: u64,
}

impl StereoProcessor {
    /// Creates a processor for `sample_rate` Hz and blocks of up to
    /// `max_block_len` samples.
    ///
    /// Fails on a rate without equalization tables.
    pub fn new(sample_rate: u32, max_block_len: usize) -> RestoreResult<Self> {
        let rate = SampleRate::from_hz(sample_rate).ok_or(RestoreError::UnsupportedSampleRate(sample_rate))?;
        if max_block_len == 0 {
            return Err(RestoreError::InvalidConfig("maximum block length must be positive".into()));
        }
        let tables = EqualizationTables::for_rate(rate);

        tracing::debug!(%rate, max_block_len, "stereo processor created");

        Ok(Self {
            rate,
            max_block_len,
            channels: [EqualizationChannel::new(tables), EqualizationChannel::new(tables)],
            notch: NotchStage::new(),
            declick: DeclickEngine::new(max_block_len),
            declick_totals: DeclickStats::default(),
            clipped: 0,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.rate.hz()
    }

    /// Largest block accepted by [`process`](Self::process).
    pub fn max_block_len(&self) -> usize {
        self.max_block_len
    }

    /// Processes one stereo block.
    ///
    /// All four slices must have the same length, at most
    /// [`max_block_len`](Self::max_block_len). Validation happens before any
    /// state is touched.
    pub fn process(
        &mut self,
        params: &ProcessParams,
        in_l: &[f32],
        in_r: &[f32],
        out_l: &mut [f32],
        out_r: &mut [f32],
    ) -> RestoreResult<()> {
        let len = in_l.len();
        for got in [in_r.len(), out_l.len(), out_r.len()] {
            if got != len {
                return Err(RestoreError::BufferMismatch { expected: len, got });
            }
        }
        if len > self.max_block_len {
            return Err(RestoreError::BlockTooLarge {
                max: self.max_block_len,
                got: len,
            });
        }
        params.validate(self.rate.hz())?;

        out_l.copy_from_slice(in_l);
        out_r.copy_from_slice(in_r);

        let sample_rate = self.rate.hz();
        if let Some(config) = &params.declick {
            for out in [&mut *out_l, &mut *out_r] {
                let stats = self.declick.process(out, config, sample_rate);
                self.declick_totals.merge(&stats);
            }
        }

        self.notch.configure(params.notch, sample_rate as f32);
        let notch_on = self.notch.current.is_some();
        let gain = db_to_voltage(params.gain_db);

        let lanes = self.channels.iter_mut().zip(self.notch.states.iter_mut());
        for ((channel, notch_state), out) in lanes.zip([out_l, out_r]) {
            for sample in out.iter_mut() {
                let mut y = channel.process(*sample, params.subsonic, params.riaa_enabled);
                if notch_on {
                    y = evaluate(&self.notch.coeffs, notch_state, y);
                }
                y *= gain;
                if y.abs() > 1.0 {
                    self.clipped += 1;
                }
                *sample = y;
            }
        }

        Ok(())
    }

    /// Counters and declick diagnostics since construction or the last reset.
    pub fn meters(&self) -> Meters {
        Meters {
            clipped_samples: self.clipped,
            detected_clicks: self.declick_totals.clicks as u64,
            average_spike_length: self.declick_totals.average_spike_length(),
            average_spike_ratio_db: self.declick_totals.average_ratio_db(),
        }
    }

    /// Clears filter state, counters and statistics. No buffers are freed.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.notch.reset();
        self.declick_totals = DeclickStats::default();
        self.clipped = 0;
    }
}
