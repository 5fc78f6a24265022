//! Median-absolute-deviation click detector.
//!
//! Samples are highpass-emphasized (10 kHz by default) so that clicks stand
//! out from program material, then scored against a symmetric window of
//! `2 * window_size + 1` emphasized samples:
//!
//! ```text
//! score = |center - median(window)| / (MAD(window) + epsilon)
//! ```
//!
//! where `center` is the sample in the exact middle of the window. Because
//! the center is `window_size` samples old, detections carry a fixed latency
//! of one half-window.
//!
//! # State machine
//!
//! ```text
//!  Filling --(window full)--> Idle <--> Candidate
//! ```
//!
//! A run of consecutive samples scoring above the threshold is a candidate.
//! The run is confirmed on the first sample that falls back below the
//! threshold, unless it carried less than `min_energy`. A run longer than
//! `max_click_length` is a sustained transient: it is dropped without being
//! reported, and scoring continues from Idle.
//!
//! The median and MAD are computed with a full sort of the window on every
//! sample. The score values are exact, not approximations.

use phono_core::{Biquad, FilterOrder, RingBuffer, highpass_coefficients, ms_to_samples};

use crate::error::{RestoreError, RestoreResult};

/// Default half-window length in milliseconds.
pub const DEFAULT_WINDOW_MS: f32 = 0.75;
/// Default MAD multiplier.
pub const DEFAULT_THRESHOLD: f32 = 7.0;
/// Default MAD floor.
pub const DEFAULT_EPSILON: f32 = 1e-9;
/// Default emphasis highpass cutoff.
pub const DEFAULT_HPF_FREQ: f32 = 10_000.0;

/// Median of `values`, sorting them in place.
///
/// Even lengths average the two middle values. An empty slice yields `0.0`.
///
/// ```rust
/// use phono_restore::median;
///
/// assert_eq!(median(&mut [1.0, 3.0, 2.0]), 2.0);
/// assert_eq!(median(&mut [1.0, 2.0, 3.0, 4.0]), 2.5);
/// ```
pub fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_unstable_by(f32::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Click detector settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickDetectorConfig {
    /// Half-window length in samples; the window holds `2 * window_size + 1`.
    pub window_size: usize,
    /// MAD multiplier a sample must exceed to be anomalous.
    pub threshold: f32,
    /// Added to the MAD to keep the score finite on silence.
    pub epsilon: f32,
    /// Longest run (in samples) still treated as a click.
    pub max_click_length: usize,
    /// Minimum summed |center| over a run; `0.0` disables the check.
    pub min_energy: f32,
    /// Emphasis highpass cutoff in Hz.
    pub hpf_freq: f32,
    /// Emphasis order: 2 (one section) or 4 (two cascaded sections).
    pub hpf_order: u8,
}

impl ClickDetectorConfig {
    /// Defaults for `sample_rate`: 0.75 ms half-window, threshold 7,
    /// runs up to one half-window, second-order 10 kHz emphasis.
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        let window_size = ms_to_samples(DEFAULT_WINDOW_MS, sample_rate as f32).max(1);
        Self {
            window_size,
            threshold: DEFAULT_THRESHOLD,
            epsilon: DEFAULT_EPSILON,
            max_click_length: window_size,
            min_energy: 0.0,
            hpf_freq: DEFAULT_HPF_FREQ,
            hpf_order: 2,
        }
    }

    /// Number of samples held in the scoring window.
    pub fn buffer_size(&self) -> usize {
        2 * self.window_size + 1
    }

    /// Checks the settings against `sample_rate`.
    pub fn validate(&self, sample_rate: u32) -> RestoreResult<()> {
        let nyquist = sample_rate as f32 / 2.0;
        if sample_rate == 0 {
            return Err(RestoreError::InvalidConfig("sample rate must be positive".into()));
        }
        if self.window_size == 0 {
            return Err(RestoreError::InvalidConfig("window size must be at least 1".into()));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(RestoreError::InvalidConfig(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(RestoreError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if self.max_click_length == 0 {
            return Err(RestoreError::InvalidConfig("max click length must be at least 1".into()));
        }
        if !(self.min_energy.is_finite() && self.min_energy >= 0.0) {
            return Err(RestoreError::InvalidConfig(format!(
                "minimum energy must be non-negative, got {}",
                self.min_energy
            )));
        }
        if !(self.hpf_freq > 0.0 && self.hpf_freq < nyquist) {
            return Err(RestoreError::InvalidConfig(format!(
                "emphasis cutoff {} Hz must lie in (0, {nyquist})",
                self.hpf_freq
            )));
        }
        if !matches!(self.hpf_order, 2 | 4) {
            return Err(RestoreError::InvalidConfig(format!(
                "emphasis order must be 2 or 4, got {}",
                self.hpf_order
            )));
        }
        Ok(())
    }
}

/// Where the detector is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Window not yet full; nothing can be detected.
    Filling,
    /// Scoring, no run in progress.
    Idle,
    /// Tracking a run of anomalous samples.
    Candidate,
}

#[derive(Debug, Clone, Copy)]
struct CandidateRun {
    length: usize,
    energy: f32,
}

/// Streaming click detector for one channel.
#[derive(Debug, Clone)]
pub struct ClickDetector {
    config: ClickDetectorConfig,
    emphasis: [Biquad; 2],
    stages: usize,
    window: RingBuffer,
    sorted: Vec<f32>,
    deviations: Vec<f32>,
    candidate: Option<CandidateRun>,
    last_score: f32,
}

impl ClickDetector {
    /// Creates a detector; all buffers are sized here.
    pub fn new(config: ClickDetectorConfig, sample_rate: u32) -> RestoreResult<Self> {
        config.validate(sample_rate)?;

        let coeffs = highpass_coefficients(sample_rate as f32, config.hpf_freq, FilterOrder::Second);
        let stages = if config.hpf_order == 4 { 2 } else { 1 };
        let size = config.buffer_size();

        tracing::debug!(
            sample_rate,
            window = config.window_size,
            threshold = config.threshold,
            stages,
            "click detector created"
        );

        Ok(Self {
            emphasis: [Biquad::new(coeffs), Biquad::new(coeffs)],
            stages,
            window: RingBuffer::new(size),
            sorted: vec![0.0; size],
            deviations: vec![0.0; size],
            candidate: None,
            last_score: 0.0,
            config,
        })
    }

    /// Settings in use.
    pub fn config(&self) -> &ClickDetectorConfig {
        &self.config
    }

    /// Detection latency in samples (the half-window).
    pub fn latency(&self) -> usize {
        self.config.window_size
    }

    /// Current state.
    pub fn state(&self) -> DetectorState {
        if !self.window.is_full() {
            DetectorState::Filling
        } else if self.candidate.is_some() {
            DetectorState::Candidate
        } else {
            DetectorState::Idle
        }
    }

    /// Score of the most recently scored center sample.
    pub fn last_score(&self) -> f32 {
        self.last_score
    }

    /// Feeds one raw sample; returns true when a click is confirmed.
    pub fn process(&mut self, sample: f32) -> bool {
        let mut emphasized = sample;
        for stage in &mut self.emphasis[..self.stages] {
            emphasized = stage.process(emphasized);
        }

        let was_full = self.window.is_full();
        self.window.push(emphasized);
        if !was_full {
            return false;
        }

        let (score, center) = self.score();
        self.last_score = score;
        self.advance(score > self.config.threshold, center)
    }

    /// Runs a block through [`process`](Self::process) and counts confirmations.
    pub fn count_clicks(&mut self, samples: &[f32]) -> usize {
        samples.iter().filter(|&&s| self.process(s)).count()
    }

    /// Runs a block and returns the offsets (within `samples`) at which
    /// clicks were confirmed.
    pub fn scan(&mut self, samples: &[f32]) -> Vec<usize> {
        samples
            .iter()
            .enumerate()
            .filter_map(|(i, &s)| self.process(s).then_some(i))
            .collect()
    }

    /// Returns to [`DetectorState::Filling`] with silent filter history.
    ///
    /// Configuration and buffer allocations are kept.
    pub fn reset(&mut self) {
        for stage in &mut self.emphasis {
            stage.clear();
        }
        self.window.clear();
        self.candidate = None;
        self.last_score = 0.0;
    }

    /// Returns the score of the window's center sample and its magnitude.
    fn score(&mut self) -> (f32, f32) {
        self.window.copy_linearized(&mut self.sorted);
        let center = self.sorted[self.config.window_size];

        let med = median(&mut self.sorted);
        for (dev, &x) in self.deviations.iter_mut().zip(&self.sorted) {
            *dev = (x - med).abs();
        }
        let mad = median(&mut self.deviations);

        ((center - med).abs() / (mad + self.config.epsilon), center.abs())
    }

    fn advance(&mut self, is_candidate: bool, center_magnitude: f32) -> bool {
        if is_candidate {
            match &mut self.candidate {
                Some(run) => {
                    run.length += 1;
                    run.energy += center_magnitude;
                    if run.length > self.config.max_click_length {
                        self.candidate = None;
                    }
                }
                None => {
                    self.candidate = Some(CandidateRun {
                        length: 1,
                        energy: center_magnitude,
                    });
                }
            }
            return false;
        }

        match self.candidate.take() {
            Some(run) => !(self.config.min_energy > 0.0 && run.energy < self.config.min_energy),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 48000;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [1.0, 3.0, 2.0]), 2.0);
        assert_eq!(median(&mut [1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median(&mut [4.0, -1.0]), 1.5);
        assert_eq!(median(&mut [7.0]), 7.0);
        assert_eq!(median(&mut []), 0.0);
    }

    #[test]
    fn test_default_config() {
        let config = ClickDetectorConfig::for_sample_rate(SR);
        assert_eq!(config.window_size, 36);
        assert_eq!(config.max_click_length, 36);
        assert_eq!(config.buffer_size(), 73);
        assert_eq!(config.threshold, 7.0);
        assert!(config.validate(SR).is_ok());

        assert_eq!(ClickDetectorConfig::for_sample_rate(44100).window_size, 33);
        assert_eq!(ClickDetectorConfig::for_sample_rate(192000).window_size, 144);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let base = ClickDetectorConfig::for_sample_rate(SR);
        let cases = [
            ClickDetectorConfig { window_size: 0, ..base.clone() },
            ClickDetectorConfig { threshold: 0.0, ..base.clone() },
            ClickDetectorConfig { threshold: f32::NAN, ..base.clone() },
            ClickDetectorConfig { epsilon: 0.0, ..base.clone() },
            ClickDetectorConfig { max_click_length: 0, ..base.clone() },
            ClickDetectorConfig { min_energy: -1.0, ..base.clone() },
            ClickDetectorConfig { hpf_freq: 24000.0, ..base.clone() },
            ClickDetectorConfig { hpf_order: 3, ..base.clone() },
        ];
        for config in cases {
            assert!(
                matches!(ClickDetector::new(config.clone(), SR), Err(RestoreError::InvalidConfig(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn test_filling_phase_reports_nothing() {
        let mut detector = ClickDetector::new(ClickDetectorConfig::for_sample_rate(SR), SR).unwrap();
        let size = detector.config().buffer_size();
        for i in 0..size {
            assert_eq!(detector.state(), DetectorState::Filling);
            assert!(!detector.process(if i % 7 == 0 { 1.0 } else { 0.0 }));
        }
        assert_eq!(detector.state(), DetectorState::Idle);
    }

    #[test]
    fn test_constant_zero_never_detects() {
        let mut detector = ClickDetector::new(ClickDetectorConfig::for_sample_rate(SR), SR).unwrap();
        assert_eq!(detector.count_clicks(&vec![0.0; 10_000]), 0);
        assert_eq!(detector.last_score(), 0.0);
    }

    #[test]
    fn test_state_machine_confirms_short_run() {
        let mut detector = ClickDetector::new(ClickDetectorConfig::for_sample_rate(SR), SR).unwrap();
        assert!(!detector.advance(true, 0.5));
        assert!(!detector.advance(true, 0.5));
        assert!(detector.candidate.is_some());
        assert!(detector.advance(false, 0.0));
        assert!(detector.candidate.is_none());
        assert!(!detector.advance(false, 0.0));
    }

    #[test]
    fn test_state_machine_rejects_long_run() {
        let config = ClickDetectorConfig {
            max_click_length: 3,
            ..ClickDetectorConfig::for_sample_rate(SR)
        };
        let mut detector = ClickDetector::new(config, SR).unwrap();
        for _ in 0..4 {
            assert!(!detector.advance(true, 1.0));
        }
        // Length 4 > 3: the whole run is dropped unreported.
        assert!(detector.candidate.is_none());
        assert!(!detector.advance(false, 0.0));
    }

    #[test]
    fn test_state_machine_min_energy() {
        let config = ClickDetectorConfig {
            min_energy: 1.0,
            ..ClickDetectorConfig::for_sample_rate(SR)
        };
        let mut detector = ClickDetector::new(config, SR).unwrap();
        detector.advance(true, 0.3);
        detector.advance(true, 0.3);
        assert!(!detector.advance(false, 0.0), "0.6 < 1.0 must be rejected");

        detector.advance(true, 0.6);
        detector.advance(true, 0.6);
        assert!(detector.advance(false, 0.0));
    }

    #[test]
    fn test_reset_returns_to_filling() {
        let mut detector = ClickDetector::new(ClickDetectorConfig::for_sample_rate(SR), SR).unwrap();
        for i in 0..500 {
            detector.process((i as f32 * 0.1).sin());
        }
        assert_ne!(detector.state(), DetectorState::Filling);
        detector.reset();
        assert_eq!(detector.state(), DetectorState::Filling);
        assert_eq!(detector.config().window_size, 36);
    }

    #[test]
    fn test_fourth_order_uses_two_stages() {
        let config = ClickDetectorConfig {
            hpf_order: 4,
            ..ClickDetectorConfig::for_sample_rate(SR)
        };
        let detector = ClickDetector::new(config, SR).unwrap();
        assert_eq!(detector.stages, 2);
    }
}
