//! Equalization coefficient tables keyed by sample rate.
//!
//! Only the six rates in [`SampleRate`] are supported; anything else has no
//! table and is rejected at construction time by the callers.
//!
//! # RIAA playback curve
//!
//! The playback de-emphasis is defined by three time constants:
//!
//! ```text
//!            1 + s·T2
//! H(s) = -------------------     T1 = 3180 µs, T2 = 318 µs, T3 = 75 µs
//!        (1 + s·T1)(1 + s·T3)
//! ```
//!
//! It is mapped to one biquad with the bilinear transform (`s = 2·fs·(1 - z⁻¹)/(1 + z⁻¹)`)
//! and normalized to 0 dB at 1 kHz. The bilinear zero at Nyquist makes the
//! top octave fall faster than the analog curve at 44.1/48 kHz; from
//! 88.2 kHz up the digital response tracks within a fraction of a dB to 10 kHz.
//!
//! # Subsonic filters
//!
//! 20 Hz Butterworth highpass sections of first and second order.

use crate::biquad::{BiquadCoefficients, FilterOrder, highpass_coefficients};

/// RIAA time constant T1 (50.05 Hz pole), seconds.
pub const RIAA_T1: f64 = 3180e-6;
/// RIAA time constant T2 (500.5 Hz zero), seconds.
pub const RIAA_T2: f64 = 318e-6;
/// RIAA time constant T3 (2122 Hz pole), seconds.
pub const RIAA_T3: f64 = 75e-6;

/// Frequency at which the RIAA section has unity gain.
pub const RIAA_REFERENCE_HZ: f32 = 1000.0;

/// Subsonic highpass cutoff.
pub const SUBSONIC_CUTOFF_HZ: f32 = 20.0;

/// The supported sample rates, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampleRate {
    /// 44.1 kHz
    Hz44100,
    /// 48 kHz
    Hz48000,
    /// 88.2 kHz
    Hz88200,
    /// 96 kHz
    Hz96000,
    /// 176.4 kHz
    Hz176400,
    /// 192 kHz
    Hz192000,
}

impl SampleRate {
    /// Every supported rate, indexed by [`SampleRate::index`].
    pub const ALL: [Self; 6] = [
        Self::Hz44100,
        Self::Hz48000,
        Self::Hz88200,
        Self::Hz96000,
        Self::Hz176400,
        Self::Hz192000,
    ];

    /// Looks up a rate in Hz. Returns `None` for unsupported rates.
    pub fn from_hz(hz: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|rate| rate.hz() == hz)
    }

    /// Rate in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz44100 => 44100,
            Self::Hz48000 => 48000,
            Self::Hz88200 => 88200,
            Self::Hz96000 => 96000,
            Self::Hz176400 => 176400,
            Self::Hz192000 => 192000,
        }
    }

    /// Position in the coefficient tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl core::fmt::Display for SampleRate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}

/// All equalization sections for one sample rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqualizationTables {
    /// RIAA playback de-emphasis.
    pub riaa: BiquadCoefficients,
    /// First-order 20 Hz highpass.
    pub subsonic_first: BiquadCoefficients,
    /// Second-order (Butterworth) 20 Hz highpass.
    pub subsonic_second: BiquadCoefficients,
}

impl EqualizationTables {
    /// Synthesizes the sections for `rate`.
    pub fn for_rate(rate: SampleRate) -> Self {
        let fs = rate.hz() as f32;
        Self {
            riaa: riaa_coefficients(rate),
            subsonic_first: highpass_coefficients(fs, SUBSONIC_CUTOFF_HZ, FilterOrder::First),
            subsonic_second: highpass_coefficients(fs, SUBSONIC_CUTOFF_HZ, FilterOrder::Second),
        }
    }
}

/// RIAA playback section for `rate`, 0 dB at [`RIAA_REFERENCE_HZ`].
pub fn riaa_coefficients(rate: SampleRate) -> BiquadCoefficients {
    let k = 2.0 * f64::from(rate.hz());
    let (kt1, kt2, kt3) = (k * RIAA_T1, k * RIAA_T2, k * RIAA_T3);

    // Numerator (1 + sT2)(1 + z^-1) and denominator (1 + sT1)(1 + sT3)
    // after clearing the (1 + z^-1)^2 factor.
    let n0 = 1.0 + kt2;
    let n1 = 2.0;
    let n2 = 1.0 - kt2;
    let d0 = (1.0 + kt1) * (1.0 + kt3);
    let d1 = (1.0 + kt1) * (1.0 - kt3) + (1.0 - kt1) * (1.0 + kt3);
    let d2 = (1.0 - kt1) * (1.0 - kt3);

    let raw = BiquadCoefficients {
        b0: (n0 / d0) as f32,
        b1: (n1 / d0) as f32,
        b2: (n2 / d0) as f32,
        a1: (-d1 / d0) as f32,
        a2: (-d2 / d0) as f32,
    };
    let reference = raw.magnitude_at(RIAA_REFERENCE_HZ, rate.hz() as f32);
    raw.scaled(1.0 / reference)
}

/// Precomputed [`EqualizationTables`] for every supported rate.
///
/// Build it once and hand out copies of the per-rate entries.
#[derive(Debug, Clone)]
pub struct CoefficientTable {
    tables: [EqualizationTables; 6],
}

impl CoefficientTable {
    /// Synthesizes the tables for all six rates.
    pub fn new() -> Self {
        let tables = SampleRate::ALL.map(EqualizationTables::for_rate);
        #[cfg(feature = "tracing")]
        tracing::debug!("equalization tables built for {} rates", tables.len());
        Self { tables }
    }

    /// Tables for `rate`.
    pub fn get(&self, rate: SampleRate) -> &EqualizationTables {
        &self.tables[rate.index()]
    }
}

impl Default for CoefficientTable {
    fn default() -> Self {
        Self::new()
    }
}
