//! Per-channel equalization: subsonic highpass followed by RIAA de-emphasis.

use crate::biquad::{BiquadState, evaluate};
use crate::riaa::EqualizationTables;

/// Subsonic (rumble) filter selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SubsonicMode {
    /// Bypassed.
    #[default]
    Off,
    /// First-order 20 Hz highpass.
    FirstOrder,
    /// Second-order 20 Hz Butterworth highpass.
    SecondOrder,
}

impl SubsonicMode {
    /// Maps a host control value (0, 1, 2) to a mode.
    ///
    /// The value is rounded half-up and clamped to the valid range.
    pub fn from_control(value: f32) -> Self {
        match (value + 0.5) as i32 {
            i32::MIN..=0 => Self::Off,
            1 => Self::FirstOrder,
            _ => Self::SecondOrder,
        }
    }

    /// The control value for this mode.
    pub const fn to_control(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::FirstOrder => 1,
            Self::SecondOrder => 2,
        }
    }
}

/// One channel's subsonic and RIAA filter states.
///
/// Coefficients are copied from an [`EqualizationTables`] entry at
/// construction; only the two histories change while processing.
#[derive(Debug, Clone)]
pub struct EqualizationChannel {
    tables: EqualizationTables,
    subsonic: BiquadState,
    riaa: BiquadState,
}

impl EqualizationChannel {
    /// Creates a channel using the given per-rate tables.
    pub fn new(tables: EqualizationTables) -> Self {
        #[cfg(feature = "tracing")]
        tracing::debug!(riaa = ?tables.riaa, "equalization channel created");
        Self {
            tables,
            subsonic: BiquadState::new(),
            riaa: BiquadState::new(),
        }
    }

    /// Filters one sample.
    ///
    /// The subsonic stage runs first; its history is left untouched while
    /// it is switched off, and likewise for the RIAA stage.
    #[inline]
    pub fn process(&mut self, sample: f32, subsonic: SubsonicMode, riaa_enabled: bool) -> f32 {
        let mut out = match subsonic {
            SubsonicMode::Off => sample,
            SubsonicMode::FirstOrder => evaluate(&self.tables.subsonic_first, &mut self.subsonic, sample),
            SubsonicMode::SecondOrder => evaluate(&self.tables.subsonic_second, &mut self.subsonic, sample),
        };
        if riaa_enabled {
            out = evaluate(&self.tables.riaa, &mut self.riaa, out);
        }
        out
    }

    /// Clears both filter histories.
    pub fn reset(&mut self) {
        self.subsonic.reset();
        self.riaa.reset();
    }

    /// Tables this channel was built with.
    pub fn tables(&self) -> &EqualizationTables {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riaa::SampleRate;

    fn channel() -> EqualizationChannel {
        EqualizationChannel::new(EqualizationTables::for_rate(SampleRate::Hz48000))
    }

    #[test]
    fn test_subsonic_from_control() {
        assert_eq!(SubsonicMode::from_control(-3.0), SubsonicMode::Off);
        assert_eq!(SubsonicMode::from_control(0.0), SubsonicMode::Off);
        assert_eq!(SubsonicMode::from_control(0.49), SubsonicMode::Off);
        assert_eq!(SubsonicMode::from_control(0.5), SubsonicMode::FirstOrder);
        assert_eq!(SubsonicMode::from_control(1.0), SubsonicMode::FirstOrder);
        assert_eq!(SubsonicMode::from_control(2.0), SubsonicMode::SecondOrder);
        assert_eq!(SubsonicMode::from_control(7.0), SubsonicMode::SecondOrder);
        assert_eq!(SubsonicMode::SecondOrder.to_control(), 2);
    }

    #[test]
    fn test_all_stages_off_is_passthrough() {
        let mut ch = channel();
        for i in 0..64 {
            let x = (i as f32 * 0.37).sin();
            assert_eq!(ch.process(x, SubsonicMode::Off, false), x);
        }
    }

    #[test]
    fn test_subsonic_blocks_dc() {
        let mut ch = channel();
        let mut out = 1.0;
        for _ in 0..48000 {
            out = ch.process(1.0, SubsonicMode::SecondOrder, false);
        }
        assert!(out.abs() < 1e-3, "DC leaked: {out}");
    }

    #[test]
    fn test_riaa_boosts_dc() {
        // Unity at 1 kHz means roughly +20 dB at DC.
        let mut ch = channel();
        let mut out = 0.0;
        for _ in 0..48000 {
            out = ch.process(0.1, SubsonicMode::Off, true);
        }
        assert!(out > 0.9 && out < 1.1, "got {out}");
    }

    #[test]
    fn test_reset_clears_history() {
        let mut ch = channel();
        let first = ch.process(0.5, SubsonicMode::FirstOrder, true);
        for _ in 0..100 {
            ch.process(0.5, SubsonicMode::FirstOrder, true);
        }
        ch.reset();
        assert_eq!(ch.process(0.5, SubsonicMode::FirstOrder, true), first);
    }
}
