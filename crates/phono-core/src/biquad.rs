//! Biquad (bi-quadratic) filter kernel.
//!
//! Coefficients and state are split: [`BiquadCoefficients`] is a plain
//! `Copy` value that can live in a shared table, while [`BiquadState`] holds
//! the two-sample history owned by exactly one filter instance. [`evaluate`]
//! joins the two for one sample.
//!
//! Second-order sections use the RBJ Audio EQ Cookbook formulas. First-order
//! sections come from the bilinear transform of a one-pole shelf.
//!
//! # Storage convention
//!
//! The feedback terms are stored already negated, so evaluation is a pure
//! sum of products:
//!
//! ```text
//! y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] + a1*y[n-1] + a2*y[n-2]
//! ```
//!
//! Textbook `H(z) = (b0 + b1 z^-1 + b2 z^-2) / (1 + a1' z^-1 + a2' z^-2)`
//! maps to `a1 = -a1'`, `a2 = -a2'`.
//!
//! # Caller contract
//!
//! Synthesis never fails and never validates. A cutoff at or above Nyquist,
//! a non-positive Q or a non-positive sample rate produce meaningless (or
//! unstable) sections; callers check ranges before asking for coefficients.

use core::f32::consts::PI;
use libm::{cos, cosf, sin, sinf, sqrt, tanf};

/// Quality factor of a second-order Butterworth section (1/√2).
pub const BUTTERWORTH_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;

/// Order of a synthesized highpass/lowpass section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOrder {
    /// One pole, 6 dB/octave.
    First,
    /// Two poles, Butterworth (Q = 1/√2), 12 dB/octave.
    Second,
}

/// Five biquad coefficients with sign-flipped feedback terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoefficients {
    /// Feedforward coefficient for x[n].
    pub b0: f32,
    /// Feedforward coefficient for x[n-1].
    pub b1: f32,
    /// Feedforward coefficient for x[n-2].
    pub b2: f32,
    /// Negated feedback coefficient for y[n-1].
    pub a1: f32,
    /// Negated feedback coefficient for y[n-2].
    pub a2: f32,
}

impl BiquadCoefficients {
    /// Pass-through section: `y[n] = x[n]`.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Builds coefficients from a textbook `(b0, b1, b2, a0, a1, a2)` set.
    ///
    /// Everything is divided by `a0` and the feedback terms are negated into
    /// the storage convention.
    pub fn from_textbook(b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) -> Self {
        let a0_inv = 1.0 / a0;
        Self {
            b0: b0 * a0_inv,
            b1: b1 * a0_inv,
            b2: b2 * a0_inv,
            a1: -a1 * a0_inv,
            a2: -a2 * a0_inv,
        }
    }

    /// Magnitude of the frequency response at `frequency` Hz.
    ///
    /// Evaluates `|H(e^{jω})|` in closed form (double precision internally),
    /// which is what the tests and diagnostics compare against instead of
    /// running a sine through the filter.
    pub fn magnitude_at(&self, frequency: f32, sample_rate: f32) -> f32 {
        let omega = 2.0 * core::f64::consts::PI * f64::from(frequency) / f64::from(sample_rate);
        let (c1, s1) = (cos(omega), sin(omega));
        let (c2, s2) = (cos(2.0 * omega), sin(2.0 * omega));
        let (b0, b1, b2) = (f64::from(self.b0), f64::from(self.b1), f64::from(self.b2));
        let (a1, a2) = (f64::from(self.a1), f64::from(self.a2));

        let num_re = b0 + b1 * c1 + b2 * c2;
        let num_im = -(b1 * s1 + b2 * s2);
        let den_re = 1.0 - a1 * c1 - a2 * c2;
        let den_im = a1 * s1 + a2 * s2;

        (sqrt(num_re * num_re + num_im * num_im) / sqrt(den_re * den_re + den_im * den_im)) as f32
    }

    /// Returns a copy with the feedforward terms scaled by `gain`.
    pub fn scaled(self, gain: f32) -> Self {
        Self {
            b0: self.b0 * gain,
            b1: self.b1 * gain,
            b2: self.b2 * gain,
            ..self
        }
    }
}

impl Default for BiquadCoefficients {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Two-sample input/output history of one biquad section.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BiquadState {
    /// x[n-1]
    pub x1: f32,
    /// x[n-2]
    pub x2: f32,
    /// y[n-1]
    pub y1: f32,
    /// y[n-2]
    pub y2: f32,
}

impl BiquadState {
    /// Zeroed history.
    pub const fn new() -> Self {
        Self {
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Clears the history back to silence.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Runs one sample through a biquad section and shifts its history.
#[inline]
pub fn evaluate(coeffs: &BiquadCoefficients, state: &mut BiquadState, input: f32) -> f32 {
    let output = coeffs.b0 * input
        + coeffs.b1 * state.x1
        + coeffs.b2 * state.x2
        + coeffs.a1 * state.y1
        + coeffs.a2 * state.y2;

    state.x2 = state.x1;
    state.x1 = input;
    state.y2 = state.y1;
    state.y1 = output;

    output
}

/// A biquad section bundled with its own state.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    coeffs: BiquadCoefficients,
    state: BiquadState,
}

impl Biquad {
    /// Creates a filter with the given coefficients and silent history.
    pub fn new(coeffs: BiquadCoefficients) -> Self {
        Self {
            coeffs,
            state: BiquadState::new(),
        }
    }

    /// Replaces the coefficients, keeping the history.
    pub fn set_coefficients(&mut self, coeffs: BiquadCoefficients) {
        self.coeffs = coeffs;
    }

    /// Current coefficients.
    pub fn coefficients(&self) -> &BiquadCoefficients {
        &self.coeffs
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        evaluate(&self.coeffs, &mut self.state, input)
    }

    /// Clears the filter history without touching the coefficients.
    pub fn clear(&mut self) {
        self.state.reset();
    }
}

/// Highpass coefficients.
///
/// First order is normalized to unity gain at Nyquist; second order is a
/// Butterworth section.
///
/// # Arguments
///
/// * `sample_rate` - Sample rate in Hz
/// * `cutoff` - -3 dB frequency in Hz (must be below Nyquist)
/// * `order` - Section order
pub fn highpass_coefficients(sample_rate: f32, cutoff: f32, order: FilterOrder) -> BiquadCoefficients {
    let omega = 2.0 * PI * cutoff / sample_rate;
    match order {
        FilterOrder::First => {
            let t = tanf(omega / 2.0);
            let a = (1.0 - t) / (1.0 + t);
            let g = (1.0 + a) / 2.0;
            BiquadCoefficients {
                b0: g,
                b1: -g,
                b2: 0.0,
                a1: a,
                a2: 0.0,
            }
        }
        FilterOrder::Second => {
            let cos_omega = cosf(omega);
            let alpha = sinf(omega) / (2.0 * BUTTERWORTH_Q);
            BiquadCoefficients::from_textbook(
                (1.0 + cos_omega) / 2.0,
                -(1.0 + cos_omega),
                (1.0 + cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            )
        }
    }
}

/// Lowpass coefficients.
///
/// First order is normalized to unity gain at DC; second order is a
/// Butterworth section.
///
/// # Arguments
///
/// * `sample_rate` - Sample rate in Hz
/// * `cutoff` - -3 dB frequency in Hz (must be below Nyquist)
/// * `order` - Section order
pub fn lowpass_coefficients(sample_rate: f32, cutoff: f32, order: FilterOrder) -> BiquadCoefficients {
    let omega = 2.0 * PI * cutoff / sample_rate;
    match order {
        FilterOrder::First => {
            let t = tanf(omega / 2.0);
            let a = (t - 1.0) / (t + 1.0);
            let g = (1.0 + a) / 2.0;
            BiquadCoefficients {
                b0: g,
                b1: g,
                b2: 0.0,
                a1: -a,
                a2: 0.0,
            }
        }
        FilterOrder::Second => {
            let cos_omega = cosf(omega);
            let alpha = sinf(omega) / (2.0 * BUTTERWORTH_Q);
            BiquadCoefficients::from_textbook(
                (1.0 - cos_omega) / 2.0,
                1.0 - cos_omega,
                (1.0 - cos_omega) / 2.0,
                1.0 + alpha,
                -2.0 * cos_omega,
                1.0 - alpha,
            )
        }
    }
}

/// Notch (band-reject) coefficients.
///
/// # Arguments
///
/// * `frequency` - Notch center in Hz
/// * `q` - Quality factor (notch width = frequency / Q)
/// * `sample_rate` - Sample rate in Hz
pub fn notch_coefficients(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let alpha = sinf(omega) / (2.0 * q);

    BiquadCoefficients::from_textbook(
        1.0,
        -2.0 * cos_omega,
        1.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}
