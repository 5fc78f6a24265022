//! Linear predictive coding via autocorrelation and Levinson-Durbin.
//!
//! An order-`p` predictor estimates the next sample from the `p` previous ones:
//!
//! ```text
//! x̂[n] = Σ a[i] · x[n-1-i],   i = 0..p
//! ```
//!
//! The prediction error `x[n] - x̂[n]` is small on stationary program
//! material and jumps on impulsive damage, which makes it a useful auxiliary
//! click signal.
//!
//! # Algorithm
//!
//! 1. Autocorrelation `r[k] = Σ x[n]·x[n-k]` for `k = 0..=p`.
//! 2. Levinson-Durbin: starting from `e = r[0]`, each step computes a
//!    reflection coefficient `k = (r[i+1] - Σ a[j]·r[i-j]) / e`, updates the
//!    coefficient vector and shrinks `e *= 1 - k²`. A silent segment
//!    (`r[0] <= 0`) or a non-positive `e` fails the analysis.
//! 3. Coefficients are stored negated, so prediction accumulates
//!    `-= coeff[i] * history[i]`.
//!
//! # References
//!
//! - Makhoul, "Linear Prediction: A Tutorial Review", Proc. IEEE 63(4), 1975

use phono_core::RingBuffer;

use crate::error::{RestoreError, RestoreResult};

/// Highest supported predictor order; also the history capacity.
pub const MAX_ORDER: usize = 32;

/// Autocorrelation of `signal` for lags `0..r.len()`.
pub fn autocorrelation(signal: &[f32], r: &mut [f32]) {
    for (k, rk) in r.iter_mut().enumerate() {
        *rk = signal
            .iter()
            .skip(k)
            .zip(signal.iter())
            .fold(0.0, |acc, (&x, &lagged)| acc + x * lagged);
    }
}

/// Solves for negated predictor coefficients from an autocorrelation.
///
/// `r` must hold `coeffs.len() + 1` lags and `coeffs.len()` must not exceed
/// [`MAX_ORDER`]. On success `coeffs` holds the negated coefficients and the
/// final prediction-error energy is returned. On failure `coeffs` is left
/// untouched.
pub fn levinson_durbin(r: &[f32], coeffs: &mut [f32]) -> RestoreResult<f32> {
    let order = coeffs.len();
    if order == 0 || order > MAX_ORDER {
        return Err(RestoreError::InvalidOrder { order, max: MAX_ORDER });
    }
    if r.len() < order + 1 {
        return Err(RestoreError::SegmentTooShort {
            needed: order + 1,
            got: r.len(),
        });
    }
    if !(r[0] > 0.0) {
        return Err(RestoreError::SilentSegment);
    }

    let mut a = [0.0f32; MAX_ORDER];
    let mut updated = [0.0f32; MAX_ORDER];
    let mut e = r[0];

    for i in 0..order {
        let mut acc = r[i + 1];
        for j in 0..i {
            acc -= a[j] * r[i - j];
        }
        let k = acc / e;

        for j in 0..i {
            updated[j] = a[j] - k * a[i - j - 1];
        }
        a[..i].copy_from_slice(&updated[..i]);
        a[i] = k;

        e *= 1.0 - k * k;
        if !(e > 0.0) {
            return Err(RestoreError::UnstableSegment { step: i });
        }
    }

    for (c, &ai) in coeffs.iter_mut().zip(&a[..order]) {
        *c = -ai;
    }
    Ok(e)
}

/// Running one-step linear predictor.
#[derive(Debug, Clone)]
pub struct LpcPredictor {
    order: usize,
    coeffs: [f32; MAX_ORDER],
    history: RingBuffer,
}

impl LpcPredictor {
    /// Creates a predictor of `order` (1..=32) with zero coefficients.
    pub fn new(order: usize) -> RestoreResult<Self> {
        if order == 0 || order > MAX_ORDER {
            return Err(RestoreError::InvalidOrder { order, max: MAX_ORDER });
        }
        Ok(Self {
            order,
            coeffs: [0.0; MAX_ORDER],
            history: RingBuffer::new(MAX_ORDER),
        })
    }

    /// Predictor order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Current (negated) coefficients.
    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs[..self.order]
    }

    /// Fits coefficients to `signal`.
    ///
    /// Needs at least `order + 1` samples. On failure the previous
    /// coefficients stay in place and the error says why.
    pub fn analyze(&mut self, signal: &[f32]) -> RestoreResult<()> {
        if signal.len() < self.order + 1 {
            return Err(RestoreError::SegmentTooShort {
                needed: self.order + 1,
                got: signal.len(),
            });
        }

        let mut r = [0.0f32; MAX_ORDER + 1];
        autocorrelation(signal, &mut r[..=self.order]);

        let mut fitted = [0.0f32; MAX_ORDER];
        match levinson_durbin(&r[..=self.order], &mut fitted[..self.order]) {
            Ok(_) => {
                self.coeffs = fitted;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(order = self.order, len = signal.len(), %err, "LPC segment rejected");
                Err(err)
            }
        }
    }

    /// Predicts the next sample from the history.
    #[inline]
    pub fn predict(&self) -> f32 {
        let mut prediction = 0.0;
        for (i, &c) in self.coefficients().iter().enumerate() {
            prediction -= c * self.history.recent(i);
        }
        prediction
    }

    /// Appends a sample to the history.
    #[inline]
    pub fn update(&mut self, sample: f32) {
        self.history.push(sample);
    }

    /// Returns `actual - predict()` and then records `actual`.
    #[inline]
    pub fn predict_error(&mut self, actual: f32) -> f32 {
        self.predict_error_with_prediction(actual).0
    }

    /// Like [`predict_error`](Self::predict_error), also returning the prediction.
    #[inline]
    pub fn predict_error_with_prediction(&mut self, actual: f32) -> (f32, f32) {
        let predicted = self.predict();
        self.update(actual);
        (actual - predicted, predicted)
    }

    /// Mean absolute prediction error over `signal`, continuing from the
    /// current history.
    pub fn mean_abs_error(&mut self, signal: &[f32]) -> f32 {
        if signal.is_empty() {
            return 0.0;
        }
        let total: f32 = signal.iter().map(|&x| self.predict_error(x).abs()).sum();
        total / signal.len() as f32
    }

    /// Clears the history; coefficients are kept.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
