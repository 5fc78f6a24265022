//! Error types for restoration engines.

use thiserror::Error;

/// Errors from constructing engines, analyzing segments or validating a block.
///
/// Per-sample and per-block processing never fails once a block has been
/// validated; these cover the discrete success/failure points only.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RestoreError {
    /// The sample rate has no equalization table.
    #[error("unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    /// LPC order outside `1..=max`.
    #[error("invalid LPC order {order} (must be 1..={max})")]
    InvalidOrder {
        /// Requested order.
        order: usize,
        /// Largest supported order.
        max: usize,
    },

    /// Analysis segment shorter than `order + 1` samples.
    #[error("segment too short: need {needed} samples, got {got}")]
    SegmentTooShort {
        /// Minimum length.
        needed: usize,
        /// Supplied length.
        got: usize,
    },

    /// Zero-energy segment (autocorrelation r[0] <= 0).
    #[error("silent segment: autocorrelation has no energy")]
    SilentSegment,

    /// Prediction error energy went non-positive during the recursion.
    #[error("unstable segment: prediction error vanished at step {step}")]
    UnstableSegment {
        /// Levinson-Durbin step (0-based) that failed.
        step: usize,
    },

    /// Configuration rejected at construction or block start.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input and output slices of different lengths.
    #[error("buffer size mismatch: expected {expected}, got {got}")]
    BufferMismatch {
        /// Length of the first input slice.
        expected: usize,
        /// Length of the mismatching slice.
        got: usize,
    },

    /// Block longer than the maximum declared at construction.
    #[error("block of {got} samples exceeds the maximum of {max}")]
    BlockTooLarge {
        /// Declared maximum block length.
        max: usize,
        /// Supplied block length.
        got: usize,
    },
}

/// Result type for restoration operations.
pub type RestoreResult<T> = Result<T, RestoreError>;
