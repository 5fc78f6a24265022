//! WAV file I/O for the phono restoration tools.
//!
//! Recordings are handled as two planar `f32` channels:
//!
//! - [`read_wav_stereo`] decodes float or integer PCM, duplicating mono
//! - [`write_wav_stereo`] encodes to 32-bit float or 16/24-bit PCM
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phono_io::{Encoding, read_wav_stereo, write_wav_stereo};
//!
//! let (samples, info) = read_wav_stereo("side_a.wav")?;
//! println!("{} frames at {} Hz", samples.len(), info.sample_rate);
//!
//! write_wav_stereo("side_a_copy.wav", &samples, info.sample_rate, Encoding::Float32)?;
//! # Ok::<(), phono_io::Error>(())
//! ```

mod wav;

pub use wav::{Encoding, SourceInfo, StereoSamples, read_wav_info, read_wav_stereo, write_wav_stereo};

/// Error types for audio file operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// The file's sample layout is not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Left and right channels of different lengths.
    #[error("Channel length mismatch: left {left}, right {right}")]
    ChannelMismatch {
        /// Left channel length.
        left: usize,
        /// Right channel length.
        right: usize,
    },

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio file operations.
pub type Result<T> = std::result::Result<T, Error>;
