//! Phono Restore - click detection, declicking and the stereo processor
//!
//! Built on [`phono_core`]'s filter kernel and equalization tables.
//!
//! # Engines
//!
//! - [`ClickDetector`] - streaming median/MAD outlier detector on a
//!   high-pass emphasized signal, one bool per sample
//! - [`DeclickEngine`] - block declicker that finds narrow power bursts and
//!   bridges them with straight lines
//! - [`LpcPredictor`] - autocorrelation + Levinson-Durbin linear predictor
//! - [`StereoProcessor`] - declick, RIAA/subsonic, notch and gain over a
//!   stereo block, with clip and declick meters
//!
//! # Example
//!
//! ```rust
//! use phono_restore::{DeclickConfig, ProcessParams, StereoProcessor};
//!
//! let mut processor = StereoProcessor::new(44100, 4096).expect("supported rate");
//! let params = ProcessParams {
//!     declick: Some(DeclickConfig::default()),
//!     ..ProcessParams::default()
//! };
//!
//! let input = vec![0.0f32; 4096];
//! let mut left = vec![0.0f32; 4096];
//! let mut right = vec![0.0f32; 4096];
//! processor
//!     .process(&params, &input, &input, &mut left, &mut right)
//!     .expect("valid block");
//! assert_eq!(processor.meters().clipped_samples, 0);
//! ```

pub mod click_detector;
pub mod declick;
pub mod error;
pub mod lpc;
pub mod processor;

pub use click_detector::{ClickDetector, ClickDetectorConfig, DetectorState, median};
pub use declick::{DeclickConfig, DeclickEngine, DeclickStats, MAX_CLICK_WIDTH, MIN_BLOCK_LEN};
pub use error::{RestoreError, RestoreResult};
pub use lpc::{LpcPredictor, MAX_ORDER, autocorrelation, levinson_durbin};
pub use processor::{GAIN_MAX_DB, GAIN_MIN_DB, Meters, NotchParams, ProcessParams, StereoProcessor};
