//! Phono Core - DSP primitives for vinyl playback and restoration
//!
//! This crate provides the filter kernel and equalization building blocks the
//! restoration engines compose on, designed for real-time processing with
//! zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Filters
//!
//! - [`BiquadCoefficients`] / [`BiquadState`] / [`evaluate`] - Second-order
//!   section with sign-flipped feedback storage
//! - [`highpass_coefficients`], [`lowpass_coefficients`] - First-order shelf
//!   or second-order Butterworth synthesis
//! - [`notch_coefficients`] - RBJ cookbook notch
//!
//! ## Equalization
//!
//! - [`SampleRate`] - The six supported rates and their table index
//! - [`EqualizationTables`] / [`CoefficientTable`] - RIAA and subsonic sections per rate
//! - [`EqualizationChannel`] - Subsonic highpass followed by RIAA de-emphasis
//!
//! ## Utilities
//!
//! - [`RingBuffer`] - Fixed-capacity circular buffer with fill tracking
//! - Level conversions: [`db_to_voltage`], [`voltage_to_db`], [`power_ratio_to_db`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! phono-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use phono_core::{CoefficientTable, EqualizationChannel, SampleRate, SubsonicMode};
//!
//! let table = CoefficientTable::new();
//! let rate = SampleRate::from_hz(48000).expect("supported rate");
//! let mut left = EqualizationChannel::new(*table.get(rate));
//!
//! let out = left.process(0.25, SubsonicMode::SecondOrder, true);
//! assert!(out.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod equalizer;
pub mod math;
pub mod riaa;
pub mod ring_buffer;

pub use biquad::{
    BUTTERWORTH_Q, Biquad, BiquadCoefficients, BiquadState, FilterOrder, evaluate,
    highpass_coefficients, lowpass_coefficients, notch_coefficients,
};
pub use equalizer::{EqualizationChannel, SubsonicMode};
pub use math::{db_to_power_ratio, db_to_voltage, ms_to_samples, power_ratio_to_db, voltage_to_db};
pub use riaa::{CoefficientTable, EqualizationTables, SampleRate, riaa_coefficients};
pub use ring_buffer::RingBuffer;
