//! Control registry: names, kinds, ranges and defaults of every host control.
//!
//! The registry is the single bridge between stored [`Settings`] text and the
//! typed [`ProcessParams`] the processor consumes. It is an ordinary value the
//! caller builds once and passes around.
//!
//! # Value rules
//!
//! - Toggle and integer controls round half-up (`(v + 0.5)` truncated) and
//!   clamp to range.
//! - Continuous controls clamp to range.
//! - Non-finite values fall back to the default.
//!
//! # Example
//!
//! ```rust
//! use phono_config::{ControlRegistry, Settings, names};
//!
//! let registry = ControlRegistry::new();
//! let mut settings = Settings::new();
//! settings.set(names::SUBSONIC, "2");
//! settings.set(names::GAIN, "99");
//!
//! let params = registry.params_from_settings(&settings);
//! assert_eq!(params.gain_db, 40.0);
//! assert!(params.riaa_enabled);
//! ```

use phono_core::SubsonicMode;
use phono_restore::{DeclickConfig, NotchParams, ProcessParams};

use crate::error::ConfigError;
use crate::settings::Settings;

/// Control names as seen by hosts and stored in settings files.
pub mod names {
    /// Output gain in dB.
    pub const GAIN: &str = "Gain (dB)";
    /// Subsonic filter selection: 0 off, 1 first order, 2 second order.
    pub const SUBSONIC: &str = "Subsonic Filter";
    /// RIAA de-emphasis on/off.
    pub const RIAA_ENABLE: &str = "RIAA Enable";
    /// Declicker on/off.
    pub const DECLICK_ENABLE: &str = "Declick Enable";
    /// Declick linear threshold.
    pub const SPIKE_THRESHOLD: &str = "Spike RMS Threshold";
    /// Widest repaired click in milliseconds.
    pub const SPIKE_WIDTH: &str = "Spike Width (ms)";
    /// Notch on/off.
    pub const NOTCH_ENABLE: &str = "Notch Filter";
    /// Notch center frequency in Hz.
    pub const NOTCH_FREQUENCY: &str = "Notch Frequency";
    /// Notch quality factor.
    pub const NOTCH_Q: &str = "Notch Q";
    /// Output meter: clipped sample count.
    pub const CLIPPED_SAMPLES: &str = "Clipped Samples";
    /// Output meter: repaired click count.
    pub const DETECTED_CLICKS: &str = "Detected Clicks";
    /// Output meter: mean repaired span in samples.
    pub const AVERAGE_SPIKE_LENGTH: &str = "Average Spike Length";
    /// Output meter: mean spike-to-background ratio in dB.
    pub const AVERAGE_SPIKE_RMS: &str = "Average Spike RMS (dB)";
}

/// How a control's value is interpreted and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// On/off, stored as `yes`/`no`.
    Toggle,
    /// Whole number.
    Integer,
    /// Any value in range.
    Continuous,
    /// Read-only output; never stored.
    Meter,
}

impl ControlKind {
    /// Short lowercase label for listings.
    pub fn label(self) -> &'static str {
        match self {
            ControlKind::Toggle => "toggle",
            ControlKind::Integer => "integer",
            ControlKind::Continuous => "continuous",
            ControlKind::Meter => "meter",
        }
    }
}

/// One control's static description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlDescriptor {
    /// Host-visible name and settings key.
    pub name: &'static str,
    /// Value interpretation.
    pub kind: ControlKind,
    /// Lowest accepted value.
    pub min: f32,
    /// Highest accepted value.
    pub max: f32,
    /// Value used when nothing is stored.
    pub default: f32,
}

impl ControlDescriptor {
    const fn new(name: &'static str, kind: ControlKind, min: f32, max: f32, default: f32) -> Self {
        Self {
            name,
            kind,
            min,
            max,
            default,
        }
    }

    /// True for read-only meters.
    pub fn is_meter(&self) -> bool {
        self.kind == ControlKind::Meter
    }

    /// Rounds and clamps `value` for this control.
    pub fn sanitize(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default;
        }
        let value = match self.kind {
            ControlKind::Toggle | ControlKind::Integer => ((value + 0.5) as i32) as f32,
            ControlKind::Continuous | ControlKind::Meter => value,
        };
        value.clamp(self.min, self.max)
    }

    /// Text stored for `value`, after sanitizing.
    ///
    /// Gain keeps one decimal, integer controls are written as integers and
    /// toggles as `yes`/`no`.
    pub fn format(&self, value: f32) -> String {
        let value = self.sanitize(value);
        match self.kind {
            ControlKind::Toggle => String::from(if value >= 0.5 { "yes" } else { "no" }),
            ControlKind::Integer => format!("{}", value as i32),
            _ if self.name == names::GAIN => format!("{value:.1}"),
            ControlKind::Continuous | ControlKind::Meter => value.to_string(),
        }
    }
}

/// The full control list.
const CONTROLS: [ControlDescriptor; 13] = [
    ControlDescriptor::new(names::GAIN, ControlKind::Continuous, -40.0, 40.0, 0.0),
    ControlDescriptor::new(names::SUBSONIC, ControlKind::Integer, 0.0, 2.0, 0.0),
    ControlDescriptor::new(names::RIAA_ENABLE, ControlKind::Toggle, 0.0, 1.0, 1.0),
    ControlDescriptor::new(names::DECLICK_ENABLE, ControlKind::Toggle, 0.0, 1.0, 0.0),
    ControlDescriptor::new(names::SPIKE_THRESHOLD, ControlKind::Integer, 1.0, 900.0, 150.0),
    ControlDescriptor::new(names::SPIKE_WIDTH, ControlKind::Continuous, 0.1, 10.0, 1.0),
    ControlDescriptor::new(names::NOTCH_ENABLE, ControlKind::Toggle, 0.0, 1.0, 0.0),
    ControlDescriptor::new(names::NOTCH_FREQUENCY, ControlKind::Continuous, 20.0, 20000.0, 50.0),
    ControlDescriptor::new(names::NOTCH_Q, ControlKind::Continuous, 0.1, 100.0, 10.0),
    ControlDescriptor::new(names::CLIPPED_SAMPLES, ControlKind::Meter, 0.0, f32::MAX, 0.0),
    ControlDescriptor::new(names::DETECTED_CLICKS, ControlKind::Meter, 0.0, f32::MAX, 0.0),
    ControlDescriptor::new(names::AVERAGE_SPIKE_LENGTH, ControlKind::Meter, 0.0, f32::MAX, 0.0),
    ControlDescriptor::new(names::AVERAGE_SPIKE_RMS, ControlKind::Meter, -200.0, 200.0, 0.0),
];

/// Every control the processor exposes.
#[derive(Debug, Clone)]
pub struct ControlRegistry {
    controls: Vec<ControlDescriptor>,
}

impl Default for ControlRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlRegistry {
    /// Builds the registry.
    pub fn new() -> Self {
        Self {
            controls: CONTROLS.to_vec(),
        }
    }

    /// All controls, inputs first then meters.
    pub fn controls(&self) -> &[ControlDescriptor] {
        &self.controls
    }

    /// Writable controls only.
    pub fn inputs(&self) -> impl Iterator<Item = &ControlDescriptor> {
        self.controls.iter().filter(|c| !c.is_meter())
    }

    /// Looks up a control by exact name.
    pub fn get(&self, name: &str) -> Option<&ControlDescriptor> {
        self.controls.iter().find(|c| c.name == name)
    }

    /// Looks up a writable control, failing on unknown names and meters.
    pub fn input(&self, name: &str) -> Result<&ControlDescriptor, ConfigError> {
        self.get(name)
            .filter(|c| !c.is_meter())
            .ok_or_else(|| ConfigError::UnknownControl(name.to_string()))
    }

    /// Sanitized value of `name` from `settings`, or its default.
    ///
    /// Unknown names and meters read as 0.
    pub fn value(&self, settings: &Settings, name: &str) -> f32 {
        match self.input(name) {
            Ok(control) => control.sanitize(settings.get_f32(name, control.default)),
            Err(_) => 0.0,
        }
    }

    /// Stores `value` for `name` in the control's text form.
    pub fn set_value(&self, settings: &mut Settings, name: &str, value: f32) -> Result<(), ConfigError> {
        let control = self.input(name)?;
        settings.set(control.name, control.format(value));
        Ok(())
    }

    /// Settings holding every writable control at its default.
    pub fn default_settings(&self) -> Settings {
        let mut settings = Settings::new();
        for control in self.inputs() {
            settings.set(control.name, control.format(control.default));
        }
        settings
    }

    /// Typed processor parameters from stored settings.
    pub fn params_from_settings(&self, settings: &Settings) -> ProcessParams {
        let on = |name| self.value(settings, name) >= 0.5;

        let declick = on(names::DECLICK_ENABLE).then(|| DeclickConfig {
            threshold: self.value(settings, names::SPIKE_THRESHOLD),
            click_width_ms: self.value(settings, names::SPIKE_WIDTH),
        });
        let notch = on(names::NOTCH_ENABLE).then(|| NotchParams {
            frequency: self.value(settings, names::NOTCH_FREQUENCY),
            q: self.value(settings, names::NOTCH_Q),
        });

        ProcessParams {
            gain_db: self.value(settings, names::GAIN),
            subsonic: SubsonicMode::from_control(self.value(settings, names::SUBSONIC)),
            riaa_enabled: on(names::RIAA_ENABLE),
            declick,
            notch,
        }
    }

    /// Settings describing `params`.
    ///
    /// Disabled stages keep their defaults for the dependent controls.
    pub fn settings_from_params(&self, params: &ProcessParams) -> Settings {
        let mut settings = self.default_settings();
        let mut put = |name: &str, value: f32| {
            if let Some(control) = self.get(name) {
                settings.set(control.name, control.format(value));
            }
        };

        put(names::GAIN, params.gain_db);
        put(names::SUBSONIC, f32::from(params.subsonic.to_control()));
        put(names::RIAA_ENABLE, bool_value(params.riaa_enabled));
        put(names::DECLICK_ENABLE, bool_value(params.declick.is_some()));
        if let Some(declick) = &params.declick {
            put(names::SPIKE_THRESHOLD, declick.threshold);
            put(names::SPIKE_WIDTH, declick.click_width_ms);
        }
        put(names::NOTCH_ENABLE, bool_value(params.notch.is_some()));
        if let Some(notch) = &params.notch {
            put(names::NOTCH_FREQUENCY, notch.frequency);
            put(names::NOTCH_Q, notch.q);
        }
        settings
    }
}

fn bool_value(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}
