//! Control registry and settings persistence for the phono processor.
//!
//! # Features
//!
//! - **Controls**: names, kinds, ranges and defaults of every host control,
//!   and conversion between stored settings and typed processor parameters
//! - **Settings**: flat key/value map persisted as TOML
//! - **Paths**: the default per-user settings location
//!
//! # Example
//!
//! ```rust,no_run
//! use phono_config::{ControlRegistry, Settings, names, settings_path};
//!
//! let registry = ControlRegistry::new();
//! let path = settings_path();
//!
//! let mut settings = Settings::load_or_default(&path).unwrap();
//! registry.set_value(&mut settings, names::DECLICK_ENABLE, 1.0).unwrap();
//! settings.save(&path).unwrap();
//!
//! let params = registry.params_from_settings(&settings);
//! assert!(params.declick.is_some());
//! ```

mod controls;
mod error;
mod settings;

/// Default settings file location.
pub mod paths;

pub use controls::{ControlDescriptor, ControlKind, ControlRegistry, names};
pub use error::ConfigError;
pub use paths::{ensure_parent_dir, resolve_settings_path, settings_path, state_dir};
pub use settings::{Settings, parse_value};
