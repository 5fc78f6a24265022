//! CLI command implementations.

pub mod controls;
pub mod process;
pub mod scan;
pub mod settings;
