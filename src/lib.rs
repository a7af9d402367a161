//! mbackup: a configuration-driven backup orchestrator.
//!
//! Backup models are declared in a TOML file, each bound to a trigger. A run
//! loads the configuration into a fresh [`registry::ModelRegistry`], resolves
//! the requested trigger patterns into an ordered run list, performs each
//! model in turn and folds every model's outcome into one exit status.

pub mod archiver;
pub mod commands;
pub mod config;
mod constants;
pub mod error;
pub mod logging;
pub mod model;
pub mod outcome;
pub mod path;
pub mod registry;
pub mod runner;
pub mod sysexits;
pub mod trigger;
