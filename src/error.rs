//! Errors that abort a run before any model is performed.

use crate::sysexits;
use thiserror::Error;

/// A failure while preparing a run.
///
/// Either variant means no model has been performed yet; the binary reports it
/// once and exits with [`sysexits::EX_PREPARE`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    /// Loading the configuration failed. Carries the underlying message.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No registered model matched the requested triggers.
    /// Carries the patterns exactly as given, comma-joined.
    #[error("No Models found for trigger(s) '{0}'")]
    NoModelsFound(String),
}

impl PrepareError {
    /// Wraps any load failure, keeping the full context chain in the message.
    pub fn configuration(err: &anyhow::Error) -> Self {
        Self::Configuration(format!("{err:#}"))
    }

    pub fn no_models_found<S: AsRef<str>>(patterns: &[S]) -> Self {
        let joined = patterns
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        Self::NoModelsFound(joined)
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        sysexits::EX_PREPARE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_configuration_keeps_original_message() {
        let err: anyhow::Result<()> = Err(anyhow!("config load error"));
        let err = err.context("Failed to load config.toml").unwrap_err();
        let prepare = PrepareError::configuration(&err);
        let msg = prepare.to_string();
        assert!(msg.contains("config load error"));
        assert!(msg.contains("Failed to load config.toml"));
    }

    #[test]
    fn test_no_models_found_message() {
        let err = PrepareError::no_models_found(&["trigger_foo"]);
        assert_eq!(err.to_string(), "No Models found for trigger(s) 'trigger_foo'");

        let err = PrepareError::no_models_found(&["a", "test_*"]);
        assert_eq!(err.to_string(), "No Models found for trigger(s) 'a,test_*'");

        let empty: [&str; 0] = [];
        let err = PrepareError::no_models_found(&empty);
        assert_eq!(err.to_string(), "No Models found for trigger(s) ''");
    }

    #[test]
    fn test_exit_code_is_prepare() {
        assert_eq!(PrepareError::Configuration("x".into()).exit_code(), 3);
        assert_eq!(PrepareError::NoModelsFound("x".into()).exit_code(), 3);
    }
}
