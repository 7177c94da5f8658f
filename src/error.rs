use thiserror::Error;

use crate::config::ConfigError;

/// Fatal invocation failures. Everything else (a user with a bad time zone, a
/// single event whose synthesis failed, one user's manifest upload failing) is
/// logged and isolated to its own scope, never propagated up here.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("Failed to read user settings: {0}")]
    DataAccess(#[from] diesel::result::Error),
}
