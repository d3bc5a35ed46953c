//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Specification and pipeline file errors.
///
/// These are fatal before any step runs: a malformed or missing document
/// aborts the run with exit code 2.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Specification parsing error in `{0}`")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("Specification validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("sitewright.json"),
            Error::new(ErrorKind::NotFound, "file not found"),
        );
        let display = format!("{io_err}");
        assert!(display.contains("IO error"));
        assert!(display.contains("sitewright.json"));

        let validation_err = ConfigError::Validation("duplicate collection `posts`".to_string());
        assert!(format!("{validation_err}").contains("duplicate collection"));
    }
}
