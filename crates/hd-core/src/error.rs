//! Error types for hepdata-rs

use thiserror::Error;

/// hepdata-rs error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or emission error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Malformed user-supplied data (shape, length, range, pattern)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Argument of the wrong kind (non-numeric value, wrong object class, unknown option)
    #[error("Type error: {0}")]
    Type(String),

    /// Operation not permitted in the current state of the object
    #[error("State error: {0}")]
    State(String),

    /// Missing, unreadable or oversized file, missing tree or branch
    #[error("Resource error: {0}")]
    Resource(String),

    /// Object lookup in a data source failed
    #[error("Cannot find any object with path '{path}'; available: [{}]", available.join(", "))]
    ObjectNotFound {
        /// Requested path.
        path: String,
        /// Names that could have been meant.
        available: Vec<String>,
    },

    /// External program exited with a non-zero status
    #[error("external command failed: {command}: {stderr}")]
    ExternalTool {
        /// Command line that was run.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The final archive did not pass validation
    #[error("submission archive is not valid ({} problem(s))", messages.len())]
    InvalidSubmission {
        /// Every message reported by the validator.
        messages: Vec<String>,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Shorthand for [`Error::Type`].
    pub fn type_error(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    /// Shorthand for [`Error::Resource`].
    pub fn resource(msg: impl Into<String>) -> Self {
        Error::Resource(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_not_found_lists_candidates() {
        let err = Error::ObjectNotFound {
            path: "canvas/missing".into(),
            available: vec!["hist".into(), "graph".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("canvas/missing"));
        assert!(msg.contains("hist, graph"));
    }

    #[test]
    fn io_errors_convert() {
        fn fails() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(Error::Io(_))));
    }
}
