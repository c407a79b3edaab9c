//! Error types for appmake
//!
//! All modules use `AppmakeResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for appmake operations
pub type AppmakeResult<T> = Result<T, AppmakeError>;

/// All errors that can occur in appmake
#[derive(Error, Debug)]
pub enum AppmakeError {
    // Configuration errors
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid option `{option}`: {reason}")]
    OptionInvalid { option: String, reason: String },

    #[error("Invalid exclude pattern `{pattern}`: {reason}")]
    InvalidExcludePattern { pattern: String, reason: String },

    // Transform errors
    #[error("Optimizer failed on {path} (exit code {code}): {stderr}")]
    TransformFailed {
        path: PathBuf,
        code: i32,
        stderr: String,
    },

    #[error("Optimizer job for {path} did not complete: {reason}")]
    JobAborted { path: PathBuf, reason: String },

    // Filesystem errors
    #[error("Failed to write cache blob {path}: {source}")]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to replace {path} with optimized output: {source}")]
    AtomicReplace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited with code {code}: {command}")]
    CommandExit { command: String, code: i32 },

    #[error("Process terminated by signal: {0}")]
    ProcessSignaled(String),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl AppmakeError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether the error was raised before any work started
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissing(_)
                | Self::ConfigInvalid { .. }
                | Self::OptionInvalid { .. }
                | Self::InvalidExcludePattern { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigMissing(_) => Some("Run: appmake init, then edit appmake.toml"),
            Self::InvalidExcludePattern { .. } => {
                Some("Exclude patterns are regular expressions, e.g. \"vendor/\" or \"\\.min\\.js$\"")
            }
            Self::CommandFailed { .. } => Some("Check that the tool is installed (npm install?)"),
            Self::CacheWrite { .. } => Some("Check that the cache directory is writable"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = AppmakeError::TransformFailed {
            path: PathBuf::from("static/js/app.js"),
            code: 1,
            stderr: "Unexpected token".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("static/js/app.js"));
        assert!(msg.contains("exit code 1"));
    }

    #[test]
    fn error_hint() {
        let err = AppmakeError::ConfigMissing("`optimize.dir` or `optimize.files`".to_string());
        assert_eq!(err.hint(), Some("Run: appmake init, then edit appmake.toml"));
    }

    #[test]
    fn error_is_configuration() {
        assert!(AppmakeError::ConfigMissing("x".to_string()).is_configuration());
        assert!(!AppmakeError::User("x".to_string()).is_configuration());
    }
}
