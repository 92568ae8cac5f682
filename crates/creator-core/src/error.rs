//! Error types for scaffolding operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad class of a [`CreatorError`], used by front ends to pick an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad user input, caught before anything touches the file system
    Input,
    /// A protected file already exists and no overwrite choice was made
    Collision,
    /// The file system refused an operation
    Environment,
    /// A bundled template is broken
    Template,
}

#[derive(Debug, Error)]
pub enum CreatorError {
    #[error("invalid {what} '{value}': {reason}")]
    InvalidIdentifier {
        what: &'static str,
        value: String,
        reason: String,
    },

    #[error("missing required parameter '{0}'")]
    MissingParameter(String),

    #[error("the `--overwrite` and `--no-overwrite` flags cannot be used together")]
    ConflictingFlags,

    #[error("No command path provided.")]
    EmptyCommandPath,

    #[error("Incomplete command path '{path}'. Available: {}", .available.join(", "))]
    IncompleteCommand {
        path: String,
        available: Vec<String>,
    },

    #[error("Invalid command path segment: '{segment}'. Available: {}", .available.join(", "))]
    UnknownCommand {
        segment: String,
        available: Vec<String>,
    },

    #[error("Unknown parameters: {}", .0.join(", "))]
    UnknownParameters(Vec<String>),

    #[error("parameter '{name}' must be a {expected}")]
    InvalidParameter { name: String, expected: &'static str },

    #[error("Cannot override routing keys: {}", .0.join(", "))]
    RoutingKeyOverride(Vec<String>),

    #[error("{0}")]
    InvalidDestination(String),

    #[error(
        "{} already exists and is protected; re-run with --overwrite or --no-overwrite",
        .path.display()
    )]
    DestinationConflict { path: PathBuf },

    #[error("unresolved placeholder in template '{template}': {detail}")]
    UnresolvedPlaceholder { template: String, detail: String },

    #[error("failed to render template '{template}'")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("failed to write {}", .path.display())]
    Materialization {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template store: {0}")]
    TemplateStore(String),

    #[error("invalid manifest for template root '{root}'")]
    Manifest {
        root: String,
        #[source]
        source: serde_yaml::Error,
    },
}

impl CreatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidIdentifier { .. }
            | Self::MissingParameter(_)
            | Self::ConflictingFlags
            | Self::EmptyCommandPath
            | Self::IncompleteCommand { .. }
            | Self::UnknownCommand { .. }
            | Self::InvalidParameter { .. }
            | Self::UnknownParameters(_)
            | Self::RoutingKeyOverride(_)
            | Self::InvalidDestination(_) => ErrorCategory::Input,
            Self::DestinationConflict { .. } => ErrorCategory::Collision,
            Self::Materialization { .. } => ErrorCategory::Environment,
            Self::UnresolvedPlaceholder { .. }
            | Self::Render { .. }
            | Self::TemplateStore(_)
            | Self::Manifest { .. } => ErrorCategory::Template,
        }
    }

    /// True when the invocation ended through a collision-policy rejection
    pub fn is_rejection(&self) -> bool {
        self.category() == ErrorCategory::Collision
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Materialization {
            path: path.into(),
            source,
        }
    }

    /// Full message including the chain of sources
    pub fn full_message(&self) -> String {
        let mut msg = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            msg.push_str(&format!("\n{}", cause));
            source = cause.source();
        }
        msg
    }
}

pub type Result<T, E = CreatorError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_rejection() {
        let err = CreatorError::DestinationConflict {
            path: PathBuf::from("plugins/filter/my_filter.py"),
        };
        assert!(err.is_rejection());
        assert!(err.to_string().contains("plugins/filter/my_filter.py"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            CreatorError::ConflictingFlags.category(),
            ErrorCategory::Input
        );
        let io_err = CreatorError::io("x", io::Error::other("disk full"));
        assert_eq!(io_err.category(), ErrorCategory::Environment);
        assert!(io_err.full_message().contains("disk full"));
    }

    #[test]
    fn test_unknown_parameters_message() {
        let err = CreatorError::UnknownParameters(vec!["bogus".to_string()]);
        assert_eq!(err.to_string(), "Unknown parameters: bogus");
    }
}
