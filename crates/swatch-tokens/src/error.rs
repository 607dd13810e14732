//! Error types for token set construction and loading.
//!
//! Resolution itself never fails: every failure mode is caught while a
//! [`TokenSet`](crate::TokenSet) is being built or loaded.

use std::path::PathBuf;

use thiserror::Error;

/// A token set violates a construction invariant.
///
/// These indicate a defect in the token definitions, not a runtime
/// condition. They are reported once, at load time, and should abort
/// startup rather than be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The token set defines no tokens at all.
    #[error("token set is empty")]
    Empty,

    /// A token has no unconditional candidate, so some ambient state would
    /// leave it unresolved.
    #[error("token '{token}' has no unconditional fallback candidate")]
    MissingFallback { token: String },

    /// A candidate is ranked below the fallback. The fallback must be the
    /// lowest-priority candidate, and the only unconditional one.
    #[error("token '{token}': candidate at priority {priority} is ranked below the fallback and can never apply")]
    OutrankedCandidate { token: String, priority: u32 },

    /// A conditional candidate holds with no appearance preference and no
    /// capabilities, where the fallback must apply.
    #[error("token '{token}': candidate at priority {priority} applies in the empty ambient state and hides the fallback")]
    ShadowedFallback { token: String, priority: u32 },

    /// Two candidates of one token share a priority.
    #[error("token '{token}' declares priority {priority} more than once")]
    DuplicatePriority { token: String, priority: u32 },

    /// The same token name was declared twice in one set.
    #[error("token '{token}' is declared more than once")]
    DuplicateToken { token: String },

    /// The token name is not a valid custom identifier.
    #[error("invalid token name '{token}': {reason}")]
    InvalidName { token: String, reason: String },

    /// A candidate value is not a single well-formed CSS value.
    #[error("invalid value '{value}' for token '{token}': {reason}")]
    InvalidValue {
        token: String,
        value: String,
        reason: String,
    },
}

/// Error returned when reading token definitions from YAML, CSS, or disk.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML.
    #[error("failed to parse token YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The stylesheet could not be tokenized.
    #[error("failed to parse token CSS: {message}")]
    Css { message: String },

    /// A token entry has the wrong shape.
    #[error("invalid definition for token '{token}': {message}")]
    Definition { token: String, message: String },

    /// The file extension is not one of the supported formats.
    #[error("unsupported token file format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A refresh was requested for a set that was not loaded from a file.
    #[error("cannot refresh: token set has no source file")]
    NoSource,

    /// The definitions parsed but do not form a valid token set.
    #[error(transparent)]
    Config(#[from] ConfigurationError),
}

impl LoadError {
    pub(crate) fn definition(token: &str, message: impl Into<String>) -> Self {
        LoadError::Definition {
            token: token.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fallback_display() {
        let err = ConfigurationError::MissingFallback {
            token: "hover-foreground".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("hover-foreground"));
        assert!(msg.contains("fallback"));
    }

    #[test]
    fn test_duplicate_priority_display() {
        let err = ConfigurationError::DuplicatePriority {
            token: "accent-color".to_string(),
            priority: 100,
        };
        assert_eq!(
            err.to_string(),
            "token 'accent-color' declares priority 100 more than once"
        );
    }

    #[test]
    fn test_fallback_placement_display() {
        let outranked = ConfigurationError::OutrankedCandidate {
            token: "gap".to_string(),
            priority: 3,
        };
        assert!(outranked.to_string().contains("priority 3"));

        let shadowed = ConfigurationError::ShadowedFallback {
            token: "gap".to_string(),
            priority: 10,
        };
        assert!(shadowed.to_string().contains("hides the fallback"));
    }

    #[test]
    fn test_load_error_wraps_configuration_error() {
        let err: LoadError = ConfigurationError::Empty.into();
        assert!(matches!(err, LoadError::Config(ConfigurationError::Empty)));
        assert_eq!(err.to_string(), "token set is empty");
    }

    #[test]
    fn test_io_error_names_path() {
        let err = LoadError::Io {
            path: PathBuf::from("/tmp/tokens.yaml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/tmp/tokens.yaml"));
    }
}
