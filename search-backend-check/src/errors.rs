//! Error types for startup validation.

use search_backend_repository::SearchBackendError;
use search_backend_shared::EngineKind;
use thiserror::Error;

use crate::schema::SchemaError;

/// Remediation shown to operators when the index is missing or unreachable.
pub const REMEDIATION_HINT: &str =
    "create the index with the schema tool before starting the geocoder";

/// Errors that fail a validation run. All of them are fatal to startup.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// The document does not have the required shape.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Connection information is missing or cannot be decoded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The existence check itself failed.
    #[error(
        "Failed to check whether index {index} exists: {source}; check that the backend is reachable and {}",
        REMEDIATION_HINT
    )]
    Transport {
        index: String,
        #[source]
        source: SearchBackendError,
    },

    /// The backend answered and the index is not there.
    #[error("{engine} index {index} does not exist; {}", REMEDIATION_HINT)]
    IndexNotFound { engine: EngineKind, index: String },
}

impl ValidationError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Map a failure to build a client. Selector configuration errors stay
    /// configuration errors; anything else is reported against the index.
    pub fn client_creation(index: &str, error: SearchBackendError) -> Self {
        match error {
            SearchBackendError::ConfigurationError(msg) => Self::Configuration(msg),
            source => Self::Transport {
                index: index.to_string(),
                source,
            },
        }
    }
}

/// Errors raised by the `search-backend-check` binary.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration was loaded but failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Violation;
    use std::error::Error as _;

    #[test]
    fn test_schema_error_message_is_transparent() {
        let err = ValidationError::from(SchemaError::new("dbclient", Violation::Required));
        assert_eq!(err.to_string(), "\"dbclient\" is required");
    }

    #[test]
    fn test_index_not_found_message() {
        let err = ValidationError::IndexNotFound {
            engine: EngineKind::OpenSearch,
            index: "places".to_string(),
        };
        let message = err.to_string();

        assert!(message.starts_with("OpenSearch index places does not exist"));
        assert!(message.contains("schema tool"));
    }

    #[test]
    fn test_transport_keeps_original_error() {
        let err = ValidationError::Transport {
            index: "places".to_string(),
            source: SearchBackendError::transport("connection refused"),
        };

        assert!(err.to_string().contains("places"));
        assert!(err.to_string().contains("connection refused"));
        assert!(err.to_string().ends_with(REMEDIATION_HINT));
        assert_eq!(
            err.source().map(|source| source.to_string()),
            Some("Transport error: connection refused".to_string())
        );
    }

    #[test]
    fn test_client_creation_mapping() {
        let err = ValidationError::client_creation(
            "places",
            SearchBackendError::configuration("no OpenSearch node configured"),
        );
        assert!(matches!(err, ValidationError::Configuration(_)));

        let err = ValidationError::client_creation(
            "places",
            SearchBackendError::connection("tls backend unavailable"),
        );
        assert!(matches!(err, ValidationError::Transport { .. }));
    }
}
