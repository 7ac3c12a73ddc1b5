//! Startup validation.
//!
//! A validation run moves through these states:
//!
//! ```text
//! Unvalidated -> ShapeChecked -> Failed(Schema)
//!                             -> Passed -> IndexConfirmed
//!                                       -> Failed(IndexNotFound)
//!                                       -> Failed(Transport)
//! ```
//!
//! Every run builds its own client and performs exactly one existence check.
//! Nothing is cached between runs and nothing is retried.

use search_backend_repository::{BackendEnvironment, BackendSelector, ClientFactory};
use search_backend_shared::Settings;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::errors::{ValidationError, REMEDIATION_HINT};
use crate::schema;

/// Gates startup on a well-formed configuration and an existing index.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidator<F = BackendSelector> {
    factory: F,
}

impl ConfigValidator<BackendSelector> {
    /// Validator that selects backends with the given environment overrides.
    pub fn new(environment: BackendEnvironment) -> Self {
        Self::with_factory(BackendSelector::new(environment))
    }

    /// Validator that reads its overrides from the process environment.
    pub fn from_env() -> Self {
        Self::with_factory(BackendSelector::from_env())
    }
}

impl<F: ClientFactory> ConfigValidator<F> {
    /// Validator that obtains clients from a custom factory.
    pub fn with_factory(factory: F) -> Self {
        Self { factory }
    }

    /// Validate a configuration document.
    ///
    /// 1. Checks the document shape; no client is built if this fails.
    /// 2. Builds a client through the factory.
    /// 3. Checks once that `schema.indexName` exists on the backend.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document is valid and the index exists
    /// * `Err(ValidationError::Schema)` - On the first shape violation
    /// * `Err(ValidationError::Configuration)` - If no backend can be resolved
    /// * `Err(ValidationError::Transport)` - If the existence check failed
    /// * `Err(ValidationError::IndexNotFound)` - If the index is missing
    #[instrument(skip_all)]
    pub async fn validate(&self, config: &Value) -> Result<(), ValidationError> {
        schema::check(config)?;

        let settings = Settings::deserialize(config).map_err(|e| {
            ValidationError::configuration(format!("invalid configuration: {}", e))
        })?;
        let index = settings
            .index_name()
            .ok_or_else(|| ValidationError::configuration("schema.indexName is not set"))?;

        debug!(index = %index, "Configuration shape is valid");

        let client = self
            .factory
            .create_client(&settings)
            .map_err(|e| ValidationError::client_creation(index, e))?;

        match client.index_exists(index).await {
            Ok(true) => {
                debug!(index = %index, engine = %client.engine(), "Index exists");
                Ok(())
            }
            Ok(false) => {
                error!(
                    index = %index,
                    engine = %client.engine(),
                    endpoint = %client.endpoint(),
                    "{} index {} does not exist; {}",
                    client.engine(),
                    index,
                    REMEDIATION_HINT
                );
                Err(ValidationError::IndexNotFound {
                    engine: client.engine(),
                    index: index.to_string(),
                })
            }
            Err(e) => {
                error!(
                    index = %index,
                    engine = %client.engine(),
                    endpoint = %client.endpoint(),
                    error = %e,
                    "Failed to check whether {} index {} exists; check that the backend is reachable and {}",
                    client.engine(),
                    index,
                    REMEDIATION_HINT
                );
                Err(ValidationError::Transport {
                    index: index.to_string(),
                    source: e,
                })
            }
        }
    }
}

/// Validate a configuration document with a selector built from `environment`.
pub async fn validate(
    config: &Value,
    environment: &BackendEnvironment,
) -> Result<(), ValidationError> {
    ConfigValidator::new(environment.clone())
        .validate(config)
        .await
}
