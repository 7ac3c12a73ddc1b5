//! Client factory trait definition.

use search_backend_shared::Settings;

use crate::errors::SearchBackendError;
use crate::interfaces::SearchBackendClient;

/// Produces a fresh backend handle from a configuration document.
///
/// The selector is the production implementation; tests inject factories that
/// hand out mock clients.
pub trait ClientFactory: Send + Sync {
    /// Build a new handle for the backend described by `settings`.
    ///
    /// # Returns
    ///
    /// * `Ok(Box<dyn SearchBackendClient>)` - A handle owned by the caller
    /// * `Err(SearchBackendError::ConfigurationError)` - If no backend can be
    ///   resolved from `settings`
    fn create_client(
        &self,
        settings: &Settings,
    ) -> Result<Box<dyn SearchBackendClient>, SearchBackendError>;
}
