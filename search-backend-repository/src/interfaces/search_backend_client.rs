//! Search backend client trait definition.
//!
//! This module defines the capability the rest of the system needs from a
//! search backend, independent of which engine sits behind it.

use async_trait::async_trait;
use search_backend_shared::EngineKind;

use crate::errors::SearchBackendError;

/// Abstract handle to a search backend.
///
/// A handle is bound to one engine and one endpoint for its whole life.
/// Callers own the handle they create; nothing in this crate pools or caches
/// handles.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait SearchBackendClient: Send + Sync {
    /// The engine this handle talks to.
    fn engine(&self) -> EngineKind;

    /// The endpoint this handle is bound to, for diagnostics.
    fn endpoint(&self) -> &str;

    /// Check whether an index exists.
    ///
    /// The check is performed exactly once per call; no retries are made.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index to look up
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the backend reports the index
    /// * `Ok(false)` - If the backend reports the index as missing
    /// * `Err(SearchBackendError)` - If the check itself failed
    async fn index_exists(&self, index: &str) -> Result<bool, SearchBackendError>;
}
