//! OpenSearch-crate-backed client implementation.
//!
//! Both engines answer the index-existence request identically, so a single
//! client type serves the OpenSearch endpoint and the legacy configuration.

use std::time::Duration;

use async_trait::async_trait;
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::IndicesExistsParts,
    OpenSearch,
};
use search_backend_shared::{EngineKind, LegacyClientSettings, RequestTimeout};
use tracing::{debug, error, instrument};

use crate::errors::SearchBackendError;
use crate::interfaces::SearchBackendClient;
use crate::selector::{BackendConfig, Endpoint};

/// Client bound to a single backend node.
///
/// # Example
///
/// ```ignore
/// let endpoint = Endpoint::parse("http://localhost:9200")?;
/// let client = BackendClient::from_endpoint(&endpoint)?;
///
/// if !client.index_exists("places").await? {
///     // create the index first
/// }
/// ```
pub struct BackendClient {
    client: OpenSearch,
    engine: EngineKind,
    endpoint: Endpoint,
}

impl BackendClient {
    /// Build a client for a resolved backend.
    pub fn connect(config: &BackendConfig) -> Result<Self, SearchBackendError> {
        match config {
            BackendConfig::Modern(endpoint) => Self::from_endpoint(endpoint),
            BackendConfig::Legacy(settings) => Self::from_legacy_settings(settings),
        }
    }

    /// Create an OpenSearch client for the given endpoint.
    ///
    /// No request is sent; the transport connects lazily.
    ///
    /// # Returns
    ///
    /// * `Ok(BackendClient)` - A new client instance
    /// * `Err(SearchBackendError::ConnectionError)` - If the transport cannot be built
    pub fn from_endpoint(endpoint: &Endpoint) -> Result<Self, SearchBackendError> {
        let client = Self::build_transport(endpoint, None)?;

        Ok(Self {
            client,
            engine: EngineKind::OpenSearch,
            endpoint: endpoint.clone(),
        })
    }

    /// Create a legacy client from the full legacy connection settings.
    ///
    /// The first host is used as the node and `requestTimeout` becomes the
    /// transport timeout. Other options are accepted and logged at debug level.
    ///
    /// # Returns
    ///
    /// * `Ok(BackendClient)` - A new client instance
    /// * `Err(SearchBackendError::ConfigurationError)` - If the settings name no usable host
    /// * `Err(SearchBackendError::ConnectionError)` - If the transport cannot be built
    pub fn from_legacy_settings(settings: &LegacyClientSettings) -> Result<Self, SearchBackendError> {
        let host = settings.hosts.first().ok_or_else(|| {
            SearchBackendError::configuration("no Elasticsearch node configured: esclient.hosts is empty")
        })?;

        if settings.hosts.len() > 1 {
            debug!(
                unused = settings.hosts.len() - 1,
                "Only the first legacy host is used"
            );
        }
        if !settings.extra.is_empty() {
            let options: Vec<&str> = settings.extra.keys().map(String::as_str).collect();
            debug!(?options, "Legacy client options not interpreted by the transport");
        }

        let timeout = settings
            .request_timeout
            .as_ref()
            .and_then(RequestTimeout::as_duration);
        let endpoint = Endpoint::from_host(host)?;
        let client = Self::build_transport(&endpoint, timeout)?;

        Ok(Self {
            client,
            engine: EngineKind::Elasticsearch,
            endpoint,
        })
    }

    fn build_transport(
        endpoint: &Endpoint,
        timeout: Option<Duration>,
    ) -> Result<OpenSearch, SearchBackendError> {
        let conn_pool = SingleNodeConnectionPool::new(endpoint.to_url()?);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchBackendError::connection(e.to_string()))?;

        Ok(OpenSearch::new(transport))
    }
}

#[async_trait]
impl SearchBackendClient for BackendClient {
    fn engine(&self) -> EngineKind {
        self.engine
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Check whether an index exists with a single `HEAD /{index}` request.
    ///
    /// 2xx means present and 404 means absent. Any other status is reported
    /// as a `ResponseError` carrying the status and body.
    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool, SearchBackendError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchBackendError::transport(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            debug!(index = %index, endpoint = %self.endpoint, "Index exists");
            return Ok(true);
        }
        if status.as_u16() == 404 {
            debug!(index = %index, "Index does not exist");
            return Ok(false);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            engine = %self.engine,
            endpoint = %self.endpoint,
            status = %status,
            body = %body,
            "Index existence check failed"
        );
        Err(SearchBackendError::response(status.as_u16(), body))
    }
}
