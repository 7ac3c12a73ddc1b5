//! Backend selection.
//!
//! Decides which engine to talk to and where it lives, from the configuration
//! document and an explicit [`BackendEnvironment`], and builds a client for it.
//!
//! ## Precedence
//!
//! Engine:
//! 1. `dbclient.engine`, when it names a known engine
//! 2. `PELIAS_OPENSEARCH` (or its alias `USE_OPENSEARCH`)
//! 3. Elasticsearch (legacy)
//!
//! OpenSearch endpoint:
//! 1. `OPENSEARCH_URL`
//! 2. first of `dbclient.hosts`, then first of `esclient.hosts`
//! 3. otherwise a configuration error; there is no default host
//!
//! The `esclient` section is only decoded when one of these paths reads it,
//! so a section the selected backend never consults cannot fail selection.

mod endpoint;
mod environment;

pub use endpoint::Endpoint;
pub use environment::{
    BackendEnvironment, OPENSEARCH_URL_VAR, PELIAS_OPENSEARCH_VAR, USE_OPENSEARCH_VAR,
};

use search_backend_shared::{EngineKind, LegacyClientSettings, Settings};
use tracing::{info, warn};

use crate::errors::SearchBackendError;
use crate::interfaces::{ClientFactory, SearchBackendClient};
use crate::opensearch::BackendClient;

/// Connection parameters resolved for one backend.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    /// Legacy engine: the whole legacy section goes to the client unmodified.
    Legacy(LegacyClientSettings),
    /// OpenSearch at a single endpoint.
    Modern(Endpoint),
}

impl BackendConfig {
    pub fn engine(&self) -> EngineKind {
        match self {
            Self::Legacy(_) => EngineKind::Elasticsearch,
            Self::Modern(_) => EngineKind::OpenSearch,
        }
    }
}

/// Resolve the engine kind.
pub fn resolve_engine(settings: &Settings, environment: &BackendEnvironment) -> EngineKind {
    if let Some(literal) = settings.engine_literal() {
        match literal.parse::<EngineKind>() {
            Ok(engine) => return engine,
            Err(e) => warn!(error = %e, "Ignoring dbclient.engine"),
        }
    }

    if environment.use_opensearch {
        EngineKind::OpenSearch
    } else {
        EngineKind::default()
    }
}

/// Resolve engine and connection parameters without building a client.
///
/// # Returns
///
/// * `Ok(BackendConfig)` - The resolved backend
/// * `Err(SearchBackendError::ConfigurationError)` - If OpenSearch is selected
///   and no endpoint can be derived, or the environment URL is malformed
pub fn resolve_backend(
    settings: &Settings,
    environment: &BackendEnvironment,
) -> Result<BackendConfig, SearchBackendError> {
    match resolve_engine(settings, environment) {
        EngineKind::OpenSearch => resolve_endpoint(settings, environment).map(BackendConfig::Modern),
        EngineKind::Elasticsearch => legacy_settings(settings).map(BackendConfig::Legacy),
    }
}

fn resolve_endpoint(
    settings: &Settings,
    environment: &BackendEnvironment,
) -> Result<Endpoint, SearchBackendError> {
    if let Some(url) = environment.opensearch_url.as_deref() {
        return Endpoint::parse(url);
    }

    if let Some(host) = settings
        .dbclient
        .as_ref()
        .and_then(|dbclient| dbclient.hosts.first())
    {
        return Endpoint::from_host(host);
    }

    match decode_legacy(settings)?.as_ref().and_then(|esclient| esclient.hosts.first()) {
        Some(host) => Endpoint::from_host(host),
        None => Err(SearchBackendError::configuration(format!(
            "no OpenSearch node configured: set {} or provide dbclient.hosts",
            OPENSEARCH_URL_VAR
        ))),
    }
}

fn legacy_settings(settings: &Settings) -> Result<LegacyClientSettings, SearchBackendError> {
    Ok(match (decode_legacy(settings)?, &settings.dbclient) {
        (Some(esclient), _) => esclient,
        (None, Some(dbclient)) => LegacyClientSettings::from_hosts(dbclient.hosts.clone()),
        (None, None) => LegacyClientSettings::default(),
    })
}

fn decode_legacy(settings: &Settings) -> Result<Option<LegacyClientSettings>, SearchBackendError> {
    settings
        .legacy_client()
        .map_err(|e| SearchBackendError::configuration(format!("invalid esclient section: {}", e)))
}

/// Resolve the backend and build a client bound to it.
///
/// Emits one `info` event naming the selected engine and endpoint.
pub fn create_client(
    settings: &Settings,
    environment: &BackendEnvironment,
) -> Result<Box<dyn SearchBackendClient>, SearchBackendError> {
    let config = resolve_backend(settings, environment)?;
    let client = BackendClient::connect(&config)?;

    info!(
        engine = %client.engine(),
        endpoint = %client.endpoint(),
        "Selected search backend"
    );

    Ok(Box::new(client))
}

/// [`ClientFactory`] that resolves backends with [`create_client`].
#[derive(Debug, Clone, Default)]
pub struct BackendSelector {
    environment: BackendEnvironment,
}

impl BackendSelector {
    pub fn new(environment: BackendEnvironment) -> Self {
        Self { environment }
    }

    /// Selector reading its overrides from the process environment.
    pub fn from_env() -> Self {
        Self::new(BackendEnvironment::from_env())
    }

    pub fn environment(&self) -> &BackendEnvironment {
        &self.environment
    }
}

impl ClientFactory for BackendSelector {
    fn create_client(
        &self,
        settings: &Settings,
    ) -> Result<Box<dyn SearchBackendClient>, SearchBackendError> {
        create_client(settings, &self.environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_backend_shared::{DbClientSettings, HostSpec, Protocol};
    use serde_json::json;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory sink for formatted log lines.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    fn settings_with(engine: Option<&str>, hosts: Vec<HostSpec>) -> Settings {
        Settings {
            dbclient: Some(DbClientSettings {
                engine: engine.map(str::to_string),
                hosts,
            }),
            ..Settings::default()
        }
    }

    fn opensearch_host() -> HostSpec {
        HostSpec::new(Protocol::Http, "opensearch", 9200)
    }

    #[test]
    fn test_explicit_engine_wins_over_environment() {
        let settings = settings_with(Some("elasticsearch"), vec![opensearch_host()]);
        let environment = BackendEnvironment::default().with_opensearch(true);

        assert_eq!(
            resolve_engine(&settings, &environment),
            EngineKind::Elasticsearch
        );

        let settings = settings_with(Some("opensearch"), vec![opensearch_host()]);
        assert_eq!(
            resolve_engine(&settings, &BackendEnvironment::default()),
            EngineKind::OpenSearch
        );
    }

    #[test]
    fn test_environment_flag_selects_opensearch() {
        let settings = settings_with(None, vec![opensearch_host()]);
        let environment = BackendEnvironment::default().with_opensearch(true);

        assert_eq!(resolve_engine(&settings, &environment), EngineKind::OpenSearch);
    }

    #[test]
    fn test_unknown_engine_falls_through() {
        let settings = settings_with(Some("solr"), vec![opensearch_host()]);

        assert_eq!(
            resolve_engine(&settings, &BackendEnvironment::default()),
            EngineKind::Elasticsearch
        );
        assert_eq!(
            resolve_engine(
                &settings,
                &BackendEnvironment::default().with_opensearch(true)
            ),
            EngineKind::OpenSearch
        );
    }

    #[test]
    fn test_default_is_legacy() {
        assert_eq!(
            resolve_engine(&Settings::default(), &BackendEnvironment::default()),
            EngineKind::Elasticsearch
        );
    }

    #[test]
    fn test_environment_url_wins_over_hosts() {
        let settings = settings_with(Some("opensearch"), vec![opensearch_host()]);
        let environment =
            BackendEnvironment::default().with_opensearch_url("https://override.internal:9243");

        let config = resolve_backend(&settings, &environment).unwrap();
        assert_eq!(
            config,
            BackendConfig::Modern(Endpoint::parse("https://override.internal:9243").unwrap())
        );
    }

    #[test]
    fn test_first_dbclient_host_is_used() {
        let settings = settings_with(
            Some("opensearch"),
            vec![
                opensearch_host(),
                HostSpec::new(Protocol::Https, "replica", 9243),
            ],
        );

        let config = resolve_backend(&settings, &BackendEnvironment::default()).unwrap();
        match config {
            BackendConfig::Modern(endpoint) => {
                assert_eq!(endpoint.as_str(), "http://opensearch:9200")
            }
            other => panic!("expected modern backend, got {:?}", other),
        }
    }

    #[test]
    fn test_legacy_hosts_used_for_opensearch_when_dbclient_has_none() {
        let settings: Settings = serde_json::from_value(json!({
            "esclient": {
                "hosts": [{ "protocol": "https", "host": "legacy-node", "port": 9243 }]
            }
        }))
        .unwrap();
        let environment = BackendEnvironment::default().with_opensearch(true);

        let config = resolve_backend(&settings, &environment).unwrap();
        assert_eq!(config.engine(), EngineKind::OpenSearch);
        assert_eq!(
            config,
            BackendConfig::Modern(Endpoint::parse("https://legacy-node:9243").unwrap())
        );
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let settings = settings_with(Some("opensearch"), vec![]);

        let err = resolve_backend(&settings, &BackendEnvironment::default()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(OPENSEARCH_URL_VAR));
    }

    #[test]
    fn test_malformed_environment_url_is_configuration_error() {
        let settings = settings_with(Some("opensearch"), vec![opensearch_host()]);
        let environment = BackendEnvironment::default().with_opensearch_url("ftp://nope");

        let err = resolve_backend(&settings, &environment).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_legacy_section_passed_through_unmodified() {
        let settings: Settings = serde_json::from_value(json!({
            "dbclient": { "hosts": [{ "protocol": "http", "host": "ignored", "port": 9200 }] },
            "esclient": {
                "keepAlive": true,
                "requestTimeout": 120000,
                "hosts": [{ "protocol": "http", "host": "legacy", "port": 9200 }]
            }
        }))
        .unwrap();

        let config = resolve_backend(&settings, &BackendEnvironment::default()).unwrap();
        assert_eq!(
            config,
            BackendConfig::Legacy(settings.legacy_client().unwrap().unwrap())
        );
    }

    #[test]
    fn test_unconsulted_esclient_is_not_decoded() {
        let settings: Settings = serde_json::from_value(json!({
            "dbclient": {
                "engine": "opensearch",
                "hosts": [{ "protocol": "http", "host": "opensearch", "port": 9200 }]
            },
            "esclient": { "hosts": "localhost:9200", "requestTimeout": [] }
        }))
        .unwrap();

        let config = resolve_backend(&settings, &BackendEnvironment::default()).unwrap();
        assert_eq!(
            config,
            BackendConfig::Modern(Endpoint::parse("http://opensearch:9200").unwrap())
        );
    }

    #[test]
    fn test_malformed_esclient_on_legacy_path_is_configuration_error() {
        let settings: Settings = serde_json::from_value(json!({
            "dbclient": { "engine": "elasticsearch" },
            "esclient": { "hosts": "localhost:9200" }
        }))
        .unwrap();

        let err = resolve_backend(&settings, &BackendEnvironment::default()).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("esclient"));
    }

    #[test]
    fn test_legacy_string_hosts_resolve() {
        let settings: Settings = serde_json::from_value(json!({
            "esclient": { "hosts": ["localhost:9200"] }
        }))
        .unwrap();

        let config = resolve_backend(
            &settings,
            &BackendEnvironment::default().with_opensearch(true),
        )
        .unwrap();
        assert_eq!(
            config,
            BackendConfig::Modern(Endpoint::parse("http://localhost:9200").unwrap())
        );
    }

    #[test]
    fn test_blank_host_is_configuration_error() {
        let settings = settings_with(
            Some("opensearch"),
            vec![HostSpec::new(Protocol::Http, "  ", 9200)],
        );

        let err = resolve_backend(&settings, &BackendEnvironment::default()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_legacy_settings_derived_from_dbclient() {
        let settings = settings_with(Some("elasticsearch"), vec![opensearch_host()]);

        let config = resolve_backend(&settings, &BackendEnvironment::default()).unwrap();
        assert_eq!(
            config,
            BackendConfig::Legacy(LegacyClientSettings::from_hosts(vec![opensearch_host()]))
        );
    }

    #[tokio::test]
    async fn test_create_client_binds_endpoint() {
        let settings = settings_with(Some("opensearch"), vec![opensearch_host()]);

        let client = create_client(&settings, &BackendEnvironment::default()).unwrap();
        assert_eq!(client.engine(), EngineKind::OpenSearch);
        assert_eq!(client.endpoint(), "http://opensearch:9200");
    }

    #[tokio::test]
    async fn test_create_client_logs_selection() {
        let settings = settings_with(Some("opensearch"), vec![opensearch_host()]);
        let (logs, _guard) = capture_logs();

        create_client(&settings, &BackendEnvironment::default()).unwrap();

        let output = logs.contents();
        assert!(output.contains("INFO"));
        assert!(output.contains("Selected search backend"));
        assert!(output.contains("engine=OpenSearch"));
        assert!(output.contains("endpoint=http://opensearch:9200"));
    }

    #[tokio::test]
    async fn test_selector_factory_creates_legacy_client() {
        let settings = settings_with(None, vec![opensearch_host()]);
        let selector = BackendSelector::new(BackendEnvironment::default());

        let client = selector.create_client(&settings).unwrap();
        assert_eq!(client.engine(), EngineKind::Elasticsearch);
        assert_eq!(client.endpoint(), "http://opensearch:9200");
    }

    #[test]
    fn test_legacy_without_hosts_is_configuration_error() {
        let selector = BackendSelector::default();

        let err = selector.create_client(&Settings::default()).err().unwrap();
        assert!(err.is_configuration());
    }
}
