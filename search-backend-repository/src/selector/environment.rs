//! Environment overrides consumed by the backend selector.

/// Flag that selects OpenSearch when the configuration does not name an engine.
pub const PELIAS_OPENSEARCH_VAR: &str = "PELIAS_OPENSEARCH";

/// Alias of [`PELIAS_OPENSEARCH_VAR`].
pub const USE_OPENSEARCH_VAR: &str = "USE_OPENSEARCH";

/// Explicit node URL that takes precedence over configured hosts.
pub const OPENSEARCH_URL_VAR: &str = "OPENSEARCH_URL";

/// Snapshot of the environment variables the selector honours.
///
/// Resolution never reads the process environment itself; callers build this
/// value once (usually with [`BackendEnvironment::from_env`]) and pass it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendEnvironment {
    /// Select OpenSearch when no engine is configured.
    pub use_opensearch: bool,
    /// Node URL overriding the configured hosts.
    pub opensearch_url: Option<String>,
}

impl BackendEnvironment {
    /// Read the overrides from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `PELIAS_OPENSEARCH`: `true`, `1` or `yes` (any case) selects OpenSearch
    /// - `USE_OPENSEARCH`: alias; either flag being set is enough
    /// - `OPENSEARCH_URL`: node URL, e.g. `http://localhost:9200`
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build the overrides from arbitrary key/value pairs.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut environment = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                PELIAS_OPENSEARCH_VAR | USE_OPENSEARCH_VAR => {
                    environment.use_opensearch |= is_truthy(value.as_ref())
                }
                OPENSEARCH_URL_VAR => {
                    let url = value.as_ref().trim();
                    environment.opensearch_url = (!url.is_empty()).then(|| url.to_string());
                }
                _ => {}
            }
        }
        environment
    }

    /// Set the OpenSearch flag.
    pub fn with_opensearch(mut self, enabled: bool) -> Self {
        self.use_opensearch = enabled;
        self
    }

    /// Set the node URL override.
    pub fn with_opensearch_url(mut self, url: impl Into<String>) -> Self {
        self.opensearch_url = Some(url.into());
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
