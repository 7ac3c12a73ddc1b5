//! Backend endpoint descriptor.

use std::fmt;

use search_backend_shared::HostSpec;
use url::Url;

use crate::errors::SearchBackendError;

/// A `protocol://host:port` endpoint.
///
/// Endpoints are derived on every client creation and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    /// Format an endpoint from a configured host.
    ///
    /// A blank or unparseable host name is a configuration error; nothing is
    /// sent to the network here.
    pub fn from_host(host: &HostSpec) -> Result<Self, SearchBackendError> {
        let name = host.host.trim();
        if name.is_empty() {
            return Err(SearchBackendError::configuration(
                "invalid node host: host name is blank",
            ));
        }

        // IPv6 literals need brackets in a URL authority.
        let name = if name.contains(':') && !name.starts_with('[') {
            format!("[{}]", name)
        } else {
            name.to_string()
        };
        let endpoint = format!("{}://{}:{}", host.protocol, name, host.port);

        Url::parse(&endpoint).map_err(|e| {
            SearchBackendError::configuration(format!("invalid node host {:?}: {}", host.host, e))
        })?;

        Ok(Self(endpoint))
    }

    /// Accept an explicit node URL, e.g. one provided by the environment.
    ///
    /// The URL must be absolute, use `http` or `https`, and name a host.
    pub fn parse(raw: &str) -> Result<Self, SearchBackendError> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|e| {
            SearchBackendError::configuration(format!("invalid node URL {:?}: {}", raw, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchBackendError::configuration(format!(
                "invalid node URL {:?}: unsupported scheme {}",
                raw,
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(SearchBackendError::configuration(format!(
                "invalid node URL {:?}: missing host",
                raw
            )));
        }

        Ok(Self(raw.trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the endpoint for use by a transport.
    pub fn to_url(&self) -> Result<Url, SearchBackendError> {
        Url::parse(&self.0).map_err(|e| SearchBackendError::connection(e.to_string()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
