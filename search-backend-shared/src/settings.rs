//! Typed view of the geocoder configuration document.
//!
//! Only the sections that describe the search backend are modelled. Any
//! other key in the document is ignored on deserialization.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::engine::Protocol;

/// Port assumed for legacy hosts that do not name one.
pub const DEFAULT_BACKEND_PORT: u16 = 9200;

/// The configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Backend connection section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbclient: Option<DbClientSettings>,
    /// Legacy connection section, kept raw. It is only interpreted when the
    /// legacy client or the host fallback needs it; see [`Settings::legacy_client`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub esclient: Option<Value>,
    /// Index layout section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaSettings>,
}

impl Settings {
    /// The configured index name, if the `schema` section names one.
    pub fn index_name(&self) -> Option<&str> {
        self.schema.as_ref().map(|schema| schema.index_name.as_str())
    }

    /// The raw `dbclient.engine` literal, if present.
    pub fn engine_literal(&self) -> Option<&str> {
        self.dbclient
            .as_ref()
            .and_then(|dbclient| dbclient.engine.as_deref())
    }

    /// Decode the `esclient` section.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - If the document has no `esclient` section
    /// * `Ok(Some(settings))` - The decoded legacy settings
    /// * `Err(e)` - If the section cannot be read as legacy settings
    pub fn legacy_client(&self) -> Result<Option<LegacyClientSettings>, serde_json::Error> {
        self.esclient
            .as_ref()
            .map(LegacyClientSettings::deserialize)
            .transpose()
    }
}

/// The `dbclient` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbClientSettings {
    /// Engine literal. Kept as a string so the selector can ignore values it
    /// does not recognise instead of failing to decode the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Backend nodes. Only the first one is used to build an endpoint.
    #[serde(default)]
    pub hosts: Vec<HostSpec>,
}

/// A single backend node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    #[serde(default)]
    pub protocol: Protocol,
    pub host: String,
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_BACKEND_PORT
}

/// Read a port written as an integer, an integral float such as `9200.0`, or
/// a numeric string such as `"9200"`.
pub fn parse_port(text: &str) -> Option<u16> {
    let text = text.trim();
    if let Ok(port) = text.parse::<u16>() {
        return Some(port);
    }
    text.parse::<f64>().ok().and_then(port_from_f64)
}

fn port_from_f64(value: f64) -> Option<u16> {
    (value.is_finite() && value.fract() == 0.0 && (0.0..=u16::MAX as f64).contains(&value))
        .then(|| value as u16)
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    struct PortVisitor;

    impl<'de> Visitor<'de> for PortVisitor {
        type Value = u16;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a port number between 0 and 65535")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<u16, E> {
            u16::try_from(value)
                .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<u16, E> {
            u16::try_from(value)
                .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<u16, E> {
            port_from_f64(value)
                .ok_or_else(|| E::invalid_value(de::Unexpected::Float(value), &self))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<u16, E> {
            parse_port(value).ok_or_else(|| E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(PortVisitor)
}

impl HostSpec {
    pub fn new(protocol: Protocol, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol,
            host: host.into(),
            port,
        }
    }

    /// Read a host written as an address string, as legacy client configs
    /// allow: `localhost`, `localhost:9200` or `https://search.internal:9243`.
    pub fn from_address(address: &str) -> Option<Self> {
        let address = address.trim().trim_end_matches('/');
        let (protocol, authority) = match address.split_once("://") {
            Some(("http", rest)) => (Protocol::Http, rest),
            Some(("https", rest)) => (Protocol::Https, rest),
            Some(_) => return None,
            None => (Protocol::default(), address),
        };

        // [::1]:9200, [::1], host:9200 or host
        let (host, port) = if let Some(rest) = authority.strip_prefix('[') {
            let (host, tail) = rest.split_once(']')?;
            match tail.strip_prefix(':') {
                Some(port) => (host, parse_port(port)?),
                None if tail.is_empty() => (host, DEFAULT_BACKEND_PORT),
                None => return None,
            }
        } else {
            match authority.split_once(':') {
                Some((host, port)) => (host, parse_port(port)?),
                None => (authority, DEFAULT_BACKEND_PORT),
            }
        };

        (!host.trim().is_empty()).then(|| Self::new(protocol, host, port))
    }
}

/// A legacy host entry: either a host object or an address string.
#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyHost {
    Spec(HostSpec),
    Address(String),
}

fn deserialize_legacy_hosts<'de, D>(deserializer: D) -> Result<Vec<HostSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<LegacyHost>::deserialize(deserializer)?
        .into_iter()
        .map(|host| match host {
            LegacyHost::Spec(spec) => Ok(spec),
            LegacyHost::Address(address) => HostSpec::from_address(&address).ok_or_else(|| {
                de::Error::custom(format!("invalid host address {:?}", address))
            }),
        })
        .collect()
}

/// The `schema` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSettings {
    /// Index whose existence gates startup.
    pub index_name: String,
}

/// Request timeout as it appears in legacy configuration: either a number of
/// milliseconds or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestTimeout {
    Millis(u64),
    Text(String),
}

impl RequestTimeout {
    /// The timeout as a duration, or `None` when the text is not a number.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Millis(ms) => Some(Duration::from_millis(*ms)),
            Self::Text(text) => text.trim().parse().ok().map(Duration::from_millis),
        }
    }
}

/// The legacy `esclient` section.
///
/// It is passed to the legacy client constructor unmodified, so options this
/// crate does not interpret are kept in [`LegacyClientSettings::extra`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyClientSettings {
    #[serde(default, deserialize_with = "deserialize_legacy_hosts")]
    pub hosts: Vec<HostSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<RequestTimeout>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LegacyClientSettings {
    /// Legacy settings that only carry a host list.
    pub fn from_hosts(hosts: Vec<HostSpec>) -> Self {
        Self {
            hosts,
            ..Self::default()
        }
    }
}
