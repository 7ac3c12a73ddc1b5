//! Engine and protocol enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The search engine a client talks to.
///
/// Both engines speak the same wire protocol for the operations used here.
/// Elasticsearch is the legacy engine and the fallback when nothing selects
/// OpenSearch explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// OpenSearch, the engine operators are expected to opt into.
    OpenSearch,
    /// Elasticsearch, kept for deployments that have not migrated yet.
    #[default]
    Elasticsearch,
}

impl EngineKind {
    /// The literal used for this engine in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenSearch => "opensearch",
            Self::Elasticsearch => "elasticsearch",
        }
    }

    /// Human readable product name, used in log lines and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenSearch => "OpenSearch",
            Self::Elasticsearch => "Elasticsearch",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a string does not name a known engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search engine: {0}")]
pub struct UnknownEngine(pub String);

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "opensearch" => Ok(Self::OpenSearch),
            "elasticsearch" => Ok(Self::Elasticsearch),
            other => Err(UnknownEngine(other.to_string())),
        }
    }
}

/// URL scheme used to reach a backend node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
