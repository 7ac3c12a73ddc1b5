//! Shape validation of the configuration document.
//!
//! The walker reports the first violated rule only. Rules are evaluated in a
//! fixed order: top-level sections (`dbclient`, then `schema`), then
//! `dbclient.engine`, `dbclient.hosts` and each host in index order, then
//! `schema.indexName`. Keys the schema does not govern are ignored.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

/// The only engine literal accepted in `dbclient.engine`.
pub const ACCEPTED_ENGINES: &[&str] = &["opensearch"];

/// Accepted values of `dbclient.hosts[].protocol`.
pub const ACCEPTED_PROTOCOLS: &[&str] = &["http", "https"];

pub const MIN_PORT: i64 = 1;
pub const MAX_PORT: i64 = 65535;

/// The nature of a schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Required,
    NotObject,
    NotArray,
    NotString,
    NotNumber,
    NotInteger,
    Empty,
    TooFewItems(usize),
    BelowMinimum(i64),
    AboveMaximum(i64),
    NotAllowed(&'static [&'static str]),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::NotObject => f.write_str("must be of type object"),
            Self::NotArray => f.write_str("must be an array"),
            Self::NotString => f.write_str("must be a string"),
            Self::NotNumber => f.write_str("must be a number"),
            Self::NotInteger => f.write_str("must be an integer"),
            Self::Empty => f.write_str("is not allowed to be empty"),
            Self::TooFewItems(min) => write!(f, "must contain at least {} items", min),
            Self::BelowMinimum(min) => write!(f, "must be greater than or equal to {}", min),
            Self::AboveMaximum(max) => write!(f, "must be less than or equal to {}", max),
            Self::NotAllowed([only]) => write!(f, "must be [{}]", only),
            Self::NotAllowed(allowed) => write!(f, "must be one of [{}]", allowed.join(", ")),
        }
    }
}

/// The first rule a configuration document violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("\"{path}\" {violation}")]
pub struct SchemaError {
    /// Field path, e.g. `dbclient.hosts[0].port`.
    pub path: String,
    pub violation: Violation,
}

impl SchemaError {
    pub fn new(path: impl Into<String>, violation: Violation) -> Self {
        Self {
            path: path.into(),
            violation,
        }
    }
}

/// Check the shape of a configuration document.
///
/// Pure and synchronous; performs no I/O.
pub fn check(document: &Value) -> Result<(), SchemaError> {
    let root = document
        .as_object()
        .ok_or_else(|| SchemaError::new("value", Violation::NotObject))?;

    let dbclient = required_object(root, "dbclient", "dbclient")?;
    let schema = required_object(root, "schema", "schema")?;

    allowed_string(dbclient, "engine", "dbclient.engine", ACCEPTED_ENGINES)?;
    check_hosts(dbclient)?;

    non_empty_string(schema, "indexName", "schema.indexName")?;

    Ok(())
}

fn check_hosts(dbclient: &Map<String, Value>) -> Result<(), SchemaError> {
    let hosts = match dbclient.get("hosts") {
        None => return Err(SchemaError::new("dbclient.hosts", Violation::Required)),
        Some(Value::Array(hosts)) => hosts,
        Some(_) => return Err(SchemaError::new("dbclient.hosts", Violation::NotArray)),
    };

    if hosts.is_empty() {
        return Err(SchemaError::new("dbclient.hosts", Violation::TooFewItems(1)));
    }

    for (position, host) in hosts.iter().enumerate() {
        let path = format!("dbclient.hosts[{}]", position);
        let host = host
            .as_object()
            .ok_or_else(|| SchemaError::new(path.as_str(), Violation::NotObject))?;

        allowed_string(
            host,
            "protocol",
            &format!("{}.protocol", path),
            ACCEPTED_PROTOCOLS,
        )?;
        non_empty_string(host, "host", &format!("{}.host", path))?;
        port(host, &format!("{}.port", path))?;
    }

    Ok(())
}

fn required_object<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, SchemaError> {
    match parent.get(key) {
        None => Err(SchemaError::new(path, Violation::Required)),
        Some(Value::Object(object)) => Ok(object),
        Some(_) => Err(SchemaError::new(path, Violation::NotObject)),
    }
}

fn allowed_string(
    parent: &Map<String, Value>,
    key: &str,
    path: &str,
    allowed: &'static [&'static str],
) -> Result<(), SchemaError> {
    match parent.get(key) {
        None => Err(SchemaError::new(path, Violation::Required)),
        Some(Value::String(value)) if allowed.contains(&value.as_str()) => Ok(()),
        Some(_) => Err(SchemaError::new(path, Violation::NotAllowed(allowed))),
    }
}

fn non_empty_string(parent: &Map<String, Value>, key: &str, path: &str) -> Result<(), SchemaError> {
    match parent.get(key) {
        None => Err(SchemaError::new(path, Violation::Required)),
        Some(Value::String(value)) if value.trim().is_empty() => {
            Err(SchemaError::new(path, Violation::Empty))
        }
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(SchemaError::new(path, Violation::NotString)),
    }
}

/// Ports may be written as numbers or as numeric strings; `"9200"` and
/// `9200.0` are both the integer 9200.
fn port(host: &Map<String, Value>, path: &str) -> Result<(), SchemaError> {
    let value = match host.get("port") {
        None => return Err(SchemaError::new(path, Violation::Required)),
        Some(Value::Number(number)) => match (number.as_i64(), number.as_u64()) {
            (Some(value), _) => value,
            (None, Some(_)) => i64::MAX,
            (None, None) => integral(number.as_f64(), path)?,
        },
        Some(Value::String(text)) => {
            let parsed = text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| SchemaError::new(path, Violation::NotNumber))?;
            integral(Some(parsed), path)?
        }
        Some(_) => return Err(SchemaError::new(path, Violation::NotNumber)),
    };

    if value < MIN_PORT {
        return Err(SchemaError::new(path, Violation::BelowMinimum(MIN_PORT)));
    }
    if value > MAX_PORT {
        return Err(SchemaError::new(path, Violation::AboveMaximum(MAX_PORT)));
    }

    Ok(())
}

fn integral(value: Option<f64>, path: &str) -> Result<i64, SchemaError> {
    match value {
        Some(value) if value.is_finite() && value.fract() == 0.0 => {
            Ok(value.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
        }
        _ => Err(SchemaError::new(path, Violation::NotInteger)),
    }
}
