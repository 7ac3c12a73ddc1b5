//! # Search Backend Check
//!
//! Startup gate for the geocoder's search backend.
//!
//! The crate validates the shape of the configuration document, selects the
//! backend it describes, and confirms that the configured index exists before
//! the rest of the system starts serving traffic.

pub mod errors;
pub mod schema;
pub mod validator;

pub use errors::{CheckError, ValidationError};
pub use schema::{SchemaError, Violation};
pub use validator::{validate, ConfigValidator};

use std::fs;
use std::path::Path;

use serde_json::Value;

/// Environment variable naming the configuration file read by the binary.
pub const CONFIG_PATH_VAR: &str = "SEARCH_BACKEND_CONFIG";

/// Configuration file used when `SEARCH_BACKEND_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Read and parse a JSON configuration document.
///
/// # Returns
///
/// * `Ok(Value)` - The parsed document
/// * `Err(CheckError::Io)` - If the file cannot be read
/// * `Err(CheckError::Parse)` - If the file is not valid JSON
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, CheckError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| CheckError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| CheckError::Parse {
        path: path.display().to_string(),
        source,
    })
}
