//! # Search Backend Repository
//!
//! This crate decides which search backend the geocoder talks to and provides
//! the client used to reach it. It includes the error type, the client
//! capability and factory traits, the backend selector, and a concrete client
//! built on the OpenSearch Rust client.

pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod selector;

pub use errors::SearchBackendError;
pub use interfaces::{ClientFactory, SearchBackendClient};
pub use opensearch::BackendClient;
pub use selector::{
    create_client, resolve_backend, BackendConfig, BackendEnvironment, BackendSelector, Endpoint,
};
