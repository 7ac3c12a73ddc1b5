//! OpenSearch implementation of the search backend client.
//!
//! This module provides the concrete `SearchBackendClient` built on the
//! OpenSearch Rust client.

mod client;

pub use client::BackendClient;
