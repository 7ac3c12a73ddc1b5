//! Interface definitions for the search backend.
//!
//! This module defines the abstract `SearchBackendClient` capability and the
//! `ClientFactory` seam that allow swappable backends and mock clients.

mod client_factory;
mod search_backend_client;

pub use client_factory::ClientFactory;
pub use search_backend_client::SearchBackendClient;
