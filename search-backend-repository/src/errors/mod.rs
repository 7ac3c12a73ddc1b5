//! Error types for the search backend repository.

mod search_backend_error;

pub use search_backend_error::SearchBackendError;
