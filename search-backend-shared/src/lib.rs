//! # Search Backend Shared
//!
//! Configuration document types shared by the backend selector and the
//! startup validator.

pub mod engine;
pub mod settings;

pub use engine::{EngineKind, Protocol, UnknownEngine};
pub use settings::{
    parse_port, DbClientSettings, HostSpec, LegacyClientSettings, RequestTimeout, SchemaSettings,
    Settings, DEFAULT_BACKEND_PORT,
};
