//! Invoicer Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in
//! the application layer: reqwest clients for the token, membership and
//! invoice services, file and in-memory credential storage, the system
//! clock, and configuration from the environment.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod serialization;
pub mod services;

pub use adapters::{
    ReqwestInvoiceApi, ReqwestMembershipApi, ReqwestTokenEndpoint, SystemClock, build_client,
};
pub use config::{ConfigError, EnvConfig};
pub use persistence::{FileKeyValueStore, MemoryKeyValueStore};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
pub use services::InvoicerServices;
