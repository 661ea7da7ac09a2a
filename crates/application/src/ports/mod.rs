//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod invoice_api;
mod key_value_store;
mod membership_api;
mod token_endpoint;

pub use clock::Clock;
pub use invoice_api::{HttpClientError, InvoiceApi};
pub use key_value_store::{KeyValueStore, StorageError, StorageWrite};
pub use membership_api::MembershipApi;
pub use token_endpoint::TokenEndpoint;
