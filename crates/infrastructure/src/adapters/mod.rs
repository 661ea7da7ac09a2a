//! Adapters implementing the application ports.

pub mod http;
mod invoice_client;
mod membership_client;
mod system_clock;
mod token_client;

pub use http::{DEFAULT_TIMEOUT, USER_AGENT, build_client};
pub use invoice_client::ReqwestInvoiceApi;
pub use membership_client::ReqwestMembershipApi;
pub use system_clock::SystemClock;
pub use token_client::ReqwestTokenEndpoint;
