//! Application use cases (business logic orchestration).

mod create_invoice;
mod list_invoices;

pub use create_invoice::*;
pub use list_invoices::*;
