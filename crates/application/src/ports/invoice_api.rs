//! Invoice service port

use async_trait::async_trait;
use invoicer_domain::{AuthorizedRequest, InvoicePage, InvoicePayload, SearchParams};
use serde_json::Value;

/// Errors returned by authorized API calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HttpClientError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Status text or error body.
        message: String,
    },

    /// The request never produced a response.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

impl HttpClientError {
    /// The HTTP status, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::ConnectionFailed(_) | Self::InvalidBody(_) => None,
        }
    }

    /// Returns true for a 401 answer.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}

/// Port for the invoice service.
#[async_trait]
pub trait InvoiceApi: Send + Sync {
    /// URL of the invoice collection, used by the authorization gate.
    fn endpoint(&self) -> &str;

    /// Lists one page of invoices.
    async fn list(
        &self,
        auth: &AuthorizedRequest,
        params: &SearchParams,
    ) -> Result<InvoicePage, HttpClientError>;

    /// Creates an invoice synchronously and returns the service's answer.
    async fn create(
        &self,
        auth: &AuthorizedRequest,
        payload: &InvoicePayload,
    ) -> Result<Value, HttpClientError>;
}
