//! Create invoice use case.

use std::sync::Arc;

use invoicer_domain::InvoicePayload;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthSession;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::InvoiceApi;

/// Use case for creating one invoice synchronously.
#[derive(Clone)]
pub struct CreateInvoice {
    session: AuthSession,
    api: Arc<dyn InvoiceApi>,
}

impl CreateInvoice {
    /// Creates a new `CreateInvoice` use case.
    #[must_use]
    pub fn new(session: AuthSession, api: Arc<dyn InvoiceApi>) -> Self {
        Self { session, api }
    }

    /// Submits `payload` and returns the service's answer.
    ///
    /// # Errors
    /// - `ApplicationError::AuthenticationRequired` without a stored session
    /// - `ApplicationError::SessionExpired` if the server answered 401
    /// - `ApplicationError::Http` for other failures
    pub async fn execute(&self, payload: InvoicePayload) -> ApplicationResult<Value> {
        if !self.session.credentials().await.is_authenticated() {
            return Err(ApplicationError::AuthenticationRequired);
        }

        let api = &self.api;
        let payload = &payload;
        let created = self
            .session
            .authorizer()
            .send(api.endpoint(), |auth| async move { api.create(&auth, payload).await })
            .await?;

        info!("invoice created");
        Ok(created)
    }
}
