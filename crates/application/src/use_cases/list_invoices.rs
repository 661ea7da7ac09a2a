//! List invoices use case.

use std::sync::Arc;

use invoicer_domain::{InvoicePage, SearchParams};
use tracing::{debug, warn};

use crate::auth::AuthSession;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::InvoiceApi;

/// Use case for fetching one page of invoices.
#[derive(Clone)]
pub struct ListInvoices {
    session: AuthSession,
    api: Arc<dyn InvoiceApi>,
}

impl ListInvoices {
    /// Creates a new `ListInvoices` use case.
    #[must_use]
    pub fn new(session: AuthSession, api: Arc<dyn InvoiceApi>) -> Self {
        Self { session, api }
    }

    /// Fetches the invoices matching `params`.
    ///
    /// Both an access token and an organisation token must be stored. If
    /// either is missing the session is cleared and the user has to log in.
    ///
    /// # Errors
    /// - `ApplicationError::Domain` for out-of-range paging
    /// - `ApplicationError::AuthenticationRequired` without a full session
    /// - `ApplicationError::SessionExpired` if the server answered 401
    /// - `ApplicationError::Http` for other failures
    pub async fn execute(&self, params: SearchParams) -> ApplicationResult<InvoicePage> {
        params.validate()?;

        let credentials = self.session.credentials().await;
        if !credentials.is_authenticated() || !credentials.has_org_token() {
            warn!("incomplete session, clearing credentials");
            self.session.logout().await;
            return Err(ApplicationError::AuthenticationRequired);
        }

        let api = &self.api;
        let params = &params;
        let page = self
            .session
            .authorizer()
            .send(api.endpoint(), |auth| async move { api.list(&auth, params).await })
            .await?;

        debug!(count = page.data.len(), page = params.page_num, "invoices fetched");
        Ok(page)
    }
}
