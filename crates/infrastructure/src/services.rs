//! Wiring of adapters into the application services.

use std::sync::Arc;

use invoicer_application::ports::{HttpClientError, KeyValueStore};
use invoicer_application::{AuthSession, CreateInvoice, ListInvoices};
use invoicer_domain::ApiConfig;
use reqwest::Client;

use crate::adapters::{
    DEFAULT_TIMEOUT, ReqwestInvoiceApi, ReqwestMembershipApi, ReqwestTokenEndpoint, SystemClock,
    build_client,
};

/// Fully wired client services sharing one session.
#[derive(Clone)]
pub struct InvoicerServices {
    /// Login, logout, status and refresh.
    pub session: AuthSession,
    /// Invoice listing.
    pub list_invoices: ListInvoices,
    /// Invoice creation.
    pub create_invoice: CreateInvoice,
}

impl InvoicerServices {
    /// Wires the reqwest adapters for `config` on top of `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(
        config: &ApiConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, HttpClientError> {
        Ok(Self::with_client(build_client(DEFAULT_TIMEOUT)?, config, storage))
    }

    /// Wires the adapters around an existing HTTP client.
    #[must_use]
    pub fn with_client(
        client: Client,
        config: &ApiConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Self {
        let session = AuthSession::new(
            storage,
            Arc::new(ReqwestTokenEndpoint::from_config(client.clone(), config)),
            Arc::new(ReqwestMembershipApi::from_config(client.clone(), config)),
            Arc::new(SystemClock),
            config.refresh_wait(),
        );
        let invoices = Arc::new(ReqwestInvoiceApi::from_config(client, config));

        Self {
            list_invoices: ListInvoices::new(session.clone(), invoices.clone()),
            create_invoice: CreateInvoice::new(session.clone(), invoices),
            session,
        }
    }
}

impl std::fmt::Debug for InvoicerServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvoicerServices")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
