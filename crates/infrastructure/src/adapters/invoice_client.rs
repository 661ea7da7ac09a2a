//! Invoice service client.

use async_trait::async_trait;
use invoicer_application::ports::{HttpClientError, InvoiceApi};
use invoicer_domain::invoice::{OPERATION_MODE_HEADER, OPERATION_MODE_SYNC};
use invoicer_domain::{ApiConfig, AuthorizedRequest, InvoicePage, InvoicePayload, SearchParams};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::http::{error_message, map_error};

/// Invoice service adapter using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestInvoiceApi {
    client: Client,
    invoices_url: Url,
}

impl ReqwestInvoiceApi {
    /// Creates a client for the invoice collection at `invoices_url`.
    #[must_use]
    pub const fn new(client: Client, invoices_url: Url) -> Self {
        Self {
            client,
            invoices_url,
        }
    }

    /// Creates a client from the resolved configuration.
    #[must_use]
    pub fn from_config(client: Client, config: &ApiConfig) -> Self {
        Self::new(client, config.invoices_url().clone())
    }

    fn authorized(builder: RequestBuilder, auth: &AuthorizedRequest) -> RequestBuilder {
        auth.headers()
            .into_iter()
            .fold(builder, |builder, (name, value)| builder.header(name, value))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, HttpClientError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| map_error(&e))?;
        if !status.is_success() {
            return Err(HttpClientError::Status {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }
        serde_json::from_str(&text).map_err(|e| HttpClientError::InvalidBody(e.to_string()))
    }
}

#[async_trait]
impl InvoiceApi for ReqwestInvoiceApi {
    fn endpoint(&self) -> &str {
        self.invoices_url.as_str()
    }

    async fn list(
        &self,
        auth: &AuthorizedRequest,
        params: &SearchParams,
    ) -> Result<InvoicePage, HttpClientError> {
        let mut url = self.invoices_url.clone();
        url.query_pairs_mut().extend_pairs(params.query_pairs());

        let response = Self::authorized(self.client.get(url), auth)
            .send()
            .await
            .map_err(|e| map_error(&e))?;
        Self::decode(response).await
    }

    async fn create(
        &self,
        auth: &AuthorizedRequest,
        payload: &InvoicePayload,
    ) -> Result<Value, HttpClientError> {
        let response = Self::authorized(self.client.post(self.invoices_url.clone()), auth)
            .header(OPERATION_MODE_HEADER, OPERATION_MODE_SYNC)
            .json(&payload.request_body())
            .send()
            .await
            .map_err(|e| map_error(&e))?;
        Self::decode(response).await
    }
}
