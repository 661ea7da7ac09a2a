//! Invoice service payloads
//!
//! Invoice bodies are passed through untouched; only the listing
//! parameters and paging envelope are modelled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{DomainError, DomainResult};

/// Header asking the invoice service to process a create synchronously.
pub const OPERATION_MODE_HEADER: &str = "Operation-Mode";

/// Value of [`OPERATION_MODE_HEADER`] used for creates.
pub const OPERATION_MODE_SYNC: &str = "SYNC";

/// Sort direction of an invoice listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ordering {
    /// Oldest / smallest first.
    Ascending,
    /// Newest / largest first.
    #[default]
    Descending,
}

impl Ordering {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ordering {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" | "ASCENDING" => Ok(Self::Ascending),
            "DESC" | "DESCENDING" => Ok(Self::Descending),
            other => Err(DomainError::InvalidSearchParam(format!(
                "unknown ordering: {other}"
            ))),
        }
    }
}

/// Query parameters of an invoice listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// 1-based page number.
    pub page_num: u32,
    /// Records per page.
    pub page_size: u32,
    /// Sort field, e.g. `CREATED_DATE`.
    pub sort_by: String,
    /// Sort direction.
    pub ordering: Ordering,
    /// Free-text filter; omitted when empty.
    pub keyword: Option<String>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            page_num: 1,
            page_size: 10,
            sort_by: "CREATED_DATE".to_string(),
            ordering: Ordering::Descending,
            keyword: None,
        }
    }
}

impl SearchParams {
    /// Checks page bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if the page number or size is zero.
    pub fn validate(&self) -> DomainResult<()> {
        if self.page_num == 0 {
            return Err(DomainError::InvalidSearchParam(
                "pageNum starts at 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(DomainError::InvalidSearchParam(
                "pageSize must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Query string pairs in wire order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageNum", self.page_num.to_string()),
            ("pageSize", self.page_size.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("ordering", self.ordering.to_string()),
        ];
        if let Some(keyword) = self.keyword.as_ref().filter(|k| !k.is_empty()) {
            pairs.push(("keyword", keyword.clone()));
        }
        pairs
    }
}

/// Paging envelope of an invoice listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paging {
    /// Total matching records.
    pub total_records: u64,
    /// Records per page.
    pub page_size: u32,
    /// Current page, 1-based.
    pub page_num: u32,
    /// Number of pages.
    pub total_pages: u32,
}

/// One page of invoices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoicePage {
    /// Invoice records, passed through as JSON.
    #[serde(default)]
    pub data: Vec<Value>,
    /// Paging information, when the service reports it.
    #[serde(default)]
    pub paging: Option<Paging>,
}

/// An invoice to create, passed through as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePayload(Value);

impl InvoicePayload {
    /// Wraps a JSON invoice.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is a JSON object.
    pub fn new(value: Value) -> DomainResult<Self> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidInvoice(
                "invoice must be a JSON object".to_string(),
            ))
        }
    }

    /// The wrapped invoice.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Request body of the create call: `{"invoices": [invoice]}`.
    #[must_use]
    pub fn request_body(&self) -> Value {
        json!({ "invoices": [self.0] })
    }
}
