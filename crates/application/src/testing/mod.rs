//! In-memory fakes for the application ports.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use invoicer_domain::{
    ApiError, AuthError, AuthorizedRequest, Grant, InvoicePage, InvoicePayload, Membership,
    SearchParams, TokenResponse, UserData, UserProfile,
};
use serde_json::Value;

use crate::ports::{
    Clock, HttpClientError, InvoiceApi, KeyValueStore, MembershipApi, StorageError, StorageWrite,
    TokenEndpoint,
};

/// A clock that only moves when told to.
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub const fn at(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap()
    }
}

/// Key/value store backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
    batches: AtomicUsize,
}

impl MemoryKv {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        let kv = Self::default();
        {
            let mut map = kv.entries.lock().unwrap();
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
        }
        kv
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk unavailable")));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.value(key))
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        self.check()?;
        let map = self.entries.lock().unwrap();
        Ok(keys.iter().map(|key| map.get(*key).cloned()).collect())
    }

    async fn apply(&self, batch: &[StorageWrite]) -> Result<(), StorageError> {
        self.check()?;
        let mut map = self.entries.lock().unwrap();
        for write in batch {
            match write {
                StorageWrite::Set { key, value } => {
                    map.insert(key.clone(), value.clone());
                }
                StorageWrite::Remove { key } => {
                    map.remove(key);
                }
            }
        }
        self.batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Token endpoint answering from a queue of canned results.
#[derive(Default)]
pub struct ScriptedTokens {
    replies: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    grants: Mutex<Vec<Grant>>,
    delay: Option<Duration>,
}

impl ScriptedTokens {
    pub fn replying(replies: Vec<Result<TokenResponse, AuthError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.grants.lock().unwrap().len()
    }

    pub fn grants(&self) -> Vec<Grant> {
        self.grants.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenEndpoint for ScriptedTokens {
    async fn exchange(&self, grant: &Grant) -> Result<TokenResponse, AuthError> {
        self.grants.lock().unwrap().push(grant.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(AuthError::Transport {
                    status: None,
                    message: "no scripted reply".to_string(),
                })
            })
    }
}

/// Membership service returning a fixed answer.
pub struct ScriptedMembership {
    reply: Result<UserProfile, ApiError>,
    seen_tokens: Mutex<Vec<String>>,
}

impl ScriptedMembership {
    pub fn org(token: &str) -> Self {
        Self::replying(Ok(UserProfile {
            data: Some(UserData {
                memberships: Some(vec![Membership {
                    token: Some(token.to_string()),
                    organisation_id: Some("org-1".to_string()),
                }]),
            }),
        }))
    }

    pub fn no_memberships() -> Self {
        Self::replying(Ok(UserProfile {
            data: Some(UserData {
                memberships: Some(Vec::new()),
            }),
        }))
    }

    pub fn replying(reply: Result<UserProfile, ApiError>) -> Self {
        Self {
            reply,
            seen_tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn seen_tokens(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl MembershipApi for ScriptedMembership {
    async fn current_user(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        self.seen_tokens
            .lock()
            .unwrap()
            .push(access_token.to_string());
        self.reply.clone()
    }
}

/// A successful token response.
pub fn token_response(access: &str, refresh: &str, expires_in: u64) -> TokenResponse {
    TokenResponse {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_in,
        scope: Some("openid".to_string()),
        token_type: Some("Bearer".to_string()),
    }
}

/// Invoice service returning fixed answers and recording calls.
pub struct FakeInvoices {
    list_reply: Result<InvoicePage, HttpClientError>,
    create_reply: Result<Value, HttpClientError>,
    listed: Mutex<Vec<(AuthorizedRequest, SearchParams)>>,
    created: Mutex<Vec<(AuthorizedRequest, InvoicePayload)>>,
}

impl FakeInvoices {
    pub fn listing(reply: Result<InvoicePage, HttpClientError>) -> Self {
        Self {
            list_reply: reply,
            create_reply: Ok(Value::Null),
            listed: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn creating(reply: Result<Value, HttpClientError>) -> Self {
        Self {
            create_reply: reply,
            ..Self::listing(Ok(InvoicePage::default()))
        }
    }

    pub fn listed(&self) -> Vec<(AuthorizedRequest, SearchParams)> {
        self.listed.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(AuthorizedRequest, InvoicePayload)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl InvoiceApi for FakeInvoices {
    fn endpoint(&self) -> &str {
        "https://api.example.com/invoice-service/1.0.0/invoices"
    }

    async fn list(
        &self,
        auth: &AuthorizedRequest,
        params: &SearchParams,
    ) -> Result<InvoicePage, HttpClientError> {
        self.listed
            .lock()
            .unwrap()
            .push((auth.clone(), params.clone()));
        self.list_reply.clone()
    }

    async fn create(
        &self,
        auth: &AuthorizedRequest,
        payload: &InvoicePayload,
    ) -> Result<Value, HttpClientError> {
        self.created
            .lock()
            .unwrap()
            .push((auth.clone(), payload.clone()));
        self.create_reply.clone()
    }
}
