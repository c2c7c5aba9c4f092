// src/api/client.rs
//! The stateful API client.
//!
//! Remote problems never surface as `Err` from the data accessors. A call
//! that produced no data returns `None` and leaves an [`ApiFailure`] behind,
//! readable until the next call starts.

use super::cache::{cache_key, NullCache, ResponseCache};
use super::commands::{Command, RequestParams};
use super::envelope::{extract_error_message, extract_payload};
use super::transport::{HttpTransport, Transport};
use crate::error::{ApiErrorCode, ApiFailure, AppError};
use crate::types::Credentials;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;

/// Client for one account of the remote content service.
pub struct ApiClient {
    credentials: Credentials,
    transport: Box<dyn Transport>,
    cache: Arc<dyn ResponseCache>,
    last_error: Mutex<Option<ApiFailure>>,
}

impl ApiClient {
    /// Creates a client talking HTTPS to the account's API, without caching.
    pub fn new(credentials: Credentials) -> Result<Self, AppError> {
        let transport = HttpTransport::new(&credentials)?;
        Ok(Self::with_transport(credentials, transport))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(credentials: Credentials, transport: impl Transport + 'static) -> Self {
        Self {
            credentials,
            transport: Box::new(transport),
            cache: Arc::new(NullCache),
            last_error: Mutex::new(None),
        }
    }

    /// Routes responses through a host-owned cache.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// API root every command is appended to, always ending in `/`.
    pub fn base_url(&self) -> &str {
        self.credentials.base_url().as_str()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Issues one command and returns the raw body of a successful response.
    ///
    /// A cached body is returned without contacting the network. Only HTTP
    /// 200 bodies are cached. Failures are recorded before being returned.
    pub fn request(&self, command: Command, params: &RequestParams) -> Result<String, ApiFailure> {
        self.clear_error();

        let key = cache_key(self.base_url(), command, params);
        if let Some(body) = self.cache.get(&key) {
            log::debug!("Cache hit for {} ({})", command, key);
            return Ok(body);
        }
        log::debug!("Cache miss for {} ({})", command, key);

        let url = format!("{}{}", self.base_url(), command.as_str());
        match self.transport.post_form(&url, params) {
            Ok(response) if response.status == StatusCode::OK => {
                self.cache.set(&key, &response.body);
                Ok(response.body)
            }
            Ok(response) => Err(self.record(ApiFailure {
                command,
                code: ApiErrorCode::from_http_status(response.status.as_u16()),
                message: extract_error_message(&response.body),
            })),
            Err(e) => Err(self.record(ApiFailure {
                command,
                code: ApiErrorCode::Transport,
                message: e.to_string(),
            })),
        }
    }

    /// Issues one command and returns its decoded payload, if any.
    pub fn fetch(&self, command: Command, params: &RequestParams) -> Option<Value> {
        let body = self.request(command, params).ok()?;
        let payload = extract_payload(&body, command.payload_property());
        if payload.is_none() {
            log::debug!("{} returned no data", command);
        }
        payload
    }

    /// The failure left by the most recent call, if it failed.
    pub fn last_error(&self) -> Option<ApiFailure> {
        self.last_error.lock().clone()
    }

    pub fn error_code(&self) -> Option<ApiErrorCode> {
        self.last_error.lock().as_ref().map(|failure| failure.code)
    }

    pub fn error_message(&self) -> Option<String> {
        self.last_error
            .lock()
            .as_ref()
            .map(|failure| failure.message.clone())
    }

    fn clear_error(&self) {
        *self.last_error.lock() = None;
    }

    fn record(&self, failure: ApiFailure) -> ApiFailure {
        log::warn!("{}", failure);
        *self.last_error.lock() = Some(failure.clone());
        failure
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url())
            .field("last_error", &self.last_error())
            .finish()
    }
}
