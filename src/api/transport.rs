// src/api/transport.rs
//! HTTP transport for the remote API.
//!
//! This module provides a thin wrapper around reqwest for posting
//! form-encoded commands. It handles authentication and the raw
//! request/response exchange without caching, decoding or business logic.

use super::commands::RequestParams;
use crate::constants::API_AUTH_PASSWORD;
use crate::error::AppError;
use crate::types::{ApiKey, Credentials};
use reqwest::blocking::Client;
use reqwest::header;
use reqwest::StatusCode;

/// A raw response, body untouched.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: String,
    pub status: StatusCode,
    pub url: String,
}

/// Sends one form-encoded POST and returns whatever came back.
///
/// An `Err` means no HTTP status was received at all.
pub trait Transport: Send + Sync {
    fn post_form(&self, url: &str, params: &RequestParams) -> Result<RawResponse, AppError>;
}

/// A thin wrapper around the blocking reqwest Client for API requests.
pub struct HttpTransport {
    client: Client,
    api_key: ApiKey,
}

impl HttpTransport {
    /// Creates a new HTTP client authenticating with the given credentials.
    ///
    /// Certificates are always verified; the rustls backend has no opt-out
    /// configured here.
    pub fn new(credentials: &Credentials) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers())
            .build()?;
        Ok(Self {
            client,
            api_key: credentials.api_key().clone(),
        })
    }

    /// Creates the default headers for API requests.
    fn create_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, params: &RequestParams) -> Result<RawResponse, AppError> {
        log::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .basic_auth(self.api_key.as_str(), Some(API_AUTH_PASSWORD))
            .header(
                header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(params.form_encoded())
            .send()?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response.text()?;

        log::debug!("{} answered {}", url, status);

        Ok(RawResponse { body, status, url })
    }
}
