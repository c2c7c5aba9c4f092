// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use crate::constants::{API_HOST_TEMPLATE, API_VERSION};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use url::Url;

/// Account short names are used as a DNS label.
static ACCOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("account pattern is valid")
});

/// The account short name that selects the per-account API host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountName(String);

impl AccountName {
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_ascii_lowercase();

        if name.is_empty() {
            return Err(ValidationError::EmptyField("account"));
        }

        if !ACCOUNT_PATTERN.is_match(&name) {
            return Err(ValidationError::InvalidAccount {
                name,
                reason: "only letters, digits and inner hyphens are allowed".to_string(),
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// API key for remote API authentication
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Create a new API key with validation
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into().trim().to_string();

        if key.is_empty() {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot be empty".to_string(),
            });
        }

        if key.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(ValidationError::InvalidApiKey {
                reason: "API key cannot contain whitespace or ':'".to_string(),
            });
        }

        Ok(Self(key))
    }

    /// Get the API key as a string reference
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Redact API key in display
        let visible: String = self.0.chars().take(4).collect();
        write!(f, "{}...", visible)
    }
}

/// Validated URL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    /// Create a new validated URL
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Get the URL as a string
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether requests to this URL go over TLS.
    pub fn is_https(&self) -> bool {
        self.0.scheme() == "https"
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account identifier plus API key, fixed for the lifetime of an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    account: AccountName,
    api_key: ApiKey,
    base_url: ValidatedUrl,
}

impl Credentials {
    /// Credentials for the hosted service, deriving the base URL from the account.
    pub fn new(account: AccountName, api_key: ApiKey) -> Result<Self, ValidationError> {
        let url = API_HOST_TEMPLATE
            .replace("{account}", account.as_str())
            .replace("{version}", API_VERSION);
        let base_url = ValidatedUrl::parse(&url)?;
        Ok(Self {
            account,
            api_key,
            base_url,
        })
    }

    /// Points the credentials at a different API root. A trailing slash is
    /// added so commands can be appended directly.
    pub fn with_base_url(mut self, url: &str) -> Result<Self, ValidationError> {
        let url = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{}/", url)
        };
        self.base_url = ValidatedUrl::parse(&url)?;
        Ok(self)
    }

    pub fn account(&self) -> &AccountName {
        &self.account
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// The API root every command is appended to, always ending in `/`.
    pub fn base_url(&self) -> &ValidatedUrl {
        &self.base_url
    }
}
