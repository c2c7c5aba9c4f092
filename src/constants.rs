// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you how the adapter
//! talks to the remote service and how long it remembers what it heard.

// ---------------------------------------------------------------------------
// Remote API boundaries
// ---------------------------------------------------------------------------

/// Version segment of every API URL.
pub const API_VERSION: &str = "0.4";

/// Host template for the per-account API. `{account}` is replaced with the
/// account short name.
pub const API_HOST_TEMPLATE: &str = "https://{account}.example-cms.com/api/{version}/";

/// The remote service authenticates with the API key as the user name and a
/// fixed placeholder as the password.
pub const API_AUTH_PASSWORD: &str = "x";

/// Object storage prefix that file attachments are served from. The stored
/// filename of a file is appended verbatim.
pub const FILE_STORAGE_BASE_URL: &str = "https://example-cms.s3.amazonaws.com/";

// ---------------------------------------------------------------------------
// Response cache
// ---------------------------------------------------------------------------

/// Namespace prepended to every cache key.
pub const CACHE_KEY_PREFIX: &str = "cms:";

/// Default lifetime of a cached response, in seconds.
///
/// Cached entries are "temporary": the remote content changes while an
/// administrator works through a migration, so five minutes is enough to
/// serve repeated wizard and import runs without going stale for long.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Number of responses kept by the in-memory cache.
pub const MEMORY_CACHE_CAPACITY: usize = 256;

/// Directory name used below the user cache directory.
pub const CACHE_DIR_NAME: &str = "cms-migrate-source";

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Message recorded when a failed response carries no readable `error` field.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Maximum characters shown when previewing response bodies in logs.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Operator environment
// ---------------------------------------------------------------------------

/// Environment variable holding the account short name.
pub const ACCOUNT_ENV_VAR: &str = "CMS_ACCOUNT";

/// Environment variable holding the API key. Keys are never accepted as
/// command-line arguments.
pub const API_KEY_ENV_VAR: &str = "CMS_API_KEY";

/// Log file written in the system temp directory.
pub const LOG_FILE_NAME: &str = "cms-migrate-source.log";
