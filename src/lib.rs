// src/lib.rs
//! cms-migrate-source: a migration source adapter for a hosted CMS.
//!
//! Pulls one project's pages, templates and files from the remote API,
//! joins them in memory and hands them to a host migration pipeline as
//! flat rows, one page at a time.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ApiFailure`, `ApiErrorCode`, `ValidationError`
//! - **Configuration**: `SourceConfig`, `CommandLineInput`
//! - **Domain types**: `Credentials`, `AccountName`, `ApiKey`, typed IDs
//! - **Domain model**: `Project`, `Template`, `Page`, `File`, `Collection`, etc.
//! - **API client**: `ApiClient`, `ContentRepository`, transports and caches
//! - **Source adapter**: `Snapshot`, `RowCursor`, `Row`, `MigrateSource`
//! - **Mapping**: `MappingConfig`, `SourceField`, row hooks and ID lookups

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod mapping;
pub mod model;
pub mod source;
pub mod types;

// --- Error Handling ---
pub use crate::error::{ApiErrorCode, ApiFailure, AppError, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{Action, CacheSettings, CommandLineInput, SourceConfig};

// --- Domain Types ---
pub use crate::types::{
    AccountName, ApiKey, Credentials, CustomStateId, FileId, GroupId, Id, PageId, ProjectId,
    TemplateId, UserId, ValidatedUrl,
};

// --- Domain Model ---
pub use crate::model::{
    ChoiceOption, Collection, CustomState, Element, ElementKind, FieldConfig, File, FileTransfer,
    Group, Keyed, Page, Project, Tab, Template, User,
};

// --- API Client ---
pub use crate::api::{
    ApiClient, Command, ContentRepository, DiskCache, HttpTransport, MemoryCache, NullCache,
    RawResponse, RequestParams, ResponseCache, Transport,
};

// --- Source Adapter ---
pub use crate::source::{
    extract_fields, CursorState, MigrateSource, ProjectSource, Row, RowCursor, RowValue, Snapshot,
};

// --- Mapping ---
pub use crate::mapping::{
    CachedLookup, DestinationLookup, HookChain, InMemoryIdMap, MappedValue, MappingConfig,
    ParentReferenceHook, RowDisposition, RowHook, SourceField,
};
