// src/api/mod.rs
//! Remote content service interaction.
//!
//! This module keeps I/O (transport), caching, envelope decoding and typed
//! access apart. Business logic depends on [`ContentRepository`], never on
//! HTTP details.

pub mod cache;
pub mod client;
mod commands;
pub mod envelope;
mod resources;
pub mod transport;

use crate::error::ApiFailure;
use crate::model::{Collection, File, Page, Project, Template};
use crate::types::{ProjectId, TemplateId};

/// The ability to retrieve one project's content.
///
/// Every method answers `None` when nothing could be fetched; the reason, if
/// there was one, is available from [`ContentRepository::last_failure`].
pub trait ContentRepository {
    fn project(&self, id: &ProjectId) -> Option<Project>;
    fn template(&self, id: &TemplateId) -> Option<Template>;
    fn pages_of(&self, project: &ProjectId) -> Option<Collection<Page>>;
    fn files_of(&self, project: &ProjectId) -> Option<Collection<File>>;

    /// Why the most recent call returned nothing.
    fn last_failure(&self) -> Option<ApiFailure>;
}

impl ContentRepository for ApiClient {
    fn project(&self, id: &ProjectId) -> Option<Project> {
        self.get_project(id)
    }

    fn template(&self, id: &TemplateId) -> Option<Template> {
        self.get_template(id)
    }

    fn pages_of(&self, project: &ProjectId) -> Option<Collection<Page>> {
        self.get_pages_by_project(project)
    }

    fn files_of(&self, project: &ProjectId) -> Option<Collection<File>> {
        self.get_files_by_project(project)
    }

    fn last_failure(&self) -> Option<ApiFailure> {
        self.last_error()
    }
}

// Re-export the public interface
pub use cache::{cache_key, DiskCache, MemoryCache, NullCache, ResponseCache};
pub use client::ApiClient;
pub use commands::{Command, RequestParams};
pub use transport::{HttpTransport, RawResponse, Transport};
