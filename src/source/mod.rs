// src/source/mod.rs
//! The source adapter a host migration pipeline pulls rows from.
//!
//! All remote calls happen while the source is built. After that the
//! snapshot is read-only and iteration is pure in-memory work.

mod cursor;
mod row;
mod schema;
mod snapshot;

pub use cursor::{flatten, CursorState, RowCursor};
pub use row::{Row, RowValue};
pub use schema::{extract_fields, PAGE_FIELDS};
pub use snapshot::Snapshot;

use crate::api::{ApiClient, ContentRepository};
use crate::types::{ProjectId, TemplateId};
use indexmap::IndexMap;
use std::fmt;

/// Field holding the page's last change; hosts use it to skip rows they
/// already imported.
pub const HIGHWATER_FIELD: &str = "updated_at";

/// What a host migration framework needs from a source.
///
/// `Display` gives the descriptor used to identify the source in logs.
pub trait MigrateSource: fmt::Display {
    /// Mappable field names with human labels.
    fn fields(&self) -> IndexMap<String, String>;

    fn compute_count(&self) -> usize;

    /// Restarts iteration from the first row.
    fn perform_rewind(&mut self);

    /// The next row, or `None` when the sequence is exhausted.
    fn next_row(&mut self) -> Option<Row>;

    fn highwater_field(&self) -> Option<&'static str> {
        Some(HIGHWATER_FIELD)
    }
}

/// Pages of one project, optionally narrowed to one template.
#[derive(Debug, Clone)]
pub struct ProjectSource {
    base_url: String,
    cursor: RowCursor,
}

impl ProjectSource {
    /// Builds the snapshot through the client.
    pub fn new(client: &ApiClient, project_id: &ProjectId, template_id: Option<&TemplateId>) -> Self {
        Self::from_repository(client.base_url(), client, project_id, template_id)
    }

    pub fn from_repository<R>(
        base_url: &str,
        repo: &R,
        project_id: &ProjectId,
        template_id: Option<&TemplateId>,
    ) -> Self
    where
        R: ContentRepository + ?Sized,
    {
        Self::from_snapshot(base_url, Snapshot::build(repo, project_id, template_id))
    }

    pub fn from_snapshot(base_url: &str, snapshot: Snapshot) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cursor: RowCursor::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.cursor.snapshot()
    }

    pub fn cursor(&self) -> &RowCursor {
        &self.cursor
    }
}

impl MigrateSource for ProjectSource {
    fn fields(&self) -> IndexMap<String, String> {
        extract_fields(self.snapshot().template())
    }

    fn compute_count(&self) -> usize {
        self.cursor.count()
    }

    fn perform_rewind(&mut self) {
        self.cursor.reset();
    }

    fn next_row(&mut self) -> Option<Row> {
        self.cursor.next_row()
    }
}

impl fmt::Display for ProjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        write!(f, "{}/{}", self.base_url, snapshot.project_id())?;
        if let Some(template) = snapshot.template() {
            write!(f, "/{}", template.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, Project};
    use serde_json::json;

    fn source() -> ProjectSource {
        let project: Project = serde_json::from_value(json!({"id": 1, "name": "Site"})).unwrap();
        let pages: Vec<Page> = (1..=3)
            .map(|id| serde_json::from_value(json!({"id": id, "project_id": 1})).unwrap())
            .collect();
        ProjectSource::from_snapshot(
            "https://acme.example-cms.com/api/0.4/",
            Snapshot::from_parts(project, None, pages, vec![]),
        )
    }

    #[test]
    fn compute_count_leaves_rows_to_read() {
        let mut source = source();
        assert_eq!(source.compute_count(), 3);

        source.perform_rewind();
        let mut read = 0;
        while source.next_row().is_some() {
            read += 1;
        }
        assert_eq!(read, 3);
        assert_eq!(source.compute_count(), 3);
    }

    #[test]
    fn descriptor_trims_trailing_slash() {
        assert_eq!(source().to_string(), "https://acme.example-cms.com/api/0.4/1");
    }
}
