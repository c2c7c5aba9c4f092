// src/source/snapshot.rs
//! The joined, read-only working set of one migration run.

use crate::api::ContentRepository;
use crate::model::{File, Page, Project, Template};
use crate::types::{PageId, ProjectId, TemplateId};
use std::collections::HashMap;

/// Pages of one project, optionally narrowed to one template, with their
/// attachments grouped by page and field.
#[derive(Debug, Clone)]
pub struct Snapshot {
    project_id: ProjectId,
    project: Option<Project>,
    template_id: Option<TemplateId>,
    template: Option<Template>,
    pages: Vec<Page>,
    files: HashMap<PageId, HashMap<String, Vec<File>>>,
}

impl Snapshot {
    /// Fetches and joins everything a run needs. All I/O happens here.
    ///
    /// Nothing in here fails: a missing project, template, page list or
    /// file list narrows the snapshot instead.
    pub fn build<R>(repo: &R, project_id: &ProjectId, template_id: Option<&TemplateId>) -> Self
    where
        R: ContentRepository + ?Sized,
    {
        let mut snapshot = Self::empty(project_id.clone(), template_id.cloned());

        snapshot.project = repo.project(project_id);
        if snapshot.project.is_none() {
            warn_missing(repo, "project", project_id.as_str());
            return snapshot;
        }

        if let Some(template_id) = template_id {
            snapshot.template = repo.template(template_id);
            if snapshot.template.is_none() {
                warn_missing(repo, "template", template_id.as_str());
            }
        }

        snapshot.pages = match (template_id, &snapshot.template) {
            (Some(_), None) => Vec::new(),
            (_, template) => match repo.pages_of(project_id) {
                Some(pages) => filter_by_template(pages.into_vec(), template.as_ref()),
                None => {
                    warn_missing(repo, "pages of project", project_id.as_str());
                    Vec::new()
                }
            },
        };

        match repo.files_of(project_id) {
            Some(files) => snapshot.files = group_files(files),
            None => warn_missing(repo, "files of project", project_id.as_str()),
        }

        log::info!(
            "Snapshot of project {}{}: {} pages, {} pages with attachments",
            project_id,
            template_id
                .map(|id| format!(" (template {})", id))
                .unwrap_or_default(),
            snapshot.pages.len(),
            snapshot.files.len()
        );
        snapshot
    }

    /// Assembles a snapshot from already fetched records.
    pub fn from_parts(
        project: Project,
        template: Option<Template>,
        pages: impl IntoIterator<Item = Page>,
        files: impl IntoIterator<Item = File>,
    ) -> Self {
        let mut snapshot = Self::empty(
            project.id.clone(),
            template.as_ref().map(|t| t.id.clone()),
        );
        snapshot.pages = filter_by_template(pages.into_iter().collect(), template.as_ref());
        snapshot.files = group_files(files);
        snapshot.project = Some(project);
        snapshot.template = template;
        snapshot
    }

    fn empty(project_id: ProjectId, template_id: Option<TemplateId>) -> Self {
        Self {
            project_id,
            project: None,
            template_id,
            template: None,
            pages: Vec::new(),
            files: HashMap::new(),
        }
    }

    /// The project ID the snapshot was requested for.
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// `None` when the project could not be loaded.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// The template filter that was requested, loaded or not.
    pub fn template_id(&self) -> Option<&TemplateId> {
        self.template_id.as_ref()
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Attachments of one field of one page, in the order the service
    /// listed them.
    pub fn files_for(&self, page: &PageId, field: &str) -> Option<&[File]> {
        self.files
            .get(page)
            .and_then(|fields| fields.get(field))
            .map(Vec::as_slice)
    }
}

fn filter_by_template(pages: Vec<Page>, template: Option<&Template>) -> Vec<Page> {
    match template {
        Some(template) => pages
            .into_iter()
            .filter(|page| page.template_id.as_ref() == Some(&template.id))
            .collect(),
        None => pages,
    }
}

fn group_files(files: impl IntoIterator<Item = File>) -> HashMap<PageId, HashMap<String, Vec<File>>> {
    let mut grouped: HashMap<PageId, HashMap<String, Vec<File>>> = HashMap::new();
    for file in files {
        grouped
            .entry(file.page_id.clone())
            .or_default()
            .entry(file.field.clone())
            .or_default()
            .push(file);
    }
    grouped
}

fn warn_missing<R: ContentRepository + ?Sized>(repo: &R, what: &str, id: &str) {
    match repo.last_failure() {
        Some(failure) => log::warn!("No {} {}: {}", what, id, failure),
        None => log::warn!("No {} {}", what, id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiFailure;
    use crate::model::Collection;
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Default)]
    struct Repo {
        project: Option<Project>,
        template: Option<Template>,
        pages: Option<Vec<Page>>,
        files: Option<Vec<File>>,
        page_calls: Cell<usize>,
    }

    impl ContentRepository for Repo {
        fn project(&self, _: &ProjectId) -> Option<Project> {
            self.project.clone()
        }

        fn template(&self, _: &TemplateId) -> Option<Template> {
            self.template.clone()
        }

        fn pages_of(&self, _: &ProjectId) -> Option<Collection<Page>> {
            self.page_calls.set(self.page_calls.get() + 1);
            self.pages.clone().map(Collection::from_iter)
        }

        fn files_of(&self, _: &ProjectId) -> Option<Collection<File>> {
            self.files.clone().map(Collection::from_iter)
        }

        fn last_failure(&self) -> Option<ApiFailure> {
            None
        }
    }

    fn page(id: u32, template_id: u32) -> Page {
        serde_json::from_value(json!({"id": id, "project_id": 1, "template_id": template_id}))
            .unwrap()
    }

    fn file(id: u32, page_id: u32, field: &str) -> File {
        serde_json::from_value(json!({"id": id, "page_id": page_id, "field": field})).unwrap()
    }

    fn repo() -> Repo {
        Repo {
            project: serde_json::from_value(json!({"id": 1, "name": "Site"})).ok(),
            template: serde_json::from_value(json!({"id": 2, "name": "T2"})).ok(),
            pages: Some(vec![page(1, 1), page(2, 2), page(3, 3), page(4, 2), page(5, 2)]),
            files: Some(vec![file(10, 4, "hero"), file(11, 4, "hero"), file(12, 2, "pdf")]),
            ..Repo::default()
        }
    }

    fn ids(snapshot: &Snapshot) -> Vec<&str> {
        snapshot.pages().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn template_filter_keeps_matching_pages_in_order() {
        let project = ProjectId::parse("1").unwrap();
        let template = TemplateId::parse("2").unwrap();
        let snapshot = Snapshot::build(&repo(), &project, Some(&template));
        assert_eq!(ids(&snapshot), vec!["2", "4", "5"]);
    }

    #[test]
    fn no_filter_keeps_all_pages() {
        let snapshot = Snapshot::build(&repo(), &ProjectId::parse("1").unwrap(), None);
        assert_eq!(ids(&snapshot), vec!["1", "2", "3", "4", "5"]);
        assert!(snapshot.template().is_none());
    }

    #[test]
    fn files_grouped_by_page_and_field() {
        let snapshot = Snapshot::build(&repo(), &ProjectId::parse("1").unwrap(), None);
        let hero: Vec<_> = snapshot
            .files_for(&PageId::parse("4").unwrap(), "hero")
            .unwrap()
            .iter()
            .map(|f| f.id.as_str())
            .collect();
        assert_eq!(hero, vec!["10", "11"]);
        assert!(snapshot.files_for(&PageId::parse("4").unwrap(), "pdf").is_none());
    }

    #[test]
    fn missing_project_means_empty_snapshot() {
        let repo = Repo {
            project: None,
            ..repo()
        };
        let snapshot = Snapshot::build(&repo, &ProjectId::parse("1").unwrap(), None);
        assert!(snapshot.project().is_none());
        assert!(snapshot.is_empty());
        assert_eq!(repo.page_calls.get(), 0);
    }

    #[test]
    fn missing_template_means_no_pages() {
        let repo = Repo {
            template: None,
            ..repo()
        };
        let template = TemplateId::parse("2").unwrap();
        let snapshot = Snapshot::build(&repo, &ProjectId::parse("1").unwrap(), Some(&template));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.template_id(), Some(&template));
    }

    #[test]
    fn pages_survive_unreachable_files() {
        let repo = Repo {
            files: None,
            ..repo()
        };
        let snapshot = Snapshot::build(&repo, &ProjectId::parse("1").unwrap(), None);
        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.files_for(&PageId::parse("4").unwrap(), "hero").is_none());
    }
}
