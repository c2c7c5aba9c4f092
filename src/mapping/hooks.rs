// src/mapping/hooks.rs
//! Per-row preparation hooks.
//!
//! A host runs its own preparation before ours. If it vetoed the row, the
//! veto is passed through unchanged and no hook here runs.

use super::config::MappingConfig;
use super::lookup::DestinationLookup;
use crate::source::{Row, RowValue};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Whether a row continues to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDisposition {
    Keep,
    Skip,
}

/// Adjusts one row before it is mapped.
pub trait RowHook {
    fn prepare_row(&self, row: &mut Row) -> RowDisposition;
}

/// Hooks run in order until one of them skips the row.
#[derive(Default)]
pub struct HookChain {
    hooks: Vec<Box<dyn RowHook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hook: impl RowHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs the chain after an upstream decision.
    pub fn run(&self, upstream: RowDisposition, row: &mut Row) -> RowDisposition {
        if upstream == RowDisposition::Skip {
            return RowDisposition::Skip;
        }
        for hook in &self.hooks {
            if hook.prepare_row(row) == RowDisposition::Skip {
                return RowDisposition::Skip;
            }
        }
        RowDisposition::Keep
    }
}

impl RowHook for HookChain {
    fn prepare_row(&self, row: &mut Row) -> RowDisposition {
        self.run(RowDisposition::Keep, row)
    }
}

/// Row fields [`ParentReferenceHook`] may set.
pub const REFERENCE_FIELDS: [&str; 5] =
    ["destination_id", "link_path", "link_title", "weight", "plid"];

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Resolves a row's references to records an earlier migration imported.
///
/// For rows of mapped templates, sets `destination_id` and `link_path`
/// (`node/{id}`) when the page was imported by its template's migration.
/// With a menu configured, also prepares the row as a menu link:
/// `link_title` (the name without markup), `weight` (the position) and
/// `plid`, the parent's link as imported by the menu migration. Top-level
/// pages (parent `0` or absent) and parents not imported yet get no `plid`;
/// the host creates a stub for the latter. Rows are never skipped.
pub struct ParentReferenceHook {
    migrations: HashMap<String, String>,
    menu_migration: Option<String>,
    lookup: Arc<dyn DestinationLookup>,
}

impl ParentReferenceHook {
    pub fn new(config: &MappingConfig, lookup: Arc<dyn DestinationLookup>) -> Self {
        Self {
            migrations: config.migration_keys().into_iter().collect(),
            menu_migration: config.menu_migration_key(),
            lookup,
        }
    }

    fn destination_of(&self, row: &Row) -> Option<String> {
        let template_id = row.get("template_id").and_then(RowValue::as_text)?;
        let migration = self.migrations.get(&template_id)?;
        let source_id = row.source_id()?;
        self.lookup.lookup(migration, &source_id)
    }

    fn parent_link_of(&self, menu_migration: &str, row: &Row) -> Option<String> {
        let parent = row.get("parent_id").and_then(RowValue::as_text)?;
        let parent = parent.trim();
        if parent.is_empty() || parent.chars().all(|c| c == '0') {
            return None;
        }
        self.lookup.lookup(menu_migration, parent)
    }
}

impl RowHook for ParentReferenceHook {
    fn prepare_row(&self, row: &mut Row) -> RowDisposition {
        if let Some(destination) = self.destination_of(row) {
            row.set("link_path", Value::from(format!("node/{}", destination)));
            row.set("destination_id", Value::from(destination));
        }

        if let Some(menu_migration) = &self.menu_migration {
            let title = row
                .get("name")
                .and_then(RowValue::as_text)
                .map(|name| TAGS.replace_all(&name, "").into_owned())
                .unwrap_or_default();
            row.set("link_title", Value::from(title));
            if let Some(position) = row.get("position").and_then(RowValue::as_scalar).cloned() {
                row.set("weight", position);
            }
            if let Some(parent_link) = self.parent_link_of(menu_migration, row) {
                row.set("plid", Value::from(parent_link));
            }
        }
        RowDisposition::Keep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::InMemoryIdMap;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counter(Rc<Cell<usize>>, RowDisposition);

    impl RowHook for Counter {
        fn prepare_row(&self, _row: &mut Row) -> RowDisposition {
            self.0.set(self.0.get() + 1);
            self.1
        }
    }

    fn row(id: &str, template_id: &str) -> Row {
        let mut row = Row::new();
        row.set("id", json!(id));
        row.set("template_id", json!(template_id));
        row
    }

    fn menu_row(id: &str, parent_id: Value) -> Row {
        let mut row = row(id, "10");
        row.set("name", json!("<b>About</b> us"));
        row.set("position", json!("3"));
        row.set("parent_id", parent_id);
        row
    }

    fn menu_config() -> MappingConfig {
        serde_json::from_value(json!({
            "group": "site_",
            "project_id": 1,
            "templates": [{"template_id": 10, "template_name": "Article", "content_type": "article"}],
            "menu": {"menu_name": "main-menu"}
        }))
        .unwrap()
    }

    #[test]
    fn upstream_skip_runs_nothing() {
        let calls = Rc::new(Cell::new(0));
        let chain = HookChain::new().with(Counter(Rc::clone(&calls), RowDisposition::Keep));
        let mut row = Row::new();

        assert_eq!(chain.run(RowDisposition::Skip, &mut row), RowDisposition::Skip);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn first_skip_stops_the_chain() {
        let calls = Rc::new(Cell::new(0));
        let chain = HookChain::new()
            .with(Counter(Rc::clone(&calls), RowDisposition::Keep))
            .with(Counter(Rc::clone(&calls), RowDisposition::Skip))
            .with(Counter(Rc::clone(&calls), RowDisposition::Keep));
        let mut row = Row::new();

        assert_eq!(chain.run(RowDisposition::Keep, &mut row), RowDisposition::Skip);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn parent_reference_resolves_mapped_templates() {
        let config: MappingConfig = serde_json::from_value(json!({
            "group": "site_",
            "project_id": 1,
            "templates": [{"template_id": 10, "template_name": "Article", "content_type": "article", "fields": {}}]
        }))
        .unwrap();
        let mut ids = InMemoryIdMap::new();
        ids.insert("site_article", "5", "42");
        let hook = ParentReferenceHook::new(&config, Arc::new(ids));

        let mut mapped = row("5", "10");
        assert_eq!(hook.prepare_row(&mut mapped), RowDisposition::Keep);
        assert_eq!(mapped.get("link_path").and_then(RowValue::as_text).as_deref(), Some("node/42"));
        assert_eq!(mapped.get("destination_id").and_then(RowValue::as_text).as_deref(), Some("42"));

        let mut unmapped = row("6", "11");
        assert_eq!(hook.prepare_row(&mut unmapped), RowDisposition::Keep);
        assert!(!unmapped.contains("link_path"));

        let mut unknown = row("7", "10");
        hook.prepare_row(&mut unknown);
        assert!(!unknown.contains("destination_id"));
    }

    #[test]
    fn templates_sharing_a_content_type_resolve_through_their_own_migration() {
        let config: MappingConfig = serde_json::from_value(json!({
            "group": "site_",
            "project_id": 1,
            "templates": [
                {"template_id": 10, "template_name": "News", "content_type": "article"},
                {"template_id": 11, "template_name": "Blog", "content_type": "article"}
            ]
        }))
        .unwrap();
        let mut ids = InMemoryIdMap::new();
        ids.insert("site_news", "5", "42");
        let hook = ParentReferenceHook::new(&config, Arc::new(ids));

        let mut news = row("5", "10");
        hook.prepare_row(&mut news);
        assert_eq!(news.get("destination_id").and_then(RowValue::as_text).as_deref(), Some("42"));

        let mut blog = row("5", "11");
        hook.prepare_row(&mut blog);
        assert!(!blog.contains("destination_id"));
    }

    #[test]
    fn menu_links_point_at_imported_parents() {
        let mut ids = InMemoryIdMap::new();
        ids.insert("site_menu", "8", "301");
        let hook = ParentReferenceHook::new(&menu_config(), Arc::new(ids));

        let mut child = menu_row("9", json!("8"));
        assert_eq!(hook.prepare_row(&mut child), RowDisposition::Keep);
        assert_eq!(child.get("plid").and_then(RowValue::as_text).as_deref(), Some("301"));
        assert_eq!(child.get("link_title").and_then(RowValue::as_text).as_deref(), Some("About us"));
        assert_eq!(child.get("weight").and_then(RowValue::as_text).as_deref(), Some("3"));
    }

    #[test]
    fn top_level_and_unimported_parents_get_no_link() {
        let mut ids = InMemoryIdMap::new();
        ids.insert("site_menu", "0", "999");
        let hook = ParentReferenceHook::new(&menu_config(), Arc::new(ids));

        for parent in [json!("0"), json!(0), Value::Null, json!("77")] {
            let mut row = menu_row("9", parent.clone());
            hook.prepare_row(&mut row);
            assert!(!row.contains("plid"), "parent {}", parent);
            assert!(row.contains("link_title"));
        }
    }

    #[test]
    fn menu_fields_need_a_menu() {
        let mut config = menu_config();
        config.menu = None;
        let hook = ParentReferenceHook::new(&config, Arc::new(InMemoryIdMap::new()));
        let mut row = menu_row("9", json!("8"));
        hook.prepare_row(&mut row);
        assert!(!row.contains("link_title"));
        assert!(!row.contains("plid"));
    }
}
