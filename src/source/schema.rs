// src/source/schema.rs
//! The declared list of mappable fields.

use crate::model::Template;
use indexmap::IndexMap;

/// Page metadata fields every row carries, with their labels.
pub const PAGE_FIELDS: [(&str, &str); 11] = [
    ("id", "Page ID"),
    ("name", "Page name"),
    ("project_id", "Project ID"),
    ("parent_id", "Parent ID"),
    ("type", "Type"),
    ("position", "Position"),
    ("custom_state", "Custom state"),
    ("created_at", "Created at"),
    ("updated_at", "Updated at"),
    ("due_date", "Due date"),
    ("template_id", "Template ID"),
];

/// Field name to human label: page metadata first, then every non-section
/// element of the template as `"{tab}: {element}"`.
///
/// A name declared on two tabs keeps its first position and takes the later
/// label.
pub fn extract_fields(template: Option<&Template>) -> IndexMap<String, String> {
    let mut fields: IndexMap<String, String> = PAGE_FIELDS
        .iter()
        .map(|(name, label)| (name.to_string(), label.to_string()))
        .collect();

    if let Some(template) = template {
        for (tab, element) in template.config.elements() {
            if element.is_section() {
                continue;
            }
            fields.insert(
                element.name.clone(),
                format!("{}: {}", tab.label, element.label),
            );
        }
    }
    fields
}
