// src/mapping/config.rs
//! The mapping configuration an administrator produces.
//!
//! It says which templates become which destination content types, which
//! source field feeds each destination field, and optionally which menu
//! receives the page hierarchy.

use super::field::SourceField;
use crate::error::AppError;
use crate::model::FileTransfer;
use crate::source::{Row, RowValue};
use crate::types::{ProjectId, TemplateId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;

static MACHINE_NAME_INVALID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9_]+").expect("machine name pattern is valid")
});

/// Name of the migration that writes the page hierarchy as menu links.
pub const MENU_MIGRATION: &str = "menu";

/// All mappings of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingConfig {
    /// Prefix shared by every migration generated from this config.
    #[serde(default)]
    pub group: String,
    pub project_id: ProjectId,
    #[serde(default)]
    pub templates: Vec<TemplateMapping>,
    #[serde(default)]
    pub menu: Option<MenuMapping>,
}

/// One template mapped onto one destination content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMapping {
    pub template_id: TemplateId,
    /// Template name as the service reports it. The migration is named
    /// after it.
    #[serde(default)]
    pub template_name: String,
    pub content_type: String,
    /// Destination field to source field.
    #[serde(default)]
    pub fields: IndexMap<String, SourceField>,
}

/// Where the page hierarchy is written as menu links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuMapping {
    pub menu_name: String,
}

/// A destination field value produced from a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MappedValue {
    Value(Value),
    Labels(Vec<String>),
    Files(Vec<FileTransfer>),
}

impl MappingConfig {
    /// Reads and validates a mapping file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&content).map_err(|source| AppError::JsonParseError {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configs a run could not honour.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut templates = HashSet::new();
        let mut migrations: HashMap<String, &TemplateId> = HashMap::new();
        for mapping in &self.templates {
            if mapping.content_type.trim().is_empty() {
                return Err(AppError::InvalidMapping(format!(
                    "template {} has no content type",
                    mapping.template_id
                )));
            }
            if !templates.insert(mapping.template_id.as_str()) {
                return Err(AppError::InvalidMapping(format!(
                    "template {} is mapped more than once",
                    mapping.template_id
                )));
            }
            let name = mapping.migration_name();
            if name == MENU_MIGRATION && self.menu.is_some() {
                return Err(AppError::InvalidMapping(format!(
                    "template {} would share the menu migration name",
                    mapping.template_id
                )));
            }
            if let Some(other) = migrations.insert(name.clone(), &mapping.template_id) {
                return Err(AppError::InvalidMapping(format!(
                    "templates {} and {} both map to migration {}",
                    other, mapping.template_id, name
                )));
            }
        }
        if let Some(menu) = &self.menu {
            if menu.menu_name.trim().is_empty() {
                return Err(AppError::InvalidMapping("menu name is empty".to_string()));
            }
        }
        Ok(())
    }

    /// Fails unless this config was made for `project`.
    pub fn ensure_project(&self, project: &ProjectId) -> Result<(), AppError> {
        if &self.project_id == project {
            Ok(())
        } else {
            Err(AppError::InvalidMapping(format!(
                "mapping is for project {}, not {}",
                self.project_id, project
            )))
        }
    }

    pub fn template(&self, id: &TemplateId) -> Option<&TemplateMapping> {
        self.templates.iter().find(|m| &m.template_id == id)
    }

    /// Destination content type per mapped template ID.
    pub fn content_types(&self) -> IndexMap<String, String> {
        self.templates
            .iter()
            .map(|m| (m.template_id.to_string(), m.content_type.clone()))
            .collect()
    }

    /// Identifier of the migration that imports one template's pages.
    pub fn migration_key(&self, mapping: &TemplateMapping) -> String {
        format!("{}{}", self.group, mapping.migration_name())
    }

    /// Migration key per mapped template ID.
    pub fn migration_keys(&self) -> IndexMap<String, String> {
        self.templates
            .iter()
            .map(|m| (m.template_id.to_string(), self.migration_key(m)))
            .collect()
    }

    /// Identifier of the menu link migration, when a menu is configured.
    pub fn menu_migration_key(&self) -> Option<String> {
        self.menu
            .as_ref()
            .map(|_| format!("{}{}", self.group, MENU_MIGRATION))
    }
}

impl TemplateMapping {
    /// Machine name of this template's migration: the lowercased template
    /// name with every run of other characters replaced by `_`. Templates
    /// without a name fall back to `template_{id}`.
    pub fn migration_name(&self) -> String {
        let name = MACHINE_NAME_INVALID
            .replace_all(&self.template_name.to_lowercase(), "_")
            .into_owned();
        if name.trim_matches('_').is_empty() {
            format!("template_{}", self.template_id)
        } else {
            name
        }
    }

    /// Resolves every destination field this mapping can fill from `row`.
    ///
    /// Source fields the row does not carry are left out.
    pub fn map_row(&self, row: &Row) -> IndexMap<String, MappedValue> {
        let mut mapped = IndexMap::new();
        for (destination, source) in &self.fields {
            let value = match source {
                SourceField::Field(name) => match row.get(name) {
                    Some(RowValue::Scalar(value)) => MappedValue::Value(value.clone()),
                    Some(RowValue::Labels(labels)) => MappedValue::Labels(labels.clone()),
                    Some(RowValue::Files(files)) => {
                        MappedValue::Files(files.iter().map(|f| f.transfer()).collect())
                    }
                    None => continue,
                },
                SourceField::StaticBool(flag) => MappedValue::Value(Value::Bool(*flag)),
                SourceField::StaticFormat(format) => MappedValue::Value(Value::from(format.as_str())),
            };
            mapped.insert(destination.clone(), value);
        }
        mapped
    }
}
