// src/source/row.rs
//! Flattened, migration-ready records.

use crate::model::{parse_timestamp, File};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// The value of one row field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowValue {
    /// Page metadata or text content, verbatim.
    Scalar(Value),
    /// Attachments of a `files` element, in the order the service listed them.
    Files(Vec<File>),
    /// Selected option labels of a choice element, in declaration order.
    Labels(Vec<String>),
}

impl RowValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[File]> {
        match self {
            Self::Files(files) => Some(files),
            _ => None,
        }
    }

    pub fn as_labels(&self) -> Option<&[String]> {
        match self {
            Self::Labels(labels) => Some(labels),
            _ => None,
        }
    }

    /// Plain string form of a scalar, numbers included.
    pub fn as_text(&self) -> Option<String> {
        match self.as_scalar()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<Value> for RowValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

/// One page, flattened. Fields keep insertion order: metadata first, then
/// template fields in tab and element order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, RowValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Sets a field, keeping its position if it already existed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<RowValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<RowValue> {
        self.fields.shift_remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The page ID every row carries.
    pub fn source_id(&self) -> Option<String> {
        self.get("id").and_then(RowValue::as_text)
    }

    /// When the page this row came from last changed.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.get("updated_at")
            .and_then(RowValue::as_scalar)
            .and_then(parse_timestamp)
    }

    /// Appends a file to a sequence field, creating it on first use.
    pub(crate) fn push_file(&mut self, name: &str, file: File) {
        match self.fields.get_mut(name) {
            Some(RowValue::Files(files)) => files.push(file),
            _ => {
                self.fields.insert(name.to_string(), RowValue::Files(vec![file]));
            }
        }
    }

    /// Appends a label to a sequence field, creating it on first use.
    pub(crate) fn push_label(&mut self, name: &str, label: String) {
        match self.fields.get_mut(name) {
            Some(RowValue::Labels(labels)) => labels.push(label),
            _ => {
                self.fields
                    .insert(name.to_string(), RowValue::Labels(vec![label]));
            }
        }
    }
}
