// src/model/page.rs
use super::{lenient_string, FieldConfig, Keyed};
use crate::types::{deserialize_optional_ref, PageId, ProjectId, TemplateId};
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Metadata attributes every row starts with, in row order.
pub const METADATA_FIELDS: [&str; 11] = [
    "id",
    "name",
    "project_id",
    "parent_id",
    "type",
    "position",
    "custom_state",
    "created_at",
    "updated_at",
    "due_date",
    "template_id",
];

/// A single content record, analogous to a CMS node.
///
/// Join keys are typed. Every other attribute, the ID attributes included,
/// is also kept verbatim as the service sent it, so rows reproduce it
/// without reinterpretation (`"0"` parents stay `"0"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PageRecord")]
pub struct Page {
    pub id: PageId,
    pub project_id: ProjectId,
    pub template_id: Option<TemplateId>,
    pub parent_id: Option<PageId>,
    pub name: String,
    pub config: FieldConfig,
    /// All attributes except `config`, untouched.
    pub attributes: Map<String, Value>,
}

#[derive(Deserialize)]
struct PageRecord {
    #[serde(default)]
    config: FieldConfig,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl TryFrom<PageRecord> for Page {
    type Error = serde_json::Error;

    fn try_from(record: PageRecord) -> Result<Self, Self::Error> {
        let attributes = record.attributes;
        let id = PageId::deserialize(raw(&attributes, "id"))?;
        let project_id = ProjectId::deserialize(raw(&attributes, "project_id"))?;
        let template_id = deserialize_optional_ref(raw(&attributes, "template_id"))?;
        let parent_id = deserialize_optional_ref(raw(&attributes, "parent_id"))?;
        let name = lenient_string(raw(&attributes, "name"))?;

        Ok(Self {
            id,
            project_id,
            template_id,
            parent_id,
            name,
            config: record.config,
            attributes,
        })
    }
}

impl Keyed for Page {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl Page {
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Static metadata in the fixed field order, followed by any other
    /// attributes the service sent. Absent fixed fields are `null`. The
    /// field config is not included.
    pub fn metadata(&self) -> IndexMap<String, Value> {
        let mut fields = IndexMap::with_capacity(METADATA_FIELDS.len() + self.attributes.len());
        for key in METADATA_FIELDS {
            let value = self.attribute(key).cloned().unwrap_or(Value::Null);
            fields.insert(key.to_string(), value);
        }
        for (key, value) in &self.attributes {
            fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
        fields
    }

    /// When the page last changed, if the service sent a usable timestamp.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.attribute("updated_at")?)
    }
}

/// Reads a service timestamp: unix seconds (number or numeric string) or
/// RFC 3339.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_unix),
        Value::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(secs) => from_unix(secs),
                Err(_) => DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            }
        }
        _ => None,
    }
}

static NULL: Value = Value::Null;

fn raw<'a>(attributes: &'a Map<String, Value>, key: &str) -> &'a Value {
    attributes.get(key).unwrap_or(&NULL)
}

fn from_unix(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn page(updated_at: Value) -> Page {
        serde_json::from_value(json!({
            "id": "5",
            "project_id": 1,
            "template_id": "0",
            "parent_id": 0,
            "name": "Home",
            "type": "page",
            "position": "2",
            "updated_at": updated_at,
            "overdue": false
        }))
        .unwrap()
    }

    #[test]
    fn zero_references_are_absent() {
        let page = page(Value::Null);
        assert_eq!(page.template_id, None);
        assert_eq!(page.parent_id, None);
        assert!(page.config.is_empty());
    }

    #[test]
    fn metadata_has_fixed_order_then_extras() {
        let metadata = page(json!(1_700_000_000)).metadata();
        let keys: Vec<_> = metadata.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "name",
                "project_id",
                "parent_id",
                "type",
                "position",
                "custom_state",
                "created_at",
                "updated_at",
                "due_date",
                "template_id",
                "overdue"
            ]
        );
        assert_eq!(metadata["id"], json!("5"));
        assert_eq!(metadata["position"], json!("2"));
        assert_eq!(metadata["custom_state"], Value::Null);
    }

    #[test]
    fn metadata_keeps_id_attributes_as_sent() {
        let page: Page = serde_json::from_value(json!({
            "id": 5, "project_id": 1, "parent_id": "0", "template_id": "0", "name": null
        }))
        .unwrap();
        let metadata = page.metadata();

        assert_eq!(metadata["id"], json!(5));
        assert_eq!(metadata["parent_id"], json!("0"));
        assert_eq!(metadata["template_id"], json!("0"));
        assert_eq!(metadata["name"], Value::Null);
        assert_eq!(page.id.as_str(), "5");
        assert_eq!(page.parent_id, None);
        assert_eq!(page.name, "");
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(serde_json::from_value::<Page>(json!({"project_id": 1})).is_err());
    }

    #[test]
    fn last_updated_reads_unix_and_rfc3339() {
        let expected = Utc.timestamp_opt(1_700_000_000, 0).single();
        assert_eq!(page(json!(1_700_000_000)).last_updated(), expected);
        assert_eq!(page(json!("1700000000")).last_updated(), expected);
        assert_eq!(
            page(json!("2023-11-14T22:13:20Z")).last_updated(),
            expected
        );
        assert_eq!(page(json!("soon")).last_updated(), None);
    }
}
