// src/model/template.rs
//! Templates and the tab/element configuration shared with pages.
//!
//! Templates declare fields; pages carry the same structure with values
//! filled in. The configuration is schema-on-read: new element types show up
//! upstream without notice, attributes go missing, and a config that failed
//! to decode arrives as `null`. Parsing therefore never fails. Unusable
//! pieces are dropped and unknown element types are kept as `Unknown`.

use super::Keyed;
use crate::types::TemplateId;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A schema definition that pages conform to.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub name: String,
    #[serde(default)]
    pub config: FieldConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for Template {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// Ordered tabs of elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldConfig(Vec<Tab>);

impl FieldConfig {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self(tabs)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every element, tab by tab, in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = (&Tab, &Element)> {
        self.0
            .iter()
            .flat_map(|tab| tab.elements.iter().map(move |element| (tab, element)))
    }

    /// Builds the config from an already decoded JSON value.
    pub fn from_value(value: &Value) -> Self {
        let Some(tabs) = value.as_array() else {
            if !value.is_null() {
                log::debug!("Ignoring non-list field config");
            }
            return Self::default();
        };
        Self(tabs.iter().filter_map(Tab::from_value).collect())
    }
}

impl<'de> Deserialize<'de> for FieldConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// A labelled group of elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub label: String,
    pub elements: Vec<Element>,
}

impl Tab {
    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let label = text_attribute(object, "label").unwrap_or_default();
        let elements = object
            .get("elements")
            .and_then(Value::as_array)
            .map(|elements| elements.iter().filter_map(Element::from_value).collect())
            .unwrap_or_default();
        Some(Self { label, elements })
    }
}

/// One field definition within a tab.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub label: String,
    pub kind: ElementKind,
}

/// Element kinds, each carrying only the payload it needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// Free text. On pages, `value` is the content, copied verbatim into rows.
    Text { value: Value },
    /// File attachments, joined separately from the project's file list.
    Files,
    /// `choice_radio`: at most one option is expected to be selected.
    ChoiceSingle { options: Vec<ChoiceOption> },
    /// `choice_checkbox`: any number of options may be selected.
    ChoiceMulti { options: Vec<ChoiceOption> },
    /// Layout only; never a mappable field.
    Section,
    /// A type this adapter does not know.
    Unknown { type_name: String },
}

impl Element {
    pub fn text(name: impl Into<String>, label: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ElementKind::Text { value },
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, ElementKind::Section)
    }

    /// The wire name of this element's type.
    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// Parses one element. Anything but a section needs a name to be usable.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let type_name = text_attribute(object, "type").unwrap_or_default();
        let label = text_attribute(object, "label").unwrap_or_default();
        let name = text_attribute(object, "name");

        let kind = match type_name.as_str() {
            "text" => ElementKind::Text {
                value: object.get("value").cloned().unwrap_or(Value::Null),
            },
            "files" => ElementKind::Files,
            "choice_radio" => ElementKind::ChoiceSingle {
                options: ChoiceOption::list_from(object.get("options")),
            },
            "choice_checkbox" => ElementKind::ChoiceMulti {
                options: ChoiceOption::list_from(object.get("options")),
            },
            "section" => ElementKind::Section,
            _ => ElementKind::Unknown { type_name },
        };

        let name = match (name, &kind) {
            (Some(name), _) if !name.is_empty() => name,
            (_, ElementKind::Section) => String::new(),
            _ => {
                log::debug!("Skipping {} element without a name", kind.type_name());
                return None;
            }
        };

        Some(Self { name, label, kind })
    }
}

impl ElementKind {
    pub fn type_name(&self) -> &str {
        match self {
            ElementKind::Text { .. } => "text",
            ElementKind::Files => "files",
            ElementKind::ChoiceSingle { .. } => "choice_radio",
            ElementKind::ChoiceMulti { .. } => "choice_checkbox",
            ElementKind::Section => "section",
            ElementKind::Unknown { type_name } => type_name,
        }
    }
}

/// One option of a choice element.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    pub selected: bool,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, selected: bool) -> Self {
        Self {
            label: label.into(),
            selected,
        }
    }

    fn list_from(value: Option<&Value>) -> Vec<Self> {
        value
            .and_then(Value::as_array)
            .map(|options| options.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }

    fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            label: text_attribute(object, "label").unwrap_or_default(),
            selected: object.get("selected").map(truthy).unwrap_or(false),
        })
    }
}

/// Reads a string attribute, accepting numbers for robustness.
fn text_attribute(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The service has sent `selected` as booleans, `0`/`1` and strings.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1" | "yes"),
        _ => false,
    }
}
