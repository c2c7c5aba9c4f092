// src/model/mod.rs
//! Shapes of the records the remote service hands out.
//!
//! Every record keeps the attributes the adapter reasons about as typed
//! fields and carries the rest in a raw map (`extra`, or `attributes` on
//! pages), so nothing the service sends is lost on the way to a row.

mod account;
mod file;
mod page;
mod project;
pub mod template;

pub use account::{Group, User};
pub use file::{File, FileTransfer};
pub use page::{parse_timestamp, Page, METADATA_FIELDS};
pub use project::{CustomState, Project};
pub use template::{ChoiceOption, Element, ElementKind, FieldConfig, Tab, Template};

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a text attribute the service may send as a string, a number or
/// `null`. Anything that is not text or a number becomes `""`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// A record that can be indexed by its remote ID.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// An ordered collection of records with an ID index.
///
/// Iteration follows the order the service returned the records in. A record
/// whose ID was already seen replaces the earlier value but keeps the earlier
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: IndexMap<String, T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: IndexMap::new(),
        }
    }
}

impl<T: Keyed> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, or replaces one with the same ID in place.
    pub fn insert(&mut self, item: T) {
        self.items.insert(item.key().to_string(), item);
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into_values().collect()
    }
}

impl<T: Keyed> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.insert(item);
        }
        collection
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = indexmap::map::IntoValues<String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str, u32);

    impl Keyed for Item {
        fn key(&self) -> &str {
            self.0
        }
    }

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(default, deserialize_with = "lenient_string")]
        name: String,
    }

    #[test]
    fn lenient_strings_accept_null_and_numbers() {
        let named: Named = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(named.name, "");
        let named: Named = serde_json::from_str(r#"{"name": 42}"#).unwrap();
        assert_eq!(named.name, "42");
        let named: Named = serde_json::from_str("{}").unwrap();
        assert_eq!(named.name, "");
    }

    #[test]
    fn keeps_arrival_order() {
        let collection: Collection<Item> =
            vec![Item("3", 0), Item("1", 0), Item("2", 0)].into_iter().collect();
        let keys: Vec<_> = collection.iter().map(|i| i.0).collect();
        assert_eq!(keys, vec!["3", "1", "2"]);
        assert!(collection.contains("1"));
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn duplicate_id_replaces_value_in_place() {
        let collection: Collection<Item> = vec![Item("a", 1), Item("b", 1), Item("a", 2)]
            .into_iter()
            .collect();
        assert_eq!(
            collection.into_vec(),
            vec![Item("a", 2), Item("b", 1)]
        );
    }
}
