// src/types/ids.rs
use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Strong typing for remote record IDs with phantom types.
///
/// The remote service issues positive integers but is inconsistent about
/// sending them as JSON numbers or strings, so both are accepted on the way
/// in. They always serialize as strings.
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// Marker types for different ID kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemplateMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomStateMarker;

/// Type aliases for specific ID types
pub type ProjectId = Id<ProjectMarker>;
pub type TemplateId = Id<TemplateMarker>;
pub type PageId = Id<PageMarker>;
pub type FileId = Id<FileMarker>;
pub type UserId = Id<UserMarker>;
pub type GroupId = Id<GroupMarker>;
pub type CustomStateId = Id<CustomStateMarker>;

impl<T> Id<T> {
    /// Parse a numeric ID, tolerating surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ValidationError::InvalidId("ID cannot be empty".to_string()));
        }
        if !input.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidId(format!(
                "ID must be numeric: {}",
                input
            )));
        }
        Ok(Self::from_raw(input.to_string()))
    }

    /// Wrap a value received from the API without validation.
    pub(crate) fn from_raw(value: String) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }

    /// Get the ID as a string reference
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The service uses `0` for "no reference" (e.g. a top-level page's parent).
    pub fn is_unset(&self) -> bool {
        self.value.is_empty() || self.value.chars().all(|c| c == '0')
    }
}

// Manual impls so the marker type does not need to satisfy the bounds.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::from_raw(self.value.clone())
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        let value = match RawId::deserialize(deserializer)? {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s.trim().to_string(),
        };
        Ok(Self::from_raw(value))
    }
}

/// Deserializes an optional reference, mapping `null`, `""` and `0` to `None`.
pub(crate) fn deserialize_optional_ref<'de, D, T>(deserializer: D) -> Result<Option<Id<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id: Option<Id<T>> = Option::deserialize(deserializer)?;
    Ok(id.filter(|id| !id.is_unset()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parsing() {
        let id = PageId::parse("12345").unwrap();
        assert_eq!(id.as_str(), "12345");

        let id = PageId::parse("  42 ").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_invalid_ids() {
        assert!(PageId::parse("").is_err());
        assert!(PageId::parse("12a").is_err());
        assert!(PageId::parse("-3").is_err());
    }

    #[test]
    fn deserializes_numbers_and_strings_alike() {
        let from_number: ProjectId = serde_json::from_str("77").unwrap();
        let from_string: ProjectId = serde_json::from_str("\"77\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"77\"");
    }

    #[test]
    fn zero_is_an_unset_reference() {
        assert!(PageId::parse("0").unwrap().is_unset());
        assert!(!PageId::parse("10").unwrap().is_unset());
    }
}
