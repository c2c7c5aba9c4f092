// src/model/account.rs
use super::Keyed;
use crate::types::{GroupId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An account member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Full name when known, otherwise the email address.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

impl Keyed for User {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// The organisation an account belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for Group {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_name_prefers_full_name() {
        let user: User = serde_json::from_value(json!({
            "id": 1, "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");

        let user: User = serde_json::from_value(json!({"id": 2, "email": "x@example.com"})).unwrap();
        assert_eq!(user.display_name(), "x@example.com");
    }
}
