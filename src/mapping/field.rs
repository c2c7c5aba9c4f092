// src/mapping/field.rs
//! Source field references as the mapping wizard writes them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const STATIC_PREFIX: &str = "static";

/// What feeds one destination field.
///
/// Written as a plain row field name, `static:bool:true`,
/// `static:bool:false` or `static:format:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SourceField {
    /// A row field, copied as is.
    Field(String),
    /// A constant boolean.
    StaticBool(bool),
    /// A constant text format name.
    StaticFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid source field '{input}': {reason}")]
pub struct SourceFieldError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for SourceField {
    type Err = SourceFieldError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| SourceFieldError {
            input: input.to_string(),
            reason,
        };
        let input = input.trim();
        if input.is_empty() {
            return Err(fail("empty field reference"));
        }

        let mut parts = input.splitn(3, ':');
        if parts.next() != Some(STATIC_PREFIX) {
            return Ok(Self::Field(input.to_string()));
        }
        match (parts.next(), parts.next()) {
            (Some("bool"), Some("true")) => Ok(Self::StaticBool(true)),
            (Some("bool"), Some("false")) => Ok(Self::StaticBool(false)),
            (Some("bool"), _) => Err(fail("static booleans are 'true' or 'false'")),
            (Some("format"), Some(format)) if !format.is_empty() => {
                Ok(Self::StaticFormat(format.to_string()))
            }
            (Some("format"), _) => Err(fail("static format needs a name")),
            _ => Err(fail("unknown static kind")),
        }
    }
}

impl TryFrom<String> for SourceField {
    type Error = SourceFieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SourceField> for String {
    fn from(field: SourceField) -> Self {
        field.to_string()
    }
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::StaticBool(flag) => write!(f, "{}:bool:{}", STATIC_PREFIX, flag),
            Self::StaticFormat(format) => write!(f, "{}:format:{}", STATIC_PREFIX, format),
        }
    }
}
