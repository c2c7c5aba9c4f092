// src/model/project.rs
use super::Keyed;
use crate::types::{CustomStateId, ProjectId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One project scopes one migration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for Project {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

/// A workflow state pages of a project move through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomState {
    pub id: CustomStateId,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for CustomState {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}
