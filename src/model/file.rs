// src/model/file.rs
use super::Keyed;
use crate::constants::FILE_STORAGE_BASE_URL;
use crate::types::{FileId, PageId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A file attached to one field of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub id: FileId,
    pub page_id: PageId,
    /// Name of the page element this file belongs to.
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub field: String,
    /// Storage name on the remote object store.
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub filename: String,
    /// Name the file was uploaded with.
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub original_filename: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for File {
    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl File {
    /// Where the bytes live and what to call them locally.
    pub fn transfer(&self) -> FileTransfer {
        FileTransfer {
            source_url: format!("{}{}", FILE_STORAGE_BASE_URL, self.filename),
            destination_name: if self.original_filename.is_empty() {
                self.filename.clone()
            } else {
                self.original_filename.clone()
            },
        }
    }
}

/// Everything an external copy step needs to fetch one attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransfer {
    pub source_url: String,
    pub destination_name: String,
}
