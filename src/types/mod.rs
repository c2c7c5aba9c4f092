// src/types/mod.rs
use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    #[error("Invalid account name: {name} - {reason}")]
    InvalidAccount { name: String, reason: String },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid timestamp: {value} - {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),
}
