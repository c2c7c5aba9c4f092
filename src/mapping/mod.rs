// src/mapping/mod.rs
//! Mapping configuration, row hooks and destination ID lookups.
//!
//! Writing destination records is the host's job. This module covers the
//! shapes the host hands in and the hooks that run on each row before it
//! is mapped.

mod config;
mod field;
mod hooks;
mod lookup;

pub use config::{MappedValue, MappingConfig, MenuMapping, TemplateMapping, MENU_MIGRATION};
pub use field::{SourceField, SourceFieldError};
pub use hooks::{HookChain, ParentReferenceHook, RowDisposition, RowHook, REFERENCE_FIELDS};
pub use lookup::{CachedLookup, DestinationLookup, InMemoryIdMap};
