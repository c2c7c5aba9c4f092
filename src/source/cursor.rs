// src/source/cursor.rs
//! The restartable row cursor.
//!
//! Iteration does no I/O. Each call flattens one page of the snapshot:
//! metadata first, then the page's own tab/element values resolved per
//! element kind.

use super::row::Row;
use super::snapshot::Snapshot;
use crate::model::{ElementKind, Page};

/// Where a cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    Unstarted,
    Ready { position: usize },
    Exhausted,
}

/// Sequential reader over a snapshot's pages.
#[derive(Debug, Clone)]
pub struct RowCursor {
    snapshot: Snapshot,
    state: CursorState,
}

impl RowCursor {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            state: CursorState::Unstarted,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Goes back to the first page. Safe to call at any time.
    pub fn reset(&mut self) {
        self.state = self.at(0);
    }

    /// Rows in the working set. Fixed for the snapshot's lifetime.
    pub fn count(&self) -> usize {
        self.snapshot.len()
    }

    /// Rows already handed out since the last reset.
    pub fn position(&self) -> usize {
        match self.state {
            CursorState::Unstarted => 0,
            CursorState::Ready { position } => position,
            CursorState::Exhausted => self.count(),
        }
    }

    /// The next row, or `None` at the end of the sequence.
    ///
    /// A cursor that was never reset starts from the first page.
    pub fn next_row(&mut self) -> Option<Row> {
        let position = match self.state {
            CursorState::Unstarted => 0,
            CursorState::Ready { position } => position,
            CursorState::Exhausted => return None,
        };

        let Some(page) = self.snapshot.pages().get(position) else {
            self.state = CursorState::Exhausted;
            return None;
        };
        let row = flatten(page, &self.snapshot);
        self.state = self.at(position + 1);
        Some(row)
    }

    fn at(&self, position: usize) -> CursorState {
        if position >= self.count() {
            CursorState::Exhausted
        } else {
            CursorState::Ready { position }
        }
    }
}

/// Flattens one page into a row.
///
/// `files` fields with no attachments and choice fields with nothing
/// selected are left unset rather than set to an empty list, so a consumer
/// can tell a field the page lacks from one it has.
pub fn flatten(page: &Page, snapshot: &Snapshot) -> Row {
    let mut row = Row::new();
    for (name, value) in page.metadata() {
        row.set(name, value);
    }

    for (_, element) in page.config.elements() {
        match &element.kind {
            ElementKind::Text { value } => row.set(element.name.clone(), value.clone()),
            ElementKind::Files => {
                for file in snapshot.files_for(&page.id, &element.name).unwrap_or_default() {
                    row.push_file(&element.name, file.clone());
                }
            }
            ElementKind::ChoiceSingle { options } | ElementKind::ChoiceMulti { options } => {
                for option in options.iter().filter(|option| option.selected) {
                    row.push_label(&element.name, option.label.clone());
                }
            }
            ElementKind::Section | ElementKind::Unknown { .. } => {}
        }
    }
    row
}
