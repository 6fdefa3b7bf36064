//! Grid event decorators.
//!
//! Small handlers wired to grid events: reload after a successful save,
//! restrict "all fields" searches to opted-in columns, and only open a record
//! on double-click when the clicked column is not inline-editable.

use crate::owner::Owner;
use crate::protocol::{GridSearch, Status};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The parts of a grid column definition these handlers inspect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridColumn {
    /// Record member shown in the column.
    pub field: String,
    /// Include this column when searching "all fields".
    #[serde(default)]
    pub search_all: bool,
    /// Inline editor definition; empty or absent means read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<Map<String, Value>>,
}

impl GridColumn {
    /// A read-only column.
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    /// Opt the column into "all fields" search.
    #[must_use]
    pub const fn searchable(mut self) -> Self {
        self.search_all = true;
        self
    }

    /// Make the column inline-editable with the given editor `type`.
    #[must_use]
    pub fn editable_as(mut self, kind: &str) -> Self {
        let mut editor = Map::new();
        editor.insert("type".to_string(), Value::String(kind.to_string()));
        self.editable = Some(editor);
        self
    }

    /// Whether the column has an inline editor.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editable.as_ref().is_some_and(|editor| !editor.is_empty())
    }
}

/// Reload `owner` when a completed request reported success.
///
/// Returns whether a reload was triggered.
pub fn reload_on_success<O: Owner + ?Sized>(owner: &O, status: Option<Status>) -> bool {
    if status == Some(Status::Success) {
        owner.reload();
        true
    } else {
        false
    }
}

/// When searching `all` fields, keep only conditions on columns marked `search_all`.
pub fn search_all_filter(columns: &[GridColumn], search_field: &str, search_data: &mut Vec<GridSearch>) {
    if search_field != "all" {
        return;
    }

    search_data.retain(|search| {
        columns
            .iter()
            .any(|column| column.search_all && column.field == search.field)
    });
}

/// Run `handler` for a double-click on column index `column` unless that
/// column is inline-editable (double-click starts the editor there).
///
/// Returns whether `handler` ran. Out-of-range columns are ignored.
pub fn double_click_non_editable<F: FnOnce()>(columns: &[GridColumn], column: usize, handler: F) -> bool {
    match columns.get(column) {
        Some(col) if !col.is_editable() => {
            handler();
            true
        }
        _ => false,
    }
}
