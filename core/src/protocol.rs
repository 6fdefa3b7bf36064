//! JSON wire types exchanged with w2ui grids, forms and list fields.
//!
//! Request types mirror what the widgets send (grid data requests arrive as JSON
//! in the `request` query parameter, saves arrive as JSON bodies). Response types
//! serialise to the shapes the widgets expect, omitting empty members the same way
//! the toolkit's reference backends do.
//!
//! # Example
//!
//! ```
//! use w2kit_core::protocol::{parse_request, GridRequest, SearchLogic};
//!
//! let req: GridRequest = parse_request(
//!     r#"{"limit":100,"offset":0,"searchLogic":"AND","search":[],"sort":[]}"#,
//! )?;
//! assert_eq!(req.limit, 100);
//! assert_eq!(req.search_logic, SearchLogic::And);
//! # Ok::<(), w2kit_core::ProtocolError>(())
//! ```

use crate::error::ProtocolError;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Parse the JSON carried in a widget's `request` query parameter.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidJson`] if the text is not valid JSON for `T`.
pub fn parse_request<T: DeserializeOwned>(request: &str) -> Result<T, ProtocolError> {
    Ok(serde_json::from_str(request)?)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

// ═══════════════════════════════════════════════════════════
// Common responses
// ═══════════════════════════════════════════════════════════

/// Outcome marker present on every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The request was handled.
    Success,
    /// The request failed; `message` explains why.
    Error,
}

/// Plain `{status, message}` response used for saves, removals and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse {
    /// Outcome of the request.
    pub status: Status,
    /// Message shown to the user (errors, or notifications on success).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BaseResponse {
    /// A bare success response.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            status: Status::Success,
            message: None,
        }
    }

    /// An error response carrying `message`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(message.into()),
        }
    }

    /// Attach a user-facing message (shown as a notification by the client).
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ═══════════════════════════════════════════════════════════
// Grid
// ═══════════════════════════════════════════════════════════

/// How multiple search conditions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchLogic {
    /// All conditions must hold.
    #[serde(rename = "AND")]
    And,
    /// Any condition may hold. Unrecognised values fall back to this.
    #[default]
    #[serde(rename = "OR", other)]
    Or,
}

/// Comparison requested by a grid search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOperator {
    /// `=` or `is`
    #[serde(rename = "=", alias = "is")]
    Equal,
    /// `>`
    #[serde(rename = ">")]
    Greater,
    /// `<` or `less`
    #[serde(rename = "<", alias = "less")]
    Less,
    /// `>=` or `more`
    #[serde(rename = ">=", alias = "more")]
    GreaterOrEqual,
    /// `<=`
    #[serde(rename = "<=")]
    LessOrEqual,
    /// Prefix match.
    #[serde(rename = "begins")]
    Begins,
    /// Substring match.
    #[serde(rename = "contains")]
    Contains,
    /// Suffix match.
    #[serde(rename = "ends")]
    Ends,
    /// Inclusive range; value is a two-element array.
    #[serde(rename = "between")]
    Between,
    /// Membership; value is an array of `{id, text}` items.
    #[serde(rename = "in")]
    In,
    /// Negated membership.
    #[serde(rename = "not in")]
    NotIn,
    /// Anything else; ignored when building queries.
    #[serde(other)]
    Unsupported,
}

/// One search condition from the grid toolbar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSearch {
    /// Grid field name (mapped to a column server-side).
    pub field: String,
    /// Field type as declared on the grid (`text`, `int`, `date`, `list`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Requested comparison.
    pub operator: SearchOperator,
    /// Raw search value.
    #[serde(default)]
    pub value: Value,
}

/// Sort direction. Anything other than `desc` sorts ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// Descending.
    #[serde(rename = "desc")]
    Desc,
    /// Ascending. `other` must stay on the last variant.
    #[default]
    #[serde(rename = "asc", other)]
    Asc,
}

/// One sort column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSort {
    /// Grid field name.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
}

/// Data request sent by a grid when it loads records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRequest {
    /// Page size; zero means no limit.
    #[serde(default)]
    pub limit: i64,
    /// Rows to skip.
    #[serde(default)]
    pub offset: i64,
    /// How `search` conditions combine.
    #[serde(default)]
    pub search_logic: SearchLogic,
    /// Search conditions.
    #[serde(default)]
    pub search: Vec<GridSearch>,
    /// Sort columns, most significant first.
    #[serde(default)]
    pub sort: Vec<GridSort>,
}

/// Records returned to a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResponse<T> {
    /// Outcome.
    pub status: Status,
    /// The current page of records.
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<T>,
    /// Summary rows shown below the records.
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub summary: Vec<T>,
    /// Total number of matching records across all pages.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total: i64,
}

impl<T> GridResponse<T> {
    /// A successful page of `records` out of `total`.
    #[must_use]
    pub const fn new(records: Vec<T>, total: i64) -> Self {
        Self {
            status: Status::Success,
            records,
            summary: Vec::new(),
            total,
        }
    }

    /// Attach summary rows.
    #[must_use]
    pub fn with_summary(mut self, summary: Vec<T>) -> Self {
        self.summary = summary;
        self
    }
}

/// Inline edits submitted by a grid's save action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGridRequest<T> {
    /// One partial record per edited row.
    #[serde(default = "Vec::new")]
    pub changes: Vec<T>,
}

/// Record ids submitted by a grid's delete action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveGridRequest {
    /// Ids of the rows to delete.
    #[serde(default)]
    pub id: Vec<i64>,
}

// ═══════════════════════════════════════════════════════════
// Reorder
// ═══════════════════════════════════════════════════════════

/// Drop position of a dragged grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveBefore {
    /// Insert immediately before the row with this id.
    Record(i64),
    /// Append after the last row.
    Bottom,
}

impl Serialize for MoveBefore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Record(id) => serializer.serialize_i64(*id),
            Self::Bottom => serializer.serialize_str("bottom"),
        }
    }
}

impl<'de> Deserialize<'de> for MoveBefore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Id(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Id(id) => Ok(Self::Record(id)),
            Raw::Text(text) if text == "bottom" => Ok(Self::Bottom),
            Raw::Text(text) => text.parse().map(Self::Record).map_err(|_| {
                de::Error::invalid_value(de::Unexpected::Str(&text), &"a record id or \"bottom\"")
            }),
        }
    }
}

/// A single dragged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderRequest {
    /// Row being moved.
    pub recid: i64,
    /// Where it was dropped.
    #[serde(rename = "moveBefore")]
    pub move_before: MoveBefore,
}

/// Several selected rows dragged together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderManyRequest {
    /// Rows being moved, in their current display order.
    pub recid: Vec<i64>,
    /// Where they were dropped.
    #[serde(rename = "moveBefore")]
    pub move_before: MoveBefore,
}

// ═══════════════════════════════════════════════════════════
// Form
// ═══════════════════════════════════════════════════════════

/// Sent by a form when it loads a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRequest {
    /// Form action (usually `get`).
    #[serde(default, alias = "cmd")]
    pub action: String,
    /// Form name.
    #[serde(default)]
    pub name: String,
    /// Record to load.
    #[serde(default)]
    pub recid: i64,
}

/// A record returned to a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormResponse<T> {
    /// Outcome.
    pub status: Status,
    /// Loaded record.
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub record: Option<T>,
}

impl<T> FormResponse<T> {
    /// A successful response carrying `record`.
    #[must_use]
    pub const fn new(record: T) -> Self {
        Self {
            status: Status::Success,
            record: Some(record),
        }
    }
}

/// Sent by a form when it saves. `recid` is zero for new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFormRequest<T> {
    /// Form action (usually `save`).
    #[serde(default, alias = "cmd")]
    pub action: String,
    /// Form name.
    #[serde(default)]
    pub name: String,
    /// Record being saved, zero when inserting.
    #[serde(default)]
    pub recid: i64,
    /// Submitted field values.
    pub record: T,
}

impl<T> SaveFormRequest<T> {
    /// Whether this save creates a new record.
    #[must_use]
    pub const fn is_insert(&self) -> bool {
        self.recid == 0
    }
}

/// Acknowledges a form save with the (possibly new) record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFormResponse {
    /// Outcome.
    pub status: Status,
    /// Id of the saved record.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub recid: i64,
}

impl SaveFormResponse {
    /// A successful save of `recid`.
    #[must_use]
    pub const fn new(recid: i64) -> Self {
        Self {
            status: Status::Success,
            recid,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Dropdown
// ═══════════════════════════════════════════════════════════

/// Sent by a remote `list` field while the user types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownRequest {
    /// Maximum number of items to return; zero or less means unlimited.
    #[serde(default)]
    pub max: i64,
    /// Text typed so far.
    #[serde(default)]
    pub search: String,
}

/// Items returned to a list field. `records` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownResponse<T> {
    /// Outcome.
    pub status: Status,
    /// Items.
    pub records: Vec<T>,
}

impl<T> DropdownResponse<T> {
    /// A successful list of `records`.
    #[must_use]
    pub const fn new(records: Vec<T>) -> Self {
        Self {
            status: Status::Success,
            records,
        }
    }
}

/// `{id, text}` pair used by list fields and dropdown grid columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropdownValue {
    /// Stored key.
    pub id: i64,
    /// Display text. Clients frequently send only the id.
    #[serde(default)]
    pub text: String,
}

impl DropdownValue {
    /// Build a value from its parts.
    #[must_use]
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
