//! # w2kit Core
//!
//! Wire protocol types and widget helpers for backends that serve w2ui grids,
//! forms, list fields and sidebars.
//!
//! ## Contents
//!
//! - [`protocol`]: request and response shapes for grid, form, dropdown and reorder calls
//! - [`Field`]: tri-state (missing / null / value) members for partial updates
//! - [`reorder`]: drag-and-drop reordering of record ids
//! - [`format`]: named cell formatters in an explicit [`FormatterRegistry`]
//! - [`search`]: accent-insensitive sidebar search
//! - [`options`]: field option builders
//! - [`events`]: grid event decorators
//! - [`Owner`]: the widget capability the request client drives
//!
//! ## Example
//!
//! ```
//! use w2kit_core::protocol::{GridResponse, GridRequest, parse_request};
//!
//! let req: GridRequest = parse_request(r#"{"limit": 2, "offset": 0}"#)?;
//! let page = GridResponse::new(vec!["a", "b"], 10);
//! assert_eq!(req.limit as usize, page.records.len());
//! # Ok::<(), w2kit_core::ProtocolError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod events;
pub mod field;
pub mod format;
pub mod options;
pub mod owner;
pub mod protocol;
pub mod reorder;
pub mod search;

// Re-export key types for convenience
pub use error::{ProtocolError, ReorderError};
pub use field::Field;
pub use format::{FormatterFn, FormatterRegistry};
pub use owner::{LockOptions, Owner};
pub use protocol::{
    BaseResponse, DropdownRequest, DropdownResponse, DropdownValue, FormRequest, FormResponse,
    GridRequest, GridResponse, MoveBefore, RemoveGridRequest, ReorderManyRequest, ReorderRequest,
    SaveFormRequest, SaveFormResponse, SaveGridRequest, Status,
};
