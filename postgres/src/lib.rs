//! `PostgreSQL` handlers for w2ui grids, forms and dropdowns.
//!
//! This crate turns the request types from `w2kit-core` into parameterised SQL
//! with `sqlx` and runs them on a borrowed `PgConnection`:
//!
//! - [`get_grid`], [`save_grid`], [`remove_grid`], [`reorder_grid`], [`reorder_grid_many`]
//! - [`get_form`], [`insert_form`], [`update_form`], [`save_form`]
//! - [`get_dropdown`]
//! - [`within_transaction`] to group any of them atomically
//!
//! Table and column names are trusted configuration; only [`FieldMapping`]
//! entries are ever used for request-selected columns, and request values are
//! always bound.
//!
//! # Example
//!
//! ```no_run
//! use w2kit_core::protocol::GridRequest;
//! use w2kit_postgres::{FieldMapping, GridOptions, get_grid};
//!
//! #[derive(sqlx::FromRow, serde::Serialize)]
//! struct Status {
//!     id: i64,
//!     name: String,
//! }
//!
//! async fn example(pool: sqlx::PgPool, request: GridRequest) -> Result<(), Box<dyn std::error::Error>> {
//!     let options = GridOptions::new("status", ["id", "name"])
//!         .with_where_mapping(FieldMapping::identity(["id", "name"]))
//!         .with_default_order("position");
//!
//!     let mut conn = pool.acquire().await?;
//!     let page = get_grid::<Status>(&mut conn, &request, &options).await?;
//!     println!("{} of {}", page.records.len(), page.total);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dropdown;
pub mod error;
pub mod form;
pub mod grid;
pub mod query;
pub mod statement;
pub mod transaction;

pub use dropdown::{DropdownOptions, get_dropdown};
pub use error::{DbError, Result};
pub use form::{FormOptions, get_form, insert_form, save_form, update_form};
pub use grid::{
    GridOptions, RemoveOptions, ReorderOptions, get_grid, remove_grid, reorder_grid,
    reorder_grid_many, save_grid,
};
pub use query::{FieldMapping, SqlValue, push_limit, push_offset, push_order_by, push_where};
pub use statement::{InsertStatement, UpdateStatement};
pub use transaction::within_transaction;
