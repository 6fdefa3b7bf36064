//! Todo list backend for w2ui.
//!
//! A `status` table feeds a dropdown and an orderable grid; a `todo` table is
//! browsed, edited inline, removed and edited through a form. See
//! [`routes::build_router`] for the endpoints.

pub mod config;
pub mod files;
pub mod routes;
pub mod schema;
pub mod status;
pub mod todo;

pub use config::Config;
pub use routes::build_router;
