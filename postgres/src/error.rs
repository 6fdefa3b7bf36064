//! Error types for the database handlers.

use thiserror::Error;
use w2kit_core::ReorderError;

/// Errors returned by the grid, form and dropdown handlers.
#[derive(Error, Debug)]
pub enum DbError {
    /// A required handler option was left empty.
    #[error("{0} is required")]
    MissingOption(&'static str),

    /// The request cannot be executed as given.
    #[error("{0}")]
    InvalidRequest(String),

    /// No row matched the requested id.
    #[error("record not found")]
    NotFound,

    /// The reorder request does not fit the stored order.
    #[error("reorder: {0}")]
    Reorder(#[from] ReorderError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl DbError {
    /// Whether the error was caused by the request rather than the database.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::NotFound | Self::Reorder(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other),
        }
    }
}

/// Result type for database handlers.
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::NotFound));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::Database(_)
        ));
    }

    #[test]
    fn test_messages() {
        assert_eq!(DbError::MissingOption("from").to_string(), "from is required");
        assert_eq!(
            DbError::Reorder(ReorderError::IdNotFound(4)).to_string(),
            format!("reorder: {}", ReorderError::IdNotFound(4))
        );
        assert!(DbError::NotFound.is_client_error());
        assert!(!DbError::MissingOption("from").is_client_error());
    }
}
