//! Run handlers atomically.

use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

/// Run `f` inside a transaction: commit when it returns `Ok`, roll back otherwise.
///
/// # Example
///
/// ```no_run
/// use w2kit_core::protocol::SaveGridRequest;
/// use w2kit_postgres::{DbError, UpdateStatement, save_grid, within_transaction};
///
/// # async fn run(pool: sqlx::PgPool, request: SaveGridRequest<(i64, i32)>) -> Result<(), DbError> {
/// let affected = within_transaction(&pool, |conn| {
///     Box::pin(async move {
///         save_grid(conn, request, |(id, quantity)| {
///             UpdateStatement::new("todo", "id", id).set("quantity", quantity)
///         })
///         .await
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns the error from `f`, or a database error from `BEGIN`/`COMMIT`.
pub async fn within_transaction<R, E, F>(pool: &PgPool, f: F) -> Result<R, E>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<R, E>>,
    E: From<sqlx::Error>,
{
    let mut tx = pool.begin().await?;

    match f(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback) = tx.rollback().await {
                tracing::warn!(error = %rollback, "rollback failed");
            }
            Err(err)
        }
    }
}
