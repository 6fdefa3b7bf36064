//! Database schema and seed data.

use sqlx::PgPool;

const CREATE_STATUS: &str = r"
    CREATE TABLE IF NOT EXISTS status (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        position INTEGER NOT NULL
    )
";

const CREATE_TODO: &str = r"
    CREATE TABLE IF NOT EXISTS todo (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        quantity INTEGER NOT NULL,
        status_id BIGINT NOT NULL REFERENCES status(id) ON DELETE RESTRICT
    )
";

const SEED_STATUS: &str = r"
    INSERT INTO status (name, position) VALUES
        ('pending', 0),
        ('in progress', 1),
        ('completed', 2)
";

const SEED_TODO: &str = r"
    INSERT INTO todo (name, description, quantity, status_id) VALUES
        ('buy groceries', 'go to the store and buy some food and drinks', 4, 3),
        ('throw out the trash', 'ew, it stinks', 1, 1),
        ('build a house', 'build a solid one for your family', 1, 2),
        ('plant a tree', 'it is not that hard', 2, 2),
        ('raise a son', 'so you can enjoy your food and drinks together', 1, 1)
";

/// Create the `status` and `todo` tables, seeding them on first run.
///
/// # Errors
///
/// Returns the first failing statement's error.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(CREATE_STATUS).execute(&mut *tx).await?;
    sqlx::query(CREATE_TODO).execute(&mut *tx).await?;

    let statuses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM status")
        .fetch_one(&mut *tx)
        .await?;
    if statuses == 0 {
        sqlx::query(SEED_STATUS).execute(&mut *tx).await?;
        sqlx::query(SEED_TODO).execute(&mut *tx).await?;
        tracing::info!("seeded status and todo tables");
    }

    tx.commit().await
}
