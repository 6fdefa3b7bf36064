//! Grid handlers: load a page, save inline edits, remove rows, reorder rows.

use crate::error::{DbError, Result};
use crate::query::{FieldMapping, push_limit, push_offset, push_order_by, push_where};
use crate::statement::UpdateStatement;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use w2kit_core::protocol::{
    GridRequest, GridResponse, RemoveGridRequest, ReorderManyRequest, ReorderRequest,
    SaveGridRequest,
};
use w2kit_core::reorder::{reorder, reorder_many};

/// How to read grid records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridOptions {
    /// `FROM` clause, joins included.
    pub from: String,
    /// Select list; aliases must match the record's `FromRow` names.
    pub select: Vec<String>,
    /// Expression counting matching rows. Defaults to `count(*)`.
    pub count_expr: Option<String>,
    /// Searchable fields.
    pub where_mapping: FieldMapping,
    /// Sortable fields.
    pub order_by_mapping: FieldMapping,
    /// Condition always applied, `AND`ed with the search.
    pub base_filter: Option<String>,
    /// Ordering applied after the requested sort.
    pub default_order: Option<String>,
}

impl GridOptions {
    /// Read `select` from `from`.
    #[must_use]
    pub fn new<I, S>(from: impl Into<String>, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            select: select.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the count expression.
    #[must_use]
    pub fn with_count_expr(mut self, expr: impl Into<String>) -> Self {
        self.count_expr = Some(expr.into());
        self
    }

    /// Set the searchable fields.
    #[must_use]
    pub fn with_where_mapping(mut self, mapping: FieldMapping) -> Self {
        self.where_mapping = mapping;
        self
    }

    /// Set the sortable fields.
    #[must_use]
    pub fn with_order_by_mapping(mut self, mapping: FieldMapping) -> Self {
        self.order_by_mapping = mapping;
        self
    }

    /// Always filter by `filter`.
    #[must_use]
    pub fn with_base_filter(mut self, filter: impl Into<String>) -> Self {
        self.base_filter = Some(filter.into());
        self
    }

    /// Order by `order` after the requested sort columns.
    #[must_use]
    pub fn with_default_order(mut self, order: impl Into<String>) -> Self {
        self.default_order = Some(order.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(DbError::MissingOption("from"));
        }
        if self.select.is_empty() {
            return Err(DbError::MissingOption("select"));
        }
        Ok(())
    }

    fn count_query(&self, request: &GridRequest) -> QueryBuilder<'static, Postgres> {
        let count_expr = self.count_expr.as_deref().unwrap_or("count(*)");
        let mut qb = QueryBuilder::new(format!("SELECT {count_expr} FROM {}", self.from));
        push_where(&mut qb, request, &self.where_mapping, self.base_filter.as_deref());
        qb
    }

    fn data_query(&self, request: &GridRequest) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            self.select.join(", "),
            self.from
        ));
        push_where(&mut qb, request, &self.where_mapping, self.base_filter.as_deref());
        push_order_by(
            &mut qb,
            request,
            &self.order_by_mapping,
            self.default_order.as_deref(),
        );
        push_limit(&mut qb, request);
        push_offset(&mut qb, request);
        qb
    }
}

/// Load one page of records plus the total number of matches.
///
/// # Errors
///
/// - [`DbError::MissingOption`] if `from` or `select` is empty
/// - [`DbError::Database`] if either query fails
pub async fn get_grid<T>(
    conn: &mut PgConnection,
    request: &GridRequest,
    options: &GridOptions,
) -> Result<GridResponse<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    options.validate()?;

    let mut count = options.count_query(request);
    tracing::debug!(sql = %count.sql(), "counting grid records");
    let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

    if total == 0 {
        return Ok(GridResponse::new(Vec::new(), 0));
    }

    let mut data = options.data_query(request);
    tracing::debug!(sql = %data.sql(), "loading grid records");
    let records = data.build_query_as::<T>().fetch_all(&mut *conn).await?;

    Ok(GridResponse::new(records, total))
}

/// Apply inline edits, one `UPDATE` per change.
///
/// `build_update` turns a change into its statement; changes that assign
/// nothing are skipped. Returns the number of rows affected. Run it inside
/// [`within_transaction`](crate::within_transaction) to make the batch atomic.
///
/// # Errors
///
/// Returns [`DbError::Database`] on the first failing update.
pub async fn save_grid<T, F>(
    conn: &mut PgConnection,
    request: SaveGridRequest<T>,
    build_update: F,
) -> Result<u64>
where
    F: Fn(T) -> UpdateStatement,
{
    let mut affected = 0;

    for (index, change) in request.changes.into_iter().enumerate() {
        let update = build_update(change);
        let table = update.table().to_string();
        let Some(mut qb) = update.build() else {
            tracing::debug!(index, "skipping change with nothing to update");
            continue;
        };

        tracing::debug!(index, sql = %qb.sql(), "saving grid change");
        let rows = qb.build().execute(&mut *conn).await?.rows_affected();
        metrics::counter!("w2kit.grid.saved", "table" => table).increment(rows);
        affected += rows;
    }

    Ok(affected)
}

/// Which table rows are deleted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Table name.
    pub table: String,
    /// Integer key column.
    pub id_column: String,
}

impl RemoveOptions {
    /// Delete from `table` by `id_column`.
    #[must_use]
    pub fn new(table: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
        }
    }
}

/// Delete the selected rows. Returns the number deleted.
///
/// # Errors
///
/// - [`DbError::MissingOption`] if `table` or `id_column` is empty
/// - [`DbError::InvalidRequest`] if no ids were sent
/// - [`DbError::Database`] if the delete fails
pub async fn remove_grid(
    conn: &mut PgConnection,
    request: &RemoveGridRequest,
    options: &RemoveOptions,
) -> Result<u64> {
    if options.table.trim().is_empty() {
        return Err(DbError::MissingOption("table"));
    }
    if options.id_column.trim().is_empty() {
        return Err(DbError::MissingOption("id_column"));
    }
    if request.id.is_empty() {
        return Err(DbError::InvalidRequest("id must not be empty".to_string()));
    }

    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "DELETE FROM {} WHERE {} = ANY(",
        options.table, options.id_column
    ));
    qb.push_bind(request.id.clone()).push(")");

    tracing::debug!(sql = %qb.sql(), count = request.id.len(), "removing grid records");
    let affected = qb.build().execute(&mut *conn).await?.rows_affected();
    metrics::counter!("w2kit.grid.removed", "table" => options.table.clone()).increment(affected);

    Ok(affected)
}

/// Table whose rows carry an explicit position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderOptions {
    /// Table name.
    pub table: String,
    /// Integer key column.
    pub id_column: String,
    /// Integer column holding the row's position.
    pub position_column: String,
}

impl ReorderOptions {
    /// Reorder `table` rows by rewriting `position_column`.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        id_column: impl Into<String>,
        position_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            position_column: position_column.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(DbError::MissingOption("table"));
        }
        if self.id_column.trim().is_empty() {
            return Err(DbError::MissingOption("id_column"));
        }
        if self.position_column.trim().is_empty() {
            return Err(DbError::MissingOption("position_column"));
        }
        Ok(())
    }
}

/// Move one row before another (or to the bottom) and renumber positions from 0.
///
/// Returns the number of rows whose position was written.
///
/// # Errors
///
/// - [`DbError::MissingOption`] for empty options
/// - [`DbError::Reorder`] if an id is not in the table
/// - [`DbError::Database`] if a query fails
pub async fn reorder_grid(
    conn: &mut PgConnection,
    request: &ReorderRequest,
    options: &ReorderOptions,
) -> Result<u64> {
    options.validate()?;
    let mut ids = load_order(conn, options).await?;
    reorder(&mut ids, request.recid, request.move_before)?;
    write_order(conn, options, ids).await
}

/// Move several rows, keeping their relative order, and renumber positions.
///
/// # Errors
///
/// Same as [`reorder_grid`].
pub async fn reorder_grid_many(
    conn: &mut PgConnection,
    request: &ReorderManyRequest,
    options: &ReorderOptions,
) -> Result<u64> {
    options.validate()?;
    let mut ids = load_order(conn, options).await?;
    reorder_many(&mut ids, &request.recid, request.move_before)?;
    write_order(conn, options, ids).await
}

async fn load_order(conn: &mut PgConnection, options: &ReorderOptions) -> Result<Vec<i64>> {
    let sql = format!(
        "SELECT CAST({id} AS BIGINT) FROM {table} ORDER BY {position}, {id}",
        id = options.id_column,
        table = options.table,
        position = options.position_column,
    );
    tracing::debug!(sql = %sql, "loading row order");
    Ok(sqlx::query_scalar(&sql).fetch_all(&mut *conn).await?)
}

fn order_update_sql(options: &ReorderOptions) -> String {
    format!(
        "UPDATE {table} AS t SET {position} = v.position \
         FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS v(id, position) \
         WHERE t.{id} = v.id",
        table = options.table,
        position = options.position_column,
        id = options.id_column,
    )
}

async fn write_order(conn: &mut PgConnection, options: &ReorderOptions, ids: Vec<i64>) -> Result<u64> {
    let positions: Vec<i64> = (0..).take(ids.len()).collect();
    let sql = order_update_sql(options);

    tracing::debug!(sql = %sql, rows = ids.len(), "writing row order");
    let affected = sqlx::query(&sql)
        .bind(ids)
        .bind(positions)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    metrics::counter!("w2kit.grid.reordered", "table" => options.table.clone()).increment(affected);

    Ok(affected)
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use w2kit_core::protocol::parse_request;

    fn todo_grid() -> GridOptions {
        GridOptions::new(
            "todo AS t LEFT JOIN status AS s ON s.id = t.status_id",
            ["t.id", "t.name", "s.name AS status_name"],
        )
        .with_where_mapping(FieldMapping::new().with("name", "t.name").with("status", "t.status_id"))
        .with_order_by_mapping(FieldMapping::new().with("status", "s.name"))
        .with_default_order("t.id")
    }

    #[test]
    fn test_grid_queries() {
        let request: GridRequest = parse_request(
            r#"{"limit": 50, "offset": 100, "searchLogic": "AND",
                "search": [{"field": "name", "type": "text", "operator": "begins", "value": "b"}],
                "sort": [{"field": "status", "direction": "desc"}]}"#,
        )
        .expect("valid request");
        let options = todo_grid();

        assert_eq!(
            options.count_query(&request).sql(),
            "SELECT count(*) FROM todo AS t LEFT JOIN status AS s ON s.id = t.status_id \
             WHERE (CAST(t.name AS TEXT) ILIKE $1)"
        );
        assert_eq!(
            options.data_query(&request).sql(),
            "SELECT t.id, t.name, s.name AS status_name \
             FROM todo AS t LEFT JOIN status AS s ON s.id = t.status_id \
             WHERE (CAST(t.name AS TEXT) ILIKE $1) ORDER BY s.name DESC, t.id LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_custom_count_and_base_filter() {
        let options = GridOptions::new("status", ["id", "name"])
            .with_count_expr("count(DISTINCT id)")
            .with_base_filter("name <> ''");

        assert_eq!(
            options.count_query(&GridRequest::default()).sql(),
            "SELECT count(DISTINCT id) FROM status WHERE (name <> '')"
        );
    }

    #[test]
    fn test_grid_options_validation() {
        assert!(matches!(
            GridOptions::new("", ["id"]).validate(),
            Err(DbError::MissingOption("from"))
        ));
        assert!(matches!(
            GridOptions::new("todo", Vec::<String>::new()).validate(),
            Err(DbError::MissingOption("select"))
        ));
        assert!(todo_grid().validate().is_ok());
    }

    #[test]
    fn test_reorder_options_validation() {
        assert!(matches!(
            ReorderOptions::new("status", "id", "").validate(),
            Err(DbError::MissingOption("position_column"))
        ));
        assert!(ReorderOptions::new("status", "id", "position").validate().is_ok());
    }

    #[test]
    fn test_order_update_sql() {
        let sql = order_update_sql(&ReorderOptions::new("status", "id", "position"));
        assert_eq!(
            sql,
            "UPDATE status AS t SET position = v.position \
             FROM UNNEST($1::BIGINT[], $2::BIGINT[]) AS v(id, position) WHERE t.id = v.id"
        );
    }
}
