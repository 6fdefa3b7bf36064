//! Form handlers: load one record, insert or update it.

use crate::error::{DbError, Result};
use crate::statement::{InsertStatement, UpdateStatement};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use w2kit_core::protocol::{FormRequest, FormResponse, SaveFormRequest, SaveFormResponse};

/// How to read a form record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOptions {
    /// `FROM` clause, joins included.
    pub from: String,
    /// Key expression compared with the request's `recid`.
    pub id_column: String,
    /// Select list.
    pub select: Vec<String>,
}

impl FormOptions {
    /// Read `select` from `from` where `id_column` equals the requested id.
    #[must_use]
    pub fn new<I, S>(from: impl Into<String>, id_column: impl Into<String>, select: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            id_column: id_column.into(),
            select: select.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(DbError::MissingOption("from"));
        }
        if self.id_column.trim().is_empty() {
            return Err(DbError::MissingOption("id_column"));
        }
        if self.select.is_empty() {
            return Err(DbError::MissingOption("select"));
        }
        Ok(())
    }

    fn query(&self, recid: i64) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {} WHERE {} = ",
            self.select.join(", "),
            self.from,
            self.id_column
        ));
        qb.push_bind(recid);
        qb
    }
}

/// Load the record a form asked for.
///
/// # Errors
///
/// - [`DbError::MissingOption`] for empty options
/// - [`DbError::NotFound`] if no row has the requested id
/// - [`DbError::Database`] if the query fails
pub async fn get_form<T>(
    conn: &mut PgConnection,
    request: &FormRequest,
    options: &FormOptions,
) -> Result<FormResponse<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    options.validate()?;

    let mut qb = options.query(request.recid);
    tracing::debug!(sql = %qb.sql(), recid = request.recid, "loading form record");
    let record = qb
        .build_query_as::<T>()
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(FormResponse::new(record))
}

/// Insert a new record and return its id.
///
/// # Errors
///
/// - [`DbError::MissingOption`] if the statement has no table or no columns
/// - [`DbError::Database`] if the insert fails
pub async fn insert_form(conn: &mut PgConnection, insert: InsertStatement) -> Result<i64> {
    if insert.table().trim().is_empty() {
        return Err(DbError::MissingOption("table"));
    }
    if insert.is_empty() {
        return Err(DbError::MissingOption("columns"));
    }

    let table = insert.table().to_string();
    let mut qb = insert.build();
    tracing::debug!(sql = %qb.sql(), "inserting form record");
    let id: i64 = qb.build_query_scalar().fetch_one(&mut *conn).await?;
    metrics::counter!("w2kit.form.inserted", "table" => table).increment(1);

    Ok(id)
}

/// Update an existing record. Returns the number of rows affected.
///
/// # Errors
///
/// - [`DbError::MissingOption`] if the statement has no table or no columns
/// - [`DbError::NotFound`] if no row has the statement's id
/// - [`DbError::Database`] if the update fails
pub async fn update_form(conn: &mut PgConnection, update: UpdateStatement) -> Result<u64> {
    if update.table().trim().is_empty() {
        return Err(DbError::MissingOption("table"));
    }

    let table = update.table().to_string();
    let Some(mut qb) = update.build() else {
        return Err(DbError::MissingOption("columns"));
    };

    tracing::debug!(sql = %qb.sql(), "updating form record");
    let affected = qb.build().execute(&mut *conn).await?.rows_affected();
    if affected == 0 {
        return Err(DbError::NotFound);
    }
    metrics::counter!("w2kit.form.updated", "table" => table).increment(affected);

    Ok(affected)
}

/// Insert when `recid` is 0, update otherwise, and answer with the record id.
///
/// # Errors
///
/// Whatever [`insert_form`] or [`update_form`] returns.
pub async fn save_form<T, I, U>(
    conn: &mut PgConnection,
    request: SaveFormRequest<T>,
    build_insert: I,
    build_update: U,
) -> Result<SaveFormResponse>
where
    I: FnOnce(T) -> InsertStatement,
    U: FnOnce(T, i64) -> UpdateStatement,
{
    let recid = if request.is_insert() {
        insert_form(conn, build_insert(request.record)).await?
    } else {
        update_form(conn, build_update(request.record, request.recid)).await?;
        request.recid
    };

    Ok(SaveFormResponse::new(recid))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_query() {
        let options = FormOptions::new(
            "todo AS t LEFT JOIN status AS s ON s.id = t.status_id",
            "t.id",
            ["t.id", "t.name", "s.name AS status_name"],
        );
        assert!(options.validate().is_ok());
        assert_eq!(
            options.query(5).sql(),
            "SELECT t.id, t.name, s.name AS status_name \
             FROM todo AS t LEFT JOIN status AS s ON s.id = t.status_id WHERE t.id = $1"
        );
    }

    #[test]
    fn test_form_options_validation() {
        assert!(matches!(
            FormOptions::new("todo", "", ["id"]).validate(),
            Err(DbError::MissingOption("id_column"))
        ));
        assert!(matches!(
            FormOptions::new("todo", "id", Vec::<String>::new()).validate(),
            Err(DbError::MissingOption("select"))
        ));
    }
}
