//! Dropdown handler for remote `list` fields.

use crate::error::{DbError, Result};
use crate::query::escape_like;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use w2kit_core::protocol::{DropdownRequest, DropdownResponse, DropdownValue};

/// Where dropdown items come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropdownOptions {
    /// `FROM` clause.
    pub from: String,
    /// Integer key expression.
    pub id_column: String,
    /// Display text expression, also the one searched.
    pub text_column: String,
    /// `ORDER BY` expression.
    pub order_by: String,
}

impl DropdownOptions {
    /// Items `{id_column, text_column}` from `from`, ordered by `order_by`.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        id_column: impl Into<String>,
        text_column: impl Into<String>,
        order_by: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            id_column: id_column.into(),
            text_column: text_column.into(),
            order_by: order_by.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        let required = [
            ("from", &self.from),
            ("id_column", &self.id_column),
            ("text_column", &self.text_column),
            ("order_by", &self.order_by),
        ];
        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(DbError::MissingOption(*name)),
            None => Ok(()),
        }
    }

    fn query(&self, request: &DropdownRequest) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT CAST({id} AS BIGINT) AS id, CAST({text} AS TEXT) AS text FROM {from} \
             WHERE CAST({text} AS TEXT) ILIKE ",
            id = self.id_column,
            text = self.text_column,
            from = self.from,
        ));
        qb.push_bind(format!("%{}%", escape_like(&request.search)));
        qb.push(format_args!(" ORDER BY {}", self.order_by));
        if request.max > 0 {
            qb.push(" LIMIT ").push_bind(request.max);
        }
        qb
    }
}

/// Items whose text contains the typed search, at most `max` of them.
///
/// A `max` of zero or less returns every match.
///
/// # Errors
///
/// - [`DbError::MissingOption`] for empty options
/// - [`DbError::Database`] if the query fails
pub async fn get_dropdown(
    conn: &mut PgConnection,
    request: &DropdownRequest,
    options: &DropdownOptions,
) -> Result<DropdownResponse<DropdownValue>> {
    options.validate()?;

    let mut qb = options.query(request);
    tracing::debug!(sql = %qb.sql(), search = %request.search, "loading dropdown items");
    let rows: Vec<(i64, String)> = qb.build_query_as().fetch_all(&mut *conn).await?;

    Ok(DropdownResponse::new(
        rows.into_iter()
            .map(|(id, text)| DropdownValue::new(id, text))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> DropdownOptions {
        DropdownOptions::new("status", "id", "name", "position")
    }

    #[test]
    fn test_dropdown_query() {
        let request = DropdownRequest {
            max: 20,
            search: "pro".to_string(),
        };
        assert_eq!(
            status().query(&request).sql(),
            "SELECT CAST(id AS BIGINT) AS id, CAST(name AS TEXT) AS text FROM status \
             WHERE CAST(name AS TEXT) ILIKE $1 ORDER BY position LIMIT $2"
        );
    }

    #[test]
    fn test_dropdown_without_max_is_unlimited() {
        let request = DropdownRequest::default();
        assert!(!status().query(&request).sql().contains("LIMIT"));
    }

    #[test]
    fn test_dropdown_validation() {
        assert!(status().validate().is_ok());
        assert!(matches!(
            DropdownOptions::new("status", "id", "", "position").validate(),
            Err(DbError::MissingOption("text_column"))
        ));
        assert!(matches!(
            DropdownOptions::new("status", "id", "name", " ").validate(),
            Err(DbError::MissingOption("order_by"))
        ));
    }
}
