//! `UPDATE` and `INSERT` statements assembled from [`Field`] members.

use crate::query::{SqlValue, push_value};
use sqlx::{Postgres, QueryBuilder};
use w2kit_core::Field;

#[derive(Debug, Clone, Default, PartialEq)]
struct Assignments(Vec<(String, SqlValue)>);

impl Assignments {
    fn set(&mut self, column: String, value: SqlValue) {
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.0.push((column, value)),
        }
    }

    fn set_field<T: Into<SqlValue>>(&mut self, column: String, field: Field<T>) {
        match field {
            Field::Missing => {}
            Field::Null => self.set(column, SqlValue::Null),
            Field::Value(value) => self.set(column, value.into()),
        }
    }

    fn set_field_or_default<T: Into<SqlValue> + Default>(&mut self, column: String, field: Field<T>) {
        match field {
            Field::Missing => {}
            Field::Null => self.set(column, T::default().into()),
            Field::Value(value) => self.set(column, value.into()),
        }
    }
}

/// `UPDATE <table> SET ... WHERE <id_column> = <id>`.
///
/// # Example
///
/// ```
/// use w2kit_core::Field;
/// use w2kit_postgres::UpdateStatement;
///
/// let update = UpdateStatement::new("todo", "id", 3)
///     .set_field("quantity", Field::<i32>::Null)
///     .set_field_or_default("description", Field::<String>::Null)
///     .set_field("name", Field::<String>::Missing);
///
/// let qb = update.build().expect("has assignments");
/// assert_eq!(qb.sql(), "UPDATE todo SET quantity = NULL, description = $1 WHERE id = $2");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    table: String,
    id_column: String,
    id: i64,
    assignments: Assignments,
}

impl UpdateStatement {
    /// Update the row of `table` whose `id_column` equals `id`.
    #[must_use]
    pub fn new(table: impl Into<String>, id_column: impl Into<String>, id: i64) -> Self {
        Self {
            table: table.into(),
            id_column: id_column.into(),
            id,
            assignments: Assignments::default(),
        }
    }

    /// Always assign `value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.assignments.set(column.into(), value.into());
        self
    }

    /// Assign a provided field; null writes `NULL`, missing is skipped.
    #[must_use]
    pub fn set_field<T: Into<SqlValue>>(mut self, column: impl Into<String>, field: Field<T>) -> Self {
        self.assignments.set_field(column.into(), field);
        self
    }

    /// Assign a provided field; null writes `T::default()`, missing is skipped.
    ///
    /// For `NOT NULL` columns the grid may blank out.
    #[must_use]
    pub fn set_field_or_default<T: Into<SqlValue> + Default>(
        mut self,
        column: impl Into<String>,
        field: Field<T>,
    ) -> Self {
        self.assignments.set_field_or_default(column.into(), field);
        self
    }

    /// Table being updated.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether no column would be assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.0.is_empty()
    }

    /// The statement, or `None` when nothing is assigned.
    #[must_use]
    pub fn build(self) -> Option<QueryBuilder<'static, Postgres>> {
        if self.is_empty() {
            return None;
        }

        let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", self.table));
        for (index, (column, value)) in self.assignments.0.into_iter().enumerate() {
            if index > 0 {
                qb.push(", ");
            }
            qb.push(format_args!("{column} = "));
            push_value(&mut qb, value);
        }
        qb.push(format_args!(" WHERE {} = ", self.id_column));
        qb.push_bind(self.id);
        Some(qb)
    }
}

/// `INSERT INTO <table> (...) VALUES (...) RETURNING <id_column>`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    table: String,
    returning: String,
    assignments: Assignments,
}

impl InsertStatement {
    /// Insert into `table`, returning the `id` column.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            returning: "id".to_string(),
            assignments: Assignments::default(),
        }
    }

    /// Return `column` (an integer key) instead of `id`.
    #[must_use]
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = column.into();
        self
    }

    /// Always insert `value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.assignments.set(column.into(), value.into());
        self
    }

    /// Insert a provided field; null writes `NULL`, missing leaves the column default.
    #[must_use]
    pub fn set_field<T: Into<SqlValue>>(mut self, column: impl Into<String>, field: Field<T>) -> Self {
        self.assignments.set_field(column.into(), field);
        self
    }

    /// Insert a provided field; null writes `T::default()`, missing leaves the column default.
    #[must_use]
    pub fn set_field_or_default<T: Into<SqlValue> + Default>(
        mut self,
        column: impl Into<String>,
        field: Field<T>,
    ) -> Self {
        self.assignments.set_field_or_default(column.into(), field);
        self
    }

    /// Table being inserted into.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether no column would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.0.is_empty()
    }

    /// The statement. With no columns every column takes its default.
    #[must_use]
    pub fn build(self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("INSERT INTO {}", self.table));

        if self.is_empty() {
            qb.push(" DEFAULT VALUES");
        } else {
            let (columns, values): (Vec<String>, Vec<SqlValue>) =
                self.assignments.0.into_iter().unzip();
            qb.push(format_args!(" ({}) VALUES (", columns.join(", ")));
            for (index, value) in values.into_iter().enumerate() {
                if index > 0 {
                    qb.push(", ");
                }
                push_value(&mut qb, value);
            }
            qb.push(")");
        }

        qb.push(format_args!(" RETURNING {}", self.returning));
        qb
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;

    #[test]
    fn test_update_skips_missing_fields() {
        let update = UpdateStatement::new("todo", "id", 1)
            .set_field("name", Field::<String>::Missing)
            .set_field("quantity", Field::Value(2_i32));

        let qb = update.build().expect("quantity is set");
        assert_eq!(qb.sql(), "UPDATE todo SET quantity = $1 WHERE id = $2");
    }

    #[test]
    fn test_update_with_nothing_to_set() {
        let update = UpdateStatement::new("todo", "id", 1).set_field("name", Field::<String>::Missing);
        assert!(update.is_empty());
        assert!(update.build().is_none());
    }

    #[test]
    fn test_later_assignment_wins() {
        let update = UpdateStatement::new("todo", "id", 1)
            .set("quantity", 1_i32)
            .set_field("quantity", Field::<i32>::Null);
        let qb = update.build().expect("quantity is set");
        assert_eq!(qb.sql(), "UPDATE todo SET quantity = NULL WHERE id = $1");
    }

    #[test]
    fn test_insert() {
        let insert = InsertStatement::new("todo")
            .set("name", "walk the dog")
            .set_field("description", Field::<String>::Null)
            .set_field_or_default("quantity", Field::<i32>::Null)
            .set_field("status_id", Field::<i64>::Missing);
        assert_eq!(insert.table(), "todo");

        let qb = insert.build();
        assert_eq!(
            qb.sql(),
            "INSERT INTO todo (name, description, quantity) VALUES ($1, NULL, $2) RETURNING id"
        );
    }

    #[test]
    fn test_insert_defaults_only() {
        let qb = InsertStatement::new("status").returning("status_id").build();
        assert_eq!(qb.sql(), "INSERT INTO status DEFAULT VALUES RETURNING status_id");
    }
}
