//! Translate grid requests into SQL fragments.
//!
//! Every function appends to a [`QueryBuilder`]. Column expressions come only
//! from a [`FieldMapping`]; request values are always bound parameters.

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use w2kit_core::protocol::{GridRequest, GridSearch, SearchLogic, SearchOperator, SortDirection};

/// Whitelist of request field names and the SQL expression each one stands for.
///
/// Fields not in the mapping are ignored when building `WHERE` and `ORDER BY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    /// An empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Map each field to a column of the same name.
    #[must_use]
    pub fn identity<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        fields
            .into_iter()
            .map(|field| {
                let field = field.into();
                (field.clone(), field)
            })
            .collect()
    }

    /// Map `field` to `expression`, replacing an earlier mapping for it.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, expression: impl Into<String>) -> Self {
        let field = field.into();
        let expression = expression.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = expression,
            None => self.entries.push((field, expression)),
        }
        self
    }

    /// The expression for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, expression)| expression.as_str())
    }

    /// Whether nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |mapping, (field, expression)| mapping.with(field, expression))
    }
}

/// A value bound into a statement.
///
/// Date and time variants carry text that PostgreSQL casts on the server.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`, written as a literal so it takes the column's type.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double precision.
    Float(f64),
    /// Text.
    Text(String),
    /// Text cast to `date`.
    Date(String),
    /// Text cast to `timestamptz`.
    Timestamp(String),
    /// Text cast to `time`.
    Time(String),
    /// `jsonb` document.
    Json(Value),
}

impl SqlValue {
    /// Interpret a grid search value according to the column's declared type.
    ///
    /// List items (`{"id": .., "text": ..}`) contribute their `id`. Arrays have
    /// no scalar interpretation and yield `None`.
    #[must_use]
    pub fn from_search(value: &Value, kind: &str) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Number(number) if is_text_kind(kind) => Some(Self::Text(number.to_string())),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Int)
                .or_else(|| number.as_f64().map(Self::Float)),
            Value::String(text) => Some(Self::from_search_text(text, kind)),
            Value::Object(item) => item.get("id").and_then(|id| Self::from_search(id, kind)),
            Value::Array(_) => None,
        }
    }

    fn from_search_text(text: &str, kind: &str) -> Self {
        let trimmed = text.trim();
        match kind {
            "int" => trimmed
                .parse()
                .map_or_else(|_| Self::Text(text.to_string()), Self::Int),
            "float" | "money" | "currency" | "percent" => trimmed
                .parse()
                .map_or_else(|_| Self::Text(text.to_string()), Self::Float),
            "date" => Self::Date(trimmed.to_string()),
            "datetime" => Self::Timestamp(trimmed.to_string()),
            "time" => Self::Time(trimmed.to_string()),
            _ => Self::Text(text.to_string()),
        }
    }

    const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    fn into_text(self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Int(number) => Some(number.to_string()),
            Self::Float(number) => Some(number.to_string()),
            Self::Text(text) | Self::Date(text) | Self::Timestamp(text) | Self::Time(text) => {
                Some(text)
            }
            Self::Json(value) => Some(value.to_string()),
        }
    }
}

fn is_text_kind(kind: &str) -> bool {
    matches!(kind, "text" | "textarea" | "alphanumeric" | "email" | "hex" | "color")
}

macro_rules! sql_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

sql_value_from! {
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    Value => Json,
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Append `value` as a bound parameter (or a `NULL` literal).
pub fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Null => {
            qb.push("NULL");
        }
        SqlValue::Bool(flag) => {
            qb.push_bind(flag);
        }
        SqlValue::Int(number) => {
            qb.push_bind(number);
        }
        SqlValue::Float(number) => {
            qb.push_bind(number);
        }
        SqlValue::Text(text) => {
            qb.push_bind(text);
        }
        SqlValue::Date(text) => {
            qb.push_bind(text).push("::date");
        }
        SqlValue::Timestamp(text) => {
            qb.push_bind(text).push("::timestamptz");
        }
        SqlValue::Time(text) => {
            qb.push_bind(text).push("::time");
        }
        SqlValue::Json(value) => {
            qb.push_bind(sqlx::types::Json(value));
        }
    }
}

/// One search condition reduced to what the SQL needs.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Compare { op: &'static str, value: SqlValue },
    IsNull,
    Like(String),
    Between(SqlValue, SqlValue),
    In { values: Vec<SqlValue>, negated: bool },
}

impl Predicate {
    fn from_search(search: &GridSearch) -> Option<Self> {
        let op = match search.operator {
            SearchOperator::Equal => "=",
            SearchOperator::Greater => ">",
            SearchOperator::Less => "<",
            SearchOperator::GreaterOrEqual => ">=",
            SearchOperator::LessOrEqual => "<=",
            SearchOperator::Begins => return like_text(&search.value).map(|t| Self::Like(format!("{t}%"))),
            SearchOperator::Contains => return like_text(&search.value).map(|t| Self::Like(format!("%{t}%"))),
            SearchOperator::Ends => return like_text(&search.value).map(|t| Self::Like(format!("%{t}"))),
            SearchOperator::Between => return Self::between(search),
            SearchOperator::In => return Self::membership(search, false),
            SearchOperator::NotIn => return Self::membership(search, true),
            SearchOperator::Unsupported => return None,
        };

        match SqlValue::from_search(&search.value, &search.kind)? {
            SqlValue::Null if op == "=" => Some(Self::IsNull),
            SqlValue::Null => None,
            value => Some(Self::Compare { op, value }),
        }
    }

    fn between(search: &GridSearch) -> Option<Self> {
        let [low, high] = search.value.as_array()?.as_slice() else {
            return None;
        };
        let low = SqlValue::from_search(low, &search.kind)?;
        let high = SqlValue::from_search(high, &search.kind)?;
        if matches!(low, SqlValue::Null) || matches!(high, SqlValue::Null) {
            return None;
        }
        Some(Self::Between(low, high))
    }

    fn membership(search: &GridSearch, negated: bool) -> Option<Self> {
        let values = search
            .value
            .as_array()?
            .iter()
            .filter_map(|item| SqlValue::from_search(item, &search.kind))
            .filter(|value| !matches!(value, SqlValue::Null))
            .collect();
        Some(Self::In { values, negated })
    }

    fn push(self, qb: &mut QueryBuilder<'_, Postgres>, column: &str) {
        match self {
            Self::Compare { op, value } => {
                push_operand(qb, column, value.is_text());
                qb.push(format_args!(" {op} "));
                push_value(qb, value);
            }
            Self::IsNull => {
                qb.push(format_args!("{column} IS NULL"));
            }
            Self::Like(pattern) => {
                qb.push(format_args!("CAST({column} AS TEXT) ILIKE "));
                qb.push_bind(pattern);
            }
            Self::Between(low, high) => {
                push_operand(qb, column, low.is_text() || high.is_text());
                qb.push(" BETWEEN ");
                push_value(qb, low);
                qb.push(" AND ");
                push_value(qb, high);
            }
            Self::In { values, negated } if values.is_empty() => {
                qb.push(if negated { "TRUE" } else { "FALSE" });
            }
            Self::In { values, negated } => {
                let as_text = !values
                    .iter()
                    .all(|v| matches!(v, SqlValue::Int(_) | SqlValue::Float(_)));
                push_operand(qb, column, as_text);
                qb.push(if negated { " NOT IN (" } else { " IN (" });
                let mut separated = qb.separated(", ");
                for value in values {
                    if as_text {
                        separated.push_bind(value.into_text().unwrap_or_default());
                    } else {
                        match value {
                            SqlValue::Int(number) => separated.push_bind(number),
                            SqlValue::Float(number) => separated.push_bind(number),
                            other => separated.push_bind(other.into_text().unwrap_or_default()),
                        };
                    }
                }
                separated.push_unseparated(")");
            }
        }
    }
}

fn push_operand(qb: &mut QueryBuilder<'_, Postgres>, column: &str, as_text: bool) {
    if as_text {
        qb.push(format_args!("CAST({column} AS TEXT)"));
    } else {
        qb.push(column);
    }
}

/// Text for a LIKE pattern with `\`, `%` and `_` escaped.
fn like_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Object(item) => return item.get("text").and_then(like_text),
        Value::Null | Value::Array(_) => return None,
    };
    Some(escape_like(&text))
}

pub(crate) fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append ` WHERE ...` for the request's search conditions.
///
/// Conditions combine with `AND` or `OR` per `searchLogic`. A `base_filter`
/// (trusted SQL) is always `AND`ed with them. Nothing is written when there is
/// neither. Returns whether a `WHERE` clause was written.
pub fn push_where(
    qb: &mut QueryBuilder<'_, Postgres>,
    request: &GridRequest,
    mapping: &FieldMapping,
    base_filter: Option<&str>,
) -> bool {
    let predicates: Vec<(&str, Predicate)> = request
        .search
        .iter()
        .filter_map(|search| {
            let Some(column) = mapping.get(&search.field) else {
                tracing::debug!(field = %search.field, "ignoring search on unmapped field");
                return None;
            };
            Predicate::from_search(search).map(|predicate| (column, predicate))
        })
        .collect();

    let base_filter = base_filter.filter(|filter| !filter.trim().is_empty());
    if predicates.is_empty() && base_filter.is_none() {
        return false;
    }

    qb.push(" WHERE ");
    if let Some(filter) = base_filter {
        qb.push(format_args!("({filter})"));
        if !predicates.is_empty() {
            qb.push(" AND ");
        }
    }

    if !predicates.is_empty() {
        let joiner = match request.search_logic {
            SearchLogic::And => " AND ",
            SearchLogic::Or => " OR ",
        };
        qb.push("(");
        for (index, (column, predicate)) in predicates.into_iter().enumerate() {
            if index > 0 {
                qb.push(joiner);
            }
            predicate.push(qb, column);
        }
        qb.push(")");
    }

    true
}

/// Append ` ORDER BY ...` for the request's sort columns, then `default_order`.
///
/// Returns whether an `ORDER BY` clause was written.
pub fn push_order_by(
    qb: &mut QueryBuilder<'_, Postgres>,
    request: &GridRequest,
    mapping: &FieldMapping,
    default_order: Option<&str>,
) -> bool {
    let mut terms: Vec<String> = request
        .sort
        .iter()
        .filter_map(|sort| {
            mapping.get(&sort.field).map(|column| match sort.direction {
                SortDirection::Asc => format!("{column} ASC"),
                SortDirection::Desc => format!("{column} DESC"),
            })
        })
        .collect();

    if let Some(order) = default_order.filter(|order| !order.trim().is_empty()) {
        terms.push(order.to_string());
    }

    if terms.is_empty() {
        return false;
    }

    qb.push(" ORDER BY ");
    qb.push(terms.join(", "));
    true
}

/// Append ` LIMIT $n` when the request limit is positive.
pub fn push_limit(qb: &mut QueryBuilder<'_, Postgres>, request: &GridRequest) {
    if request.limit > 0 {
        qb.push(" LIMIT ").push_bind(request.limit);
    }
}

/// Append ` OFFSET $n` when the request offset is positive.
pub fn push_offset(qb: &mut QueryBuilder<'_, Postgres>, request: &GridRequest) {
    if request.offset > 0 {
        qb.push(" OFFSET ").push_bind(request.offset);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code can use expect for clear failure messages
mod tests {
    use super::*;
    use serde_json::json;
    use w2kit_core::protocol::{GridSort, parse_request};

    fn todo_mapping() -> FieldMapping {
        FieldMapping::new()
            .with("id", "t.id")
            .with("name", "t.name")
            .with("quantity", "t.quantity")
            .with("status", "t.status_id")
            .with("due", "t.due_date")
    }

    fn where_sql(request: &GridRequest, base: Option<&str>) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM todo t");
        push_where(&mut qb, request, &todo_mapping(), base);
        qb.sql().to_string()
    }

    fn search(field: &str, kind: &str, operator: SearchOperator, value: Value) -> GridSearch {
        GridSearch {
            field: field.to_string(),
            kind: kind.to_string(),
            operator,
            value,
        }
    }

    #[test]
    fn test_field_mapping() {
        let mapping = FieldMapping::identity(["id", "name"]).with("name", "lower(name)");
        assert_eq!(mapping.get("id"), Some("id"));
        assert_eq!(mapping.get("name"), Some("lower(name)"));
        assert_eq!(mapping.get("missing"), None);

        let collected: FieldMapping = [("a", "t.a"), ("b", "t.b")].into_iter().collect();
        assert_eq!(collected.get("b"), Some("t.b"));
        assert!(FieldMapping::new().is_empty());
    }

    #[test]
    fn test_where_or_by_default() {
        let request: GridRequest = parse_request(
            r#"{"search": [
                {"field": "name", "type": "text", "operator": "contains", "value": "milk"},
                {"field": "quantity", "type": "int", "operator": "more", "value": 2}
            ]}"#,
        )
        .expect("valid request");

        assert_eq!(
            where_sql(&request, None),
            "SELECT * FROM todo t WHERE (CAST(t.name AS TEXT) ILIKE $1 OR t.quantity >= $2)"
        );
    }

    #[test]
    fn test_where_and_with_base_filter() {
        let request = GridRequest {
            search_logic: SearchLogic::And,
            search: vec![
                search("id", "int", SearchOperator::Equal, json!("7")),
                search("name", "text", SearchOperator::Equal, json!("x")),
            ],
            ..GridRequest::default()
        };

        assert_eq!(
            where_sql(&request, Some("t.archived = false")),
            "SELECT * FROM todo t WHERE (t.archived = false) AND (t.id = $1 AND CAST(t.name AS TEXT) = $2)"
        );
        assert_eq!(
            where_sql(&GridRequest::default(), Some("t.archived = false")),
            "SELECT * FROM todo t WHERE (t.archived = false)"
        );
    }

    #[test]
    fn test_where_skips_unmapped_and_unsupported() {
        let request = GridRequest {
            search: vec![
                search("secret", "text", SearchOperator::Equal, json!("x")),
                search("name", "text", SearchOperator::Unsupported, json!("x")),
                search("quantity", "int", SearchOperator::Between, json!([1])),
            ],
            ..GridRequest::default()
        };

        assert_eq!(where_sql(&request, None), "SELECT * FROM todo t");
        assert_eq!(where_sql(&request, Some("  ")), "SELECT * FROM todo t");
    }

    #[test]
    fn test_where_operators() {
        let cases = [
            (
                search("quantity", "int", SearchOperator::Between, json!([1, 5])),
                "t.quantity BETWEEN $1 AND $2",
            ),
            (
                search("due", "date", SearchOperator::Less, json!("2024-05-01")),
                "t.due_date < $1::date",
            ),
            (
                search("due", "date", SearchOperator::Between, json!(["2024-01-01", "2024-12-31"])),
                "t.due_date BETWEEN $1::date AND $2::date",
            ),
            (
                search("status", "list", SearchOperator::Equal, json!({"id": 2, "text": "in progress"})),
                "t.status_id = $1",
            ),
            (
                search(
                    "status",
                    "enum",
                    SearchOperator::In,
                    json!([{"id": 1, "text": "pending"}, {"id": 3, "text": "completed"}]),
                ),
                "t.status_id IN ($1, $2)",
            ),
            (
                search("status", "enum", SearchOperator::NotIn, json!([{"id": 1}])),
                "t.status_id NOT IN ($1)",
            ),
            (
                search("name", "text", SearchOperator::In, json!(["a", "b"])),
                "CAST(t.name AS TEXT) IN ($1, $2)",
            ),
            (search("status", "enum", SearchOperator::In, json!([])), "FALSE"),
            (search("status", "enum", SearchOperator::NotIn, json!([])), "TRUE"),
            (search("name", "text", SearchOperator::Equal, json!(null)), "t.name IS NULL"),
            (search("name", "text", SearchOperator::Begins, json!("ab")), "CAST(t.name AS TEXT) ILIKE $1"),
            (search("quantity", "text", SearchOperator::Equal, json!(12)), "CAST(t.quantity AS TEXT) = $1"),
        ];

        for (condition, expected) in cases {
            let request = GridRequest {
                search: vec![condition.clone()],
                ..GridRequest::default()
            };
            assert_eq!(
                where_sql(&request, None),
                format!("SELECT * FROM todo t WHERE ({expected})"),
                "{condition:?}"
            );
        }
    }

    #[test]
    fn test_like_patterns_are_escaped() {
        assert_eq!(like_text(&json!("50%_off\\")), Some("50\\%\\_off\\\\".to_string()));
        assert_eq!(like_text(&json!(12)), Some("12".to_string()));
        assert_eq!(like_text(&json!({"id": 1, "text": "done"})), Some("done".to_string()));
        assert_eq!(like_text(&json!(null)), None);

        let begins = Predicate::from_search(&search("name", "text", SearchOperator::Begins, json!("a_b")));
        assert_eq!(begins, Some(Predicate::Like("a\\_b%".to_string())));
        let ends = Predicate::from_search(&search("name", "text", SearchOperator::Ends, json!("z")));
        assert_eq!(ends, Some(Predicate::Like("%z".to_string())));
    }

    #[test]
    fn test_search_values_by_kind() {
        assert_eq!(SqlValue::from_search(&json!(" 42 "), "int"), Some(SqlValue::Int(42)));
        assert_eq!(SqlValue::from_search(&json!("4.5"), "money"), Some(SqlValue::Float(4.5)));
        assert_eq!(
            SqlValue::from_search(&json!("lots"), "int"),
            Some(SqlValue::Text("lots".to_string()))
        );
        assert_eq!(
            SqlValue::from_search(&json!("2024-01-01 10:00"), "datetime"),
            Some(SqlValue::Timestamp("2024-01-01 10:00".to_string()))
        );
        assert_eq!(SqlValue::from_search(&json!(7), "text"), Some(SqlValue::Text("7".to_string())));
        assert_eq!(SqlValue::from_search(&json!(1.5), "float"), Some(SqlValue::Float(1.5)));
        assert_eq!(SqlValue::from_search(&json!([1]), "int"), None);
        assert_eq!(SqlValue::from_search(&json!({"text": "no id"}), "list"), None);
    }

    #[test]
    fn test_order_by() {
        let request = GridRequest {
            sort: vec![
                GridSort {
                    field: "name".to_string(),
                    direction: SortDirection::Desc,
                },
                GridSort {
                    field: "secret".to_string(),
                    direction: SortDirection::Asc,
                },
                GridSort {
                    field: "quantity".to_string(),
                    direction: SortDirection::Asc,
                },
            ],
            ..GridRequest::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM todo t");
        assert!(push_order_by(&mut qb, &request, &todo_mapping(), Some("t.id")));
        assert_eq!(
            qb.sql(),
            "SELECT * FROM todo t ORDER BY t.name DESC, t.quantity ASC, t.id"
        );

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        assert!(!push_order_by(&mut qb, &GridRequest::default(), &todo_mapping(), None));
        assert_eq!(qb.sql(), "SELECT 1");
    }

    #[test]
    fn test_limit_and_offset() {
        let request = GridRequest {
            limit: 100,
            offset: 200,
            ..GridRequest::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_limit(&mut qb, &request);
        push_offset(&mut qb, &request);
        assert_eq!(qb.sql(), "SELECT 1 LIMIT $1 OFFSET $2");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_limit(&mut qb, &GridRequest::default());
        push_offset(&mut qb, &GridRequest::default());
        assert_eq!(qb.sql(), "SELECT 1");
    }

    #[test]
    fn test_push_value_literals() {
        let mut qb = QueryBuilder::<Postgres>::new("VALUES (");
        push_value(&mut qb, SqlValue::Null);
        qb.push(", ");
        push_value(&mut qb, SqlValue::Time("10:00".to_string()));
        qb.push(", ");
        push_value(&mut qb, SqlValue::from(json!({"a": 1})));
        qb.push(")");
        assert_eq!(qb.sql(), "VALUES (NULL, $1::time, $2)");
    }

    #[test]
    fn test_sql_value_conversions() {
        assert_eq!(SqlValue::from(3_i32), SqlValue::Int(3));
        assert_eq!(SqlValue::from("x"), SqlValue::Text("x".to_string()));
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(true)), SqlValue::Bool(true));
    }
}
