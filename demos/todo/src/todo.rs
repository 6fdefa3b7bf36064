//! Todo grid and form endpoints.
//!
//! - GET  /api/v1/todo/grid/records
//! - POST /api/v1/todo/grid/save
//! - POST /api/v1/todo/grid/remove
//! - GET  /api/v1/todo/form
//! - POST /api/v1/todo/form

use crate::routes::connection;
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use w2kit_core::Field;
use w2kit_core::protocol::{
    BaseResponse, DropdownValue, FormRequest, FormResponse, GridRequest, GridResponse,
    RemoveGridRequest, SaveFormRequest, SaveFormResponse, SaveGridRequest,
};
use w2kit_postgres::{
    FieldMapping, FormOptions, GridOptions, InsertStatement, RemoveOptions, UpdateStatement,
    get_form, get_grid, remove_grid, save_form, save_grid, within_transaction,
};
use w2kit_web::{W2Json, W2Query, WebResult};

const FROM: &str = "todo AS t LEFT JOIN status AS s ON s.id = t.status_id";
const SELECT: [&str; 6] = [
    "t.id",
    "t.name",
    "t.description",
    "t.quantity",
    "t.status_id",
    "s.name AS status_name",
];

/// A todo as the grid and form see it.
///
/// Grid saves send only the edited members, so everything but `id` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    /// Record id.
    #[serde(default)]
    pub id: i64,
    /// Title.
    #[serde(default)]
    pub name: String,
    /// Free text notes.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub description: Field<String>,
    /// How many.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub quantity: Field<i32>,
    /// Selected status, shown with its name.
    #[serde(default, skip_serializing_if = "Field::is_missing")]
    pub status: Field<DropdownValue>,
}

#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    name: String,
    description: String,
    quantity: i32,
    status_id: i64,
    status_name: Option<String>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: Field::Value(row.description),
            quantity: Field::Value(row.quantity),
            status: Field::Value(DropdownValue::new(
                row.status_id,
                row.status_name.unwrap_or_default(),
            )),
        }
    }
}

fn grid_options() -> GridOptions {
    GridOptions::new(FROM, SELECT)
        .with_where_mapping(
            FieldMapping::new()
                .with("id", "t.id")
                .with("name", "t.name")
                .with("description", "t.description")
                .with("quantity", "t.quantity")
                .with("status", "t.status_id"),
        )
        .with_order_by_mapping(
            FieldMapping::new()
                .with("id", "t.id")
                .with("name", "t.name")
                .with("description", "t.description")
                .with("quantity", "t.quantity")
                .with("status", "s.name"),
        )
        .with_default_order("t.id")
}

/// Inline edits: description never becomes null, quantity and status may.
fn grid_update(change: Todo) -> UpdateStatement {
    UpdateStatement::new("todo", "id", change.id)
        .set_field_or_default("description", change.description)
        .set_field("quantity", change.quantity)
        .set_field("status_id", change.status.map(|status| status.id))
}

fn form_insert(todo: Todo) -> InsertStatement {
    InsertStatement::new("todo")
        .set("name", todo.name)
        .set_field_or_default("description", todo.description)
        .set_field_or_default("quantity", todo.quantity)
        .set_field("status_id", todo.status.map(|status| status.id))
}

fn form_update(todo: Todo, recid: i64) -> UpdateStatement {
    UpdateStatement::new("todo", "id", recid)
        .set("name", todo.name)
        .set_field_or_default("description", todo.description)
        .set_field_or_default("quantity", todo.quantity)
        .set_field("status_id", todo.status.map(|status| status.id))
}

/// One page of todos.
pub async fn grid_records(
    State(pool): State<PgPool>,
    W2Query(request): W2Query<GridRequest>,
) -> WebResult<Json<GridResponse<Todo>>> {
    let mut conn = connection(&pool).await?;
    let page = get_grid::<TodoRow>(&mut conn, &request, &grid_options()).await?;

    Ok(Json(GridResponse::new(
        page.records.into_iter().map(Todo::from).collect(),
        page.total,
    )))
}

/// Apply the grid's inline edits atomically.
pub async fn grid_save(
    State(pool): State<PgPool>,
    W2Json(request): W2Json<SaveGridRequest<Todo>>,
) -> WebResult<Json<BaseResponse>> {
    let affected = within_transaction(&pool, |conn| {
        Box::pin(async move { save_grid(conn, request, grid_update).await })
    })
    .await?;

    tracing::info!(affected, "saved todo changes");
    Ok(Json(BaseResponse::success()))
}

/// Delete the selected todos.
pub async fn grid_remove(
    State(pool): State<PgPool>,
    W2Json(request): W2Json<RemoveGridRequest>,
) -> WebResult<Json<BaseResponse>> {
    let mut conn = connection(&pool).await?;
    let removed = remove_grid(&mut conn, &request, &RemoveOptions::new("todo", "id")).await?;

    tracing::info!(removed, "removed todos");
    Ok(Json(BaseResponse::success()))
}

/// Load one todo into the form. Unknown ids answer 404.
pub async fn form_get(
    State(pool): State<PgPool>,
    W2Query(request): W2Query<FormRequest>,
) -> WebResult<Json<FormResponse<Todo>>> {
    let mut conn = connection(&pool).await?;
    let options = FormOptions::new(FROM, "t.id", SELECT);
    let response = get_form::<TodoRow>(&mut conn, &request, &options).await?;

    Ok(Json(FormResponse {
        status: response.status,
        record: response.record.map(Todo::from),
    }))
}

/// Insert (`recid` 0) or update a todo from the form.
pub async fn form_save(
    State(pool): State<PgPool>,
    W2Json(request): W2Json<SaveFormRequest<Todo>>,
) -> WebResult<Json<SaveFormResponse>> {
    let mut conn = connection(&pool).await?;
    let response = save_form(&mut conn, request, form_insert, form_update).await?;

    tracing::info!(recid = response.recid, "saved todo");
    Ok(Json(response))
}
