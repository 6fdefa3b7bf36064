//! Status endpoints: dropdown items for the todo form and an orderable grid.

use crate::routes::connection;
use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::PgPool;
use w2kit_core::protocol::{
    BaseResponse, DropdownRequest, DropdownResponse, DropdownValue, GridRequest, GridResponse,
    ReorderRequest,
};
use w2kit_postgres::{
    DropdownOptions, GridOptions, ReorderOptions, get_dropdown, get_grid, reorder_grid,
    within_transaction,
};
use w2kit_web::{W2Json, W2Query, WebResult};

/// A status row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Status {
    /// Record id.
    pub id: i64,
    /// Display name.
    pub name: String,
}

/// Statuses matching the typed search, in their configured order.
pub async fn dropdown(
    State(pool): State<PgPool>,
    W2Query(request): W2Query<DropdownRequest>,
) -> WebResult<Json<DropdownResponse<DropdownValue>>> {
    let mut conn = connection(&pool).await?;
    let options = DropdownOptions::new("status", "id", "name", "position");

    Ok(Json(get_dropdown(&mut conn, &request, &options).await?))
}

/// All statuses, ordered by position.
pub async fn grid_records(
    State(pool): State<PgPool>,
    W2Query(request): W2Query<GridRequest>,
) -> WebResult<Json<GridResponse<Status>>> {
    let mut conn = connection(&pool).await?;
    let options = GridOptions::new("status", ["id", "name"]).with_default_order("position");

    Ok(Json(get_grid(&mut conn, &request, &options).await?))
}

/// Persist a drag-and-drop move.
pub async fn grid_reorder(
    State(pool): State<PgPool>,
    W2Json(request): W2Json<ReorderRequest>,
) -> WebResult<Json<BaseResponse>> {
    let written = within_transaction(&pool, |conn| {
        Box::pin(async move {
            reorder_grid(conn, &request, &ReorderOptions::new("status", "id", "position")).await
        })
    })
    .await?;

    tracing::info!(recid = request.recid, written, "reordered statuses");
    Ok(Json(BaseResponse::success()))
}
