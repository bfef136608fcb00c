//! Monthly envelope allocations.

use api_types::{allocation::AllocationSet, month::MonthRef};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{AllocationView, Principal};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Query(month): Query<MonthRef>,
) -> Result<Json<AllocationView>, ServerError> {
    let view = state
        .engine
        .allocation_view(&principal, budget_id, month.year, month.month)
        .await?;
    Ok(Json(view))
}

pub async fn set(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<AllocationSet>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_allocation(
            &principal,
            budget_id,
            payload.category_id,
            payload.year,
            payload.month,
            payload.allocated,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
