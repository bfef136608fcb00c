//! Month lifecycle and the schedule of obligations.

use api_types::month::{MonthRef, ScheduleQuery};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{DateRange, MonthStatus, Principal, Schedule, StartMonthOutcome};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn schedule_range(query: &ScheduleQuery) -> Result<DateRange, ServerError> {
    match (query.year, query.month, query.from, query.to) {
        (Some(year), Some(month), None, None) => Ok(DateRange::month(year, month)?),
        (None, None, Some(from), Some(to)) => Ok(DateRange::new(from, to)?),
        _ => Err(ServerError::Generic(
            "expected either year and month, or from and to".to_string(),
        )),
    }
}

pub async fn scheduled(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Schedule>, ServerError> {
    let range = schedule_range(&query)?;
    let schedule = state
        .engine
        .project_schedule(&principal, budget_id, range)
        .await?;
    Ok(Json(schedule))
}

pub async fn start(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(month): Json<MonthRef>,
) -> Result<Json<StartMonthOutcome>, ServerError> {
    let outcome = state
        .engine
        .start_month(&principal, budget_id, month.year, month.month)
        .await?;
    Ok(Json(outcome))
}

pub async fn close(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(month): Json<MonthRef>,
) -> Result<Json<MonthStatus>, ServerError> {
    let status = state
        .engine
        .close_month(&principal, budget_id, month.year, month.month)
        .await?;
    Ok(Json(status))
}

pub async fn status(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Query(month): Query<MonthRef>,
) -> Result<Json<MonthStatus>, ServerError> {
    let status = state
        .engine
        .month_status(&principal, budget_id, month.year, month.month)
        .await?;
    Ok(Json(status))
}
