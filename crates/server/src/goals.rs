//! Savings goals.

use api_types::{
    Created,
    goal::{ContributionNew, GoalNew},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ContributeGoalCmd, Goal, NewGoalCmd, Principal, Transaction};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Vec<Goal>>, ServerError> {
    Ok(Json(state.engine.goals(&principal, budget_id).await?))
}

pub async fn goal_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = NewGoalCmd::new(budget_id, payload.name, payload.target_amount);
    if let Some(date) = payload.target_date {
        cmd = cmd.target_date(date);
    }
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account(account_id);
    }
    let id = state.engine.create_goal(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Records a contribution; responds with the backing expense.
pub async fn contribute(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, goal_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let mut cmd = ContributeGoalCmd::new(budget_id, goal_id, payload.amount, payload.date);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account(account_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    let tx = state.engine.contribute_to_goal(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}
