//! Transactions API endpoints

use api_types::transaction::{
    InstallmentsNew, TransactionKind as ApiKind, TransactionListQuery, TransactionNew,
    TransactionStatus as ApiStatus, TransactionUpdate, TransactionsDeleted,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    CreateTransactionCmd, InstallmentPurchaseCmd, Principal, Transaction, TransactionKind,
    TransactionListFilter, TransactionPage, TransactionStatus, UpdateTransactionCmd,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 50;

fn map_kind(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Income => TransactionKind::Income,
        ApiKind::Expense => TransactionKind::Expense,
        ApiKind::Transfer => TransactionKind::Transfer,
    }
}

fn map_status(status: ApiStatus) -> TransactionStatus {
    match status {
        ApiStatus::Pending => TransactionStatus::Pending,
        ApiStatus::Cleared => TransactionStatus::Cleared,
        ApiStatus::Reconciled => TransactionStatus::Reconciled,
    }
}

pub async fn list(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionPage>, ServerError> {
    let filter = TransactionListFilter {
        from: query.from,
        to: query.to,
        account_id: query.account_id,
        category_id: query.category_id,
        kind: query.kind.map(map_kind),
        status: query.status.map(map_status),
    };
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let page = state
        .engine
        .list_transactions(
            &principal,
            budget_id,
            &filter,
            limit,
            query.cursor.as_deref(),
        )
        .await?;
    Ok(Json(page))
}

pub async fn get(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Transaction>, ServerError> {
    let tx = state
        .engine
        .transaction(&principal, budget_id, transaction_id)
        .await?;
    Ok(Json(tx))
}

pub async fn create(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let mut cmd = CreateTransactionCmd::new(
        budget_id,
        payload.account_id,
        map_kind(payload.kind),
        payload.amount,
        payload.date,
        payload.description,
    );
    if let Some(status) = payload.status {
        cmd = cmd.status(map_status(status));
    }
    if let Some(destination) = payload.destination_account_id {
        cmd = cmd.destination(destination);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category(category_id);
    }
    if let Some(source_id) = payload.income_source_id {
        cmd = cmd.income_source(source_id);
    }
    if let Some(bill_id) = payload.recurring_bill_id {
        cmd = cmd.recurring_bill(bill_id);
    }
    if let Some(goal_id) = payload.goal_id {
        cmd = cmd.goal(goal_id);
    }

    let tx = state.engine.create_transaction(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// Creates an installment purchase; responds with the parent followed by
/// its children.
pub async fn installments(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<InstallmentsNew>,
) -> Result<(StatusCode, Json<Vec<Transaction>>), ServerError> {
    let mut cmd = InstallmentPurchaseCmd::new(
        budget_id,
        payload.account_id,
        payload.installment_amount,
        payload.installments,
        payload.date,
        payload.description,
    );
    if let Some(status) = payload.status {
        cmd = cmd.status(map_status(status));
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category(category_id);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }

    let rows = state
        .engine
        .create_installment_purchase(&principal, cmd)
        .await?;
    Ok((StatusCode::CREATED, Json(rows)))
}

pub async fn update(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<Transaction>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new().apply_to_series(payload.apply_to_series);
    if let Some(amount) = payload.amount {
        cmd = cmd.amount(amount);
    }
    if let Some(status) = payload.status {
        cmd = cmd.status(map_status(status));
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category(category_id);
    }
    if let Some(date) = payload.date {
        cmd = cmd.date(date);
    }

    let tx = state
        .engine
        .update_transaction(&principal, budget_id, transaction_id, cmd)
        .await?;
    Ok(Json(tx))
}

/// Deleting an installment parent removes the whole series.
pub async fn delete(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<TransactionsDeleted>, ServerError> {
    let deleted = state
        .engine
        .delete_transaction(&principal, budget_id, transaction_id)
        .await?;
    Ok(Json(TransactionsDeleted { deleted }))
}
