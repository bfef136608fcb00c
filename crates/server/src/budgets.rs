//! Budget setup endpoints: members, accounts, categories, recurring
//! obligations.

use api_types::{
    Created, Currency as ApiCurrency,
    account::{AccountKind as ApiAccountKind, AccountNew},
    budget::{BudgetNew, MemberNew, MemberRole as ApiRole},
    category::{CategoryBehavior as ApiBehavior, CategoryNew, GroupNew},
    recurring::{
        BillFrequency as ApiBillFrequency, BillNew, IncomeAllocationSet,
        IncomeFrequency as ApiIncomeFrequency, IncomeSourceNew,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    Account, AccountKind, BillFrequency, CategoryBehavior, Currency, IncomeFrequency,
    MemberRole, NewAccountCmd, NewCategoryCmd, NewIncomeSourceCmd, NewRecurringBillCmd,
    Principal,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_currency(currency: ApiCurrency) -> Currency {
    match currency {
        ApiCurrency::Brl => Currency::Brl,
        ApiCurrency::Eur => Currency::Eur,
        ApiCurrency::Usd => Currency::Usd,
    }
}

fn map_role(role: ApiRole) -> MemberRole {
    match role {
        ApiRole::Owner => MemberRole::Owner,
        ApiRole::Editor => MemberRole::Editor,
        ApiRole::Viewer => MemberRole::Viewer,
    }
}

fn map_account_kind(kind: ApiAccountKind) -> AccountKind {
    match kind {
        ApiAccountKind::Checking => AccountKind::Checking,
        ApiAccountKind::Savings => AccountKind::Savings,
        ApiAccountKind::Cash => AccountKind::Cash,
        ApiAccountKind::CreditCard => AccountKind::CreditCard,
        ApiAccountKind::Investment => AccountKind::Investment,
    }
}

fn map_behavior(behavior: ApiBehavior) -> CategoryBehavior {
    match behavior {
        ApiBehavior::RefillUp => CategoryBehavior::RefillUp,
        ApiBehavior::SetAside => CategoryBehavior::SetAside,
    }
}

fn map_bill_frequency(frequency: ApiBillFrequency) -> BillFrequency {
    match frequency {
        ApiBillFrequency::Weekly => BillFrequency::Weekly,
        ApiBillFrequency::Monthly => BillFrequency::Monthly,
        ApiBillFrequency::Yearly => BillFrequency::Yearly,
    }
}

fn map_income_frequency(frequency: ApiIncomeFrequency) -> IncomeFrequency {
    match frequency {
        ApiIncomeFrequency::Monthly => IncomeFrequency::Monthly,
        ApiIncomeFrequency::Weekly => IncomeFrequency::Weekly,
        ApiIncomeFrequency::Yearly => IncomeFrequency::Yearly,
        ApiIncomeFrequency::Irregular => IncomeFrequency::Irregular,
    }
}

pub async fn budget_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .create_budget(
            &principal.user_id,
            &payload.member_name,
            &payload.name,
            map_currency(payload.currency.unwrap_or_default()),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn member_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .add_member(
            &principal,
            budget_id,
            &payload.user_id,
            &payload.name,
            map_role(payload.role),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn accounts(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Vec<Account>>, ServerError> {
    Ok(Json(state.engine.accounts(&principal, budget_id).await?))
}

pub async fn account(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, account_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Account>, ServerError> {
    Ok(Json(
        state
            .engine
            .account(&principal, budget_id, account_id)
            .await?,
    ))
}

pub async fn account_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = NewAccountCmd::new(budget_id, payload.name, map_account_kind(payload.kind));
    match (payload.closing_day, payload.due_day) {
        (Some(closing_day), Some(due_day)) => cmd = cmd.card_cycle(closing_day, due_day),
        (None, None) => {}
        _ => {
            return Err(ServerError::Generic(
                "closing_day and due_day go together".to_string(),
            ));
        }
    }
    if let Some(limit) = payload.credit_limit {
        cmd = cmd.credit_limit(limit);
    }
    let id = state.engine.create_account(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Rebuilds stored balances from the ledger; returns the repaired accounts.
pub async fn accounts_recompute(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
) -> Result<Json<Vec<Account>>, ServerError> {
    Ok(Json(
        state
            .engine
            .recompute_account_balances(&principal, budget_id)
            .await?,
    ))
}

pub async fn group_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .create_category_group(&principal, budget_id, &payload.name, payload.sort_order)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn category_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = NewCategoryCmd::new(
        budget_id,
        payload.group_id,
        payload.name,
        map_behavior(payload.behavior),
    );
    if let Some(member_id) = payload.member_id {
        cmd = cmd.member(member_id);
    }
    let id = state.engine.create_category(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn category_archive(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .archive_category(&principal, budget_id, category_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bill_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<BillNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = NewRecurringBillCmd::new(
        budget_id,
        payload.category_id,
        payload.name,
        payload.amount,
        map_bill_frequency(payload.frequency),
        payload.due_day,
    )
    .auto_debit(payload.is_auto_debit)
    .variable(payload.is_variable);
    if let Some(month) = payload.due_month {
        cmd = cmd.due_month(month);
    }
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account(account_id);
    }
    let id = state.engine.create_recurring_bill(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn income_source_new(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path(budget_id): Path<Uuid>,
    Json(payload): Json<IncomeSourceNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let member_id = match payload.member_id {
        Some(member_id) => member_id,
        None => state.engine.member_id(&principal, budget_id).await?,
    };
    let mut cmd = NewIncomeSourceCmd::new(
        budget_id,
        member_id,
        payload.account_id,
        payload.name,
        payload.amount,
        map_income_frequency(payload.frequency),
    );
    if let Some(day) = payload.day_of_month {
        cmd = cmd.day_of_month(day);
    }
    let id = state.engine.create_income_source(&principal, cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn income_allocation_set(
    Extension(principal): Extension<Principal>,
    State(state): State<ServerState>,
    Path((budget_id, source_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<IncomeAllocationSet>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_income_allocation(
            &principal,
            budget_id,
            source_id,
            payload.year,
            payload.month,
            payload.amount,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
