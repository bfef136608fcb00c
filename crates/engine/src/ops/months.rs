//! Month lifecycle: `planning → active → closed`.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    EngineError, MonthState, MonthStatus, Principal, ResultEngine, ScheduledItem, Transaction,
    TransactionKind, TransactionLinks, TransactionStatus, YearMonth, monthly_budget_status,
};

use super::{Engine, with_tx};

/// Result of [`Engine::start_month`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartMonthOutcome {
    pub status: MonthStatus,
    /// Pending transactions created for due obligations.
    pub created: u32,
    /// Obligations left out because no account could be resolved.
    pub skipped: u32,
}

impl Engine {
    /// Lifecycle state of a month; months never started are `planning`.
    pub async fn month_status(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<MonthStatus> {
        let month = YearMonth::new(year, month)?;
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            self.month_status_in(&db_tx, budget_id, month).await
        })
    }

    pub(super) async fn month_status_in(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
    ) -> ResultEngine<MonthStatus> {
        match status_row(db, budget_id, month).await? {
            Some(model) => MonthStatus::try_from(model),
            None => Ok(MonthStatus {
                year: month.year(),
                month: month.month(),
                state: MonthState::Planning,
                started_at: None,
                closed_at: None,
            }),
        }
    }

    /// Activates a month and turns its due obligations into pending
    /// transactions.
    ///
    /// Calling it again on an active month only materializes obligations
    /// that have no linked transaction yet, so repeated calls create
    /// nothing new. A closed month cannot be started.
    pub async fn start_month(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<StartMonthOutcome> {
        let month = YearMonth::new(year, month)?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let current = self.month_status_in(&db_tx, budget_id, month).await?;
            let status = match current.state {
                MonthState::Active => current,
                state => {
                    state.transition(MonthState::Active)?;
                    let row = monthly_budget_status::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        budget_id: ActiveValue::Set(budget_id.to_string()),
                        year: ActiveValue::Set(month.year()),
                        month: ActiveValue::Set(month.month() as i32),
                        status: ActiveValue::Set(MonthState::Active.as_str().to_string()),
                        started_at: ActiveValue::Set(Some(Utc::now())),
                        closed_at: ActiveValue::Set(None),
                    };
                    monthly_budget_status::Entity::insert(row)
                        .on_conflict(
                            OnConflict::columns([
                                monthly_budget_status::Column::BudgetId,
                                monthly_budget_status::Column::Year,
                                monthly_budget_status::Column::Month,
                            ])
                            .update_columns([
                                monthly_budget_status::Column::Status,
                                monthly_budget_status::Column::StartedAt,
                            ])
                            .to_owned(),
                        )
                        .exec(&db_tx)
                        .await?;
                    info!(%budget_id, %month, "month started");
                    self.month_status_in(&db_tx, budget_id, month).await?
                }
            };

            self.carry_over_into(&db_tx, budget_id, month).await?;

            let items = self.project_month_items(&db_tx, budget_id, month).await?;
            let now = Utc::now();
            let mut created = Vec::new();
            let mut skipped = 0u32;
            for item in items
                .iter()
                .filter(|item| !item.is_materialized() && item.amount() > 0)
            {
                match pending_transaction(budget_id, &principal.user_id, item, now) {
                    Some(tx) => created.push(tx),
                    None => {
                        info!(
                            %budget_id,
                            item_id = item.id(),
                            "obligation has no account; not materialized"
                        );
                        skipped += 1;
                    }
                }
            }
            self.insert_transactions(&db_tx, budget_id, &created).await?;
            info!(%budget_id, %month, created = created.len(), skipped, "obligations materialized");

            Ok(StartMonthOutcome {
                status,
                created: created.len() as u32,
                skipped,
            })
        })
    }

    /// Closes an active month.
    pub async fn close_month(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<MonthStatus> {
        let month = YearMonth::new(year, month)?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let current = self.month_status_in(&db_tx, budget_id, month).await?;
            current.state.transition(MonthState::Closed)?;
            let Some(model) = status_row(&db_tx, budget_id, month).await? else {
                return Err(EngineError::Consistency(
                    "active month without status row".to_string(),
                ));
            };
            let mut active: monthly_budget_status::ActiveModel = model.into();
            active.status = ActiveValue::Set(MonthState::Closed.as_str().to_string());
            active.closed_at = ActiveValue::Set(Some(Utc::now()));
            let updated = active.update(&db_tx).await?;
            info!(%budget_id, %month, "month closed");
            MonthStatus::try_from(updated)
        })
    }
}

async fn status_row(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    month: YearMonth,
) -> ResultEngine<Option<monthly_budget_status::Model>> {
    monthly_budget_status::Entity::find()
        .filter(monthly_budget_status::Column::BudgetId.eq(budget_id.to_string()))
        .filter(monthly_budget_status::Column::Year.eq(month.year()))
        .filter(monthly_budget_status::Column::Month.eq(month.month() as i32))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Pending transaction materializing a projected obligation, or `None` when
/// the obligation has no account to land on.
fn pending_transaction(
    budget_id: Uuid,
    user_id: &str,
    item: &ScheduledItem,
    now: DateTime<Utc>,
) -> Option<Transaction> {
    let (account_id, kind, links) = match item {
        ScheduledItem::Bill(bill) => (
            bill.account_id?,
            TransactionKind::Expense,
            TransactionLinks {
                category_id: Some(bill.category_id),
                recurring_bill_id: Some(bill.bill_id),
                ..TransactionLinks::default()
            },
        ),
        ScheduledItem::Income(income) => (
            income.account_id,
            TransactionKind::Income,
            TransactionLinks {
                income_source_id: Some(income.income_source_id),
                ..TransactionLinks::default()
            },
        ),
        ScheduledItem::Goal(goal) => (
            goal.account_id?,
            TransactionKind::Expense,
            TransactionLinks {
                goal_id: Some(goal.goal_id),
                ..TransactionLinks::default()
            },
        ),
    };
    Some(Transaction {
        id: Uuid::new_v4(),
        budget_id,
        account_id,
        destination_account_id: None,
        kind,
        status: TransactionStatus::Pending,
        amount: item.amount(),
        date: item.due_date(),
        description: item.name().to_string(),
        notes: None,
        links,
        installment: None,
        created_by: user_id.to_string(),
        created_at: now,
        updated_at: now,
    })
}
