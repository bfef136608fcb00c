//! Envelope allocations and the monthly carry-over pass.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::OnConflict,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    AllocationView, BillFrequency, CategoryAllocation, CategoryBehavior, DateRange, EngineError,
    GroupAllocation, MoneyCents, Principal, ResultEngine, TransactionKind, TransactionStatus,
    YearMonth, allocation::carry_over, categories, category_groups, income_sources, monthly_allocations,
    monthly_income_allocations, recurring_bills, schedule::bill_due_dates, transactions,
    util::parse_uuid,
};

use super::{Engine, with_tx};

/// Confirmed and pending expense totals per category.
#[derive(Debug, Default)]
pub(super) struct CategorySpend {
    pub(super) confirmed: HashMap<Uuid, i64>,
    pub(super) pending: HashMap<Uuid, i64>,
}

impl Engine {
    /// Makes sure `month` holds the carry-over owed by the previous month.
    ///
    /// Idempotent: running it any number of times leaves the same rows.
    pub async fn ensure_month_allocations(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<()> {
        let month = YearMonth::new(year, month)?;
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            self.carry_over_into(&db_tx, budget_id, month).await
        })
    }

    /// Best-effort carry-over used by read paths: failures are logged and
    /// treated as nothing to carry.
    pub(super) async fn ensure_month_allocations_best_effort(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        month: YearMonth,
    ) {
        if let Err(err) = self
            .ensure_month_allocations(principal, budget_id, month.year(), month.month())
            .await
        {
            warn!(%budget_id, %month, error = %err, "carry-over pass failed");
        }
    }

    pub(super) async fn carry_over_into(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
    ) -> ResultEngine<()> {
        let previous = month.previous();
        let previous_rows = allocation_rows(db, budget_id, previous).await?;
        if previous_rows.is_empty() {
            return Ok(());
        }

        let spent = self
            .category_spend(db, budget_id, previous.range())
            .await?
            .confirmed;
        let current_rows: HashMap<String, monthly_allocations::Model> =
            allocation_rows(db, budget_id, month)
                .await?
                .into_iter()
                .map(|row| (row.category_id.clone(), row))
                .collect();

        let mut changed = 0u32;
        for prev in previous_rows {
            let category_id = parse_uuid(&prev.category_id, "category")?;
            let spent = spent.get(&category_id).copied().unwrap_or_default();
            let carry = carry_over(prev.allocated, prev.carried_over, spent)?;

            match current_rows.get(&prev.category_id) {
                Some(current) if current.carried_over == carry => {}
                Some(current) => {
                    let mut active: monthly_allocations::ActiveModel = current.clone().into();
                    active.carried_over = ActiveValue::Set(carry);
                    active.updated_at = ActiveValue::Set(Utc::now());
                    active.update(db).await?;
                    changed += 1;
                }
                None if carry > 0 => {
                    let row = monthly_allocations::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        budget_id: ActiveValue::Set(budget_id.to_string()),
                        category_id: ActiveValue::Set(prev.category_id.clone()),
                        year: ActiveValue::Set(month.year()),
                        month: ActiveValue::Set(month.month() as i32),
                        allocated: ActiveValue::Set(0),
                        carried_over: ActiveValue::Set(carry),
                        updated_at: ActiveValue::Set(Utc::now()),
                    };
                    monthly_allocations::Entity::insert(row)
                        .on_conflict(
                            allocation_conflict()
                                .update_columns([
                                    monthly_allocations::Column::CarriedOver,
                                    monthly_allocations::Column::UpdatedAt,
                                ])
                                .to_owned(),
                        )
                        .exec(db)
                        .await?;
                    changed += 1;
                }
                None => {}
            }
        }
        debug!(%budget_id, %month, changed, "carry-over applied");
        Ok(())
    }

    /// Sets the amount allocated to a category for a month. The carry-over
    /// column is left untouched.
    pub async fn set_allocation(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        category_id: Uuid,
        year: i32,
        month: u32,
        allocated: i64,
    ) -> ResultEngine<()> {
        let month = YearMonth::new(year, month)?;
        MoneyCents::non_negative(allocated, "allocated")?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            self.require_category(&db_tx, budget_id, category_id)
                .await?;
            let row = monthly_allocations::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                budget_id: ActiveValue::Set(budget_id.to_string()),
                category_id: ActiveValue::Set(category_id.to_string()),
                year: ActiveValue::Set(month.year()),
                month: ActiveValue::Set(month.month() as i32),
                allocated: ActiveValue::Set(allocated),
                carried_over: ActiveValue::Set(0),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            monthly_allocations::Entity::insert(row)
                .on_conflict(
                    allocation_conflict()
                        .update_columns([
                            monthly_allocations::Column::Allocated,
                            monthly_allocations::Column::UpdatedAt,
                        ])
                        .to_owned(),
                )
                .exec(&db_tx)
                .await?;
            debug!(%budget_id, %category_id, %month, allocated, "allocation set");
            Ok(())
        })
    }

    /// Allocation screen of a month: envelopes grouped by category group,
    /// with spending, availability and the income left to allocate.
    pub async fn allocation_view(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        year: i32,
        month: u32,
    ) -> ResultEngine<AllocationView> {
        let month = YearMonth::new(year, month)?;
        self.ensure_month_allocations_best_effort(principal, budget_id, month)
            .await;

        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            let status = self.month_status_in(&db_tx, budget_id, month).await?;
            let last_day = month.last_day();

            let stored: HashMap<String, monthly_allocations::Model> =
                allocation_rows(&db_tx, budget_id, month)
                    .await?
                    .into_iter()
                    .map(|row| (row.category_id.clone(), row))
                    .collect();

            let mut bill_amounts: HashMap<String, (Uuid, i64)> = HashMap::new();
            let bills = recurring_bills::Entity::find()
                .filter(recurring_bills::Column::BudgetId.eq(budget_id.to_string()))
                .filter(recurring_bills::Column::Active.eq(true))
                .all(&db_tx)
                .await?;
            for bill in bills {
                if bill.created_at.date_naive() > last_day {
                    continue;
                }
                let frequency = BillFrequency::try_from(bill.frequency.as_str())?;
                let occurrences = bill_due_dates(
                    frequency,
                    bill.due_day as u32,
                    bill.due_month.map(|m| m as u32),
                    month,
                )
                .len() as i64;
                if occurrences > 0 {
                    let amount = MoneyCents::new(bill.amount)
                        .checked_mul(occurrences)
                        .ok_or_else(|| {
                            EngineError::Validation("bill amount out of range".to_string())
                        })?;
                    bill_amounts.insert(
                        bill.category_id.clone(),
                        (parse_uuid(&bill.id, "recurring bill")?, amount.cents()),
                    );
                }
            }

            let spend = self.category_spend(&db_tx, budget_id, month.range()).await?;

            let group_models = category_groups::Entity::find()
                .filter(category_groups::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(category_groups::Column::SortOrder)
                .order_by_asc(category_groups::Column::Name)
                .all(&db_tx)
                .await?;
            let category_models = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(budget_id.to_string()))
                .filter(categories::Column::Archived.eq(false))
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;

            let mut groups = Vec::with_capacity(group_models.len());
            for group in group_models {
                let mut rows = Vec::new();
                for category in category_models.iter().filter(|c| c.group_id == group.id) {
                    let category_id = parse_uuid(&category.id, "category")?;
                    let behavior = CategoryBehavior::try_from(category.behavior.as_str())?;
                    let (stored_allocated, carried_over) = stored
                        .get(&category.id)
                        .map(|row| (row.allocated, row.carried_over))
                        .unwrap_or_default();
                    let bill = bill_amounts.get(&category.id).copied();
                    rows.push(CategoryAllocation::new(
                        category_id,
                        category.name.clone(),
                        behavior,
                        bill.map_or(stored_allocated, |(_, amount)| amount),
                        carried_over,
                        spend.confirmed.get(&category_id).copied().unwrap_or_default(),
                        spend.pending.get(&category_id).copied().unwrap_or_default(),
                        bill.map(|(bill_id, _)| bill_id),
                    ));
                }
                groups.push(GroupAllocation::new(
                    parse_uuid(&group.id, "category group")?,
                    group.name,
                    group.sort_order,
                    rows,
                ));
            }

            let planned = self.planned_income(&db_tx, budget_id, month).await?;
            let received = self
                .confirmed_total(&db_tx, budget_id, TransactionKind::Income, month.range())
                .await?;

            Ok(AllocationView::new(
                month.year(),
                month.month(),
                status.state,
                groups,
                planned,
                received,
            ))
        })
    }

    /// Expense totals per category inside `range`.
    pub(super) async fn category_spend(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        range: DateRange,
    ) -> ResultEngine<CategorySpend> {
        let rows: Vec<(Option<String>, i64, String)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::CategoryId)
            .column(transactions::Column::Amount)
            .column(transactions::Column::Status)
            .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
            .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
            .filter(transactions::Column::CategoryId.is_not_null())
            .filter(transactions::Column::Date.between(range.start, range.end))
            .into_tuple()
            .all(db)
            .await?;

        let mut spend = CategorySpend::default();
        for (category_id, amount, status) in rows {
            let Some(category_id) = category_id else {
                continue;
            };
            let category_id = parse_uuid(&category_id, "category")?;
            let bucket = if TransactionStatus::try_from(status.as_str())?.is_confirmed() {
                &mut spend.confirmed
            } else {
                &mut spend.pending
            };
            *bucket.entry(category_id).or_default() += amount;
        }
        Ok(spend)
    }

    /// Sum of confirmed transactions of a kind inside `range`.
    pub(super) async fn confirmed_total(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        kind: TransactionKind,
        range: DateRange,
    ) -> ResultEngine<i64> {
        let amounts: Vec<i64> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Amount)
            .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::Status.is_in([
                TransactionStatus::Cleared.as_str(),
                TransactionStatus::Reconciled.as_str(),
            ]))
            .filter(transactions::Column::Date.between(range.start, range.end))
            .into_tuple()
            .all(db)
            .await?;
        Ok(amounts.into_iter().sum())
    }

    /// Amount each active income source brings in `month`, honouring the
    /// monthly overrides. Keyed by income source id.
    pub(super) async fn income_amounts(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
    ) -> ResultEngine<HashMap<String, i64>> {
        let overrides: HashMap<String, i64> = monthly_income_allocations::Entity::find()
            .filter(monthly_income_allocations::Column::BudgetId.eq(budget_id.to_string()))
            .filter(monthly_income_allocations::Column::Year.eq(month.year()))
            .filter(monthly_income_allocations::Column::Month.eq(month.month() as i32))
            .all(db)
            .await?
            .into_iter()
            .map(|row| (row.income_source_id, row.amount))
            .collect();

        let last_day = month.last_day();
        Ok(income_sources::Entity::find()
            .filter(income_sources::Column::BudgetId.eq(budget_id.to_string()))
            .filter(income_sources::Column::Active.eq(true))
            .all(db)
            .await?
            .into_iter()
            .filter(|source| source.created_at.date_naive() <= last_day)
            .map(|source| {
                let amount = overrides.get(&source.id).copied().unwrap_or(source.amount);
                (source.id, amount)
            })
            .collect())
    }

    async fn planned_income(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
    ) -> ResultEngine<i64> {
        Ok(self
            .income_amounts(db, budget_id, month)
            .await?
            .values()
            .sum())
    }

    pub(super) async fn allocations_exist(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
    ) -> ResultEngine<bool> {
        let count = monthly_allocations::Entity::find()
            .filter(monthly_allocations::Column::BudgetId.eq(budget_id.to_string()))
            .filter(monthly_allocations::Column::Year.eq(month.year()))
            .filter(monthly_allocations::Column::Month.eq(month.month() as i32))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}

async fn allocation_rows(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    month: YearMonth,
) -> ResultEngine<Vec<monthly_allocations::Model>> {
    monthly_allocations::Entity::find()
        .filter(monthly_allocations::Column::BudgetId.eq(budget_id.to_string()))
        .filter(monthly_allocations::Column::Year.eq(month.year()))
        .filter(monthly_allocations::Column::Month.eq(month.month() as i32))
        .all(db)
        .await
        .map_err(Into::into)
}

fn allocation_conflict() -> OnConflict {
    OnConflict::columns([
        monthly_allocations::Column::BudgetId,
        monthly_allocations::Column::CategoryId,
        monthly_allocations::Column::Year,
        monthly_allocations::Column::Month,
    ])
}
