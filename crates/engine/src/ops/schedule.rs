//! Recurring schedule projector.

use std::collections::HashMap;

use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    BillFrequency, DateRange, Goal, IncomeFrequency, MonthState, Principal, ResultEngine,
    Schedule, ScheduleKind, ScheduleTotals, ScheduledBill, ScheduledGoal, ScheduledIncome,
    ScheduledItem, TransactionStatus, YearMonth, goal_contributions, goals, income_sources,
    recurring_bills,
    schedule::{bill_due_dates, income_due_date, sort_items, synthetic_id},
    transactions,
    util::{parse_optional_uuid, parse_uuid},
};

use super::{Engine, with_tx};

/// Transactions of the month linked to one source, oldest first.
#[derive(Debug, Default)]
struct Linked {
    all: Vec<Uuid>,
    confirmed: Vec<Uuid>,
}

impl Linked {
    fn push(&mut self, id: Uuid, confirmed: bool) {
        self.all.push(id);
        if confirmed {
            self.confirmed.push(id);
        }
    }

    /// `(paid, materialized, transaction_id)` of the `k`-th occurrence
    /// (1-based).
    fn occurrence(&self, k: usize) -> (bool, bool, Option<Uuid>) {
        let paid = self.confirmed.len() >= k;
        let transaction_id = if paid {
            self.confirmed.get(k - 1).copied()
        } else {
            self.all.get(k - 1).copied()
        };
        (paid, self.all.len() >= k, transaction_id)
    }
}

#[derive(Debug, Default)]
struct MonthLinks {
    bills: HashMap<String, Linked>,
    income: HashMap<String, Linked>,
    goals: HashMap<String, Linked>,
}

impl Engine {
    /// Projects the obligations of a month, optionally restricted to a
    /// window inside it.
    ///
    /// Only `active` months project anything; other months return an empty
    /// list.
    pub async fn project_schedule(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        range: DateRange,
    ) -> ResultEngine<Schedule> {
        let month = range.year_month()?;
        self.ensure_month_allocations_best_effort(principal, budget_id, month)
            .await;

        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            let status = self.month_status_in(&db_tx, budget_id, month).await?;
            let allocations_exist = self.allocations_exist(&db_tx, budget_id, month).await?;

            let month_items = if status.state == MonthState::Active {
                self.project_month_items(&db_tx, budget_id, month).await?
            } else {
                Vec::new()
            };
            let month_totals = ScheduleTotals::tally(&month_items);
            let items: Vec<ScheduledItem> = month_items
                .into_iter()
                .filter(|item| range.contains(item.due_date()))
                .collect();
            debug!(%budget_id, %month, items = items.len(), "schedule projected");

            Ok(Schedule {
                year: month.year(),
                month: month.month(),
                from: range.start,
                to: range.end,
                status: status.state,
                allocations_exist,
                totals: ScheduleTotals::tally(&items),
                items,
                month_totals,
            })
        })
    }

    /// Every obligation of `month`, sorted, regardless of the month state.
    pub(super) async fn project_month_items(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
    ) -> ResultEngine<Vec<ScheduledItem>> {
        let links = month_links(db, budget_id, month).await?;
        let mut items = Vec::new();
        project_bills(db, budget_id, month, &links, &mut items).await?;
        self.project_income(db, budget_id, month, &links, &mut items)
            .await?;
        project_goals(db, budget_id, month, &links, &mut items).await?;
        sort_items(&mut items);
        Ok(items)
    }

    async fn project_income(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        month: YearMonth,
        links: &MonthLinks,
        items: &mut Vec<ScheduledItem>,
    ) -> ResultEngine<()> {
        let amounts = self.income_amounts(db, budget_id, month).await?;
        let sources = income_sources::Entity::find()
            .filter(income_sources::Column::BudgetId.eq(budget_id.to_string()))
            .filter(income_sources::Column::Active.eq(true))
            .all(db)
            .await?;
        for source in sources {
            let Some(amount) = amounts.get(&source.id).copied() else {
                continue;
            };
            let frequency = IncomeFrequency::try_from(source.frequency.as_str())?;
            let Some(due_date) =
                income_due_date(frequency, source.day_of_month.map(|d| d as u32), month)
            else {
                continue;
            };
            let source_id = parse_uuid(&source.id, "income source")?;
            let (paid, materialized, transaction_id) = links
                .income
                .get(&source.id)
                .map(|linked| linked.occurrence(1))
                .unwrap_or_default();
            items.push(ScheduledItem::Income(ScheduledIncome {
                id: synthetic_id(ScheduleKind::Income, source_id, month, None),
                income_source_id: source_id,
                member_id: parse_uuid(&source.member_id, "member")?,
                name: source.name,
                amount,
                due_date,
                account_id: parse_uuid(&source.account_id, "account")?,
                paid,
                materialized,
                transaction_id,
            }));
        }
        Ok(())
    }
}

async fn month_links(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    month: YearMonth,
) -> ResultEngine<MonthLinks> {
    let range = month.range();
    let rows = transactions::Entity::find()
        .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
        .filter(transactions::Column::Date.between(range.start, range.end))
        .filter(
            Condition::any()
                .add(transactions::Column::RecurringBillId.is_not_null())
                .add(transactions::Column::IncomeSourceId.is_not_null())
                .add(transactions::Column::GoalId.is_not_null()),
        )
        .order_by_asc(transactions::Column::Date)
        .order_by_asc(transactions::Column::CreatedAt)
        .order_by_asc(transactions::Column::Id)
        .all(db)
        .await?;

    let mut links = MonthLinks::default();
    for row in rows {
        let id = parse_uuid(&row.id, "transaction")?;
        let confirmed = TransactionStatus::try_from(row.status.as_str())?.is_confirmed();
        if let Some(bill_id) = row.recurring_bill_id {
            links.bills.entry(bill_id).or_default().push(id, confirmed);
        }
        if let Some(source_id) = row.income_source_id {
            links.income.entry(source_id).or_default().push(id, confirmed);
        }
        if let Some(goal_id) = row.goal_id {
            links.goals.entry(goal_id).or_default().push(id, confirmed);
        }
    }
    Ok(links)
}

async fn project_bills(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    month: YearMonth,
    links: &MonthLinks,
    items: &mut Vec<ScheduledItem>,
) -> ResultEngine<()> {
    let last_day = month.last_day();
    let bills = recurring_bills::Entity::find()
        .filter(recurring_bills::Column::BudgetId.eq(budget_id.to_string()))
        .filter(recurring_bills::Column::Active.eq(true))
        .all(db)
        .await?;
    let no_links = Linked::default();

    for bill in bills {
        if bill.created_at.date_naive() > last_day {
            continue;
        }
        let frequency = BillFrequency::try_from(bill.frequency.as_str())?;
        let dates = bill_due_dates(
            frequency,
            bill.due_day as u32,
            bill.due_month.map(|m| m as u32),
            month,
        );
        let bill_id = parse_uuid(&bill.id, "recurring bill")?;
        let category_id = parse_uuid(&bill.category_id, "category")?;
        let account_id = parse_optional_uuid(bill.account_id.as_deref(), "account")?;
        let linked = links.bills.get(&bill.id).unwrap_or(&no_links);
        let weekly = frequency == BillFrequency::Weekly;

        for (index, due_date) in dates.into_iter().enumerate() {
            let k = index + 1;
            let occurrence = weekly.then_some(k as u32);
            let (paid, materialized, transaction_id) = linked.occurrence(k);
            items.push(ScheduledItem::Bill(ScheduledBill {
                id: synthetic_id(ScheduleKind::Bill, bill_id, month, occurrence),
                bill_id,
                name: bill.name.clone(),
                amount: bill.amount,
                due_date,
                category_id,
                account_id,
                is_auto_debit: bill.is_auto_debit,
                is_variable: bill.is_variable,
                occurrence,
                paid,
                materialized,
                transaction_id,
            }));
        }
    }
    Ok(())
}

async fn project_goals(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    month: YearMonth,
    links: &MonthLinks,
    items: &mut Vec<ScheduledItem>,
) -> ResultEngine<()> {
    let last_day = month.last_day();
    let models = goals::Entity::find()
        .filter(goals::Column::BudgetId.eq(budget_id.to_string()))
        .filter(goals::Column::Active.eq(true))
        .filter(goals::Column::TargetDate.is_not_null())
        .all(db)
        .await?;
    if models.is_empty() {
        return Ok(());
    }

    // Contributions from this month on are excluded from the goal progress
    // so the target of a month stays put once it is paid.
    let contributions = goal_contributions::Entity::find()
        .filter(goal_contributions::Column::BudgetId.eq(budget_id.to_string()))
        .filter(goal_contributions::Column::Date.gte(month.first_day()))
        .all(db)
        .await?;
    let mut later_amounts: HashMap<&str, i64> = HashMap::new();
    let mut paid_by: HashMap<&str, String> = HashMap::new();
    for contribution in &contributions {
        *later_amounts.entry(contribution.goal_id.as_str()).or_default() += contribution.amount;
        if contribution.year == month.year() && contribution.month == month.month() as i32 {
            paid_by
                .entry(contribution.goal_id.as_str())
                .or_insert_with(|| contribution.transaction_id.clone());
        }
    }

    for model in models {
        if model.created_at.date_naive() > last_day {
            continue;
        }
        let mut goal = Goal::try_from(model)?;
        let key = goal.id.to_string();
        goal.current_amount -= later_amounts.get(key.as_str()).copied().unwrap_or_default();
        if goal.is_complete() {
            continue;
        }
        let Some(target) = goal.monthly_target(month) else {
            continue;
        };
        let Some(target_date) = goal.target_date else {
            continue;
        };
        let months_remaining = month.months_until(YearMonth::of(target_date)).max(1);

        let linked = links.goals.get(&key);
        let paid_tx = paid_by
            .get(key.as_str())
            .map(|id| parse_uuid(id, "transaction"))
            .transpose()?;
        let materialized = paid_tx.is_some() || linked.is_some_and(|l| !l.all.is_empty());
        let transaction_id = paid_tx.or_else(|| linked.and_then(|l| l.all.first().copied()));

        items.push(ScheduledItem::Goal(ScheduledGoal {
            id: synthetic_id(ScheduleKind::Goal, goal.id, month, None),
            goal_id: goal.id,
            amount: target.cents(),
            due_date: last_day,
            account_id: goal.account_id,
            remaining: goal.remaining().cents(),
            months_remaining,
            paid: paid_tx.is_some(),
            materialized,
            transaction_id,
            name: goal.name,
        }));
    }
    Ok(())
}
