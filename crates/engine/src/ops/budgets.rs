//! Budget setup: budgets, members, accounts, categories, bills and income
//! sources.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    AccountKind, BillFrequency, Currency, EngineError, MemberRole, MoneyCents, NewAccountCmd,
    NewCategoryCmd, NewIncomeSourceCmd, NewRecurringBillCmd, Principal, ResultEngine, YearMonth,
    accounts, budgets, categories, category_groups, income_sources, members,
    monthly_income_allocations, recurring_bills,
    util::{name_key, normalize_required_name, parse_uuid, validate_day_of_month},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a budget owned by `user_id`, who becomes its first member.
    ///
    /// Returns the new budget id. The caller's [`Principal`] must be
    /// extended with it (see [`Principal::with_budget`]).
    pub async fn create_budget(
        &self,
        user_id: &str,
        member_name: &str,
        name: &str,
        currency: Currency,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "budget")?;
        let member_name = normalize_required_name(member_name, "member")?;
        if user_id.trim().is_empty() {
            return Err(EngineError::Validation(
                "user id must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let budget_id = Uuid::new_v4();
            let now = Utc::now();
            budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                name: ActiveValue::Set(name),
                currency: ActiveValue::Set(currency.code().to_string()),
                created_by: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            insert_member(&db_tx, budget_id, user_id, member_name, MemberRole::Owner).await?;
            info!(%budget_id, user_id, "budget created");
            Ok(budget_id)
        })
    }

    /// Adds a member to a budget. Only owners can manage members.
    pub async fn add_member(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        user_id: &str,
        name: &str,
        role: MemberRole,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "member")?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            if self.member_role(&db_tx, budget_id, &principal.user_id).await?
                != Some(MemberRole::Owner)
            {
                return Err(EngineError::Forbidden(
                    "only owners can manage members".to_string(),
                ));
            }
            if self.member_role(&db_tx, budget_id, user_id).await?.is_some() {
                return Err(EngineError::ExistingKey(user_id.to_string()));
            }
            insert_member(&db_tx, budget_id, user_id, name, role).await
        })
    }

    /// Id of the caller's member row in a budget.
    pub async fn member_id(&self, principal: &Principal, budget_id: Uuid) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            let model = members::Entity::find()
                .filter(members::Column::BudgetId.eq(budget_id.to_string()))
                .filter(members::Column::UserId.eq(principal.user_id.as_str()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("member not exists".to_string()))?;
            parse_uuid(&model.id, "member")
        })
    }

    pub async fn create_account(
        &self,
        principal: &Principal,
        cmd: NewAccountCmd,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "account")?;
        let name_norm = name_key(&name);
        if cmd.kind == AccountKind::CreditCard {
            match (cmd.closing_day, cmd.due_day) {
                (Some(closing), Some(due)) => {
                    validate_day_of_month(closing, "closing_day")?;
                    validate_day_of_month(due, "due_day")?;
                }
                _ => {
                    return Err(EngineError::Validation(
                        "credit cards require closing_day and due_day".to_string(),
                    ));
                }
            }
        } else if cmd.closing_day.is_some() || cmd.due_day.is_some() {
            return Err(EngineError::Validation(
                "only credit cards have a card cycle".to_string(),
            ));
        }
        if let Some(limit) = cmd.credit_limit {
            MoneyCents::non_negative(limit, "credit_limit")?;
        }

        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            let exists = accounts::Entity::find()
                .filter(accounts::Column::BudgetId.eq(cmd.budget_id.to_string()))
                .filter(accounts::Column::NameNorm.eq(name_norm.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let account_id = Uuid::new_v4();
            accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                budget_id: ActiveValue::Set(cmd.budget_id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                balance: ActiveValue::Set(0),
                cleared_balance: ActiveValue::Set(0),
                credit_limit: ActiveValue::Set(cmd.credit_limit),
                closing_day: ActiveValue::Set(cmd.closing_day.map(|d| d as i32)),
                due_day: ActiveValue::Set(cmd.due_day.map(|d| d as i32)),
                archived: ActiveValue::Set(false),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            info!(budget_id = %cmd.budget_id, %account_id, kind = %cmd.kind, "account created");
            Ok(account_id)
        })
    }

    pub async fn create_category_group(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        name: &str,
        sort_order: i32,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "category group")?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let group_id = Uuid::new_v4();
            category_groups::ActiveModel {
                id: ActiveValue::Set(group_id.to_string()),
                budget_id: ActiveValue::Set(budget_id.to_string()),
                name: ActiveValue::Set(name),
                sort_order: ActiveValue::Set(sort_order),
            }
            .insert(&db_tx)
            .await?;
            Ok(group_id)
        })
    }

    pub async fn create_category(
        &self,
        principal: &Principal,
        cmd: NewCategoryCmd,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "category")?;
        let name_norm = name_key(&name);
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            self.require_group(&db_tx, cmd.budget_id, cmd.group_id)
                .await?;
            if let Some(member_id) = cmd.member_id {
                self.require_member(&db_tx, cmd.budget_id, member_id)
                    .await?;
            }
            let exists = categories::Entity::find()
                .filter(categories::Column::BudgetId.eq(cmd.budget_id.to_string()))
                .filter(categories::Column::NameNorm.eq(name_norm.as_str()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let category_id = Uuid::new_v4();
            categories::ActiveModel {
                id: ActiveValue::Set(category_id.to_string()),
                budget_id: ActiveValue::Set(cmd.budget_id.to_string()),
                group_id: ActiveValue::Set(cmd.group_id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                behavior: ActiveValue::Set(cmd.behavior.as_str().to_string()),
                member_id: ActiveValue::Set(cmd.member_id.map(|id| id.to_string())),
                archived: ActiveValue::Set(false),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(category_id)
        })
    }

    /// Archives a category. Its allocation rows stay in place, inert.
    pub async fn archive_category(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let model = self
                .require_category(&db_tx, budget_id, category_id)
                .await?;
            let mut active: categories::ActiveModel = model.into();
            active.archived = ActiveValue::Set(true);
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Declares a recurring bill. A category is tied to at most one active
    /// bill.
    pub async fn create_recurring_bill(
        &self,
        principal: &Principal,
        cmd: NewRecurringBillCmd,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "bill")?;
        MoneyCents::positive(cmd.amount, "amount")?;
        match cmd.frequency {
            BillFrequency::Weekly => {
                if !(1..=7).contains(&cmd.due_day) {
                    return Err(EngineError::Validation(
                        "weekly bills need due_day between 1 (Monday) and 7 (Sunday)".to_string(),
                    ));
                }
            }
            BillFrequency::Monthly => validate_day_of_month(cmd.due_day, "due_day")?,
            BillFrequency::Yearly => {
                validate_day_of_month(cmd.due_day, "due_day")?;
                match cmd.due_month {
                    Some(month) => {
                        YearMonth::new(2000, month)?;
                    }
                    None => {
                        return Err(EngineError::Validation(
                            "yearly bills require due_month".to_string(),
                        ));
                    }
                }
            }
        }

        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            self.require_category(&db_tx, cmd.budget_id, cmd.category_id)
                .await?;
            if let Some(account_id) = cmd.account_id {
                self.require_account(&db_tx, cmd.budget_id, account_id)
                    .await?;
            }
            let taken = recurring_bills::Entity::find()
                .filter(recurring_bills::Column::CategoryId.eq(cmd.category_id.to_string()))
                .filter(recurring_bills::Column::Active.eq(true))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(
                    "category already has an active bill".to_string(),
                ));
            }

            let bill_id = Uuid::new_v4();
            recurring_bills::ActiveModel {
                id: ActiveValue::Set(bill_id.to_string()),
                budget_id: ActiveValue::Set(cmd.budget_id.to_string()),
                category_id: ActiveValue::Set(cmd.category_id.to_string()),
                account_id: ActiveValue::Set(cmd.account_id.map(|id| id.to_string())),
                name: ActiveValue::Set(name),
                amount: ActiveValue::Set(cmd.amount),
                frequency: ActiveValue::Set(cmd.frequency.as_str().to_string()),
                due_day: ActiveValue::Set(cmd.due_day as i32),
                due_month: ActiveValue::Set(cmd.due_month.map(|m| m as i32)),
                is_auto_debit: ActiveValue::Set(cmd.is_auto_debit),
                is_variable: ActiveValue::Set(cmd.is_variable),
                active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(bill_id)
        })
    }

    pub async fn create_income_source(
        &self,
        principal: &Principal,
        cmd: NewIncomeSourceCmd,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "income source")?;
        MoneyCents::non_negative(cmd.amount, "amount")?;
        if let Some(day) = cmd.day_of_month {
            validate_day_of_month(day, "day_of_month")?;
        }
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            self.require_member(&db_tx, cmd.budget_id, cmd.member_id)
                .await?;
            self.require_account(&db_tx, cmd.budget_id, cmd.account_id)
                .await?;

            let source_id = Uuid::new_v4();
            income_sources::ActiveModel {
                id: ActiveValue::Set(source_id.to_string()),
                budget_id: ActiveValue::Set(cmd.budget_id.to_string()),
                member_id: ActiveValue::Set(cmd.member_id.to_string()),
                account_id: ActiveValue::Set(cmd.account_id.to_string()),
                name: ActiveValue::Set(name),
                amount: ActiveValue::Set(cmd.amount),
                frequency: ActiveValue::Set(cmd.frequency.as_str().to_string()),
                day_of_month: ActiveValue::Set(cmd.day_of_month.map(|d| d as i32)),
                active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(source_id)
        })
    }

    /// Overrides the amount an income source brings in one month.
    pub async fn set_income_allocation(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        income_source_id: Uuid,
        year: i32,
        month: u32,
        amount: i64,
    ) -> ResultEngine<()> {
        let month = YearMonth::new(year, month)?;
        MoneyCents::non_negative(amount, "amount")?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            self.require_income_source(&db_tx, budget_id, income_source_id)
                .await?;
            let row = monthly_income_allocations::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                budget_id: ActiveValue::Set(budget_id.to_string()),
                income_source_id: ActiveValue::Set(income_source_id.to_string()),
                year: ActiveValue::Set(month.year()),
                month: ActiveValue::Set(month.month() as i32),
                amount: ActiveValue::Set(amount),
                updated_at: ActiveValue::Set(Utc::now()),
            };
            monthly_income_allocations::Entity::insert(row)
                .on_conflict(
                    OnConflict::columns([
                        monthly_income_allocations::Column::IncomeSourceId,
                        monthly_income_allocations::Column::Year,
                        monthly_income_allocations::Column::Month,
                    ])
                    .update_columns([
                        monthly_income_allocations::Column::Amount,
                        monthly_income_allocations::Column::UpdatedAt,
                    ])
                    .to_owned(),
                )
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}

async fn insert_member(
    db: &DatabaseTransaction,
    budget_id: Uuid,
    user_id: &str,
    name: String,
    role: MemberRole,
) -> ResultEngine<Uuid> {
    let member_id = Uuid::new_v4();
    members::ActiveModel {
        id: ActiveValue::Set(member_id.to_string()),
        budget_id: ActiveValue::Set(budget_id.to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        name: ActiveValue::Set(name),
        role: ActiveValue::Set(role.as_str().to_string()),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(db)
    .await?;
    Ok(member_id)
}
