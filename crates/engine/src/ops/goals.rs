//! Savings goals and their contributions.

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    ContributeGoalCmd, EngineError, Goal, MoneyCents, NewGoalCmd, Principal, ResultEngine,
    Transaction, TransactionKind, TransactionLinks, TransactionStatus, goal_contributions, goals,
    util::{normalize_description, normalize_required_name},
};

use super::{Engine, with_tx};

/// Whether a transaction row must be backed by a goal contribution.
fn contributes(tx: &Transaction) -> Option<Uuid> {
    match tx.kind {
        TransactionKind::Expense if tx.status.is_confirmed() => tx.links.goal_id,
        _ => None,
    }
}

impl Engine {
    pub async fn create_goal(&self, principal: &Principal, cmd: NewGoalCmd) -> ResultEngine<Uuid> {
        let name = normalize_required_name(&cmd.name, "goal")?;
        MoneyCents::positive(cmd.target_amount, "target_amount")?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            if let Some(account_id) = cmd.account_id {
                self.require_account(&db_tx, cmd.budget_id, account_id)
                    .await?;
            }
            let goal_id = Uuid::new_v4();
            goals::ActiveModel {
                id: ActiveValue::Set(goal_id.to_string()),
                budget_id: ActiveValue::Set(cmd.budget_id.to_string()),
                name: ActiveValue::Set(name),
                target_amount: ActiveValue::Set(cmd.target_amount),
                current_amount: ActiveValue::Set(0),
                target_date: ActiveValue::Set(cmd.target_date),
                account_id: ActiveValue::Set(cmd.account_id.map(|id| id.to_string())),
                active: ActiveValue::Set(true),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            info!(budget_id = %cmd.budget_id, %goal_id, "goal created");
            Ok(goal_id)
        })
    }

    pub async fn goal(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        goal_id: Uuid,
    ) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            Goal::try_from(self.require_goal(&db_tx, budget_id, goal_id).await?)
        })
    }

    pub async fn goals(&self, principal: &Principal, budget_id: Uuid) -> ResultEngine<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            goals::Entity::find()
                .filter(goals::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(goals::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Goal::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Puts money aside for a goal: records a cleared expense linked to the
    /// goal on the source account, which in turn records the contribution.
    pub async fn contribute_to_goal(
        &self,
        principal: &Principal,
        cmd: ContributeGoalCmd,
    ) -> ResultEngine<Transaction> {
        MoneyCents::positive(cmd.amount, "amount")?;
        let description = cmd
            .description
            .as_deref()
            .map(normalize_description)
            .transpose()?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            let goal = Goal::try_from(self.require_goal(&db_tx, cmd.budget_id, cmd.goal_id).await?)?;
            if !goal.active {
                return Err(EngineError::Validation("goal is not active".to_string()));
            }
            let account_id = cmd.account_id.or(goal.account_id).ok_or_else(|| {
                EngineError::Validation(
                    "account_id is required when the goal has no default account".to_string(),
                )
            })?;
            let account = self
                .require_account(&db_tx, cmd.budget_id, account_id)
                .await?;
            if account.archived {
                return Err(EngineError::Validation("account is archived".to_string()));
            }

            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                budget_id: cmd.budget_id,
                account_id,
                destination_account_id: None,
                kind: TransactionKind::Expense,
                status: TransactionStatus::Cleared,
                amount: cmd.amount,
                date: cmd.date,
                description: description
                    .unwrap_or_else(|| format!("Contribution: {}", goal.name)),
                notes: None,
                links: TransactionLinks {
                    goal_id: Some(goal.id),
                    ..TransactionLinks::default()
                },
                installment: None,
                created_by: principal.user_id.clone(),
                created_at: now,
                updated_at: now,
            };
            self.insert_transactions(&db_tx, cmd.budget_id, std::slice::from_ref(&tx))
                .await?;
            Ok(tx)
        })
    }

    /// Brings the contribution of a transaction in line with its current
    /// state: any existing contribution is reversed, then a new one is
    /// recorded when `current` is a confirmed goal-linked expense.
    ///
    /// Pass `None` when the transaction is being deleted.
    pub(super) async fn sync_goal_contribution(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        transaction_id: Uuid,
        current: Option<&Transaction>,
    ) -> ResultEngine<()> {
        let existing = goal_contributions::Entity::find()
            .filter(goal_contributions::Column::TransactionId.eq(transaction_id.to_string()))
            .all(db)
            .await?;
        for contribution in existing {
            bump_goal(db, &contribution.goal_id, -contribution.amount).await?;
            goal_contributions::Entity::delete_by_id(contribution.id)
                .exec(db)
                .await?;
        }

        let Some(tx) = current else {
            return Ok(());
        };
        let Some(goal_id) = contributes(tx) else {
            return Ok(());
        };
        goal_contributions::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            budget_id: ActiveValue::Set(budget_id.to_string()),
            goal_id: ActiveValue::Set(goal_id.to_string()),
            transaction_id: ActiveValue::Set(transaction_id.to_string()),
            amount: ActiveValue::Set(tx.amount),
            date: ActiveValue::Set(tx.date),
            year: ActiveValue::Set(tx.date.year()),
            month: ActiveValue::Set(tx.date.month() as i32),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        bump_goal(db, &goal_id.to_string(), tx.amount).await?;
        debug!(%goal_id, %transaction_id, amount = tx.amount, "goal contribution recorded");
        Ok(())
    }
}

async fn bump_goal(db: &DatabaseTransaction, goal_id: &str, delta: i64) -> ResultEngine<()> {
    let result = goals::Entity::update_many()
        .col_expr(
            goals::Column::CurrentAmount,
            Expr::col(goals::Column::CurrentAmount).add(delta),
        )
        .filter(goals::Column::Id.eq(goal_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::Consistency(format!(
            "goal {goal_id} missing while recording a contribution"
        )));
    }
    Ok(())
}
