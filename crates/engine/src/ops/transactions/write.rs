use sea_orm::{Condition, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    BalanceDeltas, EngineError, ResultEngine, Transaction, TransactionLinks, accounts, legs_for,
    transactions,
};

use super::super::Engine;

mod create;
mod delete;
mod installments;
mod update;

impl Engine {
    /// Inserts new rows and applies their balance legs and goal
    /// contributions.
    pub(in crate::ops) async fn insert_transactions(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        rows: &[Transaction],
    ) -> ResultEngine<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let cards = self.credit_card_ids(db, budget_id).await?;
        let mut deltas = BalanceDeltas::new();
        for tx in rows {
            transactions::ActiveModel::from(tx).insert(db).await?;
            deltas.add(&legs_for(tx, cards.contains(&tx.account_id)));
        }
        for tx in rows.iter().filter(|tx| tx.links.goal_id.is_some()) {
            self.sync_goal_contribution(db, budget_id, tx.id, Some(tx))
                .await?;
        }
        self.apply_balance_deltas(db, budget_id, &deltas).await
    }

    /// Parent and children of an installment series, by installment number.
    pub(in crate::ops) async fn series_rows(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        parent_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        let parent_id = parent_id.to_string();
        transactions::Entity::find()
            .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
            .filter(
                Condition::any()
                    .add(transactions::Column::Id.eq(parent_id.as_str()))
                    .add(transactions::Column::ParentTransactionId.eq(parent_id.as_str())),
            )
            .order_by_asc(transactions::Column::InstallmentNumber)
            .all(db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// An account of the budget that can still receive transactions.
    async fn require_open_account(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        let account = self.require_account(db, budget_id, account_id).await?;
        if account.archived {
            return Err(EngineError::Validation(format!(
                "account '{}' is archived",
                account.name
            )));
        }
        Ok(account)
    }

    /// Every linked entity must belong to the budget.
    async fn require_links(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        links: &TransactionLinks,
    ) -> ResultEngine<()> {
        if let Some(category_id) = links.category_id {
            self.require_category(db, budget_id, category_id).await?;
        }
        if let Some(source_id) = links.income_source_id {
            self.require_income_source(db, budget_id, source_id).await?;
        }
        if let Some(bill_id) = links.recurring_bill_id {
            self.require_bill(db, budget_id, bill_id).await?;
        }
        if let Some(goal_id) = links.goal_id {
            self.require_goal(db, budget_id, goal_id).await?;
        }
        Ok(())
    }
}
