use sea_orm::{QueryFilter, TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{BalanceDeltas, Principal, ResultEngine, Transaction, legs_for, transactions};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Deletes a transaction and reverses its effect on every account.
    ///
    /// Deleting an installment parent deletes the whole series. Returns the
    /// ids of the deleted rows.
    pub async fn delete_transaction(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Vec<Uuid>> {
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let target = Transaction::try_from(
                self.require_transaction(&db_tx, budget_id, transaction_id)
                    .await?,
            )?;
            let rows = if target.installment.is_some() && !target.is_installment_child() {
                self.series_rows(&db_tx, budget_id, target.id).await?
            } else {
                vec![target]
            };

            let cards = self.credit_card_ids(&db_tx, budget_id).await?;
            let mut deltas = BalanceDeltas::new();
            for row in &rows {
                deltas.subtract(&legs_for(row, cards.contains(&row.account_id)));
                if row.links.goal_id.is_some() {
                    self.sync_goal_contribution(&db_tx, budget_id, row.id, None)
                        .await?;
                }
            }

            let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
            transactions::Entity::delete_many()
                .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
                .filter(
                    transactions::Column::Id.is_in(ids.iter().map(ToString::to_string)),
                )
                .exec(&db_tx)
                .await?;
            self.apply_balance_deltas(&db_tx, budget_id, &deltas).await?;
            info!(%budget_id, %transaction_id, deleted = ids.len(), "transaction deleted");
            Ok(ids)
        })
    }
}
