use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{Principal, ResultEngine, Transaction};

use super::{Engine, with_tx};

mod list;
mod write;

pub use list::{TransactionListFilter, TransactionPage};

impl Engine {
    pub async fn transaction(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            Transaction::try_from(
                self.require_transaction(&db_tx, budget_id, transaction_id)
                    .await?,
            )
        })
    }

    /// Every row of the installment series `transaction_id` belongs to,
    /// parent first. A plain transaction is its own one-row series.
    pub async fn installment_series(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        transaction_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            let tx = Transaction::try_from(
                self.require_transaction(&db_tx, budget_id, transaction_id)
                    .await?,
            )?;
            if tx.installment.is_none() {
                return Ok(vec![tx]);
            }
            self.series_rows(&db_tx, budget_id, tx.series_root()).await
        })
    }
}
