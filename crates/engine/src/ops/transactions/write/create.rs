use chrono::Utc;
use sea_orm::TransactionTrait;
use tracing::info;
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, EngineError, MoneyCents, Principal, ResultEngine, Transaction,
    TransactionKind, TransactionLinks,
    util::{normalize_description, normalize_optional_text},
};

use super::super::super::{Engine, with_tx};

fn validate_shape(cmd: &CreateTransactionCmd) -> ResultEngine<()> {
    match (cmd.kind, cmd.destination_account_id) {
        (TransactionKind::Transfer, None) => {
            return Err(EngineError::Validation(
                "transfers require destination_account_id".to_string(),
            ));
        }
        (TransactionKind::Transfer, Some(destination)) if destination == cmd.account_id => {
            return Err(EngineError::Validation(
                "destination account must differ from the source".to_string(),
            ));
        }
        (TransactionKind::Income | TransactionKind::Expense, Some(_)) => {
            return Err(EngineError::Validation(
                "only transfers have a destination account".to_string(),
            ));
        }
        _ => {}
    }
    if cmd.goal_id.is_some() && cmd.kind != TransactionKind::Expense {
        return Err(EngineError::Validation(
            "only expenses can be linked to a goal".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    /// Records a transaction and applies it to the balances of the accounts
    /// it touches.
    pub async fn create_transaction(
        &self,
        principal: &Principal,
        cmd: CreateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        MoneyCents::positive(cmd.amount, "amount")?;
        let description = normalize_description(&cmd.description)?;
        validate_shape(&cmd)?;
        let links = TransactionLinks {
            category_id: cmd.category_id,
            income_source_id: cmd.income_source_id,
            recurring_bill_id: cmd.recurring_bill_id,
            goal_id: cmd.goal_id,
        };

        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            self.require_open_account(&db_tx, cmd.budget_id, cmd.account_id)
                .await?;
            if let Some(destination) = cmd.destination_account_id {
                self.require_open_account(&db_tx, cmd.budget_id, destination)
                    .await?;
            }
            self.require_links(&db_tx, cmd.budget_id, &links).await?;

            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                budget_id: cmd.budget_id,
                account_id: cmd.account_id,
                destination_account_id: cmd.destination_account_id,
                kind: cmd.kind,
                status: cmd.status,
                amount: cmd.amount,
                date: cmd.date,
                description,
                notes: normalize_optional_text(cmd.notes.as_deref()),
                links,
                installment: None,
                created_by: principal.user_id.clone(),
                created_at: now,
                updated_at: now,
            };
            self.insert_transactions(&db_tx, cmd.budget_id, std::slice::from_ref(&tx))
                .await?;
            info!(
                budget_id = %cmd.budget_id,
                transaction_id = %tx.id,
                kind = %tx.kind,
                amount = tx.amount,
                "transaction created"
            );
            Ok(tx)
        })
    }
}
