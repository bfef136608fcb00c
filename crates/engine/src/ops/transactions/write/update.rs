use chrono::Utc;
use sea_orm::{TransactionTrait, prelude::*};
use tracing::info;
use uuid::Uuid;

use crate::{
    BalanceDeltas, EngineError, MoneyCents, Principal, ResultEngine, Transaction,
    UpdateTransactionCmd, legs_for, transactions,
    util::{normalize_description, normalize_optional_text},
};

use super::super::super::{Engine, with_tx};

/// Normalized patch values shared by every row of an update.
struct Patch {
    amount: Option<i64>,
    description: Option<String>,
    notes: Option<Option<String>>,
}

impl Patch {
    fn from_cmd(cmd: &UpdateTransactionCmd) -> ResultEngine<Self> {
        if cmd.is_empty() {
            return Err(EngineError::Validation("nothing to update".to_string()));
        }
        if let Some(amount) = cmd.amount {
            MoneyCents::positive(amount, "amount")?;
        }
        Ok(Self {
            amount: cmd.amount,
            description: cmd
                .description
                .as_deref()
                .map(normalize_description)
                .transpose()?,
            notes: cmd
                .notes
                .as_ref()
                .map(|notes| normalize_optional_text(notes.as_deref())),
        })
    }
}

/// Series-wide fields (amount, description, category, status) apply to
/// every row; notes and date only to the targeted one.
fn patched(
    old: &Transaction,
    cmd: &UpdateTransactionCmd,
    patch: &Patch,
    is_target: bool,
) -> Transaction {
    let mut new = old.clone();
    if let Some(amount) = patch.amount {
        new.amount = amount;
    }
    if let Some(status) = cmd.status {
        new.status = status;
    }
    if let Some(description) = &patch.description {
        new.description = description.clone();
    }
    if let Some(category_id) = cmd.category_id {
        new.links.category_id = category_id;
    }
    if is_target {
        if let Some(notes) = &patch.notes {
            new.notes = notes.clone();
        }
        if let Some(date) = cmd.date {
            new.date = date;
        }
    }
    new
}

impl Engine {
    /// Updates a transaction, or its whole installment series when
    /// `apply_to_series` is set.
    ///
    /// Balances move by the difference of legs of every modified row, so a
    /// status change between pending and confirmed only touches
    /// `cleared_balance`.
    pub async fn update_transaction(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        transaction_id: Uuid,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let patch = Patch::from_cmd(&cmd)?;
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let target = Transaction::try_from(
                self.require_transaction(&db_tx, budget_id, transaction_id)
                    .await?,
            )?;
            if let Some(Some(category_id)) = cmd.category_id {
                self.require_category(&db_tx, budget_id, category_id)
                    .await?;
            }

            let rows = if cmd.apply_to_series && target.installment.is_some() {
                self.series_rows(&db_tx, budget_id, target.series_root())
                    .await?
            } else {
                vec![target.clone()]
            };

            let cards = self.credit_card_ids(&db_tx, budget_id).await?;
            let now = Utc::now();
            let mut deltas = BalanceDeltas::new();
            let mut updated = None;
            let mut modified = 0usize;
            for old in rows {
                let is_target = old.id == target.id;
                let mut new = patched(&old, &cmd, &patch, is_target);
                if new != old {
                    new.updated_at = now;
                    let card = cards.contains(&new.account_id);
                    deltas.replace(&legs_for(&old, card), &legs_for(&new, card));
                    transactions::ActiveModel::from(&new).update(&db_tx).await?;
                    if old.links.goal_id.is_some() {
                        self.sync_goal_contribution(&db_tx, budget_id, new.id, Some(&new))
                            .await?;
                    }
                    modified += 1;
                }
                if is_target {
                    updated = Some(new);
                }
            }
            self.apply_balance_deltas(&db_tx, budget_id, &deltas).await?;
            info!(%budget_id, %transaction_id, modified, "transaction updated");

            updated.ok_or_else(|| {
                EngineError::Consistency("transaction missing from its series".to_string())
            })
        })
    }
}
