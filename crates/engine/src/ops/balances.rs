use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    Account, AccountKind, BalanceDeltas, EngineError, Principal, ResultEngine, Transaction,
    accounts, legs_for, transactions, util::parse_uuid,
};

use super::{Engine, with_tx};

impl Engine {
    /// Ids of the budget's credit-card accounts. Legs of installment children
    /// depend on it.
    pub(super) async fn credit_card_ids(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
    ) -> ResultEngine<HashSet<Uuid>> {
        let ids: Vec<String> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
            .filter(accounts::Column::Kind.eq(AccountKind::CreditCard.as_str()))
            .into_tuple()
            .all(db)
            .await?;
        ids.iter().map(|id| parse_uuid(id, "account")).collect()
    }

    /// Applies per-account deltas with one atomic increment each.
    ///
    /// A zero-row update means the account disappeared under us; the whole
    /// operation is aborted.
    pub(super) async fn apply_balance_deltas(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        deltas: &BalanceDeltas,
    ) -> ResultEngine<()> {
        for (account_id, balance_delta, cleared_delta) in deltas.iter() {
            let result = accounts::Entity::update_many()
                .col_expr(
                    accounts::Column::Balance,
                    Expr::col(accounts::Column::Balance).add(balance_delta),
                )
                .col_expr(
                    accounts::Column::ClearedBalance,
                    Expr::col(accounts::Column::ClearedBalance).add(cleared_delta),
                )
                .filter(accounts::Column::Id.eq(account_id.to_string()))
                .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
                .exec(db)
                .await?;
            if result.rows_affected == 0 {
                return Err(EngineError::Consistency(format!(
                    "account {account_id} missing while applying balance change"
                )));
            }
            debug!(%account_id, balance_delta, cleared_delta, "balance updated");
        }
        Ok(())
    }

    /// Loads one account of a budget.
    pub async fn account(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        account_id: Uuid,
    ) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            let model = self.require_account(&db_tx, budget_id, account_id).await?;
            Account::try_from(model)
        })
    }

    /// Lists the accounts of a budget, archived ones included.
    pub async fn accounts(&self, principal: &Principal, budget_id: Uuid) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;
            accounts::Entity::find()
                .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Account::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Recomputes `balance` and `cleared_balance` of every account of the
    /// budget from its transactions.
    ///
    /// Returns the accounts whose stored balances drifted, with their
    /// repaired values.
    pub async fn recompute_account_balances(
        &self,
        principal: &Principal,
        budget_id: Uuid,
    ) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, budget_id).await?;
            let cards = self.credit_card_ids(&db_tx, budget_id).await?;

            let account_models = accounts::Entity::find()
                .filter(accounts::Column::BudgetId.eq(budget_id.to_string()))
                .all(&db_tx)
                .await?;
            let mut expected: HashMap<Uuid, (i64, i64)> = HashMap::new();
            for model in &account_models {
                expected.insert(parse_uuid(&model.id, "account")?, (0, 0));
            }

            let tx_models = transactions::Entity::find()
                .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
                .all(&db_tx)
                .await?;
            for model in tx_models {
                let tx = Transaction::try_from(model)?;
                for leg in legs_for(&tx, cards.contains(&tx.account_id)) {
                    let entry = expected.get_mut(&leg.account_id).ok_or_else(|| {
                        EngineError::Consistency(format!(
                            "transaction {} references unknown account {}",
                            tx.id, leg.account_id
                        ))
                    })?;
                    entry.0 += leg.balance_delta;
                    entry.1 += leg.cleared_delta;
                }
            }

            let mut repaired = Vec::new();
            for model in account_models {
                let account_id = parse_uuid(&model.id, "account")?;
                let (balance, cleared_balance) =
                    expected.get(&account_id).copied().unwrap_or_default();
                if model.balance == balance && model.cleared_balance == cleared_balance {
                    continue;
                }
                warn!(
                    %account_id,
                    stored = model.balance,
                    balance,
                    cleared_balance,
                    "repairing account balance"
                );
                let mut active: accounts::ActiveModel = model.into();
                active.balance = ActiveValue::Set(balance);
                active.cleared_balance = ActiveValue::Set(cleared_balance);
                let updated = active.update(&db_tx).await?;
                repaired.push(Account::try_from(updated)?);
            }
            Ok(repaired)
        })
    }
}
