//! Balance legs.
//!
//! A [`Leg`] is the signed effect of one transaction row on one account:
//! - income: `+amount` on the account;
//! - expense: `-amount` on the account;
//! - transfer: `-amount` on the source and `+amount` on the destination.
//!
//! `cleared_delta` mirrors `balance_delta` only when the row is confirmed.
//! Installment children on an account that is not a credit card have no
//! legs: only the parent moves money there.
//!
//! Every balance change in the engine is expressed as legs, accumulated per
//! account in [`BalanceDeltas`] and applied once per account.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Transaction, TransactionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub account_id: Uuid,
    pub balance_delta: i64,
    pub cleared_delta: i64,
}

impl Leg {
    fn new(account_id: Uuid, balance_delta: i64, confirmed: bool) -> Self {
        Self {
            account_id,
            balance_delta,
            cleared_delta: if confirmed { balance_delta } else { 0 },
        }
    }
}

/// Legs of a transaction row. `account_is_credit_card` refers to the row's
/// own `account_id`.
#[must_use]
pub fn legs_for(tx: &Transaction, account_is_credit_card: bool) -> Vec<Leg> {
    if tx.is_installment_child() && !account_is_credit_card {
        return Vec::new();
    }
    let confirmed = tx.status.is_confirmed();
    match tx.kind {
        TransactionKind::Income => vec![Leg::new(tx.account_id, tx.amount, confirmed)],
        TransactionKind::Expense => vec![Leg::new(tx.account_id, -tx.amount, confirmed)],
        TransactionKind::Transfer => {
            let mut legs = vec![Leg::new(tx.account_id, -tx.amount, confirmed)];
            if let Some(destination) = tx.destination_account_id {
                legs.push(Leg::new(destination, tx.amount, confirmed));
            }
            legs
        }
    }
}

/// Net `(balance, cleared_balance)` change per account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BalanceDeltas {
    by_account: BTreeMap<Uuid, (i64, i64)>,
}

impl BalanceDeltas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, legs: &[Leg]) {
        for leg in legs {
            let entry = self.by_account.entry(leg.account_id).or_default();
            entry.0 += leg.balance_delta;
            entry.1 += leg.cleared_delta;
        }
    }

    pub fn subtract(&mut self, legs: &[Leg]) {
        for leg in legs {
            let entry = self.by_account.entry(leg.account_id).or_default();
            entry.0 -= leg.balance_delta;
            entry.1 -= leg.cleared_delta;
        }
    }

    /// Records `new - old` for a modified row.
    pub fn replace(&mut self, old: &[Leg], new: &[Leg]) {
        self.subtract(old);
        self.add(new);
    }

    /// Accounts with a non-zero change, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (Uuid, i64, i64)> + '_ {
        self.by_account
            .iter()
            .filter(|(_, (balance, cleared))| *balance != 0 || *cleared != 0)
            .map(|(account_id, (balance, cleared))| (*account_id, *balance, *cleared))
    }

    #[must_use]
    pub fn get(&self, account_id: Uuid) -> (i64, i64) {
        self.by_account.get(&account_id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::{Installment, TransactionLinks, TransactionStatus};

    fn tx(kind: TransactionKind, status: TransactionStatus, amount: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            budget_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            destination_account_id: None,
            kind,
            status,
            amount,
            date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            description: "test".to_string(),
            notes: None,
            links: TransactionLinks::default(),
            installment: None,
            created_by: "user".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pending_expense_does_not_touch_cleared() {
        let t = tx(TransactionKind::Expense, TransactionStatus::Pending, 5_000);
        let legs = legs_for(&t, false);
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].balance_delta, -5_000);
        assert_eq!(legs[0].cleared_delta, 0);
    }

    #[test]
    fn transfer_moves_between_accounts() {
        let mut t = tx(TransactionKind::Transfer, TransactionStatus::Cleared, 700);
        let destination = Uuid::new_v4();
        t.destination_account_id = Some(destination);
        let legs = legs_for(&t, false);
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].balance_delta, -700);
        assert_eq!(legs[1].account_id, destination);
        assert_eq!(legs[1].cleared_delta, 700);
    }

    #[test]
    fn installment_child_only_counts_on_cards() {
        let mut child = tx(TransactionKind::Expense, TransactionStatus::Cleared, 100);
        child.installment = Some(Installment {
            number: 2,
            total: 4,
            parent_transaction_id: Some(Uuid::new_v4()),
        });
        assert!(legs_for(&child, false).is_empty());
        assert_eq!(legs_for(&child, true)[0].balance_delta, -100);
    }

    #[test]
    fn deltas_net_out_per_account() {
        let old = tx(TransactionKind::Expense, TransactionStatus::Pending, 5_000);
        let mut new = old.clone();
        new.status = TransactionStatus::Cleared;

        let mut deltas = BalanceDeltas::new();
        deltas.replace(&legs_for(&old, false), &legs_for(&new, false));
        assert_eq!(deltas.get(old.account_id), (0, -5_000));

        let mut reverted = BalanceDeltas::new();
        reverted.add(&legs_for(&old, false));
        reverted.subtract(&legs_for(&old, false));
        assert!(reverted.is_empty());
    }
}
