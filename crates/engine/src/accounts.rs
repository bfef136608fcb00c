//! Financial accounts.
//!
//! An account keeps two denormalized balances:
//! - `balance`: signed sum of every transaction affecting it;
//! - `cleared_balance`: the same sum restricted to confirmed
//!   (`cleared`/`reconciled`) transactions.
//!
//! Both are only ever changed by the ledger, through atomic increments.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, macros::string_enum, util::parse_uuid};

string_enum! {
    pub enum AccountKind {
        Checking => "checking",
        Savings => "savings",
        Cash => "cash",
        CreditCard => "credit_card",
        Investment => "investment",
    }
}

/// Snapshot of an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: i64,
    pub cleared_balance: i64,
    pub credit_limit: Option<i64>,
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_credit_card(&self) -> bool {
        self.kind == AccountKind::CreditCard
    }

    /// Remaining credit for a card (`limit + balance`, balance being negative
    /// while debt is outstanding). `None` for other accounts or cards without
    /// a limit.
    pub fn available_credit(&self) -> Option<i64> {
        if !self.is_credit_card() {
            return None;
        }
        self.credit_limit.map(|limit| limit + self.balance)
    }

    /// Closing and due day of a credit card.
    pub fn card_cycle_days(&self) -> ResultEngine<(u32, u32)> {
        match (self.closing_day, self.due_day) {
            (Some(closing), Some(due)) if self.is_credit_card() => Ok((closing, due)),
            _ => Err(EngineError::Consistency(format!(
                "account '{}' has no card cycle configured",
                self.name
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub name: String,
    pub name_norm: String,
    pub kind: String,
    pub balance: i64,
    pub cleared_balance: i64,
    pub credit_limit: Option<i64>,
    pub closing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub archived: bool,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn is_credit_card(&self) -> bool {
        self.kind == AccountKind::CreditCard.as_str()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            kind: AccountKind::try_from(model.kind.as_str())?,
            name: model.name,
            balance: model.balance,
            cleared_balance: model.cleared_balance,
            credit_limit: model.credit_limit,
            closing_day: model.closing_day.map(|d| d as u32),
            due_day: model.due_day.map(|d| d as u32),
            archived: model.archived,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(balance: i64) -> Account {
        Account {
            id: Uuid::new_v4(),
            budget_id: Uuid::new_v4(),
            name: "Visa".to_string(),
            kind: AccountKind::CreditCard,
            balance,
            cleared_balance: 0,
            credit_limit: Some(500_000),
            closing_day: Some(25),
            due_day: Some(5),
            archived: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn available_credit_subtracts_debt() {
        assert_eq!(card(-120_000).available_credit(), Some(380_000));
        let mut checking = card(0);
        checking.kind = AccountKind::Checking;
        assert_eq!(checking.available_credit(), None);
    }

    #[test]
    fn card_cycle_days_requires_card() {
        assert_eq!(card(0).card_cycle_days().unwrap(), (25, 5));
        let mut checking = card(0);
        checking.kind = AccountKind::Checking;
        assert!(checking.card_cycle_days().is_err());
    }

    #[test]
    fn kind_round_trips_storage_string() {
        assert_eq!(
            AccountKind::try_from("credit_card").unwrap(),
            AccountKind::CreditCard
        );
        assert!(AccountKind::try_from("wallet").is_err());
    }
}
