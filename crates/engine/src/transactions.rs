//! Ledger transactions.
//!
//! A transaction has an immutable identity and kind; its `status` moves
//! between `pending` and the confirmed states (`cleared`, `reconciled`).
//! `amount` is always a positive magnitude; the sign applied to balances is
//! derived from the kind (see [`legs`](crate::legs)).
//!
//! Installment purchases are stored as a parent row (installment 1) plus one
//! child row per further installment pointing at the parent through
//! `parent_transaction_id`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    macros::string_enum,
    util::{parse_optional_uuid, parse_uuid},
};

string_enum! {
    pub enum TransactionKind {
        Income => "income",
        Expense => "expense",
        Transfer => "transfer",
    }
}

string_enum! {
    pub enum TransactionStatus {
        Pending => "pending",
        Cleared => "cleared",
        Reconciled => "reconciled",
    }
}

impl TransactionStatus {
    /// `cleared` and `reconciled` count towards the cleared balance.
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Cleared | Self::Reconciled)
    }
}

/// Optional links of a transaction to budget entities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLinks {
    pub category_id: Option<Uuid>,
    pub income_source_id: Option<Uuid>,
    pub recurring_bill_id: Option<Uuid>,
    pub goal_id: Option<Uuid>,
}

/// Installment position of a row inside its series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub number: u32,
    pub total: u32,
    pub parent_transaction_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub account_id: Uuid,
    pub destination_account_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: i64,
    pub date: NaiveDate,
    pub description: String,
    pub notes: Option<String>,
    pub links: TransactionLinks,
    pub installment: Option<Installment>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Installment rows other than the first one.
    pub fn is_installment_child(&self) -> bool {
        self.installment
            .is_some_and(|i| i.parent_transaction_id.is_some())
    }

    /// Id of the series parent: the parent id for children, the row itself
    /// otherwise.
    pub fn series_root(&self) -> Uuid {
        self.installment
            .and_then(|i| i.parent_transaction_id)
            .unwrap_or(self.id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub kind: String,
    pub status: String,
    pub amount: i64,
    pub date: Date,
    pub description: String,
    pub notes: Option<String>,
    pub category_id: Option<String>,
    pub income_source_id: Option<String>,
    pub recurring_bill_id: Option<String>,
    pub goal_id: Option<String>,
    pub is_installment: bool,
    pub installment_number: Option<i32>,
    pub total_installments: Option<i32>,
    pub parent_transaction_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Account,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let installment = if model.is_installment {
            Some(Installment {
                number: model.installment_number.unwrap_or(1) as u32,
                total: model.total_installments.unwrap_or(1) as u32,
                parent_transaction_id: parse_optional_uuid(
                    model.parent_transaction_id.as_deref(),
                    "parent transaction",
                )?,
            })
        } else {
            None
        };
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            destination_account_id: parse_optional_uuid(
                model.destination_account_id.as_deref(),
                "destination account",
            )?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            status: TransactionStatus::try_from(model.status.as_str())?,
            amount: model.amount,
            date: model.date,
            description: model.description,
            notes: model.notes,
            links: TransactionLinks {
                category_id: parse_optional_uuid(model.category_id.as_deref(), "category")?,
                income_source_id: parse_optional_uuid(
                    model.income_source_id.as_deref(),
                    "income source",
                )?,
                recurring_bill_id: parse_optional_uuid(
                    model.recurring_bill_id.as_deref(),
                    "recurring bill",
                )?,
                goal_id: parse_optional_uuid(model.goal_id.as_deref(), "goal")?,
            },
            installment,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        use sea_orm::ActiveValue::Set;

        let installment = tx.installment;
        Self {
            id: Set(tx.id.to_string()),
            budget_id: Set(tx.budget_id.to_string()),
            account_id: Set(tx.account_id.to_string()),
            destination_account_id: Set(tx.destination_account_id.map(|id| id.to_string())),
            kind: Set(tx.kind.as_str().to_string()),
            status: Set(tx.status.as_str().to_string()),
            amount: Set(tx.amount),
            date: Set(tx.date),
            description: Set(tx.description.clone()),
            notes: Set(tx.notes.clone()),
            category_id: Set(tx.links.category_id.map(|id| id.to_string())),
            income_source_id: Set(tx.links.income_source_id.map(|id| id.to_string())),
            recurring_bill_id: Set(tx.links.recurring_bill_id.map(|id| id.to_string())),
            goal_id: Set(tx.links.goal_id.map(|id| id.to_string())),
            is_installment: Set(installment.is_some()),
            installment_number: Set(installment.map(|i| i.number as i32)),
            total_installments: Set(installment.map(|i| i.total as i32)),
            parent_transaction_id: Set(installment
                .and_then(|i| i.parent_transaction_id)
                .map(|id| id.to_string())),
            created_by: Set(tx.created_by.clone()),
            created_at: Set(tx.created_at),
            updated_at: Set(tx.updated_at),
        }
    }
}
