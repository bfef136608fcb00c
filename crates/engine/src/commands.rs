//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Required fields go through
//! `new`, optional ones through builder methods.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    AccountKind, BillFrequency, CategoryBehavior, IncomeFrequency, TransactionKind,
    TransactionStatus,
};

/// Create a single transaction.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub budget_id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: i64,
    pub date: NaiveDate,
    pub description: String,
    pub status: TransactionStatus,
    pub destination_account_id: Option<Uuid>,
    pub notes: Option<String>,
    pub category_id: Option<Uuid>,
    pub income_source_id: Option<Uuid>,
    pub recurring_bill_id: Option<Uuid>,
    pub goal_id: Option<Uuid>,
}

impl CreateTransactionCmd {
    /// New transaction, `cleared` unless [`status`](Self::status) says
    /// otherwise.
    #[must_use]
    pub fn new(
        budget_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: i64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            budget_id,
            account_id,
            kind,
            amount,
            date,
            description: description.into(),
            status: TransactionStatus::Cleared,
            destination_account_id: None,
            notes: None,
            category_id: None,
            income_source_id: None,
            recurring_bill_id: None,
            goal_id: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn destination(mut self, account_id: Uuid) -> Self {
        self.destination_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn income_source(mut self, income_source_id: Uuid) -> Self {
        self.income_source_id = Some(income_source_id);
        self
    }

    #[must_use]
    pub fn recurring_bill(mut self, recurring_bill_id: Uuid) -> Self {
        self.recurring_bill_id = Some(recurring_bill_id);
        self
    }

    #[must_use]
    pub fn goal(mut self, goal_id: Uuid) -> Self {
        self.goal_id = Some(goal_id);
        self
    }
}

/// Split an expense into `installments` rows of `installment_amount`.
#[derive(Clone, Debug)]
pub struct InstallmentPurchaseCmd {
    pub budget_id: Uuid,
    pub account_id: Uuid,
    pub installment_amount: i64,
    pub installments: u32,
    pub date: NaiveDate,
    pub description: String,
    pub status: TransactionStatus,
    pub category_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl InstallmentPurchaseCmd {
    #[must_use]
    pub fn new(
        budget_id: Uuid,
        account_id: Uuid,
        installment_amount: i64,
        installments: u32,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            budget_id,
            account_id,
            installment_amount,
            installments,
            date,
            description: description.into(),
            status: TransactionStatus::Cleared,
            category_id: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Patch a transaction (or its whole installment series).
///
/// `notes` and `category_id` use a double `Option`: `Some(None)` clears the
/// field, `None` leaves it untouched.
#[derive(Clone, Debug, Default)]
pub struct UpdateTransactionCmd {
    pub amount: Option<i64>,
    pub status: Option<TransactionStatus>,
    pub description: Option<String>,
    pub notes: Option<Option<String>>,
    pub category_id: Option<Option<Uuid>>,
    pub date: Option<NaiveDate>,
    pub apply_to_series: bool,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn amount(mut self, amount: i64) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    #[must_use]
    pub fn apply_to_series(mut self, apply: bool) -> Self {
        self.apply_to_series = apply;
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.status.is_none()
            && self.description.is_none()
            && self.notes.is_none()
            && self.category_id.is_none()
            && self.date.is_none()
    }
}

/// Put money aside for a goal.
#[derive(Clone, Debug)]
pub struct ContributeGoalCmd {
    pub budget_id: Uuid,
    pub goal_id: Uuid,
    pub amount: i64,
    pub date: NaiveDate,
    /// Source account; defaults to the goal's account.
    pub account_id: Option<Uuid>,
    pub description: Option<String>,
}

impl ContributeGoalCmd {
    #[must_use]
    pub fn new(budget_id: Uuid, goal_id: Uuid, amount: i64, date: NaiveDate) -> Self {
        Self {
            budget_id,
            goal_id,
            amount,
            date,
            account_id: None,
            description: None,
        }
    }

    #[must_use]
    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Open a financial account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub budget_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub credit_limit: Option<i64>,
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(budget_id: Uuid, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            budget_id,
            name: name.into(),
            kind,
            credit_limit: None,
            closing_day: None,
            due_day: None,
        }
    }

    /// Card cycle; required for credit cards.
    #[must_use]
    pub fn card_cycle(mut self, closing_day: u32, due_day: u32) -> Self {
        self.closing_day = Some(closing_day);
        self.due_day = Some(due_day);
        self
    }

    #[must_use]
    pub fn credit_limit(mut self, limit: i64) -> Self {
        self.credit_limit = Some(limit);
        self
    }
}

/// Create a spending category inside a group.
#[derive(Clone, Debug)]
pub struct NewCategoryCmd {
    pub budget_id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub behavior: CategoryBehavior,
    pub member_id: Option<Uuid>,
}

impl NewCategoryCmd {
    #[must_use]
    pub fn new(
        budget_id: Uuid,
        group_id: Uuid,
        name: impl Into<String>,
        behavior: CategoryBehavior,
    ) -> Self {
        Self {
            budget_id,
            group_id,
            name: name.into(),
            behavior,
            member_id: None,
        }
    }

    /// Personal category of a member.
    #[must_use]
    pub fn member(mut self, member_id: Uuid) -> Self {
        self.member_id = Some(member_id);
        self
    }
}

/// Declare a recurring bill tied to a category.
#[derive(Clone, Debug)]
pub struct NewRecurringBillCmd {
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub amount: i64,
    pub frequency: BillFrequency,
    pub due_day: u32,
    pub due_month: Option<u32>,
    pub account_id: Option<Uuid>,
    pub is_auto_debit: bool,
    pub is_variable: bool,
}

impl NewRecurringBillCmd {
    #[must_use]
    pub fn new(
        budget_id: Uuid,
        category_id: Uuid,
        name: impl Into<String>,
        amount: i64,
        frequency: BillFrequency,
        due_day: u32,
    ) -> Self {
        Self {
            budget_id,
            category_id,
            name: name.into(),
            amount,
            frequency,
            due_day,
            due_month: None,
            account_id: None,
            is_auto_debit: false,
            is_variable: false,
        }
    }

    #[must_use]
    pub fn due_month(mut self, month: u32) -> Self {
        self.due_month = Some(month);
        self
    }

    #[must_use]
    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn auto_debit(mut self, value: bool) -> Self {
        self.is_auto_debit = value;
        self
    }

    #[must_use]
    pub fn variable(mut self, value: bool) -> Self {
        self.is_variable = value;
        self
    }
}

/// Declare an income source of a member.
#[derive(Clone, Debug)]
pub struct NewIncomeSourceCmd {
    pub budget_id: Uuid,
    pub member_id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub amount: i64,
    pub frequency: IncomeFrequency,
    pub day_of_month: Option<u32>,
}

impl NewIncomeSourceCmd {
    #[must_use]
    pub fn new(
        budget_id: Uuid,
        member_id: Uuid,
        account_id: Uuid,
        name: impl Into<String>,
        amount: i64,
        frequency: IncomeFrequency,
    ) -> Self {
        Self {
            budget_id,
            member_id,
            account_id,
            name: name.into(),
            amount,
            frequency,
            day_of_month: None,
        }
    }

    #[must_use]
    pub fn day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }
}

/// Create a savings goal.
#[derive(Clone, Debug)]
pub struct NewGoalCmd {
    pub budget_id: Uuid,
    pub name: String,
    pub target_amount: i64,
    pub target_date: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
}

impl NewGoalCmd {
    #[must_use]
    pub fn new(budget_id: Uuid, name: impl Into<String>, target_amount: i64) -> Self {
        Self {
            budget_id,
            name: name.into(),
            target_amount,
            target_date: None,
            account_id: None,
        }
    }

    #[must_use]
    pub fn target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    #[must_use]
    pub fn account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }
}
