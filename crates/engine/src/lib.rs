//! Allocation & ledger engine of an envelope budget.
//!
//! The [`Engine`] owns a sea-orm connection and exposes every operation as
//! an `async` method taking the caller's [`Principal`]. Each operation runs
//! inside a single database transaction.

pub use accounts::{Account, AccountKind};
pub use allocation::{AllocationView, CategoryAllocation, GroupAllocation, IncomeSummary};
pub use calendar::{DateRange, YearMonth, card_cycle, card_due_date};
pub use categories::CategoryBehavior;
pub use commands::{
    ContributeGoalCmd, CreateTransactionCmd, InstallmentPurchaseCmd, NewAccountCmd,
    NewCategoryCmd, NewGoalCmd, NewIncomeSourceCmd, NewRecurringBillCmd, UpdateTransactionCmd,
};
pub use currency::Currency;
pub use error::EngineError;
pub use goals::Goal;
pub use income_sources::IncomeFrequency;
pub use legs::{BalanceDeltas, Leg, legs_for};
pub use members::MemberRole;
pub use money::MoneyCents;
pub use monthly_budget_status::{MonthState, MonthStatus};
pub use ops::{Engine, EngineBuilder, StartMonthOutcome, TransactionListFilter, TransactionPage};
pub use principal::Principal;
pub use recurring_bills::BillFrequency;
pub use schedule::{
    KindTotals, Schedule, ScheduleKind, ScheduleTotals, ScheduledBill, ScheduledGoal,
    ScheduledIncome, ScheduledItem,
};
pub use transactions::{
    Installment, Transaction, TransactionKind, TransactionLinks, TransactionStatus,
};

pub mod accounts;
pub mod allocation;
pub mod budgets;
pub mod calendar;
pub mod categories;
pub mod category_groups;
mod commands;
mod currency;
mod error;
pub mod goal_contributions;
pub mod goals;
pub mod income_sources;
mod legs;
mod macros;
pub mod members;
mod money;
pub mod monthly_allocations;
pub mod monthly_budget_status;
pub mod monthly_income_allocations;
mod ops;
mod principal;
pub mod recurring_bills;
pub mod schedule;
pub mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
