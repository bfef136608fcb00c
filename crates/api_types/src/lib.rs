use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Brl,
    Eur,
    Usd,
}

/// Response body for any create endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

/// Distinguishes an absent field from an explicit `null` in PATCH bodies:
/// absent → `None`, `null` → `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
        /// Display name of the caller inside the new budget.
        pub member_name: String,
        pub currency: Option<Currency>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Owner,
        Editor,
        Viewer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberNew {
        pub user_id: String,
        pub name: String,
        pub role: MemberRole,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Checking,
        Savings,
        Cash,
        CreditCard,
        Investment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
        /// Credit cards only.
        pub closing_day: Option<u32>,
        pub due_day: Option<u32>,
        pub credit_limit: Option<i64>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryBehavior {
        RefillUp,
        SetAside,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
        #[serde(default)]
        pub sort_order: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub group_id: Uuid,
        pub name: String,
        pub behavior: CategoryBehavior,
        pub member_id: Option<Uuid>,
    }
}

pub mod recurring {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum BillFrequency {
        Weekly,
        Monthly,
        Yearly,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BillNew {
        pub category_id: Uuid,
        pub name: String,
        pub amount: i64,
        pub frequency: BillFrequency,
        /// Day of month, or ISO weekday (1 = Monday) for weekly bills.
        pub due_day: u32,
        pub due_month: Option<u32>,
        pub account_id: Option<Uuid>,
        #[serde(default)]
        pub is_auto_debit: bool,
        #[serde(default)]
        pub is_variable: bool,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum IncomeFrequency {
        Monthly,
        Weekly,
        Yearly,
        Irregular,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeSourceNew {
        /// Defaults to the caller's member.
        pub member_id: Option<Uuid>,
        pub account_id: Uuid,
        pub name: String,
        pub amount: i64,
        pub frequency: IncomeFrequency,
        pub day_of_month: Option<u32>,
    }

    /// Overrides what an income source brings in one month.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct IncomeAllocationSet {
        pub year: i32,
        pub month: u32,
        pub amount: i64,
    }
}

pub mod allocation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AllocationSet {
        pub category_id: Uuid,
        pub year: i32,
        pub month: u32,
        pub allocated: i64,
    }
}

pub mod month {
    use super::*;

    /// Query string and body of the month endpoints.
    #[derive(Clone, Copy, Debug, Serialize, Deserialize)]
    pub struct MonthRef {
        pub year: i32,
        pub month: u32,
    }

    /// `?year&month` for the whole month, or `?from&to` for a window inside
    /// one month.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ScheduleQuery {
        pub year: Option<i32>,
        pub month: Option<u32>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_amount: i64,
        pub target_date: Option<NaiveDate>,
        pub account_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        pub amount: i64,
        pub date: NaiveDate,
        /// Defaults to the goal's account.
        pub account_id: Option<Uuid>,
        pub description: Option<String>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionStatus {
        Pending,
        Cleared,
        Reconciled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount: i64,
        pub date: NaiveDate,
        pub description: String,
        /// Defaults to `cleared`.
        pub status: Option<TransactionStatus>,
        pub destination_account_id: Option<Uuid>,
        pub notes: Option<String>,
        pub category_id: Option<Uuid>,
        pub income_source_id: Option<Uuid>,
        pub recurring_bill_id: Option<Uuid>,
        pub goal_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentsNew {
        pub account_id: Uuid,
        pub installment_amount: i64,
        pub installments: u32,
        pub date: NaiveDate,
        pub description: String,
        pub status: Option<TransactionStatus>,
        pub category_id: Option<Uuid>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub amount: Option<i64>,
        pub status: Option<TransactionStatus>,
        pub description: Option<String>,
        #[serde(default, deserialize_with = "double_option")]
        pub notes: Option<Option<String>>,
        #[serde(default, deserialize_with = "double_option")]
        pub category_id: Option<Option<Uuid>>,
        pub date: Option<NaiveDate>,
        #[serde(default)]
        pub apply_to_series: bool,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub status: Option<TransactionStatus>,
        pub limit: Option<u64>,
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionsDeleted {
        pub deleted: Vec<Uuid>,
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::TransactionUpdate;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let cleared: TransactionUpdate =
            serde_json::from_str(r#"{"notes": null, "amount": 100}"#).unwrap();
        assert_eq!(cleared.notes, Some(None));
        assert_eq!(cleared.category_id, None);
        assert_eq!(cleared.amount, Some(100));
        assert!(!cleared.apply_to_series);

        let set: TransactionUpdate =
            serde_json::from_str(r#"{"notes": "hi", "apply_to_series": true}"#).unwrap();
        assert_eq!(set.notes, Some(Some("hi".to_string())));
        assert!(set.apply_to_series);
    }
}
