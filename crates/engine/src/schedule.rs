//! Projected obligations of a month.
//!
//! The projector turns recurring bills, income sources and goal targets into
//! dated [`ScheduledItem`]s. Item ids are synthetic and stable
//! (`"{kind}_{source_id}_{yyyy}_{mm}"`, weekly bills add `_{n}`), so a client
//! can diff two projections of the same month.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BillFrequency, IncomeFrequency, MonthState, calendar::YearMonth, macros::string_enum,
};

string_enum! {
    #[derive(PartialOrd, Ord)]
    pub enum ScheduleKind {
        Bill => "bill",
        Income => "income",
        Goal => "goal",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledBill {
    pub id: String,
    pub bill_id: Uuid,
    pub name: String,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub category_id: Uuid,
    pub account_id: Option<Uuid>,
    pub is_auto_debit: bool,
    pub is_variable: bool,
    /// 1-based occurrence inside the month, weekly bills only.
    pub occurrence: Option<u32>,
    pub paid: bool,
    pub materialized: bool,
    pub transaction_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledIncome {
    pub id: String,
    pub income_source_id: Uuid,
    pub member_id: Uuid,
    pub name: String,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub account_id: Uuid,
    pub paid: bool,
    pub materialized: bool,
    pub transaction_id: Option<Uuid>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledGoal {
    pub id: String,
    pub goal_id: Uuid,
    pub name: String,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub account_id: Option<Uuid>,
    pub remaining: i64,
    pub months_remaining: i64,
    pub paid: bool,
    pub materialized: bool,
    pub transaction_id: Option<Uuid>,
}

/// One projected obligation. Each case carries only its own fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source_type", rename_all = "snake_case")]
pub enum ScheduledItem {
    Bill(ScheduledBill),
    Income(ScheduledIncome),
    Goal(ScheduledGoal),
}

impl ScheduledItem {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            Self::Bill(_) => ScheduleKind::Bill,
            Self::Income(_) => ScheduleKind::Income,
            Self::Goal(_) => ScheduleKind::Goal,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Bill(item) => &item.id,
            Self::Income(item) => &item.id,
            Self::Goal(item) => &item.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Bill(item) => &item.name,
            Self::Income(item) => &item.name,
            Self::Goal(item) => &item.name,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            Self::Bill(item) => item.amount,
            Self::Income(item) => item.amount,
            Self::Goal(item) => item.amount,
        }
    }

    pub fn due_date(&self) -> NaiveDate {
        match self {
            Self::Bill(item) => item.due_date,
            Self::Income(item) => item.due_date,
            Self::Goal(item) => item.due_date,
        }
    }

    pub fn is_paid(&self) -> bool {
        match self {
            Self::Bill(item) => item.paid,
            Self::Income(item) => item.paid,
            Self::Goal(item) => item.paid,
        }
    }

    /// A linked transaction (any status) already exists for this item.
    pub fn is_materialized(&self) -> bool {
        match self {
            Self::Bill(item) => item.materialized,
            Self::Income(item) => item.materialized,
            Self::Goal(item) => item.materialized,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindTotals {
    pub due: i64,
    pub paid: i64,
    pub count: u32,
    pub paid_count: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub bills: KindTotals,
    pub income: KindTotals,
    pub goals: KindTotals,
}

impl ScheduleTotals {
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a ScheduledItem>) -> Self {
        let mut totals = Self::default();
        for item in items {
            let bucket = match item.kind() {
                ScheduleKind::Bill => &mut totals.bills,
                ScheduleKind::Income => &mut totals.income,
                ScheduleKind::Goal => &mut totals.goals,
            };
            bucket.due += item.amount();
            bucket.count += 1;
            if item.is_paid() {
                bucket.paid += item.amount();
                bucket.paid_count += 1;
            }
        }
        totals
    }
}

/// Projection of a month, or of a window inside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub year: i32,
    pub month: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub status: MonthState,
    /// Whether any allocation row exists for the month. Lets a client tell
    /// "not started yet" from "nothing planned".
    pub allocations_exist: bool,
    pub items: Vec<ScheduledItem>,
    /// Totals over `items` (the window).
    pub totals: ScheduleTotals,
    /// Totals over the whole month, regardless of the window.
    pub month_totals: ScheduleTotals,
}

/// Stable id of a projected item.
#[must_use]
pub fn synthetic_id(
    kind: ScheduleKind,
    source_id: Uuid,
    month: YearMonth,
    occurrence: Option<u32>,
) -> String {
    let base = format!(
        "{kind}_{source_id}_{:04}_{:02}",
        month.year(),
        month.month()
    );
    match occurrence {
        Some(n) => format!("{base}_{n}"),
        None => base,
    }
}

/// Due dates of a bill in `month`. Weekly bills read `due_day` as the ISO
/// weekday; yearly bills only fall in their `due_month`.
#[must_use]
pub fn bill_due_dates(
    frequency: BillFrequency,
    due_day: u32,
    due_month: Option<u32>,
    month: YearMonth,
) -> Vec<NaiveDate> {
    match frequency {
        BillFrequency::Monthly => vec![month.clamp_day(due_day)],
        BillFrequency::Yearly if due_month == Some(month.month()) => {
            vec![month.clamp_day(due_day)]
        }
        BillFrequency::Yearly => Vec::new(),
        BillFrequency::Weekly => month.weekday_occurrences(due_day),
    }
}

/// Due date of an income source in `month`. Sources without a configured
/// day (and irregular ones) are not projected.
#[must_use]
pub fn income_due_date(
    frequency: IncomeFrequency,
    day_of_month: Option<u32>,
    month: YearMonth,
) -> Option<NaiveDate> {
    match frequency {
        IncomeFrequency::Irregular => None,
        _ => day_of_month.map(|day| month.clamp_day(day)),
    }
}

/// Orders items by day of month, then kind, then name.
pub fn sort_items(items: &mut [ScheduledItem]) {
    items.sort_by(|a, b| {
        a.due_date()
            .day()
            .cmp(&b.due_date().day())
            .then_with(|| a.kind().cmp(&b.kind()))
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id().cmp(b.id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oct() -> YearMonth {
        YearMonth::new(2026, 10).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn bill(name: &str, day: u32, paid: bool) -> ScheduledItem {
        ScheduledItem::Bill(ScheduledBill {
            id: format!("bill_{name}"),
            bill_id: Uuid::nil(),
            name: name.to_string(),
            amount: 1_000,
            due_date: date(day),
            category_id: Uuid::nil(),
            account_id: None,
            is_auto_debit: false,
            is_variable: false,
            occurrence: None,
            paid,
            materialized: paid,
            transaction_id: None,
        })
    }

    fn income(name: &str, day: u32) -> ScheduledItem {
        ScheduledItem::Income(ScheduledIncome {
            id: format!("income_{name}"),
            income_source_id: Uuid::nil(),
            member_id: Uuid::nil(),
            name: name.to_string(),
            amount: 5_000,
            due_date: date(day),
            account_id: Uuid::nil(),
            paid: false,
            materialized: false,
            transaction_id: None,
        })
    }

    #[test]
    fn synthetic_ids_are_stable() {
        let id = Uuid::parse_str("6f1c2a9e-0a57-4d3b-9d0e-1f2a3b4c5d6e").unwrap();
        assert_eq!(
            synthetic_id(ScheduleKind::Bill, id, oct(), None),
            "bill_6f1c2a9e-0a57-4d3b-9d0e-1f2a3b4c5d6e_2026_10"
        );
        assert_eq!(
            synthetic_id(ScheduleKind::Bill, id, oct(), Some(3)),
            "bill_6f1c2a9e-0a57-4d3b-9d0e-1f2a3b4c5d6e_2026_10_3"
        );
    }

    #[test]
    fn bill_due_dates_per_frequency() {
        assert_eq!(
            bill_due_dates(BillFrequency::Monthly, 31, None, YearMonth::new(2026, 2).unwrap()),
            vec![NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()]
        );
        assert!(bill_due_dates(BillFrequency::Yearly, 10, Some(3), oct()).is_empty());
        assert_eq!(
            bill_due_dates(BillFrequency::Yearly, 10, Some(10), oct()),
            vec![date(10)]
        );
        // Fridays of October 2026.
        assert_eq!(
            bill_due_dates(BillFrequency::Weekly, 5, None, oct()),
            vec![date(2), date(9), date(16), date(23), date(30)]
        );
    }

    #[test]
    fn irregular_income_is_not_projected() {
        assert_eq!(income_due_date(IncomeFrequency::Irregular, Some(5), oct()), None);
        assert_eq!(income_due_date(IncomeFrequency::Monthly, None, oct()), None);
        assert_eq!(
            income_due_date(IncomeFrequency::Monthly, Some(5), oct()),
            Some(date(5))
        );
    }

    #[test]
    fn items_sort_by_day_kind_name() {
        let mut items = vec![
            income("Salary", 5),
            bill("Rent", 5, false),
            bill("Internet", 5, false),
            bill("Gym", 1, false),
        ];
        sort_items(&mut items);
        let names: Vec<&str> = items.iter().map(ScheduledItem::name).collect();
        assert_eq!(names, vec!["Gym", "Internet", "Rent", "Salary"]);
    }

    #[test]
    fn totals_count_paid_items() {
        let items = vec![bill("Rent", 5, true), bill("Gym", 1, false), income("Salary", 5)];
        let totals = ScheduleTotals::tally(&items);
        assert_eq!(totals.bills.due, 2_000);
        assert_eq!(totals.bills.paid, 1_000);
        assert_eq!(totals.bills.count, 2);
        assert_eq!(totals.bills.paid_count, 1);
        assert_eq!(totals.income.due, 5_000);
        assert_eq!(totals.goals, KindTotals::default());
    }

    #[test]
    fn items_serialize_with_source_type_tag() {
        let value = serde_json::to_value(bill("Rent", 5, false)).unwrap();
        assert_eq!(value["source_type"], "bill");
        assert_eq!(value["name"], "Rent");
    }
}
