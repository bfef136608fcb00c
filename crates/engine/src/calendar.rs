//! Calendar arithmetic used by the allocation engine, the schedule projector
//! and installment planning.
//!
//! All functions are pure. Days are clamped to the last valid day of the
//! month (a bill due on the 31st is due on Feb 28th/29th).

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};

use crate::{EngineError, ResultEngine};

/// A calendar month (`month` is 1-indexed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Validates and builds a month key.
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(EngineError::Validation(format!("invalid year: {year}")));
        }
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub const fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Moves `months` forward (or backward when negative).
    #[must_use]
    pub fn offset(self, months: i32) -> Self {
        let index = self.index() + i64::from(months);
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// Signed number of months from `self` to `other`.
    #[must_use]
    pub fn months_until(self, other: YearMonth) -> i64 {
        other.index() - self.index()
    }

    fn index(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    #[must_use]
    pub const fn days_in_month(self) -> u32 {
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            _ => {
                if is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
        }
    }

    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.clamp_day(31)
    }

    /// Date for `day` in this month, clamped to `[1, days_in_month]`.
    #[must_use]
    pub fn clamp_day(self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days_in_month());
        self.first_day() + Days::new(u64::from(day - 1))
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        YearMonth::of(date) == self
    }

    #[must_use]
    pub fn range(self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    /// Every date in this month falling on the ISO weekday
    /// (1 = Monday … 7 = Sunday).
    #[must_use]
    pub fn weekday_occurrences(self, iso_weekday: u32) -> Vec<NaiveDate> {
        if !(1..=7).contains(&iso_weekday) {
            return Vec::new();
        }
        let first = self.first_day();
        let first_weekday = first.weekday().number_from_monday();
        let offset = (iso_weekday + 7 - first_weekday) % 7;
        (offset..self.days_in_month())
            .step_by(7)
            .map(|delta| first + Days::new(u64::from(delta)))
            .collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Inclusive date window `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> ResultEngine<Self> {
        if start > end {
            return Err(EngineError::Validation(
                "invalid range: start must be <= end".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month.
    pub fn month(year: i32, month: u32) -> ResultEngine<Self> {
        Ok(YearMonth::new(year, month)?.range())
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The month this window lives in. Windows spanning two months are
    /// rejected.
    pub fn year_month(&self) -> ResultEngine<YearMonth> {
        let start = YearMonth::of(self.start);
        if YearMonth::of(self.end) != start {
            return Err(EngineError::Validation(
                "date range must stay within one calendar month".to_string(),
            ));
        }
        Ok(start)
    }
}

/// Statement cycle a credit-card purchase belongs to. Purchases after the
/// closing day roll into the next cycle.
#[must_use]
pub fn card_cycle(purchase: NaiveDate, closing_day: u32) -> YearMonth {
    let month = YearMonth::of(purchase);
    if purchase > month.clamp_day(closing_day) {
        month.next()
    } else {
        month
    }
}

/// Payment due date of the statement that closes in `cycle`. A due day on or
/// before the closing day is paid in the following month.
#[must_use]
pub fn card_due_date(cycle: YearMonth, closing_day: u32, due_day: u32) -> NaiveDate {
    let due_month = if due_day <= closing_day {
        cycle.next()
    } else {
        cycle
    };
    due_month.clamp_day(due_day)
}
