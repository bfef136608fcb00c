//! Recurring bills: obligation templates, never transactions by themselves.

use sea_orm::entity::prelude::*;

use crate::macros::string_enum;

string_enum! {
    pub enum BillFrequency {
        /// `due_day` is the ISO weekday (1 = Monday … 7 = Sunday).
        Weekly => "weekly",
        /// `due_day` is the day of month.
        Monthly => "monthly",
        /// Due on `due_day` of `due_month`.
        Yearly => "yearly",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_bills")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub category_id: String,
    pub account_id: Option<String>,
    pub name: String,
    pub amount: i64,
    pub frequency: String,
    pub due_day: i32,
    pub due_month: Option<i32>,
    pub is_auto_debit: bool,
    pub is_variable: bool,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
