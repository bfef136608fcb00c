//! Per-month envelope amounts.
//!
//! One row per `(budget, category, year, month)`, enforced by a unique index.
//! `allocated` is user-owned; `carried_over` is owned by the carry-over
//! engine and is never negative.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "monthly_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub category_id: String,
    pub year: i32,
    pub month: i32,
    pub allocated: i64,
    pub carried_over: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
