//! Income sources declared by members.

use sea_orm::entity::prelude::*;

use crate::macros::string_enum;

string_enum! {
    pub enum IncomeFrequency {
        Monthly => "monthly",
        Weekly => "weekly",
        Yearly => "yearly",
        Irregular => "irregular",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "income_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub member_id: String,
    pub account_id: String,
    pub name: String,
    pub amount: i64,
    pub frequency: String,
    pub day_of_month: Option<i32>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
