//! Savings goals.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    calendar::YearMonth,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub name: String,
    pub target_amount: i64,
    pub current_amount: i64,
    pub target_date: Option<NaiveDate>,
    pub account_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Goal {
    pub fn remaining(&self) -> MoneyCents {
        MoneyCents::new(self.target_amount - self.current_amount).floor_zero()
    }

    pub fn is_complete(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Amount to put aside in `month` to reach the target on time:
    /// `ceil(remaining / max(1, months until target))`.
    ///
    /// `None` when nothing remains or the goal has no target date.
    pub fn monthly_target(&self, month: YearMonth) -> Option<MoneyCents> {
        if self.is_complete() {
            return None;
        }
        let remaining = self.remaining();
        let target_month = YearMonth::of(self.target_date?);
        let months_remaining = month.months_until(target_month).max(1);
        remaining.ceil_div(months_remaining)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub name: String,
    pub target_amount: i64,
    pub current_amount: i64,
    pub target_date: Option<Date>,
    pub account_id: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::goal_contributions::Entity")]
    Contributions,
}

impl Related<super::goal_contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            budget_id: parse_uuid(&model.budget_id, "budget")?,
            name: model.name,
            target_amount: model.target_amount,
            current_amount: model.current_amount,
            target_date: model.target_date,
            account_id: parse_optional_uuid(model.account_id.as_deref(), "account")?,
            active: model.active,
            created_at: model.created_at,
        })
    }
}
