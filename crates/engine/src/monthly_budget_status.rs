//! Month lifecycle rows, one per `(budget, year, month)`.
//!
//! A missing row means `planning`.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, macros::string_enum};

string_enum! {
    pub enum MonthState {
        Planning => "planning",
        Active => "active",
        Closed => "closed",
    }
}

impl MonthState {
    /// Validates a lifecycle move. `planning → active → closed`; nothing
    /// goes back and `closed` is terminal.
    pub fn transition(self, to: MonthState) -> ResultEngine<MonthState> {
        match (self, to) {
            (Self::Planning, Self::Active) | (Self::Active, Self::Closed) => Ok(to),
            (from, to) => Err(EngineError::InvalidTransition(format!(
                "cannot move month from {from} to {to}"
            ))),
        }
    }
}

/// Lifecycle snapshot of a month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthStatus {
    pub year: i32,
    pub month: u32,
    pub state: MonthState,
    pub started_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "monthly_budget_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub year: i32,
    pub month: i32,
    pub status: String,
    pub started_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for MonthStatus {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            year: model.year,
            month: model.month as u32,
            state: MonthState::try_from(model.status.as_str())?,
            started_at: model.started_at,
            closed_at: model.closed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_only_moves_forward() {
        assert_eq!(
            MonthState::Planning.transition(MonthState::Active).unwrap(),
            MonthState::Active
        );
        assert_eq!(
            MonthState::Active.transition(MonthState::Closed).unwrap(),
            MonthState::Closed
        );
        assert!(MonthState::Active.transition(MonthState::Planning).is_err());
        assert!(MonthState::Closed.transition(MonthState::Active).is_err());
        assert!(MonthState::Planning.transition(MonthState::Closed).is_err());
    }
}
