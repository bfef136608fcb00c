//! Budget members.
//!
//! `user_id` is the identifier handed out by the external authorization
//! collaborator; the engine never authenticates it.

use sea_orm::entity::prelude::*;

use crate::macros::string_enum;

string_enum! {
    /// Role of a member inside a budget.
    ///
    /// - `owner`: full access, created with the budget.
    /// - `editor`: can write.
    /// - `viewer`: read-only.
    pub enum MemberRole {
        Owner => "owner",
        Editor => "editor",
        Viewer => "viewer",
    }
}

impl MemberRole {
    pub fn can_write(self) -> bool {
        matches!(self, Self::Owner | Self::Editor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub user_id: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
