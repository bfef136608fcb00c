//! Spending categories ("envelopes").

use sea_orm::entity::prelude::*;

use crate::macros::string_enum;

string_enum! {
    /// How leftover money behaves from one month to the next.
    pub enum CategoryBehavior {
        /// Planned each month from scratch; leftover is not shown as available.
        RefillUp => "refill_up",
        /// Positive leftover accumulates month after month.
        SetAside => "set_aside",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub budget_id: String,
    pub group_id: String,
    pub name: String,
    pub name_norm: String,
    pub behavior: String,
    pub member_id: Option<String>,
    pub archived: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category_groups::Entity",
        from = "Column::GroupId",
        to = "super::category_groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Group,
}

impl Related<super::category_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
