//! Budget scoping and permission checks.
//!
//! Out-of-scope budgets are `Forbidden`; entities that do not belong to the
//! budget are `KeyNotFound`, exactly as if they did not exist.

use sea_orm::{DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MemberRole, Principal, ResultEngine, accounts, budgets, categories,
    category_groups, goals, income_sources, members, recurring_bills, transactions,
    util::parse_uuid,
};

use super::Engine;

/// Generates a `require_*` method loading an entity by id inside a budget.
macro_rules! impl_require_in_budget {
    ($require_fn:ident, $entity:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            budget_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<$entity::Model> {
            $entity::Entity::find_by_id(id.to_string())
                .filter($entity::Column::BudgetId.eq(budget_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_in_budget!(require_account, accounts, "account not exists");
    impl_require_in_budget!(require_category, categories, "category not exists");
    impl_require_in_budget!(require_group, category_groups, "category group not exists");
    impl_require_in_budget!(require_bill, recurring_bills, "recurring bill not exists");
    impl_require_in_budget!(require_income_source, income_sources, "income source not exists");
    impl_require_in_budget!(require_goal, goals, "goal not exists");
    impl_require_in_budget!(require_member, members, "member not exists");
    impl_require_in_budget!(require_transaction, transactions, "transaction not exists");

    /// Checks read access to a budget and loads it.
    pub(super) async fn require_budget_read(
        &self,
        db: &DatabaseTransaction,
        principal: &Principal,
        budget_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        if !principal.can_access(budget_id) {
            return Err(EngineError::Forbidden(
                "budget is not accessible".to_string(),
            ));
        }
        budgets::Entity::find_by_id(budget_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }

    /// Checks write access: read access plus a member role allowed to mutate.
    pub(super) async fn require_budget_write(
        &self,
        db: &DatabaseTransaction,
        principal: &Principal,
        budget_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        let budget = self.require_budget_read(db, principal, budget_id).await?;
        match self.member_role(db, budget_id, &principal.user_id).await? {
            Some(role) if role.can_write() => Ok(budget),
            Some(_) => Err(EngineError::Forbidden(
                "viewers cannot modify the budget".to_string(),
            )),
            None => Err(EngineError::Forbidden(
                "not a member of the budget".to_string(),
            )),
        }
    }

    pub(super) async fn member_role(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<MemberRole>> {
        let row = members::Entity::find()
            .filter(members::Column::BudgetId.eq(budget_id.to_string()))
            .filter(members::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| MemberRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Resolves the principal of an external user from their memberships.
    pub async fn principal_for(&self, user_id: &str) -> ResultEngine<Principal> {
        let budget_ids: Vec<String> = members::Entity::find()
            .select_only()
            .column(members::Column::BudgetId)
            .filter(members::Column::UserId.eq(user_id))
            .into_tuple()
            .all(&self.database)
            .await?;
        let budget_ids = budget_ids
            .iter()
            .map(|id| parse_uuid(id, "budget"))
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Principal::new(user_id, budget_ids))
    }
}
