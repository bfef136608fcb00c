//! Caller identity as resolved by the authorization layer.

use std::collections::HashSet;

use uuid::Uuid;

/// The caller of an engine operation: an external user id and the set of
/// budgets they may access. The engine never authenticates; it only checks
/// that the budget is in the set and, for writes, that the caller's member
/// role allows mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub budget_ids: HashSet<Uuid>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, budget_ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            user_id: user_id.into(),
            budget_ids: budget_ids.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn can_access(&self, budget_id: Uuid) -> bool {
        self.budget_ids.contains(&budget_id)
    }

    /// Same principal with one more accessible budget.
    #[must_use]
    pub fn with_budget(mut self, budget_id: Uuid) -> Self {
        self.budget_ids.insert(budget_id);
        self
    }
}
