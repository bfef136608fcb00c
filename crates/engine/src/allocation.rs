//! Envelope allocation view and carry-over arithmetic.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CategoryBehavior, EngineError, MoneyCents, MonthState, ResultEngine};

/// Money rolled into the next month:
/// `max(0, allocated + carried_over - spent)`. Overspending is never carried
/// as debt.
pub fn carry_over(allocated: i64, carried_over: i64, spent: i64) -> ResultEngine<i64> {
    MoneyCents::new(allocated)
        .checked_add(MoneyCents::new(carried_over))
        .and_then(|total| total.checked_sub(MoneyCents::new(spent)))
        .map(|left| left.floor_zero().cents())
        .ok_or_else(|| EngineError::Validation("carry-over out of range".to_string()))
}

/// Carry-over visible to the user. `refill_up` envelopes start every month
/// from their allocation, so their persisted leftover is hidden.
#[must_use]
pub fn effective_carry_over(behavior: CategoryBehavior, carried_over: i64) -> i64 {
    match behavior {
        CategoryBehavior::RefillUp => 0,
        CategoryBehavior::SetAside => carried_over,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub category_id: Uuid,
    pub name: String,
    pub behavior: CategoryBehavior,
    /// Bill amount when a bill due this month is linked, stored value
    /// otherwise.
    pub allocated: i64,
    pub carried_over: i64,
    pub effective_carried_over: i64,
    /// Confirmed expenses of the month.
    pub spent: i64,
    pub pending_spent: i64,
    pub available: i64,
    pub recurring_bill_id: Option<Uuid>,
}

impl CategoryAllocation {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        category_id: Uuid,
        name: String,
        behavior: CategoryBehavior,
        allocated: i64,
        carried_over: i64,
        spent: i64,
        pending_spent: i64,
        recurring_bill_id: Option<Uuid>,
    ) -> Self {
        let effective_carried_over = effective_carry_over(behavior, carried_over);
        Self {
            category_id,
            name,
            behavior,
            allocated,
            carried_over,
            effective_carried_over,
            spent,
            pending_spent,
            available: allocated + effective_carried_over - spent,
            recurring_bill_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAllocation {
    pub group_id: Uuid,
    pub name: String,
    pub sort_order: i32,
    pub categories: Vec<CategoryAllocation>,
    pub allocated: i64,
    pub spent: i64,
    pub available: i64,
}

impl GroupAllocation {
    pub(crate) fn new(
        group_id: Uuid,
        name: String,
        sort_order: i32,
        categories: Vec<CategoryAllocation>,
    ) -> Self {
        let allocated = categories.iter().map(|c| c.allocated).sum();
        let spent = categories.iter().map(|c| c.spent).sum();
        let available = categories.iter().map(|c| c.available).sum();
        Self {
            group_id,
            name,
            sort_order,
            categories,
            allocated,
            spent,
            available,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSummary {
    /// Monthly overrides, or nominal amounts, of active income sources.
    pub planned: i64,
    /// Confirmed income of the month.
    pub received: i64,
    pub to_allocate: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationView {
    pub year: i32,
    pub month: u32,
    pub status: MonthState,
    pub groups: Vec<GroupAllocation>,
    pub total_allocated: i64,
    pub total_spent: i64,
    pub total_available: i64,
    pub income: IncomeSummary,
}

impl AllocationView {
    pub(crate) fn new(
        year: i32,
        month: u32,
        status: MonthState,
        groups: Vec<GroupAllocation>,
        planned_income: i64,
        received_income: i64,
    ) -> Self {
        let total_allocated = groups.iter().map(|g| g.allocated).sum();
        let total_spent = groups.iter().map(|g| g.spent).sum();
        let total_available = groups.iter().map(|g| g.available).sum();
        Self {
            year,
            month,
            status,
            groups,
            total_allocated,
            total_spent,
            total_available,
            income: IncomeSummary {
                planned: planned_income,
                received: received_income,
                to_allocate: planned_income - total_allocated,
            },
        }
    }

    /// Finds a category row across groups.
    pub fn category(&self, category_id: Uuid) -> Option<&CategoryAllocation> {
        self.groups
            .iter()
            .flat_map(|g| g.categories.iter())
            .find(|c| c.category_id == category_id)
    }
}
