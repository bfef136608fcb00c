mod common;

use common::{date, fixture};
use engine::{
    BillFrequency, CategoryBehavior, EngineError, IncomeFrequency, MoneyCents, NewCategoryCmd,
    NewIncomeSourceCmd, NewRecurringBillCmd, TransactionStatus,
};

#[tokio::test]
async fn unspent_allocation_carries_into_next_month() {
    let f = fixture().await;
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 1, 20_000)
        .await
        .unwrap();
    f.expense(
        f.checking,
        f.groceries,
        15_000,
        date(2030, 1, 12),
        TransactionStatus::Cleared,
    )
    .await;
    // Pending spending is shown but never reduces the carry-over.
    f.expense(
        f.checking,
        f.groceries,
        2_000,
        date(2030, 1, 20),
        TransactionStatus::Pending,
    )
    .await;

    let january = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();
    let groceries = january.category(f.groceries).unwrap();
    assert_eq!(groceries.spent, 15_000);
    assert_eq!(groceries.pending_spent, 2_000);
    assert_eq!(groceries.available, 5_000);

    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 2, 20_000)
        .await
        .unwrap();
    f.expense(
        f.checking,
        f.groceries,
        18_000,
        date(2030, 2, 3),
        TransactionStatus::Cleared,
    )
    .await;

    let february = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let groceries = february.category(f.groceries).unwrap();
    assert_eq!(groceries.carried_over, 5_000);
    assert_eq!(groceries.effective_carried_over, 5_000);
    assert_eq!(groceries.available, 7_000);
}

#[tokio::test]
async fn overspending_is_not_carried_as_debt() {
    let f = fixture().await;
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 1, 5_000)
        .await
        .unwrap();
    f.expense(
        f.checking,
        f.groceries,
        8_000,
        date(2030, 1, 12),
        TransactionStatus::Cleared,
    )
    .await;

    let january = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();
    assert_eq!(january.category(f.groceries).unwrap().available, -3_000);

    let february = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let groceries = february.category(f.groceries).unwrap();
    assert_eq!(groceries.carried_over, 0);
    assert_eq!(groceries.available, 0);
}

#[tokio::test]
async fn refill_up_hides_its_leftover() {
    let f = fixture().await;
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.fuel, 2030, 1, 10_000)
        .await
        .unwrap();
    f.expense(
        f.checking,
        f.fuel,
        4_000,
        date(2030, 1, 8),
        TransactionStatus::Cleared,
    )
    .await;
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.fuel, 2030, 2, 10_000)
        .await
        .unwrap();

    let february = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let fuel = february.category(f.fuel).unwrap();
    assert_eq!(fuel.behavior, CategoryBehavior::RefillUp);
    assert_eq!(fuel.carried_over, 6_000);
    assert_eq!(fuel.effective_carried_over, 0);
    assert_eq!(fuel.available, 10_000);
}

#[tokio::test]
async fn carry_over_pass_is_idempotent_and_follows_late_changes() {
    let f = fixture().await;
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 1, 10_000)
        .await
        .unwrap();

    for _ in 0..3 {
        f.engine
            .ensure_month_allocations(&f.principal, f.budget_id, 2030, 2)
            .await
            .unwrap();
    }
    let first = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let second = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.category(f.groceries).unwrap().carried_over, 10_000);

    // Allocating keeps the carry-over; a late January expense updates it.
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 2, 3_000)
        .await
        .unwrap();
    f.expense(
        f.checking,
        f.groceries,
        4_000,
        date(2030, 1, 30),
        TransactionStatus::Cleared,
    )
    .await;
    let february = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let groceries = february.category(f.groceries).unwrap();
    assert_eq!(groceries.allocated, 3_000);
    assert_eq!(groceries.carried_over, 6_000);
    assert_eq!(groceries.available, 9_000);
}

#[tokio::test]
async fn recurring_bills_pin_their_category_allocation() {
    let f = fixture().await;
    let rent = f
        .engine
        .create_category(
            &f.principal,
            NewCategoryCmd::new(f.budget_id, f.group_id, "Rent", CategoryBehavior::SetAside),
        )
        .await
        .unwrap();
    let cleaning = f
        .engine
        .create_category(
            &f.principal,
            NewCategoryCmd::new(f.budget_id, f.group_id, "Cleaning", CategoryBehavior::RefillUp),
        )
        .await
        .unwrap();
    let rent_bill = f
        .engine
        .create_recurring_bill(
            &f.principal,
            NewRecurringBillCmd::new(f.budget_id, rent, "Rent", 150_000, BillFrequency::Monthly, 10)
                .account(f.checking),
        )
        .await
        .unwrap();
    f.engine
        .create_recurring_bill(
            &f.principal,
            NewRecurringBillCmd::new(
                f.budget_id,
                cleaning,
                "Cleaner",
                2_000,
                BillFrequency::Weekly,
                5,
            ),
        )
        .await
        .unwrap();
    // A stored allocation is overridden by the bill amount.
    f.engine
        .set_allocation(&f.principal, f.budget_id, rent, 2030, 3, 1)
        .await
        .unwrap();

    let march = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 3)
        .await
        .unwrap();
    let rent_row = march.category(rent).unwrap();
    assert_eq!(rent_row.allocated, 150_000);
    assert_eq!(rent_row.recurring_bill_id, Some(rent_bill));
    // Five Fridays in March 2030.
    assert_eq!(march.category(cleaning).unwrap().allocated, 10_000);

    let duplicate = f
        .engine
        .create_recurring_bill(
            &f.principal,
            NewRecurringBillCmd::new(f.budget_id, rent, "Rent 2", 1_000, BillFrequency::Monthly, 1),
        )
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind(), "conflict");
}

#[tokio::test]
async fn income_summary_uses_monthly_overrides() {
    let f = fixture().await;
    let member_id = f.engine.member_id(&f.principal, f.budget_id).await.unwrap();
    let salary = f
        .engine
        .create_income_source(
            &f.principal,
            NewIncomeSourceCmd::new(
                f.budget_id,
                member_id,
                f.checking,
                "Salary",
                500_000,
                IncomeFrequency::Monthly,
            )
            .day_of_month(5),
        )
        .await
        .unwrap();
    f.engine
        .set_income_allocation(&f.principal, f.budget_id, salary, 2030, 2, 450_000)
        .await
        .unwrap();
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 2, 100_000)
        .await
        .unwrap();
    f.income(f.checking, 120_000, date(2030, 2, 5)).await;

    let january = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();
    assert_eq!(january.income.planned, 500_000);
    assert_eq!(january.income.received, 0);

    let february = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    assert_eq!(february.income.planned, 450_000);
    assert_eq!(february.income.received, 120_000);
    assert_eq!(february.total_allocated, 100_000);
    assert_eq!(february.income.to_allocate, 350_000);
}

#[tokio::test]
async fn allocation_inputs_are_validated() {
    let f = fixture().await;
    let negative = f
        .engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 1, -1)
        .await
        .unwrap_err();
    assert_eq!(negative.kind(), "validation");
    let bad_month = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 13)
        .await
        .unwrap_err();
    assert_eq!(bad_month.kind(), "validation");
}

#[tokio::test]
async fn oversized_allocations_are_rejected_and_large_ones_carry() {
    let f = fixture().await;
    let err = f
        .engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 1, i64::MAX)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    let max = MoneyCents::MAX.cents();
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 1, max)
        .await
        .unwrap();
    f.engine
        .set_allocation(&f.principal, f.budget_id, f.groceries, 2030, 2, 1)
        .await
        .unwrap();

    let february = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let groceries = february.category(f.groceries).unwrap();
    assert_eq!(groceries.carried_over, max);
    assert_eq!(groceries.available, max + 1);
}
