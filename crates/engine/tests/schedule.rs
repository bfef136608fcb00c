mod common;

use common::{date, fixture};
use engine::{
    CreateTransactionCmd, DateRange, MonthState, ScheduleKind, ScheduledItem, TransactionKind,
    TransactionStatus, UpdateTransactionCmd,
};

fn january() -> DateRange {
    DateRange::month(2030, 1).unwrap()
}

#[tokio::test]
async fn months_not_started_project_nothing() {
    let f = fixture().await;
    f.obligations().await;

    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    assert_eq!(schedule.status, MonthState::Planning);
    assert!(schedule.items.is_empty());
    assert!(!schedule.allocations_exist);
    assert_eq!(schedule.month_totals.bills.count, 0);
}

#[tokio::test]
async fn obligations_are_not_projected_before_they_existed() {
    let f = fixture().await;
    let o = f.obligations().await;

    let outcome = f
        .engine
        .start_month(&f.principal, f.budget_id, 2020, 1)
        .await
        .unwrap();
    assert_eq!(outcome.status.state, MonthState::Active);
    assert_eq!(outcome.created, 0);

    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, DateRange::month(2020, 1).unwrap())
        .await
        .unwrap();
    assert_eq!(schedule.status, MonthState::Active);
    assert!(schedule.items.is_empty());
    assert_eq!(schedule.month_totals.bills.count, 0);

    let view = f
        .engine
        .allocation_view(&f.principal, f.budget_id, 2020, 1)
        .await
        .unwrap();
    let rent = view.category(o.rent_category).unwrap();
    assert_eq!(rent.allocated, 0);
    assert_eq!(rent.recurring_bill_id, None);
    assert_eq!(view.income.planned, 0);
}

#[tokio::test]
async fn active_month_projects_every_obligation_in_order() {
    let f = fixture().await;
    let o = f.obligations().await;
    f.engine
        .start_month(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();

    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    let days: Vec<(u32, ScheduleKind)> = schedule
        .items
        .iter()
        .map(|item| (chrono::Datelike::day(&item.due_date()), item.kind()))
        .collect();
    // Fridays of January 2030 are the 4th, 11th, 18th and 25th.
    assert_eq!(
        days,
        vec![
            (4, ScheduleKind::Bill),
            (5, ScheduleKind::Income),
            (10, ScheduleKind::Bill),
            (11, ScheduleKind::Bill),
            (18, ScheduleKind::Bill),
            (25, ScheduleKind::Bill),
            (31, ScheduleKind::Goal),
        ]
    );

    let cleaner_ids: Vec<&str> = schedule
        .items
        .iter()
        .filter(|item| item.name() == "Cleaner")
        .map(ScheduledItem::id)
        .collect();
    assert_eq!(cleaner_ids[0], format!("bill_{}_2030_01_1", o.cleaner));
    assert_eq!(cleaner_ids[3], format!("bill_{}_2030_01_4", o.cleaner));

    let rent = schedule
        .items
        .iter()
        .find(|item| item.name() == "Rent")
        .unwrap();
    assert_eq!(rent.id(), format!("bill_{}_2030_01", o.rent));
    assert!(rent.is_materialized());
    assert!(!rent.is_paid());

    let ScheduledItem::Goal(trip) = schedule.items.last().unwrap() else {
        panic!("goal expected last");
    };
    assert_eq!(trip.goal_id, o.trip);
    assert_eq!(trip.amount, 50_000);
    assert_eq!(trip.remaining, 100_000);
    assert_eq!(trip.months_remaining, 2);

    assert_eq!(schedule.month_totals.bills.count, 5);
    assert_eq!(schedule.month_totals.bills.due, 158_000);
    assert_eq!(schedule.month_totals.income.due, 500_000);
    assert_eq!(schedule.totals, schedule.month_totals);

    let again = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    assert_eq!(
        again.items.iter().map(ScheduledItem::id).collect::<Vec<_>>(),
        schedule.items.iter().map(ScheduledItem::id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn confirmed_links_mark_items_paid() {
    let f = fixture().await;
    let o = f.obligations().await;
    f.engine
        .start_month(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();

    // Settle the first cleaner visit by hand.
    f.engine
        .create_transaction(
            &f.principal,
            CreateTransactionCmd::new(
                f.budget_id,
                f.checking,
                TransactionKind::Expense,
                2_000,
                date(2030, 1, 4),
                "Cleaner",
            )
            .category(o.cleaning_category)
            .recurring_bill(o.cleaner),
        )
        .await
        .unwrap();

    // Clear the pending rent created when the month started.
    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    let Some(ScheduledItem::Bill(rent)) = schedule.items.iter().find(|i| i.name() == "Rent")
    else {
        panic!("rent expected");
    };
    let rent_tx = rent.transaction_id.unwrap();
    f.engine
        .update_transaction(
            &f.principal,
            f.budget_id,
            rent_tx,
            UpdateTransactionCmd::new().status(TransactionStatus::Cleared),
        )
        .await
        .unwrap();

    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    let paid: Vec<&str> = schedule
        .items
        .iter()
        .filter(|item| item.is_paid())
        .map(ScheduledItem::id)
        .collect();
    assert_eq!(
        paid,
        vec![
            format!("bill_{}_2030_01_1", o.cleaner),
            format!("bill_{}_2030_01", o.rent),
        ]
    );
    assert_eq!(schedule.month_totals.bills.paid, 152_000);
    assert_eq!(schedule.month_totals.bills.paid_count, 2);
}

#[tokio::test]
async fn goal_target_stays_put_once_paid() {
    let f = fixture().await;
    let o = f.obligations().await;
    f.engine
        .start_month(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();

    let goal_item = |items: &[ScheduledItem]| {
        items
            .iter()
            .find_map(|item| match item {
                ScheduledItem::Goal(goal) => Some(goal.clone()),
                _ => None,
            })
            .unwrap()
    };

    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    let pending = goal_item(&schedule.items);
    assert!(pending.materialized);
    assert!(!pending.paid);

    f.engine
        .update_transaction(
            &f.principal,
            f.budget_id,
            pending.transaction_id.unwrap(),
            UpdateTransactionCmd::new().status(TransactionStatus::Cleared),
        )
        .await
        .unwrap();
    let goal = f.engine.goal(&f.principal, f.budget_id, o.trip).await.unwrap();
    assert_eq!(goal.current_amount, 50_000);

    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, january())
        .await
        .unwrap();
    let paid = goal_item(&schedule.items);
    assert!(paid.paid);
    assert_eq!(paid.amount, 50_000);

    f.engine
        .start_month(&f.principal, f.budget_id, 2030, 2)
        .await
        .unwrap();
    let february = f
        .engine
        .project_schedule(&f.principal, f.budget_id, DateRange::month(2030, 2).unwrap())
        .await
        .unwrap();
    let next = goal_item(&february.items);
    assert_eq!(next.remaining, 50_000);
    assert_eq!(next.months_remaining, 1);
    assert_eq!(next.amount, 50_000);
}

#[tokio::test]
async fn window_filters_items_but_not_month_totals() {
    let f = fixture().await;
    f.obligations().await;
    f.engine
        .start_month(&f.principal, f.budget_id, 2030, 1)
        .await
        .unwrap();

    let window = DateRange::new(date(2030, 1, 1), date(2030, 1, 10)).unwrap();
    let schedule = f
        .engine
        .project_schedule(&f.principal, f.budget_id, window)
        .await
        .unwrap();
    assert_eq!(schedule.items.len(), 3);
    assert_eq!(schedule.totals.bills.count, 2);
    assert_eq!(schedule.totals.income.count, 1);
    assert_eq!(schedule.totals.goals.count, 0);
    assert_eq!(schedule.month_totals.bills.count, 5);
    assert_eq!(schedule.month_totals.goals.count, 1);
    assert_eq!(schedule.from, date(2030, 1, 1));
    assert_eq!(schedule.to, date(2030, 1, 10));
}

#[tokio::test]
async fn window_crossing_months_is_rejected() {
    let f = fixture().await;
    let window = DateRange::new(date(2030, 1, 20), date(2030, 2, 5)).unwrap();
    let err = f
        .engine
        .project_schedule(&f.principal, f.budget_id, window)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "validation");
}
