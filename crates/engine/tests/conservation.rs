//! Stored balances always equal the sum of transaction legs, whatever
//! sequence of writes produced them.

mod common;

use common::{Fixture, date, fixture};
use engine::{
    CreateTransactionCmd, InstallmentPurchaseCmd, TransactionKind, TransactionStatus,
    UpdateTransactionCmd,
};
use proptest::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug)]
enum Op {
    Create {
        kind: TransactionKind,
        account: usize,
        amount: i64,
        pending: bool,
    },
    Installments {
        account: usize,
        amount: i64,
        count: u32,
    },
    ToggleStatus(usize),
    ChangeAmount(usize, i64),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let kind = prop_oneof![
        Just(TransactionKind::Income),
        Just(TransactionKind::Expense),
        Just(TransactionKind::Transfer),
    ];
    prop_oneof![
        4 => (kind, 0usize..3, 1i64..50_000, any::<bool>()).prop_map(
            |(kind, account, amount, pending)| Op::Create {
                kind,
                account,
                amount,
                pending,
            }
        ),
        1 => (0usize..3, 1i64..20_000, 2u32..6).prop_map(|(account, amount, count)| {
            Op::Installments {
                account,
                amount,
                count,
            }
        }),
        2 => any::<usize>().prop_map(Op::ToggleStatus),
        1 => (any::<usize>(), 1i64..50_000).prop_map(|(i, a)| Op::ChangeAmount(i, a)),
        2 => any::<usize>().prop_map(Op::Delete),
    ]
}

async fn apply(f: &Fixture, accounts: &[Uuid], live: &mut Vec<(Uuid, bool)>, op: Op) {
    match op {
        Op::Create {
            kind,
            account,
            amount,
            pending,
        } => {
            let status = if pending {
                TransactionStatus::Pending
            } else {
                TransactionStatus::Cleared
            };
            let mut cmd = CreateTransactionCmd::new(
                f.budget_id,
                accounts[account],
                kind,
                amount,
                date(2030, 1, 15),
                "generated",
            )
            .status(status);
            if kind == TransactionKind::Transfer {
                cmd = cmd.destination(accounts[(account + 1) % accounts.len()]);
            }
            let tx = f.engine.create_transaction(&f.principal, cmd).await.unwrap();
            live.push((tx.id, pending));
        }
        Op::Installments {
            account,
            amount,
            count,
        } => {
            let rows = f
                .engine
                .create_installment_purchase(
                    &f.principal,
                    InstallmentPurchaseCmd::new(
                        f.budget_id,
                        accounts[account],
                        amount,
                        count,
                        date(2030, 1, 15),
                        "generated series",
                    ),
                )
                .await
                .unwrap();
            // Only the parent is tracked; deleting it removes the series.
            live.push((rows[0].id, false));
        }
        Op::ToggleStatus(index) if !live.is_empty() => {
            let slot = index % live.len();
            let (id, pending) = live[slot];
            let status = if pending {
                TransactionStatus::Cleared
            } else {
                TransactionStatus::Pending
            };
            f.engine
                .update_transaction(
                    &f.principal,
                    f.budget_id,
                    id,
                    UpdateTransactionCmd::new().status(status),
                )
                .await
                .unwrap();
            live[slot].1 = !pending;
        }
        Op::ChangeAmount(index, amount) if !live.is_empty() => {
            let (id, _) = live[index % live.len()];
            f.engine
                .update_transaction(
                    &f.principal,
                    f.budget_id,
                    id,
                    UpdateTransactionCmd::new().amount(amount).apply_to_series(true),
                )
                .await
                .unwrap();
        }
        Op::Delete(index) if !live.is_empty() => {
            let (id, _) = live.remove(index % live.len());
            f.engine
                .delete_transaction(&f.principal, f.budget_id, id)
                .await
                .unwrap();
        }
        _ => {}
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn balances_match_legs_after_any_write_sequence(
        ops in prop::collection::vec(op_strategy(), 1..25),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let f = fixture().await;
            let accounts = [f.checking, f.savings, f.card];
            let mut live = Vec::new();
            for op in ops {
                apply(&f, &accounts, &mut live, op).await;
                f.assert_balances_consistent().await;
            }

            // Deleting everything brings every account back to zero.
            for (id, _) in live {
                f.engine
                    .delete_transaction(&f.principal, f.budget_id, id)
                    .await
                    .unwrap();
            }
            for account in accounts {
                assert_eq!(f.balances(account).await, (0, 0));
            }
        });
    }
}
