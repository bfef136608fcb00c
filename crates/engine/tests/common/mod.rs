#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    AccountKind, BillFrequency, CategoryBehavior, CreateTransactionCmd, Currency, Engine,
    IncomeFrequency, NewAccountCmd, NewCategoryCmd, NewGoalCmd, NewIncomeSourceCmd,
    NewRecurringBillCmd, Principal, Transaction, TransactionKind, TransactionStatus,
};
use migration::MigratorTrait;
use uuid::Uuid;

pub const USER: &str = "alice";

pub struct Fixture {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub principal: Principal,
    pub budget_id: Uuid,
    pub checking: Uuid,
    pub savings: Uuid,
    /// Closes on the 25th, due on the 5th of the following month.
    pub card: Uuid,
    pub group_id: Uuid,
    /// `set_aside` category.
    pub groceries: Uuid,
    /// `refill_up` category.
    pub fuel: Uuid,
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn fixture() -> Fixture {
    let (engine, db) = engine_with_db().await;
    let budget_id = engine
        .create_budget(USER, "Alice", "Home", Currency::Brl)
        .await
        .unwrap();
    let principal = Principal::new(USER, [budget_id]);

    let checking = engine
        .create_account(
            &principal,
            NewAccountCmd::new(budget_id, "Checking", AccountKind::Checking),
        )
        .await
        .unwrap();
    let savings = engine
        .create_account(
            &principal,
            NewAccountCmd::new(budget_id, "Savings", AccountKind::Savings),
        )
        .await
        .unwrap();
    let card = engine
        .create_account(
            &principal,
            NewAccountCmd::new(budget_id, "Visa", AccountKind::CreditCard)
                .card_cycle(25, 5)
                .credit_limit(500_000),
        )
        .await
        .unwrap();

    let group_id = engine
        .create_category_group(&principal, budget_id, "Everyday", 0)
        .await
        .unwrap();
    let groceries = engine
        .create_category(
            &principal,
            NewCategoryCmd::new(budget_id, group_id, "Groceries", CategoryBehavior::SetAside),
        )
        .await
        .unwrap();
    let fuel = engine
        .create_category(
            &principal,
            NewCategoryCmd::new(budget_id, group_id, "Fuel", CategoryBehavior::RefillUp),
        )
        .await
        .unwrap();

    Fixture {
        engine,
        db,
        principal,
        budget_id,
        checking,
        savings,
        card,
        group_id,
        groceries,
        fuel,
    }
}

/// Recurring obligations used by the schedule and month lifecycle tests.
pub struct Obligations {
    pub rent_category: Uuid,
    /// Monthly on the 10th, paid from checking.
    pub rent: Uuid,
    pub cleaning_category: Uuid,
    /// Every Friday, no account.
    pub cleaner: Uuid,
    /// Monthly on the 5th into checking.
    pub salary: Uuid,
    /// 1000.00 by March 2030, funded from savings.
    pub trip: Uuid,
}

impl Fixture {
    pub async fn obligations(&self) -> Obligations {
        let rent_category = self
            .engine
            .create_category(
                &self.principal,
                NewCategoryCmd::new(self.budget_id, self.group_id, "Rent", CategoryBehavior::SetAside),
            )
            .await
            .unwrap();
        let rent = self
            .engine
            .create_recurring_bill(
                &self.principal,
                NewRecurringBillCmd::new(
                    self.budget_id,
                    rent_category,
                    "Rent",
                    150_000,
                    BillFrequency::Monthly,
                    10,
                )
                .account(self.checking)
                .auto_debit(true),
            )
            .await
            .unwrap();
        let cleaning_category = self
            .engine
            .create_category(
                &self.principal,
                NewCategoryCmd::new(
                    self.budget_id,
                    self.group_id,
                    "Cleaning",
                    CategoryBehavior::RefillUp,
                ),
            )
            .await
            .unwrap();
        let cleaner = self
            .engine
            .create_recurring_bill(
                &self.principal,
                NewRecurringBillCmd::new(
                    self.budget_id,
                    cleaning_category,
                    "Cleaner",
                    2_000,
                    BillFrequency::Weekly,
                    5,
                ),
            )
            .await
            .unwrap();
        let member_id = self
            .engine
            .member_id(&self.principal, self.budget_id)
            .await
            .unwrap();
        let salary = self
            .engine
            .create_income_source(
                &self.principal,
                NewIncomeSourceCmd::new(
                    self.budget_id,
                    member_id,
                    self.checking,
                    "Salary",
                    500_000,
                    IncomeFrequency::Monthly,
                )
                .day_of_month(5),
            )
            .await
            .unwrap();
        let trip = self
            .engine
            .create_goal(
                &self.principal,
                NewGoalCmd::new(self.budget_id, "Trip", 100_000)
                    .target_date(date(2030, 3, 20))
                    .account(self.savings),
            )
            .await
            .unwrap();
        Obligations {
            rent_category,
            rent,
            cleaning_category,
            cleaner,
            salary,
            trip,
        }
    }

    /// `(balance, cleared_balance)` of an account.
    pub async fn balances(&self, account_id: Uuid) -> (i64, i64) {
        let account = self
            .engine
            .account(&self.principal, self.budget_id, account_id)
            .await
            .unwrap();
        (account.balance, account.cleared_balance)
    }

    pub async fn expense(
        &self,
        account_id: Uuid,
        category_id: Uuid,
        amount: i64,
        on: NaiveDate,
        status: TransactionStatus,
    ) -> Transaction {
        self.engine
            .create_transaction(
                &self.principal,
                CreateTransactionCmd::new(
                    self.budget_id,
                    account_id,
                    TransactionKind::Expense,
                    amount,
                    on,
                    "expense",
                )
                .category(category_id)
                .status(status),
            )
            .await
            .unwrap()
    }

    pub async fn income(&self, account_id: Uuid, amount: i64, on: NaiveDate) -> Transaction {
        self.engine
            .create_transaction(
                &self.principal,
                CreateTransactionCmd::new(
                    self.budget_id,
                    account_id,
                    TransactionKind::Income,
                    amount,
                    on,
                    "income",
                ),
            )
            .await
            .unwrap()
    }

    /// Asserts that stored balances match a full recomputation.
    pub async fn assert_balances_consistent(&self) {
        let repaired = self
            .engine
            .recompute_account_balances(&self.principal, self.budget_id)
            .await
            .unwrap();
        assert!(repaired.is_empty(), "balances drifted: {repaired:?}");
    }

    /// Adds a member with the given role and returns their principal.
    pub async fn member(&self, user_id: &str, role: engine::MemberRole) -> Principal {
        self.engine
            .add_member(&self.principal, self.budget_id, user_id, user_id, role)
            .await
            .unwrap();
        Principal::new(user_id, [self.budget_id])
    }
}
