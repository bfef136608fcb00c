//! Initial schema.
//!
//! - `budgets` and `members`: household containers and who can access them
//! - `accounts`: financial accounts with denormalized balances
//! - `category_groups`, `categories`: envelopes
//! - `monthly_allocations`: per-month envelope amounts and carry-over
//! - `recurring_bills`, `income_sources`, `monthly_income_allocations`
//! - `goals`, `goal_contributions`
//! - `transactions`: the ledger
//! - `monthly_budget_status`: month lifecycle

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Name,
    Currency,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Members {
    Table,
    Id,
    BudgetId,
    UserId,
    Name,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    BudgetId,
    Name,
    NameNorm,
    Kind,
    Balance,
    ClearedBalance,
    CreditLimit,
    ClosingDay,
    DueDay,
    Archived,
    CreatedAt,
}

#[derive(Iden)]
enum CategoryGroups {
    Table,
    Id,
    BudgetId,
    Name,
    SortOrder,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    BudgetId,
    GroupId,
    Name,
    NameNorm,
    Behavior,
    MemberId,
    Archived,
    CreatedAt,
}

#[derive(Iden)]
enum MonthlyAllocations {
    Table,
    Id,
    BudgetId,
    CategoryId,
    Year,
    Month,
    Allocated,
    CarriedOver,
    UpdatedAt,
}

#[derive(Iden)]
enum RecurringBills {
    Table,
    Id,
    BudgetId,
    CategoryId,
    AccountId,
    Name,
    Amount,
    Frequency,
    DueDay,
    DueMonth,
    IsAutoDebit,
    IsVariable,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum IncomeSources {
    Table,
    Id,
    BudgetId,
    MemberId,
    AccountId,
    Name,
    Amount,
    Frequency,
    DayOfMonth,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum MonthlyIncomeAllocations {
    Table,
    Id,
    BudgetId,
    IncomeSourceId,
    Year,
    Month,
    Amount,
    UpdatedAt,
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    BudgetId,
    Name,
    TargetAmount,
    CurrentAmount,
    TargetDate,
    AccountId,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    BudgetId,
    AccountId,
    DestinationAccountId,
    Kind,
    Status,
    Amount,
    Date,
    Description,
    Notes,
    CategoryId,
    IncomeSourceId,
    RecurringBillId,
    GoalId,
    IsInstallment,
    InstallmentNumber,
    TotalInstallments,
    ParentTransactionId,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MonthlyBudgetStatus {
    Table,
    Id,
    BudgetId,
    Year,
    Month,
    Status,
    StartedAt,
    ClosedAt,
}

#[derive(Iden)]
enum GoalContributions {
    Table,
    Id,
    BudgetId,
    GoalId,
    TransactionId,
    Amount,
    Date,
    Year,
    Month,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .col(ColumnDef::new(Budgets::Currency).string().not_null().default("BRL"))
                    .col(ColumnDef::new(Budgets::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Members::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Members::BudgetId).string().not_null())
                    .col(ColumnDef::new(Members::UserId).string().not_null())
                    .col(ColumnDef::new(Members::Name).string().not_null())
                    .col(ColumnDef::new(Members::Role).string().not_null())
                    .col(ColumnDef::new(Members::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-members-budget_id")
                            .from(Members::Table, Members::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-budget_id-user_id-unique")
                    .table(Members::Table)
                    .col(Members::BudgetId)
                    .col(Members::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-members-user_id")
                    .table(Members::Table)
                    .col(Members::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::BudgetId).string().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::NameNorm).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(ColumnDef::new(Accounts::Balance).big_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Accounts::ClearedBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::CreditLimit).big_integer())
                    .col(ColumnDef::new(Accounts::ClosingDay).integer())
                    .col(ColumnDef::new(Accounts::DueDay).integer())
                    .col(ColumnDef::new(Accounts::Archived).boolean().not_null().default(false))
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-budget_id")
                            .from(Accounts::Table, Accounts::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-budget_id-name_norm-unique")
                    .table(Accounts::Table)
                    .col(Accounts::BudgetId)
                    .col(Accounts::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. CategoryGroups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CategoryGroups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CategoryGroups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(CategoryGroups::BudgetId).string().not_null())
                    .col(ColumnDef::new(CategoryGroups::Name).string().not_null())
                    .col(ColumnDef::new(CategoryGroups::SortOrder).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-category_groups-budget_id")
                            .from(CategoryGroups::Table, CategoryGroups::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Categories::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Categories::BudgetId).string().not_null())
                    .col(ColumnDef::new(Categories::GroupId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Behavior).string().not_null())
                    .col(ColumnDef::new(Categories::MemberId).string())
                    .col(ColumnDef::new(Categories::Archived).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-budget_id")
                            .from(Categories::Table, Categories::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-group_id")
                            .from(Categories::Table, Categories::GroupId)
                            .to(CategoryGroups::Table, CategoryGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-budget_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::BudgetId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. MonthlyAllocations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyAllocations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MonthlyAllocations::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(MonthlyAllocations::BudgetId).string().not_null())
                    .col(ColumnDef::new(MonthlyAllocations::CategoryId).string().not_null())
                    .col(ColumnDef::new(MonthlyAllocations::Year).integer().not_null())
                    .col(ColumnDef::new(MonthlyAllocations::Month).integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyAllocations::Allocated)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MonthlyAllocations::CarriedOver)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MonthlyAllocations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_allocations-budget_id")
                            .from(MonthlyAllocations::Table, MonthlyAllocations::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-monthly_allocations-budget-category-month-unique")
                    .table(MonthlyAllocations::Table)
                    .col(MonthlyAllocations::BudgetId)
                    .col(MonthlyAllocations::CategoryId)
                    .col(MonthlyAllocations::Year)
                    .col(MonthlyAllocations::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. RecurringBills
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(RecurringBills::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RecurringBills::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(RecurringBills::BudgetId).string().not_null())
                    .col(ColumnDef::new(RecurringBills::CategoryId).string().not_null())
                    .col(ColumnDef::new(RecurringBills::AccountId).string())
                    .col(ColumnDef::new(RecurringBills::Name).string().not_null())
                    .col(ColumnDef::new(RecurringBills::Amount).big_integer().not_null())
                    .col(ColumnDef::new(RecurringBills::Frequency).string().not_null())
                    .col(ColumnDef::new(RecurringBills::DueDay).integer().not_null())
                    .col(ColumnDef::new(RecurringBills::DueMonth).integer())
                    .col(
                        ColumnDef::new(RecurringBills::IsAutoDebit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RecurringBills::IsVariable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(RecurringBills::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(RecurringBills::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_bills-budget_id")
                            .from(RecurringBills::Table, RecurringBills::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recurring_bills-category_id")
                            .from(RecurringBills::Table, RecurringBills::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recurring_bills-category_id")
                    .table(RecurringBills::Table)
                    .col(RecurringBills::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. IncomeSources
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(IncomeSources::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(IncomeSources::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(IncomeSources::BudgetId).string().not_null())
                    .col(ColumnDef::new(IncomeSources::MemberId).string().not_null())
                    .col(ColumnDef::new(IncomeSources::AccountId).string().not_null())
                    .col(ColumnDef::new(IncomeSources::Name).string().not_null())
                    .col(ColumnDef::new(IncomeSources::Amount).big_integer().not_null())
                    .col(ColumnDef::new(IncomeSources::Frequency).string().not_null())
                    .col(ColumnDef::new(IncomeSources::DayOfMonth).integer())
                    .col(ColumnDef::new(IncomeSources::Active).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(IncomeSources::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_sources-budget_id")
                            .from(IncomeSources::Table, IncomeSources::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-income_sources-member_id")
                            .from(IncomeSources::Table, IncomeSources::MemberId)
                            .to(Members::Table, Members::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. MonthlyIncomeAllocations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyIncomeAllocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MonthlyIncomeAllocations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MonthlyIncomeAllocations::BudgetId).string().not_null())
                    .col(
                        ColumnDef::new(MonthlyIncomeAllocations::IncomeSourceId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MonthlyIncomeAllocations::Year).integer().not_null())
                    .col(ColumnDef::new(MonthlyIncomeAllocations::Month).integer().not_null())
                    .col(ColumnDef::new(MonthlyIncomeAllocations::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyIncomeAllocations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_income_allocations-budget_id")
                            .from(
                                MonthlyIncomeAllocations::Table,
                                MonthlyIncomeAllocations::BudgetId,
                            )
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_income_allocations-income_source_id")
                            .from(
                                MonthlyIncomeAllocations::Table,
                                MonthlyIncomeAllocations::IncomeSourceId,
                            )
                            .to(IncomeSources::Table, IncomeSources::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-monthly_income_allocations-source-month-unique")
                    .table(MonthlyIncomeAllocations::Table)
                    .col(MonthlyIncomeAllocations::IncomeSourceId)
                    .col(MonthlyIncomeAllocations::Year)
                    .col(MonthlyIncomeAllocations::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Goals::BudgetId).string().not_null())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::TargetAmount).big_integer().not_null())
                    .col(ColumnDef::new(Goals::CurrentAmount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Goals::TargetDate).date())
                    .col(ColumnDef::new(Goals::AccountId).string())
                    .col(ColumnDef::new(Goals::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Goals::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goals-budget_id")
                            .from(Goals::Table, Goals::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::BudgetId).string().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::DestinationAccountId).string())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Date).date().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::CategoryId).string())
                    .col(ColumnDef::new(Transactions::IncomeSourceId).string())
                    .col(ColumnDef::new(Transactions::RecurringBillId).string())
                    .col(ColumnDef::new(Transactions::GoalId).string())
                    .col(
                        ColumnDef::new(Transactions::IsInstallment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Transactions::InstallmentNumber).integer())
                    .col(ColumnDef::new(Transactions::TotalInstallments).integer())
                    .col(ColumnDef::new(Transactions::ParentTransactionId).string())
                    .col(ColumnDef::new(Transactions::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-budget_id")
                            .from(Transactions::Table, Transactions::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-budget_id-date")
                    .table(Transactions::Table)
                    .col(Transactions::BudgetId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-parent_transaction_id")
                    .table(Transactions::Table)
                    .col(Transactions::ParentTransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-category_id-date")
                    .table(Transactions::Table)
                    .col(Transactions::CategoryId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 12. MonthlyBudgetStatus
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyBudgetStatus::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MonthlyBudgetStatus::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(MonthlyBudgetStatus::BudgetId).string().not_null())
                    .col(ColumnDef::new(MonthlyBudgetStatus::Year).integer().not_null())
                    .col(ColumnDef::new(MonthlyBudgetStatus::Month).integer().not_null())
                    .col(ColumnDef::new(MonthlyBudgetStatus::Status).string().not_null())
                    .col(ColumnDef::new(MonthlyBudgetStatus::StartedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(MonthlyBudgetStatus::ClosedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-monthly_budget_status-budget_id")
                            .from(MonthlyBudgetStatus::Table, MonthlyBudgetStatus::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-monthly_budget_status-budget-month-unique")
                    .table(MonthlyBudgetStatus::Table)
                    .col(MonthlyBudgetStatus::BudgetId)
                    .col(MonthlyBudgetStatus::Year)
                    .col(MonthlyBudgetStatus::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 13. GoalContributions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GoalContributions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GoalContributions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(GoalContributions::BudgetId).string().not_null())
                    .col(ColumnDef::new(GoalContributions::GoalId).string().not_null())
                    .col(ColumnDef::new(GoalContributions::TransactionId).string().not_null())
                    .col(ColumnDef::new(GoalContributions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(GoalContributions::Date).date().not_null())
                    .col(ColumnDef::new(GoalContributions::Year).integer().not_null())
                    .col(ColumnDef::new(GoalContributions::Month).integer().not_null())
                    .col(
                        ColumnDef::new(GoalContributions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_contributions-goal_id")
                            .from(GoalContributions::Table, GoalContributions::GoalId)
                            .to(Goals::Table, Goals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goal_contributions-transaction_id")
                            .from(GoalContributions::Table, GoalContributions::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_contributions-transaction_id-unique")
                    .table(GoalContributions::Table)
                    .col(GoalContributions::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goal_contributions-goal-month")
                    .table(GoalContributions::Table)
                    .col(GoalContributions::GoalId)
                    .col(GoalContributions::Year)
                    .col(GoalContributions::Month)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(GoalContributions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyBudgetStatus::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyIncomeAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IncomeSources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringBills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MonthlyAllocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CategoryGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        Ok(())
    }
}
