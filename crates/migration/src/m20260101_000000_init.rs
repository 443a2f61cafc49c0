//! Initial schema for the household ledger.
//!
//! - `users`: household members and their allocation weights
//! - `accounts`: money containers with one balance column per currency bucket
//! - `account_users`: who may operate on which account
//! - `categories`: expense categories, private to their creator
//! - `expenses`, `incomes`, `conversions`, `loans`, `debts`, `transfers`:
//!   business records
//! - `transactions`: per-account ledger rows produced by the records above
//! - `changes`: audit log of expense/income/loan/debt mutations

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    IncomePercentage,
    MonthlyIncomeUsd,
    MonthlyIncomeUsdt,
    MonthlyIncomeCup,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    IsShared,
    BalanceUsdZelle,
    BalanceUsdEfectivo,
    BalanceUsdt,
    BalanceCupEfectivo,
    BalanceCupTransferencia,
    CreatedAt,
}

#[derive(Iden)]
enum AccountUsers {
    Table,
    AccountId,
    UserId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Amount,
    Currency,
    PaymentMethod,
    ExpenseType,
    IsShared,
    Description,
    PlannedDate,
    AccountId,
    CategoryId,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    Amount,
    Currency,
    Description,
    AccountId,
    UserId,
    ConvertedToCup,
    ExchangeRate,
    ConvertedAmount,
    ConvertedCurrency,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Conversions {
    Table,
    Id,
    FromAmount,
    ToAmount,
    FromCurrency,
    ToCurrency,
    ExchangeRate,
    FromAccountId,
    ToAccountId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Loans {
    Table,
    Id,
    Amount,
    Currency,
    Description,
    GiverId,
    ReceiverId,
    FromAccountId,
    ToAccountId,
    PaidAmount,
    IsPaid,
    DueDate,
    PaidDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Debts {
    Table,
    Id,
    Amount,
    Currency,
    Creditor,
    Description,
    AccountId,
    UserId,
    PaidAmount,
    IsPaid,
    DueDate,
    PaidDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    Amount,
    Currency,
    Description,
    FromAccountId,
    ToAccountId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Kind,
    Amount,
    Delta,
    Currency,
    Description,
    ReferenceId,
    UserId,
    AccountId,
    CreatedAt,
    VoidedAt,
}

#[derive(Iden)]
enum Changes {
    Table,
    Id,
    Action,
    EntityType,
    EntityId,
    OldValue,
    NewValue,
    AuthorId,
    CreatedAt,
}

fn id_col<T: IntoIden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col).string().not_null().primary_key().to_owned()
}

fn money_col<T: IntoIden + 'static>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .default(0)
        .to_owned()
}

fn fk_account(
    name: &str,
    table: impl IntoIden + 'static,
    col: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Accounts::Table, Accounts::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

fn fk_user(
    name: &str,
    table: impl IntoIden + 'static,
    col: impl IntoIden + 'static,
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, col)
        .to(Users::Table, Users::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(&mut id_col(Users::Id))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Users::IncomePercentage)
                            .string()
                            .not_null()
                            .default("0"),
                    )
                    .col(&mut money_col(Users::MonthlyIncomeUsd))
                    .col(&mut money_col(Users::MonthlyIncomeUsdt))
                    .col(&mut money_col(Users::MonthlyIncomeCup))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts and memberships
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Accounts::Id))
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::IsShared)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(&mut money_col(Accounts::BalanceUsdZelle))
                    .col(&mut money_col(Accounts::BalanceUsdEfectivo))
                    .col(&mut money_col(Accounts::BalanceUsdt))
                    .col(&mut money_col(Accounts::BalanceCupEfectivo))
                    .col(&mut money_col(Accounts::BalanceCupTransferencia))
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccountUsers::AccountId).string().not_null())
                    .col(ColumnDef::new(AccountUsers::UserId).string().not_null())
                    .col(ColumnDef::new(AccountUsers::Role).string().not_null())
                    .col(
                        ColumnDef::new(AccountUsers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(AccountUsers::AccountId)
                            .col(AccountUsers::UserId),
                    )
                    .foreign_key(&mut fk_account(
                        "fk-account_users-account_id",
                        AccountUsers::Table,
                        AccountUsers::AccountId,
                    ))
                    .foreign_key(&mut fk_user(
                        "fk-account_users-user_id",
                        AccountUsers::Table,
                        AccountUsers::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-account_users-user_id")
                    .table(AccountUsers::Table)
                    .col(AccountUsers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(&mut id_col(Categories::Id))
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::CreatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_user(
                        "fk-categories-user_id",
                        Categories::Table,
                        Categories::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(&mut id_col(Expenses::Id))
                    .col(ColumnDef::new(Expenses::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Expenses::ExpenseType).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::IsShared)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(ColumnDef::new(Expenses::PlannedDate).timestamp())
                    .col(ColumnDef::new(Expenses::AccountId).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string().not_null())
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::UpdatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_account(
                        "fk-expenses-account_id",
                        Expenses::Table,
                        Expenses::AccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-created_at")
                    .table(Expenses::Table)
                    .col(Expenses::UserId)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Incomes and conversions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(&mut id_col(Incomes::Id))
                    .col(ColumnDef::new(Incomes::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Incomes::Currency).string().not_null())
                    .col(ColumnDef::new(Incomes::Description).string())
                    .col(ColumnDef::new(Incomes::AccountId).string().not_null())
                    .col(ColumnDef::new(Incomes::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Incomes::ConvertedToCup)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Incomes::ExchangeRate).string())
                    .col(ColumnDef::new(Incomes::ConvertedAmount).big_integer())
                    .col(ColumnDef::new(Incomes::ConvertedCurrency).string())
                    .col(ColumnDef::new(Incomes::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Incomes::UpdatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_account(
                        "fk-incomes-account_id",
                        Incomes::Table,
                        Incomes::AccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-incomes-user_id-created_at")
                    .table(Incomes::Table)
                    .col(Incomes::UserId)
                    .col(Incomes::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Conversions::Table)
                    .if_not_exists()
                    .col(&mut id_col(Conversions::Id))
                    .col(ColumnDef::new(Conversions::FromAmount).big_integer().not_null())
                    .col(ColumnDef::new(Conversions::ToAmount).big_integer().not_null())
                    .col(ColumnDef::new(Conversions::FromCurrency).string().not_null())
                    .col(ColumnDef::new(Conversions::ToCurrency).string().not_null())
                    .col(ColumnDef::new(Conversions::ExchangeRate).string().not_null())
                    .col(ColumnDef::new(Conversions::FromAccountId).string().not_null())
                    .col(ColumnDef::new(Conversions::ToAccountId).string().not_null())
                    .col(ColumnDef::new(Conversions::UserId).string().not_null())
                    .col(ColumnDef::new(Conversions::CreatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_account(
                        "fk-conversions-from_account_id",
                        Conversions::Table,
                        Conversions::FromAccountId,
                    ))
                    .foreign_key(&mut fk_account(
                        "fk-conversions-to_account_id",
                        Conversions::Table,
                        Conversions::ToAccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Loans, debts and transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Loans::Table)
                    .if_not_exists()
                    .col(&mut id_col(Loans::Id))
                    .col(ColumnDef::new(Loans::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Loans::Currency).string().not_null())
                    .col(ColumnDef::new(Loans::Description).string())
                    .col(ColumnDef::new(Loans::GiverId).string().not_null())
                    .col(ColumnDef::new(Loans::ReceiverId).string().not_null())
                    .col(ColumnDef::new(Loans::FromAccountId).string().not_null())
                    .col(ColumnDef::new(Loans::ToAccountId).string().not_null())
                    .col(&mut money_col(Loans::PaidAmount))
                    .col(
                        ColumnDef::new(Loans::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Loans::DueDate).timestamp())
                    .col(ColumnDef::new(Loans::PaidDate).timestamp())
                    .col(ColumnDef::new(Loans::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Loans::UpdatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_account(
                        "fk-loans-from_account_id",
                        Loans::Table,
                        Loans::FromAccountId,
                    ))
                    .foreign_key(&mut fk_account(
                        "fk-loans-to_account_id",
                        Loans::Table,
                        Loans::ToAccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-loans-to_account_id-is_paid")
                    .table(Loans::Table)
                    .col(Loans::ToAccountId)
                    .col(Loans::IsPaid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Debts::Table)
                    .if_not_exists()
                    .col(&mut id_col(Debts::Id))
                    .col(ColumnDef::new(Debts::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Debts::Currency).string().not_null())
                    .col(ColumnDef::new(Debts::Creditor).string().not_null())
                    .col(ColumnDef::new(Debts::Description).string())
                    .col(ColumnDef::new(Debts::AccountId).string().not_null())
                    .col(ColumnDef::new(Debts::UserId).string().not_null())
                    .col(&mut money_col(Debts::PaidAmount))
                    .col(
                        ColumnDef::new(Debts::IsPaid)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Debts::DueDate).timestamp())
                    .col(ColumnDef::new(Debts::PaidDate).timestamp())
                    .col(ColumnDef::new(Debts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Debts::UpdatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_account(
                        "fk-debts-account_id",
                        Debts::Table,
                        Debts::AccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(&mut id_col(Transfers::Id))
                    .col(ColumnDef::new(Transfers::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transfers::Currency).string().not_null())
                    .col(ColumnDef::new(Transfers::Description).string())
                    .col(ColumnDef::new(Transfers::FromAccountId).string().not_null())
                    .col(ColumnDef::new(Transfers::ToAccountId).string().not_null())
                    .col(ColumnDef::new(Transfers::UserId).string().not_null())
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .foreign_key(&mut fk_account(
                        "fk-transfers-from_account_id",
                        Transfers::Table,
                        Transfers::FromAccountId,
                    ))
                    .foreign_key(&mut fk_account(
                        "fk-transfers-to_account_id",
                        Transfers::Table,
                        Transfers::ToAccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Ledger rows
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(&mut id_col(Transactions::Id))
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Delta).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Currency).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).string())
                    .col(ColumnDef::new(Transactions::ReferenceId).string())
                    .col(ColumnDef::new(Transactions::UserId).string().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::VoidedAt).timestamp())
                    .foreign_key(&mut fk_account(
                        "fk-transactions-account_id",
                        Transactions::Table,
                        Transactions::AccountId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-reference_id")
                    .table(Transactions::Table)
                    .col(Transactions::ReferenceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-created_at")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Audit log
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Changes::Table)
                    .if_not_exists()
                    .col(&mut id_col(Changes::Id))
                    .col(ColumnDef::new(Changes::Action).string().not_null())
                    .col(ColumnDef::new(Changes::EntityType).string().not_null())
                    .col(ColumnDef::new(Changes::EntityId).string().not_null())
                    .col(ColumnDef::new(Changes::OldValue).text())
                    .col(ColumnDef::new(Changes::NewValue).text())
                    .col(ColumnDef::new(Changes::AuthorId).string().not_null())
                    .col(ColumnDef::new(Changes::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-changes-entity_id")
                    .table(Changes::Table)
                    .col(Changes::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Changes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Debts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Loans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Conversions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
