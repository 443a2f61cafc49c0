//! Read-only reporting over the ledger.
//!
//! Aggregation runs on the plain connection, outside any transaction: a
//! slightly stale view is acceptable for reports.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};
use serde::Serialize;

use crate::{
    Account, Balances, Currency, EngineError, Expense, ExpenseType, Income, PaymentMethod,
    ResultEngine, accounts, categories, expenses, incomes,
};

use super::Engine;

const UNCATEGORIZED: &str = "Uncategorized";

/// Which records the statistics cover.
#[derive(Clone, Debug, Default)]
pub struct StatisticsFilter {
    /// Inclusive lower bound on `created_at`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub end: Option<DateTime<Utc>>,
    /// Whose records to aggregate; defaults to the caller.
    pub user_id: Option<String>,
}

impl StatisticsFilter {
    #[must_use]
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub expenses: Balances,
    pub incomes: Balances,
    /// `incomes - expenses`, per bucket.
    pub balance: Balances,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ByPaymentMethod {
    pub cash: Balances,
    pub transfer: Balances,
}

/// Per-bucket sums; only realized expenses count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub totals: Totals,
    pub by_payment_method: ByPaymentMethod,
    /// Keyed by category name.
    pub by_category: BTreeMap<String, Balances>,
    /// Keyed by `YYYY-MM`.
    pub monthly_expenses: BTreeMap<String, Balances>,
    /// Keyed by `YYYY-MM`.
    pub monthly_incomes: BTreeMap<String, Balances>,
    /// Current balances summed over every account the user belongs to.
    pub available: Balances,
}

impl Statistics {
    fn add_expense(&mut self, expense: &Expense, category: &str) {
        let (currency, amount) = (expense.currency, expense.amount);
        self.totals.expenses.add(currency, amount);
        self.totals.balance.add(currency, -amount);
        match expense.payment_method {
            PaymentMethod::Cash => self.by_payment_method.cash.add(currency, amount),
            PaymentMethod::Transfer => self.by_payment_method.transfer.add(currency, amount),
        }
        self.by_category
            .entry(category.to_string())
            .or_default()
            .add(currency, amount);
        self.monthly_expenses
            .entry(month_key(expense.created_at))
            .or_default()
            .add(currency, amount);
    }

    /// Converted incomes count with what actually landed in the account.
    fn add_income(&mut self, income: &Income) {
        let (currency, amount) = match (income.converted_currency, income.converted_amount) {
            (Some(currency), Some(amount)) => (currency, amount),
            _ => (income.currency, income.amount),
        };
        self.totals.incomes.add(currency, amount);
        self.totals.balance.add(currency, amount);
        self.monthly_incomes
            .entry(month_key(income.created_at))
            .or_default()
            .add(currency, amount);
    }

    fn add_account(&mut self, account: &Account) {
        for currency in Currency::ALL {
            self.available.add(currency, account.balance(currency));
        }
    }
}

fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

fn within<E: EntityTrait, C: ColumnTrait>(
    mut query: Select<E>,
    column: C,
    filter: &StatisticsFilter,
) -> Select<E> {
    if let Some(start) = filter.start {
        query = query.filter(column.gte(start));
    }
    if let Some(end) = filter.end {
        query = query.filter(column.lte(end));
    }
    query
}

impl Engine {
    /// Aggregates expenses, incomes and balances of one user.
    ///
    /// The caller may look at another user's statistics only when both
    /// belong to a common account.
    pub async fn statistics(
        &self,
        user_id: &str,
        filter: StatisticsFilter,
    ) -> ResultEngine<Statistics> {
        let subject = filter.user_id.clone().unwrap_or_else(|| user_id.to_string());
        self.require_user(&self.database, &subject).await?;
        let account_ids = self.account_ids_of(&self.database, &subject).await?;
        if subject != user_id {
            let caller_accounts = self.account_ids_of(&self.database, user_id).await?;
            if !account_ids.iter().any(|id| caller_accounts.contains(id)) {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }
        }

        let expense_rows = within(
            expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(subject.clone()))
                .filter(expenses::Column::ExpenseType.eq(ExpenseType::Realized.as_str())),
            expenses::Column::CreatedAt,
            &filter,
        )
        .all(&self.database)
        .await?;
        let income_rows = within(
            incomes::Entity::find().filter(incomes::Column::UserId.eq(subject.clone())),
            incomes::Column::CreatedAt,
            &filter,
        )
        .all(&self.database)
        .await?;
        let account_rows = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(&self.database)
            .await?;

        let category_ids: Vec<String> = expense_rows.iter().map(|e| e.category_id.clone()).collect();
        let category_names: HashMap<String, String> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let mut stats = Statistics::default();
        for row in expense_rows {
            let category = category_names
                .get(&row.category_id)
                .map_or(UNCATEGORIZED, String::as_str)
                .to_string();
            stats.add_expense(&Expense::try_from(row)?, &category);
        }
        for row in income_rows {
            stats.add_income(&Income::try_from(row)?);
        }
        for row in account_rows {
            stats.add_account(&Account::try_from(row)?);
        }

        tracing::debug!(user_id = %subject, "statistics computed");
        Ok(stats)
    }
}
