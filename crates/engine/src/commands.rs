//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists. Every command carries the
//! authenticated caller as `user_id`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{Currency, ExpenseType, Money, PaymentMethod};

/// Create an expense.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub expense_type: ExpenseType,
    pub is_shared: bool,
    pub description: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
    /// Backdates the expense; defaults to now.
    pub created_at: Option<DateTime<Utc>>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        category_id: Uuid,
        amount: Money,
        currency: Currency,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            category_id,
            amount,
            currency,
            payment_method: PaymentMethod::Cash,
            expense_type: ExpenseType::Realized,
            is_shared: false,
            description: None,
            planned_date: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = payment_method;
        self
    }

    #[must_use]
    pub fn planned(mut self, planned_date: DateTime<Utc>) -> Self {
        self.expense_type = ExpenseType::Planned;
        self.planned_date = Some(planned_date);
        self
    }

    #[must_use]
    pub fn shared(mut self, is_shared: bool) -> Self {
        self.is_shared = is_shared;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Partially update an expense. Fields left as `None` keep their value.
#[derive(Clone, Debug, Default)]
pub struct UpdateExpenseCmd {
    pub user_id: String,
    pub expense_id: Uuid,
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    pub payment_method: Option<PaymentMethod>,
    pub expense_type: Option<ExpenseType>,
    pub is_shared: Option<bool>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, expense_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            expense_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: PaymentMethod) -> Self {
        self.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub fn expense_type(mut self, expense_type: ExpenseType) -> Self {
        self.expense_type = Some(expense_type);
        self
    }

    #[must_use]
    pub fn shared(mut self, is_shared: bool) -> Self {
        self.is_shared = Some(is_shared);
        self
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Create an income.
#[derive(Clone, Debug)]
pub struct IncomeCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub convert_to_cup: bool,
    pub exchange_rate: Option<Decimal>,
    /// CUP bucket credited by the conversion; defaults from the USD bucket.
    pub target_currency: Option<Currency>,
}

impl IncomeCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        amount: Money,
        currency: Currency,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            amount,
            currency,
            description: None,
            created_at: None,
            convert_to_cup: false,
            exchange_rate: None,
            target_currency: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Request conversion to CUP on arrival in a shared account.
    #[must_use]
    pub fn convert_to_cup(mut self, exchange_rate: Decimal) -> Self {
        self.convert_to_cup = true;
        self.exchange_rate = Some(exchange_rate);
        self
    }

    #[must_use]
    pub fn target_currency(mut self, currency: Currency) -> Self {
        self.target_currency = Some(currency);
        self
    }
}

/// Partially update an income.
#[derive(Clone, Debug, Default)]
pub struct UpdateIncomeCmd {
    pub user_id: String,
    pub income_id: Uuid,
    pub amount: Option<Money>,
    pub currency: Option<Currency>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl UpdateIncomeCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, income_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            income_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Convert between buckets, optionally into another account.
#[derive(Clone, Debug)]
pub struct ConversionCmd {
    pub user_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Option<Uuid>,
    pub from_amount: Money,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub exchange_rate: Decimal,
}

impl ConversionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        from_account_id: Uuid,
        from_amount: Money,
        from_currency: Currency,
        to_currency: Currency,
        exchange_rate: Decimal,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            from_account_id,
            to_account_id: None,
            from_amount,
            from_currency,
            to_currency,
            exchange_rate,
        }
    }

    #[must_use]
    pub fn to_account(mut self, account_id: Uuid) -> Self {
        self.to_account_id = Some(account_id);
        self
    }
}

/// Lend money from one of the caller's accounts to another user.
#[derive(Clone, Debug)]
pub struct LoanCmd {
    pub user_id: String,
    pub receiver_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl LoanCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        receiver_id: impl Into<String>,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount: Money,
        currency: Currency,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            receiver_id: receiver_id.into(),
            from_account_id,
            to_account_id,
            amount,
            currency,
            description: None,
            due_date: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Record a (partial) loan payment.
#[derive(Clone, Debug)]
pub struct PayLoanCmd {
    pub user_id: String,
    pub loan_id: Uuid,
    pub payment_amount: Money,
    /// Defaults to the loan currency.
    pub payment_currency: Option<Currency>,
    /// Required when `payment_currency` differs from the loan currency.
    pub exchange_rate: Option<Decimal>,
}

impl PayLoanCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, loan_id: Uuid, payment_amount: Money) -> Self {
        Self {
            user_id: user_id.into(),
            loan_id,
            payment_amount,
            payment_currency: None,
            exchange_rate: None,
        }
    }

    #[must_use]
    pub fn in_currency(mut self, currency: Currency, exchange_rate: Decimal) -> Self {
        self.payment_currency = Some(currency);
        self.exchange_rate = Some(exchange_rate);
        self
    }
}

/// Record a debt towards an external creditor.
#[derive(Clone, Debug)]
pub struct DebtCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub creditor: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl DebtCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        amount: Money,
        currency: Currency,
        creditor: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            amount,
            currency,
            creditor: creditor.into(),
            description: None,
            due_date: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

#[derive(Clone, Debug)]
pub struct PayDebtCmd {
    pub user_id: String,
    pub debt_id: Uuid,
    pub payment_amount: Money,
}

impl PayDebtCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, debt_id: Uuid, payment_amount: Money) -> Self {
        Self {
            user_id: user_id.into(),
            debt_id,
            payment_amount,
        }
    }
}

/// Move money between two accounts in the same bucket.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount: Money,
        currency: Currency,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            from_account_id,
            to_account_id,
            amount,
            currency,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create an account owned by `owner_id`, optionally shared with `members`.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub owner_id: String,
    pub name: String,
    pub is_shared: bool,
    pub members: Vec<String>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn personal(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            is_shared: false,
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn shared(owner_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_shared: true,
            ..Self::personal(owner_id, name)
        }
    }

    #[must_use]
    pub fn member(mut self, user_id: impl Into<String>) -> Self {
        self.members.push(user_id.into());
        self
    }
}

/// Update the allocation weights of a user.
#[derive(Clone, Debug, Default)]
pub struct UserIncomesCmd {
    pub income_percentage: Option<Decimal>,
    pub monthly_income_usd: Option<Money>,
    pub monthly_income_usdt: Option<Money>,
    pub monthly_income_cup: Option<Money>,
}

impl UserIncomesCmd {
    #[must_use]
    pub fn income_percentage(mut self, percentage: Decimal) -> Self {
        self.income_percentage = Some(percentage);
        self
    }

    #[must_use]
    pub fn usd(mut self, amount: Money) -> Self {
        self.monthly_income_usd = Some(amount);
        self
    }

    #[must_use]
    pub fn usdt(mut self, amount: Money) -> Self {
        self.monthly_income_usdt = Some(amount);
        self
    }

    #[must_use]
    pub fn cup(mut self, amount: Money) -> Self {
        self.monthly_income_cup = Some(amount);
        self
    }
}
