//! Household multi-currency ledger engine.
//!
//! Accounts keep five independent currency buckets. Every financial event
//! (expense, income, conversion, loan, debt, transfer) is applied by the
//! [`Engine`] inside one database transaction: balance deltas, the
//! [`Transaction`] audit rows and the [`Change`] snapshots either all land or
//! none do.

pub use account_users::MembershipRole;
pub use accounts::{Account, Balances};
pub use allocation::{Allocation, AllocationBasis, MemberWeights, Share, allocate};
pub use categories::Category;
pub use changes::{Change, ChangeAction, EntityType};
pub use commands::{
    ConversionCmd, DebtCmd, ExpenseCmd, IncomeCmd, LoanCmd, NewAccountCmd, PayDebtCmd,
    PayLoanCmd, TransferCmd, UpdateExpenseCmd, UpdateIncomeCmd, UserIncomesCmd,
};
pub use conversions::Conversion;
pub use currency::{Currency, IncomeDenomination};
pub use debts::Debt;
pub use error::{EngineError, ErrorKind};
pub use expenses::{Expense, ExpenseType, PaymentMethod};
pub use incomes::Income;
pub use loans::Loan;
pub use money::Money;
pub use ops::{
    ConversionReceipt, Engine, EngineBuilder, IncomeReceipt, LoanRepayment, Statistics,
    StatisticsFilter,
};
pub use transactions::{Transaction, TransactionKind};
pub use transfers::Transfer;
pub use users::User;

mod account_users;
mod accounts;
mod allocation;
mod categories;
mod changes;
mod commands;
mod conversions;
mod currency;
mod debts;
mod error;
mod expenses;
mod incomes;
mod loans;
mod money;
mod ops;
mod transactions;
mod transfers;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
