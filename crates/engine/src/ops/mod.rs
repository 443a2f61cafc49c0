use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::ResultEngine;

mod access;
mod accounts;
mod audit;
mod conversions;
mod debts;
mod expenses;
mod incomes;
mod ledger;
mod loans;
mod shared;
mod statistics;
mod sweep;
mod transfers;

pub use conversions::ConversionReceipt;
pub use incomes::IncomeReceipt;
pub use statistics::{Statistics, StatisticsFilter};
pub use sweep::LoanRepayment;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The transaction is dropped (and therefore rolled back) when the block
/// returns early through `?`.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The ledger engine.
///
/// Cheap to clone: clones share the underlying connection pool, so concurrent
/// callers can each hold their own handle.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
    /// Account debited by the income CUP-conversion chain.
    principal_account_id: Option<Uuid>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    #[must_use]
    pub fn principal_account_id(&self) -> Option<Uuid> {
        self.principal_account_id
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    principal_account_id: Option<Uuid>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Account that funds USD incomes converted to CUP in shared accounts.
    pub fn principal_account(mut self, account_id: Uuid) -> EngineBuilder {
        self.principal_account_id = Some(account_id);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            principal_account_id: self.principal_account_id,
        })
    }
}
