//! Ledger audit rows.
//!
//! A `Transaction` records one side of a money-moving event. `amount` is the
//! figure shown to users (e.g. a debt is recorded as a negative amount),
//! while `delta` is the signed effect that was applied to
//! `account_id`/`currency`. Replaying `-delta` undoes the row exactly.
//!
//! Rows are never deleted; reversing an event marks its rows `voided_at`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Expense,
    Income,
    Loan,
    Debt,
    Conversion,
    LoanPayment,
    DebtPayment,
    Transfer,
}

impl TransactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "EXPENSE",
            Self::Income => "INCOME",
            Self::Loan => "LOAN",
            Self::Debt => "DEBT",
            Self::Conversion => "CONVERSION",
            Self::LoanPayment => "LOAN_PAYMENT",
            Self::DebtPayment => "DEBT_PAYMENT",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EXPENSE" => Ok(Self::Expense),
            "INCOME" => Ok(Self::Income),
            "LOAN" => Ok(Self::Loan),
            "DEBT" => Ok(Self::Debt),
            "CONVERSION" => Ok(Self::Conversion),
            "LOAN_PAYMENT" => Ok(Self::LoanPayment),
            "DEBT_PAYMENT" => Ok(Self::DebtPayment),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: Money,
    pub delta: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub reference_id: Option<Uuid>,
    pub user_id: String,
    pub account_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        kind: TransactionKind,
        amount: Money,
        delta: Money,
        currency: Currency,
        description: Option<String>,
        reference_id: Option<Uuid>,
        user_id: &str,
        account_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            delta,
            currency,
            description,
            reference_id,
            user_id: user_id.to_string(),
            account_id,
            created_at,
            voided_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount: i64,
    pub delta: i64,
    pub currency: String,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub user_id: String,
    pub account_id: String,
    pub created_at: DateTimeUtc,
    pub voided_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount.minor()),
            delta: ActiveValue::Set(tx.delta.minor()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
            description: ActiveValue::Set(tx.description.clone()),
            reference_id: ActiveValue::Set(tx.reference_id.map(|id| id.to_string())),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            created_at: ActiveValue::Set(tx.created_at),
            voided_at: ActiveValue::Set(tx.voided_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: Money::new(model.amount),
            delta: Money::new(model.delta),
            currency: model_currency(&model.currency)?,
            description: model.description,
            reference_id: model
                .reference_id
                .as_deref()
                .map(|id| parse_uuid(id, "reference"))
                .transpose()?,
            user_id: model.user_id,
            account_id: parse_uuid(&model.account_id, "account")?,
            created_at: model.created_at,
            voided_at: model.voided_at,
        })
    }
}
