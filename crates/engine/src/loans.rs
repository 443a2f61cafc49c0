//! Loans between two household accounts.
//!
//! `paid_amount` only grows; `is_paid` flips once `paid_amount >= amount` and
//! never goes back.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Loan {
    pub id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub giver_id: String,
    pub receiver_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub paid_amount: Money,
    pub is_paid: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Amount still owed, never negative.
    #[must_use]
    pub fn outstanding(&self) -> Money {
        (self.amount - self.paid_amount).max(Money::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub giver_id: String,
    pub receiver_id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub paid_amount: i64,
    pub is_paid: bool,
    pub due_date: Option<DateTimeUtc>,
    pub paid_date: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Loan> for ActiveModel {
    fn from(loan: &Loan) -> Self {
        Self {
            id: ActiveValue::Set(loan.id.to_string()),
            amount: ActiveValue::Set(loan.amount.minor()),
            currency: ActiveValue::Set(loan.currency.code().to_string()),
            description: ActiveValue::Set(loan.description.clone()),
            giver_id: ActiveValue::Set(loan.giver_id.clone()),
            receiver_id: ActiveValue::Set(loan.receiver_id.clone()),
            from_account_id: ActiveValue::Set(loan.from_account_id.to_string()),
            to_account_id: ActiveValue::Set(loan.to_account_id.to_string()),
            paid_amount: ActiveValue::Set(loan.paid_amount.minor()),
            is_paid: ActiveValue::Set(loan.is_paid),
            due_date: ActiveValue::Set(loan.due_date),
            paid_date: ActiveValue::Set(loan.paid_date),
            created_at: ActiveValue::Set(loan.created_at),
            updated_at: ActiveValue::Set(loan.updated_at),
        }
    }
}

impl TryFrom<Model> for Loan {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "loan")?,
            amount: Money::new(model.amount),
            currency: model_currency(&model.currency)?,
            description: model.description,
            giver_id: model.giver_id,
            receiver_id: model.receiver_id,
            from_account_id: parse_uuid(&model.from_account_id, "account")?,
            to_account_id: parse_uuid(&model.to_account_id, "account")?,
            paid_amount: Money::new(model.paid_amount),
            is_paid: model.is_paid,
            due_date: model.due_date,
            paid_date: model.paid_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
