//! Debts owed to an external creditor.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Debt {
    pub id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub creditor: String,
    pub description: Option<String>,
    pub account_id: Uuid,
    pub user_id: String,
    pub paid_amount: Money,
    pub is_paid: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Debt {
    #[must_use]
    pub fn outstanding(&self) -> Money {
        (self.amount - self.paid_amount).max(Money::ZERO)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub creditor: String,
    pub description: Option<String>,
    pub account_id: String,
    pub user_id: String,
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

impl From<&Debt> for ActiveModel {
    fn from(debt: &Debt) -> Self {
        Self {
            id: ActiveValue::Set(debt.id.to_string()),
            amount: ActiveValue::Set(debt.amount.minor()),
            currency: ActiveValue::Set(debt.currency.code().to_string()),
            creditor: ActiveValue::Set(debt.creditor.clone()),
            description: ActiveValue::Set(debt.description.clone()),
            account_id: ActiveValue::Set(debt.account_id.to_string()),
            user_id: ActiveValue::Set(debt.user_id.clone()),
            paid_amount: ActiveValue::Set(debt.paid_amount.minor()),
            is_paid: ActiveValue::Set(debt.is_paid),
            due_date: ActiveValue::Set(debt.due_date),
            paid_date: ActiveValue::Set(debt.paid_date),
            created_at: ActiveValue::Set(debt.created_at),
            updated_at: ActiveValue::Set(debt.updated_at),
        }
    }
}

impl TryFrom<Model> for Debt {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "debt")?,
            amount: Money::new(model.amount),
            currency: model_currency(&model.currency)?,
            creditor: model.creditor,
            description: model.description,
            account_id: parse_uuid(&model.account_id, "account")?,
            user_id: model.user_id,
            paid_amount: Money::new(model.paid_amount),
            is_paid: model.is_paid,
            due_date: model.due_date,
            paid_date: model.paid_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
