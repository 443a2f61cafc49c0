//! The module contains `Income` and its table.
//!
//! An income converted to CUP on arrival keeps its received amount and
//! currency; the conversion outcome is stored alongside.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money,
    util::{model_currency, parse_decimal, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Income {
    pub id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub account_id: Uuid,
    pub user_id: String,
    pub converted_to_cup: bool,
    pub exchange_rate: Option<Decimal>,
    pub converted_amount: Option<Money>,
    pub converted_currency: Option<Currency>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub account_id: String,
    pub user_id: String,
    pub converted_to_cup: bool,
    pub exchange_rate: Option<String>,
    pub converted_amount: Option<i64>,
    pub converted_currency: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Income> for ActiveModel {
    fn from(income: &Income) -> Self {
        Self {
            id: ActiveValue::Set(income.id.to_string()),
            amount: ActiveValue::Set(income.amount.minor()),
            currency: ActiveValue::Set(income.currency.code().to_string()),
            description: ActiveValue::Set(income.description.clone()),
            account_id: ActiveValue::Set(income.account_id.to_string()),
            user_id: ActiveValue::Set(income.user_id.clone()),
            converted_to_cup: ActiveValue::Set(income.converted_to_cup),
            exchange_rate: ActiveValue::Set(income.exchange_rate.map(|rate| rate.to_string())),
            converted_amount: ActiveValue::Set(income.converted_amount.map(Money::minor)),
            converted_currency: ActiveValue::Set(
                income.converted_currency.map(|c| c.code().to_string()),
            ),
            created_at: ActiveValue::Set(income.created_at),
            updated_at: ActiveValue::Set(income.updated_at),
        }
    }
}

impl TryFrom<Model> for Income {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "income")?,
            amount: Money::new(model.amount),
            currency: model_currency(&model.currency)?,
            description: model.description,
            account_id: parse_uuid(&model.account_id, "account")?,
            user_id: model.user_id,
            converted_to_cup: model.converted_to_cup,
            exchange_rate: model
                .exchange_rate
                .as_deref()
                .map(|rate| parse_decimal(rate, "exchange_rate"))
                .transpose()?,
            converted_amount: model.converted_amount.map(Money::new),
            converted_currency: model
                .converted_currency
                .as_deref()
                .map(model_currency)
                .transpose()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
