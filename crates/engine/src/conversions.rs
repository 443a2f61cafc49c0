//! Immutable record of a currency conversion.

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
pub struct Conversion {
    pub id: Uuid,
    pub from_amount: Money,
    pub to_amount: Money,
    pub from_currency: Currency,
    pub to_currency: Currency,
    pub exchange_rate: Decimal,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "conversions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_amount: i64,
    pub to_amount: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Conversion> for ActiveModel {
    fn from(conversion: &Conversion) -> Self {
        Self {
            id: ActiveValue::Set(conversion.id.to_string()),
            from_amount: ActiveValue::Set(conversion.from_amount.minor()),
            to_amount: ActiveValue::Set(conversion.to_amount.minor()),
            from_currency: ActiveValue::Set(conversion.from_currency.code().to_string()),
            to_currency: ActiveValue::Set(conversion.to_currency.code().to_string()),
            exchange_rate: ActiveValue::Set(conversion.exchange_rate.to_string()),
            from_account_id: ActiveValue::Set(conversion.from_account_id.to_string()),
            to_account_id: ActiveValue::Set(conversion.to_account_id.to_string()),
            user_id: ActiveValue::Set(conversion.user_id.clone()),
            created_at: ActiveValue::Set(conversion.created_at),
        }
    }
}

impl TryFrom<Model> for Conversion {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "conversion")?,
            from_amount: Money::new(model.from_amount),
            to_amount: Money::new(model.to_amount),
            from_currency: model_currency(&model.from_currency)?,
            to_currency: model_currency(&model.to_currency)?,
            exchange_rate: parse_decimal(&model.exchange_rate, "exchange_rate")?,
            from_account_id: parse_uuid(&model.from_account_id, "account")?,
            to_account_id: parse_uuid(&model.to_account_id, "account")?,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}
