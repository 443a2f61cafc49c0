//! Same-bucket moves between two accounts.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Transfer {
    pub id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub description: Option<String>,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub description: Option<String>,
    pub from_account_id: String,
    pub to_account_id: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfer> for ActiveModel {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            amount: ActiveValue::Set(transfer.amount.minor()),
            currency: ActiveValue::Set(transfer.currency.code().to_string()),
            description: ActiveValue::Set(transfer.description.clone()),
            from_account_id: ActiveValue::Set(transfer.from_account_id.to_string()),
            to_account_id: ActiveValue::Set(transfer.to_account_id.to_string()),
            user_id: ActiveValue::Set(transfer.user_id.clone()),
            created_at: ActiveValue::Set(transfer.created_at),
        }
    }
}

impl TryFrom<Model> for Transfer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfer")?,
            amount: Money::new(model.amount),
            currency: model_currency(&model.currency)?,
            description: model.description,
            from_account_id: parse_uuid(&model.from_account_id, "account")?,
            to_account_id: parse_uuid(&model.to_account_id, "account")?,
            user_id: model.user_id,
            created_at: model.created_at,
        })
    }
}
