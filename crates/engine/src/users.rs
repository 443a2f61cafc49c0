//! Household members.
//!
//! A user carries the weights the allocation calculator needs: the monthly
//! income configured per denomination and the fallback `income_percentage`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::{EngineError, Money, allocation::MemberWeights, util::parse_decimal};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Fallback contribution weight, 0–100.
    pub income_percentage: Decimal,
    pub monthly_income_usd: Money,
    pub monthly_income_usdt: Money,
    pub monthly_income_cup: Money,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn weights(&self) -> MemberWeights {
        MemberWeights {
            user_id: self.id.clone(),
            monthly_income_usd: self.monthly_income_usd,
            monthly_income_usdt: self.monthly_income_usdt,
            monthly_income_cup: self.monthly_income_cup,
            income_percentage: self.income_percentage,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub income_percentage: String,
    pub monthly_income_usd: i64,
    pub monthly_income_usdt: i64,
    pub monthly_income_cup: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_users::Entity")]
    AccountUsers,
}

impl Related<super::account_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            income_percentage: parse_decimal(&model.income_percentage, "income_percentage")?,
            id: model.id,
            name: model.name,
            email: model.email,
            monthly_income_usd: Money::new(model.monthly_income_usd),
            monthly_income_usdt: Money::new(model.monthly_income_usdt),
            monthly_income_cup: Money::new(model.monthly_income_cup),
            created_at: model.created_at,
        })
    }
}
