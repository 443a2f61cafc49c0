//! The module contains `Account` and its table.
//!
//! An account keeps five independent balances, one per [`Currency`] bucket.
//! Balances are signed: overdraft is allowed unless a handler checks for it.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{Currency, EngineError, Money, util::parse_uuid};

/// Current balances of one account, indexed by bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
    pub usd_zelle: Money,
    pub usd_efectivo: Money,
    pub usdt: Money,
    pub cup_efectivo: Money,
    pub cup_transferencia: Money,
}

impl Balances {
    #[must_use]
    pub const fn get(&self, currency: Currency) -> Money {
        match currency {
            Currency::UsdZelle => self.usd_zelle,
            Currency::UsdEfectivo => self.usd_efectivo,
            Currency::Usdt => self.usdt,
            Currency::CupEfectivo => self.cup_efectivo,
            Currency::CupTransferencia => self.cup_transferencia,
        }
    }

    pub fn add(&mut self, currency: Currency, delta: Money) {
        let slot = match currency {
            Currency::UsdZelle => &mut self.usd_zelle,
            Currency::UsdEfectivo => &mut self.usd_efectivo,
            Currency::Usdt => &mut self.usdt,
            Currency::CupEfectivo => &mut self.cup_efectivo,
            Currency::CupTransferencia => &mut self.cup_transferencia,
        };
        *slot += delta;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub is_shared: bool,
    pub balances: Balances,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub const fn balance(&self, currency: Currency) -> Money {
        self.balances.get(currency)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub is_shared: bool,
    pub balance_usd_zelle: i64,
    pub balance_usd_efectivo: i64,
    pub balance_usdt: i64,
    pub balance_cup_efectivo: i64,
    pub balance_cup_transferencia: i64,
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

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            name: model.name,
            is_shared: model.is_shared,
            balances: Balances {
                usd_zelle: Money::new(model.balance_usd_zelle),
                usd_efectivo: Money::new(model.balance_usd_efectivo),
                usdt: Money::new(model.balance_usdt),
                cup_efectivo: Money::new(model.balance_cup_efectivo),
                cup_transferencia: Money::new(model.balance_cup_transferencia),
            },
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_are_independent() {
        let mut balances = Balances::default();
        balances.add(Currency::Usdt, Money::new(30_00));
        balances.add(Currency::CupEfectivo, Money::new(-5_00));

        assert_eq!(balances.get(Currency::Usdt), Money::new(30_00));
        assert_eq!(balances.get(Currency::CupEfectivo), Money::new(-5_00));
        assert_eq!(balances.get(Currency::UsdZelle), Money::ZERO);
        assert_eq!(balances.get(Currency::CupTransferencia), Money::ZERO);
    }
}
