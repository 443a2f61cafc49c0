//! The module contains `Expense` and its table.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Currency, EngineError, Money,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Transfer,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl TryFrom<&str> for PaymentMethod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CASH" => Ok(Self::Cash),
            "TRANSFER" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

/// `Planned` expenses are recorded but never move money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    Realized,
    Planned,
}

impl ExpenseType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Realized => "REALIZED",
            Self::Planned => "PLANNED",
        }
    }
}

impl TryFrom<&str> for ExpenseType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "REALIZED" => Ok(Self::Realized),
            "PLANNED" => Ok(Self::Planned),
            other => Err(EngineError::Validation(format!(
                "invalid expense type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Expense {
    pub id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub payment_method: PaymentMethod,
    pub expense_type: ExpenseType,
    pub is_shared: bool,
    pub description: Option<String>,
    pub planned_date: Option<DateTime<Utc>>,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    #[must_use]
    pub fn moves_money(&self) -> bool {
        self.expense_type == ExpenseType::Realized
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub payment_method: String,
    pub expense_type: String,
    pub is_shared: bool,
    pub description: Option<String>,
    pub planned_date: Option<DateTimeUtc>,
    pub account_id: String,
    pub category_id: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            amount: ActiveValue::Set(expense.amount.minor()),
            currency: ActiveValue::Set(expense.currency.code().to_string()),
            payment_method: ActiveValue::Set(expense.payment_method.as_str().to_string()),
            expense_type: ActiveValue::Set(expense.expense_type.as_str().to_string()),
            is_shared: ActiveValue::Set(expense.is_shared),
            description: ActiveValue::Set(expense.description.clone()),
            planned_date: ActiveValue::Set(expense.planned_date),
            account_id: ActiveValue::Set(expense.account_id.to_string()),
            category_id: ActiveValue::Set(expense.category_id.to_string()),
            user_id: ActiveValue::Set(expense.user_id.clone()),
            created_at: ActiveValue::Set(expense.created_at),
            updated_at: ActiveValue::Set(expense.updated_at),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            amount: Money::new(model.amount),
            currency: model_currency(&model.currency)?,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            expense_type: ExpenseType::try_from(model.expense_type.as_str())?,
            is_shared: model.is_shared,
            description: model.description,
            planned_date: model.planned_date,
            account_id: parse_uuid(&model.account_id, "account")?,
            category_id: parse_uuid(&model.category_id, "category")?,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
