//! Entity mutation audit.
//!
//! Snapshots are stored as opaque JSON documents of the domain structs.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl ChangeAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl TryFrom<&str> for ChangeAction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other => Err(EngineError::Validation(format!(
                "invalid change action: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Expense,
    Income,
    Loan,
    Debt,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "EXPENSE",
            Self::Income => "INCOME",
            Self::Loan => "LOAN",
            Self::Debt => "DEBT",
        }
    }
}

impl TryFrom<&str> for EntityType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "EXPENSE" => Ok(Self::Expense),
            "INCOME" => Ok(Self::Income),
            "LOAN" => Ok(Self::Loan),
            "DEBT" => Ok(Self::Debt),
            other => Err(EngineError::Validation(format!(
                "invalid entity type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Change {
    pub id: Uuid,
    pub action: ChangeAction,
    pub entity_type: EntityType,
    pub entity_id: Uuid,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "changes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub author_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_snapshot(value: Option<String>) -> Result<Option<serde_json::Value>, EngineError> {
    value
        .map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|err| EngineError::Validation(format!("invalid change snapshot: {err}")))
        })
        .transpose()
}

impl TryFrom<Model> for Change {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "change")?,
            action: ChangeAction::try_from(model.action.as_str())?,
            entity_type: EntityType::try_from(model.entity_type.as_str())?,
            entity_id: parse_uuid(&model.entity_id, "entity")?,
            old_value: parse_snapshot(model.old_value)?,
            new_value: parse_snapshot(model.new_value)?,
            author_id: model.author_id,
            created_at: model.created_at,
        })
    }
}
