//! Ledger primitives.
//!
//! Every handler composes these inside its own database transaction:
//! - [`Engine::apply_balance_delta`] adds a signed delta to one bucket with a
//!   single `UPDATE ... SET bucket = bucket + ?`, so concurrent deltas on the
//!   same row serialize in the store instead of racing on a read-modify-write.
//! - [`Engine::record_transaction`] appends an audit row.
//! - [`Engine::record_change`] appends an entity snapshot.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
    sea_query::Expr,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    ChangeAction, Currency, EngineError, EntityType, Money, ResultEngine, Transaction, accounts,
    changes, transactions,
};

use super::Engine;

impl Engine {
    pub(super) async fn apply_balance_delta(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        currency: Currency,
        delta: Money,
    ) -> ResultEngine<()> {
        if delta.is_zero() {
            return Ok(());
        }
        let column = currency.balance_column();
        let result = accounts::Entity::update_many()
            .col_expr(column, Expr::col(column).add(delta.minor()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .exec(db)
            .await?;
        if result.rows_affected != 1 {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        tracing::debug!(
            %account_id,
            currency = currency.code(),
            delta = %delta,
            "balance delta applied"
        );
        Ok(())
    }

    /// Decrements a bucket only when it holds at least `amount`.
    ///
    /// Returns `false` (and changes nothing) when the balance is short. The
    /// check and the write are one statement, so no concurrent debit can
    /// slip in between.
    pub(super) async fn debit_if_covered(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        currency: Currency,
        amount: Money,
    ) -> ResultEngine<bool> {
        let column = currency.balance_column();
        let result = accounts::Entity::update_many()
            .col_expr(column, Expr::col(column).sub(amount.minor()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(column.gte(amount.minor()))
            .exec(db)
            .await?;
        let covered = result.rows_affected == 1;
        if covered {
            tracing::debug!(
                %account_id,
                currency = currency.code(),
                delta = %(-amount),
                "balance delta applied"
            );
        }
        Ok(covered)
    }

    pub(super) async fn record_transaction(
        &self,
        db: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(db).await?;
        Ok(())
    }

    /// Applies `tx.delta` to its account and records the row.
    pub(super) async fn post(
        &self,
        db: &DatabaseTransaction,
        tx: Transaction,
    ) -> ResultEngine<Transaction> {
        self.apply_balance_delta(db, tx.account_id, tx.currency, tx.delta)
            .await?;
        self.record_transaction(db, &tx).await?;
        Ok(tx)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) async fn record_change<T: Serialize>(
        &self,
        db: &DatabaseTransaction,
        action: ChangeAction,
        entity_type: EntityType,
        entity_id: Uuid,
        old_value: Option<&T>,
        new_value: Option<&T>,
        author_id: &str,
    ) -> ResultEngine<()> {
        let old_value = old_value.map(snapshot).transpose()?;
        let new_value = new_value.map(snapshot).transpose()?;
        changes::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            action: ActiveValue::Set(action.as_str().to_string()),
            entity_type: ActiveValue::Set(entity_type.as_str().to_string()),
            entity_id: ActiveValue::Set(entity_id.to_string()),
            old_value: ActiveValue::Set(old_value),
            new_value: ActiveValue::Set(new_value),
            author_id: ActiveValue::Set(author_id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    pub(super) async fn active_transactions<C: ConnectionTrait>(
        &self,
        db: &C,
        reference_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::ReferenceId.eq(reference_id.to_string()))
            .filter(transactions::Column::VoidedAt.is_null())
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .all(db)
            .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// Undoes the balance effect of an entity by replaying its active rows.
    ///
    /// Each row's delta is subtracted from the account it touched and the row
    /// is marked voided. The result matches the creation-time effect exactly,
    /// whatever happened to incomes or memberships since.
    pub(super) async fn reverse_by_replay(
        &self,
        db: &DatabaseTransaction,
        reference_id: Uuid,
        voided_at: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        let rows = self.active_transactions(db, reference_id).await?;
        for row in &rows {
            self.apply_balance_delta(db, row.account_id, row.currency, -row.delta)
                .await?;
            transactions::ActiveModel {
                id: ActiveValue::Set(row.id.to_string()),
                voided_at: ActiveValue::Set(Some(voided_at)),
                ..Default::default()
            }
            .update(db)
            .await?;
        }
        Ok(rows)
    }
}

fn snapshot<T: Serialize>(value: &T) -> ResultEngine<String> {
    serde_json::to_string(value)
        .map_err(|err| EngineError::Validation(format!("cannot serialize snapshot: {err}")))
}
