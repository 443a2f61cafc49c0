use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    ChangeAction, EngineError, EntityType, Expense, ExpenseCmd, ResultEngine, Transaction,
    TransactionKind, UpdateExpenseCmd, expenses,
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, shared::with_share_label, with_tx};

impl Engine {
    /// Records an expense and applies its balance effect.
    ///
    /// - `Planned`: only the row and a CREATE change, no money moves.
    /// - `Realized` on a personal account (or not marked shared): the
    ///   account's bucket is decremented by `amount`, one EXPENSE row.
    /// - `Realized`, marked shared, on a shared account: every member's share
    ///   is decremented from their personal account (or the shared one), one
    ///   EXPENSE row per member labelled with their percentage.
    pub async fn create_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        require_positive(cmd.amount, "amount")?;
        with_tx!(self, |db_tx| {
            let account = self
                .require_account_member(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            self.require_category(&db_tx, cmd.category_id).await?;

            let now = Utc::now();
            let expense = Expense {
                id: Uuid::new_v4(),
                amount: cmd.amount,
                currency: cmd.currency,
                payment_method: cmd.payment_method,
                expense_type: cmd.expense_type,
                is_shared: cmd.is_shared,
                description: normalize_optional_text(cmd.description.as_deref()),
                planned_date: cmd.planned_date,
                account_id: cmd.account_id,
                category_id: cmd.category_id,
                user_id: cmd.user_id.clone(),
                created_at: cmd.created_at.unwrap_or(now),
                updated_at: now,
            };
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            self.apply_expense_effect(&db_tx, &expense, account.is_shared)
                .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Create,
                EntityType::Expense,
                expense.id,
                None,
                Some(&expense),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(
                expense_id = %expense.id,
                amount = %expense.amount,
                currency = expense.currency.code(),
                shared = expense.is_shared && account.is_shared,
                "expense created"
            );
            Ok(expense)
        })
    }

    /// Partially updates an expense.
    ///
    /// When a field that drives the balance effect changes, the old effect is
    /// undone by replaying the rows it produced, so the reversal mirrors the
    /// creation-time branch (shared or not, same shares), and the new effect
    /// is applied from the updated fields. Edits to anything else leave the
    /// ledger rows and balances as they are.
    pub async fn update_expense(&self, cmd: UpdateExpenseCmd) -> ResultEngine<Expense> {
        if let Some(amount) = cmd.amount {
            require_positive(amount, "amount")?;
        }
        with_tx!(self, |db_tx| {
            let old = self
                .require_expense(&db_tx, cmd.expense_id, &cmd.user_id)
                .await?;
            let account_id = cmd.account_id.unwrap_or(old.account_id);
            let account = self
                .require_account_member(&db_tx, account_id, &cmd.user_id)
                .await?;
            if let Some(category_id) = cmd.category_id {
                self.require_category(&db_tx, category_id).await?;
            }

            let now = Utc::now();
            let updated = Expense {
                amount: cmd.amount.unwrap_or(old.amount),
                currency: cmd.currency.unwrap_or(old.currency),
                payment_method: cmd.payment_method.unwrap_or(old.payment_method),
                expense_type: cmd.expense_type.unwrap_or(old.expense_type),
                is_shared: cmd.is_shared.unwrap_or(old.is_shared),
                description: match cmd.description.as_deref() {
                    Some(text) => normalize_optional_text(Some(text)),
                    None => old.description.clone(),
                },
                planned_date: cmd.planned_date.or(old.planned_date),
                account_id,
                category_id: cmd.category_id.unwrap_or(old.category_id),
                created_at: cmd.created_at.unwrap_or(old.created_at),
                updated_at: now,
                ..old.clone()
            };
            let rebook = !same_effect(&old, &updated);
            if rebook {
                self.reverse_by_replay(&db_tx, old.id, now).await?;
            }
            expenses::ActiveModel::from(&updated).update(&db_tx).await?;
            if rebook {
                self.apply_expense_effect(&db_tx, &updated, account.is_shared)
                    .await?;
            }
            self.record_change(
                &db_tx,
                ChangeAction::Update,
                EntityType::Expense,
                updated.id,
                Some(&old),
                Some(&updated),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(expense_id = %updated.id, rebook, "expense updated");
            Ok(updated)
        })
    }

    /// Deletes an expense, giving back whatever it took from balances.
    pub async fn delete_expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = self.require_expense(&db_tx, expense_id, user_id).await?;
            self.reverse_by_replay(&db_tx, old.id, Utc::now()).await?;
            expenses::Entity::delete_by_id(old.id.to_string())
                .exec(&db_tx)
                .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Delete,
                EntityType::Expense,
                old.id,
                Some(&old),
                None,
                user_id,
            )
            .await?;

            tracing::info!(%expense_id, "expense deleted");
            Ok(())
        })
    }

    /// Returns an expense recorded by `user_id`.
    pub async fn expense(&self, expense_id: Uuid, user_id: &str) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .filter(|model| model.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Expense::try_from(model)
    }

    async fn require_expense(
        &self,
        db: &DatabaseTransaction,
        expense_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(db)
            .await?
            .filter(|model| model.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
        Expense::try_from(model)
    }

    async fn apply_expense_effect(
        &self,
        db: &DatabaseTransaction,
        expense: &Expense,
        account_is_shared: bool,
    ) -> ResultEngine<()> {
        if !expense.moves_money() {
            return Ok(());
        }

        if expense.is_shared && account_is_shared {
            let targets = self
                .share_targets(db, expense.account_id, expense.currency, expense.amount)
                .await?;
            for target in targets {
                let description = with_share_label(expense.description.as_deref(), &target.label);
                self.post(
                    db,
                    Transaction::new(
                        TransactionKind::Expense,
                        target.amount,
                        -target.amount,
                        expense.currency,
                        Some(description),
                        Some(expense.id),
                        &target.user_id,
                        target.account_id,
                        expense.created_at,
                    ),
                )
                .await?;
            }
            return Ok(());
        }

        self.post(
            db,
            Transaction::new(
                TransactionKind::Expense,
                expense.amount,
                -expense.amount,
                expense.currency,
                expense.description.clone(),
                Some(expense.id),
                &expense.user_id,
                expense.account_id,
                expense.created_at,
            ),
        )
        .await?;
        Ok(())
    }
}

/// Whether two versions of an expense move the same money.
fn same_effect(old: &Expense, new: &Expense) -> bool {
    old.amount == new.amount
        && old.currency == new.currency
        && old.is_shared == new.is_shared
        && old.account_id == new.account_id
        && old.expense_type == new.expense_type
}
