use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    ChangeAction, Debt, DebtCmd, EngineError, EntityType, Money, PayDebtCmd, ResultEngine,
    Transaction, TransactionKind, debts,
    util::{normalize_optional_text, normalize_required_text, require_positive},
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a debt and takes its amount out of the account.
    pub async fn create_debt(&self, cmd: DebtCmd) -> ResultEngine<Debt> {
        require_positive(cmd.amount, "amount")?;
        let creditor = normalize_required_text(&cmd.creditor, "creditor")?;
        with_tx!(self, |db_tx| {
            self.require_account_member(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;

            let now = Utc::now();
            let debt = Debt {
                id: Uuid::new_v4(),
                amount: cmd.amount,
                currency: cmd.currency,
                creditor,
                description: normalize_optional_text(cmd.description.as_deref()),
                account_id: cmd.account_id,
                user_id: cmd.user_id.clone(),
                paid_amount: Money::ZERO,
                is_paid: false,
                due_date: cmd.due_date,
                paid_date: None,
                created_at: now,
                updated_at: now,
            };
            debts::ActiveModel::from(&debt).insert(&db_tx).await?;
            self.post(
                &db_tx,
                Transaction::new(
                    TransactionKind::Debt,
                    -debt.amount,
                    -debt.amount,
                    debt.currency,
                    debt.description.clone(),
                    Some(debt.id),
                    &debt.user_id,
                    debt.account_id,
                    now,
                ),
            )
            .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Create,
                EntityType::Debt,
                debt.id,
                None,
                Some(&debt),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(debt_id = %debt.id, amount = %debt.amount, "debt created");
            Ok(debt)
        })
    }

    /// Records a payment towards a debt.
    ///
    /// Only `paid_amount` moves: no account balance is touched at payment
    /// time. The DEBT_PAYMENT row is recorded at face value with a zero delta.
    pub async fn pay_debt(&self, cmd: PayDebtCmd) -> ResultEngine<Debt> {
        require_positive(cmd.payment_amount, "payment_amount")?;
        with_tx!(self, |db_tx| {
            let debt = self.require_debt(&db_tx, cmd.debt_id, &cmd.user_id).await?;
            if debt.is_paid {
                tracing::warn!(debt_id = %debt.id, "payment rejected: debt already paid");
                return Err(EngineError::Validation("debt already paid".to_string()));
            }

            let now = Utc::now();
            let paid_amount = debt.paid_amount + cmd.payment_amount;
            let is_paid = paid_amount >= debt.amount;
            let updated = Debt {
                paid_amount,
                is_paid,
                paid_date: if is_paid { Some(now) } else { None },
                updated_at: now,
                ..debt.clone()
            };
            debts::ActiveModel::from(&updated).update(&db_tx).await?;
            self.record_transaction(
                &db_tx,
                &Transaction::new(
                    TransactionKind::DebtPayment,
                    cmd.payment_amount,
                    Money::ZERO,
                    debt.currency,
                    debt.description.clone(),
                    Some(debt.id),
                    &cmd.user_id,
                    debt.account_id,
                    now,
                ),
            )
            .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Update,
                EntityType::Debt,
                updated.id,
                Some(&debt),
                Some(&updated),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(
                debt_id = %updated.id,
                paid = %updated.paid_amount,
                is_paid = updated.is_paid,
                "debt payment recorded"
            );
            Ok(updated)
        })
    }

    /// Deletes a debt; an unpaid one gives the outstanding amount back.
    pub async fn delete_debt(&self, debt_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let debt = self.require_debt(&db_tx, debt_id, user_id).await?;
            if !debt.is_paid {
                self.apply_balance_delta(&db_tx, debt.account_id, debt.currency, debt.outstanding())
                    .await?;
            }
            debts::Entity::delete_by_id(debt.id.to_string())
                .exec(&db_tx)
                .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Delete,
                EntityType::Debt,
                debt.id,
                Some(&debt),
                None,
                user_id,
            )
            .await?;

            tracing::info!(%debt_id, "debt deleted");
            Ok(())
        })
    }

    /// Returns a debt recorded by `user_id`.
    pub async fn debt(&self, debt_id: Uuid, user_id: &str) -> ResultEngine<Debt> {
        let model = debts::Entity::find_by_id(debt_id.to_string())
            .one(&self.database)
            .await?
            .filter(|model| model.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("debt not exists".to_string()))?;
        Debt::try_from(model)
    }

    async fn require_debt(
        &self,
        db: &DatabaseTransaction,
        debt_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Debt> {
        let model = debts::Entity::find_by_id(debt_id.to_string())
            .one(db)
            .await?
            .filter(|model| model.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("debt not exists".to_string()))?;
        Debt::try_from(model)
    }
}
