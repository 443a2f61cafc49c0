use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    ChangeAction, Currency, EngineError, EntityType, Loan, LoanCmd, Money, PayLoanCmd,
    ResultEngine, Transaction, TransactionKind, loans,
    util::{normalize_optional_text, require_positive, require_positive_rate},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lends `amount` from the giver's account to the receiver's account.
    pub async fn create_loan(&self, cmd: LoanCmd) -> ResultEngine<Loan> {
        require_positive(cmd.amount, "amount")?;
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::Validation(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_account_member(&db_tx, cmd.from_account_id, &cmd.user_id)
                .await?;
            self.require_account(&db_tx, cmd.to_account_id).await?;
            self.require_user(&db_tx, &cmd.receiver_id).await?;

            let now = Utc::now();
            let loan = Loan {
                id: Uuid::new_v4(),
                amount: cmd.amount,
                currency: cmd.currency,
                description: normalize_optional_text(cmd.description.as_deref()),
                giver_id: cmd.user_id.clone(),
                receiver_id: cmd.receiver_id.clone(),
                from_account_id: cmd.from_account_id,
                to_account_id: cmd.to_account_id,
                paid_amount: Money::ZERO,
                is_paid: false,
                due_date: cmd.due_date,
                paid_date: None,
                created_at: cmd.created_at.unwrap_or(now),
                updated_at: now,
            };
            loans::ActiveModel::from(&loan).insert(&db_tx).await?;

            self.post(
                &db_tx,
                Transaction::new(
                    TransactionKind::Loan,
                    loan.amount,
                    -loan.amount,
                    loan.currency,
                    loan.description.clone(),
                    Some(loan.id),
                    &loan.giver_id,
                    loan.from_account_id,
                    loan.created_at,
                ),
            )
            .await?;
            self.apply_balance_delta(&db_tx, loan.to_account_id, loan.currency, loan.amount)
                .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Create,
                EntityType::Loan,
                loan.id,
                None,
                Some(&loan),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(loan_id = %loan.id, amount = %loan.amount, "loan created");
            Ok(loan)
        })
    }

    /// Records a payment towards a loan.
    ///
    /// Money moves in the payment currency, back from the receiver's account
    /// to the giver's. `paid_amount` grows by the payment converted to the
    /// loan currency when the two differ.
    pub async fn pay_loan(&self, cmd: PayLoanCmd) -> ResultEngine<Loan> {
        require_positive(cmd.payment_amount, "payment_amount")?;
        with_tx!(self, |db_tx| {
            let loan = self.require_loan(&db_tx, cmd.loan_id, &cmd.user_id).await?;
            if loan.is_paid {
                tracing::warn!(loan_id = %loan.id, "payment rejected: loan already paid");
                return Err(EngineError::Validation("loan already paid".to_string()));
            }

            let payment_currency = cmd.payment_currency.unwrap_or(loan.currency);
            let credited = if payment_currency == loan.currency {
                cmd.payment_amount
            } else {
                let rate = cmd.exchange_rate.ok_or_else(|| {
                    EngineError::Validation(
                        "exchange_rate is required when paying in another currency".to_string(),
                    )
                })?;
                require_positive_rate(rate)?;
                cmd.payment_amount.convert(rate)?
            };

            let updated = self
                .apply_loan_payment(
                    &db_tx,
                    &loan,
                    cmd.payment_amount,
                    payment_currency,
                    credited,
                    &cmd.user_id,
                    Utc::now(),
                )
                .await?;
            Ok(updated)
        })
    }

    /// Deletes a loan. Only the giver may do so; an unpaid loan first gives
    /// the outstanding amount back to the giver's account.
    pub async fn delete_loan(&self, loan_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let loan = self.require_loan(&db_tx, loan_id, user_id).await?;
            if loan.giver_id != user_id {
                tracing::warn!(%loan_id, user_id, "loan delete rejected: not the giver");
                return Err(EngineError::Unauthorized(
                    "only the giver can delete a loan".to_string(),
                ));
            }

            if !loan.is_paid {
                let outstanding = loan.outstanding();
                self.apply_balance_delta(&db_tx, loan.from_account_id, loan.currency, outstanding)
                    .await?;
                self.apply_balance_delta(&db_tx, loan.to_account_id, loan.currency, -outstanding)
                    .await?;
            }
            loans::Entity::delete_by_id(loan.id.to_string())
                .exec(&db_tx)
                .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Delete,
                EntityType::Loan,
                loan.id,
                Some(&loan),
                None,
                user_id,
            )
            .await?;

            tracing::info!(%loan_id, "loan deleted");
            Ok(())
        })
    }

    /// Returns a loan the caller gave or received.
    pub async fn loan(&self, loan_id: Uuid, user_id: &str) -> ResultEngine<Loan> {
        let model = loans::Entity::find_by_id(loan_id.to_string())
            .one(&self.database)
            .await?
            .filter(|model| model.giver_id == user_id || model.receiver_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("loan not exists".to_string()))?;
        Loan::try_from(model)
    }

    async fn require_loan(
        &self,
        db: &DatabaseTransaction,
        loan_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Loan> {
        let model = loans::Entity::find_by_id(loan_id.to_string())
            .one(db)
            .await?
            .filter(|model| model.giver_id == user_id || model.receiver_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("loan not exists".to_string()))?;
        Loan::try_from(model)
    }

    /// Moves `raw_amount` of `raw_currency` from the receiver's account back to
    /// the giver's, and credits `credited` (in the loan currency) to the loan.
    #[allow(clippy::too_many_arguments)]
    pub(super) async fn apply_loan_payment(
        &self,
        db: &DatabaseTransaction,
        loan: &Loan,
        raw_amount: Money,
        raw_currency: Currency,
        credited: Money,
        author_id: &str,
        at: DateTime<Utc>,
    ) -> ResultEngine<Loan> {
        self.apply_balance_delta(db, loan.to_account_id, raw_currency, -raw_amount)
            .await?;
        self.post(
            db,
            Transaction::new(
                TransactionKind::LoanPayment,
                raw_amount,
                raw_amount,
                raw_currency,
                loan.description.clone(),
                Some(loan.id),
                author_id,
                loan.from_account_id,
                at,
            ),
        )
        .await?;

        let paid_amount = loan.paid_amount + credited;
        let is_paid = paid_amount >= loan.amount;
        let updated = Loan {
            paid_amount,
            is_paid,
            paid_date: if is_paid && !loan.is_paid {
                Some(at)
            } else {
                loan.paid_date
            },
            updated_at: at,
            ..loan.clone()
        };
        loans::ActiveModel::from(&updated).update(db).await?;
        self.record_change(
            db,
            ChangeAction::Update,
            EntityType::Loan,
            updated.id,
            Some(loan),
            Some(&updated),
            author_id,
        )
        .await?;

        tracing::info!(
            loan_id = %updated.id,
            payment = %raw_amount,
            currency = raw_currency.code(),
            paid = %updated.paid_amount,
            is_paid = updated.is_paid,
            "loan payment applied"
        );
        Ok(updated)
    }
}
