use chrono::Utc;
use sea_orm::{ActiveModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionKind, Transfer, TransferCmd, transfers,
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, with_tx};

impl Engine {
    /// Moves `amount` between two accounts in the same bucket.
    ///
    /// Unlike expenses, a transfer never overdraws: it fails with
    /// [`EngineError::InsufficientFunds`] and changes nothing when the source
    /// bucket holds less than `amount`.
    pub async fn create_transfer(&self, cmd: TransferCmd) -> ResultEngine<Transfer> {
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

            if !self
                .debit_if_covered(&db_tx, cmd.from_account_id, cmd.currency, cmd.amount)
                .await?
            {
                tracing::warn!(
                    from_account_id = %cmd.from_account_id,
                    currency = cmd.currency.code(),
                    amount = %cmd.amount,
                    "transfer rejected: insufficient funds"
                );
                return Err(EngineError::InsufficientFunds(format!(
                    "source account holds less than {} {}",
                    cmd.amount, cmd.currency
                )));
            }

            let now = Utc::now();
            let transfer = Transfer {
                id: Uuid::new_v4(),
                amount: cmd.amount,
                currency: cmd.currency,
                description: normalize_optional_text(cmd.description.as_deref()),
                from_account_id: cmd.from_account_id,
                to_account_id: cmd.to_account_id,
                user_id: cmd.user_id.clone(),
                created_at: now,
            };
            transfers::ActiveModel::from(&transfer).insert(&db_tx).await?;

            // The source side was already debited by the guarded update.
            self.record_transaction(
                &db_tx,
                &Transaction::new(
                    TransactionKind::Transfer,
                    transfer.amount,
                    -transfer.amount,
                    transfer.currency,
                    transfer.description.clone(),
                    Some(transfer.id),
                    &cmd.user_id,
                    transfer.from_account_id,
                    now,
                ),
            )
            .await?;
            self.post(
                &db_tx,
                Transaction::new(
                    TransactionKind::Transfer,
                    transfer.amount,
                    transfer.amount,
                    transfer.currency,
                    transfer.description.clone(),
                    Some(transfer.id),
                    &cmd.user_id,
                    transfer.to_account_id,
                    now,
                ),
            )
            .await?;

            tracing::info!(
                transfer_id = %transfer.id,
                amount = %transfer.amount,
                currency = transfer.currency.code(),
                "transfer created"
            );
            Ok(transfer)
        })
    }
}
