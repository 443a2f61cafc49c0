use chrono::Utc;
use sea_orm::{ActiveModelTrait, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    ChangeAction, Conversion, ConversionCmd, EngineError, EntityType, Income, Money, ResultEngine,
    Transaction, TransactionKind, conversions, incomes,
    util::{require_positive, require_positive_rate},
};

use super::{Engine, LoanRepayment, incomes::conversion_label, with_tx};

/// Outcome of [`Engine::create_conversion`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionReceipt {
    pub conversion: Conversion,
    /// Income recorded on a shared account that received CUP.
    pub income: Option<Income>,
    pub repayments: Vec<LoanRepayment>,
}

impl Engine {
    /// Converts `from_amount` of one bucket into another bucket, possibly on
    /// another account.
    ///
    /// `to_amount` is `from_amount * exchange_rate` rounded to the cent.
    /// When CUP lands on a different, shared account the credit is also
    /// recorded as an income there and pending personal loans to that
    /// account are repaid from it.
    pub async fn create_conversion(&self, cmd: ConversionCmd) -> ResultEngine<ConversionReceipt> {
        require_positive(cmd.from_amount, "from_amount")?;
        require_positive_rate(cmd.exchange_rate)?;
        let to_account_id = cmd.to_account_id.unwrap_or(cmd.from_account_id);
        if to_account_id == cmd.from_account_id && cmd.from_currency == cmd.to_currency {
            return Err(EngineError::Validation(
                "conversion within one account needs two different currencies".to_string(),
            ));
        }
        let to_amount = cmd.from_amount.convert(cmd.exchange_rate)?;

        with_tx!(self, |db_tx| {
            self.require_account_member(&db_tx, cmd.from_account_id, &cmd.user_id)
                .await?;
            let target = self
                .require_account_member(&db_tx, to_account_id, &cmd.user_id)
                .await?;
            let crosses_accounts = to_account_id != cmd.from_account_id;

            let now = Utc::now();
            let conversion = Conversion {
                id: Uuid::new_v4(),
                from_amount: cmd.from_amount,
                to_amount,
                from_currency: cmd.from_currency,
                to_currency: cmd.to_currency,
                exchange_rate: cmd.exchange_rate,
                from_account_id: cmd.from_account_id,
                to_account_id,
                user_id: cmd.user_id.clone(),
                created_at: now,
            };
            conversions::ActiveModel::from(&conversion)
                .insert(&db_tx)
                .await?;

            let label = conversion_label(cmd.from_currency, cmd.to_currency);
            self.post(
                &db_tx,
                Transaction::new(
                    TransactionKind::Conversion,
                    cmd.from_amount,
                    -cmd.from_amount,
                    cmd.from_currency,
                    Some(label.clone()),
                    Some(conversion.id),
                    &cmd.user_id,
                    cmd.from_account_id,
                    now,
                ),
            )
            .await?;
            if crosses_accounts {
                self.post(
                    &db_tx,
                    Transaction::new(
                        TransactionKind::Conversion,
                        to_amount,
                        to_amount,
                        cmd.to_currency,
                        Some(label.clone()),
                        Some(conversion.id),
                        &cmd.user_id,
                        to_account_id,
                        now,
                    ),
                )
                .await?;
            } else {
                self.apply_balance_delta(&db_tx, to_account_id, cmd.to_currency, to_amount)
                    .await?;
            }

            let mut income = None;
            let mut repayments = Vec::new();
            if crosses_accounts && target.is_shared && cmd.to_currency.is_cup() {
                // The credit is carried by the CONVERSION row above; the income
                // only documents it, so its INCOME row moves nothing.
                let arrived = Income {
                    id: Uuid::new_v4(),
                    amount: cmd.from_amount,
                    currency: cmd.from_currency,
                    description: Some(label),
                    account_id: to_account_id,
                    user_id: cmd.user_id.clone(),
                    converted_to_cup: true,
                    exchange_rate: Some(cmd.exchange_rate),
                    converted_amount: Some(to_amount),
                    converted_currency: Some(cmd.to_currency),
                    created_at: now,
                    updated_at: now,
                };
                incomes::ActiveModel::from(&arrived).insert(&db_tx).await?;
                self.record_transaction(
                    &db_tx,
                    &Transaction::new(
                        TransactionKind::Income,
                        to_amount,
                        Money::ZERO,
                        cmd.to_currency,
                        arrived.description.clone(),
                        Some(arrived.id),
                        &cmd.user_id,
                        to_account_id,
                        now,
                    ),
                )
                .await?;
                self.record_change(
                    &db_tx,
                    ChangeAction::Create,
                    EntityType::Income,
                    arrived.id,
                    None,
                    Some(&arrived),
                    &cmd.user_id,
                )
                .await?;
                repayments = self
                    .sweep_pending_loans(&db_tx, to_account_id, to_amount, &cmd.user_id, now)
                    .await?;
                income = Some(arrived);
            }

            tracing::info!(
                conversion_id = %conversion.id,
                from = %conversion.from_amount,
                to = %conversion.to_amount,
                rate = %conversion.exchange_rate,
                "conversion created"
            );
            Ok(ConversionReceipt {
                conversion,
                income,
                repayments,
            })
        })
    }
}
