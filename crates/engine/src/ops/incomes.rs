use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    ChangeAction, Conversion, Currency, EngineError, EntityType, Income, IncomeCmd, Money,
    ResultEngine, Transaction, TransactionKind, UpdateIncomeCmd, accounts, conversions, incomes,
    util::{normalize_optional_text, parse_uuid, require_positive, require_positive_rate},
};

use super::{Engine, LoanRepayment, shared::with_share_label, with_tx};

/// Outcome of [`Engine::create_income`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncomeReceipt {
    pub income: Income,
    /// Present when the income was converted to CUP on arrival.
    pub conversion: Option<Conversion>,
    /// Loans repaid out of the converted amount.
    pub repayments: Vec<LoanRepayment>,
}

impl Engine {
    /// Records an income.
    ///
    /// Normally the account's bucket is credited by `amount`. When the
    /// account is shared, the currency is a USD bucket and conversion to CUP
    /// was requested, the income is converted instead:
    ///
    /// 1. every member's USD share is debited from the principal account;
    /// 2. `amount * exchange_rate` is credited to the shared account's CUP
    ///    bucket;
    /// 3. pending personal loans to the shared account are repaid from it.
    pub async fn create_income(&self, cmd: IncomeCmd) -> ResultEngine<IncomeReceipt> {
        require_positive(cmd.amount, "amount")?;
        let rate = if cmd.convert_to_cup {
            let rate = cmd.exchange_rate.ok_or_else(|| {
                EngineError::Validation("exchange_rate is required to convert to CUP".to_string())
            })?;
            require_positive_rate(rate)?;
            Some(rate)
        } else {
            None
        };

        with_tx!(self, |db_tx| {
            let account = self
                .require_account_member(&db_tx, cmd.account_id, &cmd.user_id)
                .await?;
            let now = Utc::now();

            let receipt = match rate {
                Some(rate) if account.is_shared && cmd.currency.is_usd() => {
                    self.create_converted_income(&db_tx, &cmd, &account, rate, now)
                        .await?
                }
                _ => {
                    let income = Income {
                        id: Uuid::new_v4(),
                        amount: cmd.amount,
                        currency: cmd.currency,
                        description: normalize_optional_text(cmd.description.as_deref()),
                        account_id: cmd.account_id,
                        user_id: cmd.user_id.clone(),
                        converted_to_cup: false,
                        exchange_rate: None,
                        converted_amount: None,
                        converted_currency: None,
                        created_at: cmd.created_at.unwrap_or(now),
                        updated_at: now,
                    };
                    incomes::ActiveModel::from(&income).insert(&db_tx).await?;
                    self.post_income(&db_tx, &income).await?;
                    IncomeReceipt {
                        income,
                        conversion: None,
                        repayments: Vec::new(),
                    }
                }
            };

            self.record_change(
                &db_tx,
                ChangeAction::Create,
                EntityType::Income,
                receipt.income.id,
                None,
                Some(&receipt.income),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(
                income_id = %receipt.income.id,
                amount = %receipt.income.amount,
                currency = receipt.income.currency.code(),
                converted = receipt.income.converted_to_cup,
                "income created"
            );
            Ok(receipt)
        })
    }

    /// Partially updates an income that was not converted on arrival.
    pub async fn update_income(&self, cmd: UpdateIncomeCmd) -> ResultEngine<Income> {
        if let Some(amount) = cmd.amount {
            require_positive(amount, "amount")?;
        }
        with_tx!(self, |db_tx| {
            let old = self
                .require_plain_income(&db_tx, cmd.income_id, &cmd.user_id)
                .await?;
            let now = Utc::now();
            self.reverse_by_replay(&db_tx, old.id, now).await?;

            let updated = Income {
                amount: cmd.amount.unwrap_or(old.amount),
                currency: cmd.currency.unwrap_or(old.currency),
                description: match cmd.description.as_deref() {
                    Some(text) => normalize_optional_text(Some(text)),
                    None => old.description.clone(),
                },
                created_at: cmd.created_at.unwrap_or(old.created_at),
                updated_at: now,
                ..old.clone()
            };
            incomes::ActiveModel::from(&updated).update(&db_tx).await?;
            self.post_income(&db_tx, &updated).await?;
            self.record_change(
                &db_tx,
                ChangeAction::Update,
                EntityType::Income,
                updated.id,
                Some(&old),
                Some(&updated),
                &cmd.user_id,
            )
            .await?;

            tracing::info!(income_id = %updated.id, "income updated");
            Ok(updated)
        })
    }

    /// Deletes an income that was not converted on arrival, taking its amount
    /// back out of the account.
    pub async fn delete_income(&self, income_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let old = self
                .require_plain_income(&db_tx, income_id, user_id)
                .await?;
            self.reverse_by_replay(&db_tx, old.id, Utc::now()).await?;
            incomes::Entity::delete_by_id(old.id.to_string())
                .exec(&db_tx)
                .await?;
            self.record_change(
                &db_tx,
                ChangeAction::Delete,
                EntityType::Income,
                old.id,
                Some(&old),
                None,
                user_id,
            )
            .await?;

            tracing::info!(%income_id, "income deleted");
            Ok(())
        })
    }

    /// Returns an income recorded by `user_id`.
    pub async fn income(&self, income_id: Uuid, user_id: &str) -> ResultEngine<Income> {
        let model = incomes::Entity::find_by_id(income_id.to_string())
            .one(&self.database)
            .await?
            .filter(|model| model.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))?;
        Income::try_from(model)
    }

    async fn require_plain_income(
        &self,
        db: &DatabaseTransaction,
        income_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Income> {
        let model = incomes::Entity::find_by_id(income_id.to_string())
            .one(db)
            .await?
            .filter(|model| model.user_id == user_id)
            .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))?;
        let income = Income::try_from(model)?;
        if income.converted_to_cup {
            tracing::warn!(%income_id, "converted income cannot be changed");
            return Err(EngineError::Validation(
                "converted incomes cannot be changed".to_string(),
            ));
        }
        Ok(income)
    }

    async fn post_income(&self, db: &DatabaseTransaction, income: &Income) -> ResultEngine<()> {
        self.post(
            db,
            Transaction::new(
                TransactionKind::Income,
                income.amount,
                income.amount,
                income.currency,
                income.description.clone(),
                Some(income.id),
                &income.user_id,
                income.account_id,
                income.created_at,
            ),
        )
        .await?;
        Ok(())
    }

    async fn create_converted_income(
        &self,
        db: &DatabaseTransaction,
        cmd: &IncomeCmd,
        shared: &accounts::Model,
        rate: Decimal,
        now: DateTime<Utc>,
    ) -> ResultEngine<IncomeReceipt> {
        let principal_id = self.principal_account_id.ok_or_else(|| {
            EngineError::Validation("principal account is not configured".to_string())
        })?;
        self.require_account(db, principal_id).await?;
        let shared_id = parse_uuid(&shared.id, "account")?;

        let target_currency = cmd
            .target_currency
            .or_else(|| cmd.currency.default_cup_target())
            .filter(|c| c.is_cup())
            .ok_or_else(|| {
                EngineError::Validation("target_currency must be a CUP bucket".to_string())
            })?;
        let converted = cmd.amount.convert(rate)?;
        let created_at = cmd.created_at.unwrap_or(now);
        let income_id = Uuid::new_v4();
        let description = normalize_optional_text(cmd.description.as_deref());

        let allocation = self
            .allocate_among_members(db, shared_id, cmd.currency, cmd.amount)
            .await?;
        let mut debited = Money::ZERO;
        for share in allocation.shares.iter().filter(|s| !s.amount.is_zero()) {
            self.post(
                db,
                Transaction::new(
                    TransactionKind::Conversion,
                    share.amount,
                    -share.amount,
                    cmd.currency,
                    Some(with_share_label(
                        Some(&conversion_label(cmd.currency, target_currency)),
                        &share.percentage_label(),
                    )),
                    Some(income_id),
                    &share.user_id,
                    principal_id,
                    created_at,
                ),
            )
            .await?;
            debited += share.amount;
        }
        if debited != cmd.amount {
            tracing::warn!(
                %income_id,
                debited = %debited,
                amount = %cmd.amount,
                "members have no allocation weights; principal account debit is partial"
            );
        }

        self.post(
            db,
            Transaction::new(
                TransactionKind::Income,
                converted,
                converted,
                target_currency,
                description.clone(),
                Some(income_id),
                &cmd.user_id,
                shared_id,
                created_at,
            ),
        )
        .await?;

        let conversion = Conversion {
            id: Uuid::new_v4(),
            from_amount: cmd.amount,
            to_amount: converted,
            from_currency: cmd.currency,
            to_currency: target_currency,
            exchange_rate: rate,
            from_account_id: principal_id,
            to_account_id: shared_id,
            user_id: cmd.user_id.clone(),
            created_at,
        };
        conversions::ActiveModel::from(&conversion).insert(db).await?;

        let income = Income {
            id: income_id,
            amount: cmd.amount,
            currency: cmd.currency,
            description,
            account_id: shared_id,
            user_id: cmd.user_id.clone(),
            converted_to_cup: true,
            exchange_rate: Some(rate),
            converted_amount: Some(converted),
            converted_currency: Some(target_currency),
            created_at,
            updated_at: now,
        };
        incomes::ActiveModel::from(&income).insert(db).await?;

        let repayments = self
            .sweep_pending_loans(db, shared_id, converted, &cmd.user_id, now)
            .await?;

        Ok(IncomeReceipt {
            income,
            conversion: Some(conversion),
            repayments,
        })
    }
}

pub(super) fn conversion_label(from: Currency, to: Currency) -> String {
    format!("{from} → {to}")
}
