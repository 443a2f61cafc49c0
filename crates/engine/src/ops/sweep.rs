//! Greedy repayment of personal loans out of money arriving in a shared account.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    sea_query::{Expr, Query},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{Currency, Loan, Money, ResultEngine, accounts, loans};

use super::Engine;

/// One loan repaid (fully or partly) by a sweep.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoanRepayment {
    pub loan_id: Uuid,
    pub amount: Money,
    pub currency: Currency,
    pub is_paid: bool,
}

impl Engine {
    /// Repays pending loans made from personal accounts to `shared_account_id`,
    /// oldest first, until `available` is used up.
    ///
    /// Loans in either CUP bucket qualify, and each one is repaid in its own
    /// bucket whatever bucket `available` arrived in.
    ///
    /// The pending loans are read once; the loop never re-queries, so it
    /// cannot observe its own writes and always terminates.
    pub(super) async fn sweep_pending_loans(
        &self,
        db: &DatabaseTransaction,
        shared_account_id: Uuid,
        available: Money,
        author_id: &str,
        at: DateTime<Utc>,
    ) -> ResultEngine<Vec<LoanRepayment>> {
        let personal_accounts = Query::select()
            .column(accounts::Column::Id)
            .from(accounts::Entity)
            .and_where(Expr::col(accounts::Column::IsShared).eq(false))
            .to_owned();
        let cup_codes = Currency::ALL
            .into_iter()
            .filter(|c| c.is_cup())
            .map(|c| c.code().to_string());

        let pending = loans::Entity::find()
            .filter(loans::Column::ToAccountId.eq(shared_account_id.to_string()))
            .filter(loans::Column::IsPaid.eq(false))
            .filter(loans::Column::Currency.is_in(cup_codes))
            .filter(loans::Column::FromAccountId.in_subquery(personal_accounts))
            .order_by_asc(loans::Column::CreatedAt)
            .order_by_asc(loans::Column::Id)
            .all(db)
            .await?;

        let mut remaining = available;
        let mut repayments = Vec::new();
        for model in pending {
            if !remaining.is_positive() {
                break;
            }
            let loan = Loan::try_from(model)?;
            let repayment = loan.outstanding().min(remaining);
            if repayment.is_zero() {
                continue;
            }
            let updated = self
                .apply_loan_payment(db, &loan, repayment, loan.currency, repayment, author_id, at)
                .await?;
            remaining -= repayment;
            repayments.push(LoanRepayment {
                loan_id: updated.id,
                amount: repayment,
                currency: updated.currency,
                is_paid: updated.is_paid,
            });
        }

        if !repayments.is_empty() {
            tracing::info!(
                %shared_account_id,
                repaid = repayments.len(),
                left = %remaining,
                "pending loans swept"
            );
        }
        Ok(repayments)
    }
}
