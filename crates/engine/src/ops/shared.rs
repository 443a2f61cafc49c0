//! Fan-out of shared amounts across the members of a shared account.

use sea_orm::DatabaseTransaction;
use uuid::Uuid;

use crate::{Allocation, Currency, Money, ResultEngine, allocate, util::parse_uuid};

use super::Engine;

/// Where one member's share of a shared event lands.
#[derive(Clone, Debug)]
pub(super) struct ShareTarget {
    pub(super) user_id: String,
    /// The member's personal account, or the shared account when they have none.
    pub(super) account_id: Uuid,
    pub(super) amount: Money,
    pub(super) label: String,
}

impl Engine {
    pub(super) async fn allocate_among_members(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        currency: Currency,
        amount: Money,
    ) -> ResultEngine<Allocation> {
        let members = self.account_members(db, account_id).await?;
        let weights: Vec<_> = members.iter().map(|m| m.weights()).collect();
        let allocation = allocate(&weights, currency, amount)?;
        tracing::debug!(
            %account_id,
            basis = ?allocation.basis,
            members = weights.len(),
            "shared amount allocated"
        );
        Ok(allocation)
    }

    /// Allocates `amount` and resolves the account each non-zero share hits.
    pub(super) async fn share_targets(
        &self,
        db: &DatabaseTransaction,
        shared_account_id: Uuid,
        currency: Currency,
        amount: Money,
    ) -> ResultEngine<Vec<ShareTarget>> {
        let allocation = self
            .allocate_among_members(db, shared_account_id, currency, amount)
            .await?;

        let mut targets = Vec::with_capacity(allocation.shares.len());
        for share in allocation.shares {
            if share.amount.is_zero() {
                continue;
            }
            let account_id = match self.personal_account_of(db, &share.user_id).await? {
                Some(model) => parse_uuid(&model.id, "account")?,
                None => shared_account_id,
            };
            targets.push(ShareTarget {
                label: share.percentage_label(),
                user_id: share.user_id,
                account_id,
                amount: share.amount,
            });
        }
        Ok(targets)
    }
}

/// `"Groceries (75.0%)"`, or just the percentage when there is no description.
pub(super) fn with_share_label(description: Option<&str>, label: &str) -> String {
    match description {
        Some(text) => format!("{text} ({label})"),
        None => format!("({label})"),
    }
}
