use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{Change, ResultEngine, Transaction, changes};

use super::Engine;

impl Engine {
    /// Active ledger rows produced by an entity (expense, income, loan, ...).
    ///
    /// Rows voided by an update or a delete are not returned.
    pub async fn transactions_for_reference(
        &self,
        reference_id: Uuid,
    ) -> ResultEngine<Vec<Transaction>> {
        self.active_transactions(&self.database, reference_id).await
    }

    /// Every recorded change of an entity, oldest first.
    pub async fn changes_for_entity(&self, entity_id: Uuid) -> ResultEngine<Vec<Change>> {
        let rows = changes::Entity::find()
            .filter(changes::Column::EntityId.eq(entity_id.to_string()))
            .order_by_asc(changes::Column::CreatedAt)
            .order_by_asc(changes::Column::Id)
            .all(&self.database)
            .await?;
        rows.into_iter().map(Change::try_from).collect()
    }
}
