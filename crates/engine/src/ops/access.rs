use sea_orm::{ConnectionTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MembershipRole, ResultEngine, User, account_users, accounts, categories, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn membership_role<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<MembershipRole>> {
        let row = account_users::Entity::find_by_id((account_id.to_string(), user_id.to_string()))
            .one(db)
            .await?;
        row.as_ref()
            .map(|m| MembershipRole::try_from(m.role.as_str()))
            .transpose()
    }

    /// Loads an account that exists, whoever owns it.
    pub(super) async fn require_account<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    /// Loads an account the caller belongs to.
    ///
    /// Accounts the caller is not a member of are reported as missing.
    pub(super) async fn require_account_member<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<accounts::Model> {
        if self.membership_role(db, account_id, user_id).await?.is_none() {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        self.require_account(db, account_id).await
    }

    pub(super) async fn require_user<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub(super) async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    /// Members of an account in the order they joined it.
    pub(super) async fn account_members<C: ConnectionTrait>(
        &self,
        db: &C,
        account_id: Uuid,
    ) -> ResultEngine<Vec<User>> {
        let rows = users::Entity::find()
            .join(JoinType::InnerJoin, users::Relation::AccountUsers.def())
            .filter(account_users::Column::AccountId.eq(account_id.to_string()))
            .order_by_asc(account_users::Column::CreatedAt)
            .order_by_asc(users::Column::Id)
            .all(db)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    /// The oldest non-shared account the user owns, if any.
    pub(super) async fn personal_account_of<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<Option<accounts::Model>> {
        accounts::Entity::find()
            .join(JoinType::InnerJoin, accounts::Relation::AccountUsers.def())
            .filter(account_users::Column::UserId.eq(user_id.to_string()))
            .filter(account_users::Column::Role.eq(MembershipRole::Owner.as_str()))
            .filter(accounts::Column::IsShared.eq(false))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Ids of every account the user belongs to.
    pub(super) async fn account_ids_of<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
    ) -> ResultEngine<Vec<String>> {
        let rows = account_users::Entity::find()
            .filter(account_users::Column::UserId.eq(user_id.to_string()))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|m| m.account_id).collect())
    }
}
