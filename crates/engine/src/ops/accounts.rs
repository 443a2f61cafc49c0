//! Household bootstrap: users, accounts, memberships and categories.
//!
//! None of these move money.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    Account, Category, EngineError, MembershipRole, Money, NewAccountCmd, ResultEngine, User,
    UserIncomesCmd, account_users, accounts, categories, users,
    util::{normalize_required_text, parse_uuid},
};

use super::{Engine, with_tx};

const PERSONAL_ACCOUNT_NAME: &str = "Personal";

impl Engine {
    /// Registers a user together with their default personal account.
    pub async fn new_user(&self, name: &str, email: &str) -> ResultEngine<User> {
        let name = normalize_required_text(name, "name")?;
        let email = normalize_required_text(email, "email")?.to_lowercase();
        if !email.contains('@') {
            return Err(EngineError::Validation(format!("invalid email: {email}")));
        }
        with_tx!(self, |db_tx| {
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::Validation(format!(
                    "email already registered: {email}"
                )));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(email),
                income_percentage: ActiveValue::Set(Decimal::ZERO.to_string()),
                monthly_income_usd: ActiveValue::Set(0),
                monthly_income_usdt: ActiveValue::Set(0),
                monthly_income_cup: ActiveValue::Set(0),
                created_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;

            let account_id = self
                .insert_account(&db_tx, PERSONAL_ACCOUNT_NAME, false, now)
                .await?;
            self.insert_membership(&db_tx, account_id, &model.id, MembershipRole::Owner, now)
                .await?;

            tracing::info!(user_id = %model.id, %account_id, "user registered");
            User::try_from(model)
        })
    }

    /// Creates an account owned by `cmd.owner_id`; `cmd.members` join it as
    /// plain members.
    pub async fn new_account(&self, cmd: NewAccountCmd) -> ResultEngine<Account> {
        let name = normalize_required_text(&cmd.name, "account name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, &cmd.owner_id).await?;
            for member in &cmd.members {
                self.require_user(&db_tx, member).await?;
            }

            let now = Utc::now();
            let account_id = self.insert_account(&db_tx, &name, cmd.is_shared, now).await?;
            self.insert_membership(&db_tx, account_id, &cmd.owner_id, MembershipRole::Owner, now)
                .await?;
            let mut seen = vec![cmd.owner_id.as_str()];
            for member in &cmd.members {
                if seen.contains(&member.as_str()) {
                    continue;
                }
                self.insert_membership(&db_tx, account_id, member, MembershipRole::Member, now)
                    .await?;
                seen.push(member.as_str());
            }

            tracing::info!(%account_id, shared = cmd.is_shared, members = seen.len(), "account created");
            let model = self.require_account(&db_tx, account_id).await?;
            Account::try_from(model)
        })
    }

    /// Updates the allocation weights of a user. Omitted fields keep their value.
    pub async fn update_user_incomes(
        &self,
        user_id: &str,
        cmd: UserIncomesCmd,
    ) -> ResultEngine<User> {
        if let Some(percentage) = cmd.income_percentage
            && !(Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&percentage)
        {
            return Err(EngineError::Validation(
                "income_percentage must be between 0 and 100".to_string(),
            ));
        }
        for income in [
            cmd.monthly_income_usd,
            cmd.monthly_income_usdt,
            cmd.monthly_income_cup,
        ]
        .into_iter()
        .flatten()
        {
            if income.is_negative() {
                return Err(EngineError::Validation(
                    "monthly incomes must be >= 0".to_string(),
                ));
            }
        }

        with_tx!(self, |db_tx| {
            let current = User::try_from(self.require_user(&db_tx, user_id).await?)?;
            let set_money = |value: Option<Money>, current: Money| {
                ActiveValue::Set(value.unwrap_or(current).minor())
            };
            let model = users::ActiveModel {
                id: ActiveValue::Unchanged(current.id.clone()),
                income_percentage: ActiveValue::Set(
                    cmd.income_percentage
                        .unwrap_or(current.income_percentage)
                        .to_string(),
                ),
                monthly_income_usd: set_money(cmd.monthly_income_usd, current.monthly_income_usd),
                monthly_income_usdt: set_money(
                    cmd.monthly_income_usdt,
                    current.monthly_income_usdt,
                ),
                monthly_income_cup: set_money(cmd.monthly_income_cup, current.monthly_income_cup),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            tracing::info!(user_id, "user incomes updated");
            User::try_from(model)
        })
    }

    pub async fn new_category(&self, user_id: &str, name: &str) -> ResultEngine<Category> {
        let name = normalize_required_text(name, "category name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                user_id: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Category::try_from(model)
        })
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        User::try_from(self.require_user(&self.database, user_id).await?)
    }

    /// Returns an account the caller belongs to, with current balances.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        let model = self
            .require_account_member(&self.database, account_id, user_id)
            .await?;
        Account::try_from(model)
    }

    /// The user's default personal account (oldest non-shared account they own).
    pub async fn personal_account(&self, user_id: &str) -> ResultEngine<Account> {
        let model = self
            .personal_account_of(&self.database, user_id)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    async fn insert_account(
        &self,
        db: &DatabaseTransaction,
        name: &str,
        is_shared: bool,
        now: DateTime<Utc>,
    ) -> ResultEngine<Uuid> {
        let model = accounts::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            name: ActiveValue::Set(name.to_string()),
            is_shared: ActiveValue::Set(is_shared),
            balance_usd_zelle: ActiveValue::Set(0),
            balance_usd_efectivo: ActiveValue::Set(0),
            balance_usdt: ActiveValue::Set(0),
            balance_cup_efectivo: ActiveValue::Set(0),
            balance_cup_transferencia: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await?;
        parse_uuid(&model.id, "account")
    }

    async fn insert_membership(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
        role: MembershipRole,
        now: DateTime<Utc>,
    ) -> ResultEngine<()> {
        account_users::ActiveModel {
            account_id: ActiveValue::Set(account_id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            role: ActiveValue::Set(role.as_str().to_string()),
            created_at: ActiveValue::Set(now),
        }
        .insert(db)
        .await?;
        Ok(())
    }
}
