#![allow(dead_code)]

use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Currency, Engine, IncomeCmd, Money, NewAccountCmd, User, UserIncomesCmd,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_file_db() -> (Engine, DatabaseConnection, String, std::path::PathBuf) {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();

    (engine, db, url, path)
}

/// A second engine on the same database, funding CUP conversions from `principal`.
pub async fn with_principal(db: &DatabaseConnection, principal: Uuid) -> Engine {
    Engine::builder()
        .database(db.clone())
        .principal_account(principal)
        .build()
        .await
        .unwrap()
}

pub fn money(raw: &str) -> Money {
    raw.parse().unwrap()
}

/// Alice (USD income 600) and Bob (USD income 200) share the "Casa" account.
pub struct Household {
    pub alice: User,
    pub bob: User,
    pub alice_personal: Uuid,
    pub bob_personal: Uuid,
    pub casa: Uuid,
    pub category: Uuid,
}

pub async fn household(engine: &Engine) -> Household {
    let alice = engine.new_user("Alice", "alice@example.com").await.unwrap();
    let bob = engine.new_user("Bob", "bob@example.com").await.unwrap();
    engine
        .update_user_incomes(&alice.id, UserIncomesCmd::default().usd(money("600")))
        .await
        .unwrap();
    engine
        .update_user_incomes(&bob.id, UserIncomesCmd::default().usd(money("200")))
        .await
        .unwrap();

    let casa = engine
        .new_account(NewAccountCmd::shared(&alice.id, "Casa").member(&bob.id))
        .await
        .unwrap();
    let alice_personal = engine.personal_account(&alice.id).await.unwrap().id;
    let bob_personal = engine.personal_account(&bob.id).await.unwrap().id;
    let category = engine.new_category(&alice.id, "Food").await.unwrap().id;

    Household {
        alice,
        bob,
        alice_personal,
        bob_personal,
        casa: casa.id,
        category,
    }
}

/// Credits `amount` to an account through a plain income.
pub async fn fund(engine: &Engine, user_id: &str, account_id: Uuid, amount: &str, currency: Currency) {
    engine
        .create_income(
            IncomeCmd::new(user_id, account_id, money(amount), currency).description("seed"),
        )
        .await
        .unwrap();
}

pub async fn balance(engine: &Engine, account_id: Uuid, user_id: &str, currency: Currency) -> Money {
    engine
        .account(account_id, user_id)
        .await
        .unwrap()
        .balance(currency)
}
