mod common;

use common::{balance, engine_with_db, engine_with_file_db, fund, household, money};
use engine::{Currency, Engine, ExpenseCmd};
use sea_orm::Database;

#[tokio::test]
async fn concurrent_expenses_lose_no_update() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    fund(&engine, &h.alice.id, h.casa, "1000", Currency::CupEfectivo).await;

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let engine = engine.clone();
        let user = if i % 2 == 0 {
            h.alice.id.clone()
        } else {
            h.bob.id.clone()
        };
        let (casa, category) = (h.casa, h.category);
        tasks.spawn(async move {
            engine
                .create_expense(ExpenseCmd::new(
                    user,
                    casa,
                    category,
                    money("10"),
                    Currency::CupEfectivo,
                ))
                .await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::CupEfectivo).await,
        money("800")
    );
}

#[tokio::test]
async fn restart_engine_reads_same_state() {
    let (engine, db, url, path) = engine_with_file_db().await;
    let user = engine.new_user("Alice", "alice@example.com").await.unwrap();
    let account = engine.personal_account(&user.id).await.unwrap().id;
    fund(&engine, &user.id, account, "12.34", Currency::UsdEfectivo).await;

    drop(engine);
    drop(db);

    let db2 = Database::connect(&url).await.unwrap();
    let engine2 = Engine::builder().database(db2.clone()).build().await.unwrap();
    assert_eq!(
        balance(&engine2, account, &user.id, Currency::UsdEfectivo).await,
        money("12.34")
    );

    drop(db2);
    let _ = std::fs::remove_file(path);
}
