mod common;

use chrono::Utc;
use common::{balance, engine_with_db, fund, household, money};
use engine::{
    ChangeAction, Currency, EngineError, ExpenseCmd, Money, TransactionKind, UpdateExpenseCmd,
    UserIncomesCmd,
};

#[tokio::test]
async fn personal_expense_debits_account() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    fund(&engine, &h.alice.id, h.alice_personal, "100", Currency::UsdZelle).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(
                &h.alice.id,
                h.alice_personal,
                h.category,
                money("40"),
                Currency::UsdZelle,
            )
            .description("Lunch"),
        )
        .await
        .unwrap();

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        money("60")
    );
    let txs = engine.transactions_for_reference(expense.id).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TransactionKind::Expense);
    assert_eq!(txs[0].amount, money("40"));
    assert_eq!(txs[0].delta, -money("40"));
    assert_eq!(txs[0].account_id, h.alice_personal);

    let changes = engine.changes_for_entity(expense.id).await.unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].action, ChangeAction::Create);
    assert!(changes[0].old_value.is_none());
    assert!(changes[0].new_value.is_some());
}

#[tokio::test]
async fn expense_may_overdraw_a_bucket() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    engine
        .create_expense(ExpenseCmd::new(
            &h.alice.id,
            h.alice_personal,
            h.category,
            money("15.50"),
            Currency::CupEfectivo,
        ))
        .await
        .unwrap();

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupEfectivo).await,
        -money("15.50")
    );
}

#[tokio::test]
async fn shared_expense_is_split_by_income() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(&h.alice.id, h.casa, h.category, money("80"), Currency::UsdZelle)
                .shared(true)
                .description("Groceries"),
        )
        .await
        .unwrap();

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        -money("60")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        -money("20")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::UsdZelle).await,
        money("0")
    );

    let txs = engine.transactions_for_reference(expense.id).await.unwrap();
    assert_eq!(txs.len(), 2);
    let alice_row = txs.iter().find(|tx| tx.user_id == h.alice.id).unwrap();
    let bob_row = txs.iter().find(|tx| tx.user_id == h.bob.id).unwrap();
    assert_eq!(alice_row.amount, money("60"));
    assert_eq!(alice_row.description.as_deref(), Some("Groceries (75.0%)"));
    assert_eq!(bob_row.amount, money("20"));
    assert_eq!(bob_row.description.as_deref(), Some("Groceries (25.0%)"));
}

#[tokio::test]
async fn shared_flag_on_personal_account_debits_the_account_itself() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(
                &h.bob.id,
                h.bob_personal,
                h.category,
                money("10"),
                Currency::Usdt,
            )
            .shared(true),
        )
        .await
        .unwrap();

    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::Usdt).await,
        -money("10")
    );
    assert_eq!(
        engine
            .transactions_for_reference(expense.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn planned_expense_moves_no_money() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(
                &h.alice.id,
                h.alice_personal,
                h.category,
                money("500"),
                Currency::CupTransferencia,
            )
            .planned(Utc::now()),
        )
        .await
        .unwrap();

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupTransferencia).await,
        money("0")
    );
    assert!(
        engine
            .transactions_for_reference(expense.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert_eq!(engine.changes_for_entity(expense.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_expense_restores_every_share() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(&h.alice.id, h.casa, h.category, money("80"), Currency::UsdZelle)
                .shared(true),
        )
        .await
        .unwrap();

    // Weights changing afterwards must not skew the reversal.
    engine
        .update_user_incomes(
            &h.bob.id,
            engine::UserIncomesCmd::default().usd(money("600")),
        )
        .await
        .unwrap();

    engine.delete_expense(expense.id, &h.alice.id).await.unwrap();

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        money("0")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        money("0")
    );
    assert!(
        engine
            .transactions_for_reference(expense.id)
            .await
            .unwrap()
            .is_empty()
    );
    let err = engine.expense(expense.id, &h.alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let actions: Vec<_> = engine
        .changes_for_entity(expense.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.action)
        .collect();
    assert_eq!(actions, vec![ChangeAction::Create, ChangeAction::Delete]);
}

#[tokio::test]
async fn update_expense_replaces_the_effect() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(&h.alice.id, h.casa, h.category, money("80"), Currency::UsdZelle)
                .shared(true),
        )
        .await
        .unwrap();

    let updated = engine
        .update_expense(UpdateExpenseCmd::new(&h.alice.id, expense.id).amount(money("40")))
        .await
        .unwrap();
    assert_eq!(updated.amount, money("40"));
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        -money("30")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        -money("10")
    );

    // No longer shared: the whole amount hits the shared account itself.
    engine
        .update_expense(UpdateExpenseCmd::new(&h.alice.id, expense.id).shared(false))
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        money("0")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        money("0")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::UsdZelle).await,
        -money("40")
    );

    let txs = engine.transactions_for_reference(expense.id).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].account_id, h.casa);

    let changes = engine.changes_for_entity(expense.id).await.unwrap();
    assert_eq!(changes.len(), 3);
    assert!(changes[1..].iter().all(|c| c.action == ChangeAction::Update));
    assert!(changes[1].old_value.is_some() && changes[1].new_value.is_some());
}

#[tokio::test]
async fn update_to_planned_and_back() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    fund(&engine, &h.alice.id, h.alice_personal, "50", Currency::UsdEfectivo).await;

    let expense = engine
        .create_expense(ExpenseCmd::new(
            &h.alice.id,
            h.alice_personal,
            h.category,
            money("20"),
            Currency::UsdEfectivo,
        ))
        .await
        .unwrap();

    engine
        .update_expense(
            UpdateExpenseCmd::new(&h.alice.id, expense.id)
                .expense_type(engine::ExpenseType::Planned),
        )
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdEfectivo).await,
        money("50")
    );

    engine
        .update_expense(
            UpdateExpenseCmd::new(&h.alice.id, expense.id)
                .expense_type(engine::ExpenseType::Realized)
                .currency(Currency::UsdZelle),
        )
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdEfectivo).await,
        money("50")
    );
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        -money("20")
    );
}

#[tokio::test]
async fn expenses_are_private_to_their_recorder() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(ExpenseCmd::new(
            &h.alice.id,
            h.casa,
            h.category,
            money("5"),
            Currency::CupEfectivo,
        ))
        .await
        .unwrap();

    let err = engine.expense(expense.id, &h.bob.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine
        .delete_expense(expense.id, &h.bob.id)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // Bob is not a member of Alice's personal account.
    let err = engine
        .create_expense(ExpenseCmd::new(
            &h.bob.id,
            h.alice_personal,
            h.category,
            money("5"),
            Currency::CupEfectivo,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupEfectivo).await,
        money("0")
    );
}

#[tokio::test]
async fn rejects_non_positive_amounts_and_unknown_category() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let err = engine
        .create_expense(ExpenseCmd::new(
            &h.alice.id,
            h.alice_personal,
            h.category,
            money("0"),
            Currency::Usdt,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .create_expense(ExpenseCmd::new(
            &h.alice.id,
            h.alice_personal,
            uuid::Uuid::new_v4(),
            money("1"),
            Currency::Usdt,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn no_op_update_leaves_balances_unchanged() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(&h.bob.id, h.casa, h.category, money("33.33"), Currency::UsdZelle)
                .shared(true),
        )
        .await
        .unwrap();
    let alice_before = balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await;
    let bob_before = balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await;
    assert_eq!(alice_before + bob_before, -money("33.33"));

    engine
        .update_expense(UpdateExpenseCmd::new(&h.bob.id, expense.id).description("Market"))
        .await
        .unwrap();

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        alice_before
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        bob_before
    );
}

#[tokio::test]
async fn description_edit_keeps_shares_after_income_change() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new(&h.alice.id, h.casa, h.category, money("80"), Currency::UsdZelle)
                .shared(true),
        )
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        -money("60")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        -money("20")
    );
    let rows_before = engine.transactions_for_reference(expense.id).await.unwrap();

    engine
        .update_user_incomes(&h.bob.id, UserIncomesCmd::default().usd(money("600")))
        .await
        .unwrap();
    let updated = engine
        .update_expense(UpdateExpenseCmd::new(&h.alice.id, expense.id).description("Market"))
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Market"));

    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        -money("60")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        -money("20")
    );
    let rows_after = engine.transactions_for_reference(expense.id).await.unwrap();
    assert_eq!(rows_after, rows_before);

    let changes = engine.changes_for_entity(expense.id).await.unwrap();
    assert_eq!(changes.last().map(|c| c.action), Some(ChangeAction::Update));

    // An amount edit does rebook, now with the current 50/50 weights.
    engine
        .update_expense(UpdateExpenseCmd::new(&h.alice.id, expense.id).amount(money("100")))
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        -money("50")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        -money("50")
    );
}

#[tokio::test]
async fn oversized_weights_reject_shared_expense() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    for user in [&h.alice.id, &h.bob.id] {
        engine
            .update_user_incomes(user, UserIncomesCmd::default().usd(Money::new(i64::MAX)))
            .await
            .unwrap();
    }

    let err = engine
        .create_expense(
            ExpenseCmd::new(
                &h.alice.id,
                h.casa,
                h.category,
                Money::new(1_000_000_000_000),
                Currency::UsdZelle,
            )
            .shared(true),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(_)));
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        money("0")
    );
}
