mod common;

use common::{balance, engine_with_db, fund, household, money};
use engine::{
    ChangeAction, Currency, DebtCmd, EngineError, LoanCmd, PayDebtCmd, PayLoanCmd,
    TransactionKind, TransferCmd,
};
use rust_decimal_macros::dec;

#[tokio::test]
async fn loan_is_repaid_in_two_payments() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    fund(&engine, &h.alice.id, h.alice_personal, "1000", Currency::CupTransferencia).await;

    let loan = engine
        .create_loan(
            LoanCmd::new(
                &h.alice.id,
                &h.bob.id,
                h.alice_personal,
                h.casa,
                money("100"),
                Currency::CupTransferencia,
            )
            .description("Rent advance"),
        )
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupTransferencia).await,
        money("900")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::CupTransferencia).await,
        money("100")
    );

    let loan = engine
        .pay_loan(PayLoanCmd::new(&h.bob.id, loan.id, money("40")))
        .await
        .unwrap();
    assert_eq!(loan.paid_amount, money("40"));
    assert!(!loan.is_paid);
    assert!(loan.paid_date.is_none());
    assert_eq!(
        balance(&engine, h.casa, &h.bob.id, Currency::CupTransferencia).await,
        money("60")
    );

    let loan = engine
        .pay_loan(PayLoanCmd::new(&h.alice.id, loan.id, money("60")))
        .await
        .unwrap();
    assert_eq!(loan.paid_amount, money("100"));
    assert!(loan.is_paid);
    assert!(loan.paid_date.is_some());
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupTransferencia).await,
        money("1000")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::CupTransferencia).await,
        money("0")
    );

    let err = engine
        .pay_loan(PayLoanCmd::new(&h.bob.id, loan.id, money("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let kinds: Vec<_> = engine
        .transactions_for_reference(loan.id)
        .await
        .unwrap()
        .into_iter()
        .map(|tx| tx.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TransactionKind::Loan,
            TransactionKind::LoanPayment,
            TransactionKind::LoanPayment,
        ]
    );
    let changes = engine.changes_for_entity(loan.id).await.unwrap();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0].action, ChangeAction::Create);
}

#[tokio::test]
async fn loan_payment_in_another_currency() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let loan = engine
        .create_loan(LoanCmd::new(
            &h.alice.id,
            &h.bob.id,
            h.alice_personal,
            h.bob_personal,
            money("1200"),
            Currency::CupEfectivo,
        ))
        .await
        .unwrap();

    let err = engine
        .pay_loan(PayLoanCmd::new(&h.bob.id, loan.id, money("10")).in_currency(
            Currency::UsdZelle,
            dec!(0),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let loan = engine
        .pay_loan(
            PayLoanCmd::new(&h.bob.id, loan.id, money("10"))
                .in_currency(Currency::UsdZelle, dec!(120)),
        )
        .await
        .unwrap();
    assert!(loan.is_paid);
    assert_eq!(loan.paid_amount, money("1200"));
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::UsdZelle).await,
        -money("10")
    );
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::UsdZelle).await,
        money("10")
    );
    assert_eq!(
        balance(&engine, h.bob_personal, &h.bob.id, Currency::CupEfectivo).await,
        money("1200")
    );
}

#[tokio::test]
async fn only_the_giver_deletes_a_loan() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    let carol = engine.new_user("Carol", "carol@example.com").await.unwrap();

    let loan = engine
        .create_loan(LoanCmd::new(
            &h.alice.id,
            &h.bob.id,
            h.alice_personal,
            h.casa,
            money("100"),
            Currency::CupTransferencia,
        ))
        .await
        .unwrap();
    engine
        .pay_loan(PayLoanCmd::new(&h.bob.id, loan.id, money("30")))
        .await
        .unwrap();

    let err = engine.delete_loan(loan.id, &h.bob.id).await.unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized(_)));
    let err = engine.delete_loan(loan.id, &carol.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    let err = engine.loan(loan.id, &carol.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    engine.delete_loan(loan.id, &h.alice.id).await.unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupTransferencia).await,
        money("0")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::CupTransferencia).await,
        money("0")
    );
    let err = engine.loan(loan.id, &h.alice.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn loan_requires_source_membership_and_distinct_accounts() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let err = engine
        .create_loan(LoanCmd::new(
            &h.bob.id,
            &h.alice.id,
            h.alice_personal,
            h.bob_personal,
            money("1"),
            Currency::Usdt,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_loan(LoanCmd::new(
            &h.bob.id,
            &h.alice.id,
            h.bob_personal,
            h.bob_personal,
            money("1"),
            Currency::Usdt,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    // Destination only has to exist.
    engine
        .create_loan(LoanCmd::new(
            &h.bob.id,
            &h.alice.id,
            h.bob_personal,
            h.alice_personal,
            money("1"),
            Currency::Usdt,
        ))
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::Usdt).await,
        money("1")
    );
}

#[tokio::test]
async fn debt_payments_do_not_touch_balances() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    fund(&engine, &h.alice.id, h.alice_personal, "500", Currency::CupEfectivo).await;

    let debt = engine
        .create_debt(
            DebtCmd::new(
                &h.alice.id,
                h.alice_personal,
                money("200"),
                Currency::CupEfectivo,
                "Tienda",
            )
            .description("Fridge"),
        )
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupEfectivo).await,
        money("300")
    );
    let txs = engine.transactions_for_reference(debt.id).await.unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TransactionKind::Debt);
    assert_eq!(txs[0].amount, -money("200"));

    let debt = engine
        .pay_debt(PayDebtCmd::new(&h.alice.id, debt.id, money("50")))
        .await
        .unwrap();
    assert_eq!(debt.paid_amount, money("50"));
    assert!(!debt.is_paid);
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupEfectivo).await,
        money("300")
    );

    let debt = engine
        .pay_debt(PayDebtCmd::new(&h.alice.id, debt.id, money("150")))
        .await
        .unwrap();
    assert!(debt.is_paid);
    assert!(debt.paid_date.is_some());
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::CupEfectivo).await,
        money("300")
    );

    let err = engine
        .pay_debt(PayDebtCmd::new(&h.alice.id, debt.id, money("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let payments: Vec<_> = engine
        .transactions_for_reference(debt.id)
        .await
        .unwrap()
        .into_iter()
        .filter(|tx| tx.kind == TransactionKind::DebtPayment)
        .map(|tx| (tx.amount, tx.delta))
        .collect();
    assert_eq!(
        payments,
        vec![
            (money("50"), money("0")),
            (money("150"), money("0")),
        ]
    );

    let err = engine.debt(debt.id, &h.bob.id).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn deleting_an_unpaid_debt_restores_the_outstanding_amount() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;

    let debt = engine
        .create_debt(DebtCmd::new(
            &h.bob.id,
            h.casa,
            money("80"),
            Currency::UsdEfectivo,
            "Vecino",
        ))
        .await
        .unwrap();
    engine
        .pay_debt(PayDebtCmd::new(&h.bob.id, debt.id, money("30")))
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.casa, &h.bob.id, Currency::UsdEfectivo).await,
        -money("80")
    );

    engine.delete_debt(debt.id, &h.bob.id).await.unwrap();
    assert_eq!(
        balance(&engine, h.casa, &h.bob.id, Currency::UsdEfectivo).await,
        -money("30")
    );
    let actions: Vec<_> = engine
        .changes_for_entity(debt.id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.action)
        .collect();
    assert_eq!(
        actions,
        vec![ChangeAction::Create, ChangeAction::Update, ChangeAction::Delete]
    );

    let err = engine
        .create_debt(DebtCmd::new(
            &h.bob.id,
            h.casa,
            money("1"),
            Currency::UsdEfectivo,
            "   ",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn transfer_never_overdraws() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    fund(&engine, &h.alice.id, h.alice_personal, "30", Currency::Usdt).await;

    let err = engine
        .create_transfer(TransferCmd::new(
            &h.alice.id,
            h.alice_personal,
            h.casa,
            money("50"),
            Currency::Usdt,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientFunds(_)));
    assert_eq!(err.kind(), engine::ErrorKind::InsufficientFunds);
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::Usdt).await,
        money("30")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::Usdt).await,
        money("0")
    );

    let transfer = engine
        .create_transfer(
            TransferCmd::new(
                &h.alice.id,
                h.alice_personal,
                h.casa,
                money("30"),
                Currency::Usdt,
            )
            .description("Household pot"),
        )
        .await
        .unwrap();
    assert_eq!(
        balance(&engine, h.alice_personal, &h.alice.id, Currency::Usdt).await,
        money("0")
    );
    assert_eq!(
        balance(&engine, h.casa, &h.alice.id, Currency::Usdt).await,
        money("30")
    );

    let mut deltas: Vec<_> = engine
        .transactions_for_reference(transfer.id)
        .await
        .unwrap()
        .into_iter()
        .map(|tx| (tx.account_id == h.casa, tx.delta))
        .collect();
    deltas.sort();
    assert_eq!(
        deltas,
        vec![(false, -money("30")), (true, money("30"))]
    );
    assert!(
        engine
            .changes_for_entity(transfer.id)
            .await
            .unwrap()
            .is_empty()
    );
}
