mod common;

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use common::{engine_with_db, fund, household, money, with_principal};
use engine::{
    Currency, EngineError, ExpenseCmd, IncomeCmd, NewAccountCmd, PaymentMethod, StatisticsFilter,
};
use rust_decimal_macros::dec;

#[tokio::test]
async fn statistics_aggregate_realized_records() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    let rent = engine.new_category(&h.alice.id, "Rent").await.unwrap().id;

    fund(&engine, &h.alice.id, h.alice_personal, "100", Currency::UsdZelle).await;
    engine
        .create_expense(ExpenseCmd::new(
            &h.alice.id,
            h.alice_personal,
            h.category,
            money("30"),
            Currency::UsdZelle,
        ))
        .await
        .unwrap();
    engine
        .create_expense(
            ExpenseCmd::new(
                &h.alice.id,
                h.alice_personal,
                rent,
                money("20"),
                Currency::UsdZelle,
            )
            .payment_method(PaymentMethod::Transfer),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            ExpenseCmd::new(
                &h.alice.id,
                h.alice_personal,
                rent,
                money("500"),
                Currency::UsdZelle,
            )
            .planned(Utc::now()),
        )
        .await
        .unwrap();
    // Bob's records never count for Alice.
    fund(&engine, &h.bob.id, h.casa, "7", Currency::CupEfectivo).await;

    let stats = engine
        .statistics(&h.alice.id, StatisticsFilter::default())
        .await
        .unwrap();

    assert_eq!(stats.totals.expenses.get(Currency::UsdZelle), money("50"));
    assert_eq!(stats.totals.incomes.get(Currency::UsdZelle), money("100"));
    assert_eq!(stats.totals.balance.get(Currency::UsdZelle), money("50"));
    assert_eq!(stats.totals.incomes.get(Currency::CupEfectivo), money("0"));
    assert_eq!(stats.by_payment_method.cash.get(Currency::UsdZelle), money("30"));
    assert_eq!(
        stats.by_payment_method.transfer.get(Currency::UsdZelle),
        money("20")
    );
    assert_eq!(
        stats
            .by_category
            .iter()
            .map(|(name, b)| (name.as_str(), b.get(Currency::UsdZelle)))
            .collect::<BTreeMap<_, _>>(),
        BTreeMap::from([("Food", money("30")), ("Rent", money("20"))])
    );
    let month = Utc::now().format("%Y-%m").to_string();
    assert_eq!(
        stats.monthly_expenses[&month].get(Currency::UsdZelle),
        money("50")
    );
    assert_eq!(
        stats.monthly_incomes[&month].get(Currency::UsdZelle),
        money("100")
    );
    // Personal account plus the shared one.
    assert_eq!(stats.available.get(Currency::UsdZelle), money("50"));
    assert_eq!(stats.available.get(Currency::CupEfectivo), money("7"));
}

#[tokio::test]
async fn statistics_date_range_and_subject() {
    let (engine, _db) = engine_with_db().await;
    let h = household(&engine).await;
    let carol = engine.new_user("Carol", "carol@example.com").await.unwrap();

    let old = Utc.with_ymd_and_hms(2020, 1, 15, 12, 0, 0).unwrap();
    engine
        .create_expense(
            ExpenseCmd::new(
                &h.bob.id,
                h.bob_personal,
                h.category,
                money("12"),
                Currency::CupTransferencia,
            )
            .created_at(old),
        )
        .await
        .unwrap();
    engine
        .create_income(IncomeCmd::new(
            &h.bob.id,
            h.bob_personal,
            money("40"),
            Currency::CupTransferencia,
        ))
        .await
        .unwrap();

    let all = engine
        .statistics(&h.alice.id, StatisticsFilter::default().for_user(&h.bob.id))
        .await
        .unwrap();
    assert_eq!(
        all.totals.expenses.get(Currency::CupTransferencia),
        money("12")
    );
    assert!(all.monthly_expenses.contains_key("2020-01"));

    let recent = engine
        .statistics(
            &h.bob.id,
            StatisticsFilter::default().between(
                Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
                Utc::now(),
            ),
        )
        .await
        .unwrap();
    assert_eq!(
        recent.totals.expenses.get(Currency::CupTransferencia),
        money("0")
    );
    assert_eq!(
        recent.totals.incomes.get(Currency::CupTransferencia),
        money("40")
    );

    let err = engine
        .statistics(&carol.id, StatisticsFilter::default().for_user(&h.bob.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn converted_incomes_count_in_the_cup_bucket() {
    let (engine, db) = engine_with_db().await;
    let h = household(&engine).await;
    let principal = engine
        .new_account(NewAccountCmd::personal(&h.alice.id, "Banco Principal"))
        .await
        .unwrap();
    let engine = with_principal(&db, principal.id).await;

    engine
        .create_income(
            IncomeCmd::new(&h.alice.id, h.casa, money("2"), Currency::UsdZelle)
                .convert_to_cup(dec!(100)),
        )
        .await
        .unwrap();

    let stats = engine
        .statistics(&h.alice.id, StatisticsFilter::default())
        .await
        .unwrap();
    assert_eq!(stats.totals.incomes.get(Currency::UsdZelle), money("0"));
    assert_eq!(
        stats.totals.incomes.get(Currency::CupTransferencia),
        money("200")
    );
}
