use chrono::NaiveDate;
use sea_orm::Database;

use engine::{
    AccountListFilter, AccountStanding, AccountType, ApplyMode, Engine, EngineError, MoneyCents,
    NewAccountCmd, NewTransactionCmd, Patch, TransactionType, UpdateAccountCmd,
};
use migration::MigratorTrait;

async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn credit_card_exposure_counts_invoice_and_future_installments() {
    let engine = engine().await;
    let card = engine
        .create_account(NewAccountCmd::new("alice", "Visa", AccountType::CreditCard).limit_cents(100_000))
        .await
        .unwrap();

    for (amount, date) in [(20_000, "2024-03-02"), (10_000, "2024-03-20")] {
        engine
            .create_transaction(
                NewTransactionCmd::new("alice", TransactionType::Expense, amount, date, "Store")
                    .account_id(card.id),
            )
            .await
            .unwrap();
    }
    engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionType::Expense, 10_000, "2024-04-10", "Bike")
                .account_id(card.id)
                .installments(2),
        )
        .await
        .unwrap();
    // Paid records and income never count against the limit.
    engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionType::Expense, 7_000, "2024-03-05", "Paid")
                .account_id(card.id)
                .paid(true),
        )
        .await
        .unwrap();
    engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionType::Income, 3_000, "2024-03-06", "Refund")
                .account_id(card.id),
        )
        .await
        .unwrap();

    let cutoff = Some(day(2024, 4, 30));
    let AccountStanding::Credit(exposure) = engine
        .account_standing("alice", card.id, cutoff)
        .await
        .unwrap()
    else {
        panic!("expected credit exposure");
    };
    assert_eq!(exposure.invoice_cents, MoneyCents::new(35_000));
    assert_eq!(exposure.future_cents, MoneyCents::new(5_000));
    assert_eq!(exposure.remaining_installments, 1);
    assert_eq!(exposure.available_display(), MoneyCents::new(60_000));

    let summaries = engine
        .future_installments("alice", &[card.id], Some(day(2024, 3, 31)))
        .await
        .unwrap();
    assert_eq!(summaries[0].future_amount_cents, MoneyCents::new(10_000));
    assert_eq!(summaries[0].remaining_installments, 2);
}

#[tokio::test]
async fn exposure_follows_payments() {
    let engine = engine().await;
    let card = engine
        .create_account(NewAccountCmd::new("alice", "Master", AccountType::CreditCard).limit_cents(50_000))
        .await
        .unwrap();
    let created = engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionType::Expense, 30_000, "2024-01-10", "TV")
                .account_id(card.id)
                .installments(3),
        )
        .await
        .unwrap();

    let before = engine.account_standing("alice", card.id, None).await.unwrap();
    assert_eq!(before.hint(), "Available limit: R$ 200,00");

    engine
        .set_paid("alice", created[0].id, true, ApplyMode::Single)
        .await
        .unwrap();
    let after = engine.account_standing("alice", card.id, None).await.unwrap();
    assert_eq!(after.hint(), "Available limit: R$ 300,00");
}

#[tokio::test]
async fn overview_and_listing() {
    let engine = engine().await;
    engine
        .create_account(NewAccountCmd::new("alice", "Visa", AccountType::CreditCard).limit_cents(10_000))
        .await
        .unwrap();
    engine
        .create_account(NewAccountCmd::new("alice", "Wallet", AccountType::Cash).balance_cents(2_500))
        .await
        .unwrap();
    engine
        .create_account(
            NewAccountCmd::new("alice", "Old bank", AccountType::BankAccount)
                .balance_cents(1_000)
                .active(false),
        )
        .await
        .unwrap();
    engine
        .create_account(NewAccountCmd::new("bob", "Bob card", AccountType::CreditCard).limit_cents(1))
        .await
        .unwrap();

    let names: Vec<String> = engine
        .list_accounts("alice", AccountListFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.name)
        .collect();
    assert_eq!(names, vec!["Old bank", "Visa", "Wallet"]);

    let active = engine
        .list_accounts("alice", AccountListFilter::active_only())
        .await
        .unwrap();
    assert_eq!(active.len(), 2);

    let overview = engine.accounts_overview("alice", None).await.unwrap();
    assert_eq!(overview.active_accounts, 2);
    assert_eq!(overview.credit_limit_total_cents, MoneyCents::new(10_000));
    assert_eq!(overview.credit_available_total_cents, MoneyCents::new(10_000));
    assert_eq!(overview.declared_balances_total_cents, MoneyCents::new(3_500));
}

#[tokio::test]
async fn account_updates_follow_patch_semantics() {
    let engine = engine().await;
    let card = engine
        .create_account(NewAccountCmd::new("alice", "Visa", AccountType::CreditCard).limit_cents(10_000))
        .await
        .unwrap();

    let renamed = engine
        .update_account(
            "alice",
            card.id,
            UpdateAccountCmd {
                name: Some("  Visa Gold ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Visa Gold");
    assert_eq!(renamed.limit_cents, Some(MoneyCents::new(10_000)));

    let cleared = engine
        .update_account(
            "alice",
            card.id,
            UpdateAccountCmd {
                limit_cents: Patch::Null,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.limit_cents, None);
    assert_eq!(
        engine.account_standing("alice", card.id, None).await.unwrap(),
        AccountStanding::CreditWithoutLimit
    );

    let err = engine
        .update_account(
            "alice",
            card.id,
            UpdateAccountCmd {
                limit_cents: Patch::Value(MoneyCents::new(-5)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let err = engine
        .update_account("bob", card.id, UpdateAccountCmd::default())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn deleting_an_account_keeps_its_transactions() {
    let engine = engine().await;
    let cash = engine
        .create_account(NewAccountCmd::new("alice", "Cash", AccountType::Cash))
        .await
        .unwrap();
    let created = engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionType::Expense, 500, "2024-01-01", "Bus")
                .account_id(cash.id),
        )
        .await
        .unwrap();

    engine.delete_account("alice", cash.id).await.unwrap();

    let tx = engine.transaction("alice", created[0].id).await.unwrap();
    assert_eq!(tx.account_id, None);
    assert!(matches!(
        engine.account("alice", cash.id).await,
        Err(EngineError::NotFound(_))
    ));
}
