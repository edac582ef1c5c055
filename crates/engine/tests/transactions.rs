use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    ApplyMode, CloneTransactionCmd, DateOrder, DeleteTransactionCmd, Engine, EngineError,
    MoneyCents, NewCategoryCmd, NewTransactionCmd, Patch, SeriesMeta, SeriesType,
    TransactionFilter, TransactionPatch, TransactionType, UpdateTransactionCmd,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(amount: i64, date: &str, description: &str) -> NewTransactionCmd {
    NewTransactionCmd::new("alice", TransactionType::Expense, amount, date, description)
}

#[tokio::test]
async fn installment_purchase_is_split_to_the_cent() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_transaction(expense(10_000, "2024-01-31", "Headphones").installments(3))
        .await
        .unwrap();

    let stored = engine
        .list_transactions("alice", &TransactionFilter::default(), DateOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(
        stored.iter().map(|t| t.id).collect::<Vec<_>>(),
        created.iter().map(|t| t.id).collect::<Vec<_>>()
    );

    let amounts: Vec<i64> = stored.iter().map(|t| t.amount_cents.cents()).collect();
    assert_eq!(amounts, vec![3334, 3333, 3333]);
    let dates: Vec<NaiveDate> = stored.iter().map(|t| t.date).collect();
    assert_eq!(dates, vec![day(2024, 1, 31), day(2024, 2, 29), day(2024, 3, 31)]);

    let series_id = stored[0].series_id.unwrap();
    for (index, tx) in stored.iter().enumerate() {
        assert_eq!(tx.series_id, Some(series_id));
        assert_eq!(tx.series_type, SeriesType::Installment);
        assert_eq!(tx.series_sequence, index as u32 + 1);
        assert_eq!(tx.series_total, 3);
        assert_eq!(tx.series_amount_total_cents, MoneyCents::new(10_000));
    }
}

#[tokio::test]
async fn monthly_recurrence_covers_a_year() {
    let (engine, _db) = engine_with_db().await;

    let created = engine
        .create_transaction(expense(5_000, "2024-01-15", "Gym").monthly())
        .await
        .unwrap();
    assert_eq!(created.len(), 12);

    let stored = engine
        .list_transactions(
            "alice",
            &TransactionFilter::default().series_type(SeriesType::Monthly),
            DateOrder::Ascending,
        )
        .await
        .unwrap();
    assert_eq!(stored.len(), 12);
    for (month, tx) in (1..=12).zip(&stored) {
        assert_eq!(tx.date, day(2024, month, 15));
        assert_eq!(tx.amount_cents, MoneyCents::new(5_000));
        assert_eq!(tx.series_amount_total_cents, MoneyCents::new(60_000));
    }
}

#[tokio::test]
async fn invalid_input_stores_nothing() {
    let (engine, _db) = engine_with_db().await;

    let cases = vec![
        expense(10_000, "2024-01-31", "Phone").installments(1),
        expense(10_000, "2024-01-31", "Phone").installments(25),
        expense(-1, "2024-01-31", "Phone"),
        expense(100, "2024-01-31", "   "),
        expense(100, "31/01/2024", "Phone"),
    ];
    for cmd in cases {
        let err = engine.create_transaction(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }

    let unknown_account = expense(100, "2024-01-31", "Phone").account_id(Uuid::new_v4());
    let err = engine.create_transaction(unknown_account).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let stored = engine
        .list_transactions("alice", &TransactionFilter::default(), DateOrder::Descending)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn series_edit_from_here_leaves_past_records_alone() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(expense(5_000, "2024-01-15", "Rent").monthly())
        .await
        .unwrap();
    let target = &created[4];

    let patch = TransactionPatch {
        amount_cents: Some(MoneyCents::new(7_000)),
        description: Some("Rent (new contract)".to_string()),
        ..Default::default()
    };
    let updated = engine
        .update_transaction(
            UpdateTransactionCmd::new(target.id, "alice", patch)
                .apply_mode(ApplyMode::SeriesFromHere)
                .series_meta(target.series_meta().unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(
        updated.iter().map(|t| t.series_sequence).collect::<Vec<_>>(),
        (5..=12).collect::<Vec<_>>()
    );

    let stored = engine
        .list_transactions("alice", &TransactionFilter::default(), DateOrder::Ascending)
        .await
        .unwrap();
    for tx in &stored {
        if tx.series_sequence < 5 {
            assert_eq!(tx.amount_cents, MoneyCents::new(5_000));
            assert_eq!(tx.description, "Rent");
            assert_eq!(tx.series_amount_total_cents, MoneyCents::new(60_000));
        } else {
            assert_eq!(tx.amount_cents, MoneyCents::new(7_000));
            assert_eq!(tx.description, "Rent (new contract)");
            assert_eq!(tx.series_amount_total_cents, MoneyCents::new(84_000));
        }
    }
}

#[tokio::test]
async fn single_edit_touches_one_record() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(expense(9_000, "2024-03-10", "Sofa").installments(3))
        .await
        .unwrap();

    let patch = TransactionPatch {
        amount_cents: Some(MoneyCents::new(1)),
        ..Default::default()
    };
    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(created[1].id, "alice", patch))
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0].amount_cents, MoneyCents::new(1));

    let first = engine.transaction("alice", created[0].id).await.unwrap();
    let last = engine.transaction("alice", created[2].id).await.unwrap();
    assert_eq!(first.amount_cents, MoneyCents::new(3_000));
    assert_eq!(last.amount_cents, MoneyCents::new(3_000));
}

#[tokio::test]
async fn single_record_total_tracks_its_amount() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(expense(1_000, "2024-01-05", "Haircut"))
        .await
        .unwrap();

    let patch = TransactionPatch {
        amount_cents: Some(MoneyCents::new(2_000)),
        ..Default::default()
    };
    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(created[0].id, "alice", patch))
        .await
        .unwrap();
    assert_eq!(updated[0].amount_cents, MoneyCents::new(2_000));
    assert_eq!(updated[0].series_amount_total_cents, MoneyCents::new(2_000));

    let stored = engine.transaction("alice", created[0].id).await.unwrap();
    assert_eq!(stored.series_amount_total_cents, stored.amount_cents);
}

#[tokio::test]
async fn series_scope_requires_a_matching_series() {
    let (engine, _db) = engine_with_db().await;
    let single = engine
        .create_transaction(expense(1_000, "2024-01-01", "Lunch"))
        .await
        .unwrap();
    let err = engine
        .set_paid("alice", single[0].id, true, ApplyMode::SeriesFromHere)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidScope(_)));

    let series = engine
        .create_transaction(expense(6_000, "2024-01-01", "Laptop").installments(6))
        .await
        .unwrap();
    let stale = SeriesMeta {
        series_id: series[2].series_id.unwrap(),
        series_sequence: 1,
    };
    let err = engine
        .delete_transaction(
            DeleteTransactionCmd::new(series[2].id, "alice", ApplyMode::SeriesFromHere)
                .series_meta(stale),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidScope(_)));

    let remaining = engine
        .list_transactions("alice", &TransactionFilter::default(), DateOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(remaining.len(), 7);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let id = Uuid::new_v4();

    let err = engine.transaction("alice", id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound(format!("transaction {id}")));

    let err = engine
        .update_transaction(UpdateTransactionCmd::new(
            id,
            "alice",
            TransactionPatch {
                is_paid: Some(true),
                ..Default::default()
            },
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .delete_transaction(DeleteTransactionCmd::new(id, "alice", ApplyMode::Single))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn explicit_null_clears_and_absent_keeps() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(
            expense(2_500, "2024-05-02", "Pharmacy")
                .notes("receipt in drawer")
                .payment_method("pix"),
        )
        .await
        .unwrap();

    let patch = TransactionPatch {
        notes: Patch::Null,
        ..Default::default()
    };
    let updated = engine
        .update_transaction(UpdateTransactionCmd::new(created[0].id, "alice", patch))
        .await
        .unwrap();
    assert_eq!(updated[0].notes, None);
    assert_eq!(updated[0].payment_method.as_deref(), Some("pix"));
}

#[tokio::test]
async fn deleting_the_tail_keeps_earlier_totals() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(expense(12_000, "2024-01-05", "Course").installments(4))
        .await
        .unwrap();

    let removed = engine
        .delete_transaction(DeleteTransactionCmd::new(
            created[2].id,
            "alice",
            ApplyMode::SeriesFromHere,
        ))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let stored = engine
        .list_transactions("alice", &TransactionFilter::default(), DateOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|t| t.series_total == 4));
    assert_eq!(
        stored.iter().map(|t| t.series_sequence).collect::<Vec<_>>(),
        vec![1, 2]
    );
}

#[tokio::test]
async fn set_paid_from_here_marks_remaining_installments() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(expense(3_000, "2024-01-10", "Tires").installments(3))
        .await
        .unwrap();

    let updated = engine
        .set_paid("alice", created[1].id, true, ApplyMode::SeriesFromHere)
        .await
        .unwrap();
    assert_eq!(updated.len(), 2);
    assert!(updated.iter().all(|t| t.is_paid));

    let first = engine.transaction("alice", created[0].id).await.unwrap();
    assert!(!first.is_paid);
}

#[tokio::test]
async fn clone_copies_a_series_record_as_standalone() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(
            expense(10_000, "2024-01-31", "Groceries")
                .installments(3)
                .payment_method("credit"),
        )
        .await
        .unwrap();

    let copy = engine
        .clone_transaction(CloneTransactionCmd {
            source_id: created[1].id,
            user_id: "alice".to_string(),
            date: day(2024, 6, 1),
            is_paid: true,
        })
        .await
        .unwrap();
    assert_ne!(copy.id, created[1].id);
    assert_eq!(copy.series_type, SeriesType::Single);
    assert_eq!(copy.series_id, None);
    assert_eq!((copy.series_sequence, copy.series_total), (1, 1));
    assert_eq!(copy.amount_cents, MoneyCents::new(3_333));
    assert_eq!(copy.series_amount_total_cents, MoneyCents::new(3_333));
    assert_eq!(copy.payment_method.as_deref(), Some("credit"));

    let stored = engine.transaction("alice", copy.id).await.unwrap();
    assert_eq!(stored.date, day(2024, 6, 1));
    assert!(stored.is_paid);
}

#[tokio::test]
async fn category_must_match_transaction_type() {
    let (engine, _db) = engine_with_db().await;
    let salary = engine
        .create_category(NewCategoryCmd {
            user_id: "alice".to_string(),
            name: "Salary".to_string(),
            kind: TransactionType::Income,
            color: None,
        })
        .await
        .unwrap();

    let err = engine
        .create_transaction(expense(100, "2024-01-01", "Coffee").category_id(salary.id))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let income = NewTransactionCmd::new("alice", TransactionType::Income, 500_000, "2024-01-05", "Pay")
        .category_id(salary.id);
    let created = engine.create_transaction(income).await.unwrap();

    let patch = TransactionPatch {
        kind: Some(TransactionType::Expense),
        ..Default::default()
    };
    let err = engine
        .update_transaction(UpdateTransactionCmd::new(created[0].id, "alice", patch))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    engine.delete_category("alice", salary.id).await.unwrap();
    let detached = engine.transaction("alice", created[0].id).await.unwrap();
    assert_eq!(detached.category_id, None);
}

#[tokio::test]
async fn listing_filters_and_orders() {
    let (engine, _db) = engine_with_db().await;
    engine
        .create_transaction(expense(1_000, "2024-02-10", "Market"))
        .await
        .unwrap();
    engine
        .create_transaction(expense(2_000, "2024-03-10", "Supermarket run"))
        .await
        .unwrap();
    engine
        .create_transaction(
            NewTransactionCmd::new("alice", TransactionType::Income, 9_000, "2024-03-01", "Bonus")
                .paid(true),
        )
        .await
        .unwrap();

    let newest_first = engine
        .list_transactions("alice", &TransactionFilter::default(), DateOrder::Descending)
        .await
        .unwrap();
    assert_eq!(
        newest_first.iter().map(|t| t.date).collect::<Vec<_>>(),
        vec![day(2024, 3, 10), day(2024, 3, 1), day(2024, 2, 10)]
    );

    let march = TransactionFilter::default().between(Some(day(2024, 3, 1)), Some(day(2024, 3, 31)));
    let hits = engine
        .list_transactions("alice", &march, DateOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);

    let search = TransactionFilter::default().search("MARKET");
    let hits = engine
        .list_transactions("alice", &search, DateOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);

    let totals = engine.period_totals("alice", &march).await.unwrap();
    assert_eq!(totals.income_cents, MoneyCents::new(9_000));
    assert_eq!(totals.expense_cents, MoneyCents::new(2_000));
    assert_eq!(totals.balance_cents, MoneyCents::new(7_000));
    assert_eq!(totals.pending_count, 1);

    let backwards = TransactionFilter::default().between(Some(day(2024, 3, 31)), Some(day(2024, 3, 1)));
    let err = engine
        .list_transactions("alice", &backwards, DateOrder::Ascending)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

async fn descriptions(engine: &Engine, term: &str) -> Vec<String> {
    engine
        .list_transactions(
            "alice",
            &TransactionFilter::default().search(term),
            DateOrder::Ascending,
        )
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.description)
        .collect()
}

#[tokio::test]
async fn search_folds_accents_and_treats_wildcards_literally() {
    let (engine, _db) = engine_with_db().await;
    for description in ["Manutenção do carro", "50% off coupon", "500 screws", "gas_station"] {
        engine
            .create_transaction(expense(1_000, "2024-05-02", description))
            .await
            .unwrap();
    }

    assert_eq!(descriptions(&engine, "MANUTENÇÃO").await, vec!["Manutenção do carro"]);
    assert_eq!(descriptions(&engine, "50%").await, vec!["50% off coupon"]);
    assert!(descriptions(&engine, "0_s").await.is_empty());
    assert_eq!(descriptions(&engine, "gas_").await, vec!["gas_station"]);

    let accented = engine
        .list_transactions(
            "alice",
            &TransactionFilter::default().search("manutenção"),
            DateOrder::Ascending,
        )
        .await
        .unwrap();
    let removed = engine
        .delete_transaction(DeleteTransactionCmd::new(accented[0].id, "alice", ApplyMode::Single))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(descriptions(&engine, "CARRO").await.is_empty());
}

#[tokio::test]
async fn users_never_see_each_other() {
    let (engine, _db) = engine_with_db().await;
    let created = engine
        .create_transaction(expense(4_000, "2024-01-01", "Dinner").installments(2))
        .await
        .unwrap();

    let err = engine.transaction("bob", created[0].id).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let err = engine
        .delete_transaction(DeleteTransactionCmd::new(
            created[0].id,
            "bob",
            ApplyMode::SeriesFromHere,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let bobs = engine
        .list_transactions("bob", &TransactionFilter::default(), DateOrder::Ascending)
        .await
        .unwrap();
    assert!(bobs.is_empty());
}
