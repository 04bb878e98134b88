//! Integration tests for the `PostgreSQL` ledger store.
//!
//! Run against a migrated database:
//! `DATABASE_URL=postgres://... cargo test -p tally-db -- --ignored`

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_core::auth::UserStore;
use tally_core::ledger::{
    CreateTransactionInput, LedgerError, LedgerService, LedgerStore, TransactionFilter,
    TransactionKind, UpdateWalletInput,
};
use tally_core::reports::{ReportService, SummaryQuery};
use tally_db::DbStore;

use common::{create_user, create_wallet, setup_db};

fn tx(
    wallet: tally_shared::types::WalletId,
    kind: TransactionKind,
    amount: Decimal,
    day: u32,
) -> CreateTransactionInput {
    CreateTransactionInput {
        wallet_id: Some(wallet),
        kind: Some(kind.to_string()),
        amount: Some(amount),
        category: Some("test".to_string()),
        note: None,
        occurred_at: Some(Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()),
    }
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_record_and_remove_updates_balance() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let service = LedgerService::new(store.clone());
    let owner = create_user(&store).await;
    let wallet = create_wallet(&service, owner, "DB-001", dec!(1000)).await;

    let income = service
        .create_transaction(owner, &tx(wallet.id, TransactionKind::Income, dec!(500), 1))
        .await
        .unwrap();
    assert_eq!(income.wallet.balance, dec!(1500));

    let expense = service
        .create_transaction(owner, &tx(wallet.id, TransactionKind::Expense, dec!(300), 2))
        .await
        .unwrap();
    assert_eq!(expense.wallet.balance, dec!(1200));

    let err = service
        .create_transaction(owner, &tx(wallet.id, TransactionKind::Expense, dec!(2000), 3))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));

    let removed = service
        .delete_transaction(owner, income.transaction.id)
        .await
        .unwrap();
    assert_eq!(removed.wallet.unwrap().balance, dec!(700));

    let history = service.history(owner, Some(wallet.id), None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, expense.transaction.id);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_records_are_scoped_to_owner() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let service = LedgerService::new(store.clone());
    let alice = create_user(&store).await;
    let bob = create_user(&store).await;
    let wallet = create_wallet(&service, alice, "DB-002", dec!(100)).await;

    assert!(store.find_wallet(bob, wallet.id).await.unwrap().is_none());
    let err = service
        .create_transaction(bob, &tx(wallet.id, TransactionKind::Income, dec!(1), 1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::WalletNotFound(_)));

    // Both users may use the same account number.
    create_wallet(&service, bob, "DB-002", dec!(0)).await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_duplicate_account_number_is_rejected() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let service = LedgerService::new(store.clone());
    let owner = create_user(&store).await;
    create_wallet(&service, owner, "DUP", dec!(0)).await;
    let other = create_wallet(&service, owner, "OTHER", dec!(0)).await;

    let err = service
        .update_wallet(
            owner,
            other.id,
            &UpdateWalletInput {
                account_number: Some("DUP".to_string()),
                ..UpdateWalletInput::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateAccountNumber(_)));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_delete_wallet_cascades() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let service = LedgerService::new(store.clone());
    let owner = create_user(&store).await;
    let wallet = create_wallet(&service, owner, "CASCADE", dec!(50)).await;
    for day in 1..=3 {
        service
            .create_transaction(owner, &tx(wallet.id, TransactionKind::Income, dec!(10), day))
            .await
            .unwrap();
    }

    assert_eq!(service.delete_wallet(owner, wallet.id).await.unwrap(), 3);
    let left = service
        .list_transactions(owner, &TransactionFilter::default())
        .await
        .unwrap();
    assert!(left.is_empty());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_summary_matches_materialized_balance() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let ledger = LedgerService::new(store.clone());
    let reports = ReportService::new(store.clone());
    let owner = create_user(&store).await;
    let wallet = create_wallet(&ledger, owner, "SUM", dec!(1000)).await;

    ledger
        .create_transaction(owner, &tx(wallet.id, TransactionKind::Income, dec!(500), 1))
        .await
        .unwrap();
    ledger
        .create_transaction(owner, &tx(wallet.id, TransactionKind::Expense, dec!(200), 10))
        .await
        .unwrap();
    ledger
        .create_transaction(owner, &tx(wallet.id, TransactionKind::Income, dec!(50), 20))
        .await
        .unwrap();

    let report = reports
        .summary(
            owner,
            SummaryQuery {
                wallet_id: Some(wallet.id),
                from: Some(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()),
                to: Some(Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap()),
            },
        )
        .await
        .unwrap();
    assert_eq!(report.opening_balance, dec!(1500));
    assert_eq!(report.total_income, dec!(0));
    assert_eq!(report.total_expense, dec!(200));
    assert_eq!(report.closing_balance, dec!(1300));

    let full = reports
        .summary(owner, SummaryQuery::default())
        .await
        .unwrap();
    let wallets = ledger.list_wallets(owner).await.unwrap();
    assert_eq!(full.closing_balance, wallets[0].balance);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_concurrent_expenses_never_overdraw() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let service = LedgerService::new(store.clone());
    let owner = create_user(&store).await;
    let wallet = create_wallet(&service, owner, "RACE", dec!(100)).await;

    let attempts = (0..20).map(|_| {
        let service = service.clone();
        let input = tx(wallet.id, TransactionKind::Expense, dec!(15), 5);
        async move { service.create_transaction(owner, &input).await }
    });
    let results = join_all(attempts).await;

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::InsufficientFunds { .. })))
        .count();
    assert_eq!(accepted, 6);
    assert_eq!(accepted + rejected, 20);

    let balance = store.find_wallet(owner, wallet.id).await.unwrap().unwrap().balance;
    assert_eq!(balance, dec!(10));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_user_lookup_by_subject() {
    let store = DbStore::new(setup_db().await);
    let id = create_user(&store).await;
    let user = store.find_user(id).await.unwrap().unwrap();

    let by_subject = store
        .find_user_by_subject(&user.external_subject)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_subject.id, id);

    let updated = store
        .update_profile(id, "Renamed".to_string(), Some("https://a/b.png".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.display_name, "Renamed");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_fractional_amounts_keep_balance_identity() {
    let store = Arc::new(DbStore::new(setup_db().await));
    let ledger = LedgerService::new(store.clone());
    let reports = ReportService::new(store.clone());
    let owner = create_user(&store).await;
    let wallet = create_wallet(&ledger, owner, "FRACTION", dec!(1)).await;

    for (kind, amount) in [
        (TransactionKind::Expense, dec!(0.0001)),
        (TransactionKind::Expense, dec!(0.0001)),
        (TransactionKind::Income, dec!(0.0123)),
    ] {
        ledger
            .create_transaction(owner, &tx(wallet.id, kind, amount, 1))
            .await
            .unwrap();
    }

    // Amounts the columns would round or overflow never reach the database.
    for amount in [dec!(0.00005), dec!(0.00001), dec!(1000000000000000000)] {
        let err = ledger
            .create_transaction(owner, &tx(wallet.id, TransactionKind::Income, amount, 2))
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{amount}: {err}");
    }

    let balance = store.find_wallet(owner, wallet.id).await.unwrap().unwrap().balance;
    assert_eq!(balance, dec!(1.0121));

    let replayed = reports
        .summary(
            owner,
            SummaryQuery {
                wallet_id: Some(wallet.id),
                ..SummaryQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(replayed.closing_balance, balance);
}
