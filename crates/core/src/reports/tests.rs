//! Summary report tests, including property-based checks against replay.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{UserId, WalletId};

use super::error::ReportError;
use super::service::ReportService;
use super::types::SummaryQuery;
use crate::ledger::{CreateTransactionInput, CreateWalletInput, LedgerService, Transaction, TransactionKind};
use crate::memory::InMemoryStore;

fn t(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
}

struct Fixture {
    ledger: LedgerService,
    reports: ReportService,
    owner: UserId,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            ledger: LedgerService::new(store.clone()),
            reports: ReportService::new(store),
            owner: UserId::new(),
        }
    }

    async fn wallet(&self, number: &str, initial: Decimal) -> WalletId {
        self.ledger
            .create_wallet(
                self.owner,
                &CreateWalletInput {
                    name: Some(number.into()),
                    account_number: Some(number.into()),
                    initial_balance: Some(initial),
                    currency: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    async fn book(
        &self,
        wallet: WalletId,
        kind: TransactionKind,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Option<Transaction> {
        self.ledger
            .create_transaction(
                self.owner,
                &CreateTransactionInput {
                    wallet_id: Some(wallet),
                    kind: Some(kind.to_string()),
                    amount: Some(amount),
                    category: Some("test".into()),
                    note: None,
                    occurred_at: Some(at),
                },
            )
            .await
            .ok()
            .map(|r| r.transaction)
    }
}

#[tokio::test]
async fn test_summary_example_window() {
    let f = Fixture::new();
    let w = f.wallet("001", dec!(1000)).await;
    f.book(w, TransactionKind::Income, dec!(500), t(1)).await.unwrap();
    f.book(w, TransactionKind::Expense, dec!(300), t(2)).await.unwrap();

    let report = f
        .reports
        .summary(
            f.owner,
            SummaryQuery {
                wallet_id: Some(w),
                from: Some(t(1)),
                to: Some(t(2)),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.wallet_ids, vec![w]);
    assert_eq!(report.opening_balance, dec!(1000));
    assert_eq!(report.total_income, dec!(500));
    assert_eq!(report.total_expense, dec!(300));
    assert_eq!(report.closing_balance, dec!(1200));
}

#[tokio::test]
async fn test_transaction_at_from_counts_in_window() {
    let f = Fixture::new();
    let w = f.wallet("001", dec!(100)).await;
    f.book(w, TransactionKind::Income, dec!(50), t(3)).await.unwrap();

    let report = f
        .reports
        .summary(
            f.owner,
            SummaryQuery {
                from: Some(t(3)),
                ..SummaryQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(report.opening_balance, dec!(100));
    assert_eq!(report.total_income, dec!(50));

    let later = f
        .reports
        .summary(
            f.owner,
            SummaryQuery {
                from: Some(t(3) + Duration::seconds(1)),
                ..SummaryQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(later.opening_balance, dec!(150));
    assert_eq!(later.total_income, Decimal::ZERO);
}

#[tokio::test]
async fn test_all_wallets_aggregate() {
    let f = Fixture::new();
    let a = f.wallet("A", dec!(100)).await;
    let b = f.wallet("B", dec!(200)).await;
    f.book(a, TransactionKind::Income, dec!(10), t(1)).await.unwrap();
    f.book(b, TransactionKind::Expense, dec!(20), t(1)).await.unwrap();

    let report = f
        .reports
        .summary(f.owner, SummaryQuery::default())
        .await
        .unwrap();
    assert_eq!(report.wallet_ids, vec![a, b]);
    assert_eq!(report.opening_balance, dec!(300));
    assert_eq!(report.closing_balance, dec!(290));
}

#[tokio::test]
async fn test_window_without_transactions() {
    let f = Fixture::new();
    let w = f.wallet("001", dec!(75)).await;
    f.book(w, TransactionKind::Income, dec!(25), t(1)).await.unwrap();

    let report = f
        .reports
        .summary(
            f.owner,
            SummaryQuery {
                wallet_id: Some(w),
                from: Some(t(10)),
                to: Some(t(20)),
            },
        )
        .await
        .unwrap();
    assert_eq!(report.opening_balance, dec!(100));
    assert_eq!(report.total_income, Decimal::ZERO);
    assert_eq!(report.total_expense, Decimal::ZERO);
    assert_eq!(report.closing_balance, dec!(100));
}

#[tokio::test]
async fn test_no_wallets_is_not_found() {
    let f = Fixture::new();
    assert!(matches!(
        f.reports.summary(f.owner, SummaryQuery::default()).await,
        Err(ReportError::NoWallets)
    ));
}

#[tokio::test]
async fn test_foreign_wallet_is_not_found() {
    let f = Fixture::new();
    let w = f.wallet("001", dec!(1)).await;
    let err = f
        .reports
        .summary(
            UserId::new(),
            SummaryQuery {
                wallet_id: Some(w),
                ..SummaryQuery::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::WalletNotFound(id) if id == w));
}

#[tokio::test]
async fn test_inverted_range_rejected() {
    let f = Fixture::new();
    f.wallet("001", dec!(1)).await;
    let err = f
        .reports
        .summary(
            f.owner,
            SummaryQuery {
                wallet_id: None,
                from: Some(t(5)),
                to: Some(t(1)),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidRange { .. }));
}

/// One generated ledger operation: book (kind, cents, day) or delete the n-th booked.
#[derive(Debug, Clone)]
enum Op {
    Book(TransactionKind, i64, i64),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (
            prop_oneof![Just(TransactionKind::Income), Just(TransactionKind::Expense)],
            1i64..500_000,
            0i64..60,
        )
            .prop_map(|(k, c, d)| Op::Book(k, c, d)),
        1 => (0usize..32).prop_map(Op::Delete),
    ]
}

/// Applies `ops` and returns the surviving transactions.
async fn run_ops(f: &Fixture, wallet: WalletId, ops: &[Op]) -> Vec<Transaction> {
    let mut booked: Vec<Transaction> = Vec::new();
    for op in ops {
        match op {
            Op::Book(kind, cents, day) => {
                if let Some(tx) = f.book(wallet, *kind, Decimal::new(*cents, 2), t(*day)).await {
                    booked.push(tx);
                }
            }
            Op::Delete(n) => {
                if !booked.is_empty() {
                    let tx = booked.remove(n % booked.len());
                    f.ledger.delete_transaction(f.owner, tx.id).await.unwrap();
                }
            }
        }
    }
    booked
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Materialized balance equals initial balance plus replayed history, and
    /// an unbounded summary closes at that same balance.
    #[test]
    fn prop_materialized_balance_matches_replay(
        initial in 0i64..1_000_000,
        ops in prop::collection::vec(op(), 0..40),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let f = Fixture::new();
            let initial = Decimal::new(initial, 2);
            let w = f.wallet("001", initial).await;
            let survivors = run_ops(&f, w, &ops).await;

            let replayed: Decimal = initial
                + survivors
                    .iter()
                    .map(|t| crate::ledger::balance::signed_amount(t.kind, t.amount))
                    .sum::<Decimal>();
            let wallet = f.ledger.list_wallets(f.owner).await.unwrap().remove(0);
            assert_eq!(wallet.balance, replayed);
            assert!(wallet.balance >= Decimal::ZERO);

            let report = f.reports.summary(f.owner, SummaryQuery::default()).await.unwrap();
            assert_eq!(report.opening_balance, initial);
            assert_eq!(report.closing_balance, wallet.balance);
        });
    }

    /// Splitting history at `from` loses nothing: opening + window flows equals
    /// the unbounded closing balance, and opening counts only `occurred_at < from`.
    #[test]
    fn prop_split_at_from_is_consistent(
        initial in 0i64..1_000_000,
        ops in prop::collection::vec(op(), 0..40),
        split in 0i64..60,
    ) {
        let rt = runtime();
        rt.block_on(async {
            let f = Fixture::new();
            let initial = Decimal::new(initial, 2);
            let w = f.wallet("001", initial).await;
            let survivors = run_ops(&f, w, &ops).await;
            let from = t(split);

            let report = f
                .reports
                .summary(f.owner, SummaryQuery { wallet_id: Some(w), from: Some(from), to: None })
                .await
                .unwrap();
            let full = f.reports.summary(f.owner, SummaryQuery::default()).await.unwrap();

            let expected_opening = initial
                + survivors
                    .iter()
                    .filter(|t| t.occurred_at < from)
                    .map(|t| crate::ledger::balance::signed_amount(t.kind, t.amount))
                    .sum::<Decimal>();
            assert_eq!(report.opening_balance, expected_opening);
            assert_eq!(report.closing_balance, full.closing_balance);
        });
    }
}
