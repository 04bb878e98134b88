//! Property-based tests for LedgerService.
//!
//! - Create then delete restores the wallet balance exactly
//! - A rejected expense leaves the wallet untouched
//! - Concurrent expenses never overdraw a wallet
//! - Amounts of any scale are either refused or keep the balance identity

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{UserId, WalletId, check_money};

use super::error::LedgerError;
use super::service::LedgerService;
use super::types::{CreateTransactionInput, CreateWalletInput, TransactionKind};
use crate::memory::InMemoryStore;
use crate::reports::{ReportService, SummaryQuery};

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts with 0 to 8 fractional digits, from tiny fractions up to
/// magnitudes far beyond what a wallet can hold.
fn any_scale_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..100_000_000i64, 0u32..=8).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale)),
        (1i64..=i64::MAX, 0u32..=6).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale)),
    ]
}

fn kind_strategy() -> impl Strategy<Value = TransactionKind> {
    prop_oneof![Just(TransactionKind::Income), Just(TransactionKind::Expense)]
}

fn make_input(wallet: WalletId, kind: TransactionKind, amount: Decimal) -> CreateTransactionInput {
    CreateTransactionInput {
        wallet_id: Some(wallet),
        kind: Some(kind.to_string()),
        amount: Some(amount),
        category: Some("prop".into()),
        note: None,
        occurred_at: Some(Utc::now()),
    }
}

async fn setup(initial: Decimal) -> (LedgerService, UserId, WalletId) {
    setup_in(Arc::new(InMemoryStore::new()), initial).await
}

async fn setup_in(store: Arc<InMemoryStore>, initial: Decimal) -> (LedgerService, UserId, WalletId) {
    let service = LedgerService::new(store);
    let owner = UserId::new();
    let wallet = service
        .create_wallet(
            owner,
            &CreateWalletInput {
                name: Some("Prop".into()),
                account_number: Some("P-1".into()),
                initial_balance: Some(initial),
                currency: None,
            },
        )
        .await
        .unwrap();
    (service, owner, wallet.id)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Deleting a freshly recorded transaction restores the previous balance.
    #[test]
    fn prop_create_then_delete_restores_balance(
        initial in positive_amount(),
        kind in kind_strategy(),
        amount in positive_amount(),
    ) {
        block_on(async {
            let (service, owner, wallet) = setup(initial).await;
            match service.create_transaction(owner, &make_input(wallet, kind, amount)).await {
                Ok(recorded) => {
                    let removed = service
                        .delete_transaction(owner, recorded.transaction.id)
                        .await
                        .unwrap();
                    assert_eq!(removed.wallet.unwrap().balance, initial);
                }
                Err(LedgerError::InsufficientFunds { balance, requested }) => {
                    assert_eq!(balance, initial);
                    assert!(requested > initial);
                    let wallets = service.list_wallets(owner).await.unwrap();
                    assert_eq!(wallets[0].balance, initial);
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        });
    }

    /// Many expenses racing on one wallet never drive it below zero, and the
    /// final balance matches the expenses that were accepted.
    #[test]
    fn prop_concurrent_expenses_never_overdraw(
        initial in positive_amount(),
        amounts in prop::collection::vec(positive_amount(), 1..20),
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .build()
            .unwrap();
        rt.block_on(async {
            let (service, owner, wallet) = setup(initial).await;
            let handles: Vec<_> = amounts
                .iter()
                .map(|amount| {
                    let service = service.clone();
                    let input = make_input(wallet, TransactionKind::Expense, *amount);
                    tokio::spawn(async move { service.create_transaction(owner, &input).await })
                })
                .collect();

            let mut spent = Decimal::ZERO;
            for handle in handles {
                if let Ok(recorded) = handle.await.unwrap() {
                    spent += recorded.transaction.amount;
                }
            }

            let balance = service.list_wallets(owner).await.unwrap()[0].balance;
            assert!(balance >= Decimal::ZERO);
            assert_eq!(balance, initial - spent);
        });
    }

    /// Every amount is either refused as invalid input or booked exactly,
    /// and the replayed summary always closes at the stored balance.
    #[test]
    fn prop_any_scale_amount_rejected_or_balanced(
        initial in positive_amount(),
        ops in prop::collection::vec((kind_strategy(), any_scale_amount()), 1..12),
    ) {
        block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let reports = ReportService::new(store.clone());
            let (service, owner, wallet) = setup_in(store, initial).await;

            for (kind, amount) in ops {
                match service.create_transaction(owner, &make_input(wallet, kind, amount)).await {
                    Ok(recorded) => {
                        assert_eq!(recorded.transaction.amount, amount);
                        assert!(check_money(recorded.transaction.amount).is_ok());
                        assert!(check_money(recorded.wallet.balance).is_ok());
                    }
                    Err(LedgerError::InsufficientFunds { .. }) => {}
                    Err(err) => assert!(err.is_validation(), "{amount}: {err}"),
                }
            }

            let balance = service.list_wallets(owner).await.unwrap()[0].balance;
            let summary = reports.summary(owner, SummaryQuery::default()).await.unwrap();
            assert_eq!(summary.closing_balance, balance);
        });
    }
}
