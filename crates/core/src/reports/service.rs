//! Summary report generation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tally_shared::types::UserId;
use tracing::debug;

use super::error::ReportError;
use super::types::{SummaryQuery, SummaryReport};
use crate::ledger::{KindTotals, LedgerStore, OccurredRange, Wallet};

/// Service for building reports from the ledger.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn LedgerStore>,
}

impl ReportService {
    /// Creates a new report service.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Builds the summary report for `owner`.
    ///
    /// A transaction at exactly `from` counts toward the period, never the
    /// opening balance. Without `from`, the opening balance is the sum of
    /// initial balances.
    pub async fn summary(
        &self,
        owner: UserId,
        query: SummaryQuery,
    ) -> Result<SummaryReport, ReportError> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(ReportError::InvalidRange { from, to });
        }

        let wallets = self.resolve_wallets(owner, query).await?;

        let before = match query.from {
            Some(from) => {
                self.store
                    .sum_by_kind(owner, query.wallet_id, &OccurredRange::before(from))
                    .await?
            }
            None => KindTotals::default(),
        };

        let window = self
            .store
            .sum_by_kind(
                owner,
                query.wallet_id,
                &OccurredRange::between(query.from, query.to),
            )
            .await?;

        let report = Self::compose_summary(&wallets, before, window);
        debug!(
            owner_id = %owner,
            wallets = report.wallet_ids.len(),
            opening = %report.opening_balance,
            closing = %report.closing_balance,
            "summary report built"
        );
        Ok(report)
    }

    async fn resolve_wallets(
        &self,
        owner: UserId,
        query: SummaryQuery,
    ) -> Result<Vec<Wallet>, ReportError> {
        match query.wallet_id {
            Some(id) => self
                .store
                .find_wallet(owner, id)
                .await?
                .map(|w| vec![w])
                .ok_or(ReportError::WalletNotFound(id)),
            None => {
                let wallets = self.store.list_wallets(owner).await?;
                if wallets.is_empty() {
                    return Err(ReportError::NoWallets);
                }
                Ok(wallets)
            }
        }
    }

    /// Combines wallet baselines with the before-period and in-period sums.
    #[must_use]
    pub fn compose_summary(
        wallets: &[Wallet],
        before: KindTotals,
        window: KindTotals,
    ) -> SummaryReport {
        let baseline: Decimal = wallets.iter().map(|w| w.initial_balance).sum();
        let opening_balance = baseline + before.net();
        let closing_balance = opening_balance + window.net();

        SummaryReport {
            wallet_ids: wallets.iter().map(|w| w.id).collect(),
            opening_balance,
            total_income: window.income,
            total_expense: window.expense,
            closing_balance,
        }
    }
}
