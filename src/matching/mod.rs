pub mod similarity;
pub mod transactions;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::calendar::{PeriodKey, PeriodWindow};
use crate::config::MatchingConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{DuesError, Result};
use crate::types::MemberId;

pub use similarity::name_similarity;
pub use transactions::{InMemoryTransactionStore, TransactionStore, TransactionSummary};

/// payment record a transaction is already linked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedPayment {
    pub member_id: MemberId,
    pub period_key: PeriodKey,
}

/// ranked suggestion for linking a payment to a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub transaction: TransactionSummary,
    /// transaction amount equals the expected amount within tolerance
    pub amount_matches: bool,
    /// transaction is dated inside the period's own window
    pub in_window: bool,
    pub name_similarity: Rate,
    /// similarity reaches the configured minimum
    pub name_matches: bool,
    /// absolute days between the transaction and the nominal due date
    pub days_from_due: i64,
    pub already_linked_to: Vec<LinkedPayment>,
}

impl MatchCandidate {
    fn rank(&self, other: &Self) -> Ordering {
        other
            .amount_matches
            .cmp(&self.amount_matches)
            .then_with(|| other.in_window.cmp(&self.in_window))
            .then_with(|| other.name_similarity.cmp(&self.name_similarity))
            .then_with(|| self.days_from_due.cmp(&other.days_from_due))
            .then_with(|| self.transaction.date.cmp(&other.transaction.date))
            .then_with(|| self.transaction.id.cmp(&other.transaction.id))
    }
}

/// proposes transactions for a due period; never writes
pub struct TransactionMatcher {
    transactions: Arc<dyn TransactionStore>,
    config: MatchingConfig,
}

impl TransactionMatcher {
    pub fn new(transactions: Arc<dyn TransactionStore>, config: MatchingConfig) -> Self {
        Self {
            transactions,
            config,
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// period window widened by the look-back before and the grace margin after
    pub fn search_window(&self, period_key: &PeriodKey) -> PeriodWindow {
        period_key.window().widen(
            i64::from(self.config.look_back_days),
            i64::from(self.config.grace_days),
        )
    }

    /// ranked candidates for paying `amount` for `period_key`
    ///
    /// Ordering: amount match, dated inside the period window, name
    /// similarity, then proximity to the nominal due date.
    pub fn suggest(
        &self,
        member_name: &str,
        amount: Money,
        period_key: &PeriodKey,
    ) -> Result<Vec<MatchCandidate>> {
        let period_window = period_key.window();
        let search_window = self.search_window(period_key);
        let due_date = period_key.nominal_due_date();

        let found =
            self.transactions
                .search_transactions(search_window.start, search_window.end, None)?;
        let scanned = found.len();

        let mut candidates: Vec<MatchCandidate> = found
            .into_iter()
            .map(|transaction| {
                let similarity = name_similarity(member_name, &transaction.description);
                MatchCandidate {
                    amount_matches: transaction
                        .amount
                        .abs()
                        .within(amount.abs(), self.config.amount_tolerance),
                    in_window: period_window.contains(transaction.date),
                    name_matches: similarity >= self.config.min_name_similarity,
                    name_similarity: similarity,
                    days_from_due: (transaction.date - due_date).num_days().abs(),
                    already_linked_to: Vec::new(),
                    transaction,
                }
            })
            .collect();

        candidates.sort_by(|a, b| a.rank(b));
        candidates.truncate(self.config.max_suggestions);

        tracing::debug!(
            period = %period_key,
            from = %search_window.start,
            to = %search_window.end,
            scanned,
            returned = candidates.len(),
            "ranked transaction suggestions"
        );

        Ok(candidates)
    }

    /// unranked text search over a date range
    pub fn search(
        &self,
        query: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TransactionSummary>> {
        if from > to {
            return Err(DuesError::InvalidDateRange { from, to });
        }
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.transactions.search_transactions(from, to, query)
    }
}
