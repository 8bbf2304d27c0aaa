use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::Result;
use crate::types::VoucherId;

/// read-only summary of a transaction in the accounting store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: VoucherId,
    pub date: NaiveDate,
    /// signed as booked; matching compares magnitudes
    pub amount: Money,
    /// free-text description or counterparty
    pub description: String,
}

impl TransactionSummary {
    pub fn new(
        id: impl Into<VoucherId>,
        date: NaiveDate,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            amount,
            description: description.into(),
        }
    }

    /// case-insensitive match of `query` against description or id
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.description.to_lowercase().contains(&needle)
            || self.id.to_lowercase() == needle
    }
}

/// accounting transaction store consumed by the matcher
///
/// The dues engine never writes through this trait.
pub trait TransactionStore: Send + Sync {
    /// transactions dated within `[from, to]`, optionally filtered by text
    fn search_transactions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        query: Option<&str>,
    ) -> Result<Vec<TransactionSummary>>;

    fn get_transaction(&self, id: &str) -> Result<Option<TransactionSummary>>;
}

/// in-memory transaction store for tests and demos
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    transactions: DashMap<VoucherId, TransactionSummary>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
        }
    }

    pub fn with_transactions(transactions: impl IntoIterator<Item = TransactionSummary>) -> Self {
        let store = Self::new();
        for transaction in transactions {
            store.insert(transaction);
        }
        store
    }

    pub fn insert(&self, transaction: TransactionSummary) {
        self.transactions.insert(transaction.id.clone(), transaction);
    }

    /// remove a transaction; links pointing at it go stale
    pub fn remove(&self, id: &str) -> Option<TransactionSummary> {
        self.transactions.remove(id).map(|(_, transaction)| transaction)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn search_transactions(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        query: Option<&str>,
    ) -> Result<Vec<TransactionSummary>> {
        let mut found: Vec<TransactionSummary> = self
            .transactions
            .iter()
            .filter(|entry| {
                let transaction = entry.value();
                transaction.date >= from
                    && transaction.date <= to
                    && query.map_or(true, |q| transaction.matches_query(q))
            })
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    fn get_transaction(&self, id: &str) -> Result<Option<TransactionSummary>> {
        Ok(self.transactions.get(id).map(|entry| entry.value().clone()))
    }
}
