use dashmap::DashMap;
use std::collections::HashMap;

use crate::calendar::PeriodKey;
use crate::errors::Result;
use crate::ledger::PaymentRecord;
use crate::types::MemberId;

/// persistence seam for payment records
///
/// Implementations must make `upsert` and `remove` atomic per
/// `(member_id, period_key)` so concurrent writers never produce two rows.
pub trait PaymentStore: Send + Sync {
    /// insert or replace the record for its member and period, returning the
    /// replaced record
    fn upsert(&self, record: PaymentRecord) -> Result<Option<PaymentRecord>>;

    /// delete the record, returning it when one existed
    fn remove(&self, member_id: &MemberId, period_key: &PeriodKey) -> Result<Option<PaymentRecord>>;

    fn get(&self, member_id: &MemberId, period_key: &PeriodKey) -> Result<Option<PaymentRecord>>;

    /// all records of a member in ascending period order
    fn list_for_member(&self, member_id: &MemberId) -> Result<Vec<PaymentRecord>>;

    /// records linked to a voucher
    fn find_by_voucher(&self, voucher_id: &str) -> Result<Vec<PaymentRecord>>;
}

/// in-memory store keyed by member
///
/// Each member's records live in one map entry; holding the entry's shard
/// lock serializes writes for that member.
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    records: DashMap<MemberId, HashMap<PeriodKey, PaymentRecord>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// total number of records across members
    pub fn len(&self) -> usize {
        self.records.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PaymentStore for InMemoryPaymentStore {
    fn upsert(&self, record: PaymentRecord) -> Result<Option<PaymentRecord>> {
        let mut member_records = self.records.entry(record.member_id).or_default();
        Ok(member_records.insert(record.period_key, record))
    }

    fn remove(&self, member_id: &MemberId, period_key: &PeriodKey) -> Result<Option<PaymentRecord>> {
        let removed = match self.records.get_mut(member_id) {
            Some(mut member_records) => member_records.remove(period_key),
            None => None,
        };
        self.records.remove_if(member_id, |_, member_records| member_records.is_empty());
        Ok(removed)
    }

    fn get(&self, member_id: &MemberId, period_key: &PeriodKey) -> Result<Option<PaymentRecord>> {
        Ok(self
            .records
            .get(member_id)
            .and_then(|member_records| member_records.get(period_key).cloned()))
    }

    fn list_for_member(&self, member_id: &MemberId) -> Result<Vec<PaymentRecord>> {
        let mut records: Vec<PaymentRecord> = self
            .records
            .get(member_id)
            .map(|member_records| member_records.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.period_key.cmp(&b.period_key));
        Ok(records)
    }

    fn find_by_voucher(&self, voucher_id: &str) -> Result<Vec<PaymentRecord>> {
        let mut found: Vec<PaymentRecord> = self
            .records
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .values()
                    .filter(|record| record.voucher_id.as_deref() == Some(voucher_id))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        found.sort_by(|a, b| a.period_key.cmp(&b.period_key));
        Ok(found)
    }
}
