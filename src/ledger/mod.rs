pub mod record;
pub mod store;

use hourglass_rs::{SafeTimeProvider, TimeSource};
use std::sync::{Arc, Mutex, PoisonError};

use crate::calendar::PeriodKey;
use crate::errors::{DuesError, Result};
use crate::events::{Event, EventStore};
use crate::types::MemberId;

pub use record::{MarkPaidRequest, PaymentRecord};
pub use store::{InMemoryPaymentStore, PaymentStore};

/// payment records per member and period
///
/// All operations take `&self`; per-row atomicity is delegated to the
/// [`PaymentStore`].
pub struct PaymentLedger {
    store: Arc<dyn PaymentStore>,
    events: Mutex<EventStore>,
}

impl PaymentLedger {
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self {
            store,
            events: Mutex::new(EventStore::new()),
        }
    }

    /// ledger backed by an [`InMemoryPaymentStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryPaymentStore::new()))
    }

    /// mark a period paid with system time
    pub fn mark_paid_now(&self, request: MarkPaidRequest) -> Result<PaymentRecord> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.mark_paid(request, &time)
    }

    /// upsert the payment record for the request's member and period
    ///
    /// `date_paid` is stamped on every call. `verified` follows the presence
    /// of a voucher id. Period text that does not parse under the request's
    /// interval fails with [`DuesError::InvalidPeriod`].
    pub fn mark_paid(
        &self,
        request: MarkPaidRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentRecord> {
        let period_key = PeriodKey::parse(&request.period, request.interval).map_err(|_| {
            DuesError::InvalidPeriod {
                period: request.period.clone(),
                interval: request.interval,
            }
        })?;

        if request.amount.is_negative() {
            return Err(DuesError::InvalidPaymentAmount {
                amount: request.amount,
            });
        }

        let now = time_provider.now();
        let record = PaymentRecord {
            member_id: request.member_id,
            period_key,
            interval: request.interval,
            amount: request.amount,
            date_paid: now,
            verified: request.voucher_id.is_some(),
            voucher_id: request.voucher_id,
        };

        let previous = self.store.upsert(record.clone())?;

        match previous {
            Some(previous) => {
                tracing::info!(
                    member_id = %record.member_id,
                    period = %record.period_key,
                    amount = %record.amount,
                    previous_amount = %previous.amount,
                    verified = record.verified,
                    "payment record updated"
                );
                self.emit(Event::PaymentUpdated {
                    member_id: record.member_id,
                    period_key: record.period_key,
                    previous_amount: previous.amount,
                    amount: record.amount,
                    previous_voucher_id: previous.voucher_id,
                    voucher_id: record.voucher_id.clone(),
                    timestamp: now,
                });
            }
            None => {
                tracing::info!(
                    member_id = %record.member_id,
                    period = %record.period_key,
                    amount = %record.amount,
                    verified = record.verified,
                    "period marked paid"
                );
                self.emit(Event::PaymentMarked {
                    member_id: record.member_id,
                    period_key: record.period_key,
                    amount: record.amount,
                    voucher_id: record.voucher_id.clone(),
                    timestamp: now,
                });
            }
        }

        Ok(record)
    }

    /// delete the record for a period, returning whether one existed
    ///
    /// Unmarking an unpaid period is a no-op.
    pub fn unmark(
        &self,
        member_id: &MemberId,
        period_key: &PeriodKey,
        time_provider: &SafeTimeProvider,
    ) -> Result<bool> {
        match self.store.remove(member_id, period_key)? {
            Some(removed) => {
                tracing::info!(member_id = %member_id, period = %period_key, "payment record removed");
                self.emit(Event::PaymentUnmarked {
                    member_id: *member_id,
                    period_key: *period_key,
                    amount: removed.amount,
                    timestamp: time_provider.now(),
                });
                Ok(true)
            }
            None => {
                tracing::debug!(member_id = %member_id, period = %period_key, "unmark on unpaid period");
                Ok(false)
            }
        }
    }

    pub fn is_paid(&self, member_id: &MemberId, period_key: &PeriodKey) -> Result<bool> {
        Ok(self.store.get(member_id, period_key)?.is_some())
    }

    pub fn get(&self, member_id: &MemberId, period_key: &PeriodKey) -> Result<Option<PaymentRecord>> {
        self.store.get(member_id, period_key)
    }

    /// newest `date_paid` first, at most `limit` records
    pub fn history(&self, member_id: &MemberId, limit: usize) -> Result<Vec<PaymentRecord>> {
        let mut records = self.store.list_for_member(member_id)?;
        records.sort_by(|a, b| {
            b.date_paid
                .cmp(&a.date_paid)
                .then_with(|| b.period_key.cmp(&a.period_key))
        });
        records.truncate(limit);
        Ok(records)
    }

    /// all records of a member, oldest period first
    pub fn records_for(&self, member_id: &MemberId) -> Result<Vec<PaymentRecord>> {
        self.store.list_for_member(member_id)
    }

    /// record with the chronologically latest period, regardless of when it was paid
    pub fn latest_by_period(&self, member_id: &MemberId) -> Result<Option<PaymentRecord>> {
        Ok(self.store.list_for_member(member_id)?.into_iter().max_by(|a, b| a.period_key.cmp(&b.period_key)))
    }

    pub fn find_by_voucher(&self, voucher_id: &str) -> Result<Vec<PaymentRecord>> {
        self.store.find_by_voucher(voucher_id)
    }

    pub(crate) fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit(event);
    }

    /// drain audit events collected so far
    pub fn take_events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ContributionInterval;
    use crate::decimal::Money;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 4, 15, 9, 0, 0).unwrap(),
        ))
    }

    fn monthly(s: &str) -> PeriodKey {
        PeriodKey::parse(s, ContributionInterval::Monthly).unwrap()
    }

    fn request(member_id: MemberId, period: &str) -> MarkPaidRequest {
        MarkPaidRequest::new(member_id, period, ContributionInterval::Monthly, Money::from_major(10))
    }

    #[test]
    fn test_mark_paid_twice_keeps_one_record() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let member_id = Uuid::new_v4();

        ledger.mark_paid(request(member_id, "2024-01"), &time).unwrap();
        ledger.mark_paid(request(member_id, "2024-01"), &time).unwrap();

        assert_eq!(ledger.records_for(&member_id).unwrap().len(), 1);
        assert!(ledger.is_paid(&member_id, &monthly("2024-01")).unwrap());

        let events = ledger.take_events();
        assert!(matches!(events[0], Event::PaymentMarked { .. }));
        assert!(matches!(events[1], Event::PaymentUpdated { .. }));
    }

    #[test]
    fn test_upsert_refreshes_date_amount_and_voucher() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let control = time.test_control().unwrap();
        let member_id = Uuid::new_v4();

        let first = ledger
            .mark_paid(request(member_id, "2024-02").with_voucher("V-1"), &time)
            .unwrap();
        assert!(first.verified);

        control.advance(Duration::days(3));
        let mut second_request = request(member_id, "2024-02");
        second_request.amount = Money::from_major(12);
        let second = ledger.mark_paid(second_request, &time).unwrap();

        assert_eq!(second.amount, Money::from_major(12));
        assert_eq!(second.date_paid, first.date_paid + Duration::days(3));
        assert_eq!(second.voucher_id, None);
        assert!(!second.verified);
        assert_eq!(ledger.get(&member_id, &monthly("2024-02")).unwrap(), Some(second));
    }

    #[test]
    fn test_blank_voucher_is_not_a_link() {
        let ledger = PaymentLedger::in_memory();
        let record = ledger
            .mark_paid(request(Uuid::new_v4(), "2024-02").with_voucher("  "), &test_time())
            .unwrap();
        assert_eq!(record.voucher_id, None);
        assert!(!record.verified);
    }

    #[test]
    fn test_mark_paid_rejects_bad_period_and_amount() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let member_id = Uuid::new_v4();

        let err = ledger.mark_paid(request(member_id, "2024-13"), &time).unwrap_err();
        assert!(matches!(err, DuesError::InvalidPeriod { .. }));

        let mut quarterly = request(member_id, "2024-03");
        quarterly.interval = ContributionInterval::Quarterly;
        assert!(matches!(
            ledger.mark_paid(quarterly, &time).unwrap_err(),
            DuesError::InvalidPeriod { .. }
        ));

        let mut negative = request(member_id, "2024-03");
        negative.amount = Money::from_major(-10);
        assert!(matches!(
            ledger.mark_paid(negative, &time).unwrap_err(),
            DuesError::InvalidPaymentAmount { .. }
        ));
        assert!(ledger.records_for(&member_id).unwrap().is_empty());
    }

    #[test]
    fn test_unmark_is_idempotent() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let member_id = Uuid::new_v4();

        assert!(!ledger.unmark(&member_id, &monthly("2024-01"), &time).unwrap());

        ledger.mark_paid(request(member_id, "2024-01"), &time).unwrap();
        assert!(ledger.unmark(&member_id, &monthly("2024-01"), &time).unwrap());
        assert!(!ledger.unmark(&member_id, &monthly("2024-01"), &time).unwrap());
        assert!(!ledger.is_paid(&member_id, &monthly("2024-01")).unwrap());

        let events = ledger.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], Event::PaymentUnmarked { .. }));
    }

    #[test]
    fn test_history_newest_payment_first() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let control = time.test_control().unwrap();
        let member_id = Uuid::new_v4();

        for period in ["2024-03", "2024-01", "2024-02"] {
            ledger.mark_paid(request(member_id, period), &time).unwrap();
            control.advance(Duration::hours(1));
        }

        let history = ledger.history(&member_id, 10).unwrap();
        let periods: Vec<String> = history.iter().map(|r| r.period_key.to_string()).collect();
        assert_eq!(periods, vec!["2024-02", "2024-01", "2024-03"]);

        assert_eq!(ledger.history(&member_id, 2).unwrap().len(), 2);
        assert!(ledger.history(&Uuid::new_v4(), 5).unwrap().is_empty());
    }

    #[test]
    fn test_latest_by_period_ignores_payment_date() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let control = time.test_control().unwrap();
        let member_id = Uuid::new_v4();

        ledger.mark_paid(request(member_id, "2024-05"), &time).unwrap();
        control.advance(Duration::days(10));
        // back-payment for an older period
        ledger.mark_paid(request(member_id, "2024-01"), &time).unwrap();

        let latest = ledger.latest_by_period(&member_id).unwrap().unwrap();
        assert_eq!(latest.period_key, monthly("2024-05"));
    }

    #[test]
    fn test_find_by_voucher() {
        let ledger = PaymentLedger::in_memory();
        let time = test_time();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        ledger.mark_paid(request(alice, "2024-01").with_voucher("V-7"), &time).unwrap();
        ledger.mark_paid(request(bob, "2024-01").with_voucher("V-8"), &time).unwrap();

        let linked = ledger.find_by_voucher("V-7").unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].member_id, alice);
        assert!(ledger.find_by_voucher("V-9").unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_mark_paid_same_period() {
        let ledger = PaymentLedger::in_memory();
        let member_id = Uuid::new_v4();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let ledger = &ledger;
                scope.spawn(move || {
                    let time = test_time();
                    let mut req = request(member_id, "2024-06");
                    req.amount = Money::from_major(10 + i);
                    ledger.mark_paid(req, &time).unwrap();
                });
            }
        });

        let records = ledger.records_for(&member_id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(ledger.take_events().len(), 8);
    }
}
