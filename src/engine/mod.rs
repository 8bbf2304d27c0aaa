//! Caller-facing facade over the dues components.
//!
//! [`DuesEngine`] resolves members through a [`MemberDirectory`], reads
//! transactions through a [`TransactionStore`] and owns the
//! [`PaymentLedger`]. Every period key accepted as text is validated before
//! use.

pub mod batch;
pub mod directory;

use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::calendar::{ContributionInterval, PeriodKey};
use crate::config::DuesConfig;
use crate::decimal::Money;
use crate::errors::{DuesError, Result};
use crate::events::{Event, MismatchSource};
use crate::ledger::{
    InMemoryPaymentStore, MarkPaidRequest, PaymentLedger, PaymentRecord, PaymentStore,
};
use crate::matching::{
    InMemoryTransactionStore, LinkedPayment, MatchCandidate, TransactionMatcher, TransactionStore,
    TransactionSummary,
};
use crate::schedule::DueSchedule;
use crate::serialization::{BillingRunView, MemberDuesView};
use crate::status::{StatusAggregator, StatusSummary, TimelineEntry};
use crate::types::{Member, MemberId, VoucherId};

pub use batch::{DueRow, PeriodSelector};
pub use directory::{InMemoryMemberDirectory, MemberDirectory};

/// soft findings attached to a successful mark-paid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DuesWarning {
    /// paid amount differs from the expected one by more than the threshold
    AmountMismatch {
        expected: Money,
        actual: Money,
        source: MismatchSource,
    },
    /// voucher id not present in the transaction store
    UnknownVoucher { voucher_id: VoucherId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkPaidOutcome {
    pub record: PaymentRecord,
    pub warnings: Vec<DuesWarning>,
}

impl MarkPaidOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// result of re-validating a payment's voucher link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkStatus {
    /// no record, or a record without voucher
    Unlinked,
    Linked(TransactionSummary),
    /// the linked transaction no longer exists; treat as no transaction
    Stale { voucher_id: VoucherId },
}

pub struct DuesEngine {
    config: DuesConfig,
    members: Arc<dyn MemberDirectory>,
    transactions: Arc<dyn TransactionStore>,
    ledger: PaymentLedger,
    matcher: TransactionMatcher,
}

impl DuesEngine {
    pub fn builder() -> DuesEngineBuilder {
        DuesEngineBuilder::new()
    }

    pub fn config(&self) -> &DuesConfig {
        &self.config
    }

    pub fn ledger(&self) -> &PaymentLedger {
        &self.ledger
    }

    pub fn matcher(&self) -> &TransactionMatcher {
        &self.matcher
    }

    fn member(&self, member_id: &MemberId) -> Result<Member> {
        self.members
            .get_member(member_id)?
            .ok_or(DuesError::MemberNotFound {
                member_id: *member_id,
            })
    }

    fn status_aggregator(&self) -> StatusAggregator<'_> {
        StatusAggregator::new(&self.ledger)
    }

    pub fn generate_schedule(&self, member_id: &MemberId, as_of: NaiveDate) -> Result<DueSchedule> {
        let member = self.member(member_id)?;
        Ok(DueSchedule::generate(&member, as_of))
    }

    pub fn get_status(&self, member_id: &MemberId, as_of: NaiveDate) -> Result<StatusSummary> {
        let member = self.member(member_id)?;
        self.status_aggregator().status(&member, as_of)
    }

    pub fn get_timeline(
        &self,
        member_id: &MemberId,
        as_of: NaiveDate,
        past: u32,
        future: u32,
    ) -> Result<Vec<TimelineEntry>> {
        let member = self.member(member_id)?;
        self.status_aggregator().timeline(&member, as_of, past, future)
    }

    /// timeline with the configured window sizes
    pub fn get_default_timeline(
        &self,
        member_id: &MemberId,
        as_of: NaiveDate,
    ) -> Result<Vec<TimelineEntry>> {
        let window = &self.config.timeline;
        self.get_timeline(member_id, as_of, window.past_periods, window.future_periods)
    }

    pub fn mark_paid_now(&self, request: MarkPaidRequest) -> Result<MarkPaidOutcome> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.mark_paid(request, &time)
    }

    /// mark a period paid, optionally linking a transaction
    ///
    /// The supplied amount is stored as given. Divergence from the member's
    /// nominal contribution or from the linked transaction, and voucher ids
    /// the transaction store does not know, come back as warnings.
    pub fn mark_paid(
        &self,
        request: MarkPaidRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<MarkPaidOutcome> {
        let member = self.member(&request.member_id)?;
        let record = self.ledger.mark_paid(request, time_provider)?;
        let threshold = self.config.matching.mismatch_threshold;
        let mut warnings = Vec::new();

        if let Some(terms) = member.billing() {
            if terms.interval == record.interval && !record.amount.within(terms.amount, threshold) {
                warnings.push(DuesWarning::AmountMismatch {
                    expected: terms.amount,
                    actual: record.amount,
                    source: MismatchSource::Schedule,
                });
            }
        }

        if let Some(voucher_id) = &record.voucher_id {
            match self.transactions.get_transaction(voucher_id)? {
                Some(transaction) => {
                    let booked = transaction.amount.abs();
                    if !record.amount.within(booked, threshold) {
                        warnings.push(DuesWarning::AmountMismatch {
                            expected: booked,
                            actual: record.amount,
                            source: MismatchSource::Transaction,
                        });
                    }
                }
                None => warnings.push(DuesWarning::UnknownVoucher {
                    voucher_id: voucher_id.clone(),
                }),
            }
        }

        for warning in &warnings {
            self.record_warning(&record, warning, time_provider);
        }

        Ok(MarkPaidOutcome { record, warnings })
    }

    fn record_warning(
        &self,
        record: &PaymentRecord,
        warning: &DuesWarning,
        time_provider: &SafeTimeProvider,
    ) {
        match warning {
            DuesWarning::AmountMismatch {
                expected,
                actual,
                source,
            } => {
                tracing::warn!(
                    member_id = %record.member_id,
                    period = %record.period_key,
                    expected = %expected,
                    actual = %actual,
                    source = ?source,
                    "paid amount differs from expected amount"
                );
                self.ledger.emit(Event::AmountMismatch {
                    member_id: record.member_id,
                    period_key: record.period_key,
                    expected: *expected,
                    actual: *actual,
                    source: *source,
                    timestamp: time_provider.now(),
                });
            }
            DuesWarning::UnknownVoucher { voucher_id } => {
                tracing::warn!(
                    member_id = %record.member_id,
                    period = %record.period_key,
                    voucher_id = %voucher_id,
                    "linked voucher not found in transaction store"
                );
                self.ledger.emit(Event::VoucherNotFound {
                    member_id: record.member_id,
                    period_key: record.period_key,
                    voucher_id: voucher_id.clone(),
                    timestamp: time_provider.now(),
                });
            }
        }
    }

    /// remove the payment for a period; returns whether one existed
    pub fn unmark(
        &self,
        member_id: &MemberId,
        period: &str,
        time_provider: &SafeTimeProvider,
    ) -> Result<bool> {
        self.member(member_id)?;
        let period_key: PeriodKey = period.parse()?;
        self.ledger.unmark(member_id, &period_key, time_provider)
    }

    pub fn unmark_now(&self, member_id: &MemberId, period: &str) -> Result<bool> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.unmark(member_id, period, &time)
    }

    /// newest payments first, capped at `limit` or the configured default
    pub fn get_history(&self, member_id: &MemberId, limit: Option<usize>) -> Result<Vec<PaymentRecord>> {
        self.member(member_id)?;
        let limit = limit.unwrap_or(self.config.ledger.default_history_limit);
        self.ledger.history(member_id, limit)
    }

    /// ranked transaction candidates for a member's period
    pub fn suggest_transactions(&self, member_id: &MemberId, period: &str) -> Result<Vec<MatchCandidate>> {
        let member = self.member(member_id)?;
        let terms = member.billing().ok_or(DuesError::NoBillingConfigured {
            member_id: *member_id,
        })?;
        let period_key = PeriodKey::parse(period, terms.interval)?;

        let mut candidates = self.matcher.suggest(&member.name, terms.amount, &period_key)?;
        for candidate in &mut candidates {
            candidate.already_linked_to = self
                .ledger
                .find_by_voucher(&candidate.transaction.id)?
                .into_iter()
                .map(|record| LinkedPayment {
                    member_id: record.member_id,
                    period_key: record.period_key,
                })
                .collect();
        }
        Ok(candidates)
    }

    /// operator text search over a date range, unranked
    pub fn search_transactions(
        &self,
        query: Option<&str>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TransactionSummary>> {
        self.matcher.search(query, from, to)
    }

    /// re-validate the voucher link of a payment
    pub fn verify_link(&self, member_id: &MemberId, period: &str) -> Result<LinkStatus> {
        self.member(member_id)?;
        let period_key: PeriodKey = period.parse()?;
        let voucher_id = match self.ledger.get(member_id, &period_key)? {
            Some(PaymentRecord {
                voucher_id: Some(voucher_id),
                ..
            }) => voucher_id,
            _ => return Ok(LinkStatus::Unlinked),
        };

        match self.transactions.get_transaction(&voucher_id)? {
            Some(transaction) => Ok(LinkStatus::Linked(transaction)),
            None => {
                tracing::warn!(
                    member_id = %member_id,
                    period = %period_key,
                    voucher_id = %voucher_id,
                    "stale voucher link"
                );
                Ok(LinkStatus::Stale { voucher_id })
            }
        }
    }

    /// every member billed at `interval` who owes one of the selected periods
    ///
    /// Rows are ordered by period, then member name. `filter` matches member
    /// names case-insensitively.
    pub fn list_due_periods_across_members(
        &self,
        interval: ContributionInterval,
        selector: &PeriodSelector,
        filter: Option<&str>,
    ) -> Result<Vec<DueRow>> {
        let period_keys = selector.resolve(interval)?;
        let members: Vec<Member> = self
            .members
            .list_members()?
            .into_iter()
            .filter(|member| filter.map_or(true, |f| member.matches_filter(f)))
            .collect();

        let mut rows = Vec::new();
        for period_key in &period_keys {
            for member in &members {
                let terms = match member.billing() {
                    Some(terms) if terms.interval == interval => terms,
                    _ => continue,
                };
                if !batch::is_due_for(member, period_key) {
                    continue;
                }
                let record = self.ledger.get(&member.id, period_key)?;
                rows.push(DueRow {
                    member_id: member.id,
                    member_name: member.name.clone(),
                    period_key: *period_key,
                    amount: terms.amount,
                    paid: record.is_some(),
                    record,
                });
            }
        }

        tracing::debug!(
            interval = %interval,
            periods = period_keys.len(),
            rows = rows.len(),
            "listed due periods across members"
        );

        Ok(rows)
    }

    /// status, default timeline and recent history of one member
    pub fn member_overview(&self, member_id: &MemberId, as_of: NaiveDate) -> Result<MemberDuesView> {
        let member = self.member(member_id)?;
        let aggregator = self.status_aggregator();
        let window = &self.config.timeline;
        Ok(MemberDuesView {
            member_id: member.id,
            name: member.name.clone(),
            as_of,
            status: aggregator.status(&member, as_of)?,
            timeline: aggregator.timeline(&member, as_of, window.past_periods, window.future_periods)?,
            recent_payments: self
                .ledger
                .history(member_id, self.config.ledger.default_history_limit)?,
        })
    }

    pub fn billing_run(
        &self,
        interval: ContributionInterval,
        selector: &PeriodSelector,
        filter: Option<&str>,
    ) -> Result<BillingRunView> {
        let rows = self.list_due_periods_across_members(interval, selector, filter)?;
        Ok(BillingRunView::from_rows(interval, selector.clone(), rows))
    }

    /// drain audit events
    pub fn take_events(&self) -> Vec<Event> {
        self.ledger.take_events()
    }
}

/// builder for the dues engine
pub struct DuesEngineBuilder {
    config: Option<DuesConfig>,
    members: Option<Arc<dyn MemberDirectory>>,
    transactions: Option<Arc<dyn TransactionStore>>,
    payment_store: Option<Arc<dyn PaymentStore>>,
}

impl DuesEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            members: None,
            transactions: None,
            payment_store: None,
        }
    }

    pub fn config(mut self, config: DuesConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn members(mut self, members: Arc<dyn MemberDirectory>) -> Self {
        self.members = Some(members);
        self
    }

    pub fn transactions(mut self, transactions: Arc<dyn TransactionStore>) -> Self {
        self.transactions = Some(transactions);
        self
    }

    pub fn payment_store(mut self, store: Arc<dyn PaymentStore>) -> Self {
        self.payment_store = Some(store);
        self
    }

    /// build the engine; stores not supplied default to empty in-memory ones
    pub fn build(self) -> Result<DuesEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let members = self.members.ok_or(DuesError::InvalidConfiguration {
            message: "member directory required".to_string(),
        })?;
        let transactions: Arc<dyn TransactionStore> = self
            .transactions
            .unwrap_or_else(|| Arc::new(InMemoryTransactionStore::new()));
        let payment_store: Arc<dyn PaymentStore> = self
            .payment_store
            .unwrap_or_else(|| Arc::new(InMemoryPaymentStore::new()));

        Ok(DuesEngine {
            matcher: TransactionMatcher::new(transactions.clone(), config.matching.clone()),
            ledger: PaymentLedger::new(payment_store),
            config,
            members,
            transactions,
        })
    }
}

impl Default for DuesEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{DuesState, TimelineLabel};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap(),
        ))
    }

    struct Fixture {
        engine: DuesEngine,
        anna: Member,
        carl: Member,
        unbilled: Member,
        transactions: Arc<InMemoryTransactionStore>,
    }

    fn fixture() -> Fixture {
        let anna = Member::new("Anna Berg", date(2024, 1, 1))
            .with_contribution(Money::from_decimal(dec!(10.00)), ContributionInterval::Monthly);
        let carl = Member::new("Carl Diaz", date(2024, 3, 15))
            .with_contribution(Money::from_decimal(dec!(10.00)), ContributionInterval::Monthly);
        let unbilled = Member::new("Dana Ek", date(2024, 1, 1));

        let transactions = Arc::new(InMemoryTransactionStore::with_transactions([
            TransactionSummary::new("V-100", date(2024, 5, 3), Money::from_major(10), "Dues Anna Berg"),
            TransactionSummary::new("V-101", date(2024, 5, 9), Money::from_major(25), "Carl Diaz"),
            TransactionSummary::new("V-102", date(2024, 2, 20), Money::from_major(10), "Anna Berg"),
        ]));

        let engine = DuesEngine::builder()
            .members(Arc::new(InMemoryMemberDirectory::with_members([
                anna.clone(),
                carl.clone(),
                unbilled.clone(),
            ])))
            .transactions(transactions.clone())
            .build()
            .unwrap();

        Fixture {
            engine,
            anna,
            carl,
            unbilled,
            transactions,
        }
    }

    fn request(member: &Member, period: &str, amount: Money) -> MarkPaidRequest {
        MarkPaidRequest::new(member.id, period, ContributionInterval::Monthly, amount)
    }

    #[test]
    fn test_builder_requires_members_and_valid_config() {
        assert!(matches!(
            DuesEngine::builder().build(),
            Err(DuesError::InvalidConfiguration { .. })
        ));

        let mut config = DuesConfig::standard();
        config.matching.max_suggestions = 0;
        let result = DuesEngine::builder()
            .members(Arc::new(InMemoryMemberDirectory::new()))
            .config(config)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_member() {
        let f = fixture();
        let missing = uuid::Uuid::new_v4();
        assert!(matches!(
            f.engine.get_status(&missing, date(2024, 5, 1)),
            Err(DuesError::MemberNotFound { .. })
        ));
        assert!(matches!(
            f.engine.mark_paid(
                MarkPaidRequest::new(missing, "2024-05", ContributionInterval::Monthly, Money::from_major(10)),
                &time()
            ),
            Err(DuesError::MemberNotFound { .. })
        ));
        assert!(matches!(
            f.engine.verify_link(&missing, "2024-05"),
            Err(DuesError::MemberNotFound { .. })
        ));
    }

    #[test]
    fn test_mark_paid_with_matching_voucher_has_no_warnings() {
        let f = fixture();
        let outcome = f
            .engine
            .mark_paid(request(&f.anna, "2024-05", Money::from_major(10)).with_voucher("V-100"), &time())
            .unwrap();

        assert!(!outcome.has_warnings());
        assert!(outcome.record.verified);
        assert!(matches!(
            f.engine.verify_link(&f.anna.id, "2024-05").unwrap(),
            LinkStatus::Linked(ref t) if t.id == "V-100"
        ));
    }

    #[test]
    fn test_mark_paid_reports_amount_mismatches() {
        let f = fixture();
        let outcome = f
            .engine
            .mark_paid(request(&f.carl, "2024-05", Money::from_major(25)).with_voucher("V-101"), &time())
            .unwrap();

        assert_eq!(
            outcome.warnings,
            vec![DuesWarning::AmountMismatch {
                expected: Money::from_major(10),
                actual: Money::from_major(25),
                source: MismatchSource::Schedule,
            }]
        );
        // amount is stored as supplied
        assert_eq!(outcome.record.amount, Money::from_major(25));

        let outcome = f
            .engine
            .mark_paid(request(&f.carl, "2024-04", Money::from_major(10)).with_voucher("V-101"), &time())
            .unwrap();
        assert_eq!(
            outcome.warnings,
            vec![DuesWarning::AmountMismatch {
                expected: Money::from_major(25),
                actual: Money::from_major(10),
                source: MismatchSource::Transaction,
            }]
        );

        let events = f.engine.take_events();
        let mismatches = events
            .iter()
            .filter(|e| matches!(e, Event::AmountMismatch { .. }))
            .count();
        assert_eq!(mismatches, 2);
    }

    #[test]
    fn test_unknown_voucher_and_stale_link() {
        let f = fixture();
        let outcome = f
            .engine
            .mark_paid(request(&f.anna, "2024-01", Money::from_major(10)).with_voucher("V-999"), &time())
            .unwrap();
        assert_eq!(
            outcome.warnings,
            vec![DuesWarning::UnknownVoucher {
                voucher_id: "V-999".to_string()
            }]
        );

        f.engine
            .mark_paid(request(&f.anna, "2024-02", Money::from_major(10)).with_voucher("V-102"), &time())
            .unwrap();
        f.transactions.remove("V-102");
        assert_eq!(
            f.engine.verify_link(&f.anna.id, "2024-02").unwrap(),
            LinkStatus::Stale {
                voucher_id: "V-102".to_string()
            }
        );
        assert_eq!(f.engine.verify_link(&f.anna.id, "2024-03").unwrap(), LinkStatus::Unlinked);
    }

    #[test]
    fn test_unmark_validates_period_text() {
        let f = fixture();
        assert!(!f.engine.unmark(&f.anna.id, "2024-05", &time()).unwrap());
        assert!(matches!(
            f.engine.unmark(&f.anna.id, "2024-5", &time()),
            Err(DuesError::InvalidPeriodFormat { .. })
        ));

        f.engine
            .mark_paid(request(&f.anna, "2024-05", Money::from_major(10)), &time())
            .unwrap();
        assert!(f.engine.unmark(&f.anna.id, "2024-05", &time()).unwrap());
        assert!(f.engine.get_history(&f.anna.id, None).unwrap().is_empty());
    }

    #[test]
    fn test_status_and_timeline_through_engine() {
        let f = fixture();
        for period in ["2024-01", "2024-02"] {
            f.engine
                .mark_paid(request(&f.anna, period, Money::from_major(10)), &time())
                .unwrap();
        }

        let status = f.engine.get_status(&f.anna.id, date(2024, 4, 15)).unwrap();
        assert_eq!(status.state, DuesState::Overdue);
        assert_eq!(status.overdue_count, 2);

        let timeline = f.engine.get_default_timeline(&f.anna.id, date(2024, 4, 15)).unwrap();
        assert_eq!(timeline.first().map(|e| e.period_key.to_string()), Some("2024-01".to_string()));
        assert_eq!(timeline.len(), 7);
        assert_eq!(timeline[3].label, TimelineLabel::Current);

        let unbilled = f.engine.get_status(&f.unbilled.id, date(2024, 4, 15)).unwrap();
        assert_eq!(unbilled.state, DuesState::NotBilled);
        assert!(f
            .engine
            .generate_schedule(&f.unbilled.id, date(2024, 4, 15))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_suggest_annotates_existing_links() {
        let f = fixture();
        f.engine
            .mark_paid(request(&f.anna, "2024-02", Money::from_major(10)).with_voucher("V-102"), &time())
            .unwrap();

        let candidates = f.engine.suggest_transactions(&f.anna.id, "2024-05").unwrap();
        assert_eq!(candidates[0].transaction.id, "V-100");
        assert!(candidates[0].already_linked_to.is_empty());

        let linked = candidates
            .iter()
            .find(|c| c.transaction.id == "V-102")
            .unwrap();
        assert_eq!(linked.already_linked_to[0].member_id, f.anna.id);

        assert!(matches!(
            f.engine.suggest_transactions(&f.unbilled.id, "2024-05"),
            Err(DuesError::NoBillingConfigured { .. })
        ));
        assert!(matches!(
            f.engine.suggest_transactions(&f.anna.id, "2024-Q2"),
            Err(DuesError::InvalidPeriodFormat { .. })
        ));
    }

    #[test]
    fn test_due_periods_across_members() {
        let f = fixture();
        f.engine
            .mark_paid(request(&f.anna, "2024-03", Money::from_major(10)), &time())
            .unwrap();

        let rows = f
            .engine
            .list_due_periods_across_members(
                ContributionInterval::Monthly,
                &PeriodSelector::date_range(date(2024, 2, 10), date(2024, 3, 5)),
                None,
            )
            .unwrap();
        let summary: Vec<(String, String, bool)> = rows
            .iter()
            .map(|r| (r.period_key.to_string(), r.member_name.clone(), r.paid))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("2024-02".to_string(), "Anna Berg".to_string(), false),
                ("2024-03".to_string(), "Anna Berg".to_string(), true),
                ("2024-03".to_string(), "Carl Diaz".to_string(), false),
            ]
        );

        let filtered = f
            .engine
            .list_due_periods_across_members(
                ContributionInterval::Monthly,
                &PeriodSelector::period("2024-03"),
                Some("DIAZ"),
            )
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].member_id, f.carl.id);

        let quarterly = f
            .engine
            .list_due_periods_across_members(
                ContributionInterval::Quarterly,
                &PeriodSelector::period("2024-Q1"),
                None,
            )
            .unwrap();
        assert!(quarterly.is_empty());
    }

    #[test]
    fn test_concurrent_marks_through_engine() {
        let f = fixture();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let engine = &f.engine;
                let anna = &f.anna;
                scope.spawn(move || {
                    let time = time();
                    for period in ["2024-01", "2024-02", "2024-03"] {
                        engine
                            .mark_paid(request(anna, period, Money::from_major(10)), &time)
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(f.engine.ledger().records_for(&f.anna.id).unwrap().len(), 3);
    }
}
