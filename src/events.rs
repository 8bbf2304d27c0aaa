use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::PeriodKey;
use crate::decimal::Money;
use crate::types::{MemberId, VoucherId};

/// where an expected amount came from when flagging a mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MismatchSource {
    /// nominal contribution from the member's billing terms
    Schedule,
    /// amount of the linked accounting transaction
    Transaction,
}

/// all events emitted by ledger mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PaymentMarked {
        member_id: MemberId,
        period_key: PeriodKey,
        amount: Money,
        voucher_id: Option<VoucherId>,
        timestamp: DateTime<Utc>,
    },
    /// mark-paid on a period that already had a record
    PaymentUpdated {
        member_id: MemberId,
        period_key: PeriodKey,
        previous_amount: Money,
        amount: Money,
        previous_voucher_id: Option<VoucherId>,
        voucher_id: Option<VoucherId>,
        timestamp: DateTime<Utc>,
    },
    PaymentUnmarked {
        member_id: MemberId,
        period_key: PeriodKey,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    AmountMismatch {
        member_id: MemberId,
        period_key: PeriodKey,
        expected: Money,
        actual: Money,
        source: MismatchSource,
        timestamp: DateTime<Utc>,
    },
    VoucherNotFound {
        member_id: MemberId,
        period_key: PeriodKey,
        voucher_id: VoucherId,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn member_id(&self) -> MemberId {
        match self {
            Event::PaymentMarked { member_id, .. }
            | Event::PaymentUpdated { member_id, .. }
            | Event::PaymentUnmarked { member_id, .. }
            | Event::AmountMismatch { member_id, .. }
            | Event::VoucherNotFound { member_id, .. } => *member_id,
        }
    }
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::ContributionInterval;
    use uuid::Uuid;

    #[test]
    fn test_event_store_take_drains() {
        let member_id = Uuid::new_v4();
        let mut store = EventStore::new();
        store.emit(Event::PaymentUnmarked {
            member_id,
            period_key: PeriodKey::parse("2024-01", ContributionInterval::Monthly).unwrap(),
            amount: Money::from_major(10),
            timestamp: Utc::now(),
        });

        assert_eq!(store.len(), 1);
        assert_eq!(store.events()[0].member_id(), member_id);

        let taken = store.take_events();
        assert_eq!(taken.len(), 1);
        assert!(store.is_empty());
    }
}
