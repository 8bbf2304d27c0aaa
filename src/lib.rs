pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod matching;
pub mod schedule;
pub mod serialization;
pub mod status;
pub mod types;

// re-export key types
pub use calendar::{ContributionInterval, PeriodKey, PeriodWindow};
pub use config::{DuesConfig, LedgerConfig, MatchingConfig, TimelineConfig};
pub use decimal::{Money, Rate};
pub use engine::{
    DueRow, DuesEngine, DuesEngineBuilder, DuesWarning, InMemoryMemberDirectory, LinkStatus,
    MarkPaidOutcome, MemberDirectory, PeriodSelector,
};
pub use errors::{DuesError, Result};
pub use events::{Event, EventStore, MismatchSource};
pub use ledger::{InMemoryPaymentStore, MarkPaidRequest, PaymentLedger, PaymentRecord, PaymentStore};
pub use matching::{
    InMemoryTransactionStore, LinkedPayment, MatchCandidate, TransactionMatcher, TransactionStore,
    TransactionSummary,
};
pub use schedule::{DuePeriod, DueSchedule};
pub use serialization::{BillingRunTotals, BillingRunView, MemberDuesView};
pub use status::{DuesState, StatusAggregator, StatusSummary, TimelineEntry, TimelineLabel};
pub use types::{BillingTerms, Member, MemberId, MemberStatus, VoucherId};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
