/// reconciliation - link payments to bank transactions and review a billing run
use std::sync::Arc;

use member_dues_rs::chrono::{TimeZone, Utc};
use member_dues_rs::chrono::NaiveDate;
use member_dues_rs::{
    ContributionInterval, DuesEngine, DuesWarning, InMemoryMemberDirectory,
    InMemoryTransactionStore, LinkStatus, MarkPaidRequest, Member, Money, PeriodSelector,
    SafeTimeProvider, TimeSource, TransactionSummary,
};

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate, &'static str> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid date")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let anna = Member::new("Anna Berg", date(2024, 1, 1)?)
        .with_contribution(Money::from_major(30), ContributionInterval::Quarterly);
    let carl = Member::new("Carl Diaz", date(2024, 1, 1)?)
        .with_contribution(Money::from_major(30), ContributionInterval::Quarterly);

    let transactions = Arc::new(InMemoryTransactionStore::with_transactions([
        TransactionSummary::new("BANK-17", date(2024, 4, 3)?, Money::from_major(30), "SEPA Anna Berg Q2"),
        TransactionSummary::new("BANK-18", date(2024, 4, 9)?, Money::from_major(25), "C. Diaz membership"),
        TransactionSummary::new("BANK-19", date(2024, 1, 20)?, Money::from_major(30), "Anna Berg"),
    ]));

    let engine = DuesEngine::builder()
        .members(Arc::new(InMemoryMemberDirectory::with_members([
            anna.clone(),
            carl.clone(),
        ])))
        .transactions(transactions.clone())
        .build()?;

    // deterministic clock for the payment stamps
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 4, 15, 9, 0, 0)
            .single()
            .ok_or("invalid timestamp")?,
    ));

    for member in [&anna, &carl] {
        println!("suggestions for {} 2024-Q2:", member.name);
        for candidate in engine.suggest_transactions(&member.id, "2024-Q2")? {
            println!(
                "  {} {} {:?} amount_match={} in_window={} similarity={}",
                candidate.transaction.id,
                candidate.transaction.date,
                candidate.transaction.description,
                candidate.amount_matches,
                candidate.in_window,
                candidate.name_similarity
            );
        }
    }

    engine.mark_paid(
        MarkPaidRequest::new(anna.id, "2024-Q2", ContributionInterval::Quarterly, Money::from_major(30))
            .with_voucher("BANK-17"),
        &time,
    )?;

    let outcome = engine.mark_paid(
        MarkPaidRequest::new(carl.id, "2024-Q2", ContributionInterval::Quarterly, Money::from_major(30))
            .with_voucher("BANK-18"),
        &time,
    )?;
    for warning in &outcome.warnings {
        match warning {
            DuesWarning::AmountMismatch { expected, actual, source } => {
                println!("warning: {:?} expected {} but {} was recorded", source, expected, actual)
            }
            DuesWarning::UnknownVoucher { voucher_id } => {
                println!("warning: voucher {} not found", voucher_id)
            }
        }
    }

    // the bank entry gets deleted in accounting; the link goes stale
    transactions.remove("BANK-18");
    match engine.verify_link(&carl.id, "2024-Q2")? {
        LinkStatus::Linked(transaction) => println!("carl linked to {}", transaction.id),
        LinkStatus::Stale { voucher_id } => println!("carl's link to {} is stale", voucher_id),
        LinkStatus::Unlinked => println!("carl is unlinked"),
    }

    let run = engine.billing_run(
        ContributionInterval::Quarterly,
        &PeriodSelector::date_range(date(2024, 1, 1)?, date(2024, 6, 30)?),
        None,
    )?;
    println!("{}", run.to_json_pretty()?);

    for event in engine.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
