/// quick start - schedule, pay and check a member's dues
use std::sync::Arc;

use member_dues_rs::chrono::NaiveDate;
use member_dues_rs::{
    ContributionInterval, DuesEngine, InMemoryMemberDirectory, MarkPaidRequest, Member, Money,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let joined = NaiveDate::from_ymd_opt(2024, 3, 15).ok_or("invalid date")?;
    let as_of = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("invalid date")?;

    // a member paying 10.00 every month
    let member = Member::new("Anna Berg", joined)
        .with_contribution(Money::from_major(10), ContributionInterval::Monthly);
    let member_id = member.id;

    let engine = DuesEngine::builder()
        .members(Arc::new(InMemoryMemberDirectory::with_members([member])))
        .build()?;

    let schedule = engine.generate_schedule(&member_id, as_of)?;
    for due in &schedule.periods {
        println!("{} due {} ({} - {})", due.period_key, due.amount, due.window_start, due.window_end);
    }

    // pay the first two months
    for period in ["2024-03", "2024-04"] {
        engine.mark_paid_now(MarkPaidRequest::new(
            member_id,
            period,
            ContributionInterval::Monthly,
            Money::from_major(10),
        ))?;
    }

    let status = engine.get_status(&member_id, as_of)?;
    println!(
        "state {:?}, {} overdue ({}), last paid {:?}",
        status.state,
        status.overdue_count,
        status.overdue_amount,
        status.last_paid_period.map(|key| key.to_string())
    );

    println!("{}", engine.member_overview(&member_id, as_of)?.to_json_pretty()?);

    Ok(())
}
