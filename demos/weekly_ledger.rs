/// weekly ledger - haftas, a missed week and catch-up penalties on controlled time
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use hafta_ledger::{
    InMemoryStore, Ledger, LedgerConfig, LoanTerms, Money, NewBorrower, Rate, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== weekly ledger example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));
    let controller = time.test_control().ok_or("test clock expected")?;

    let store = Arc::new(InMemoryStore::new());
    let mut ledger = Ledger::new(store, LedgerConfig::default(), time.clone())?;

    let borrower = ledger.add_borrower(NewBorrower::new("Lakshmi Rao", "98450 11223"))?;
    let loan = ledger.originate_loan(
        borrower.id,
        LoanTerms::new(Money::from_major(10_000), Money::from_major(1_000), Rate::from_percentage(2)),
    )?;
    println!("loan originated on {}", time.now().format("%Y-%m-%d"));
    println!("first hafta due {}", loan.next_due_date.format("%Y-%m-%d"));

    // pay the first two weeks on time
    for week in 1..=2 {
        controller.advance(Duration::days(6));
        let amount = ledger.suggested_payment(loan.id)?;
        let receipt = ledger.record_payment(loan.id, amount)?;
        println!(
            "week {}: paid {} on {}, remaining {}",
            week,
            amount,
            time.now().format("%Y-%m-%d"),
            receipt.loan.current_due_amount
        );
        controller.advance(Duration::days(1));
    }

    // then go quiet for three weeks
    controller.advance(Duration::days(22));
    println!("\nadvanced to: {}", time.now().format("%Y-%m-%d"));
    println!("due status: {}", ledger.due_status(loan.id)?);

    for (id, result) in ledger.refresh_penalties()? {
        println!(
            "loan {}: {} missed week(s), penalty {}, due now {}",
            id, result.missed_periods, result.penalty_amount, result.new_due_amount
        );
    }

    // a second refresh at the same instant changes nothing
    println!("second refresh applied {} penalty(ies)", ledger.refresh_penalties()?.len());

    let summary = ledger.portfolio_summary()?;
    println!("\nportfolio: {} active, {} outstanding, {} overdue", summary.active_loans, summary.total_outstanding, summary.overdue_count);

    println!("\n{}", ledger.loan_view(loan.id)?.to_json_pretty()?);

    println!("\ntransactions:");
    for tx in ledger.transactions(loan.id)? {
        println!("  {} {}", tx.date.format("%Y-%m-%d"), tx.amount_paid);
    }

    Ok(())
}
