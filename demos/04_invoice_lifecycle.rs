/// invoice lifecycle - future, current, closed and paid with a controlled clock
use card_ledger_rs::chrono::{Duration, NaiveDate, TimeZone, Utc};
use card_ledger_rs::{
    Card, CardAccount, ChargeRequest, EngineConfig, Money, SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== invoice lifecycle ===\n");

    let start = Utc
        .with_ymd_and_hms(2024, 3, 25, 9, 0, 0)
        .single()
        .ok_or("bad timestamp")?;
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let controller = time.test_control().unwrap();

    let card = Card::new(Money::from_major(2_000), 10, 15)?;
    let mut account = CardAccount::open(card, EngineConfig::default())?;

    let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).ok_or("bad date");
    account.create_charge(ChargeRequest::new(Money::from_major(120), 1, day(3, 2)?).description("groceries"))?;
    account.create_charge(ChargeRequest::new(Money::from_major(900), 3, day(3, 20)?).description("phone"))?;
    println!("available: R$ {}", account.available_limit());

    for invoice in account.invoices(&time)? {
        println!(
            "{} .. {}  {:?}  total R$ {}  due {}",
            invoice.cycle.start_date,
            invoice.cycle.end_date,
            invoice.status,
            invoice.total,
            invoice.due_date()
        );
    }

    // the current invoice cannot be paid yet
    let current = day(3, 11)?;
    if let Err(e) = account.pay_invoice(current, &[], &time) {
        println!("\nrefused: {}", e);
    }

    controller.advance(Duration::days(20));
    println!("\nclock moved to {}", time.now().format("%Y-%m-%d"));

    for cycle_start in [day(2, 11)?, current] {
        let payment = account.pay_invoice(cycle_start, &[], &time)?;
        println!("paid R$ {} for cycle starting {}", payment.amount, cycle_start);
    }

    // a retry does nothing
    if let Err(e) = account.pay_invoice(current, &[], &time) {
        println!("retry: {}", e);
    }

    let view = account.ledger_view();
    println!("\nused by full charges: R$ {}", view.used_by_full_charges);
    println!("paid to date:         R$ {}", view.paid_to_date);
    println!("available:            R$ {}", view.available_limit);

    for event in account.take_events() {
        println!("event: {:?}", event);
    }

    Ok(())
}
