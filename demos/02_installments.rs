/// installments - cent-exact schedules and month-end clamping
use card_ledger_rs::chrono::NaiveDate;
use card_ledger_rs::{Card, EngineConfig, InstallmentScheduler, Money, RemainderPolicy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== installments ===\n");

    let card = Card::new(Money::from_major(10_000), 30, 7)?;
    let purchase = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?;
    let total = Money::from_major(1_000);

    for policy in [RemainderPolicy::LastSlice, RemainderPolicy::FirstSlice] {
        let config = EngineConfig {
            remainder_policy: policy,
            ..EngineConfig::default()
        };
        let scheduler = InstallmentScheduler::new(&config);
        let slices = scheduler.schedule(total, 3, purchase, &card)?;

        println!("{:?}:", policy);
        for slice in &slices {
            println!("  #{} {}  R$ {}", slice.sequence, slice.effective_date, slice.amount);
        }
        let sum: Money = slices.iter().map(|s| s.amount).sum();
        println!("  sum R$ {}\n", sum);
    }

    // fewer cents than slices: leading slices are zero
    let tiny = card_ledger_rs::schedule(Money::from_minor(2), 3, purchase, &card)?;
    let amounts: Vec<String> = tiny.iter().map(|s| s.amount.to_string()).collect();
    println!("R$ 0.02 in 3: {}", amounts.join(" / "));

    // zero installments are refused
    if let Err(e) = card_ledger_rs::schedule(total, 0, purchase, &card) {
        println!("rejected: {}", e);
    }

    Ok(())
}
