/// shared charges - splitting purchases and income between people
use card_ledger_rs::chrono::NaiveDate;
use card_ledger_rs::{
    allocate, Card, CardAccount, ChargeRequest, EngineConfig, Money, Percentage, SharedIncome,
    SplitAllocator, SplitTarget, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== shared charges ===\n");

    let (ana, bia, caio) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let thirds = vec![
        SplitTarget::new(ana, Percentage::from_whole(34)),
        SplitTarget::new(bia, Percentage::from_whole(33)),
        SplitTarget::new(caio, Percentage::from_whole(33)),
    ];

    for allocation in allocate(Money::from_major(100), &thirds)? {
        println!("party {} owes R$ {}", allocation.party_id, allocation.amount);
    }

    let card = Card::new(Money::from_major(5_000), 10, 15)?;
    let mut account = CardAccount::open(card, EngineConfig::default())?;
    let purchase = NaiveDate::from_ymd_opt(2024, 3, 2).ok_or("bad date")?;
    let trip = account.create_charge(
        ChargeRequest::new(Money::from_major(1_000), 3, purchase)
            .description("trip")
            .split(thirds.clone()),
    )?;

    println!("\nper-slice split of the trip:");
    for (sequence, splits) in trip.slice_splits() {
        let shares: Vec<String> = splits.iter().map(|s| s.amount.to_string()).collect();
        println!("  slice {}: {}", sequence, shares.join(" / "));
    }

    let allocator = SplitAllocator::default();
    let salary = SharedIncome::new(
        "household salary",
        Money::from_major(2_100),
        purchase,
        vec![
            SplitTarget::new(ana, Percentage::from_whole(70)),
            SplitTarget::new(bia, Percentage::from_whole(30)),
        ],
        &allocator,
    )?;
    println!("\nincome split:");
    for allocation in salary.allocations(&allocator)? {
        println!("  R$ {}", allocation.amount);
    }

    // 99% is refused
    let bad = vec![SplitTarget::new(ana, Percentage::from_whole(99))];
    if let Err(e) = allocate(Money::from_major(10), &bad) {
        println!("\nrejected: {}", e);
    }

    Ok(())
}
