/// quick start - open a card, buy something in installments, check the limit
use card_ledger_rs::chrono::NaiveDate;
use card_ledger_rs::{Card, CardAccount, ChargeRequest, EngineConfig, Money};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // R$ 5.000 limit, closes on the 10th, due on the 15th
    let card = Card::new(Money::from_major(5_000), 10, 15)?.named("household");
    let mut account = CardAccount::open(card, EngineConfig::default())?;

    let purchase = NaiveDate::from_ymd_opt(2024, 3, 25).ok_or("bad date")?;
    let tv = account.create_charge(
        ChargeRequest::new(Money::from_major(3_001), 10, purchase).description("tv"),
    )?;

    for slice in &tv.slices {
        println!("{:>2}/{}  {}  R$ {}", slice.sequence, tv.installment_count, slice.effective_date, slice.amount);
    }
    println!("available limit: R$ {}", account.available_limit());

    Ok(())
}
