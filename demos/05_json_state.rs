/// json state - persist an account as json and load it back
use card_ledger_rs::chrono::{NaiveDate, TimeZone, Utc};
use card_ledger_rs::{
    Card, CardAccount, CardSnapshot, ChargeRequest, EngineConfig, Money, SafeTimeProvider,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let now = Utc
        .with_ymd_and_hms(2024, 3, 25, 9, 0, 0)
        .single()
        .ok_or("bad timestamp")?;
    let time = SafeTimeProvider::new(TimeSource::Test(now));

    let config = EngineConfig::from_json(r#"{ "max_installments": 24 }"#)?;
    let card = Card::new(Money::from_major(3_000), 5, 12)?.named("travel");
    let mut account = CardAccount::open(card, config.clone())?;

    let purchase = NaiveDate::from_ymd_opt(2024, 3, 18).ok_or("bad date")?;
    account.create_charge(ChargeRequest::new(Money::from_major(450), 3, purchase).description("hotel"))?;

    let json = account.snapshot(&time).to_json_pretty()?;
    println!("{}", json);

    let restored = CardAccount::restore(CardSnapshot::from_json(&json)?, config)?;
    println!("\nrestored {} charges, available R$ {}", restored.charges().len(), restored.available_limit());

    Ok(())
}
