/// billing cycles - how closing and billing days turn into statement periods
use card_ledger_rs::chrono::NaiveDate;
use card_ledger_rs::{resolve_cycle, CycleCalculator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== billing cycles ===\n");

    let reference = NaiveDate::from_ymd_opt(2024, 3, 25).ok_or("bad date")?;
    let cycle = resolve_cycle(10, 15, reference)?;
    println!(
        "closing 10 / billing 15, {} -> {} .. {} due {}",
        reference, cycle.start_date, cycle.end_date, cycle.due_date
    );

    // closing on the 31st follows short months
    println!("\nclosing day 31 over 2024:");
    let calc = CycleCalculator::new(31, 7)?;
    let from = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
    let to = NaiveDate::from_ymd_opt(2024, 6, 30).ok_or("bad date")?;
    for cycle in calc.cycles_between(from, to)? {
        println!(
            "  {} .. {}  ({:>2} days)  due {}",
            cycle.start_date,
            cycle.end_date,
            cycle.length_days(),
            cycle.due_date
        );
    }

    // billing day before closing day is due the next month
    let cycle = resolve_cycle(25, 5, reference)?;
    println!("\nclosing 25 / billing 5: {} .. {} due {}", cycle.start_date, cycle.end_date, cycle.due_date);

    Ok(())
}
