use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::card::Card;
use crate::charge::{Charge, ChargeRequest};
use crate::config::EngineConfig;
use crate::cycle::CycleCalculator;
use crate::decimal::{Money, Percentage};
use crate::errors::LedgerError;
use crate::installments::InstallmentScheduler;
use crate::invoice::InvoiceAggregator;
use crate::ledger::CreditLedger;
use crate::split::{SplitAllocator, SplitTarget};
use crate::types::InvoiceStatus;

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
}

fn targets(weights: &[u32]) -> Vec<SplitTarget> {
    // whole points summing to exactly 100, the last target takes the rest
    let sum: u32 = weights.iter().sum();
    let mut points: Vec<u32> = weights.iter().map(|w| w * 100 / sum).collect();
    let assigned: u32 = points[..points.len() - 1].iter().sum();
    let last = points.len() - 1;
    points[last] = 100 - assigned;

    points
        .into_iter()
        .map(|p| SplitTarget::new(Uuid::new_v4(), Percentage::from_whole(p)))
        .collect()
}

proptest! {
    #[test]
    fn prop_cycles_tile_the_calendar(
        closing in 1u32..=31,
        billing in 1u32..=31,
        offset in 0i64..7_300,
    ) {
        let calculator = CycleCalculator::new(closing, billing).unwrap();
        let date = day(offset);
        let cycle = calculator.resolve(date).unwrap();
        let next = calculator.next(&cycle).unwrap();

        prop_assert!(cycle.contains(date));
        prop_assert!(cycle.start_date <= cycle.end_date);
        prop_assert!(cycle.due_date > cycle.end_date);
        prop_assert_eq!(next.start_date, cycle.end_date + Duration::days(1));
        prop_assert_eq!(calculator.resolve(cycle.end_date).unwrap(), cycle);
        prop_assert_eq!(calculator.resolve(next.start_date).unwrap(), next);
    }

    #[test]
    fn prop_slices_sum_to_total(
        count in 1u32..=24,
        cents in 1i64..5_000_000,
        closing in 1u32..=31,
        offset in 0i64..7_300,
    ) {
        let card = Card::new(Money::from_major(100_000), closing, 5).unwrap();
        let total = Money::from_minor(cents);
        let purchase = day(offset);

        let slices = crate::installments::schedule(total, count, purchase, &card).unwrap();
        let sum: Money = slices.iter().map(|s| s.amount).sum();
        prop_assert_eq!(sum, total);
        prop_assert_eq!(slices.len() as u32, count);
        prop_assert!(slices.iter().all(|s| !s.amount.is_negative()));

        // slice k lands in the k-th cycle counted from the purchase's cycle
        let calculator = card.calculator().unwrap();
        for slice in &slices {
            let expected = calculator.advance(purchase, slice.sequence - 1).unwrap();
            prop_assert!(expected.contains(slice.effective_date));
        }
    }

    #[test]
    fn prop_split_sums_to_total(
        cents in 0i64..10_000_000,
        weights in prop::collection::vec(1u32..50, 1..6),
    ) {
        let total = Money::from_minor(cents);
        let allocations = SplitAllocator::default().allocate(total, &targets(&weights)).unwrap();

        let sum: Money = allocations.iter().map(|a| a.amount).sum();
        prop_assert_eq!(sum, total);
        prop_assert_eq!(allocations.len(), weights.len());
    }

    #[test]
    fn prop_split_off_by_one_point_rejected(
        cents in 1i64..10_000_000,
        first in 1u32..99,
        over in any::<bool>(),
    ) {
        let second = if over { 101 - first } else { 99 - first };
        let bad = vec![
            SplitTarget::new(Uuid::new_v4(), Percentage::from_whole(first)),
            SplitTarget::new(Uuid::new_v4(), Percentage::from_points(Decimal::from(second))),
        ];

        let rejected = matches!(
            SplitAllocator::default().allocate(Money::from_minor(cents), &bad),
            Err(LedgerError::SplitMismatch { .. })
        );
        prop_assert!(rejected);
    }

    #[test]
    fn prop_limit_never_grows_on_new_charges(
        amounts in prop::collection::vec((1i64..500_000, 1u32..=12), 1..8),
    ) {
        let card = Card::new(Money::from_major(5_000), 10, 15).unwrap();
        let mut charges: Vec<Charge> = Vec::new();
        let mut previous = CreditLedger::available_limit(&card, &charges);
        prop_assert_eq!(previous, card.credit_limit);

        for (cents, count) in amounts {
            let request = ChargeRequest::new(Money::from_minor(cents), count, day(60));
            charges.push(
                Charge::create(&card, request, &InstallmentScheduler::default(), &SplitAllocator::default())
                    .unwrap(),
            );

            let available = CreditLedger::available_limit(&card, &charges);
            prop_assert!(available <= previous);
            prop_assert!(available >= Money::ZERO);
            prop_assert!(available <= card.credit_limit);
            previous = available;
        }
    }

    #[test]
    fn prop_paying_twice_has_no_second_effect(
        cents in 100i64..1_000_000,
        count in 1u32..=6,
    ) {
        let card = Card::new(Money::from_major(100_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let mut charges = vec![Charge::create(
            &card,
            ChargeRequest::new(Money::from_minor(cents), count, day(45)),
            &InstallmentScheduler::default(),
            &SplitAllocator::default(),
        )
        .unwrap()];

        let today = day(800);
        let invoice = aggregator.build_invoices(&charges, today).unwrap().remove(0);
        prop_assert_eq!(invoice.status, InvoiceStatus::Closed);

        let result = aggregator.pay_invoice(&invoice, &charges, &[], today).unwrap();
        result.apply_to(&mut charges);
        let after_first = charges.clone();

        let retry = aggregator.pay_invoice(&invoice, &charges, &[], today);
        prop_assert!(
            matches!(retry, Err(LedgerError::AlreadyPaid { .. })),
            "retry should report the invoice as paid"
        );
        prop_assert_eq!(&charges, &after_first);
    }
}
