pub mod account;
pub mod card;
pub mod charge;
pub mod config;
pub mod cycle;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod installments;
pub mod invoice;
pub mod ledger;
pub mod snapshot;
pub mod split;
pub mod types;

#[cfg(test)]
mod properties;

// re-export key types
pub use account::CardAccount;
pub use card::Card;
pub use charge::{BillingEntry, Charge, ChargeEdit, ChargeRequest};
pub use config::EngineConfig;
pub use cycle::{resolve_cycle, Cycle, CycleCalculator};
pub use decimal::{Money, Percentage};
pub use errors::{LedgerError, Result};
pub use events::{EventStore, LedgerEvent};
pub use installments::{schedule, InstallmentScheduler, InstallmentSlice};
pub use invoice::{classify, Invoice, InvoiceAggregator, PaymentRecord, PaymentResult};
pub use ledger::{CreditLedger, LedgerView};
pub use snapshot::CardSnapshot;
pub use split::{allocate, SharedIncome, SplitAllocation, SplitAllocator, SplitTarget};
pub use types::{CardId, ChargeId, ChargeStatus, InvoiceStatus, PartyId, PaymentId, RemainderPolicy};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
