//! Usage accounting
//!
//! Turns the Realtime API's usage reports into per-session totals with
//! fixed-point costs, and persists them: one record per session plus a
//! cross-session aggregate summary.

mod accumulator;
mod ledger;
mod rates;

pub use accumulator::{
    Direction, Modality, ModelUsage, SessionTotals, UsageAccumulator, UsageEvent,
};
pub use ledger::{AggregateSummary, FinalizeSummary, MergeStatus, UsageLedger};
pub use rates::{ModelRates, RateTable};
