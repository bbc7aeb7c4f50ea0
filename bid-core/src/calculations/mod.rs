//! Bid capacity calculations.
//!
//! [`formula`] holds the individual terms of `(A × N × 2.5) − B + C` as free
//! functions; [`worksheet`] runs them together for one company snapshot.

pub mod common;
pub mod formula;
pub mod worksheet;

pub use formula::{
    HorizonBranch, adjusted_balance, aggregate_commitments, bid_capacity, effective_balance,
    effective_balance_today, horizon_branch, local_today, max_updated_turnover, turnover_capacity, updated_turnover,
};
pub use worksheet::{BidCapacityResult, BidCapacityWorksheet, ProjectBalance, TurnoverLine};
