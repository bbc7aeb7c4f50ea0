//! The bid capacity formula and its building blocks.
//!
//! ```text
//! Bid Capacity = (A × N × 2.5) − B + C
//! ```
//!
//! | Term | Meaning |
//! |------|---------|
//! | A    | Highest updated turnover of the last five fiscal years |
//! | N    | Years prescribed for completion of the work being bid on |
//! | B    | Value of existing commitments (sum of adjusted balances) |
//! | C    | Bonus value |
//!
//! Every function here is total: invalid inputs produce a number, never an
//! error or a panic. Results that would leave the `Decimal` range are
//! clamped to its bounds. Validation of user input lives in
//! [`crate::validation`].
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use bid_core::calculations::{adjusted_balance, effective_balance};
//! use bid_core::Project;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let project = Project {
//!     participation_percentage: dec!(50),
//!     contract_value: dec!(100),
//!     completed_value: dec!(40),
//!     anticipated_completion_date: NaiveDate::from_ymd_opt(2026, 1, 1),
//!     ..Project::skeleton()
//! };
//!
//! let balance = effective_balance(&project, dec!(3), today);
//! assert_eq!(balance, dec!(60));
//! assert_eq!(adjusted_balance(project.participation_percentage, balance), dec!(30.00));
//! ```

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{
    clamped_add, clamped_div, clamped_mul, clamped_sub, floor_at_zero, round_half_up,
};
use crate::models::{CompanyData, Project, TurnoverYear};

/// Year length used to turn a (possibly fractional) N into elapsed time.
const DAYS_PER_YEAR: Decimal = dec!(365.25);
const MILLIS_PER_DAY: Decimal = dec!(86400000);
const MONTHS_PER_YEAR: Decimal = dec!(12);
const TURNOVER_MULTIPLIER: Decimal = dec!(2.5);

/// Which rule decided a project's effective balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizonBranch {
    /// Not enough data for the horizon rule; remaining value applies.
    Fallback,
    /// Completes on or before the cutoff; remaining value applies.
    WithinHorizon,
    /// Completes after the cutoff; pro-rata share of the contract applies.
    BeyondHorizon,
}

/// The current calendar day on the local clock.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Turnover brought to current price levels, rounded to two places.
///
/// No sign checks: a negative amount yields a negative result.
pub fn updated_turnover(
    amount: Decimal,
    factor: Decimal,
) -> Decimal {
    round_half_up(clamped_mul(amount, factor))
}

/// Value A: the single best updated turnover year, never below zero.
pub fn max_updated_turnover(turnover_years: &[TurnoverYear]) -> Decimal {
    turnover_years
        .iter()
        .map(|year| updated_turnover(year.amount, year.factor.value()))
        .fold(Decimal::ZERO, Decimal::max)
}

/// `today` at midnight plus `n_years` of 365.25-day years, truncated to the
/// millisecond. `None` when the cutoff falls outside the calendar range.
fn horizon_cutoff(
    today: NaiveDate,
    n_years: Decimal,
) -> Option<NaiveDateTime> {
    let millis = n_years
        .checked_mul(DAYS_PER_YEAR)?
        .checked_mul(MILLIS_PER_DAY)?
        .trunc()
        .to_i64()?;
    today
        .and_time(NaiveTime::MIN)
        .checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

/// Decides which rule governs `project` for an analysis horizon of
/// `n_years` counted from `today`.
pub fn horizon_branch(
    project: &Project,
    n_years: Decimal,
    today: NaiveDate,
) -> HorizonBranch {
    let Some(completion) = project.anticipated_completion_date else {
        return HorizonBranch::Fallback;
    };
    if project.construction_period_months.is_zero() {
        warn!(
            project = %project.id,
            "Construction period is zero; using remaining value"
        );
        return HorizonBranch::Fallback;
    }
    if n_years <= Decimal::ZERO {
        return HorizonBranch::Fallback;
    }

    match horizon_cutoff(today, n_years) {
        Some(cutoff) if completion.and_time(NaiveTime::MIN) > cutoff => HorizonBranch::BeyondHorizon,
        // A cutoff past the end of the calendar contains every date.
        _ => HorizonBranch::WithinHorizon,
    }
}

/// Remaining contract value, floored at zero.
fn remaining_value(project: &Project) -> Decimal {
    let remaining = clamped_sub(project.contract_value, project.completed_value);
    if remaining < Decimal::ZERO {
        warn!(
            project = %project.id,
            contract_value = %project.contract_value,
            completed_value = %project.completed_value,
            "Completed value exceeds contract value; remaining balance floored at zero"
        );
    }
    floor_at_zero(remaining)
}

/// Contract value per month times the months of the horizon. Neither
/// floored nor capped at the contract value.
fn pro_rata_value(
    project: &Project,
    n_years: Decimal,
) -> Decimal {
    // Zero periods never reach here; see `horizon_branch`.
    let Some(monthly_rate) =
        clamped_div(project.contract_value, project.construction_period_months)
    else {
        return Decimal::ZERO;
    };
    let value = clamped_mul(monthly_rate, clamped_mul(n_years, MONTHS_PER_YEAR));

    if value > project.contract_value {
        warn!(
            project = %project.id,
            pro_rata = %value,
            contract_value = %project.contract_value,
            "Pro-rata balance exceeds the contract value"
        );
    }
    value
}

/// A project's remaining financial exposure within the analysis horizon.
///
/// * Missing completion date, zero construction period, or N ≤ 0: the
///   remaining value `max(0, contract − completed)`.
/// * Completion on or before `today + N` years: the remaining value.
/// * Completion after the cutoff: `(contract / period months) × (N × 12)`.
pub fn effective_balance(
    project: &Project,
    n_years: Decimal,
    today: NaiveDate,
) -> Decimal {
    let branch = horizon_branch(project, n_years, today);
    debug!(project = %project.id, ?branch, "effective balance rule selected");

    match branch {
        HorizonBranch::Fallback | HorizonBranch::WithinHorizon => remaining_value(project),
        HorizonBranch::BeyondHorizon => pro_rata_value(project, n_years),
    }
}

/// [`effective_balance`] measured from the local calendar day.
pub fn effective_balance_today(
    project: &Project,
    n_years: Decimal,
) -> Decimal {
    effective_balance(project, n_years, local_today())
}

/// The bidder's share of an effective balance, rounded to two places.
pub fn adjusted_balance(
    participation_percentage: Decimal,
    effective_balance: Decimal,
) -> Decimal {
    round_half_up(clamped_mul(participation_percentage / dec!(100), effective_balance))
}

/// Value B: the sum of every project's adjusted balance.
pub fn aggregate_commitments(
    projects: &[Project],
    n_years: Decimal,
    today: NaiveDate,
) -> Decimal {
    projects
        .iter()
        .map(|project| {
            adjusted_balance(
                project.participation_percentage,
                effective_balance(project, n_years, today),
            )
        })
        .fold(Decimal::ZERO, clamped_add)
}

/// `A × N × 2.5`, unrounded.
pub fn turnover_capacity(
    max_updated_turnover: Decimal,
    n_years: Decimal,
) -> Decimal {
    clamped_mul(clamped_mul(max_updated_turnover, n_years), TURNOVER_MULTIPLIER)
}

/// `(A × N × 2.5) − B + C`, rounded to two places. May be negative.
pub fn bid_capacity(
    company: &CompanyData,
    today: NaiveDate,
) -> Decimal {
    let a = max_updated_turnover(&company.turnover_data);
    let n = company.n_value;
    let b = aggregate_commitments(&company.projects, n, today);
    let c = company.c_value;

    round_half_up(clamped_add(clamped_sub(turnover_capacity(a, n), b), c))
}
