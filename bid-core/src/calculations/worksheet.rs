//! Bid capacity worksheet.
//!
//! Runs the whole formula for one [`CompanyData`] snapshot and keeps every
//! intermediate line so the figures behind the final number can be shown.
//!
//! # Worksheet Structure
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Updated turnover per fiscal year (amount × updation factor) |
//! | 2    | A: highest value on line 1, never below zero |
//! | 3    | N: completion period in years |
//! | 4    | A × N × 2.5 |
//! | 5    | Effective and adjusted balance per ongoing project |
//! | 6    | B: sum of adjusted balances on line 5 |
//! | 7    | C: bonus |
//! | 8    | Bid capacity: line 4 − line 6 + line 7 |
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use bid_core::calculations::BidCapacityWorksheet;
//! use bid_core::{CompanyData, TurnoverYear, UpdationFactor};
//!
//! let mut company = CompanyData::new("Acme Constructions", "12 Park Street");
//! company.turnover_data[0] = TurnoverYear::new("2020-21", dec!(10), UpdationFactor::Factor(dec!(1.20)));
//! company.n_value = dec!(2);
//! company.c_value = dec!(1.5);
//!
//! let worksheet = BidCapacityWorksheet::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
//! let result = worksheet.calculate(&company);
//!
//! assert_eq!(result.max_updated_turnover, dec!(12.00));
//! assert_eq!(result.turnover_capacity, dec!(60.00));
//! assert_eq!(result.bid_capacity, dec!(61.50));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculations::common::round_half_up;
use crate::calculations::formula::{
    HorizonBranch, adjusted_balance, aggregate_commitments, bid_capacity, effective_balance,
    horizon_branch, local_today, max_updated_turnover, turnover_capacity, updated_turnover,
};
use crate::models::CompanyData;

/// Line 1 entry for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnoverLine {
    pub fiscal_year: String,
    pub amount: Decimal,
    pub factor: Decimal,
    pub no_factor: bool,
    pub updated_turnover: Decimal,
}

/// Line 5 entry for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBalance {
    pub project_id: Uuid,
    pub name: String,
    pub participation_percentage: Decimal,
    pub branch: HorizonBranch,
    pub effective_balance: Decimal,
    pub adjusted_balance: Decimal,
}

/// Result of a worksheet run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidCapacityResult {
    /// Day the analysis horizon is measured from.
    pub as_of: NaiveDate,

    /// Line 1.
    pub turnover: Vec<TurnoverLine>,

    /// Line 2 (A).
    pub max_updated_turnover: Decimal,

    /// Line 3 (N).
    pub n_value: Decimal,

    /// Line 4, rounded for display; line 8 uses the unrounded product.
    pub turnover_capacity: Decimal,

    /// Line 5.
    pub projects: Vec<ProjectBalance>,

    /// Line 6 (B).
    pub aggregate_commitments: Decimal,

    /// Line 7 (C).
    pub bonus: Decimal,

    /// Line 8.
    pub bid_capacity: Decimal,
}

/// Calculator for the bid capacity worksheet, pinned to a reference day.
#[derive(Debug, Clone)]
pub struct BidCapacityWorksheet {
    as_of: NaiveDate,
}

impl BidCapacityWorksheet {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    /// A worksheet measured from the local calendar day.
    pub fn today() -> Self {
        Self::new(local_today())
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Fills in every line of the worksheet for `company`.
    pub fn calculate(
        &self,
        company: &CompanyData,
    ) -> BidCapacityResult {
        let turnover = self.turnover_lines(company);
        let a = max_updated_turnover(&company.turnover_data);
        let n = company.n_value;
        let capacity = turnover_capacity(a, n);

        let projects = self.project_balances(company);
        let b = aggregate_commitments(&company.projects, n, self.as_of);
        let c = company.c_value;

        let bid_capacity = bid_capacity(company, self.as_of);
        if bid_capacity < Decimal::ZERO {
            warn!(
                a = %a,
                n = %n,
                b = %b,
                c = %c,
                bid_capacity = %bid_capacity,
                "Commitments exceed turnover capacity plus bonus"
            );
        }

        info!(
            company = %company.company_name,
            as_of = %self.as_of,
            bid_capacity = %bid_capacity,
            "bid capacity calculated"
        );

        BidCapacityResult {
            as_of: self.as_of,
            turnover,
            max_updated_turnover: a,
            n_value: n,
            turnover_capacity: round_half_up(capacity),
            projects,
            aggregate_commitments: b,
            bonus: c,
            bid_capacity,
        }
    }

    fn turnover_lines(
        &self,
        company: &CompanyData,
    ) -> Vec<TurnoverLine> {
        company
            .turnover_data
            .iter()
            .map(|year| TurnoverLine {
                fiscal_year: year.fiscal_year.clone(),
                amount: year.amount,
                factor: year.factor.value(),
                no_factor: year.factor.is_no_factor(),
                updated_turnover: updated_turnover(year.amount, year.factor.value()),
            })
            .collect()
    }

    fn project_balances(
        &self,
        company: &CompanyData,
    ) -> Vec<ProjectBalance> {
        company
            .projects
            .iter()
            .map(|project| {
                let effective = effective_balance(project, company.n_value, self.as_of);
                ProjectBalance {
                    project_id: project.id,
                    name: project.name.clone(),
                    participation_percentage: project.participation_percentage,
                    branch: horizon_branch(project, company.n_value, self.as_of),
                    effective_balance: effective,
                    adjusted_balance: adjusted_balance(project.participation_percentage, effective),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_subscriber::fmt::format::FmtSpan;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Project, TurnoverYear, UpdationFactor};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    /// Initializes tracing subscriber for tests that verify log output.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn test_company() -> CompanyData {
        let factors = [dec!(1.20), dec!(1.15), dec!(1.10), dec!(1.05), dec!(1.00)];
        let mut company = CompanyData::new("Acme Constructions", "12 Park Street");
        for (year, factor) in company.turnover_data.iter_mut().zip(factors) {
            year.amount = dec!(10);
            year.factor = UpdationFactor::Factor(factor);
        }
        company.n_value = dec!(3);
        company.c_value = dec!(5);
        company.projects = vec![
            Project {
                name: "Flyover".to_string(),
                participation_percentage: dec!(50),
                contract_value: dec!(100),
                completed_value: dec!(40),
                anticipated_completion_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                ..Project::skeleton()
            },
        ];
        company
    }

    #[test]
    fn calculate_reports_every_line() {
        let result = BidCapacityWorksheet::new(as_of()).calculate(&test_company());

        assert_eq!(result.turnover.len(), 5);
        assert_eq!(result.turnover[0].updated_turnover, dec!(12.00));
        assert_eq!(result.turnover[4].updated_turnover, dec!(10.00));
        assert_eq!(result.max_updated_turnover, dec!(12.00));
        assert_eq!(result.n_value, dec!(3));
        assert_eq!(result.turnover_capacity, dec!(90.00));
        assert_eq!(result.aggregate_commitments, dec!(30.00));
        assert_eq!(result.bonus, dec!(5));
        assert_eq!(result.bid_capacity, dec!(65.00));
    }

    #[test]
    fn calculate_records_project_branch() {
        let result = BidCapacityWorksheet::new(as_of()).calculate(&test_company());

        let line = &result.projects[0];
        assert_eq!(line.name, "Flyover");
        assert_eq!(line.branch, HorizonBranch::WithinHorizon);
        assert_eq!(line.effective_balance, dec!(60));
        assert_eq!(line.adjusted_balance, dec!(30.00));
    }

    #[test]
    fn calculate_agrees_with_formula_functions() {
        let mut company = test_company();
        company.projects.push(Project {
            contract_value: dec!(120),
            construction_period_months: dec!(24),
            anticipated_completion_date: NaiveDate::from_ymd_opt(2031, 3, 31),
            ..Project::skeleton()
        });

        let result = BidCapacityWorksheet::new(as_of()).calculate(&company);

        assert_eq!(
            result.aggregate_commitments,
            aggregate_commitments(&company.projects, company.n_value, as_of())
        );
        assert_eq!(result.bid_capacity, bid_capacity(&company, as_of()));
        assert_eq!(result.projects[1].branch, HorizonBranch::BeyondHorizon);
        assert_eq!(result.projects[1].effective_balance, dec!(180));
    }

    #[test]
    fn calculate_marks_no_factor_years() {
        let mut company = test_company();
        company.turnover_data[2] = TurnoverYear::new("2022-23", dec!(8), UpdationFactor::NoFactor);

        let result = BidCapacityWorksheet::new(as_of()).calculate(&company);

        assert!(result.turnover[2].no_factor);
        assert_eq!(result.turnover[2].factor, dec!(1));
        assert_eq!(result.turnover[2].updated_turnover, dec!(8.00));
    }

    #[test]
    fn calculate_negative_capacity_logs_warning() {
        let _guard = init_test_tracing();
        let mut company = test_company();
        company.projects[0].contract_value = dec!(1000);

        let result = BidCapacityWorksheet::new(as_of()).calculate(&company);

        // 90 − 480 + 5
        assert_eq!(result.bid_capacity, dec!(-385.00));
    }

    #[test]
    fn commitments_equal_sum_of_project_lines() {
        let mut company = test_company();
        company.projects.push(Project {
            participation_percentage: dec!(33.333),
            contract_value: dec!(10),
            anticipated_completion_date: NaiveDate::from_ymd_opt(2025, 6, 1),
            ..Project::skeleton()
        });

        let result = BidCapacityWorksheet::new(as_of()).calculate(&company);

        let summed: Decimal = result.projects.iter().map(|p| p.adjusted_balance).sum();
        assert_eq!(result.aggregate_commitments, summed);
        assert_eq!(result.aggregate_commitments, dec!(33.33));
    }

    #[test]
    fn enormous_n_does_not_panic() {
        let _guard = init_test_tracing();
        let mut company = test_company();
        company.n_value = dec!(10000000000000000000000000000);

        let result = BidCapacityWorksheet::new(as_of()).calculate(&company);

        assert_eq!(result.turnover_capacity, Decimal::MAX);
        assert_eq!(result.bid_capacity, Decimal::MAX - dec!(25));
    }

    #[test]
    fn worksheet_keeps_reference_day() {
        let worksheet = BidCapacityWorksheet::new(as_of());

        assert_eq!(worksheet.as_of(), as_of());
        assert_eq!(worksheet.calculate(&test_company()).as_of, as_of());
    }
}
