//! CSV loaders for ongoing projects and yearly turnover.
//!
//! Headers are matched by name, so column order does not matter. Values are
//! trimmed; amounts may use comma digit grouping. Row numbers in errors are
//! 1-based and count data rows only (the header is row 0). A required
//! column must be present and its cells must not be blank.
//!
//! ## Projects
//!
//! | Column | Required | Type | Notes |
//! |--------------------------------|----------|---------|-----------------------------|
//! | `name` | yes | string | |
//! | `participation_percentage` | no | decimal | Empty cell means `100` |
//! | `start_date` | no | date | `YYYY-MM-DD` |
//! | `construction_period_months` | no | decimal | Empty cell means `12` |
//! | `contract_value` | yes | decimal | Crores |
//! | `completed_value` | no | decimal | Crores, empty cell means `0` |
//! | `anticipated_completion_date` | no | date | `YYYY-MM-DD` |
//!
//! ```csv
//! name,participation_percentage,construction_period_months,contract_value,completed_value,anticipated_completion_date
//! Ring Road,100,24,80.00,20.00,2026-03-31
//! ```
//!
//! ## Turnover
//!
//! | Column | Required | Type | Notes |
//! |----------------|----------|---------|------------------------------------------------|
//! | `fiscal_year` | yes | string | `YYYY-YY`, e.g. `2023-24` |
//! | `amount` | yes | decimal | Crores |
//! | `factor` | no | decimal | `none` for no updation; empty keeps the current |
//!
//! ```csv
//! fiscal_year,amount,factor
//! 2023-24,10.50,1.05
//! 2024-25,12.00,none
//! ```

use std::path::Path;

use bid_core::{Project, UpdationFactor};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::utils::{parse_optional_date, parse_optional_decimal};

// ---------------------------------------------------------------------------
// Serde-compatible rows that mirror the CSV layouts
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProjectRow {
    name: String,
    #[serde(default)]
    participation_percentage: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    construction_period_months: String,
    contract_value: String,
    #[serde(default)]
    completed_value: String,
    #[serde(default)]
    anticipated_completion_date: String,
}

#[derive(Debug, Deserialize)]
struct TurnoverRow {
    fiscal_year: String,
    amount: String,
    #[serde(default)]
    factor: String,
}

/// One line of a turnover import. `factor` is `None` when the cell was
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnoverEntry {
    pub fiscal_year: String,
    pub amount: Decimal,
    pub factor: Option<UpdationFactor>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    #[error("cannot read CSV: {0}")]
    Io(#[from] std::io::Error),

    /// Bad structure, a missing required column, or a short row.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("missing value in column {column} on row {row}")]
    MissingValue { column: &'static str, row: usize },

    #[error("invalid number '{value}' in column {column} on row {row}")]
    InvalidDecimal {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("invalid date '{value}' in column {column} on row {row} (expected YYYY-MM-DD)")]
    InvalidDate {
        column: &'static str,
        value: String,
        row: usize,
    },

    #[error("invalid fiscal year '{value}' on row {row} (expected YYYY-YY)")]
    InvalidFiscalYear { value: String, row: usize },

    #[error("invalid updation factor '{value}' on row {row}")]
    InvalidFactor { value: String, row: usize },

    #[error("fiscal year pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}

// ---------------------------------------------------------------------------
// Cell helpers
// ---------------------------------------------------------------------------

fn required_decimal_cell(
    column: &'static str,
    value: &str,
    row: usize,
) -> Result<Decimal, CsvLoadError> {
    parse_optional_decimal(value)
        .map_err(|_| CsvLoadError::InvalidDecimal {
            column,
            value: value.to_string(),
            row,
        })?
        .ok_or(CsvLoadError::MissingValue { column, row })
}

fn decimal_cell_or(
    column: &'static str,
    value: &str,
    row: usize,
    default: Decimal,
) -> Result<Decimal, CsvLoadError> {
    parse_optional_decimal(value)
        .map(|parsed| parsed.unwrap_or(default))
        .map_err(|_| CsvLoadError::InvalidDecimal {
            column,
            value: value.to_string(),
            row,
        })
}

fn date_cell(
    column: &'static str,
    value: &str,
    row: usize,
) -> Result<Option<chrono::NaiveDate>, CsvLoadError> {
    parse_optional_date(value).map_err(|_| CsvLoadError::InvalidDate {
        column,
        value: value.to_string(),
        row,
    })
}

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes())
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn convert_project_row(
    row: ProjectRow,
    row_number: usize,
) -> Result<Project, CsvLoadError> {
    Ok(Project {
        name: row.name,
        participation_percentage: decimal_cell_or(
            "participation_percentage",
            &row.participation_percentage,
            row_number,
            dec!(100),
        )?,
        start_date: date_cell("start_date", &row.start_date, row_number)?,
        construction_period_months: decimal_cell_or(
            "construction_period_months",
            &row.construction_period_months,
            row_number,
            dec!(12),
        )?,
        contract_value: required_decimal_cell("contract_value", &row.contract_value, row_number)?,
        completed_value: decimal_cell_or(
            "completed_value",
            &row.completed_value,
            row_number,
            Decimal::ZERO,
        )?,
        anticipated_completion_date: date_cell(
            "anticipated_completion_date",
            &row.anticipated_completion_date,
            row_number,
        )?,
        ..Project::skeleton()
    })
}

/// Parses project CSV text. Every project gets a fresh id; rows are
/// returned in file order.
pub fn load_projects_from_str(input: &str) -> Result<Vec<Project>, CsvLoadError> {
    reader(input)
        .deserialize::<ProjectRow>()
        .enumerate()
        .map(|(idx, result)| convert_project_row(result?, idx + 1))
        .collect()
}

pub fn load_projects_from_file(path: &Path) -> Result<Vec<Project>, CsvLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_projects_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Turnover
// ---------------------------------------------------------------------------

fn convert_turnover_row(
    row: TurnoverRow,
    row_number: usize,
    fiscal_year: &Regex,
) -> Result<TurnoverEntry, CsvLoadError> {
    if !fiscal_year.is_match(&row.fiscal_year) {
        return Err(CsvLoadError::InvalidFiscalYear {
            value: row.fiscal_year,
            row: row_number,
        });
    }

    let factor = if row.factor.is_empty() {
        None
    } else {
        Some(
            UpdationFactor::parse(&row.factor).ok_or_else(|| CsvLoadError::InvalidFactor {
                value: row.factor.clone(),
                row: row_number,
            })?,
        )
    };

    Ok(TurnoverEntry {
        amount: required_decimal_cell("amount", &row.amount, row_number)?,
        fiscal_year: row.fiscal_year,
        factor,
    })
}

/// Parses turnover CSV text. Rows are returned in file order.
pub fn load_turnover_from_str(input: &str) -> Result<Vec<TurnoverEntry>, CsvLoadError> {
    let fiscal_year = Regex::new(r"^\d{4}-\d{2}$")?;

    reader(input)
        .deserialize::<TurnoverRow>()
        .enumerate()
        .map(|(idx, result)| convert_turnover_row(result?, idx + 1, &fiscal_year))
        .collect()
}

pub fn load_turnover_from_file(path: &Path) -> Result<Vec<TurnoverEntry>, CsvLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_turnover_from_str(&contents)
}
