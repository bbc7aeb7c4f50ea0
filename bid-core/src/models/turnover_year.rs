use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Multiplier used to bring a historical turnover figure up to current
/// price levels.
///
/// `NoFactor` is the explicit "No Updation Factor" choice. It always
/// behaves as a multiplier of `1.00`, but stays distinguishable from an
/// explicitly selected `Factor(1.00)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdationFactor {
    Factor(Decimal),
    NoFactor,
}

impl UpdationFactor {
    /// The selectable factors, in the order they are offered.
    pub const CHOICES: [UpdationFactor; 6] = [
        UpdationFactor::Factor(dec!(1.20)),
        UpdationFactor::Factor(dec!(1.15)),
        UpdationFactor::Factor(dec!(1.10)),
        UpdationFactor::Factor(dec!(1.05)),
        UpdationFactor::Factor(dec!(1.00)),
        UpdationFactor::NoFactor,
    ];

    /// Multiplier applied to the turnover amount.
    pub fn value(&self) -> Decimal {
        match self {
            Self::Factor(value) => *value,
            Self::NoFactor => Decimal::ONE,
        }
    }

    pub fn is_no_factor(&self) -> bool {
        matches!(self, Self::NoFactor)
    }

    /// Parses `"none"` / `"no"` (any case) as [`UpdationFactor::NoFactor`],
    /// anything else as a decimal multiplier.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("none") || trimmed.eq_ignore_ascii_case("no") {
            return Some(Self::NoFactor);
        }
        trimmed.parse::<Decimal>().ok().map(Self::Factor)
    }
}

impl fmt::Display for UpdationFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factor(value) => write!(f, "{:.2}", value),
            Self::NoFactor => write!(f, "No Updation Factor"),
        }
    }
}

/// One fiscal year's reported turnover, in Crores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TurnoverYearRecord", into = "TurnoverYearRecord")]
pub struct TurnoverYear {
    pub fiscal_year: String,
    pub amount: Decimal,
    pub factor: UpdationFactor,
}

impl TurnoverYear {
    pub fn new(
        fiscal_year: impl Into<String>,
        amount: Decimal,
        factor: UpdationFactor,
    ) -> Self {
        Self {
            fiscal_year: fiscal_year.into(),
            amount,
            factor,
        }
    }

    /// The fixed five-year set a new company starts with: zero amounts and
    /// the customary sliding factors, oldest year first.
    pub fn default_set() -> Vec<TurnoverYear> {
        [
            ("2020-21", dec!(1.20)),
            ("2021-22", dec!(1.15)),
            ("2022-23", dec!(1.10)),
            ("2023-24", dec!(1.05)),
            ("2024-25", dec!(1.00)),
        ]
        .into_iter()
        .map(|(year, factor)| TurnoverYear::new(year, Decimal::ZERO, UpdationFactor::Factor(factor)))
        .collect()
    }
}

/// Stored shape: the factor is kept as a number plus an `isNoFactor` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnoverYearRecord {
    fiscal_year: String,
    amount: Decimal,
    updation_factor: Decimal,
    #[serde(default)]
    is_no_factor: bool,
}

impl From<TurnoverYearRecord> for TurnoverYear {
    fn from(record: TurnoverYearRecord) -> Self {
        // The flag wins over whatever number was stored next to it.
        let factor = if record.is_no_factor {
            UpdationFactor::NoFactor
        } else {
            UpdationFactor::Factor(record.updation_factor)
        };
        Self {
            fiscal_year: record.fiscal_year,
            amount: record.amount,
            factor,
        }
    }
}

impl From<TurnoverYear> for TurnoverYearRecord {
    fn from(year: TurnoverYear) -> Self {
        Self {
            fiscal_year: year.fiscal_year,
            amount: year.amount,
            updation_factor: year.factor.value(),
            is_no_factor: year.factor.is_no_factor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn no_factor_is_worth_one() {
        assert_eq!(UpdationFactor::NoFactor.value(), dec!(1.00));
    }

    #[test]
    fn parse_accepts_none_and_decimals() {
        assert_eq!(UpdationFactor::parse("None"), Some(UpdationFactor::NoFactor));
        assert_eq!(
            UpdationFactor::parse(" 1.15 "),
            Some(UpdationFactor::Factor(dec!(1.15)))
        );
        assert_eq!(UpdationFactor::parse("abc"), None);
    }

    #[test]
    fn display_matches_choice_labels() {
        let labels: Vec<String> = UpdationFactor::CHOICES
            .iter()
            .map(|f| f.to_string())
            .collect();

        assert_eq!(
            labels,
            vec!["1.20", "1.15", "1.10", "1.05", "1.00", "No Updation Factor"]
        );
    }

    #[test]
    fn default_set_has_five_years_oldest_first() {
        let years = TurnoverYear::default_set();

        assert_eq!(years.len(), 5);
        assert_eq!(years[0].fiscal_year, "2020-21");
        assert_eq!(years[0].factor, UpdationFactor::Factor(dec!(1.20)));
        assert_eq!(years[4].fiscal_year, "2024-25");
        assert!(years.iter().all(|y| y.amount == Decimal::ZERO));
    }

    #[test]
    fn flag_wins_over_stored_number() {
        let stored = json!({
            "fiscalYear": "2021-22",
            "amount": 10,
            "updationFactor": 1.15,
            "isNoFactor": true
        });

        let year: TurnoverYear = serde_json::from_value(stored).unwrap();

        assert_eq!(year.factor, UpdationFactor::NoFactor);
    }

    #[test]
    fn no_factor_serializes_as_one_with_flag() {
        let year = TurnoverYear::new("2024-25", dec!(3.5), UpdationFactor::NoFactor);

        let value = serde_json::to_value(&year).unwrap();

        assert_eq!(value["updationFactor"], json!(1.0));
        assert_eq!(value["isNoFactor"], json!(true));
        assert_eq!(value["fiscalYear"], json!("2024-25"));
    }
}
