use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Project, TurnoverYear};

/// Everything persisted for the one company of an installation.
///
/// The same shape serves as the working draft and as the saved snapshot.
/// `n_value` of zero means the completion period has not been entered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyData {
    pub company_name: String,
    pub registered_address: String,
    pub turnover_data: Vec<TurnoverYear>,
    pub n_value: Decimal,
    #[serde(default)]
    pub projects: Vec<Project>,
    pub c_value: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl CompanyData {
    /// A fresh record with the default five-year turnover set and nothing
    /// else filled in.
    pub fn new(
        company_name: impl Into<String>,
        registered_address: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            registered_address: registered_address.into(),
            turnover_data: TurnoverYear::default_set(),
            n_value: Decimal::ZERO,
            projects: Vec::new(),
            c_value: Decimal::ZERO,
            last_updated: Utc::now(),
        }
    }

    pub fn project(&self, id: uuid::Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn turnover_year(&self, fiscal_year: &str) -> Option<&TurnoverYear> {
        self.turnover_data
            .iter()
            .find(|y| y.fiscal_year == fiscal_year)
    }
}
