//! Advisory field validation.
//!
//! Nothing here blocks a calculation or a save; the messages are meant to be
//! shown next to the offending field.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::models::{CompanyData, Project};

/// Fields that can carry a validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Field {
    CompanyName,
    RegisteredAddress,
    ParticipationPercentage,
    ConstructionPeriodMonths,
    ContractValue,
    CompletedValue,
    AnticipatedCompletionDate,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CompanyName => "Company Name",
            Self::RegisteredAddress => "Registered Address",
            Self::ParticipationPercentage => "Participation %",
            Self::ConstructionPeriodMonths => "Construction Period (Months)",
            Self::ContractValue => "Contract Value",
            Self::CompletedValue => "Value of Work Completed",
            Self::AnticipatedCompletionDate => "Anticipated Completion Date",
        }
    }
}

/// A message attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(
        field: Field,
        message: &'static str,
    ) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.label(), self.message)
    }
}

const NOT_NEGATIVE: &str = "Cannot be negative";

/// Every problem with `project`, in field order.
pub fn project_errors(project: &Project) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if project.participation_percentage < Decimal::ZERO
        || project.participation_percentage > dec!(100)
    {
        errors.push(FieldError::new(Field::ParticipationPercentage, "0 - 100%"));
    }
    if project.construction_period_months < Decimal::ZERO {
        errors.push(FieldError::new(Field::ConstructionPeriodMonths, NOT_NEGATIVE));
    }
    if project.contract_value < Decimal::ZERO {
        errors.push(FieldError::new(Field::ContractValue, NOT_NEGATIVE));
    }
    if project.completed_value < Decimal::ZERO {
        errors.push(FieldError::new(Field::CompletedValue, NOT_NEGATIVE));
    }
    if let (Some(start), Some(completion)) = (project.start_date, project.anticipated_completion_date) {
        if completion <= start {
            errors.push(FieldError::new(
                Field::AnticipatedCompletionDate,
                "Must be after Start Date",
            ));
        }
    }

    errors
}

/// Onboarding requires both a name and an address.
pub fn company_details_errors(
    company_name: &str,
    registered_address: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if company_name.trim().is_empty() {
        errors.push(FieldError::new(Field::CompanyName, "Required"));
    }
    if registered_address.trim().is_empty() {
        errors.push(FieldError::new(Field::RegisteredAddress, "Required"));
    }
    errors
}

/// Projects that need attention, with their messages.
pub fn company_project_errors(company: &CompanyData) -> Vec<(&Project, Vec<FieldError>)> {
    company
        .projects
        .iter()
        .map(|project| (project, project_errors(project)))
        .filter(|(_, errors)| !errors.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn skeleton_project_is_valid() {
        assert_eq!(project_errors(&Project::skeleton()), vec![]);
    }

    #[test]
    fn participation_out_of_range_is_flagged() {
        for pct in [dec!(-1), dec!(100.01)] {
            let project = Project {
                participation_percentage: pct,
                ..Project::skeleton()
            };

            assert_eq!(
                project_errors(&project),
                vec![FieldError::new(Field::ParticipationPercentage, "0 - 100%")]
            );
        }
    }

    #[test]
    fn participation_bounds_are_inclusive() {
        for pct in [dec!(0), dec!(100)] {
            let project = Project {
                participation_percentage: pct,
                ..Project::skeleton()
            };

            assert!(project_errors(&project).is_empty());
        }
    }

    #[test]
    fn negative_amounts_are_flagged() {
        let project = Project {
            construction_period_months: dec!(-1),
            contract_value: dec!(-5),
            completed_value: dec!(-0.01),
            ..Project::skeleton()
        };

        let fields: Vec<Field> = project_errors(&project).iter().map(|e| e.field).collect();

        assert_eq!(
            fields,
            vec![
                Field::ConstructionPeriodMonths,
                Field::ContractValue,
                Field::CompletedValue
            ]
        );
    }

    #[test]
    fn completion_on_or_before_start_is_flagged() {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1);
        for completion in [start, NaiveDate::from_ymd_opt(2024, 3, 31)] {
            let project = Project {
                start_date: start,
                anticipated_completion_date: completion,
                ..Project::skeleton()
            };

            assert_eq!(
                project_errors(&project),
                vec![FieldError::new(
                    Field::AnticipatedCompletionDate,
                    "Must be after Start Date"
                )]
            );
        }
    }

    #[test]
    fn date_order_is_skipped_when_a_date_is_missing() {
        let project = Project {
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1),
            anticipated_completion_date: None,
            ..Project::skeleton()
        };

        assert!(project_errors(&project).is_empty());
    }

    #[test]
    fn blank_company_details_are_flagged() {
        let errors = company_details_errors("  ", "");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].to_string(), "Company Name: Required");
    }

    #[test]
    fn company_project_errors_lists_only_problem_projects() {
        let mut company = CompanyData::new("Acme", "Somewhere");
        company.projects = vec![
            Project::skeleton(),
            Project {
                name: "Bridge".to_string(),
                contract_value: dec!(-1),
                ..Project::skeleton()
            },
        ];

        let flagged = company_project_errors(&company);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].0.name, "Bridge");
    }
}
