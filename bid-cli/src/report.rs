//! Plain-text rendering of a bid capacity worksheet.

use std::fmt::Write;

use bid_core::calculations::{BidCapacityResult, HorizonBranch};
use bid_core::format::{format_crore, format_inr};
use bid_core::validation::FieldError;
use bid_core::{CompanyData, Project};

/// First eight hex digits of a project id; enough to target it on the
/// command line.
pub fn short_id(project: &Project) -> String {
    project.id.simple().to_string().chars().take(8).collect()
}

fn branch_label(branch: HorizonBranch) -> &'static str {
    match branch {
        HorizonBranch::Fallback => "remaining (no schedule)",
        HorizonBranch::WithinHorizon => "remaining",
        HorizonBranch::BeyondHorizon => "pro-rata",
    }
}

/// Dashboard view: headline figure, the formula terms, and one line per
/// project.
pub fn render_dashboard(
    company: &CompanyData,
    result: &BidCapacityResult,
) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_dashboard(&mut out, company, result);
    out
}

fn write_dashboard(
    out: &mut String,
    company: &CompanyData,
    result: &BidCapacityResult,
) -> std::fmt::Result {
    writeln!(out, "{}", company.company_name)?;
    writeln!(out, "{}", company.registered_address)?;
    writeln!(
        out,
        "Last updated {}",
        company.last_updated.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Available bid capacity as of {}: {}",
        result.as_of,
        format_crore(result.bid_capacity)
    )?;
    writeln!(out, "  ({})", format_inr(result.bid_capacity))?;
    writeln!(out)?;

    writeln!(out, "Turnover")?;
    for line in &result.turnover {
        let factor = if line.no_factor {
            "no factor".to_string()
        } else {
            format!("x {:.2}", line.factor)
        };
        writeln!(
            out,
            "  {:<8} {:>16} {:>10} = {}",
            line.fiscal_year,
            format_crore(line.amount),
            factor,
            format_crore(line.updated_turnover)
        )?;
    }
    writeln!(out)?;

    writeln!(out, "A  max updated turnover   {}", format_crore(result.max_updated_turnover))?;
    writeln!(out, "N  completion period      {} years", result.n_value)?;
    writeln!(out, "   A x N x 2.5            {}", format_crore(result.turnover_capacity))?;
    writeln!(out, "B  existing commitments   {}", format_crore(result.aggregate_commitments))?;
    writeln!(out, "C  bonus                  {}", format_crore(result.bonus))?;

    if !result.projects.is_empty() {
        writeln!(out)?;
        writeln!(out, "Projects")?;
        for (project, line) in company.projects.iter().zip(&result.projects) {
            writeln!(
                out,
                "  {} {:<24} {:>6}% {:<24} {:>16} -> {}",
                short_id(project),
                display_name(project),
                line.participation_percentage,
                branch_label(line.branch),
                format_crore(line.effective_balance),
                format_crore(line.adjusted_balance)
            )?;
        }
    }
    Ok(())
}

fn display_name(project: &Project) -> &str {
    if project.name.is_empty() {
        "(unnamed)"
    } else {
        project.name.as_str()
    }
}

/// One line per project: short id, name, contract and completed values.
pub fn render_project_list(projects: &[Project]) -> String {
    let mut out = String::new();
    for project in projects {
        out.push_str(&format!(
            "{} {:<24} {:>16} {:>16}\n",
            short_id(project),
            display_name(project),
            format_crore(project.contract_value),
            format_crore(project.completed_value)
        ));
    }
    out
}

/// One block per project with problems; empty when everything is clean.
pub fn render_validation(
    details: &[FieldError],
    projects: &[(&Project, Vec<FieldError>)],
) -> String {
    let mut out = String::new();
    for error in details {
        out.push_str(&format!("Company: {error}\n"));
    }
    for (project, errors) in projects {
        let name = if project.name.is_empty() {
            project.id.to_string()
        } else {
            project.name.clone()
        };
        out.push_str(&format!("{name}\n"));
        for error in errors {
            out.push_str(&format!("  {error}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use bid_core::calculations::BidCapacityWorksheet;
    use bid_core::validation::{company_details_errors, company_project_errors};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    fn company() -> CompanyData {
        let mut company = CompanyData::new("Acme Constructions", "12 Park Street");
        company.turnover_data[0].amount = dec!(10);
        company.n_value = dec!(2);
        company.c_value = dec!(1.5);
        company.projects.push(Project {
            name: "Ring Road".to_string(),
            participation_percentage: dec!(50),
            contract_value: dec!(10),
            completed_value: dec!(4),
            ..Project::skeleton()
        });
        company
    }

    #[test]
    fn dashboard_shows_headline_and_terms() {
        let company = company();
        let result = BidCapacityWorksheet::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .calculate(&company);

        let text = render_dashboard(&company, &result);

        // 12 × 2 × 2.5 − 3 + 1.5
        assert!(text.contains("as of 2025-01-01: ₹ 58.50 Cr"), "{text}");
        assert!(text.contains("₹58,50,00,000.00"), "{text}");
        assert!(text.contains("A  max updated turnover   ₹ 12.00 Cr"), "{text}");
        assert!(text.contains("B  existing commitments   ₹ 3.00 Cr"), "{text}");
        assert!(text.contains("Ring Road"), "{text}");
        assert!(text.contains("remaining (no schedule)"), "{text}");
    }

    #[test]
    fn dashboard_lines_start_with_short_id() {
        let company = company();
        let result = BidCapacityWorksheet::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .calculate(&company);

        let text = render_dashboard(&company, &result);

        let id = short_id(&company.projects[0]);
        assert_eq!(id.len(), 8);
        assert!(text.contains(&format!("  {id} Ring Road")), "{text}");
    }

    #[test]
    fn project_list_names_unnamed_projects() {
        let projects = vec![Project::skeleton()];

        let text = render_project_list(&projects);

        assert!(text.starts_with(&short_id(&projects[0])), "{text}");
        assert!(text.contains("(unnamed)"), "{text}");
    }

    #[test]
    fn validation_lists_only_problems() {
        let mut company = company();
        company.projects[0].completed_value = dec!(-1);

        let text = render_validation(
            &company_details_errors(&company.company_name, &company.registered_address),
            &company_project_errors(&company),
        );

        assert_eq!(text, "Ring Road\n  Value of Work Completed: Cannot be negative\n");
    }
}
