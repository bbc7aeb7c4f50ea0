//! Command handlers behind `bidcap`.
//!
//! Each handler opens a [`Session`] on the stored snapshot, applies one
//! change, and saves. Nothing here prints; `main` decides what to show.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use bid_core::calculations::{BidCapacityResult, BidCapacityWorksheet};
use bid_core::db::MemoryRepository;
use bid_core::db::repository::decode_snapshot;
use bid_core::{CompanyData, CompanyRepository, Project, Session, UpdationFactor};
use bid_db_sqlite::SqliteRepository;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::{DatabaseSection, StorageBackend};
use crate::csv_loader::{load_projects_from_file, load_turnover_from_file};

/// Opens the configured store, creating and migrating a SQLite file on
/// first use.
pub async fn open_store(database: &DatabaseSection) -> Result<Box<dyn CompanyRepository>> {
    match database.backend {
        StorageBackend::Sqlite => {
            let repo = SqliteRepository::open(&database.connection_string)
                .await
                .with_context(|| {
                    format!("Failed to open sqlite store at '{}'", database.connection_string)
                })?;
            Ok(Box::new(repo))
        }
        StorageBackend::Memory => {
            warn!("memory store in use; changes are discarded on exit");
            Ok(Box::new(MemoryRepository::new()))
        }
    }
}

async fn open_saved_session(repo: &dyn CompanyRepository) -> Result<Session> {
    let session = Session::open(repo)
        .await
        .context("Failed to load company data")?;
    if session.saved().is_none() {
        bail!("No company data saved yet; run `bidcap init` first");
    }
    Ok(session)
}

/// The stored snapshot; an error if there is none.
pub async fn load_saved(repo: &dyn CompanyRepository) -> Result<CompanyData> {
    repo.load()
        .await
        .context("Failed to load company data")?
        .ok_or_else(|| anyhow!("No company data saved yet; run `bidcap init` first"))
}

/// Onboarding. Creates the default record on first use; afterwards only the
/// name and address change.
pub async fn init_company(
    repo: &dyn CompanyRepository,
    name: &str,
    address: &str,
) -> Result<CompanyData> {
    let mut session = Session::open(repo).await?;
    session.set_company_details(name, address);
    session
        .submit_company_details()
        .context("Company name and registered address are both required")?;
    session.save(repo).await.context("Failed to save company data")?;
    info!(company = %name, "company details saved");
    Ok(session.draft().clone())
}

pub async fn set_n_value(
    repo: &dyn CompanyRepository,
    n_value: Decimal,
) -> Result<CompanyData> {
    if n_value <= Decimal::ZERO {
        bail!("N must be greater than zero (got {n_value})");
    }
    let mut session = open_saved_session(repo).await?;
    session
        .update_dashboard_n(repo, n_value)
        .await
        .context("Failed to update N")?;
    Ok(session.draft().clone())
}

pub async fn set_c_value(
    repo: &dyn CompanyRepository,
    c_value: Decimal,
) -> Result<CompanyData> {
    let mut session = open_saved_session(repo).await?;
    session.set_c_value(c_value);
    session.save(repo).await.context("Failed to save bonus")?;
    Ok(session.draft().clone())
}

fn turnover_index(
    company: &CompanyData,
    fiscal_year: &str,
) -> Result<usize> {
    company
        .turnover_data
        .iter()
        .position(|y| y.fiscal_year == fiscal_year)
        .ok_or_else(|| {
            let known: Vec<&str> = company
                .turnover_data
                .iter()
                .map(|y| y.fiscal_year.as_str())
                .collect();
            anyhow!("Unknown fiscal year '{fiscal_year}'; expected one of {known:?}")
        })
}

/// Sets one year's amount, and its factor when `factor` is given.
pub async fn set_turnover(
    repo: &dyn CompanyRepository,
    fiscal_year: &str,
    amount: Decimal,
    factor: Option<UpdationFactor>,
) -> Result<CompanyData> {
    let mut session = open_saved_session(repo).await?;
    let index = turnover_index(session.draft(), fiscal_year)?;
    session.set_turnover_amount(index, amount)?;
    if let Some(factor) = factor {
        session.set_updation_factor(index, factor)?;
    }
    session.save(repo).await.context("Failed to save turnover")?;
    Ok(session.draft().clone())
}

/// Appends every project in the CSV file. Returns how many were added.
pub async fn import_projects(
    repo: &dyn CompanyRepository,
    path: &Path,
) -> Result<usize> {
    let projects = load_projects_from_file(path)
        .with_context(|| format!("Failed to load projects from {}", path.display()))?;
    let mut session = open_saved_session(repo).await?;

    for project in &projects {
        let id = session.add_project();
        session.update_project(id, |p| *p = project.clone())?;
    }
    session.save(repo).await.context("Failed to save projects")?;

    info!(count = projects.len(), file = %path.display(), "projects imported");
    Ok(projects.len())
}

/// Applies every row of the turnover CSV file. Returns how many years were
/// updated.
pub async fn import_turnover(
    repo: &dyn CompanyRepository,
    path: &Path,
) -> Result<usize> {
    let entries = load_turnover_from_file(path)
        .with_context(|| format!("Failed to load turnover from {}", path.display()))?;
    let mut session = open_saved_session(repo).await?;

    for entry in &entries {
        let index = turnover_index(session.draft(), &entry.fiscal_year)?;
        session.set_turnover_amount(index, entry.amount)?;
        if let Some(factor) = entry.factor {
            session.set_updation_factor(index, factor)?;
        }
    }
    session.save(repo).await.context("Failed to save turnover")?;

    info!(count = entries.len(), file = %path.display(), "turnover imported");
    Ok(entries.len())
}

/// Field changes for one project. `None` leaves a field as it is; the
/// doubled options on dates can also clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectEdit {
    pub name: Option<String>,
    pub participation_percentage: Option<Decimal>,
    pub start_date: Option<Option<NaiveDate>>,
    pub construction_period_months: Option<Decimal>,
    pub contract_value: Option<Decimal>,
    pub completed_value: Option<Decimal>,
    pub anticipated_completion_date: Option<Option<NaiveDate>>,
}

impl ProjectEdit {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(
        &self,
        project: &mut Project,
    ) {
        if let Some(name) = &self.name {
            project.name = name.clone();
        }
        if let Some(value) = self.participation_percentage {
            project.participation_percentage = value;
        }
        if let Some(date) = self.start_date {
            project.start_date = date;
        }
        if let Some(value) = self.construction_period_months {
            project.construction_period_months = value;
        }
        if let Some(value) = self.contract_value {
            project.contract_value = value;
        }
        if let Some(value) = self.completed_value {
            project.completed_value = value;
        }
        if let Some(date) = self.anticipated_completion_date {
            project.anticipated_completion_date = date;
        }
    }
}

/// The project whose id starts with `id`, hyphens optional. The prefix must
/// pick out exactly one project.
fn find_project<'a>(
    company: &'a CompanyData,
    id: &str,
) -> Result<&'a Project> {
    let needle = id.trim().to_lowercase();
    if needle.is_empty() {
        bail!("Project id is empty");
    }
    let matches: Vec<&Project> = company
        .projects
        .iter()
        .filter(|p| {
            p.id.hyphenated().to_string().starts_with(&needle)
                || p.id.simple().to_string().starts_with(&needle)
        })
        .collect();
    match matches.as_slice() {
        [project] => Ok(*project),
        [] => bail!("No project with id '{id}'; `bidcap projects` lists them"),
        _ => bail!("Project id '{id}' matches {} projects; give more characters", matches.len()),
    }
}

/// Projects whose name contains `term`, in stored order.
pub async fn list_projects(
    repo: &dyn CompanyRepository,
    term: &str,
) -> Result<Vec<Project>> {
    let session = open_saved_session(repo).await?;
    Ok(session.search_projects(term).into_iter().cloned().collect())
}

/// Applies `edit` to one project and saves. Returns the project as stored.
pub async fn edit_project(
    repo: &dyn CompanyRepository,
    id: &str,
    edit: &ProjectEdit,
) -> Result<Project> {
    if edit.is_empty() {
        bail!("Nothing to change; pass at least one field option");
    }
    let mut session = open_saved_session(repo).await?;
    let id = find_project(session.draft(), id)?.id;

    session.update_project(id, |project| edit.apply(project))?;
    session.save(repo).await.context("Failed to save project")?;
    info!(project = %id, "project updated");

    find_project(session.draft(), &id.to_string()).cloned()
}

/// Deletes one project and saves. Returns the project that was removed.
pub async fn remove_project(
    repo: &dyn CompanyRepository,
    id: &str,
) -> Result<Project> {
    let mut session = open_saved_session(repo).await?;
    let project = find_project(session.draft(), id)?.clone();

    session.remove_project(project.id);
    session.save(repo).await.context("Failed to save projects")?;
    info!(project = %project.id, name = %project.name, "project removed");
    Ok(project)
}

/// Removes the stored snapshot.
pub async fn reset(repo: &dyn CompanyRepository) -> Result<()> {
    repo.clear().await.context("Failed to clear company data")?;
    warn!("company data cleared");
    Ok(())
}

/// Writes the stored snapshot to `path` as pretty-printed JSON.
pub async fn export(
    repo: &dyn CompanyRepository,
    path: &Path,
) -> Result<()> {
    let company = load_saved(repo).await?;
    let json = serde_json::to_string_pretty(&company).context("Failed to encode snapshot")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Reads a snapshot JSON file in the stored format.
pub fn read_snapshot_file(path: &Path) -> Result<CompanyData> {
    let payload =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    decode_snapshot(&payload).with_context(|| format!("Invalid company data in {}", path.display()))
}

pub fn calculate(
    company: &CompanyData,
    as_of: Option<NaiveDate>,
) -> BidCapacityResult {
    let worksheet = match as_of {
        Some(day) => BidCapacityWorksheet::new(day),
        None => BidCapacityWorksheet::today(),
    };
    worksheet.calculate(company)
}
