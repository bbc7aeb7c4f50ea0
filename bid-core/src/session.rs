//! In-memory editing session.
//!
//! A [`Session`] owns the working copy of the company record (the draft)
//! and the last snapshot handed to a [`CompanyRepository`]. The two only
//! meet on an explicit save, so they may differ while the user is editing.
//! It also tracks where the user is: onboarding, the five-step calculator,
//! or the dashboard.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculations::{BidCapacityResult, BidCapacityWorksheet};
use crate::db::{CompanyRepository, RepositoryError};
use crate::models::{CompanyData, Project, UpdationFactor};
use crate::validation::company_details_errors;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("company name and registered address are required")]
    IncompleteCompanyDetails,

    #[error("no turnover year at position {0}")]
    TurnoverYearOutOfRange(usize),

    #[error("project {0} not found")]
    ProjectNotFound(Uuid),

    #[error("the completion period N must be greater than zero")]
    NValueRequired,

    #[error("no saved company data")]
    NothingSaved,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppView {
    #[default]
    Onboarding,
    Calculator,
    Dashboard,
}

/// Calculator wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalculatorStep {
    #[default]
    Turnover,
    NValue,
    Projects,
    Bonus,
    Summary,
}

impl CalculatorStep {
    pub const ALL: [CalculatorStep; 5] = [
        Self::Turnover,
        Self::NValue,
        Self::Projects,
        Self::Bonus,
        Self::Summary,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Turnover => "Turnover",
            Self::NValue => "N Value",
            Self::Projects => "Projects",
            Self::Bonus => "Bonus",
            Self::Summary => "Summary",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    draft: CompanyData,
    saved: Option<CompanyData>,
    view: AppView,
    step: CalculatorStep,
}

impl Session {
    /// Starts from the stored snapshot when there is one (dashboard, draft
    /// pre-filled), otherwise from an empty record (onboarding).
    pub fn start(saved: Option<CompanyData>) -> Self {
        match saved {
            Some(snapshot) => Self {
                draft: snapshot.clone(),
                saved: Some(snapshot),
                view: AppView::Dashboard,
                step: CalculatorStep::Turnover,
            },
            None => Self {
                draft: CompanyData::new("", ""),
                saved: None,
                view: AppView::Onboarding,
                step: CalculatorStep::Turnover,
            },
        }
    }

    /// Loads the snapshot from `repo` and starts a session on it.
    pub async fn open(repo: &dyn CompanyRepository) -> Result<Self, SessionError> {
        let saved = repo.load().await?;
        debug!(has_snapshot = saved.is_some(), "session opened");
        Ok(Self::start(saved))
    }

    pub fn view(&self) -> AppView {
        self.view
    }

    pub fn step(&self) -> CalculatorStep {
        self.step
    }

    pub fn draft(&self) -> &CompanyData {
        &self.draft
    }

    pub fn saved(&self) -> Option<&CompanyData> {
        self.saved.as_ref()
    }

    // ── onboarding ───────────────────────────────────────────────────────

    pub fn set_company_details(
        &mut self,
        company_name: impl Into<String>,
        registered_address: impl Into<String>,
    ) {
        self.draft.company_name = company_name.into();
        self.draft.registered_address = registered_address.into();
    }

    /// Leaves onboarding: straight into the calculator the first time,
    /// back to the dashboard once something has been saved.
    pub fn submit_company_details(&mut self) -> Result<AppView, SessionError> {
        if !company_details_errors(&self.draft.company_name, &self.draft.registered_address)
            .is_empty()
        {
            return Err(SessionError::IncompleteCompanyDetails);
        }
        self.view = if self.saved.is_some() {
            AppView::Dashboard
        } else {
            AppView::Calculator
        };
        Ok(self.view)
    }

    // ── record edits ─────────────────────────────────────────────────────

    pub fn set_turnover_amount(
        &mut self,
        index: usize,
        amount: Decimal,
    ) -> Result<(), SessionError> {
        let year = self
            .draft
            .turnover_data
            .get_mut(index)
            .ok_or(SessionError::TurnoverYearOutOfRange(index))?;
        year.amount = amount;
        Ok(())
    }

    pub fn set_updation_factor(
        &mut self,
        index: usize,
        factor: UpdationFactor,
    ) -> Result<(), SessionError> {
        let year = self
            .draft
            .turnover_data
            .get_mut(index)
            .ok_or(SessionError::TurnoverYearOutOfRange(index))?;
        year.factor = factor;
        Ok(())
    }

    pub fn set_n_value(
        &mut self,
        n_value: Decimal,
    ) {
        self.draft.n_value = n_value;
    }

    pub fn set_c_value(
        &mut self,
        c_value: Decimal,
    ) {
        self.draft.c_value = c_value;
    }

    /// Appends an empty project and returns its id.
    pub fn add_project(&mut self) -> Uuid {
        let project = Project::skeleton();
        let id = project.id;
        self.draft.projects.push(project);
        debug!(project = %id, "project added");
        id
    }

    /// Applies `edit` to the project with `id`. The id itself cannot be
    /// changed this way.
    pub fn update_project<F>(
        &mut self,
        id: Uuid,
        edit: F,
    ) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Project),
    {
        let project = self
            .draft
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(SessionError::ProjectNotFound(id))?;
        edit(project);
        project.id = id;
        Ok(())
    }

    /// Removes the project with `id`; `false` if there was none.
    pub fn remove_project(
        &mut self,
        id: Uuid,
    ) -> bool {
        let before = self.draft.projects.len();
        self.draft.projects.retain(|p| p.id != id);
        before != self.draft.projects.len()
    }

    /// Projects whose name contains `term`, ignoring case. An empty term
    /// matches everything.
    pub fn search_projects(
        &self,
        term: &str,
    ) -> Vec<&Project> {
        let needle = term.to_lowercase();
        self.draft
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect()
    }

    // ── wizard ───────────────────────────────────────────────────────────

    /// Opens the calculator on whatever step it was left at.
    pub fn edit_full_data(&mut self) {
        self.view = AppView::Calculator;
    }

    /// Moves to the next step. Leaving the N step needs N > 0; the summary
    /// step has no successor and stays put.
    pub fn next_step(&mut self) -> Result<CalculatorStep, SessionError> {
        if self.step == CalculatorStep::NValue && self.draft.n_value <= Decimal::ZERO {
            return Err(SessionError::NValueRequired);
        }
        if let Some(next) = self.step.next() {
            self.step = next;
        }
        Ok(self.step)
    }

    pub fn previous_step(&mut self) -> CalculatorStep {
        if let Some(previous) = self.step.previous() {
            self.step = previous;
        }
        self.step
    }

    // ── persistence ──────────────────────────────────────────────────────

    async fn write_snapshot(
        &mut self,
        repo: &dyn CompanyRepository,
    ) -> Result<(), SessionError> {
        self.draft.last_updated = Utc::now();
        repo.save(&self.draft).await?;
        self.saved = Some(self.draft.clone());
        info!(
            company = %self.draft.company_name,
            projects = self.draft.projects.len(),
            "company data saved"
        );
        Ok(())
    }

    /// Saves the draft and stays where the user is.
    pub async fn save_draft(
        &mut self,
        repo: &dyn CompanyRepository,
    ) -> Result<(), SessionError> {
        self.write_snapshot(repo).await
    }

    /// Saves the draft, then returns to the dashboard with the wizard
    /// rewound to its first step.
    pub async fn save(
        &mut self,
        repo: &dyn CompanyRepository,
    ) -> Result<(), SessionError> {
        self.write_snapshot(repo).await?;
        self.view = AppView::Dashboard;
        self.step = CalculatorStep::Turnover;
        Ok(())
    }

    /// Changes N on the saved snapshot and writes it straight away. The
    /// draft follows; `last_updated` is left alone.
    pub async fn update_dashboard_n(
        &mut self,
        repo: &dyn CompanyRepository,
        n_value: Decimal,
    ) -> Result<(), SessionError> {
        let saved = self.saved.as_ref().ok_or(SessionError::NothingSaved)?;
        let updated = CompanyData {
            n_value,
            ..saved.clone()
        };
        repo.save(&updated).await?;
        self.saved = Some(updated);
        self.draft.n_value = n_value;
        info!(n_value = %n_value, "dashboard N updated");
        Ok(())
    }

    // ── read models ──────────────────────────────────────────────────────

    /// Worksheet over the draft, as shown on the calculator's summary step.
    pub fn calculator_summary(
        &self,
        as_of: NaiveDate,
    ) -> BidCapacityResult {
        BidCapacityWorksheet::new(as_of).calculate(&self.draft)
    }

    /// Worksheet over the saved snapshot, as shown on the dashboard.
    pub fn dashboard_summary(
        &self,
        as_of: NaiveDate,
    ) -> Option<BidCapacityResult> {
        self.saved
            .as_ref()
            .map(|saved| BidCapacityWorksheet::new(as_of).calculate(saved))
    }
}
