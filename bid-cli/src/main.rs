use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bid_cli::app::{self, ProjectEdit};
use bid_cli::config::{AppConfig, StorageBackend};
use bid_cli::logging::{self, LogOptions};
use bid_cli::report::{render_dashboard, render_project_list, render_validation, short_id};
use bid_cli::utils::{parse_date_or_none, parse_decimal};
use bid_core::{CompanyData, CompanyRepository, UpdationFactor};
use bid_core::validation::{company_details_errors, company_project_errors};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

/// Bid capacity calculator for construction tenders.
///
/// Keeps one company's turnover, ongoing projects and bonus, and works out
/// the available bid capacity as (A × N × 2.5) − B + C, all in Crores.
#[derive(Parser, Debug)]
#[command(name = "bidcap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (default: <config dir>/bidcap/config.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend
    #[arg(long, global = true, value_enum)]
    backend: Option<StorageBackend>,

    /// Database location, e.g. bidcap.db or :memory:
    #[arg(short, long, global = true)]
    database: Option<String>,

    /// Log level or EnvFilter directive; RUST_LOG wins over this
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Do not log to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save the company name and registered address.
    Init {
        #[arg(long)]
        name: String,
        #[arg(long)]
        address: String,
    },
    /// Show the bid capacity dashboard.
    Show {
        /// Reference day for the completion horizon (YYYY-MM-DD, default today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print the worksheet as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Set the completion period N, in years.
    SetN {
        #[arg(value_parser = decimal_arg)]
        years: Decimal,
    },
    /// Set the bonus C, in Crores.
    SetC {
        #[arg(value_parser = decimal_arg, allow_negative_numbers = true)]
        crores: Decimal,
    },
    /// Set one fiscal year's turnover, in Crores.
    Turnover {
        /// Fiscal year, e.g. 2023-24
        fiscal_year: String,
        #[arg(value_parser = decimal_arg)]
        amount: Decimal,
        /// Updation factor, e.g. 1.05
        #[arg(long, value_parser = decimal_arg, conflicts_with = "no_factor")]
        factor: Option<Decimal>,
        /// Use no updation factor for this year
        #[arg(long, default_value_t = false)]
        no_factor: bool,
    },
    /// Append ongoing projects from a CSV file.
    ImportProjects { file: PathBuf },
    /// List ongoing projects with their ids.
    Projects {
        /// Only projects whose name contains this text
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Change fields of one project.
    EditProject {
        /// Project id or a unique prefix of it
        id: String,
        #[command(flatten)]
        fields: ProjectFields,
    },
    /// Remove one project.
    RemoveProject {
        /// Project id or a unique prefix of it
        id: String,
    },
    /// Update turnover years from a CSV file.
    ImportTurnover { file: PathBuf },
    /// Print advisory validation messages.
    Validate,
    /// Write the stored company data as JSON.
    Export { path: PathBuf },
    /// Compute bid capacity from a JSON file without touching the store.
    Calc {
        file: PathBuf,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete the stored company data.
    Reset,
}

#[derive(clap::Args, Debug)]
struct ProjectFields {
    #[arg(long)]
    name: Option<String>,
    /// Participation share, in percent
    #[arg(long, value_parser = decimal_arg)]
    participation: Option<Decimal>,
    /// YYYY-MM-DD, or none
    #[arg(long, value_parser = date_arg)]
    start_date: Option<DateArg>,
    #[arg(long, value_parser = decimal_arg)]
    period_months: Option<Decimal>,
    /// Crores
    #[arg(long, value_parser = decimal_arg)]
    contract_value: Option<Decimal>,
    /// Crores
    #[arg(long, value_parser = decimal_arg)]
    completed_value: Option<Decimal>,
    /// YYYY-MM-DD, or none
    #[arg(long, value_parser = date_arg)]
    completion_date: Option<DateArg>,
}

/// A date option that may also clear the date.
#[derive(Debug, Clone, Copy)]
struct DateArg(Option<NaiveDate>);

impl From<ProjectFields> for ProjectEdit {
    fn from(fields: ProjectFields) -> Self {
        ProjectEdit {
            name: fields.name,
            participation_percentage: fields.participation,
            start_date: fields.start_date.map(|d| d.0),
            construction_period_months: fields.period_months,
            contract_value: fields.contract_value,
            completed_value: fields.completed_value,
            anticipated_completion_date: fields.completion_date.map(|d| d.0),
        }
    }
}

fn decimal_arg(s: &str) -> Result<Decimal, String> {
    parse_decimal(s).map_err(|e| e.to_string())
}

fn date_arg(s: &str) -> Result<DateArg, String> {
    parse_date_or_none(s)
        .map(DateArg)
        .map_err(|e| format!("{e} (expected YYYY-MM-DD or none)"))
}

fn print_worksheet(
    company: &CompanyData,
    as_of: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let result = app::calculate(company, as_of);
    if json {
        let text = serde_json::to_string_pretty(&result).context("Failed to encode worksheet")?;
        println!("{text}");
    } else {
        print!("{}", render_dashboard(company, &result));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::resolve(args.config.as_deref()).context("Failed to load config")?;
    if let Some(backend) = args.backend {
        config.database.backend = backend;
    }
    if let Some(database) = args.database {
        config.database.connection_string = database;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(file) = args.log_file {
        config.logging.file = Some(file);
    }

    logging::init_logging(&LogOptions {
        level: config.logging.level.clone(),
        stderr: !args.quiet,
        file: config.logging.file.clone(),
    })?;

    match args.command {
        Command::Calc { file, as_of, json } => calc(&file, as_of, json),
        command => {
            let repo = app::open_store(&config.database).await?;
            run(command, repo.as_ref()).await
        }
    }
}

fn calc(
    file: &Path,
    as_of: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let company = app::read_snapshot_file(file)?;
    print_worksheet(&company, as_of, json)
}

async fn run(
    command: Command,
    repo: &dyn CompanyRepository,
) -> Result<()> {
    match command {
        Command::Init { name, address } => {
            let company = app::init_company(repo, &name, &address).await?;
            println!("Saved company details for {}.", company.company_name);
        }
        Command::Show { as_of, json } => {
            let company = app::load_saved(repo).await?;
            print_worksheet(&company, as_of, json)?;
        }
        Command::SetN { years } => {
            let company = app::set_n_value(repo, years).await?;
            println!("N set to {} years.", company.n_value);
        }
        Command::SetC { crores } => {
            let company = app::set_c_value(repo, crores).await?;
            println!("Bonus set to {}.", bid_core::format::format_crore(company.c_value));
        }
        Command::Turnover {
            fiscal_year,
            amount,
            factor,
            no_factor,
        } => {
            let factor = if no_factor {
                Some(UpdationFactor::NoFactor)
            } else {
                factor.map(UpdationFactor::Factor)
            };
            let company = app::set_turnover(repo, &fiscal_year, amount, factor).await?;
            if let Some(year) = company.turnover_year(&fiscal_year) {
                println!(
                    "{}: {} ({})",
                    year.fiscal_year,
                    bid_core::format::format_crore(year.amount),
                    year.factor
                );
            }
        }
        Command::ImportProjects { file } => {
            let count = app::import_projects(repo, &file).await?;
            println!("Imported {count} projects.");
        }
        Command::Projects { search } => {
            let projects = app::list_projects(repo, &search).await?;
            if projects.is_empty() {
                println!("No projects.");
            } else {
                print!("{}", render_project_list(&projects));
            }
        }
        Command::EditProject { id, fields } => {
            let project = app::edit_project(repo, &id, &fields.into()).await?;
            println!("Updated project {} ({}).", short_id(&project), project.name);
        }
        Command::RemoveProject { id } => {
            let project = app::remove_project(repo, &id).await?;
            println!("Removed project {} ({}).", short_id(&project), project.name);
        }
        Command::ImportTurnover { file } => {
            let count = app::import_turnover(repo, &file).await?;
            println!("Updated {count} turnover years.");
        }
        Command::Validate => {
            let company = app::load_saved(repo).await?;
            let details =
                company_details_errors(&company.company_name, &company.registered_address);
            let projects = company_project_errors(&company);
            if details.is_empty() && projects.is_empty() {
                println!("No problems found.");
            } else {
                print!("{}", render_validation(&details, &projects));
            }
        }
        Command::Export { path } => {
            app::export(repo, &path).await?;
            println!("Wrote {}.", path.display());
        }
        Command::Reset => {
            app::reset(repo).await?;
            println!("Company data cleared.");
        }
        Command::Calc { file, as_of, json } => calc(&file, as_of, json)?,
    }

    Ok(())
}
