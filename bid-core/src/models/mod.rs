mod company_data;
mod project;
mod turnover_year;

pub use company_data::CompanyData;
pub use project::Project;
pub use turnover_year::{TurnoverYear, UpdationFactor};
