pub mod calculations;
pub mod db;
pub mod format;
pub mod models;
pub mod session;
pub mod validation;

pub use db::repository::{CompanyRepository, RepositoryError};
pub use models::*;
pub use session::{AppView, CalculatorStep, Session, SessionError};
