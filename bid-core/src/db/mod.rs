pub mod memory;
pub mod repository;

pub use memory::MemoryRepository;
pub use repository::{CompanyRepository, RepositoryError, SNAPSHOT_KEY};
