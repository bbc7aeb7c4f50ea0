use async_trait::async_trait;
use thiserror::Error;

use crate::models::CompanyData;

/// Fixed key the company snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "nexus_bid_data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Storage for the single company snapshot of an installation.
///
/// `save` replaces the whole snapshot; there is no merging and no history
/// beyond [`CompanyData::last_updated`].
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// The last saved snapshot, or `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<CompanyData>, RepositoryError>;

    async fn save(
        &self,
        data: &CompanyData,
    ) -> Result<(), RepositoryError>;

    /// Removes the snapshot. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), RepositoryError>;
}

/// Encodes a snapshot as the stored JSON blob.
pub fn encode_snapshot(data: &CompanyData) -> Result<String, RepositoryError> {
    Ok(serde_json::to_string(data)?)
}

/// Decodes a stored JSON blob.
pub fn decode_snapshot(payload: &str) -> Result<CompanyData, RepositoryError> {
    Ok(serde_json::from_str(payload)?)
}
