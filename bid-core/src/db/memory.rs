use async_trait::async_trait;
use tokio::sync::Mutex;

use super::repository::{CompanyRepository, RepositoryError, decode_snapshot, encode_snapshot};
use crate::models::CompanyData;

/// Keeps the snapshot in process memory, encoded exactly as a persistent
/// backend would store it.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    blob: Mutex<Option<String>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompanyRepository for MemoryRepository {
    async fn load(&self) -> Result<Option<CompanyData>, RepositoryError> {
        let blob = self.blob.lock().await;
        blob.as_deref().map(decode_snapshot).transpose()
    }

    async fn save(
        &self,
        data: &CompanyData,
    ) -> Result<(), RepositoryError> {
        let encoded = encode_snapshot(data)?;
        *self.blob.lock().await = Some(encoded);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        *self.blob.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let repo = MemoryRepository::new();

        assert_eq!(repo.load().await, Ok(None));
    }

    #[tokio::test]
    async fn save_then_load_returns_snapshot() {
        let repo = MemoryRepository::new();
        let mut data = CompanyData::new("Acme", "Somewhere");
        data.c_value = dec!(5);

        repo.save(&data).await.unwrap();

        assert_eq!(repo.load().await, Ok(Some(data)));
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let repo = MemoryRepository::new();
        repo.save(&CompanyData::new("First", "A")).await.unwrap();
        repo.save(&CompanyData::new("Second", "B")).await.unwrap();

        let loaded = repo.load().await.unwrap().unwrap();

        assert_eq!(loaded.company_name, "Second");
    }

    #[tokio::test]
    async fn clear_removes_snapshot() {
        let repo = MemoryRepository::new();
        repo.save(&CompanyData::new("Acme", "Somewhere")).await.unwrap();

        repo.clear().await.unwrap();

        assert_eq!(repo.load().await, Ok(None));
    }
}
