use crate::domain::model::Snapshot;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn store_file(&self) -> &str;
}

/// Source of rooms and talks, and sink for the placements of a run.
#[async_trait]
pub trait TalkRepository: Send + Sync {
    async fn load(&self) -> Result<Snapshot>;
    /// Persists the whole snapshot at once; a run is never committed partially.
    async fn commit(&self, snapshot: &Snapshot) -> Result<()>;
}
