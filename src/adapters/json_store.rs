use crate::core::{Snapshot, Storage, TalkRepository};
use crate::utils::error::Result;
use async_trait::async_trait;

pub const DEFAULT_STORE_FILE: &str = "conference.json";

/// Keeps rooms and talks together in a single JSON document.
pub struct JsonStore<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> JsonStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[async_trait]
impl<S: Storage> TalkRepository for JsonStore<S> {
    async fn load(&self) -> Result<Snapshot> {
        match self.storage.read_file(&self.file_name).await? {
            Some(data) => {
                let snapshot: Snapshot = serde_json::from_slice(&data)?;
                tracing::debug!(
                    "Read {} rooms and {} talks from {}",
                    snapshot.rooms.len(),
                    snapshot.talks.len(),
                    self.file_name
                );
                Ok(snapshot)
            }
            None => {
                tracing::debug!("{} does not exist yet, starting empty", self.file_name);
                Ok(Snapshot::default())
            }
        }
    }

    async fn commit(&self, snapshot: &Snapshot) -> Result<()> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        tracing::debug!("Writing {} bytes to {}", data.len(), self.file_name);
        self.storage.write_file(&self.file_name, &data).await
    }
}
