//! In-memory object storage.

use nugu_error::{NotFoundError, NotFoundErrorKind, NuguResult};
use nugu_interface::{ObjectMetadata, ObjectStorage};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Object storage held in a map. Contents are lost on drop.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an object exists under `key`.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(&self, data: &[u8], _metadata: &ObjectMetadata) -> NuguResult<String> {
        let key = Uuid::new_v4().simple().to_string();
        self.objects.write().await.insert(key.clone(), data.to_vec());
        Ok(key)
    }

    async fn get(&self, key: &str) -> NuguResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| NotFoundError::new(NotFoundErrorKind::Object(key.to_string())).into())
    }

    async fn delete(&self, key: &str) -> NuguResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}
