use super::{RequestStore, StoreError};
use crate::metrics_defs::{BLOB_DECODE_FAILURES, BLOB_SIZE, RECORDS_APPENDED};
use crate::query::{self, Filter, Page};
use crate::record::Record;
use async_trait::async_trait;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use shared::{counter, histogram};
use std::sync::Arc;

/// Keeps every record in one JSON array stored under a fixed key.
///
/// Appends read the whole array, push the record and write the whole array back. There is
/// no lock and no conditional write: when two appends overlap, the later write wins and the
/// other record is lost. Each write replaces the object completely, so a stored array is
/// never torn.
pub struct BlobStore {
    object_store: Arc<dyn ObjectStore>,
    path: Path,
}

impl BlobStore {
    pub fn new(object_store: Arc<dyn ObjectStore>, key: &str) -> Self {
        BlobStore {
            object_store,
            path: Path::from(key),
        }
    }

    /// Loads the stored records in insertion order.
    ///
    /// A missing object or undecodable content is an empty list.
    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let bytes = match self.object_store.get(&self.path).await {
            Ok(result) => result.bytes().await?,
            Err(object_store::Error::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path,
                    size = bytes.len(),
                    "Stored records could not be decoded, treating as empty"
                );
                counter!(BLOB_DECODE_FAILURES).increment(1);
                Ok(Vec::new())
            }
        }
    }

    async fn store(&self, records: &[Record]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(records)?;
        histogram!(BLOB_SIZE).record(bytes.len() as f64);
        self.object_store
            .put(&self.path, PutPayload::from(bytes))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RequestStore for BlobStore {
    fn name(&self) -> &'static str {
        "blob"
    }

    async fn append(&self, record: &Record) -> Result<(), StoreError> {
        let mut records = self.load().await?;
        records.push(record.clone());
        self.store(&records).await?;

        counter!(RECORDS_APPENDED, "store" => self.name()).increment(1);
        tracing::debug!(total = records.len(), "Appended record to blob");
        Ok(())
    }

    async fn query(&self, filter: &Filter, page: &Page) -> Result<Vec<Record>, StoreError> {
        let records = self.load().await?;
        Ok(query::apply(records, filter, page))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.load().await?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::local::LocalFileSystem;

    const KEY: &str = "analytics/requests.json";

    fn record(timestamp: i64) -> Record {
        Record::new(timestamp, "example.com", "GET", "/", "US")
    }

    #[tokio::test]
    async fn test_appends_in_insertion_order() {
        let object_store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let store = BlobStore::new(object_store.clone(), KEY);

        store.append(&record(2)).await.unwrap();
        store.append(&record(1)).await.unwrap();

        let raw = object_store
            .get(&Path::from(KEY))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        let stored: Vec<Record> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored, vec![record(2), record(1)]);
    }

    #[tokio::test]
    async fn test_malformed_blob_is_empty() {
        let object_store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        object_store
            .put(&Path::from(KEY), PutPayload::from_static(b"{not json"))
            .await
            .unwrap();
        let store = BlobStore::new(object_store, KEY);

        assert_eq!(store.count().await.unwrap(), 0);
        assert!(
            store
                .query(&Filter::default(), &Page::default())
                .await
                .unwrap()
                .is_empty()
        );

        // The write still goes through and replaces the malformed content.
        store.append(&record(7)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_legacy_blob() {
        let object_store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let legacy = br#"[{"timestamp":3,"domain":"a","method":"GET","path":"/","ipcountry":"SE"}]"#;
        object_store
            .put(&Path::from(KEY), PutPayload::from_static(legacy))
            .await
            .unwrap();
        let store = BlobStore::new(object_store, KEY);

        let found = store
            .query(&Filter::default(), &Page::default())
            .await
            .unwrap();
        assert_eq!(found, vec![Record::new(3, "a", "GET", "/", "SE")]);
    }

    #[tokio::test]
    async fn test_filesystem_backend() {
        let dir = tempfile::tempdir().unwrap();
        let object_store: Arc<dyn ObjectStore> =
            Arc::new(LocalFileSystem::new_with_prefix(dir.path()).unwrap());

        BlobStore::new(object_store.clone(), KEY)
            .append(&record(11))
            .await
            .unwrap();

        assert!(dir.path().join("analytics").join("requests.json").exists());
        // A fresh store over the same directory sees the persisted record.
        let reopened = BlobStore::new(object_store, KEY);
        assert_eq!(reopened.count().await.unwrap(), 1);
    }
}
