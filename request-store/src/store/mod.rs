mod blob;
mod table;

pub use blob::BlobStore;
pub use table::TableStore;

use crate::config::{BlobBackend, StoreConfig};
use crate::query::{Filter, Page};
use crate::record::Record;
use async_trait::async_trait;
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("could not encode records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence for request records.
///
/// Both implementations return query results in the same order, see [`crate::query`].
#[async_trait]
pub trait RequestStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn append(&self, record: &Record) -> Result<(), StoreError>;

    async fn query(&self, filter: &Filter, page: &Page) -> Result<Vec<Record>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}

pub async fn open_store(config: StoreConfig) -> Result<Arc<dyn RequestStore>, StoreError> {
    let store: Arc<dyn RequestStore> = match config {
        StoreConfig::Blob { key, backend } => {
            let object_store = open_object_store(backend).await?;
            tracing::info!(key, "Using blob store");
            Arc::new(BlobStore::new(object_store, &key))
        }
        StoreConfig::Table {
            url,
            max_connections,
        } => {
            tracing::info!(max_connections, "Using table store");
            Arc::new(TableStore::connect(&url, max_connections).await?)
        }
    };

    Ok(store)
}

async fn open_object_store(backend: BlobBackend) -> Result<Arc<dyn ObjectStore>, StoreError> {
    let object_store: Arc<dyn ObjectStore> = match backend {
        BlobBackend::Memory => {
            tracing::warn!("Records are kept in memory and will be lost on restart");
            Arc::new(InMemory::new())
        }
        BlobBackend::Filesystem { base_dir } => {
            tokio::fs::create_dir_all(&base_dir).await?;
            Arc::new(LocalFileSystem::new_with_prefix(&base_dir)?)
        }
        BlobBackend::S3 {
            bucket,
            endpoint,
            region,
            access_key_id,
            secret_access_key,
        } => {
            let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
            if let Some(endpoint) = endpoint {
                builder = builder.with_endpoint(endpoint);
            }
            if let Some(region) = region {
                builder = builder.with_region(region);
            }
            if let Some(access_key_id) = access_key_id {
                builder = builder.with_access_key_id(access_key_id);
            }
            if let Some(secret_access_key) = secret_access_key {
                builder = builder.with_secret_access_key(secret_access_key);
            }
            Arc::new(builder.build()?)
        }
    };

    Ok(object_store)
}
