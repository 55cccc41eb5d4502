use serde::Deserialize;

pub const DEFAULT_BLOB_KEY: &str = "analytics/requests.json";

fn default_blob_key() -> String {
    DEFAULT_BLOB_KEY.into()
}

fn default_max_connections() -> u32 {
    4
}

/// Selects the backend holding the request records.
#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// A single JSON array rewritten on every append.
    Blob {
        #[serde(default = "default_blob_key")]
        key: String,
        backend: BlobBackend,
    },
    /// A `requests` table in a SQLite database, e.g. `sqlite:///var/lib/analytics/requests.db`.
    Table {
        url: String,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "lowercase")]
#[serde(tag = "type")]
pub enum BlobBackend {
    /// Process-local storage, lost on restart. Only meant for development.
    Memory,
    Filesystem {
        base_dir: String,
    },
    /// Any S3-compatible service. Credentials not given here are read from the environment.
    S3 {
        bucket: String,
        endpoint: Option<String>,
        region: Option<String>,
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
    },
}
