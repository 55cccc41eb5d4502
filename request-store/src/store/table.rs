use super::{RequestStore, StoreError};
use crate::metrics_defs::RECORDS_APPENDED;
use crate::query::{Filter, Page};
use crate::record::Record;
use async_trait::async_trait;
use shared::counter;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::str::FromStr;

const SCHEMA_SQL: &str = "
    CREATE TABLE IF NOT EXISTS requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        domain TEXT NOT NULL,
        method TEXT NOT NULL,
        path TEXT NOT NULL,
        country TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_requests_timestamp ON requests(timestamp);
";

/// Stores records as rows of the `requests` table.
///
/// Filtering, ordering and the page window are all evaluated by SQLite. The row id is
/// internal and only used to order records sharing a timestamp.
pub struct TableStore {
    pool: SqlitePool,
}

impl TableStore {
    /// Connects to the database at `url`, creating the file and table if needed.
    ///
    /// `sqlite::memory:` databases exist per connection, so they need `max_connections = 1`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await?;
        Ok(TableStore { pool })
    }
}

fn record_from_row(row: &SqliteRow) -> Result<Record, sqlx::Error> {
    Ok(Record {
        timestamp: row.try_get("timestamp")?,
        domain: row.try_get("domain")?,
        method: row.try_get("method")?,
        path: row.try_get("path")?,
        country: row.try_get("country")?,
    })
}

#[async_trait]
impl RequestStore for TableStore {
    fn name(&self) -> &'static str {
        "table"
    }

    async fn append(&self, record: &Record) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO requests (timestamp, domain, method, path, country) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.timestamp)
        .bind(&record.domain)
        .bind(&record.method)
        .bind(&record.path)
        .bind(&record.country)
        .execute(&self.pool)
        .await?;

        counter!(RECORDS_APPENDED, "store" => self.name()).increment(1);
        Ok(())
    }

    async fn query(&self, filter: &Filter, page: &Page) -> Result<Vec<Record>, StoreError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT timestamp, domain, method, path, country FROM requests WHERE timestamp >= ",
        );
        builder.push_bind(filter.start);
        builder.push(" AND timestamp <= ").push_bind(filter.end);

        // Column names come from a fixed list; only values are bound.
        for (column, value) in filter.equality_clauses() {
            builder
                .push(" AND ")
                .push(column)
                .push(" = ")
                .push_bind(value.to_owned());
        }

        builder
            .push(" ORDER BY timestamp DESC, id DESC LIMIT ")
            .push_bind(page.count() as i64)
            .push(" OFFSET ")
            // SQLite reads a negative offset as zero, so saturate instead of wrapping.
            .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows = builder.build().fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(record_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
