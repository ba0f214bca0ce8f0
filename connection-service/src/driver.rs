//! Driver capability traits.
//!
//! `Driver` covers the lifecycle every backend shares; the extension traits
//! add the operations of one storage family. Callers take the narrowest
//! trait they need.

use async_trait::async_trait;

use common::errors::AppResult;
use common::models::{ColumnInfo, ConnectionConfig, Document, QueryResult, TableInfo};

/// Lifecycle operations shared by all backends.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opens a handle for `config` and returns its id.
    async fn connect(&self, config: &ConnectionConfig) -> AppResult<String>;

    /// Closes the handle `id`. Unknown ids are ignored.
    async fn disconnect(&self, id: &str) -> AppResult<()>;

    /// Checks that the handle `id` is alive.
    async fn ping(&self, id: &str) -> AppResult<()>;
}

/// Relational backends.
#[async_trait]
pub trait SqlDriver: Driver {
    /// Runs `sql` and returns its rows. Statement errors are reported inside
    /// the result.
    async fn execute_query(&self, id: &str, sql: &str) -> AppResult<QueryResult>;

    /// Runs `sql` without reading rows.
    async fn execute_sql(&self, id: &str, sql: &str) -> AppResult<()>;

    async fn list_databases(&self, id: &str) -> AppResult<Vec<String>>;

    async fn list_tables(&self, id: &str, database: &str) -> AppResult<Vec<TableInfo>>;

    async fn get_table_schema(&self, id: &str, table: &str) -> AppResult<Vec<ColumnInfo>>;
}

/// Document stores. No backend implements this yet.
#[async_trait]
pub trait DocumentDriver: Driver {
    async fn list_databases(&self, id: &str) -> AppResult<Vec<String>>;

    async fn list_collections(&self, id: &str, database: &str) -> AppResult<Vec<String>>;

    async fn find_documents(
        &self,
        id: &str,
        database: &str,
        collection: &str,
        filter: &Document,
    ) -> AppResult<Vec<Document>>;
}

/// Key-value stores. No backend implements this yet.
#[async_trait]
pub trait KeyValueDriver: Driver {
    async fn get(&self, id: &str, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, id: &str, key: &str, value: &str) -> AppResult<()>;

    async fn keys(&self, id: &str, pattern: &str) -> AppResult<Vec<String>>;
}
