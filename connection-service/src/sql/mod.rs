//! SQL dialect driver.
//!
//! Implements [`Driver`] and [`SqlDriver`] for MySQL, PostgreSQL, SQLite and
//! SQL Server. Each open pool is kept in the shared [`ConnectionRegistry`].

pub mod decode;
pub mod dialect;
pub mod dsn;
pub mod pool;

use std::sync::Arc;

use async_trait::async_trait;

use common::config::PoolSettings;
use common::errors::{AppError, AppResult};
use common::models::{ColumnInfo, ConnectionConfig, QueryResult, Row, TableInfo};
use common::response::Page;
use common::utils::IdGenerator;

use crate::driver::{Driver, SqlDriver};
use crate::registry::ConnectionRegistry;

pub use pool::DatabasePool;

/// Driver for the relational dialects.
pub struct SqlDialectDriver {
    registry: Arc<ConnectionRegistry>,
    settings: PoolSettings,
}

impl SqlDialectDriver {
    /// Creates a driver with an empty registry.
    pub fn new(settings: PoolSettings) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            settings,
        }
    }

    /// Registry shared with the connection manager.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Opens and pings a pool for `config` without registering it.
    pub async fn open(&self, config: &ConnectionConfig) -> AppResult<DatabasePool> {
        DatabasePool::open(config, &self.settings).await
    }

    fn pool(&self, id: &str) -> AppResult<DatabasePool> {
        self.registry
            .pool(id)
            .ok_or_else(|| AppError::ConnectionNotFound(id.to_string()))
    }

    /// Rows of an introspection statement. A statement error yields no rows.
    async fn metadata_rows(&self, pool: &DatabasePool, sql: &str) -> AppResult<Vec<Row>> {
        let result = pool.fetch(sql).await?;
        if let Some(error) = &result.error {
            tracing::warn!(dialect = %pool.dialect(), error = %error, "Metadata query failed");
        }
        Ok(result.rows)
    }

    /// One page of `table`, as `SELECT * ... LIMIT ... OFFSET ...`.
    pub async fn table_data(&self, id: &str, table: &str, page: Page) -> AppResult<QueryResult> {
        let pool = self.pool(id)?;
        let sql = dialect::table_data_sql(&pool.dialect(), table, page)?;
        pool.fetch(&sql).await
    }
}

#[async_trait]
impl Driver for SqlDialectDriver {
    async fn connect(&self, config: &ConnectionConfig) -> AppResult<String> {
        let pool = self.open(config).await?;
        let id = IdGenerator::connection_id();
        self.registry.insert_pool(id.clone(), pool);
        tracing::debug!(id = %id, dialect = %config.db_type, "Pool registered");
        Ok(id)
    }

    async fn disconnect(&self, id: &str) -> AppResult<()> {
        if let Some(pool) = self.registry.take_pool(id) {
            pool.close().await;
            tracing::debug!(id = %id, "Pool closed");
        }
        Ok(())
    }

    async fn ping(&self, id: &str) -> AppResult<()> {
        self.pool(id)?.ping().await
    }
}

#[async_trait]
impl SqlDriver for SqlDialectDriver {
    async fn execute_query(&self, id: &str, sql: &str) -> AppResult<QueryResult> {
        let pool = self.pool(id)?;
        let result = pool.fetch(sql).await?;
        if let Some(error) = &result.error {
            tracing::info!(id = %id, error = %error, "Query failed");
        }
        Ok(result)
    }

    async fn execute_sql(&self, id: &str, sql: &str) -> AppResult<()> {
        self.pool(id)?.execute(sql).await.map(|_| ())
    }

    async fn list_databases(&self, id: &str) -> AppResult<Vec<String>> {
        let pool = self.pool(id)?;
        let Some(sql) = dialect::list_databases_sql(&pool.dialect())? else {
            return Ok(dialect::SQLITE_DATABASES
                .iter()
                .map(|s| s.to_string())
                .collect());
        };
        let rows = self.metadata_rows(&pool, sql).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first_text().map(String::from))
            .collect())
    }

    async fn list_tables(&self, id: &str, database: &str) -> AppResult<Vec<TableInfo>> {
        let pool = self.pool(id)?;
        let (prelude, sql) = dialect::list_tables_sql(&pool.dialect(), database)?;
        if let Some(prelude) = prelude {
            if let Err(e) = pool.execute(&prelude).await {
                tracing::debug!(id = %id, error = %e, "Ignoring failed session switch");
            }
        }
        let rows = self.metadata_rows(&pool, &sql).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first_text().map(TableInfo::table))
            .collect())
    }

    async fn get_table_schema(&self, id: &str, table: &str) -> AppResult<Vec<ColumnInfo>> {
        let pool = self.pool(id)?;
        let db_type = pool.dialect();
        let sql = dialect::table_schema_sql(&db_type, table)?;
        let rows = self.metadata_rows(&pool, &sql).await?;
        Ok(rows
            .iter()
            .map(|row| dialect::column_from_row(&db_type, row))
            .collect())
    }
}
