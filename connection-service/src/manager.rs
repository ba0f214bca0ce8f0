//! 连接管理器
//!
//! 在 SQL 驱动之上维护连接元数据（状态、时间戳、配置），并向 HTTP 层
//! 提供连接生命周期与查询/元数据操作。

use chrono::{DateTime, Utc};

use common::errors::{AppError, AppResult};
use common::models::{
    ColumnInfo, Connection, ConnectionConfig, ConnectionStatus, QueryResult, TableInfo,
};
use common::response::Page;
use common::utils::IdGenerator;

use crate::driver::{Driver, SqlDriver};
use crate::registry::ConnectionRegistry;
use crate::sql::SqlDialectDriver;

/// 由管理器创建的连接记录
#[derive(Debug, Clone)]
pub struct ManagedConnection {
    /// 连接配置（`id` 已填充）
    pub config: ConnectionConfig,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    /// 最近一次被查询或元数据操作使用的时间
    pub last_used: DateTime<Utc>,
    pub last_connected_at: Option<DateTime<Utc>>,
    /// 最近一次错误（创建后不再写入）
    pub error: Option<String>,
}

impl ManagedConnection {
    fn new(config: ConnectionConfig) -> Self {
        let now = Utc::now();
        Self {
            config,
            status: ConnectionStatus::Connected,
            created_at: now,
            last_used: now,
            last_connected_at: Some(now),
            error: None,
        }
    }

    /// API 视图
    pub fn to_connection(&self) -> Connection {
        Connection {
            config: self.config.clone(),
            status: self.status,
            created_at: self.created_at,
            last_connected_at: self.last_connected_at,
            error: self.error.clone(),
        }
    }
}

/// 连接管理器
pub struct ConnectionManager {
    driver: SqlDialectDriver,
}

impl ConnectionManager {
    /// 创建管理器
    pub fn new(driver: SqlDialectDriver) -> Self {
        Self { driver }
    }

    fn registry(&self) -> &ConnectionRegistry {
        self.driver.registry()
    }

    fn not_found(id: &str) -> AppError {
        AppError::ConnectionNotFound(id.to_string())
    }

    /// 打开连接并登记元数据
    pub async fn connect(&self, mut config: ConnectionConfig) -> AppResult<Connection> {
        let pool = self.driver.open(&config).await.map_err(|e| {
            tracing::warn!(name = %config.name, dialect = %config.db_type, error = %e, "连接失败");
            e
        })?;

        // Minted here rather than by `Driver::connect`: pool and metadata are
        // inserted as one registry entry.
        let id = IdGenerator::connection_id();
        config.id = id.clone();
        let managed = ManagedConnection::new(config);
        let connection = managed.to_connection();
        self.registry().insert_managed(id.clone(), pool, managed);

        tracing::info!(
            id = %id,
            name = %connection.config.name,
            dialect = %connection.config.db_type,
            "连接已创建"
        );
        Ok(connection)
    }

    /// 测试连接：打开后立即关闭，不保留任何记录
    pub async fn test_connection(&self, config: &ConnectionConfig) -> AppResult<()> {
        let id = self.driver.connect(config).await?;
        self.driver.disconnect(&id).await?;
        tracing::info!(dialect = %config.db_type, "连接测试成功");
        Ok(())
    }

    /// 断开连接，保留记录
    pub async fn disconnect(&self, id: &str) -> AppResult<()> {
        let pool = self
            .registry()
            .update(id, |entry| {
                let managed = entry.managed.as_mut()?;
                managed.status = ConnectionStatus::Disconnected;
                Some(entry.pool.take())
            })
            .flatten()
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(pool) = pool {
            pool.close().await;
        }
        tracing::info!(id = %id, "连接已断开");
        Ok(())
    }

    /// 删除连接
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let entry = self
            .registry()
            .remove_managed(id)
            .ok_or_else(|| Self::not_found(id))?;

        if let Some(pool) = entry.pool {
            pool.close().await;
        }
        tracing::info!(id = %id, "连接已删除");
        Ok(())
    }

    /// 根据 ID 获取连接
    pub fn get_connection(&self, id: &str) -> AppResult<Connection> {
        self.registry()
            .managed(id)
            .map(|m| m.to_connection())
            .ok_or_else(|| Self::not_found(id))
    }

    /// 列出所有连接，按创建时间升序
    pub fn list_connections(&self) -> Vec<Connection> {
        let mut managed = self.registry().managed_all();
        managed.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.config.id.cmp(&b.config.id))
        });
        managed.iter().map(ManagedConnection::to_connection).collect()
    }

    /// 刷新最近使用时间；记录不存在时返回 `ConnectionNotFound`
    fn touch(&self, id: &str) -> AppResult<()> {
        self.registry()
            .update(id, |entry| {
                entry.managed.as_mut().map(|m| m.last_used = Utc::now())
            })
            .flatten()
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn ping(&self, id: &str) -> AppResult<()> {
        self.touch(id)?;
        self.driver.ping(id).await
    }

    pub async fn execute_query(&self, id: &str, sql: &str) -> AppResult<QueryResult> {
        self.touch(id)?;
        self.driver.execute_query(id, sql).await
    }

    pub async fn execute_sql(&self, id: &str, sql: &str) -> AppResult<()> {
        self.touch(id)?;
        self.driver.execute_sql(id, sql).await
    }

    pub async fn list_databases(&self, id: &str) -> AppResult<Vec<String>> {
        self.touch(id)?;
        SqlDriver::list_databases(&self.driver, id).await
    }

    pub async fn list_tables(&self, id: &str, database: &str) -> AppResult<Vec<TableInfo>> {
        self.touch(id)?;
        self.driver.list_tables(id, database).await
    }

    pub async fn get_table_schema(&self, id: &str, table: &str) -> AppResult<Vec<ColumnInfo>> {
        self.touch(id)?;
        self.driver.get_table_schema(id, table).await
    }

    /// 分页读取表数据
    pub async fn table_data(&self, id: &str, table: &str, page: Page) -> AppResult<QueryResult> {
        self.touch(id)?;
        self.driver.table_data(id, table, page).await
    }

    /// 已登记的连接数
    pub fn connection_count(&self) -> usize {
        self.registry().managed_all().len()
    }
}
