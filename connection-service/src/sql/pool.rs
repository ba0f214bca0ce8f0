//! Database connection pools.
//!
//! One pool per open connection, tagged with its dialect. MySQL, PostgreSQL
//! and SQLite use sqlx pools; SQL Server uses tiberius behind bb8.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Instant;

use common::config::PoolSettings;
use common::errors::{AppError, AppResult};
use common::models::{ConnectionConfig, DbType, QueryResult, Row};
use futures::TryStreamExt;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{
    Column, Connection, Database, Either, Executor, MySqlPool, PgPool, Pool, SqlitePool, Statement,
};
use tiberius::{AuthMethod, EncryptionLevel};

use super::{decode, dsn};

/// Pool of SQL Server connections.
pub type MssqlPool = bb8::Pool<bb8_tiberius::ConnectionManager>;

const SQLITE_MEMORY: &str = ":memory:";

/// Connection pool wrapper for the supported dialects.
#[derive(Clone)]
pub enum DatabasePool {
    /// MySQL connection pool.
    MySQL(MySqlPool),
    /// PostgreSQL connection pool.
    Postgres(PgPool),
    /// SQLite connection pool.
    SQLite(SqlitePool),
    /// SQL Server connection pool.
    SqlServer(MssqlPool),
}

fn connection_error(e: impl Display) -> AppError {
    AppError::Connection(e.to_string())
}

fn execution_error(e: impl Display) -> AppError {
    AppError::Execution(e.to_string())
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Rows of the first result set of `sql`. Statements after it are not read.
async fn first_result_set<DB>(pool: &Pool<DB>, sql: &str) -> Result<Vec<DB::Row>, sqlx::Error>
where
    DB: Database,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
{
    let mut stream = pool.fetch_many(sql);
    let mut rows = Vec::new();
    while let Some(step) = stream.try_next().await? {
        match step {
            Either::Left(_) => break,
            Either::Right(row) => rows.push(row),
        }
    }
    Ok(rows)
}

impl DatabasePool {
    /// Opens a pool for `config` and verifies it with a ping.
    pub async fn open(config: &ConnectionConfig, settings: &PoolSettings) -> AppResult<Self> {
        let target = dsn::masked(config)?;
        tracing::debug!(dialect = %config.db_type, target = %target, "Opening pool");

        let pool = match &config.db_type {
            DbType::MySQL => DatabasePool::MySQL(Self::open_mysql(config, settings).await?),
            DbType::Postgres => {
                DatabasePool::Postgres(Self::open_postgres(config, settings).await?)
            }
            DbType::SQLite => DatabasePool::SQLite(Self::open_sqlite(config, settings).await?),
            DbType::SqlServer => {
                DatabasePool::SqlServer(Self::open_sqlserver(config, settings).await?)
            }
            other => return Err(AppError::UnsupportedDialect(other.to_string())),
        };

        if let Err(e) = pool.ping().await {
            pool.close().await;
            return Err(e);
        }
        Ok(pool)
    }

    async fn open_mysql(config: &ConnectionConfig, settings: &PoolSettings) -> AppResult<MySqlPool> {
        let mut options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .charset("utf8mb4");
        if !config.database.is_empty() {
            options = options.database(&config.database);
        }

        MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .max_lifetime(settings.max_lifetime)
            .acquire_timeout(settings.connect_timeout)
            .connect_with(options)
            .await
            .map_err(connection_error)
    }

    async fn open_postgres(config: &ConnectionConfig, settings: &PoolSettings) -> AppResult<PgPool> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .ssl_mode(if config.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Disable
            });
        if !config.database.is_empty() {
            options = options.database(&config.database);
        }

        PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .max_lifetime(settings.max_lifetime)
            .acquire_timeout(settings.connect_timeout)
            .connect_with(options)
            .await
            .map_err(connection_error)
    }

    /// SQLite pools hold a single connection. An in-memory database lives as
    /// long as that connection, so it is never recycled.
    async fn open_sqlite(config: &ConnectionConfig, settings: &PoolSettings) -> AppResult<SqlitePool> {
        let in_memory = config.database.is_empty() || config.database == SQLITE_MEMORY;
        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(connection_error)?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database)
                .create_if_missing(true)
        };

        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(settings.connect_timeout);
        let pool_options = if in_memory {
            pool_options.max_lifetime(None).idle_timeout(None)
        } else {
            pool_options.max_lifetime(settings.max_lifetime)
        };

        pool_options
            .connect_with(options)
            .await
            .map_err(connection_error)
    }

    async fn open_sqlserver(config: &ConnectionConfig, settings: &PoolSettings) -> AppResult<MssqlPool> {
        let mut tds = tiberius::Config::new();
        tds.host(&config.host);
        tds.port(config.port);
        if !config.database.is_empty() {
            tds.database(&config.database);
        }
        tds.authentication(AuthMethod::sql_server(&config.username, &config.password));
        tds.trust_cert();
        tds.encryption(if config.ssl {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::Off
        });

        let manager = bb8_tiberius::ConnectionManager::build(tds).map_err(connection_error)?;
        bb8::Pool::builder()
            .max_size(settings.max_connections)
            .max_lifetime(Some(settings.max_lifetime))
            .connection_timeout(settings.connect_timeout)
            .build(manager)
            .await
            .map_err(connection_error)
    }

    /// Dialect of this pool.
    pub fn dialect(&self) -> DbType {
        match self {
            DatabasePool::MySQL(_) => DbType::MySQL,
            DatabasePool::Postgres(_) => DbType::Postgres,
            DatabasePool::SQLite(_) => DbType::SQLite,
            DatabasePool::SqlServer(_) => DbType::SqlServer,
        }
    }

    /// Checks that a connection can be acquired and answers.
    pub async fn ping(&self) -> AppResult<()> {
        match self {
            DatabasePool::MySQL(pool) => {
                let mut conn = pool.acquire().await.map_err(connection_error)?;
                conn.ping().await.map_err(connection_error)
            }
            DatabasePool::Postgres(pool) => {
                let mut conn = pool.acquire().await.map_err(connection_error)?;
                conn.ping().await.map_err(connection_error)
            }
            DatabasePool::SQLite(pool) => {
                let mut conn = pool.acquire().await.map_err(connection_error)?;
                conn.ping().await.map_err(connection_error)
            }
            DatabasePool::SqlServer(pool) => {
                let mut conn = pool.get().await.map_err(connection_error)?;
                conn.simple_query("SELECT 1")
                    .await
                    .map_err(connection_error)?
                    .into_row()
                    .await
                    .map_err(connection_error)?;
                Ok(())
            }
        }
    }

    /// Closes the pool. Clones of a sqlx pool are closed with it; SQL Server
    /// connections are released when the last clone drops.
    pub async fn close(&self) {
        match self {
            DatabasePool::MySQL(pool) => pool.close().await,
            DatabasePool::Postgres(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
            DatabasePool::SqlServer(_) => {}
        }
    }

    /// Runs `sql` and collects the rows of its first result set.
    ///
    /// A statement the database rejects produces a [`QueryResult`] carrying
    /// the error. Row decoding failures are returned as
    /// [`AppError::Execution`].
    pub async fn fetch(&self, sql: &str) -> AppResult<QueryResult> {
        let start = Instant::now();
        match self {
            DatabasePool::MySQL(pool) => {
                let rows = match first_result_set(pool, sql).await {
                    Ok(rows) => rows,
                    Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
                };
                let elapsed = elapsed_ms(start);
                let columns = match rows.first() {
                    Some(row) => decode::sqlx_columns(row),
                    None => match pool.prepare(sql).await {
                        Ok(stmt) => stmt.columns().iter().map(|c| c.name().to_string()).collect(),
                        Err(e) => {
                            tracing::debug!(error = %e, "Statement returned no columns");
                            Vec::new()
                        }
                    },
                };
                let rows = decode::sqlx_rows(&rows, decode::mysql_value).map_err(execution_error)?;
                Ok(QueryResult::new(columns, rows, elapsed))
            }
            DatabasePool::Postgres(pool) => {
                let rows = match first_result_set(pool, sql).await {
                    Ok(rows) => rows,
                    Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
                };
                let elapsed = elapsed_ms(start);
                let columns = match rows.first() {
                    Some(row) => decode::sqlx_columns(row),
                    None => match pool.prepare(sql).await {
                        Ok(stmt) => stmt.columns().iter().map(|c| c.name().to_string()).collect(),
                        Err(e) => {
                            tracing::debug!(error = %e, "Statement returned no columns");
                            Vec::new()
                        }
                    },
                };
                let rows =
                    decode::sqlx_rows(&rows, decode::postgres_value).map_err(execution_error)?;
                Ok(QueryResult::new(columns, rows, elapsed))
            }
            DatabasePool::SQLite(pool) => {
                let stmt = match pool.prepare(sql).await {
                    Ok(stmt) => stmt,
                    Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
                };
                let columns: Vec<String> =
                    stmt.columns().iter().map(|c| c.name().to_string()).collect();
                let rows = match first_result_set(pool, sql).await {
                    Ok(rows) => rows,
                    Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
                };
                let elapsed = elapsed_ms(start);
                let rows = decode::sqlx_rows(&rows, decode::sqlite_value).map_err(execution_error)?;
                Ok(QueryResult::new(columns, rows, elapsed))
            }
            DatabasePool::SqlServer(pool) => Self::fetch_mssql(pool, sql, start).await,
        }
    }

    async fn fetch_mssql(pool: &MssqlPool, sql: &str, start: Instant) -> AppResult<QueryResult> {
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
        };
        let mut stream = match conn.simple_query(sql).await {
            Ok(stream) => stream,
            Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
        };
        let columns: Vec<String> = match stream.columns().await {
            Ok(cols) => cols
                .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
                .unwrap_or_default(),
            Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
        };
        let rows = match stream.into_first_result().await {
            Ok(rows) => rows,
            Err(e) => return Ok(QueryResult::failed(e.to_string(), elapsed_ms(start))),
        };
        let elapsed = elapsed_ms(start);

        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| decode::mssql_value(row, idx).map(|v| (name.clone(), v)))
                    .collect::<tiberius::Result<Row>>()
            })
            .collect::<tiberius::Result<Vec<Row>>>()
            .map_err(execution_error)?;
        Ok(QueryResult::new(columns, rows, elapsed))
    }

    /// Runs `sql` without reading rows, returning the affected row count.
    pub async fn execute(&self, sql: &str) -> AppResult<u64> {
        match self {
            DatabasePool::MySQL(pool) => pool
                .execute(sql)
                .await
                .map(|r| r.rows_affected())
                .map_err(execution_error),
            DatabasePool::Postgres(pool) => pool
                .execute(sql)
                .await
                .map(|r| r.rows_affected())
                .map_err(execution_error),
            DatabasePool::SQLite(pool) => pool
                .execute(sql)
                .await
                .map(|r| r.rows_affected())
                .map_err(execution_error),
            DatabasePool::SqlServer(pool) => {
                let mut conn = pool.get().await.map_err(execution_error)?;
                let result = conn.execute(sql, &[]).await.map_err(execution_error)?;
                Ok(result.total())
            }
        }
    }
}
