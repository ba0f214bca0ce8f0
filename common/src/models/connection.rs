//! Connection configuration models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Database type named by a connection config.
///
/// Any string deserializes; names that match no known backend are kept in
/// [`DbType::Other`] so the driver can reject them with a precise message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DbType {
    /// MySQL database.
    MySQL,
    /// PostgreSQL database.
    Postgres,
    /// SQLite database.
    SQLite,
    /// Microsoft SQL Server.
    SqlServer,
    /// MongoDB document store (not implemented).
    MongoDB,
    /// Redis key-value store (not implemented).
    Redis,
    /// Oracle database (not implemented).
    Oracle,
    /// Unrecognized type name.
    Other(String),
}

impl DbType {
    /// Returns the wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            DbType::MySQL => "mysql",
            DbType::Postgres => "postgres",
            DbType::SQLite => "sqlite",
            DbType::SqlServer => "sqlserver",
            DbType::MongoDB => "mongodb",
            DbType::Redis => "redis",
            DbType::Oracle => "oracle",
            DbType::Other(name) => name,
        }
    }

}

impl From<String> for DbType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "mysql" => DbType::MySQL,
            "postgres" => DbType::Postgres,
            "sqlite" => DbType::SQLite,
            "sqlserver" => DbType::SqlServer,
            "mongodb" => DbType::MongoDB,
            "redis" => DbType::Redis,
            "oracle" => DbType::Oracle,
            _ => DbType::Other(s),
        }
    }
}

impl From<DbType> for String {
    fn from(t: DbType) -> Self {
        t.as_str().to_string()
    }
}

impl Default for DbType {
    fn default() -> Self {
        DbType::Other(String::new())
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Configuration for a database connection.
///
/// Every field except `name` and `type` is optional on input; SQLite only
/// reads `database`, which holds the file path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ConnectionConfig {
    /// Server-assigned identifier; empty until the connection is created.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Display name.
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    /// Database type (`mysql`, `postgres`, `sqlite`, `sqlserver`, ...).
    #[serde(rename = "type", default)]
    #[schema(value_type = String, example = "postgres")]
    pub db_type: DbType,
    /// Database host.
    #[serde(default)]
    pub host: String,
    /// Database port.
    #[serde(default)]
    pub port: u16,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
    /// Database name, or the file path for SQLite.
    #[serde(default)]
    pub database: String,
    /// Require TLS (PostgreSQL `sslmode=require`).
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl: bool,
}

/// Lifecycle state of a managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Handle is being opened.
    Connecting,
    /// Handle is open.
    Connected,
    /// Handle was closed; the record is kept.
    Disconnected,
    /// The connection failed.
    Error,
}

/// API view of a managed connection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Connection configuration, with `id` filled in.
    #[serde(flatten)]
    pub config: ConnectionConfig,
    /// Last known status.
    pub status: ConnectionStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time the handle was last opened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_connected_at: Option<DateTime<Utc>>,
    /// Last error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
