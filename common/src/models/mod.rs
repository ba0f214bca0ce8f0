//! Shared data models.

pub mod connection;
pub mod document;
pub mod query;
pub mod schema;

pub use connection::{Connection, ConnectionConfig, ConnectionStatus, DbType};
pub use document::{Document, DocumentFindRequest};
pub use query::{QueryRequest, QueryResult, Row, Value};
pub use schema::{ColumnInfo, TableInfo, TableType};
