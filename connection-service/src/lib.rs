//! 数据库管理服务
//!
//! 提供多数据库连接管理功能，包括：
//! - 连接的创建、测试、断开与删除
//! - SQL 执行
//! - 数据库、表与列结构浏览

pub mod docs;
pub mod driver;
pub mod handlers;
pub mod manager;
pub mod registry;
pub mod routes;
pub mod sql;
pub mod state;

pub use manager::{ConnectionManager, ManagedConnection};
pub use routes::create_router;
pub use sql::SqlDialectDriver;
pub use state::AppState;
