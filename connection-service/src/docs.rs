//! OpenAPI 文档

use utoipa::OpenApi;

use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "数据库管理 API",
        version = "0.1.0",
        description = "多数据库连接管理、SQL 执行与结构浏览"
    ),
    paths(
        handlers::health_check,
        handlers::list_connections,
        handlers::create_connection,
        handlers::test_connection,
        handlers::delete_connection,
        handlers::disconnect_connection,
        handlers::execute_query,
        handlers::list_databases,
        handlers::list_tables,
        handlers::get_table_schema,
        handlers::get_table_data,
        handlers::list_collections,
        handlers::find_documents,
    ),
    components(schemas(
        common::models::ConnectionConfig,
        common::models::Connection,
        common::models::ConnectionStatus,
        common::models::QueryRequest,
        common::models::QueryResult,
        common::models::TableInfo,
        common::models::TableType,
        common::models::ColumnInfo,
        common::models::DocumentFindRequest,
        common::response::ActionResponse,
        common::response::ErrorBody,
        common::response::HealthResponse,
    )),
    tags(
        (name = "connections", description = "连接管理端点"),
        (name = "query", description = "SQL 执行端点"),
        (name = "schema", description = "结构浏览端点"),
        (name = "documents", description = "文档数据库端点（未实现）"),
        (name = "health", description = "健康检查端点")
    )
)]
pub struct ApiDoc;
