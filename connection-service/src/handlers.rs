//! Handler模块

use axum::{
    extract::{Path, Query, State},
    Json,
};

use common::errors::AppError;
use common::extract::{JsonBody, ValidatedJson};
use common::models::{
    ColumnInfo, Connection, ConnectionConfig, Document, QueryRequest, QueryResult, TableInfo,
};
use common::response::{ActionResponse, ErrorBody, HealthResponse, Page, PageParams};

use crate::state::AppState;

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// 列出所有连接
#[utoipa::path(
    get,
    path = "/api/connections",
    tag = "connections",
    responses(
        (status = 200, description = "连接列表", body = Vec<Connection>)
    )
)]
pub async fn list_connections(State(state): State<AppState>) -> Json<Vec<Connection>> {
    Json(state.manager.list_connections())
}

/// 创建并打开新的数据库连接
#[utoipa::path(
    post,
    path = "/api/connections",
    tag = "connections",
    request_body = ConnectionConfig,
    responses(
        (status = 200, description = "连接已创建", body = Connection),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 500, description = "连接失败", body = ErrorBody)
    )
)]
pub async fn create_connection(
    State(state): State<AppState>,
    ValidatedJson(config): ValidatedJson<ConnectionConfig>,
) -> Result<Json<Connection>, AppError> {
    let connection = state.manager.connect(config).await?;
    Ok(Json(connection))
}

/// 测试数据库连接（不保存）
///
/// 连接失败时仍返回 200，`success` 为 false。
#[utoipa::path(
    post,
    path = "/api/connections/test",
    tag = "connections",
    request_body = ConnectionConfig,
    responses(
        (status = 200, description = "连接测试结果", body = ActionResponse),
        (status = 400, description = "请求体无效", body = ErrorBody)
    )
)]
pub async fn test_connection(
    State(state): State<AppState>,
    JsonBody(config): JsonBody<ConnectionConfig>,
) -> Json<ActionResponse> {
    tracing::info!(
        dialect = %config.db_type,
        host = %config.host,
        port = config.port,
        database = %config.database,
        user = %config.username,
        "测试连接"
    );
    match state.manager.test_connection(&config).await {
        Ok(()) => Json(ActionResponse::success()),
        Err(e) => {
            tracing::info!(error = %e, "连接测试失败");
            Json(ActionResponse::failure(e.to_string()))
        }
    }
}

/// 删除连接
#[utoipa::path(
    delete,
    path = "/api/connections/{id}",
    tag = "connections",
    params(
        ("id" = String, Path, description = "连接 ID")
    ),
    responses(
        (status = 200, description = "连接已删除", body = ActionResponse),
        (status = 404, description = "连接未找到", body = ErrorBody)
    )
)]
pub async fn delete_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    state.manager.delete(&id).await?;
    Ok(Json(ActionResponse::success()))
}

/// 断开连接（保留连接信息）
#[utoipa::path(
    post,
    path = "/api/connections/{id}/disconnect",
    tag = "connections",
    params(
        ("id" = String, Path, description = "连接 ID")
    ),
    responses(
        (status = 200, description = "连接已断开", body = ActionResponse),
        (status = 404, description = "连接未找到", body = ErrorBody)
    )
)]
pub async fn disconnect_connection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    state.manager.disconnect(&id).await?;
    Ok(Json(ActionResponse::success()))
}

/// 执行 SQL 查询
///
/// 语句本身的错误写在结果的 `error` 字段中，响应仍为 200。
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "查询结果", body = QueryResult),
        (status = 400, description = "请求体无效", body = ErrorBody),
        (status = 404, description = "连接未找到", body = ErrorBody),
        (status = 500, description = "执行失败", body = ErrorBody)
    )
)]
pub async fn execute_query(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<QueryRequest>,
) -> Result<Json<QueryResult>, AppError> {
    let result = state
        .manager
        .execute_query(&req.connection_id, &req.sql)
        .await?;
    Ok(Json(result))
}

/// 列出数据库
#[utoipa::path(
    get,
    path = "/api/databases/{id}",
    tag = "schema",
    params(
        ("id" = String, Path, description = "连接 ID")
    ),
    responses(
        (status = 200, description = "数据库名称列表", body = Vec<String>),
        (status = 404, description = "连接未找到", body = ErrorBody)
    )
)]
pub async fn list_databases(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.manager.list_databases(&id).await?))
}

/// 列出数据库中的表
#[utoipa::path(
    get,
    path = "/api/tables/{id}/{db}",
    tag = "schema",
    params(
        ("id" = String, Path, description = "连接 ID"),
        ("db" = String, Path, description = "数据库名称")
    ),
    responses(
        (status = 200, description = "表列表", body = Vec<TableInfo>),
        (status = 404, description = "连接未找到", body = ErrorBody)
    )
)]
pub async fn list_tables(
    State(state): State<AppState>,
    Path((id, db)): Path<(String, String)>,
) -> Result<Json<Vec<TableInfo>>, AppError> {
    Ok(Json(state.manager.list_tables(&id, &db).await?))
}

/// 获取表结构
#[utoipa::path(
    get,
    path = "/api/schema/{id}/{table}",
    tag = "schema",
    params(
        ("id" = String, Path, description = "连接 ID"),
        ("table" = String, Path, description = "表名")
    ),
    responses(
        (status = 200, description = "列信息", body = Vec<ColumnInfo>),
        (status = 404, description = "连接未找到", body = ErrorBody)
    )
)]
pub async fn get_table_schema(
    State(state): State<AppState>,
    Path((id, table)): Path<(String, String)>,
) -> Result<Json<Vec<ColumnInfo>>, AppError> {
    Ok(Json(state.manager.get_table_schema(&id, &table).await?))
}

/// 分页读取表数据
///
/// `db` 段只用于路由，查询在连接的当前数据库中执行。
#[utoipa::path(
    get,
    path = "/api/data/{id}/{db}/{table}",
    tag = "query",
    params(
        ("id" = String, Path, description = "连接 ID"),
        ("db" = String, Path, description = "数据库名称"),
        ("table" = String, Path, description = "表名"),
        PageParams
    ),
    responses(
        (status = 200, description = "表数据", body = QueryResult),
        (status = 404, description = "连接未找到", body = ErrorBody)
    )
)]
pub async fn get_table_data(
    State(state): State<AppState>,
    Path((id, _db, table)): Path<(String, String, String)>,
    Query(params): Query<PageParams>,
) -> Result<Json<QueryResult>, AppError> {
    let page = Page::from(params);
    Ok(Json(state.manager.table_data(&id, &table, page).await?))
}

/// 列出集合（文档数据库，尚未实现）
#[utoipa::path(
    get,
    path = "/api/collections/{id}/{db}",
    tag = "documents",
    params(
        ("id" = String, Path, description = "连接 ID"),
        ("db" = String, Path, description = "数据库名称")
    ),
    responses(
        (status = 200, description = "集合列表（始终为空）", body = Vec<String>)
    )
)]
pub async fn list_collections(Path((_id, _db)): Path<(String, String)>) -> Json<Vec<String>> {
    Json(Vec::new())
}

/// 查询文档（文档数据库，尚未实现）
#[utoipa::path(
    post,
    path = "/api/documents/find",
    tag = "documents",
    request_body = common::models::DocumentFindRequest,
    responses(
        (status = 200, description = "文档列表（始终为空）")
    )
)]
pub async fn find_documents() -> Json<Vec<Document>> {
    Json(Vec::new())
}
