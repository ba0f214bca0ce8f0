use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::config::AppConfig;
use connection_service::{create_router, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    create_router(AppState::new(AppConfig::default()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn sqlite_memory(name: &str) -> Value {
    json!({
        "name": name,
        "type": "sqlite",
        "host": "",
        "port": 0,
        "username": "",
        "password": "",
        "database": ":memory:"
    })
}

async fn create(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/connections", Some(sqlite_memory("mem"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_str().unwrap().to_string()
}

async fn query(app: &Router, id: &str, sql: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/api/query",
        Some(json!({ "connection_id": id, "sql": sql })),
    )
    .await
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_returns_connection_projection() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/connections", Some(sqlite_memory("local"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "local");
    assert_eq!(body["type"], "sqlite");
    assert_eq!(body["status"], "connected");
    assert!(body["createdAt"].is_string());
    assert!(body["lastConnectedAt"].is_string());
    assert_eq!(body["id"].as_str().unwrap().len(), 36);

    let (status, list) = send(&app, Method::GET, "/api/connections", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], body["id"]);
}

#[tokio::test]
async fn sqlite_round_trip_through_the_api() {
    let app = app();
    let id = create(&app).await;

    let (status, body) = query(&app, &id, "CREATE TABLE t(a INT, b TEXT)").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none(), "{body}");
    let (status, _) = query(&app, &id, "INSERT INTO t VALUES (1, 'x')").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = query(&app, &id, "SELECT * FROM t").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["a", "b"]));
    assert_eq!(body["rows"], json!([{ "a": 1, "b": "x" }]));
    assert_eq!(body["rowCount"], 1);
    assert!(body["executionTime"].is_u64());

    let (_, databases) = send(&app, Method::GET, &format!("/api/databases/{id}"), None).await;
    assert_eq!(databases, json!(["main"]));

    let (_, tables) = send(&app, Method::GET, &format!("/api/tables/{id}/main"), None).await;
    assert_eq!(tables, json!([{ "name": "t", "type": "table" }]));

    let (_, columns) = send(&app, Method::GET, &format!("/api/schema/{id}/t"), None).await;
    let columns = columns.as_array().unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0]["name"], "a");
    assert_eq!(columns[1]["name"], "b");
    assert!(columns.iter().all(|c| c["nullable"] == json!(true)));
}

#[tokio::test]
async fn table_data_is_paged() {
    let app = app();
    let id = create(&app).await;
    query(&app, &id, "CREATE TABLE t(a INT)").await;
    query(&app, &id, "INSERT INTO t VALUES (1), (2), (3)").await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/data/{id}/main/t?page=2&page_size=2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"], json!([{ "a": 3 }]));

    let (_, body) = send(&app, Method::GET, &format!("/api/data/{id}/main/t"), None).await;
    assert_eq!(body["rowCount"], 3);
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let app = app();
    let id = create(&app).await;
    query(&app, &id, "CREATE TABLE t(a INT)").await;
    query(&app, &id, "INSERT INTO t VALUES (1)").await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/data/{id}/main/t?page=9223372036854775807&page_size=2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rowCount"], 0);
    assert_eq!(body["rows"], json!([]));
}

#[tokio::test]
async fn multi_statement_query_returns_first_result_set() {
    let app = app();
    let id = create(&app).await;
    let (status, body) = query(&app, &id, "SELECT 1 AS a; SELECT 2 AS b").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["columns"], json!(["a"]));
    assert_eq!(body["rows"], json!([{ "a": 1 }]));
    assert_eq!(body["rowCount"], 1);
}

#[tokio::test]
async fn malformed_sql_is_reported_in_the_result() {
    let app = app();
    let id = create(&app).await;
    let (status, body) = query(&app, &id, "SELEC nonsense").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rowCount"], 0);
    assert_eq!(body["rows"], json!([]));
    assert_eq!(body["columns"], json!([]));
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_connection_is_not_found() {
    let app = app();
    let (status, body) = query(&app, "missing", "SELECT 1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));

    for uri in ["/api/databases/missing", "/api/tables/missing/main", "/api/schema/missing/t"] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }

    let (status, _) = send(&app, Method::DELETE, "/api/connections/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::POST, "/api/connections/missing/disconnect", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_forgets_the_connection() {
    let app = app();
    let id = create(&app).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/api/connections/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, _) = query(&app, &id, "SELECT 1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&app, Method::GET, "/api/connections", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn disconnect_keeps_the_record() {
    let app = app();
    let id = create(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/connections/{id}/disconnect"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, list) = send(&app, Method::GET, "/api/connections", None).await;
    assert_eq!(list[0]["status"], "disconnected");
}

#[tokio::test]
async fn connection_test_always_answers_ok() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/connections/test",
        Some(sqlite_memory("probe")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/connections/test",
        Some(json!({ "name": "x", "type": "oracle" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("oracle"));

    let (_, list) = send(&app, Method::GET, "/api/connections", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn bad_bodies_are_rejected() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/connections")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());

    let mut unnamed = sqlite_memory("");
    unnamed["name"] = json!("");
    let (status, _) = send(&app, Method::POST, "/api/connections", Some(unnamed)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/query",
        Some(json!({ "connection_id": "abc", "sql": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failed_connect_is_a_server_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/connections",
        Some(json!({ "name": "m", "type": "mongodb" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "unsupported database type: mongodb");
}

#[tokio::test]
async fn document_endpoints_are_empty() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/collections/any/db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/documents/find",
        Some(json!({ "connection_id": "any", "database": "db", "collection": "c", "filter": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/query"].is_object());
}

#[tokio::test]
async fn request_id_is_echoed() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/connections")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}
