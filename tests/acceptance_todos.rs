use todo_api::{application::todo_service::TodoServiceImpl, http::routing::{self, todos, AppOptions}, infrastructure::sqlite_repo::SqliteTodoRepository};
use todo_api::domain::{repository::TodoRepository, todo::{CreateTodo, Todo, TodoId, UpdateTodo}};
use async_trait::async_trait;
use axum::body::to_bytes;
use axum::Router;
use serde_json::{json, Value};

async fn app() -> Router {
    // use in-memory sqlite for tests
    let repo = SqliteTodoRepository::connect("sqlite::memory:", 5).await.unwrap();
    repo.init().await.unwrap();
    with_repo(repo)
}

fn with_repo<R: TodoRepository + Clone>(repo: R) -> Router {
    let service = TodoServiceImpl::new(repo);
    routing::app(todos::router(todos::AppState { service }), AppOptions::default())
}

#[tokio::test]
async fn acceptance_create_list_update_delete() {
    let app = app().await;

    // create
    let res = request(&app, "POST", "/api/todos", Some(json!({ "title": "  Test  ", "description": " First " }))).await;
    assert_eq!(res.status(), 201);
    let created = body_json(res).await;
    assert_eq!(created["title"], "Test");
    assert_eq!(created["description"], "First");
    assert_eq!(created["completed"], false);
    assert!(created["created_at"].is_string());
    let id = created["id"].as_i64().unwrap();

    // list
    let res = request(&app, "GET", "/api/todos", None).await;
    assert_eq!(res.status(), 200);
    let list = body_json(res).await;
    let matching: Vec<_> = list.as_array().unwrap().iter().filter(|t| t["id"] == id).collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0], &created);

    // toggle
    let res = request(&app, "PUT", &format!("/api/todos/{id}"), Some(json!({ "title": "Test", "description": "First", "completed": true }))).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await["completed"], true);
    let list = body_json(request(&app, "GET", "/api/todos", None).await).await;
    assert_eq!(list[0]["completed"], true);
    assert_eq!(list[0]["title"], "Test");
    assert_eq!(list[0]["description"], "First");
    assert_eq!(list[0]["created_at"], created["created_at"]);

    // delete
    let res = request(&app, "DELETE", &format!("/api/todos/{id}"), None).await;
    assert_eq!(res.status(), 204);
    assert!(to_bytes(res.into_body(), 1024).await.unwrap().is_empty());
    let list = body_json(request(&app, "GET", "/api/todos", None).await).await;
    assert!(list.as_array().unwrap().iter().all(|t| t["id"] != id));

    // second delete 404
    let res = request(&app, "DELETE", &format!("/api/todos/{id}"), None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn health_reports_ok() {
    let res = request(&app().await, "GET", "/api/health", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await["status"], "ok");
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let res = request(&app().await, "GET", "/api/todos", None).await;
    assert_eq!(res.status(), 200);
    assert_eq!(body_json(res).await, json!([]));
}

#[tokio::test]
async fn description_defaults_to_null() {
    let res = request(&app().await, "POST", "/api/todos", Some(json!({ "title": "No details" }))).await;
    assert_eq!(res.status(), 201);
    assert_eq!(body_json(res).await["description"], Value::Null);
}

#[tokio::test]
async fn long_titles_round_trip_unchanged() {
    let app = app().await;
    let title = "t".repeat(300);
    let res = request(&app, "POST", "/api/todos", Some(json!({ "title": title }))).await;
    assert_eq!(res.status(), 201);
    assert_eq!(body_json(res).await["title"], title.as_str());
    let list = body_json(request(&app, "GET", "/api/todos", None).await).await;
    assert_eq!(list[0]["title"], title.as_str());
}

#[tokio::test]
async fn blank_or_missing_title_is_rejected_and_not_stored() {
    let app = app().await;
    for body in [json!({ "title": "   " }), json!({ "description": "orphan" }), json!({ "title": 5 })] {
        let res = request(&app, "POST", "/api/todos", Some(body)).await;
        assert_eq!(res.status(), 400);
        assert!(body_json(res).await["error"].is_string());
    }
    assert_eq!(body_json(request(&app, "GET", "/api/todos", None).await).await, json!([]));
}

#[tokio::test]
async fn updating_unknown_id_is_404_and_changes_nothing() {
    let app = app().await;
    request(&app, "POST", "/api/todos", Some(json!({ "title": "keep" }))).await;
    let before = body_json(request(&app, "GET", "/api/todos", None).await).await;
    let res = request(&app, "PUT", "/api/todos/999999", Some(json!({ "title": "x", "description": null, "completed": true }))).await;
    assert_eq!(res.status(), 404);
    assert_eq!(body_json(res).await["error"], "Todo not found");
    assert_eq!(body_json(request(&app, "GET", "/api/todos", None).await).await, before);
}

#[tokio::test]
async fn deleting_unknown_id_is_404() {
    let res = request(&app().await, "DELETE", "/api/todos/999999", None).await;
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn update_requires_all_fields() {
    let app = app().await;
    let created = body_json(request(&app, "POST", "/api/todos", Some(json!({ "title": "t", "description": "d" }))).await).await;
    let id = created["id"].as_i64().unwrap();
    for body in [
        json!({ "title": "t", "description": "d" }),
        json!({ "title": "t", "completed": true }),
        json!({ "description": "d", "completed": true }),
        json!({ "title": "t", "description": "d", "completed": "yes" }),
        json!({ "title": " ", "description": "d", "completed": true }),
    ] {
        let res = request(&app, "PUT", &format!("/api/todos/{id}"), Some(body)).await;
        assert_eq!(res.status(), 400);
    }
    let list = body_json(request(&app, "GET", "/api/todos", None).await).await;
    assert_eq!(list[0], created);
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let res = request(&app().await, "DELETE", "/api/todos/abc", None).await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = app().await;
    for title in ["first", "second", "third", "fourth"] {
        request(&app, "POST", "/api/todos", Some(json!({ "title": title }))).await;
    }
    // Deleting from the middle must not disturb the order of the rest.
    let list = body_json(request(&app, "GET", "/api/todos", None).await).await;
    let second = list[2]["id"].as_i64().unwrap();
    request(&app, "DELETE", &format!("/api/todos/{second}"), None).await;
    request(&app, "POST", "/api/todos", Some(json!({ "title": "fifth" }))).await;

    let list = body_json(request(&app, "GET", "/api/todos", None).await).await;
    let titles: Vec<_> = list.as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap().to_string()).collect();
    assert_eq!(titles, ["fifth", "fourth", "third", "first"]);
    let stamps: Vec<_> = list.as_array().unwrap().iter().map(|t| t["created_at"].as_str().unwrap().to_string()).collect();
    let parsed: Vec<chrono::DateTime<chrono::Utc>> = stamps.iter().map(|s| s.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn cross_origin_requests_are_filtered() {
    let app = app().await;

    let res = request_from(&app, "GET", "/api/todos", Some("https://my-todos.vercel.app")).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["access-control-allow-origin"], "https://my-todos.vercel.app");

    let res = request_from(&app, "GET", "/api/todos", Some("http://localhost:5173")).await;
    assert_eq!(res.status(), 200);

    let res = request_from(&app, "GET", "/api/todos", Some("https://evil.example")).await;
    assert_eq!(res.status(), 403);
    assert_eq!(body_json(res).await["error"], "Origin not allowed");

    let res = request_from(&app, "POST", "/api/todos", Some("https://vercel.app.evil.example")).await;
    assert_eq!(res.status(), 403);
    assert_eq!(body_json(request(&app, "GET", "/api/todos", None).await).await, json!([]));
}

#[tokio::test]
async fn preflight_from_allowed_origin_succeeds() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/todos/1")
        .header("origin", "https://todo-client.onrender.com")
        .header("access-control-request-method", "PUT")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let res = app().await.oneshot(req).await.unwrap();
    assert!(res.status().is_success());
    assert_eq!(res.headers()["access-control-allow-origin"], "https://todo-client.onrender.com");
}

#[derive(Clone)]
struct UnavailableRepo;

#[async_trait]
impl TodoRepository for UnavailableRepo {
    async fn init(&self) -> anyhow::Result<()> { Ok(()) }
    async fn create(&self, _: CreateTodo) -> anyhow::Result<Todo> { anyhow::bail!("pool timed out while waiting for an open connection") }
    async fn get(&self, _: TodoId) -> anyhow::Result<Option<Todo>> { anyhow::bail!("pool timed out while waiting for an open connection") }
    async fn list(&self) -> anyhow::Result<Vec<Todo>> { anyhow::bail!("pool timed out while waiting for an open connection") }
    async fn update(&self, _: TodoId, _: UpdateTodo) -> anyhow::Result<Option<Todo>> { anyhow::bail!("pool timed out while waiting for an open connection") }
    async fn delete(&self, _: TodoId) -> anyhow::Result<bool> { anyhow::bail!("pool timed out while waiting for an open connection") }
}

#[tokio::test]
async fn storage_failures_are_generic_500s() {
    let app = with_repo(UnavailableRepo);
    let cases = [
        ("GET", "/api/todos", None),
        ("POST", "/api/todos", Some(json!({ "title": "x" }))),
        ("PUT", "/api/todos/1", Some(json!({ "title": "x", "description": null, "completed": false }))),
        ("DELETE", "/api/todos/1", None),
    ];
    for (method, path, body) in cases {
        let res = request(&app, method, path, body).await;
        assert_eq!(res.status(), 500, "{method} {path}");
        assert_eq!(body_json(res).await, json!({ "error": "Internal server error" }));
    }
    // health never touches storage
    assert_eq!(request(&app, "GET", "/api/health", None).await.status(), 200);
}

async fn body_json(res: hyper::Response<axum::body::Body>) -> Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

async fn request(app: &Router, method: &str, path: &str, body: Option<Value>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Request, Method};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

async fn request_from(app: &Router, method: &str, path: &str, origin: Option<&str>) -> hyper::Response<axum::body::Body> {
    use axum::body::Body;
    use axum::http::{Request, Method};
    use tower::ServiceExt;

    let mut req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    if let Some(origin) = origin {
        req = req.header("origin", origin);
    }
    let req = if method == "POST" {
        req.header("content-type", "application/json").body(Body::from(json!({ "title": "from elsewhere" }).to_string())).unwrap()
    } else {
        req.body(Body::empty()).unwrap()
    };
    app.clone().oneshot(req).await.unwrap()
}
