pub mod todos;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{middleware, routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::cors::{self, AllowList};

/// Everything around the handlers: who may call them and what else is served.
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    pub allow_list: AllowList,
    pub static_dir: Option<PathBuf>,
}

pub fn app(router: Router, options: AppOptions) -> Router {
    let allow = Arc::new(options.allow_list);
    let mut app = Router::new()
        .route("/api/health", get(health))
        .merge(router);
    if let Some(dir) = options.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(allow.clone(), cors::enforce_origin))
            .layer(cors::cors_layer(allow)),
    )
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}
