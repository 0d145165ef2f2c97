use anyhow::Context;
use axum::Router;
use todo_api::application::todo_service::TodoServiceImpl;
use todo_api::config::{AppConfig, DatabaseConfig, LogFormat};
use todo_api::domain::repository::TodoRepository;
use todo_api::http::routing::{self, todos, AppOptions};
use todo_api::infrastructure::{postgres_repo::PostgresTodoRepository, sqlite_repo::SqliteTodoRepository};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let todos_router = match &config.database {
        DatabaseConfig::Postgres(pg) => {
            tracing::info!(host = %pg.host, port = pg.port, database = %pg.name, pool_size = config.pool_size, "using postgres");
            todos_router(PostgresTodoRepository::connect(pg, config.pool_size).await?).await?
        }
        DatabaseConfig::Sqlite { url } => {
            tracing::info!(%url, pool_size = config.pool_size, "using sqlite");
            todos_router(SqliteTodoRepository::connect(url, config.pool_size).await?).await?
        }
    };
    let router = routing::app(todos_router, AppOptions { allow_list: config.allow_list, static_dir: config.static_dir });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!(addr = %config.bind, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Creates the table if needed and wires the repository behind the handlers.
async fn todos_router<R: TodoRepository + Clone>(repo: R) -> anyhow::Result<Router> {
    repo.init().await.context("creating todos table")?;
    let service = TodoServiceImpl::new(repo);
    Ok(todos::router(todos::AppState { service }))
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
