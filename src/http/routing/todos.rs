use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{routing::{get, put}, Json, Router};

use crate::{
    application::todo_service::TodoService,
    domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo},
    http::types::ApiError,
};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route("/api/todos/:id", put(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<Vec<Todo>>, ApiError> {
    Ok(Json(state.service.list().await?))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(input) = payload.map_err(bad_body)?;
    let todo = state.service.create(input).await?;
    tracing::info!(id = %todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id)?;
    let Json(input) = payload.map_err(bad_body)?;
    Ok(Json(state.service.update(id, input).await?))
}

async fn delete_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(id)?;
    state.service.delete(id).await?;
    tracing::info!(%id, "todo deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(id: Result<Path<i64>, PathRejection>) -> Result<TodoId, ApiError> {
    id.map(|Path(id)| TodoId(id)).map_err(|_| ApiError::BadRequest("Invalid todo id".into()))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
