use crate::domain::repository::TodoRepository;
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Todo>>;
    async fn create(&self, input: CreateTodo) -> Result<Todo>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Todo>;
    async fn delete(&self, id: TodoId) -> Result<()>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn list(&self) -> Result<Vec<Todo>> { Ok(self.repo.list().await?) }

    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let title = required_title(&input.title)?;
        let description = input.description.as_deref().map(|d| d.trim().to_string());
        Ok(self.repo.create(CreateTodo { title, description }).await?)
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Todo> {
        let title = required_title(&input.title)?;
        let description = input.description.as_deref().map(|d| d.trim().to_string());
        let replacement = UpdateTodo { title, description, completed: input.completed };
        self.repo.update(id, replacement).await?.ok_or(ServiceError::NotFound(id))
    }

    async fn delete(&self, id: TodoId) -> Result<()> {
        if self.repo.delete(id).await? { Ok(()) } else { Err(ServiceError::NotFound(id)) }
    }
}

fn required_title(raw: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ServiceError::InvalidInput("Title is required".into()));
    }
    Ok(title.to_string())
}
