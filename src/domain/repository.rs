use async_trait::async_trait;
use super::todo::{CreateTodo, Todo, TodoId, UpdateTodo};

/// Storage for todos. Implementations receive input that the service has
/// already trimmed and validated.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    /// Inserts a row and returns it as re-read by its generated id.
    async fn create(&self, input: CreateTodo) -> anyhow::Result<Todo>;
    async fn get(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// All rows, most recently created first.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> anyhow::Result<Option<Todo>>;
    async fn delete(&self, id: TodoId) -> anyhow::Result<bool>;
}
