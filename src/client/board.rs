use super::api::{HttpRequest, HttpResponse, TodoClient};
use super::error::ClientError;
use super::transport::Transport;
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// The initial load failed; the view shows this message until a retry
    /// succeeds.
    Unreachable(String),
}

/// Client-side mirror of the server's todo list.
///
/// The list only changes from server answers: a fetched list, a created or
/// updated representation, or a confirmed delete. A failed mutation leaves
/// the list as it was and records a notice for the UI to show.
pub struct Board<T> {
    client: TodoClient,
    transport: T,
    todos: Vec<Todo>,
    state: LoadState,
    notice: Option<String>,
}

impl<T: Transport> Board<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self { client, transport, todos: Vec::new(), state: LoadState::Loading, notice: None }
    }

    pub fn todos(&self) -> &[Todo] { &self.todos }

    pub fn state(&self) -> &LoadState { &self.state }

    pub fn notice(&self) -> Option<&str> { self.notice.as_deref() }

    pub fn dismiss_notice(&mut self) { self.notice = None; }

    pub fn server(&self) -> &str { self.client.base_url() }

    /// Health check, then list. Either failing marks the board unreachable;
    /// nothing retries on its own.
    pub fn load(&mut self) -> Result<(), ClientError> {
        self.state = LoadState::Loading;
        match self.fetch_all() {
            Ok(todos) => {
                self.todos = todos;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, server = self.client.base_url(), "initial load failed");
                self.state = LoadState::Unreachable(format!("Cannot reach the server at {}: {e}", self.client.base_url()));
                Err(e)
            }
        }
    }

    pub fn retry(&mut self) -> Result<(), ClientError> { self.load() }

    pub fn create(&mut self, title: &str, description: Option<&str>) -> Result<Todo, ClientError> {
        let input = CreateTodo { title: title.to_string(), description: description.map(str::to_string) };
        let result = self
            .client
            .build_create(&input)
            .and_then(|req| self.send(req))
            .and_then(|res| self.client.parse_create(res));
        let created = self.noted(result, "create todo")?;
        self.todos.insert(0, created.clone());
        Ok(created)
    }

    /// Flips `completed`, sending the full current title and description.
    pub fn toggle(&mut self, id: TodoId) -> Result<Todo, ClientError> {
        let body = self.local(id).map(Todo::toggled);
        self.replace(id, body, "update todo")
    }

    /// Replaces title and description, keeping `completed`.
    pub fn edit(&mut self, id: TodoId, title: &str, description: Option<&str>) -> Result<Todo, ClientError> {
        let body = self.local(id).map(|todo| UpdateTodo {
            title: title.to_string(),
            description: description.map(str::to_string),
            completed: todo.completed,
        });
        self.replace(id, body, "update todo")
    }

    pub fn delete(&mut self, id: TodoId) -> Result<(), ClientError> {
        let req = self.client.build_delete(id);
        let result = self.send(req).and_then(|res| self.client.parse_delete(res));
        self.noted(result, "delete todo")?;
        self.todos.retain(|t| t.id != id);
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Todo>, ClientError> {
        let health = self.send(self.client.build_health())?;
        self.client.parse_health(health)?;
        let list = self.send(self.client.build_list())?;
        self.client.parse_list(list)
    }

    fn replace(&mut self, id: TodoId, body: Result<UpdateTodo, ClientError>, action: &str) -> Result<Todo, ClientError> {
        let result = body
            .and_then(|body| self.client.build_update(id, &body))
            .and_then(|req| self.send(req))
            .and_then(|res| self.client.parse_update(res));
        let updated = self.noted(result, action)?;
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    fn local(&self, id: TodoId) -> Result<&Todo, ClientError> {
        self.todos.iter().find(|t| t.id == id).ok_or(ClientError::NotFound)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.transport.execute(request)
    }

    fn noted<R>(&mut self, result: Result<R, ClientError>, action: &str) -> Result<R, ClientError> {
        if let Err(e) = &result {
            self.notice = Some(format!("Failed to {action}: {e}"));
        }
        result
    }
}
