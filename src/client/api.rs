use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ClientError;
use crate::domain::todo::{CreateTodo, Todo, TodoId, UpdateTodo};
use crate::http::types::ErrorBody;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// JSON body; requests with a body are sent as `application/json`.
    pub body: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Builds requests for, and interprets responses from, the todo API rooted at
/// `base_url`. Performs no I/O.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    pub fn build_health(&self) -> HttpRequest { self.request(Method::GET, "/api/health", None) }

    pub fn build_list(&self) -> HttpRequest { self.request(Method::GET, "/api/todos", None) }

    pub fn build_create(&self, input: &CreateTodo) -> Result<HttpRequest, ClientError> {
        Ok(self.request(Method::POST, "/api/todos", Some(encode(input)?)))
    }

    pub fn build_update(&self, id: TodoId, input: &UpdateTodo) -> Result<HttpRequest, ClientError> {
        Ok(self.request(Method::PUT, &format!("/api/todos/{id}"), Some(encode(input)?)))
    }

    pub fn build_delete(&self, id: TodoId) -> HttpRequest {
        self.request(Method::DELETE, &format!("/api/todos/{id}"), None)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, StatusCode::OK)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<Vec<Todo>, ClientError> {
        check_status(&response, StatusCode::OK)?;
        decode(&response.body)
    }

    pub fn parse_create(&self, response: HttpResponse) -> Result<Todo, ClientError> {
        check_status(&response, StatusCode::CREATED)?;
        decode(&response.body)
    }

    pub fn parse_update(&self, response: HttpResponse) -> Result<Todo, ClientError> {
        check_status(&response, StatusCode::OK)?;
        decode(&response.body)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, StatusCode::NO_CONTENT)
    }

    fn request(&self, method: Method, path: &str, body: Option<String>) -> HttpRequest {
        HttpRequest { method, url: format!("{}{path}", self.base_url), body }
    }
}

fn encode<T: Serialize>(input: &T) -> Result<String, ClientError> {
    serde_json::to_string(input).map_err(|e| ClientError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Decode(e.to_string()))
}

fn check_status(response: &HttpResponse, expected: StatusCode) -> Result<(), ClientError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound);
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .map(|b| b.error)
        .unwrap_or_else(|_| response.body.clone());
    Err(ClientError::Status { status: response.status.as_u16(), message })
}
