use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/todos`. A missing title decodes as empty so that it is
/// rejected by the same validation as a blank one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /api/todos/:id`. Full replacement: every key must be present,
/// `description` may be null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    pub title: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub description: Option<String>,
    pub completed: bool,
}

impl Todo {
    /// Replacement body that keeps everything but flips `completed`.
    pub fn toggled(&self) -> UpdateTodo {
        UpdateTodo { title: self.title.clone(), description: self.description.clone(), completed: !self.completed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_requires_every_key() {
        let missing_completed = serde_json::from_str::<UpdateTodo>(r#"{"title":"a","description":null}"#);
        assert!(missing_completed.is_err());
        let missing_description = serde_json::from_str::<UpdateTodo>(r#"{"title":"a","completed":true}"#);
        assert!(missing_description.is_err());
        let ok: UpdateTodo = serde_json::from_str(r#"{"title":"a","description":null,"completed":true}"#).unwrap();
        assert_eq!(ok.description, None);
        assert!(ok.completed);
    }

    #[test]
    fn create_tolerates_missing_fields() {
        let input: CreateTodo = serde_json::from_str("{}").unwrap();
        assert_eq!(input, CreateTodo::default());
    }

    #[test]
    fn id_serializes_as_plain_integer() {
        assert_eq!(serde_json::to_string(&TodoId(42)).unwrap(), "42");
    }
}
