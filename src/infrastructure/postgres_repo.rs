use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::{PgConnectOptions, PgPoolOptions, PgRow}, Pool, Postgres, Row};

use super::ACQUIRE_TIMEOUT;
use crate::config::PostgresConfig;
use crate::domain::{
    repository::TodoRepository,
    todo::{CreateTodo, Todo, TodoId, UpdateTodo},
};

const COLUMNS: &str = "id, title, description, completed, created_at";

#[derive(Clone)]
pub struct PostgresTodoRepository {
    pool: Arc<Pool<Postgres>>,
}

impl PostgresTodoRepository {
    pub async fn connect(config: &PostgresConfig, max_connections: u32) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);
        Self::connect_with(options, max_connections)
            .await
            .with_context(|| format!("connecting to postgres at {}:{}/{}", config.host, config.port, config.name))
    }

    pub async fn connect_with(options: PgConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                completed BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn create(&self, input: CreateTodo) -> Result<Todo> {
        let row = sqlx::query("INSERT INTO todos (title, description) VALUES ($1, $2) RETURNING id")
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(&*self.pool)
            .await?;
        let id = TodoId(row.try_get("id")?);
        self.get(id).await?.with_context(|| format!("todo {id} missing right after insert"))
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM todos WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_todo).transpose()
    }

    async fn list(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"))
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> Result<Option<Todo>> {
        let result = sqlx::query("UPDATE todos SET title = $2, description = $3, completed = $4 WHERE id = $1")
            .bind(id.0)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.completed)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn delete(&self, id: TodoId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_todo(row: PgRow) -> Result<Todo> {
    Ok(Todo {
        id: TodoId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        completed: row.try_get("completed")?,
        created_at: row.try_get("created_at")?,
    })
}
