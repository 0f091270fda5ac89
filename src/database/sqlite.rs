//! SQLite todo store

use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{info, warn};

use super::{mask_database_url, DatabaseConfig, TodoStore};
use crate::models::Todo;

#[derive(Clone, Debug)]
pub struct SqliteTodoStore {
    pool: SqlitePool,
}

impl SqliteTodoStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed) and migrate the database.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to database: {}",
            mask_database_url(&config.database_url)
        );

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("Invalid database URL {}", config.database_url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                e
            })
            .context("Failed to open SQLite database")?;

        let store = Self::new(pool);
        store.run_migrations().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub async fn close(self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl TodoStore for SqliteTodoStore {
    async fn find_all(&self) -> Result<Vec<Todo>> {
        sqlx::query_as::<_, Todo>(r#"SELECT id, title, "isCompleted" FROM todo ORDER BY id"#)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list Todos")
    }

    async fn find_one(&self, id: i64) -> Result<Option<Todo>> {
        sqlx::query_as::<_, Todo>(r#"SELECT id, title, "isCompleted" FROM todo WHERE id = ?"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get Todo by ID")
    }

    async fn save(&self, mut todo: Todo) -> Result<Option<Todo>> {
        if todo.is_saved() {
            let result =
                sqlx::query(r#"UPDATE todo SET title = ?, "isCompleted" = ? WHERE id = ?"#)
                    .bind(&todo.title)
                    .bind(todo.is_completed)
                    .bind(todo.id)
                    .execute(&self.pool)
                    .await
                    .context("Failed to update Todo")?;
            if result.rows_affected() == 0 {
                return Ok(None);
            }
            info!("Updated Todo {}", todo.id);
        } else {
            let result = sqlx::query(r#"INSERT INTO todo (title, "isCompleted") VALUES (?, ?)"#)
                .bind(&todo.title)
                .bind(todo.is_completed)
                .execute(&self.pool)
                .await
                .context("Failed to create Todo")?;
            todo.id = result.last_insert_rowid();
            info!("Created Todo {} for '{}'", todo.id, todo.title);
        }
        Ok(Some(todo))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todo WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete Todo")?;
        if result.rows_affected() > 0 {
            info!("Deleted Todo {}", id);
        }
        Ok(result.rows_affected() > 0)
    }
}
