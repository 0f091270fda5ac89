//! Todo REST API Server
//!
//! ## Usage
//!
//! ```bash
//! # Community edition on SQLite
//! cargo run --bin todo_server --features server
//!
//! # Enterprise backend with the enterprise UI, in memory
//! EDITION=enterprise UI_EDITION=ee DATABASE_URL=memory \
//!   cargo run --bin todo_server --features server
//!
//! curl -X POST http://localhost:3000/todos \
//!   -H "Content-Type: application/json" \
//!   -d '{"title": "buy milk"}'
//! curl -X PUT http://localhost:3000/todos/1 \
//!   -H "Content-Type: application/json" \
//!   -d '{"isCompleted": true, "title": "buy oat milk"}'
//! curl http://localhost:3000/edition
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_editions::api::{create_todo_router, AppState};
use todo_editions::database::{MemoryTodoStore, SqliteTodoStore, TodoStore};
use todo_editions::ui::{builtin_ui_registry, EditionLoader, TODO_LIST_DIR, TODO_LIST_FILE};
use todo_editions::{builtin_registry, AppConfig, RawConfig, TodoFacade};

#[derive(Parser, Debug)]
#[command(name = "todo_server")]
#[command(about = "Serve the todo REST API for the configured edition")]
struct Cli {
    /// Backend edition: community, enterprise or cloud
    #[arg(long, env = "EDITION")]
    edition: Option<String>,

    /// UI edition: ce or ee
    #[arg(long, env = "UI_EDITION")]
    ui_edition: Option<String>,

    /// SQLite URL, or "memory" for an in-memory store
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Listen address
    #[arg(long, env = "BIND_ADDR")]
    bind_addr: Option<String>,

    /// Listen port on all interfaces, used when no bind address is given
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

impl From<Cli> for RawConfig {
    fn from(cli: Cli) -> Self {
        RawConfig {
            edition: cli.edition,
            ui_edition: cli.ui_edition,
            database_url: cli.database_url,
            bind_addr: cli
                .bind_addr
                .or_else(|| cli.port.map(|port| format!("0.0.0.0:{port}"))),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_editions=info,todo_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Editions are validated before anything is opened or loaded
    let config = AppConfig::from_raw(Cli::parse().into()).context("Invalid configuration")?;
    tracing::info!(
        "Starting todo server: edition={}, ui_edition={}",
        config.edition,
        config.ui_edition
    );

    let store: Arc<dyn TodoStore> = if config.database.is_memory() {
        tracing::info!("Using in-memory todo store");
        Arc::new(MemoryTodoStore::new())
    } else {
        Arc::new(SqliteTodoStore::connect(&config.database).await?)
    };

    let facade = Arc::new(TodoFacade::new(
        store,
        Arc::new(builtin_registry()),
        config.edition,
    ));
    facade
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize todo service: {e}"))?;

    let todo_list = EditionLoader::new(
        Arc::new(builtin_ui_registry()),
        TODO_LIST_DIR,
        TODO_LIST_FILE,
        config.ui_edition.as_str(),
    );
    let app = create_todo_router(AppState::new(facade, config.ui_edition, todo_list));

    tracing::info!("Server running on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
