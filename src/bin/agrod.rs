use std::sync::Arc;

use arrrg::CommandLine;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;

use agro::config::{ServerArgs, ServerConfig, Storage};
use agro::{InMemoryFarmerRepository, PostgresFarmerRepository, SharedRepository, create_app};

const HELP_TEXT: &str = r#"agrod - Agro farmer registry daemon

USAGE:
    agrod [OPTIONS]

OPTIONS:
    --host <HOST>              Host to bind the HTTP server [env: AGRO_HOST] [default: 127.0.0.1]
    --port <PORT>              Port to bind the HTTP server [env: AGRO_PORT] [default: 8080]
    --database-url <URL>       PostgreSQL connection URL [env: DATABASE_URL]
    --max-connections <N>      Maximum pooled database connections [env: AGRO_MAX_CONNECTIONS] [default: 5]
    --in-memory                Keep farmers in memory instead of PostgreSQL
    --verbose                  Enable verbose logging

DESCRIPTION:
    Runs the Agro API. Logs are written to stderr as JSON; RUST_LOG overrides
    the level chosen by --verbose.

    Run agro-migrate-up against the database before the first start.

    The server supports graceful shutdown via Ctrl+C.

API ENDPOINTS:
    GET    /health                           Service name and version
    GET    /api/v1/farmers?limit=&offset=    List farmers
    POST   /api/v1/farmers                   Register a farmer
    PATCH  /api/v1/farmers?cpf_cnpj=         Partially update a farmer
    DELETE /api/v1/farmers?cpf_cnpj=         Delete a farmer"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = ServerArgs::from_command_line("USAGE: agrod [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let config = match ServerConfig::from_args(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("{}", HELP_TEXT);
            std::process::exit(1);
        }
    };

    agro::logging::init(config.verbose);

    let repository: SharedRepository = match &config.storage {
        Storage::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;
            tracing::info!(max_connections, "connected to PostgreSQL");
            Arc::new(PostgresFarmerRepository::new(pool))
        }
        Storage::InMemory => {
            tracing::warn!("using in-memory storage; farmers are lost on exit");
            Arc::new(InMemoryFarmerRepository::new())
        }
    };

    let app = create_app(repository);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!(
        address = %addr,
        version = env!("CARGO_PKG_VERSION"),
        "Agro API listening"
    );

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!(error = %e, "server error");
                std::process::exit(1);
            }
        }
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            tracing::info!("shutdown signal received, stopping server");
        }
    }

    Ok(())
}
