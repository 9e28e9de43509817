//! # Bootstrap walkthrough
//!
//! Loads configuration from the environment (or `.env`), builds the pooled
//! connection and the wired registry, starts the lifecycle and prints the
//! row counts. Needs a reachable PostgreSQL:
//!
//! ```text
//! DB_HOST=localhost DB_NAME=shop DB_USER=postgres DB_PASS=password \
//! APP_ENV=development cargo run --example bootstrap
//! ```

use shopdb::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_target(false))
        .init();

    let config = AppConfig::from_env()?;
    println!("Connecting to {}", config.database.redacted_connection_string());

    let database = Database::bootstrap(config).await?;

    println!("Registered models:");
    for model in database.registry().iter() {
        println!(
            "  {:<10} {:<12} {} associations",
            model.name(),
            model.table_name(),
            model.associations().len()
        );
    }
    for edge in &database.wiring().unpaired {
        println!("  warning: {:?} {} -> {} has no inverse", edge.kind, edge.source, edge.target);
    }

    database.initialize().await?;
    println!("Lifecycle state: {:?}", database.state());

    match database.get_database_stats().await {
        Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
        None => println!("Row counts unavailable, see log"),
    }

    Ok(())
}
