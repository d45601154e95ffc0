mod searches;

use clap::{Parser, Subcommand};
use leadgen_core::AppConfig;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::searches::SearchCommands;

#[derive(Debug, Parser)]
#[command(name = "leadgen-cli")]
#[command(about = "Lead-generation search query pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Generate, inspect and consume search queries
    Searches {
        #[command(subcommand)]
        command: SearchCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = leadgen_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Some(Commands::Db { command }) => run_db(&config, command).await?,
        Some(Commands::Searches { command }) => searches::run(&config, command).await?,
        None => println!("leadgen-cli: pass --help to list commands"),
    }

    Ok(())
}

/// Open a pool sized by the config. Commands that never touch the database
/// skip this entirely, so only they need `DATABASE_URL`.
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config.require_database_url()?;
    let pool_config = leadgen_db::PoolConfig::from_app_config(config);
    let pool = leadgen_db::connect_pool(database_url, pool_config).await?;
    Ok(pool)
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = connect(config).await?;
    match command {
        DbCommands::Ping => {
            leadgen_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = leadgen_db::run_migrations(&pool).await?;
            tracing::info!(applied, "migrations complete");
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
