pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "autismedu")]
#[command(about = "AutismEdu CLI - database and account administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Database URL override (defaults to DATABASE_URL)")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Staff and manager accounts")]
    Staff {
        #[command(subcommand)]
        cmd: commands::staff::StaffCommands,
    },

    #[command(about = "Refresh token maintenance")]
    Tokens {
        #[command(subcommand)]
        cmd: commands::tokens::TokenCommands,
    },

    #[command(about = "Initial assessment questions")]
    Assessment {
        #[command(subcommand)]
        cmd: commands::assessment::AssessmentCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Pool for one CLI invocation; unlike the server, commands fail fast when
/// the database is unreachable.
async fn open_pool(database_url: Option<String>) -> anyhow::Result<PgPool> {
    let mut db_config = config::config().database.clone();
    if let Some(url) = database_url {
        db_config.url = url;
    }
    let pool = DatabaseManager::connect_lazy(&db_config)?;
    DatabaseManager::health_check(&pool).await?;
    Ok(pool)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let pool = open_pool(cli.database_url).await?;

    match cli.command {
        Commands::Migrate => commands::migrate::handle(&pool, output_format).await,
        Commands::Staff { cmd } => commands::staff::handle(cmd, &pool, output_format).await,
        Commands::Tokens { cmd } => commands::tokens::handle(cmd, &pool, output_format).await,
        Commands::Assessment { cmd } => commands::assessment::handle(cmd, &pool, output_format).await,
    }
}
