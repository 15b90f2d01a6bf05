use chrono::{Duration, Utc};
use clap::Subcommand;
use serde_json::json;
use sqlx::PgPool;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::repository::TokenRepository;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Delete invalidated or expired refresh tokens")]
    Purge {
        #[arg(long, help = "Keep invalidated tokens issued within this many days", default_value = "7")]
        older_than_days: i64,
    },
}

pub async fn handle(cmd: TokenCommands, pool: &PgPool, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Purge { older_than_days } => {
            if older_than_days < 0 {
                anyhow::bail!("--older-than-days must not be negative");
            }
            let cutoff = Utc::now() - Duration::days(older_than_days);
            let purged = TokenRepository::new(pool.clone()).purge_refresh(cutoff).await?;
            output_success(
                output_format,
                &format!("Purged {} refresh tokens", purged),
                Some(json!({ "purged": purged, "cutoff": cutoff })),
            )
        }
    }
}
