use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::schema;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Create tables and indexes (idempotent)")]
    Init,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DbCommands::Init => {
            let (manager, _) = connect_store().await?;
            schema::ensure_schema(manager.pool()).await?;
            manager.close().await;
            output_success(
                &output_format,
                "Database schema is up to date",
                Some(json!({ "tables": ["profiles", "projects", "skills", "employments", "system_prompts"] })),
            )
        }
    }
}
