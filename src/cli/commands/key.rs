use clap::Subcommand;
use serde_json::json;

use crate::auth::keys::generate_api_key;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::ProfileRepository;

#[derive(Subcommand)]
pub enum KeyCommands {
    #[command(about = "Issue a new API key; the previous key stops working immediately")]
    Rotate {
        #[arg(long, help = "Profile ID")]
        profile: i32,
    },

    #[command(about = "Disable API key access until the next rotation")]
    Revoke {
        #[arg(long, help = "Profile ID")]
        profile: i32,
    },
}

pub async fn handle(cmd: KeyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (manager, store) = connect_store().await?;

    let result = match cmd {
        KeyCommands::Rotate { profile } => {
            let api_key = generate_api_key();
            if !store.set_api_key(profile, Some(&api_key)).await? {
                anyhow::bail!("profile {} not found", profile);
            }
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "API key rotated",
                    Some(json!({ "profileId": profile, "apiKey": api_key })),
                ),
                OutputFormat::Text => {
                    output_success(&output_format, &format!("API key rotated for profile {}", profile), None)?;
                    println!("API key: {}", api_key);
                    Ok(())
                }
            }
        }
        KeyCommands::Revoke { profile } => {
            if !store.set_api_key(profile, None).await? {
                anyhow::bail!("profile {} not found", profile);
            }
            output_success(
                &output_format,
                &format!("API key revoked for profile {}", profile),
                Some(json!({ "profileId": profile })),
            )
        }
    };

    manager.close().await;
    result
}
