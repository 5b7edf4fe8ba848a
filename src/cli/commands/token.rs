use clap::Subcommand;
use serde_json::json;

use crate::auth::keys::{digest_access_key, secrets_match};
use crate::auth::{peek_profile_id, TokenCodec, TokenSubject};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::ProfileRepository;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a bearer token for a profile (same as POST /api/login)")]
    Issue {
        #[arg(long, help = "Profile ID")]
        profile: i32,

        #[arg(long, help = "The profile's access key")]
        access_key: String,
    },

    #[command(about = "Read profileId from a token without verifying it")]
    Peek {
        #[arg(help = "Bearer token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Issue { profile, access_key } => {
            let config = config::config()?;
            let (manager, store) = connect_store().await?;
            let found = store.find_profile(profile).await?;
            manager.close().await;

            let found = match found {
                Some(p) if secrets_match(&digest_access_key(&access_key), &p.access_key_digest) => p,
                _ => anyhow::bail!("no profile {} with that access key", profile),
            };

            let codec = TokenCodec::from_config(&config.security);
            let token = codec.issue(TokenSubject {
                profile_id: found.id,
                email: found.email,
                name: found.name,
                access_key,
            })?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Token issued",
                    Some(json!({ "token": token, "expiresIn": codec.lifetime().num_seconds() })),
                ),
                OutputFormat::Text => {
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        TokenCommands::Peek { token } => {
            let profile_id = peek_profile_id(&token);
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "profileId": profile_id }))?);
                }
                OutputFormat::Text => match profile_id {
                    Some(id) => println!("profileId: {} (unverified)", id),
                    None => println!("Token payload has no readable profileId"),
                },
            }
            Ok(())
        }
    }
}
