use clap::Subcommand;
use serde_json::json;

use crate::auth::keys::generate_api_key;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::database::models::NewProfile;
use crate::database::ProfileRepository;

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Provision a profile; prints its access key and API key once")]
    Create {
        #[arg(long, help = "Display name")]
        name: String,

        #[arg(long, help = "Contact email")]
        email: String,

        #[arg(long, help = "Professional title")]
        title: String,

        #[arg(long, default_value = "", help = "Biography")]
        about: String,

        #[arg(long, help = "Access key to use instead of a generated one")]
        access_key: Option<String>,
    },

    #[command(about = "List profiles")]
    List,
}

pub async fn handle(cmd: ProfileCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProfileCommands::Create {
            name,
            email,
            title,
            about,
            access_key,
        } => {
            let access_key = access_key.unwrap_or_else(generate_api_key);
            let api_key = generate_api_key();

            let (manager, store) = connect_store().await?;
            let profile = store
                .create_profile(NewProfile {
                    name,
                    title,
                    email,
                    access_key: access_key.clone(),
                    api_key: api_key.clone(),
                    about,
                })
                .await?;
            manager.close().await;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Profile created",
                    Some(json!({
                        "id": profile.id,
                        "email": profile.email,
                        "accessKey": access_key,
                        "apiKey": api_key
                    })),
                ),
                OutputFormat::Text => {
                    output_success(&output_format, &format!("Profile {} created ({})", profile.id, profile.email), None)?;
                    println!("Access key: {}", access_key);
                    println!("API key:    {}", api_key);
                    println!("Store the access key now; only its digest is kept.");
                    Ok(())
                }
            }
        }
        ProfileCommands::List => {
            let (manager, store) = connect_store().await?;
            let profiles = store.list_profiles().await?;
            manager.close().await;

            if profiles.is_empty() {
                return output_empty_collection(&output_format, "profiles", "No profiles provisioned");
            }

            match output_format {
                OutputFormat::Json => {
                    let rows: Vec<_> = profiles
                        .iter()
                        .map(|p| {
                            json!({
                                "id": p.id,
                                "name": p.name,
                                "email": p.email,
                                "title": p.title,
                                "apiKeyActive": p.api_key.is_some()
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&json!({ "profiles": rows }))?);
                }
                OutputFormat::Text => {
                    println!("{:<6} {:<25} {:<30} {:<25} {}", "ID", "NAME", "EMAIL", "TITLE", "API KEY");
                    println!("{}", "-".repeat(96));
                    for p in &profiles {
                        let key_state = if p.api_key.is_some() { "active" } else { "revoked" };
                        println!("{:<6} {:<25} {:<30} {:<25} {}", p.id, p.name, p.email, p.title, key_state);
                    }
                }
            }
            Ok(())
        }
    }
}
