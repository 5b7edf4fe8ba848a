use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, PgStore};

/// Output a success message in the appropriate format.
/// In JSON mode the fields of `data` are merged next to `message`.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(fields))) = (response.as_object_mut(), data) {
                target.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Open the configured database the same way the server does
pub async fn connect_store() -> anyhow::Result<(DatabaseManager, PgStore)> {
    let config = config::config()?;
    let manager = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database (is DATABASE_URL set?)")?;
    let store = PgStore::from_manager(&manager);
    Ok((manager, store))
}
