//! User library command handlers.

use super::commands::{OutputFormat, UserCommands};
use super::output::print_json;
use backdrop::{Backdrop, BackdropResult};
use backdrop_error::{StorageError, StorageErrorKind};
use std::path::Path;

/// Handle user library commands.
pub async fn handle_user_command(backdrop: &Backdrop, cmd: UserCommands) -> BackdropResult<()> {
    match cmd {
        UserCommands::Add {
            path,
            media_type,
            name,
            preview,
            replace,
        } => {
            let payload = read_file(&path).await?;
            let preview = match &preview {
                Some(path) => Some(read_file(path).await?),
                None => None,
            };
            let id = backdrop
                .save_user_asset(
                    &payload,
                    media_type,
                    name,
                    preview.as_deref(),
                    replace.as_deref(),
                )
                .await?;
            println!("{}", id);
            Ok(())
        }

        UserCommands::List { format } => {
            let assets = backdrop.list_user_assets().await;
            match format {
                OutputFormat::Json => {
                    let value = serde_json::to_value(&assets).map_err(|e| {
                        StorageError::new(StorageErrorKind::Serialization(e.to_string()))
                    })?;
                    print_json(&value)
                }
                OutputFormat::Human => {
                    for asset in &assets {
                        println!(
                            "{:<36} {:<6} {:>10} bytes  {}",
                            asset.id,
                            asset.media_type,
                            asset.size,
                            asset.name.as_deref().unwrap_or("")
                        );
                    }
                    println!("Total: {} assets", assets.len());
                    Ok(())
                }
            }
        }

        UserCommands::Remove { id } => {
            backdrop.delete_user_asset(&id).await?;
            println!("Removed {}", id);
            Ok(())
        }
    }
}

async fn read_file(path: &Path) -> BackdropResult<Vec<u8>> {
    Ok(tokio::fs::read(path).await.map_err(|e| {
        StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", path.display(), e)))
    })?)
}
