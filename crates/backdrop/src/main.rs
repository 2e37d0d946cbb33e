//! Backdrop CLI binary.
//!
//! This binary operates the wallpaper cache from a shell:
//! - Sync the cache against the remote manifest
//! - Inspect cached records and preview the rotation policy
//! - Repair failed downloads and manage user wallpapers

use backdrop::{Backdrop, BackdropConfig, init_telemetry};
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        ChooseOptions, Cli, Commands, choose, fetch_full, handle_user_command, list_keys, repair,
        run_sync, show_status,
    };

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BackdropConfig::from_file(path)?,
        None => BackdropConfig::load()?,
    };

    init_telemetry(cli.verbose, config.json_logs)?;

    let backdrop = Backdrop::open(&config).await?;

    // Execute the requested command
    match cli.command {
        Commands::Sync { format } => run_sync(&backdrop, format).await?,

        Commands::Status { format } => show_status(&backdrop, format).await?,

        Commands::Choose {
            mode,
            source,
            media_type,
            last,
            pin,
            exclude,
            resolve,
        } => {
            let options = ChooseOptions {
                mode,
                source,
                media_type,
                last,
                pin,
                exclude,
                resolve,
            };
            choose(&backdrop, options).await?;
        }

        Commands::Repair { concurrency } => repair(&backdrop, concurrency).await?,

        Commands::FetchFull { id } => fetch_full(&backdrop, &id).await?,

        Commands::Keys { full } => list_keys(&backdrop, full).await?,

        Commands::User(user_cmd) => handle_user_command(&backdrop, user_cmd).await?,
    }

    Ok(())
}
