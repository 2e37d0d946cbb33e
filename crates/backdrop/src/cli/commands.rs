//! CLI command definitions.

use backdrop::{CollectionSource, MediaType, SelectionMode};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Backdrop - offline wallpaper asset cache
#[derive(Parser, Debug)]
#[command(name = "backdrop")]
#[command(about = "Sync, inspect and repair the offline wallpaper cache", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Load configuration from this file only
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one sync pass against the remote manifest
    Sync {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Show the persisted manifest and cache contents
    Status {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Pick the wallpaper to present
    Choose {
        /// Rotation mode (random, sequence, specific)
        #[arg(long, default_value = "random")]
        mode: SelectionMode,

        /// Candidate collection (predefined, user)
        #[arg(long, default_value = "predefined")]
        source: CollectionSource,

        /// Media type (image, video)
        #[arg(long, default_value = "image")]
        media_type: MediaType,

        /// Asset shown last, for sequence mode
        #[arg(long)]
        last: Option<String>,

        /// Asset to show in specific mode
        #[arg(long)]
        pin: Option<String>,

        /// Asset to leave out
        #[arg(long)]
        exclude: Option<String>,

        /// Also load the payload, falling back as a host would
        #[arg(long)]
        resolve: bool,
    },

    /// Retry every preview that is not stored
    Repair {
        /// Number of parallel downloads
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Download the full payload of one manifest entry
    FetchFull {
        /// Asset id
        id: String,
    },

    /// List cache keys
    Keys {
        /// Only full-tier keys with a stored payload
        #[arg(long)]
        full: bool,
    },

    /// User wallpaper library
    #[command(subcommand)]
    User(UserCommands),
}

/// User library subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Add a wallpaper from a file
    Add {
        /// Payload file
        path: PathBuf,

        /// Media type (image, video)
        #[arg(long, default_value = "image")]
        media_type: MediaType,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Preview file
        #[arg(long)]
        preview: Option<PathBuf>,

        /// Overwrite this existing asset
        #[arg(long)]
        replace: Option<String>,
    },

    /// List user wallpapers
    List {
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Remove a user wallpaper
    Remove {
        /// Asset id
        id: String,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
