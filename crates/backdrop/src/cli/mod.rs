//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the backdrop binary.

mod cache;
mod choose;
mod commands;
mod output;
mod user;

pub use cache::{fetch_full, list_keys, repair, run_sync, show_status};
pub use choose::{ChooseOptions, choose};
pub use commands::{Cli, Commands};
pub use user::handle_user_command;
