//! spotwiz: a Spotify playlist wizard for the command line
//!
//! This library explores Spotify's related-artist graph from a seed artist,
//! collects the most popular tracks of the artists it reaches and turns them
//! into playlists. It includes modules for API communication, CLI operations,
//! configuration management and the traversal itself.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types of the client, the explorer and playlist actions
//! - `explorer` - Related-artist traversal, enrichment and filtering
//! - `management` - Token and playlist management
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spotwiz::{explorer::{Explorer, ExploreOptions}, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     spotwiz::config::load_env().await?;
//!     let client = Arc::new(SpotifyClient::from_config().await?);
//!     let seed = spotwiz::spotify::SpotifyApi::artist(client.as_ref(), "4Z8W4fKeB5YxbusRsdQVPb").await?;
//!     let exploration = Explorer::new(client, ExploreOptions::default()).explore(&seed).await?;
//!     println!("{} tracks", exploration.tracks.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod explorer;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints a line prefixed with a blue `o`.
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a green check mark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a line prefixed with a red `!` to stderr and exits with status 1.
///
/// Evaluates to `!`, so it can end a `match` arm that must produce a value.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a line prefixed with a yellow `!`.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
