//! # CLI Module
//!
//! This module provides the command-line interface layer for spotwiz. It
//! implements all user-facing commands and coordinates between the Spotify
//! client, the explorer and playlist management.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the OAuth 2.0 PKCE flow and stores the token
//! - [`search_artists`] - Lists artists matching a query, ranked by popularity
//! - [`list_playlists`] - Lists the user's playlists in name order, optionally filtered
//! - [`playlist_tracks`] - Lists a playlist's tracks by tempo
//! - [`artist_tracks`] - Lists the tracks on an artist's albums by tempo
//! - [`wizard`] - Explores related artists from a seed and optionally writes
//!   the result to a playlist
//!
//! ## Error Presentation
//!
//! Commands report through the crate's output macros. Recoverable conditions
//! such as an empty result are printed as warnings; a failure that leaves
//! nothing useful to show ends the program through `error!` with a single
//! summarizing line.
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotwiz auth
//! spotwiz search "radiohead"
//! spotwiz playlist-tracks 37i9dQZF1DXcBWIGoYBM5M
//! spotwiz artist-tracks 4Z8W4fKeB5YxbusRsdQVPb
//! spotwiz wizard --search "radiohead" --depth 2 --artists 3 --tracks 3
//! spotwiz wizard 4Z8W4fKeB5YxbusRsdQVPb --features --min-bpm 140 --max-bpm 160 --sort tempo
//! spotwiz wizard --search "crumb" --playlist "Crumb Radio"
//! ```

mod auth;
mod playlists;
mod search;
mod tracks;
mod wizard;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{error, spotify::SpotifyClient};

pub use auth::auth;
pub use playlists::list_playlists;
pub use search::search_artists;
pub use tracks::{artist_tracks, playlist_tracks};
pub use wizard::{SortOrder, WizardRequest, optional_range, wizard};

/// Builds a client from the stored token, or exits asking the user to log in.
pub(crate) async fn connect() -> SpotifyClient {
    match SpotifyClient::from_config().await {
        Ok(client) => client,
        Err(e) => error!("Failed to load token. Please run spotwiz auth\n Error: {}", e),
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
