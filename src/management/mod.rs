mod auth;
mod playlist;

pub use auth::TokenManager;
pub use playlist::NEW_PLAYLIST_DESCRIPTION;
pub use playlist::PlaylistManager;
