use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{info, spotify, types::PkceToken};

/// Logs in with Spotify; the token lands in the local data directory.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    info!("Opening Spotify authorization in your browser...");
    spotify::auth::auth(shared_state).await;
}
