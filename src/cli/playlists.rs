use tabled::Table;

use crate::{
    cli::{connect, spinner},
    error, info,
    management::PlaylistManager,
    types::PlaylistTableRow,
    warning,
};

pub async fn list_playlists(search: Option<String>) {
    let client = connect().await;

    let pb = spinner("Fetching playlists...");
    let result = PlaylistManager::load(&client).await;
    pb.finish_and_clear();

    let manager = match result {
        Ok(manager) => manager,
        Err(e) => error!("Failed to fetch playlists: {}", e),
    };

    let term = search.unwrap_or_default();
    let playlists = manager.filter(&term);

    if playlists.is_empty() {
        warning!("No playlists match \"{}\"", term);
    } else {
        let rows = playlists.iter().map(|p| PlaylistTableRow {
            name: p.name.clone(),
            owner: p
                .owner
                .as_ref()
                .and_then(|o| o.display_name.clone().or_else(|| Some(o.id.clone())))
                .unwrap_or_default(),
            id: p.id.clone(),
        });
        println!("{}", Table::new(rows));
    }

    if manager.may_create(&term) {
        info!(
            "No playlist is named \"{}\" yet; `spotwiz wizard --playlist \"{}\"` will create it",
            term, term
        );
    }
}
