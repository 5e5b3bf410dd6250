use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotwiz::{
    cli, config, error,
    explorer::{ExploreOptions, TrackFilter},
    types::PkceToken,
};
use tokio::sync::Mutex;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Search artists by name
    Search(SearchOptions),

    /// List your playlists
    Playlists(PlaylistsOptions),

    /// Build a track list from artists related to a seed artist
    Wizard(WizardOptions),

    /// List a playlist's tracks by tempo
    PlaylistTracks(TracksOptions),

    /// List the tracks on an artist's albums by tempo
    ArtistTracks(TracksOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Artist name to search for
    query: String,

    /// Maximum number of results (1-50)
    #[clap(long, default_value_t = 10)]
    limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Only show playlists whose name contains this term
    #[clap(long)]
    search: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum SortArg {
    Popularity,
    Tempo,
}

#[derive(Parser, Debug, Clone)]
pub struct WizardOptions {
    /// Spotify id of the seed artist
    #[clap(conflicts_with = "search", required_unless_present = "search")]
    artist_id: Option<String>,

    /// Use the best search match as seed artist
    #[clap(long)]
    search: Option<String>,

    /// How many levels of related artists to follow
    #[clap(long)]
    depth: Option<usize>,

    /// Related artists chosen per level
    #[clap(long)]
    artists: Option<usize>,

    /// Top tracks taken per artist
    #[clap(long)]
    tracks: Option<usize>,

    /// Market for top-track lookups (ISO 3166-1 alpha-2)
    #[clap(long)]
    market: Option<String>,

    /// Fetch audio features and show tempo
    #[clap(long)]
    features: bool,

    /// Lowest accepted tempo; half and double time count
    #[clap(long)]
    min_bpm: Option<f64>,

    /// Highest accepted tempo; half and double time count
    #[clap(long)]
    max_bpm: Option<f64>,

    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    min_popularity: Option<u32>,

    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    max_popularity: Option<u32>,

    /// Result order
    #[clap(long, value_enum, default_value = "popularity")]
    sort: SortArg,

    /// Add the result to this playlist, creating it when needed
    #[clap(long)]
    playlist: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TracksOptions {
    /// Spotify id of the playlist or artist
    id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn wizard_request(opt: WizardOptions) -> Result<cli::WizardRequest, spotwiz::error::ConfigError> {
    let options = ExploreOptions {
        max_depth: opt.depth.map_or_else(config::wizard_max_depth, Ok)?,
        max_artists_per_level: opt.artists.map_or_else(config::wizard_max_artists, Ok)?,
        max_tracks_per_artist: opt.tracks.map_or_else(config::wizard_max_tracks, Ok)?,
        market: opt.market.unwrap_or_else(config::spotify_market),
    };

    let filter = TrackFilter {
        popularity: cli::optional_range(opt.min_popularity, opt.max_popularity, 0, 100),
        bpm: cli::optional_range(opt.min_bpm, opt.max_bpm, 0.0, f64::MAX),
    };

    Ok(cli::WizardRequest {
        artist_id: opt.artist_id,
        search: opt.search,
        options,
        features: opt.features,
        filter,
        sort: match opt.sort {
            SortArg::Popularity => cli::SortOrder::Popularity,
            SortArg::Tempo => cli::SortOrder::Tempo,
        },
        playlist: opt.playlist,
    })
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let oauth_result: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&oauth_result)).await;
        }
        Command::Search(opt) => cli::search_artists(opt.query, opt.limit).await,
        Command::Playlists(opt) => cli::list_playlists(opt.search).await,
        Command::Wizard(opt) => match wizard_request(opt) {
            Ok(request) => cli::wizard(request).await,
            Err(e) => error!("{}", e),
        },
        Command::PlaylistTracks(opt) => cli::playlist_tracks(opt.id).await,
        Command::ArtistTracks(opt) => cli::artist_tracks(opt.id).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
