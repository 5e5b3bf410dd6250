use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config,
    error::ConfigError,
    error,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{PkceToken, Token},
    utils, warning,
};

/// Runs the PKCE login: serves the callback locally, sends the user to
/// Spotify's consent page and stores the token the callback receives.
///
/// `shared_state` carries the code verifier to the callback handler and the
/// token back. Gives up after 60 seconds.
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match authorize_url(&code_challenge) {
        Ok(url) => url,
        Err(e) => error!("Cannot build authorization url: {}", e),
    };

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    *shared_state.lock().await = Some(PkceToken {
        code_verifier,
        token: None,
    });

    if let Err(e) = webbrowser::open(&auth_url) {
        log::debug!("browser launch failed: {}", e);
        warning!("Open this URL to log in with Spotify:\n{}", auth_url);
    }

    match wait_for_token(shared_state).await {
        Some(token) => {
            if let Err(e) = TokenManager::new(token).persist().await {
                error!("Cannot store the token: {}", e);
            }
            success!("Logged in with Spotify");
        }
        None => error!("No token received within 60 seconds"),
    }
}

/// Builds the Spotify authorization URL for the given PKCE challenge.
pub fn authorize_url(code_challenge: &str) -> Result<String, ConfigError> {
    Ok(format!(
        "{spotify_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        spotify_auth_url = config::spotify_apiauth_url()?,
        client_id = config::spotify_client_id()?,
        redirect_uri = config::spotify_redirect_uri()?,
        code_challenge = code_challenge,
        scope = config::spotify_scope()?.replace(' ', "%20"),
    ))
}

/// Waits up to 60 seconds for the callback handler to store a token.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    for _ in 0..60 {
        let token = shared_state
            .lock()
            .await
            .as_ref()
            .and_then(|pkce| pkce.token.clone());
        if token.is_some() {
            return token;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Refreshes an expired access token using a refresh token.
///
/// Spotify may or may not rotate the refresh token; when the response carries
/// none, the old one is kept.
pub async fn refresh_token(refresh_token: &str) -> Result<Token, String> {
    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url().map_err(|e| e.to_string())?)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            (
                "client_id",
                &config::spotify_client_id().map_err(|e| e.to_string())?,
            ),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;
    let mut token = token_from_json(&json)?;
    if token.refresh_token.is_empty() {
        token.refresh_token = refresh_token.to_string();
    }
    Ok(token)
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// The code verifier proves that the client completing the flow is the one
/// that started it. It must match the challenge sent in the initial request.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, String> {
    let client_id = config::spotify_client_id().map_err(|e| e.to_string())?;
    let redirect_uri = config::spotify_redirect_uri().map_err(|e| e.to_string())?;

    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url().map_err(|e| e.to_string())?)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;
    token_from_json(&json)
}

/// Builds a [`Token`] from a token endpoint response, stamped with the current time.
pub fn token_from_json(json: &Value) -> Result<Token, String> {
    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| "token response has no access_token".to_string())?;

    Ok(Token {
        access_token: access_token.to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_u64().unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
