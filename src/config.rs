//! Configuration management for the SongShop service.
//!
//! Values come from environment variables, optionally seeded from a `.env` file
//! in the local data directory. Every accessor resolves at call time instead of
//! caching, so a changed environment is visible to the next request.
//!
//! Resolution order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults, which for the client credentials are placeholders
//!    that [`is_configured`] rejects

use std::{env, path::PathBuf};

use crate::types::ClientCredentials;

pub const CLIENT_ID_VAR: &str = "SPOTIFY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "SPOTIFY_CLIENT_SECRET";
pub const REDIRECT_URI_VAR: &str = "SPOTIFY_REDIRECT_URI";
pub const SCOPE_VAR: &str = "SPOTIFY_API_AUTH_SCOPE";
pub const AUTHORIZE_URL_VAR: &str = "SPOTIFY_API_AUTH_URL";
pub const TOKEN_URL_VAR: &str = "SPOTIFY_API_TOKEN_URL";
pub const API_URL_VAR: &str = "SPOTIFY_API_URL";
pub const SERVER_ADDRESS_VAR: &str = "SERVER_ADDRESS";
pub const DATABASE_VAR: &str = "SONGSHOP_DATABASE";

/// Placeholder used when no client id is configured.
pub const PLACEHOLDER_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
/// Placeholder used when no client secret is configured.
pub const PLACEHOLDER_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/api/login/callback";
pub const DEFAULT_SCOPE: &str = "user-read-private user-read-email";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";

pub const SPOTIFY_AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `songshop/.env` in the platform data directory:
/// - Linux: `~/.local/share/songshop/.env`
/// - macOS: `~/Library/Application Support/songshop/.env`
/// - Windows: `%LOCALAPPDATA%/songshop/.env`
///
/// The directory is created when missing. A missing `.env` file is fine since
/// everything can also come from the process environment; variables already set
/// in the environment are never overridden.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Reads `name` from the environment, falling back to `fallback` when the
/// variable is unset or empty.
///
/// # Example
///
/// ```
/// let id = resolve("SPOTIFY_CLIENT_ID", PLACEHOLDER_CLIENT_ID);
/// ```
pub fn resolve(name: &str, fallback: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.is_empty() => value,
        _ => fallback.to_string(),
    }
}

/// True iff neither value is empty nor one of the placeholder defaults.
pub fn is_configured(client_id: &str, client_secret: &str) -> bool {
    !client_id.is_empty()
        && !client_secret.is_empty()
        && client_id != PLACEHOLDER_CLIENT_ID
        && client_secret != PLACEHOLDER_CLIENT_SECRET
}

pub fn client_credentials() -> ClientCredentials {
    ClientCredentials::new(
        resolve(CLIENT_ID_VAR, PLACEHOLDER_CLIENT_ID),
        resolve(CLIENT_SECRET_VAR, PLACEHOLDER_CLIENT_SECRET),
    )
}

/// Returns the OAuth redirect URI. It must match one registered for the
/// Spotify application, e.g. `http://localhost:8080/api/login/callback`.
pub fn redirect_uri() -> String {
    resolve(REDIRECT_URI_VAR, DEFAULT_REDIRECT_URI)
}

pub fn scope() -> String {
    resolve(SCOPE_VAR, DEFAULT_SCOPE)
}

/// Returns the address the HTTP server binds to, e.g. `127.0.0.1:8080`.
pub fn server_addr() -> String {
    resolve(SERVER_ADDRESS_VAR, DEFAULT_SERVER_ADDRESS)
}

/// Returns the SQLite database path, `songshop/songshop.db` in the local data
/// directory unless `SONGSHOP_DATABASE` points elsewhere.
pub fn database_path() -> PathBuf {
    match env::var(DATABASE_VAR) {
        Ok(value) if !value.is_empty() => PathBuf::from(value),
        _ => data_dir().join("songshop.db"),
    }
}

fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songshop");
    path
}

/// Everything the authorization-code flow needs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub credentials: ClientCredentials,
    pub redirect_uri: String,
    pub scope: String,
}

impl OAuthSettings {
    pub fn from_env() -> Self {
        Self {
            credentials: client_credentials(),
            redirect_uri: redirect_uri(),
            scope: scope(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_configured()
    }
}

/// Authorization server and Web API locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: SPOTIFY_AUTHORIZE_URL.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            api_url: SPOTIFY_API_URL.to_string(),
        }
    }
}

impl SpotifyEndpoints {
    /// Endpoints with the `SPOTIFY_API_*_URL` overrides applied.
    pub fn from_env() -> Self {
        Self {
            authorize_url: resolve(AUTHORIZE_URL_VAR, SPOTIFY_AUTHORIZE_URL),
            token_url: resolve(TOKEN_URL_VAR, SPOTIFY_TOKEN_URL),
            api_url: resolve(API_URL_VAR, SPOTIFY_API_URL),
        }
    }

    /// All three endpoints rooted at one base URL. Used against mock servers.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorize_url: format!("{base}/authorize"),
            token_url: format!("{base}/api/token"),
            api_url: format!("{base}/v1"),
        }
    }
}
