use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

use crate::config;

#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        config::is_configured(&self.client_id, &self.client_secret)
    }
}

// never print the secret
impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// The grant presented to the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantRequest {
    ClientCredentials,
    AuthorizationCode { code: String, redirect_uri: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub raw_body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub value: String,
    pub bound_session_id: String,
    pub issued_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionAuth {
    pub session_id: String,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub external_id: String,
    pub title: String,
    pub artist_ref: i64,
    pub genre_ref: i64,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub id: String,
    pub title: String,
    pub genre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub records: Vec<TrackRecord>,
    pub warnings: Vec<String>,
}

impl FetchOutcome {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub inserted: usize,
    pub failures: Vec<String>,
}

/// Search response from `GET /search?type=track`. Items stay untyped so a
/// single malformed entry cannot fail the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    pub items: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub configured: bool,
    #[serde(rename = "redirectUri")]
    pub redirect_uri: String,
}
