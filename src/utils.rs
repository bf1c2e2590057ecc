use base64::{Engine, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};

/// Length of generated OAuth state values.
pub const STATE_TOKEN_LENGTH: usize = 43;
/// Length of generated session identifiers.
pub const SESSION_ID_LENGTH: usize = 32;

/// Genres the storefront has pages for.
pub const KNOWN_GENRES: [&str; 6] = ["pop", "rock", "hip-hop", "indie", "rnb", "classical"];

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Opaque anti-CSRF value drawn from the thread-local CSPRNG.
pub fn generate_state_token() -> String {
    random_alphanumeric(STATE_TOKEN_LENGTH)
}

pub fn generate_session_id() -> String {
    random_alphanumeric(SESSION_ID_LENGTH)
}

/// `Basic <base64(client_id:client_secret)>`
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let creds = format!("{client_id}:{client_secret}");
    format!("Basic {}", STANDARD.encode(creds.as_bytes()))
}

/// Byte equality whose running time depends only on the lengths.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Percent-encodes a query or form value. Everything except the RFC 3986
/// unreserved set is escaped, spaces become `%20`.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
