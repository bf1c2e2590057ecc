//! # Spotify Integration Module
//!
//! The protocol side of SongShop: the OAuth 2.0 token lifecycle and the
//! catalogue reads made with the resulting token.
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers / CLI
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (client-credentials and authorization-code grants)
//!     └── Catalogue (genre search, profile)
//!          ↓
//! Transport (reqwest in production, fakes in tests)
//!          ↓
//! Spotify Accounts service / Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] exchanges client credentials, or an authorization code received on
//! the callback, for an access token. Credentials go in a Basic authorization
//! header; the secret never reaches logs. [`auth::AuthorizeUrlBuilder`]
//! produces the browser redirect that starts the authorization-code flow.
//!
//! ## Catalogue
//!
//! [`catalogue`] searches tracks by genre and maps them to
//! [`TrackRecord`](crate::types::TrackRecord)s. Items the API returns without
//! an id are skipped with a warning instead of failing the page.
//!
//! ## Cancellation
//!
//! Every outbound call takes a `CancellationToken`. Nothing here applies a
//! timeout of its own; callers that need a bound use
//! [`transport::deadline`](crate::transport::deadline).

pub mod auth;
pub mod catalogue;
