//! # API Module
//!
//! HTTP endpoints of the SongShop login service.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /api/login`. Issues an anti-CSRF state bound to the
//!   caller's session cookie and redirects to Spotify's authorize page.
//! - [`callback`] - `GET /api/login/callback`. Verifies the returned state,
//!   exchanges the authorization code and stores the access token in the
//!   session. Always redirects back to `/`.
//! - [`me`] - `GET /api/login/me`. The logged-in user's Spotify profile,
//!   status and body passed through, or 401 without a stored token.
//! - [`status`] - `GET /api/login/status`. `{"configured":bool,"redirectUri":string}`
//!   so the frontend can explain missing setup. Secrets are never included.
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`. Service name and version.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use songshop::api::{callback, health, login};
//!
//! let app = Router::new()
//!     .route("/api/login", get(login))
//!     .route("/api/login/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod health;
mod login;

pub use health::health;
pub use login::CallbackParams;
pub use login::SESSION_COOKIE;
pub use login::callback;
pub use login::login;
pub use login::me;
pub use login::session_id;
pub use login::status;
