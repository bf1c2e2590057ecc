mod session;
mod state;
mod tracks;

pub use session::ACCESS_TOKEN_FIELD;
pub use session::MemorySessionStore;
pub use session::SessionStore;
pub use state::DEFAULT_STATE_MAX_AGE;
pub use state::OAUTH_STATE_FIELD;
pub use state::StateGuard;
pub use tracks::SqliteTrackStore;
pub use tracks::TrackSink;
pub use tracks::persist_all;
