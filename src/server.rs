use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{
    Res, api,
    config::{OAuthSettings, SpotifyEndpoints},
    management::{SessionStore, StateGuard},
    spotify::{auth::TokenClient, catalogue::CatalogueFetcher},
    transport::{self, Transport},
};

/// Where request handlers get their OAuth settings from.
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// Resolve from the environment on every request.
    Env,
    Fixed(OAuthSettings),
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: SettingsSource,
    pub endpoints: SpotifyEndpoints,
    pub tokens: TokenClient,
    pub catalogue: CatalogueFetcher,
    pub sessions: Arc<dyn SessionStore>,
    pub guard: StateGuard,
    pub request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(
        settings: SettingsSource,
        endpoints: SpotifyEndpoints,
        transport: Arc<dyn Transport>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            tokens: TokenClient::new(Arc::clone(&transport), &endpoints.token_url),
            catalogue: CatalogueFetcher::new(transport, &endpoints.api_url),
            guard: StateGuard::new(Arc::clone(&sessions)),
            settings,
            endpoints,
            sessions,
            request_timeout: None,
        }
    }

    /// Bounds every outbound call made by a handler.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn settings(&self) -> OAuthSettings {
        match &self.settings {
            SettingsSource::Env => OAuthSettings::from_env(),
            SettingsSource::Fixed(settings) => settings.clone(),
        }
    }

    /// Cancellation token for one outbound call; keep the guard alive until
    /// the call returns.
    pub fn cancellation(&self) -> (CancellationToken, Option<DropGuard>) {
        transport::optional_deadline(self.request_timeout)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/login", get(api::login))
        .route("/api/login/callback", get(api::callback))
        .route("/api/login/me", get(api::me))
        .route("/api/login/status", get(api::status))
        .layer(Extension(state))
}

pub async fn start_api_server(state: AppState, addr: &str) -> Res<()> {
    let addr = SocketAddr::from_str(addr)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
