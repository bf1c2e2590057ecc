use axum::{
    Extension, Json,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    server::AppState,
    spotify::auth::AuthorizeUrlBuilder,
    types::{ConfigStatus, GrantRequest, SessionAuth},
    utils,
};

pub const SESSION_COOKIE: &str = "songshop_sid";

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Reads the session id from the `Cookie` header(s).
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}

fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

/// Starts the authorization-code flow: binds a fresh state to the caller's
/// session and redirects to the authorize endpoint.
pub async fn login(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    let settings = state.settings();
    if !settings.is_configured() {
        tracing::warn!("login requested but spotify credentials are not configured");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Spotify credentials are not configured",
        )
            .into_response();
    }

    // ids the store never handed out are not adopted
    let known = match session_id(&headers) {
        Some(sid) => state.sessions.contains(&sid).await.then_some(sid),
        None => None,
    };
    let session_id = known.unwrap_or_else(utils::generate_session_id);
    let oauth_state = state.guard.issue(&session_id).await;

    let authorize_url = match AuthorizeUrlBuilder::new(&state.endpoints.authorize_url).build(
        &settings.credentials.client_id,
        &settings.redirect_uri,
        &oauth_state.value,
        &settings.scope,
    ) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "cannot start login");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to start login").into_response();
        }
    };

    tracing::info!(redirect_uri = %settings.redirect_uri, "redirecting to spotify authorize endpoint");
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, authorize_url),
            (header::SET_COOKIE, session_cookie(&session_id)),
        ],
    )
        .into_response()
}

/// Redirect target after the user answered the consent screen.
///
/// Always ends in a redirect to `/`. A state mismatch skips the exchange
/// entirely; exchange failures are logged and not shown to the browser. A
/// successful exchange moves the token to a newly generated session id, drops
/// the old session and sets the new cookie.
pub async fn callback(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(session_id) = session_id(&headers) else {
        tracing::warn!("oauth callback without a session cookie");
        return redirect_home();
    };

    let received = params.state.as_deref().unwrap_or_default();
    if let Err(e) = state.guard.check(&session_id, received).await {
        tracing::warn!(error = %e, "rejecting oauth callback");
        return redirect_home();
    }

    if let Some(error) = params.error {
        tracing::warn!(%error, "authorization was not granted");
        return redirect_home();
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        tracing::warn!("oauth callback without an authorization code");
        return redirect_home();
    };

    let settings = state.settings();
    let grant = GrantRequest::AuthorizationCode {
        code,
        redirect_uri: settings.redirect_uri.clone(),
    };

    let (cancel, _deadline) = state.cancellation();
    match state
        .tokens
        .request_token(&settings.credentials, &grant, &cancel)
        .await
    {
        Ok(token) => {
            state.sessions.remove(&session_id).await;

            let mut auth = SessionAuth {
                session_id: utils::generate_session_id(),
                access_token: None,
            };
            auth.store_token(state.sessions.as_ref(), token.access_token)
                .await;
            tracing::info!("authorization code exchanged");

            (
                StatusCode::FOUND,
                [
                    (header::LOCATION, "/".to_string()),
                    (header::SET_COOKIE, session_cookie(&auth.session_id)),
                ],
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "authorization code exchange failed");
            redirect_home()
        }
    }
}

/// Profile of the logged-in user, passed through from the Web API.
pub async fn me(Extension(state): Extension<AppState>, headers: HeaderMap) -> Response {
    let token = match session_id(&headers) {
        Some(sid) => SessionAuth::load(state.sessions.as_ref(), &sid).await.access_token,
        None => None,
    };
    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "").into_response();
    };

    let (cancel, _deadline) = state.cancellation();
    match state.catalogue.fetch_profile(&token, &cancel).await {
        Ok(profile) => {
            let status = StatusCode::from_u16(profile.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                profile.body,
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "profile request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "").into_response()
        }
    }
}

/// Whether client credentials are configured. Never includes the secret.
pub async fn status(Extension(state): Extension<AppState>) -> Json<ConfigStatus> {
    let settings = state.settings();
    Json(ConfigStatus {
        configured: settings.is_configured(),
        redirect_uri: settings.redirect_uri,
    })
}
