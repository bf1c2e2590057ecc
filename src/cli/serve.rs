use std::{sync::Arc, time::Duration};

use crate::{
    config, error, info,
    management::MemorySessionStore,
    server::{AppState, SettingsSource, start_api_server},
    transport::ReqwestTransport,
    warning,
};

/// Runs the login service until it fails or the process is stopped.
///
/// Settings are resolved from the environment on every request. With `open`
/// the login page is launched in the default browser once the server task is
/// running.
pub async fn serve(open: bool, timeout: Option<u64>) {
    if !config::OAuthSettings::from_env().is_configured() {
        warning!("Spotify credentials are not configured; /api/login will refuse to start the flow");
    }

    let mut state = AppState::new(
        SettingsSource::Env,
        config::SpotifyEndpoints::from_env(),
        Arc::new(ReqwestTransport::new()),
        Arc::new(MemorySessionStore::new()),
    );
    if let Some(secs) = timeout {
        state = state.with_request_timeout(Duration::from_secs(secs));
    }

    let addr = config::server_addr();
    let bind_addr = addr.clone();
    let server = tokio::spawn(async move { start_api_server(state, &bind_addr).await });
    info!("Serving on http://{}", addr);

    if open {
        let login_url = format!("http://{addr}/api/login");
        if webbrowser::open(&login_url).is_err() {
            warning!(
                "Failed to open browser. Please navigate to the following URL manually:\n{}",
                login_url
            )
        }
    }

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Server stopped. Err: {}", e),
        Err(e) => error!("Server task failed. Err: {}", e),
    }
}
