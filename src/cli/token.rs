use std::{sync::Arc, time::Duration};

use crate::{
    config, error,
    spotify::auth::TokenClient,
    success,
    transport::{ReqwestTransport, optional_deadline},
    types::GrantRequest,
};

/// Requests an app token with the client-credentials grant and prints it.
pub async fn token(timeout: Option<u64>) {
    let creds = config::client_credentials();
    let endpoints = config::SpotifyEndpoints::from_env();
    let client = TokenClient::new(Arc::new(ReqwestTransport::new()), &endpoints.token_url);

    let pb = super::spinner("Requesting access token...");
    let (cancel, _deadline) = optional_deadline(timeout.map(Duration::from_secs));
    let result = client
        .request_token(&creds, &GrantRequest::ClientCredentials, &cancel)
        .await;
    pb.finish_and_clear();

    match result {
        Ok(token) => {
            success!("Access token obtained");
            println!("{}", token.access_token);
        }
        Err(e) if e.is_cancelled() => error!("Token request timed out"),
        Err(e) => error!("Failed to obtain access token: {}", e),
    }
}
