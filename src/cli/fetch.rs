use std::{path::PathBuf, sync::Arc, time::Duration};

use tabled::Table;

use crate::{
    config, error,
    management::{SqliteTrackStore, persist_all},
    spotify::{auth::TokenClient, catalogue::CatalogueFetcher},
    success,
    transport::{ReqwestTransport, Transport, optional_deadline},
    types::{GrantRequest, TrackTableRow},
    utils, warning,
};

/// Imports search results for each genre into the track database.
///
/// Uses an app token from the client-credentials grant. When `genres` is
/// empty every genre in [`utils::KNOWN_GENRES`] is imported. A failing genre
/// or a rejected insert is reported and the import carries on.
pub async fn fetch(genres: Vec<String>, database: Option<PathBuf>, timeout: Option<u64>) {
    let creds = config::client_credentials();
    if !creds.is_configured() {
        error!(
            "Spotify credentials are not configured. Set {} and {}.",
            config::CLIENT_ID_VAR,
            config::CLIENT_SECRET_VAR
        );
    }

    let genres: Vec<String> = if genres.is_empty() {
        utils::KNOWN_GENRES.iter().map(|g| g.to_string()).collect()
    } else {
        genres
    };
    let timeout = timeout.map(Duration::from_secs);

    let endpoints = config::SpotifyEndpoints::from_env();
    let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new());
    let tokens = TokenClient::new(Arc::clone(&transport), &endpoints.token_url);
    let catalogue = CatalogueFetcher::new(transport, &endpoints.api_url);

    let path = database.unwrap_or_else(config::database_path);
    let store = match SqliteTrackStore::open(&path) {
        Ok(store) => store,
        Err(e) => error!("Cannot open database {}. Err: {}", path.display(), e),
    };

    let pb = super::spinner("Requesting access token...");
    let token = {
        let (cancel, _deadline) = optional_deadline(timeout);
        tokens
            .request_token(&creds, &GrantRequest::ClientCredentials, &cancel)
            .await
    };
    let token = match token {
        Ok(token) => token,
        Err(e) => {
            pb.finish_and_clear();
            error!("Failed to obtain access token: {}", e);
        }
    };

    let mut rows: Vec<TrackTableRow> = Vec::new();
    let mut fetched = 0;
    let mut inserted = 0;

    for genre in &genres {
        pb.set_message(format!("Searching {}...", genre));

        let result = {
            let (cancel, _deadline) = optional_deadline(timeout);
            catalogue
                .fetch_by_genre(&token.access_token, genre, &cancel)
                .await
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                pb.suspend(|| warning!("Search for {} timed out", genre));
                continue;
            }
            Err(e) => {
                pb.suspend(|| warning!("Skipping {}. Err: {}", genre, e));
                continue;
            }
        };

        let report = persist_all(&outcome.records, &store);
        pb.suspend(|| {
            for w in outcome.warnings.iter().chain(report.failures.iter()) {
                warning!("{}", w);
            }
        });

        fetched += outcome.records.len();
        inserted += report.inserted;
        rows.extend(outcome.records.into_iter().map(|r| TrackTableRow {
            id: r.external_id,
            title: r.title,
            genre: genre.clone(),
        }));
    }

    pb.finish_and_clear();

    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }
    success!(
        "Inserted {} of {} tracks into {}",
        inserted,
        fetched,
        path.display()
    );
}
