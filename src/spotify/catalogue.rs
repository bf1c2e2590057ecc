use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    error::SpotifyError,
    transport::{HttpRequest, HttpResponse, Transport, send_cancellable},
    types::{FetchOutcome, SearchResponse, TrackRecord},
    utils,
};

/// Number of tracks requested per genre search.
pub const SEARCH_LIMIT: u32 = 10;

/// Supplies the artist and genre references stored alongside a track.
pub trait ReferenceMapper: Send + Sync {
    fn artist_ref(&self, artist_id: Option<&str>) -> i64;
    fn genre_ref(&self, genre: &str) -> i64;
}

/// Zero for everything, for schemas without artist or genre tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderReferences;

impl ReferenceMapper for PlaceholderReferences {
    fn artist_ref(&self, _artist_id: Option<&str>) -> i64 {
        0
    }

    fn genre_ref(&self, _genre: &str) -> i64 {
        0
    }
}

/// Reads catalogue data from the Web API with an already obtained token.
#[derive(Clone)]
pub struct CatalogueFetcher {
    transport: Arc<dyn Transport>,
    api_url: String,
    references: Arc<dyn ReferenceMapper>,
}

impl CatalogueFetcher {
    pub fn new(transport: Arc<dyn Transport>, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            references: Arc::new(PlaceholderReferences),
        }
    }

    pub fn with_reference_mapper(mut self, references: Arc<dyn ReferenceMapper>) -> Self {
        self.references = references;
        self
    }

    /// Searches tracks for `genre` and maps them to storable records.
    ///
    /// Items without an `id` are skipped and reported in
    /// [`FetchOutcome::warnings`]; a missing `name` becomes an empty title. A
    /// response without a track list yields an empty outcome.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::CatalogueQuery`] for a non-2xx status; no partial results
    /// - [`SpotifyError::MalformedResponse`] if a 2xx body is not JSON
    /// - [`SpotifyError::Transport`] on network failure or cancellation
    pub async fn fetch_by_genre(
        &self,
        token: &str,
        genre: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchOutcome, SpotifyError> {
        let url = format!(
            "{api}/search?q={q}&type=track&limit={limit}",
            api = self.api_url,
            q = utils::encode(genre),
            limit = SEARCH_LIMIT
        );
        let request = HttpRequest::get(url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/json");

        let response = send_cancellable(self.transport.as_ref(), request, cancel).await?;
        if !response.is_success() {
            return Err(SpotifyError::CatalogueQuery {
                status: response.status,
                body: response.body,
            });
        }

        let search: SearchResponse = match serde_json::from_str(&response.body) {
            Ok(search) => search,
            Err(_) => {
                return Err(SpotifyError::MalformedResponse {
                    body: response.body,
                });
            }
        };

        let items = search
            .tracks
            .and_then(|page| page.items)
            .unwrap_or_default();

        let genre_ref = self.references.genre_ref(genre);
        let mut outcome = FetchOutcome::default();
        for (index, item) in items.iter().enumerate() {
            match self.map_item(item, genre_ref) {
                Some(record) => outcome.records.push(record),
                None => {
                    let warning = format!("skipped search result {index} for '{genre}': missing id");
                    tracing::warn!("{}", warning);
                    outcome.warnings.push(warning);
                }
            }
        }

        tracing::info!(
            genre,
            records = outcome.records.len(),
            skipped = outcome.warning_count(),
            "catalogue search finished"
        );
        Ok(outcome)
    }

    fn map_item(&self, item: &Value, genre_ref: i64) -> Option<TrackRecord> {
        let external_id = item.get("id").and_then(Value::as_str)?;
        let title = item.get("name").and_then(Value::as_str).unwrap_or_default();
        let artist_id = item.pointer("/artists/0/id").and_then(Value::as_str);

        Some(TrackRecord {
            external_id: external_id.to_string(),
            title: title.to_string(),
            artist_ref: self.references.artist_ref(artist_id),
            genre_ref,
        })
    }

    /// `GET /me` for the owner of `token`. Status and body are returned as
    /// received, whatever the status.
    pub async fn fetch_profile(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<HttpResponse, SpotifyError> {
        let request = HttpRequest::get(format!("{}/me", self.api_url))
            .header("Authorization", format!("Bearer {token}"));

        Ok(send_cancellable(self.transport.as_ref(), request, cancel).await?)
    }
}
