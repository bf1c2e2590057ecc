#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use songshop::{
    error::TransportError,
    transport::{HttpRequest, HttpResponse, Transport},
};

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_responses(responses: Vec<(u16, &str)>) -> Arc<Self> {
        let fake = Self::default();
        for (status, body) in responses {
            fake.push(status, body);
        }
        Arc::new(fake)
    }

    pub fn push(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn push_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no response queued".to_string())))
    }
}

/// Never answers.
#[derive(Default)]
pub struct PendingTransport;

#[async_trait]
impl Transport for PendingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        std::future::pending().await
    }
}

pub const SEARCH_THREE_ONE_WITHOUT_ID: &str = r#"{
  "tracks": {
    "href": "https://api.spotify.com/v1/search?query=pop",
    "items": [
      {"id": "t1", "name": "First", "artists": [{"id": "a1", "name": "One"}]},
      {"name": "No Id", "artists": []},
      {"id": "t3", "name": "Third"}
    ],
    "limit": 10,
    "total": 3
  }
}"#;
