//! TMDB-backed metadata service
//!
//! Talks to the v3 JSON API with a bearer token:
//! - `GET /search/person?query=` for name search
//! - `GET /person/popular?page=` for the popularity listing
//! - `GET /discover/movie?with_cast=a,b` for titles crediting both people

use super::backend::{BackendError, BackendResult, MetadataBackend, Page, PersonRecord, WorkRecord};
use crate::chain::EntityId;
use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the TMDB API
pub struct TmdbBackend {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl TmdbBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("castchain/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> BackendResult<T> {
        let url = self.url(path);
        debug!(url = %url, "TMDB request");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MetadataBackend for TmdbBackend {
    async fn search_people(&self, query: &str) -> BackendResult<Page<PersonRecord>> {
        self.get("/search/person", &[("query", query.to_string())]).await
    }

    async fn popular_people(&self, page: u32) -> BackendResult<Page<PersonRecord>> {
        self.get("/person/popular", &[("page", page.to_string())]).await
    }

    async fn works_with_both(&self, a: EntityId, b: EntityId) -> BackendResult<Page<WorkRecord>> {
        self.get("/discover/movie", &[("with_cast", cast_filter(a, b))])
            .await
    }
}

/// TMDB reads a comma-separated cast list as "all of these"
fn cast_filter(a: EntityId, b: EntityId) -> String {
    format!("{},{}", a, b)
}

impl std::fmt::Debug for TmdbBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
