use std::sync::Arc;

use async_recursion::async_recursion;
use futures_util::future::{try_join_all, BoxFuture};
use hyper::{client::HttpConnector, header::LOCATION, Body, Client, Request};
use hyper_tls::HttpsConnector;
use thiserror::Error;

use crate::cache::{Clock, TtlCache};
use crate::normalize::normalize;
use crate::parsers::{json as json_parser, text as text_parser};
use crate::record::{ProxyRecord, RawRecord};
use crate::sources::{SourceDescriptor, SourceKind};
use crate::utils::http::{hyper_client, random_useragent};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetching {name} failed: status {status}")]
    Status { name: String, status: u16 },
    #[error("fetching {name} failed: {reason}")]
    Network { name: String, reason: String },
    #[error("{name} returned an unreadable body: {reason}")]
    Parse { name: String, reason: String },
}

/// Minimal retrieval seam so tests can fake the network. A served response
/// comes back as (status, body); the error string is a transport failure.
pub trait HttpClient: Send + Sync {
    fn get_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(u16, String), String>>;
}

/// Production client: hyper over TLS, crate-versioned User-Agent, one
/// redirect hop (enough for the raw-file hosts in use).
pub struct HyperClient {
    client: Client<HttpsConnector<HttpConnector>>,
}

impl HyperClient {
    pub fn new() -> Self {
        Self {
            client: hyper_client(),
        }
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperClient {
    fn get_text<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(u16, String), String>> {
        Box::pin(async move {
            let mut url = url.to_string();
            for _ in 0..2 {
                let request = Request::builder()
                    .uri(&url)
                    .header("User-Agent", random_useragent())
                    .body(Body::empty())
                    .map_err(|e| e.to_string())?;
                let response = self
                    .client
                    .request(request)
                    .await
                    .map_err(|e| e.to_string())?;

                if let Some(next) = redirect_target(&response) {
                    url = next;
                    continue;
                }

                let status = response.status().as_u16();
                let body = hyper::body::to_bytes(response.into_body())
                    .await
                    .map_err(|e| e.to_string())?;
                return Ok((status, String::from_utf8_lossy(&body).to_string()));
            }
            Err("too many redirects".to_string())
        })
    }
}

/// Follows Location only on an actual 3xx; some origins attach the header
/// to ordinary responses.
fn redirect_target<B>(response: &hyper::Response<B>) -> Option<String> {
    if !response.status().is_redirection() {
        return None;
    }
    response
        .headers()
        .get(LOCATION)?
        .to_str()
        .ok()
        .map(str::to_string)
}

/// Retrieves, parses and normalizes source records, memoizing leaf results
/// in the injected cache. Composite sources fan out to their members
/// concurrently; any member failure fails the whole call.
pub struct Fetcher<C> {
    client: C,
    cache: TtlCache,
    clock: Arc<dyn Clock>,
    sources: Vec<SourceDescriptor>,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(
        client: C,
        cache: TtlCache,
        clock: Arc<dyn Clock>,
        sources: Vec<SourceDescriptor>,
    ) -> Self {
        assert!(!sources.is_empty(), "at least one source must be configured");
        Self {
            client,
            cache,
            clock,
            sources,
        }
    }

    /// Unknown keys resolve to the first configured source.
    fn resolve(&self, key: &str) -> &SourceDescriptor {
        self.sources
            .iter()
            .find(|s| s.key == key)
            .unwrap_or(&self.sources[0])
    }

    #[async_recursion]
    pub async fn records(&self, key: &str) -> Result<Vec<ProxyRecord>, FetchError> {
        let source = self.resolve(key);
        match &source.kind {
            SourceKind::Multi { members } => {
                let parts = try_join_all(members.iter().map(|&m| self.records(m))).await?;
                let merged: Vec<RawRecord> =
                    parts.into_iter().flatten().map(RawRecord::from).collect();
                Ok(normalize(merged))
            }
            SourceKind::Text { url, format } => {
                if let Some(hit) = self.cache.get(source.key, self.clock.now()) {
                    log::debug!("cache hit for {}", source.key);
                    return Ok(hit);
                }
                let body = self.retrieve(source, url).await?;
                let records = normalize(text_parser::parse(&body, *format));
                self.store(source, records.clone());
                Ok(records)
            }
            SourceKind::Json { url } => {
                if let Some(hit) = self.cache.get(source.key, self.clock.now()) {
                    log::debug!("cache hit for {}", source.key);
                    return Ok(hit);
                }
                let body = self.retrieve(source, url).await?;
                let value: serde_json::Value =
                    serde_json::from_str(&body).map_err(|e| FetchError::Parse {
                        name: source.name.to_string(),
                        reason: e.to_string(),
                    })?;
                let records = normalize(json_parser::parse(&value));
                self.store(source, records.clone());
                Ok(records)
            }
        }
    }

    async fn retrieve(&self, source: &SourceDescriptor, url: &str) -> Result<String, FetchError> {
        let (status, body) =
            self.client
                .get_text(url)
                .await
                .map_err(|reason| FetchError::Network {
                    name: source.name.to_string(),
                    reason,
                })?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                name: source.name.to_string(),
                status,
            });
        }
        Ok(body)
    }

    fn store(&self, source: &SourceDescriptor, records: Vec<ProxyRecord>) {
        log::info!("{}: {} proxies", source.name, records.len());
        self.cache.put(source.key, records, self.clock.now());
    }
}
