use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::PayloadCache;
use crate::config::{Config, HTTP_TIMEOUT_SECS, RETRY_BACKOFF_MS, USER_AGENT};
use crate::error::{AppError, Result};
use crate::types::{Currency, Game};

/// Thin Skinport REST client. Knows the two endpoints the pipeline needs and
/// nothing about their contents beyond "a JSON array".
pub struct SkinportClient {
    http: reqwest::Client,
    base_url: String,
    cache: Option<PayloadCache>,
}

impl SkinportClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        let cache = cfg.cache_ttl_secs.map(|ttl| {
            let cache = PayloadCache::new(cfg.cache_dir(), Duration::from_secs(ttl));
            let purged = cache.purge_expired();
            if purged > 0 {
                info!("Purged {purged} expired cache entries");
            }
            cache
        });

        Ok(Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// `/items`: one entry per item with current listing prices.
    pub async fn fetch_items(&self, game: Game, currency: Currency) -> Result<Vec<Value>> {
        let app_id = game.app_id().to_string();
        self.get_cached(
            "items",
            &[("app_id", app_id.as_str()), ("currency", currency.code()), ("tradable", "0")],
        )
        .await
    }

    /// `/sales/history`: aggregated 24h/7d/30d/90d sales per item.
    pub async fn fetch_sales_history(&self, game: Game, currency: Currency) -> Result<Vec<Value>> {
        let app_id = game.app_id().to_string();
        self.get_cached(
            "sales/history",
            &[("app_id", app_id.as_str()), ("currency", currency.code())],
        )
        .await
    }

    async fn get_cached(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
        let key = cache_key(endpoint, query);

        if let Some(cache) = &self.cache {
            if let Some(payload) = cache.load(&key) {
                info!("Using cached /{endpoint} ({} entries)", payload.len());
                return Ok(payload);
            }
        }

        let payload = self.get_with_retry(endpoint, query).await?;
        info!("Fetched /{endpoint}: {} entries", payload.len());

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.store(&key, &payload) {
                warn!("Failed to cache /{endpoint}: {e}");
            }
        }
        Ok(payload)
    }

    async fn get_with_retry(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut attempt = 0usize;

        loop {
            match self.get_once(&url, query).await {
                Ok(payload) => return Ok(payload),
                Err(e) if attempt < RETRY_BACKOFF_MS.len() && is_retryable(&e) => {
                    let delay = RETRY_BACKOFF_MS[attempt];
                    attempt += 1;
                    warn!("GET {url} failed (attempt {attempt}): {e}; retrying in {delay}ms");
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<Value>> {
        debug!(url, ?query, "GET");
        let resp = self.http.get(url).query(query).send().await?;
        let resp = resp.error_for_status()?;
        let body: Value = resp.json().await?;

        match body {
            Value::Array(items) => Ok(items),
            Value::Object(mut obj) => match obj.remove("items") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(AppError::Fetch(format!("{url} returned an object without an items array"))),
            },
            _ => Err(AppError::Fetch(format!("{url} response was not an array"))),
        }
    }
}

fn cache_key(endpoint: &str, query: &[(&str, &str)]) -> String {
    let mut key = endpoint.replace('/', "_");
    for (k, v) in query {
        key.push('_');
        key.push_str(k);
        key.push('-');
        key.push_str(v);
    }
    key
}

/// Transport failures, rate limiting and server errors are worth another try;
/// client errors and malformed bodies are not.
fn is_retryable(err: &AppError) -> bool {
    match err {
        AppError::Http(e) => match e.status() {
            Some(status) => status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
            None => e.is_timeout() || e.is_connect() || e.is_request(),
        },
        _ => false,
    }
}
