//! Asynchronous client for the buyback backend.
//!
//! - Posts appraisal drafts and decodes the valuation that comes back.
//! - Loads the doctrine stock list, with an in-memory cache and stale fallback.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{Appraisal, AppraisalTransport, DoctrineStockEntry, SubmissionError};
use crate::util::config::ClientConfig;

const APPRAISAL_PATH: &str = "api/appraisal";
const DOCTRINE_STOCK_PATH: &str = "api/doctrine-stock";
const DEFAULT_STOCK_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum BuybackClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request to {url} failed: Status '{reason}'")]
    Status { url: String, reason: String },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Clone)]
pub struct BuybackClient {
    http: Client,
    base_url: Url,
    stock_cache: Arc<Mutex<Option<Cached<Vec<DoctrineStockEntry>>>>>,
    stock_ttl: Duration,
}

impl BuybackClient {
    pub fn new(config: &ClientConfig) -> Result<Self, BuybackClientError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            stock_cache: Arc::new(Mutex::new(None)),
            stock_ttl: DEFAULT_STOCK_TTL,
        })
    }

    pub fn with_stock_ttl(mut self, ttl: Duration) -> Self {
        self.stock_ttl = ttl;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn appraise(&self, draft: &Appraisal) -> Result<Appraisal, SubmissionError> {
        let url = self
            .url(APPRAISAL_PATH)
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;
        tracing::debug!(%url, "posting appraisal");

        let response = self
            .http
            .post(url.clone())
            .json(draft)
            .send()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(rejection(&url, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;
        decode_appraisal(&body)
    }

    /// Doctrine stock, answered from the cache while it is fresh.
    pub async fn get_doctrine_stock(
        &self,
    ) -> Result<CachedPayload<Vec<DoctrineStockEntry>>, BuybackClientError> {
        self.load_stock(true).await
    }

    /// Always asks the backend; the cached copy is only used if that fails.
    pub async fn reload_doctrine_stock(
        &self,
    ) -> Result<CachedPayload<Vec<DoctrineStockEntry>>, BuybackClientError> {
        self.load_stock(false).await
    }

    async fn load_stock(
        &self,
        use_cache: bool,
    ) -> Result<CachedPayload<Vec<DoctrineStockEntry>>, BuybackClientError> {
        if use_cache {
            if let Some(payload) = self.cached_stock(false).await {
                return Ok(payload);
            }
        }

        let url = self.url(DOCTRINE_STOCK_PATH)?;
        match self.fetch_json::<Vec<DoctrineStockEntry>>(url).await {
            Ok(entries) => {
                tracing::info!(entries = entries.len(), "loaded doctrine stock");
                Ok(self.store_stock(entries).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_stock(true).await {
                    tracing::warn!(%error, "doctrine stock refresh failed; serving stale copy");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    async fn cached_stock(
        &self,
        allow_stale: bool,
    ) -> Option<CachedPayload<Vec<DoctrineStockEntry>>> {
        let cache = self.stock_cache.lock().await;
        let entry = cache.as_ref()?;
        if allow_stale {
            Some(entry.stale())
        } else {
            entry.if_fresh(self.stock_ttl)
        }
    }

    async fn store_stock(
        &self,
        data: Vec<DoctrineStockEntry>,
    ) -> CachedPayload<Vec<DoctrineStockEntry>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(data.clone(), fetched_at, CacheStatus::Fresh);
        *self.stock_cache.lock().await = Some(Cached::new(data, fetched_at));
        payload
    }

    async fn fetch_json<T>(&self, url: Url) -> Result<T, BuybackClientError>
    where
        T: DeserializeOwned,
    {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BuybackClientError::Status {
                url: url.to_string(),
                reason: status_reason(status),
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

#[async_trait]
impl AppraisalTransport for BuybackClient {
    async fn post_appraisal(&self, payload: &Appraisal) -> Result<Appraisal, SubmissionError> {
        self.appraise(payload).await
    }
}

fn rejection(url: &Url, status: StatusCode) -> SubmissionError {
    SubmissionError::Rejected {
        url: url.to_string(),
        status: status.as_u16(),
        reason: status_reason(status),
    }
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

fn decode_appraisal(body: &[u8]) -> Result<Appraisal, SubmissionError> {
    serde_json::from_slice(body).map_err(|err| SubmissionError::Decode(err.to_string()))
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::domain::{Availability, SubmissionErrorKind};

    fn base_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/", server.uri())).expect("base url")
    }

    fn client_for(base: Url) -> BuybackClient {
        let config = ClientConfig::from_lookup(|_| None)
            .expect("default config")
            .with_base_url(base)
            .with_timeout(Duration::from_secs(5));
        BuybackClient::new(&config).expect("client builds")
    }

    fn stock_body(name: &str, availability: &str) -> serde_json::Value {
        json!([{ "typeName": name, "quantity": 2, "availability": availability }])
    }

    async fn mount_stock_once(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/api/doctrine-stock"))
            .respond_with(response)
            .up_to_n_times(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn posts_draft_and_decodes_valuation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/appraisal"))
            .and(body_partial_json(json!({ "raw": "Tritanium 100" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "link": "https://evepraisal.com/a/1",
                "buybackPrice": 450.0,
                "items": [{
                    "typeID": 34,
                    "typeName": "Tritanium",
                    "quantity": 100,
                    "jitaBuyPerUnit": 5.0,
                    "rate": 0.9
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let client = client_for(base_url(&server));

        let appraisal = client
            .post_appraisal(&Appraisal::from_raw("Tritanium 100"))
            .await
            .expect("appraisal succeeds");

        assert_eq!(appraisal.buyback_price, Some(450.0));
        assert_eq!(appraisal.items[0].type_name, "Tritanium");

        let requests = server.received_requests().await.expect("recording enabled");
        let sent: serde_json::Value = requests[0].body_json().expect("json body");
        assert_eq!(sent, json!({ "raw": "Tritanium 100" }));
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/appraisal"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let base = base_url(&server);
        let client = client_for(base.clone());

        let err = client
            .post_appraisal(&Appraisal::from_raw("Tritanium 100"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), SubmissionErrorKind::Transport);
        assert_eq!(
            err.to_string(),
            format!("Request to {base}api/appraisal failed: Status 'Not Found'")
        );
    }

    #[tokio::test]
    async fn garbage_body_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/appraisal"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;
        let client = client_for(base_url(&server));

        let err = client
            .post_appraisal(&Appraisal::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), SubmissionErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_failure() {
        let server = MockServer::start().await;
        let base = base_url(&server);
        drop(server);
        let client = client_for(base);

        let err = client
            .post_appraisal(&Appraisal::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Transport(_)));
    }

    #[tokio::test]
    async fn doctrine_stock_is_cached_then_served_stale() {
        let server = MockServer::start().await;
        mount_stock_once(
            &server,
            ResponseTemplate::new(200).set_body_json(stock_body("Guardian", "MISSING")),
        )
        .await;
        mount_stock_once(&server, ResponseTemplate::new(500)).await;
        let client = client_for(base_url(&server));

        let first = client.get_doctrine_stock().await.expect("first load");
        assert_eq!(first.status, CacheStatus::Fresh);
        assert_eq!(first.data[0].availability, Availability::Missing);

        let second = client.get_doctrine_stock().await.expect("cached load");
        assert_eq!(second.status, CacheStatus::Cached);

        let client = client.with_stock_ttl(Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(5)).await;
        let third = client.get_doctrine_stock().await.expect("stale fallback");
        assert_eq!(third.status, CacheStatus::Stale);
        assert_eq!(third.data, first.data);
    }

    #[tokio::test]
    async fn reload_bypasses_a_fresh_cache() {
        let server = MockServer::start().await;
        mount_stock_once(
            &server,
            ResponseTemplate::new(200).set_body_json(stock_body("Guardian", "MISSING")),
        )
        .await;
        mount_stock_once(
            &server,
            ResponseTemplate::new(200).set_body_json(stock_body("Ishtar", "WELL_PRICED")),
        )
        .await;
        let client = client_for(base_url(&server));

        let first = client.get_doctrine_stock().await.expect("first load");
        assert_eq!(first.data[0].type_name, "Guardian");

        let reloaded = client.reload_doctrine_stock().await.expect("reload");
        assert_eq!(reloaded.status, CacheStatus::Fresh);
        assert_eq!(reloaded.data[0].type_name, "Ishtar");

        let cached = client.get_doctrine_stock().await.expect("cached load");
        assert_eq!(cached.status, CacheStatus::Cached);
        assert_eq!(cached.data[0].type_name, "Ishtar");
    }

    #[tokio::test]
    async fn failed_reload_keeps_the_previous_list() {
        let server = MockServer::start().await;
        mount_stock_once(
            &server,
            ResponseTemplate::new(200).set_body_json(stock_body("Guardian", "MISSING")),
        )
        .await;
        mount_stock_once(&server, ResponseTemplate::new(503)).await;
        let client = client_for(base_url(&server));

        client.get_doctrine_stock().await.expect("first load");
        let reloaded = client.reload_doctrine_stock().await.expect("stale fallback");

        assert_eq!(reloaded.status, CacheStatus::Stale);
        assert_eq!(reloaded.data[0].type_name, "Guardian");
    }

    #[tokio::test]
    async fn doctrine_stock_error_without_cache_propagates() {
        let server = MockServer::start().await;
        mount_stock_once(&server, ResponseTemplate::new(503)).await;
        let client = client_for(base_url(&server));

        let err = client.get_doctrine_stock().await.unwrap_err();
        assert!(matches!(err, BuybackClientError::Status { .. }));
    }

    #[test]
    fn unknown_status_codes_use_the_number() {
        let status = StatusCode::from_u16(599).expect("valid code");
        assert_eq!(status_reason(status), "599");
        assert_eq!(status_reason(StatusCode::NOT_FOUND), "Not Found");
    }
}
