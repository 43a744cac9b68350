//! Thin asynchronous client for the EVE Swagger Interface (ESI).
//!
//! - Resolves item names to type ids, volumes and market prices.
//! - Keeps market prices in a 60-minute in-memory cache with stale fallbacks.
//! - Type details never change between patches, so they are cached for the session.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinSet};
use tracing::{debug, info, warn};

use crate::domain::{ItemInfo, TypeId};

const DEFAULT_BASE_URL: &str = "https://esi.evetech.net/latest/";
const DATASOURCE: &str = "tranquility";
const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const USER_AGENT: &str = concat!("freight-splitter/", env!("CARGO_PKG_VERSION"));

/// `/universe/ids/` accepts at most this many names per call.
const IDS_CHUNK: usize = 500;
/// `/universe/names/` accepts at most this many ids per call.
const NAMES_CHUNK: usize = 1000;
/// Number of market type ids scanned when building the autocomplete catalog.
pub const CATALOG_SCAN_LIMIT: usize = 1000;
/// Number of names kept in the autocomplete catalog.
pub const CATALOG_SIZE: usize = 500;

#[derive(Debug, Error)]
pub enum EsiClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
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

/// Region-independent reference price for one type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MarketPrice {
    pub type_id: TypeId,
    #[serde(default)]
    pub average_price: Option<f64>,
    #[serde(default)]
    pub adjusted_price: Option<f64>,
}

impl MarketPrice {
    /// Average price, falling back to the adjusted price when the average is missing or zero.
    pub fn unit_price(&self) -> f64 {
        self.average_price
            .filter(|price| *price > 0.0)
            .or(self.adjusted_price)
            .filter(|price| price.is_finite())
            .unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeDetails {
    pub type_id: TypeId,
    pub name: String,
    pub packaged_volume: Option<f64>,
    pub volume: Option<f64>,
}

impl TypeDetails {
    /// Volume of one unit as it travels in a courier contract.
    pub fn unit_volume(&self) -> f64 {
        self.packaged_volume.or(self.volume).unwrap_or(0.0)
    }
}

#[derive(Default)]
struct EsiCache {
    prices: Option<Cached<Vec<MarketPrice>>>,
    types: HashMap<TypeId, TypeDetails>,
}

impl EsiCache {
    fn clear(&mut self) {
        self.prices = None;
        self.types.clear();
    }
}

#[derive(Clone)]
pub struct EsiClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<EsiCache>>,
    ttl: Duration,
}

impl EsiClient {
    pub fn new() -> Result<Self, EsiClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, EsiClientError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(EsiCache::default())),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Maps item names to type ids. Unknown names are simply absent from the result.
    pub async fn resolve_ids(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, TypeId>, EsiClientError> {
        let mut ids = HashMap::new();
        for chunk in names.chunks(IDS_CHUNK) {
            let mut url = self.url("universe/ids/")?;
            url.query_pairs_mut().append_pair("language", "en");
            let response: IdsDto = self.send_json(self.http.post(url).json(chunk)).await?;
            for entry in response.inventory_types {
                ids.insert(entry.name, entry.id);
            }
        }
        debug!(requested = names.len(), resolved = ids.len(), "resolved type ids");
        Ok(ids)
    }

    pub async fn get_market_prices(
        &self,
    ) -> Result<CachedPayload<Vec<MarketPrice>>, EsiClientError> {
        if let Some(payload) = self.cached_prices().await {
            debug!("serving cached market prices");
            return Ok(payload);
        }

        let url = self.url("markets/prices/")?;
        match self.send_json::<Vec<MarketPrice>>(self.http.get(url)).await {
            Ok(prices) => {
                info!(entries = prices.len(), "fetched market prices");
                Ok(self.store_prices(prices).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_prices_stale().await {
                    warn!(%error, "market price request failed; using stale prices");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    pub async fn get_type(&self, type_id: TypeId) -> Result<TypeDetails, EsiClientError> {
        if let Some(details) = self.cache.lock().await.types.get(&type_id).cloned() {
            return Ok(details);
        }

        let url = self.url(&format!("universe/types/{type_id}/"))?;
        let dto: TypeDto = self.send_json(self.http.get(url)).await?;
        let details = TypeDetails {
            type_id,
            name: dto.name,
            packaged_volume: dto.packaged_volume,
            volume: dto.volume,
        };
        self.cache
            .lock()
            .await
            .types
            .insert(type_id, details.clone());
        Ok(details)
    }

    /// Looks up volume and price for every name ESI recognises.
    ///
    /// Names that do not resolve, or whose type lookup fails, are left out; the
    /// caller decides whether a missing entry is fatal.
    pub async fn fetch_items_info(
        &self,
        names: &[String],
    ) -> Result<HashMap<String, ItemInfo>, EsiClientError> {
        let ids = self.resolve_ids(names).await?;
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let prices: HashMap<TypeId, f64> = self
            .get_market_prices()
            .await?
            .data
            .iter()
            .map(|price| (price.type_id, price.unit_price()))
            .collect();

        let mut lookups = JoinSet::new();
        for (name, type_id) in ids {
            let client = self.clone();
            lookups.spawn(async move { (name, type_id, client.get_type(type_id).await) });
        }

        let mut infos = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            let (name, type_id, details) = match joined {
                Ok(result) => result,
                Err(error) => {
                    warn!(%error, "type lookup task failed");
                    continue;
                }
            };
            match details {
                Ok(details) => {
                    infos.insert(
                        name.clone(),
                        ItemInfo {
                            type_id,
                            name,
                            unit_volume: details.unit_volume(),
                            unit_price: prices.get(&type_id).copied().unwrap_or(0.0),
                        },
                    );
                }
                Err(error) => {
                    warn!(%name, type_id, %error, "failed to fetch type details");
                }
            }
        }

        Ok(infos)
    }

    /// Names of traded inventory types, for autocomplete.
    pub async fn get_catalog(&self, limit: usize) -> Result<Vec<String>, EsiClientError> {
        let ids: Vec<TypeId> = self
            .get_market_prices()
            .await?
            .data
            .iter()
            .take(CATALOG_SCAN_LIMIT)
            .map(|price| price.type_id)
            .collect();

        let mut names = Vec::new();
        for chunk in ids.chunks(NAMES_CHUNK) {
            let url = self.url("universe/names/")?;
            let entries: Vec<NameDto> = self.send_json(self.http.post(url).json(chunk)).await?;
            names.extend(
                entries
                    .into_iter()
                    .filter(|entry| entry.category == "inventory_type")
                    .map(|entry| entry.name),
            );
            if names.len() >= limit {
                break;
            }
        }
        names.truncate(limit);
        info!(names = names.len(), "loaded item catalog");
        Ok(names)
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    async fn cached_prices(&self) -> Option<CachedPayload<Vec<MarketPrice>>> {
        let cache = self.cache.lock().await;
        cache
            .prices
            .as_ref()
            .and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_prices_stale(&self) -> Option<CachedPayload<Vec<MarketPrice>>> {
        let cache = self.cache.lock().await;
        cache.prices.as_ref().map(Cached::stale)
    }

    async fn store_prices(&self, data: Vec<MarketPrice>) -> CachedPayload<Vec<MarketPrice>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(data.clone(), fetched_at, CacheStatus::Fresh);
        self.cache.lock().await.prices = Some(Cached::new(data, fetched_at));
        payload
    }

    async fn send_json<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, EsiClientError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ErrorDto>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("HTTP {status}"));
        Err(EsiClientError::Api(message))
    }

    fn url(&self, path: &str) -> Result<Url, EsiClientError> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut().append_pair("datasource", DATASOURCE);
        Ok(url)
    }
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

#[derive(Debug, Deserialize)]
struct IdsDto {
    #[serde(default)]
    inventory_types: Vec<NamedIdDto>,
}

#[derive(Debug, Deserialize)]
struct NamedIdDto {
    id: TypeId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct NameDto {
    name: String,
    category: String,
}

#[derive(Debug, Deserialize)]
struct TypeDto {
    name: String,
    #[serde(default)]
    packaged_volume: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> EsiClient {
        EsiClient::with_base_url(&format!("{}/", server.uri())).unwrap()
    }

    async fn mount_prices(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .and(query_param("datasource", "tranquility"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "type_id": 34, "average_price": 4.5, "adjusted_price": 4.2 },
                { "type_id": 35, "average_price": 0.0, "adjusted_price": 9.0 },
                { "type_id": 36 }
            ])))
            .mount(server)
            .await;
    }

    #[test]
    fn market_price_falls_back_to_adjusted() {
        let price = MarketPrice {
            type_id: 35,
            average_price: Some(0.0),
            adjusted_price: Some(9.0),
        };
        assert_eq!(price.unit_price(), 9.0);
        let empty = MarketPrice {
            type_id: 36,
            average_price: None,
            adjusted_price: None,
        };
        assert_eq!(empty.unit_price(), 0.0);
    }

    #[test]
    fn type_volume_prefers_packaged() {
        let details = TypeDetails {
            type_id: 648,
            name: "Badger".into(),
            packaged_volume: Some(20_000.0),
            volume: Some(250_000.0),
        };
        assert_eq!(details.unit_volume(), 20_000.0);
        let loose = TypeDetails {
            packaged_volume: None,
            ..details
        };
        assert_eq!(loose.unit_volume(), 250_000.0);
    }

    #[tokio::test]
    async fn fetch_items_info_joins_ids_prices_and_types() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/universe/ids/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "inventory_types": [
                    { "id": 34, "name": "Tritanium" },
                    { "id": 35, "name": "Pyerite" },
                    { "id": 40, "name": "Megacyte" }
                ]
            })))
            .mount(&server)
            .await;
        mount_prices(&server).await;
        Mock::given(method("GET"))
            .and(path("/universe/types/34/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type_id": 34, "name": "Tritanium", "volume": 0.01, "packaged_volume": 0.01
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/universe/types/35/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type_id": 35, "name": "Pyerite", "volume": 0.01
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/universe/types/40/"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "error": "Type not found!" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let names = vec![
            "Tritanium".to_string(),
            "Pyerite".to_string(),
            "Megacyte".to_string(),
            "Unobtainium".to_string(),
        ];
        let infos = client.fetch_items_info(&names).await.unwrap();

        assert_eq!(infos.len(), 2);
        let tritanium = &infos["Tritanium"];
        assert_eq!(tritanium.type_id, 34);
        assert_eq!(tritanium.unit_volume, 0.01);
        assert_eq!(tritanium.unit_price, 4.5);
        assert_eq!(infos["Pyerite"].unit_price, 9.0);
        assert!(!infos.contains_key("Megacyte"));
    }

    #[tokio::test]
    async fn unresolved_names_skip_price_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/universe/ids/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let infos = client
            .fetch_items_info(&["Nothing".to_string()])
            .await
            .unwrap();
        assert!(infos.is_empty());
    }

    #[tokio::test]
    async fn prices_fall_back_to_stale_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "type_id": 34, "average_price": 4.5 }
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server).await.with_ttl(Duration::ZERO);
        let first = client.get_market_prices().await.unwrap();
        assert_eq!(first.status, CacheStatus::Fresh);

        let second = client.get_market_prices().await.unwrap();
        assert_eq!(second.status, CacheStatus::Stale);
        assert_eq!(second.data, first.data);

        client.clear_cache().await;
        let error = client.get_market_prices().await.unwrap_err();
        assert!(matches!(error, EsiClientError::Api(message) if message.contains("502")));
    }

    #[tokio::test]
    async fn fresh_prices_are_served_from_memory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        client.get_market_prices().await.unwrap();
        let second = client.get_market_prices().await.unwrap();
        assert_eq!(second.status, CacheStatus::Cached);
    }

    #[tokio::test]
    async fn api_errors_carry_the_esi_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/universe/ids/"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "Invalid names" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let error = client
            .resolve_ids(&["Tritanium".to_string()])
            .await
            .unwrap_err();
        assert_eq!(error.to_string(), "api error: Invalid names");
    }

    #[tokio::test]
    async fn catalog_keeps_inventory_types_only() {
        let server = MockServer::start().await;
        mount_prices(&server).await;
        Mock::given(method("POST"))
            .and(path("/universe/names/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 34, "name": "Tritanium", "category": "inventory_type" },
                { "id": 35, "name": "Pyerite", "category": "inventory_type" },
                { "id": 36, "name": "Jita", "category": "solar_system" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let catalog = client.get_catalog(CATALOG_SIZE).await.unwrap();
        assert_eq!(catalog, vec!["Tritanium".to_string(), "Pyerite".to_string()]);

        let short = client.get_catalog(1).await.unwrap();
        assert_eq!(short, vec!["Tritanium".to_string()]);
    }
}
