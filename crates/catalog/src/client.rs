//! Catalog search over HTTP.

use std::time::Duration;

use {
    async_trait::async_trait,
    rand::seq::IndexedRandom,
    reqwest::header::{ACCEPT, REFERER, USER_AGENT},
    serde::Deserialize,
    tracing::{debug, warn},
};

use crate::{Result, filter::FilterSpec, item::Item};

/// Browser strings rotated across requests.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X)",
];

const SEARCH_PATH: &str = "/api/v2/catalog/items";
const REFERER_PATH: &str = "/vetements";
const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// Source of the newest listings matching a filter.
///
/// "Nothing new" is `Ok(vec![])`; `Err` is reserved for failures worth
/// logging. Callers treat both as an empty round.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch(&self, filter: &FilterSpec) -> Result<Vec<Item>>;
}

#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    /// Load the referer page first so the session carries upstream cookies.
    pub warm_up: bool,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.vinted.fr".into(),
            page_size: 5,
            request_timeout: Duration::from_secs(10),
            warm_up: false,
        }
    }
}

#[derive(Deserialize)]
struct CatalogPage {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

/// [`CatalogClient`] backed by the marketplace's public search API.
pub struct HttpCatalogClient {
    http: reqwest::Client,
    config: CatalogClientConfig,
}

impl HttpCatalogClient {
    pub fn new(config: CatalogClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn search_query(&self, filter: &FilterSpec) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("search_text", filter.search_text.clone()),
            ("price_from", filter.price_min.to_string()),
            ("price_to", filter.price_max.to_string()),
            ("currency", filter.currency.clone()),
            ("page", "1".to_string()),
            ("per_page", self.config.page_size.to_string()),
            ("order", "newest_first".to_string()),
        ];
        for (key, ids) in filter.id_lists() {
            if !ids.is_empty() {
                let joined: Vec<String> = ids.iter().map(u64::to_string).collect();
                query.push((key, joined.join(",")));
            }
        }
        query
    }

    /// Returns `false` when the referer page refused us; the round is skipped.
    async fn warm_up(&self, user_agent: &str) -> Result<bool> {
        let response = self
            .http
            .get(self.url(REFERER_PATH))
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, ACCEPT_VALUE)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "catalog warm-up page rejected");
            return Ok(false);
        }
        Ok(true)
    }

    async fn search(&self, filter: &FilterSpec, user_agent: &str) -> Result<Vec<Item>> {
        if self.config.warm_up && !self.warm_up(user_agent).await? {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .get(self.url(SEARCH_PATH))
            .header(USER_AGENT, user_agent)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(REFERER, self.url(REFERER_PATH))
            .query(&self.search_query(filter))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "catalog search returned non-success status");
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        let page: CatalogPage = serde_json::from_str(&body)?;
        Ok(decode_items(page.items))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch(&self, filter: &FilterSpec) -> Result<Vec<Item>> {
        match self.search(filter, pick_user_agent()).await {
            Err(crate::Error::Http(e)) if e.is_timeout() => {
                warn!(timeout = ?self.config.request_timeout, "catalog request timed out");
                Ok(Vec::new())
            },
            other => other,
        }
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Entries that do not look like listings are dropped individually.
fn decode_items(raw: Vec<serde_json::Value>) -> Vec<Item> {
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<Item>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(error = %e, "skipping malformed catalog item");
                None
            },
        })
        .collect()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, mockito::Matcher, serde_json::json};

    fn client_for(server: &mockito::Server, warm_up: bool) -> HttpCatalogClient {
        HttpCatalogClient::new(CatalogClientConfig {
            base_url: server.url(),
            warm_up,
            ..CatalogClientConfig::default()
        })
        .unwrap()
    }

    fn listing(id: u32) -> serde_json::Value {
        json!({
            "url": format!("https://www.vinted.fr/items/{id}"),
            "title": format!("item {id}"),
            "price": { "amount": "10.0", "currency_code": "EUR" },
        })
    }

    #[test]
    fn query_includes_only_non_empty_id_lists() {
        let client = HttpCatalogClient::new(CatalogClientConfig::default()).unwrap();
        let filter = FilterSpec {
            search_text: "shoes".into(),
            brand_ids: vec![5, 7],
            size_ids: vec![206],
            ..FilterSpec::default()
        };

        let query = client.search_query(&filter);
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("search_text"), Some("shoes"));
        assert_eq!(get("price_from"), Some("0"));
        assert_eq!(get("price_to"), Some("9999"));
        assert_eq!(get("per_page"), Some("5"));
        assert_eq!(get("order"), Some("newest_first"));
        assert_eq!(get("brand_ids"), Some("5,7"));
        assert_eq!(get("size_ids"), Some("206"));
        assert_eq!(get("catalog_ids"), None);
        assert_eq!(get("color_ids"), None);
    }

    #[test]
    fn user_agent_comes_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&pick_user_agent()));
        }
    }

    #[tokio::test]
    async fn fetch_decodes_items_and_sends_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search_text".into(), "jacket".into()),
                Matcher::UrlEncoded("currency".into(), "USD".into()),
                Matcher::UrlEncoded("brand_ids".into(), "1,2".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("accept", ACCEPT_VALUE)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "items": [listing(1), listing(2)] }).to_string())
            .create_async()
            .await;

        let filter = FilterSpec {
            search_text: "jacket".into(),
            currency: "USD".into(),
            brand_ids: vec![1, 2],
            ..FilterSpec::default()
        };
        let items = client_for(&server, false).fetch(&filter).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url, "https://www.vinted.fr/items/1");
    }

    #[tokio::test]
    async fn non_success_status_yields_no_items() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(403)
            .create_async()
            .await;

        let items = client_for(&server, false)
            .fetch(&FilterSpec::default())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "items": [listing(1), { "title": "no url" }, 7] }).to_string())
            .create_async()
            .await;

        let items = client_for(&server, false)
            .fetch(&FilterSpec::default())
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn invalid_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>challenge</html>")
            .create_async()
            .await;

        let result = client_for(&server, false)
            .fetch(&FilterSpec::default())
            .await;
        assert!(matches!(result, Err(crate::Error::Decode(_))));
    }

    #[tokio::test]
    async fn rejected_warm_up_skips_search() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", REFERER_PATH)
            .with_status(503)
            .create_async()
            .await;
        let search = server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let items = client_for(&server, true)
            .fetch(&FilterSpec::default())
            .await
            .unwrap();

        assert!(items.is_empty());
        search.assert_async().await;
    }

    #[tokio::test]
    async fn warm_up_then_search() {
        let mut server = mockito::Server::new_async().await;
        let home = server
            .mock("GET", REFERER_PATH)
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", SEARCH_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(json!({ "items": [listing(9)] }).to_string())
            .create_async()
            .await;

        let items = client_for(&server, true)
            .fetch(&FilterSpec::default())
            .await
            .unwrap();

        home.assert_async().await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn silent_server_times_out_to_empty_page() {
        use {
            std::time::Instant,
            tokio::{io::AsyncReadExt, net::TcpListener},
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                held.push(socket);
            }
        });

        let client = HttpCatalogClient::new(CatalogClientConfig {
            base_url: format!("http://{addr}"),
            request_timeout: Duration::from_millis(200),
            warm_up: false,
            ..CatalogClientConfig::default()
        })
        .unwrap();

        let started = Instant::now();
        let items = client.fetch(&FilterSpec::default()).await.unwrap();

        assert!(items.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
