use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::ProductResponse;
use crate::{LookupError, ProductInfo, ProductLookup};

const PRODUCT_FIELDS: &str = "product_name,ingredients,selected_images";

/// Connection settings for [`OpenFoodFactsClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl LookupConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("halal-scan/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Barcode lookup against the Open Food Facts v2 product API.
#[derive(Debug, Clone)]
pub struct OpenFoodFactsClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenFoodFactsClient {
    pub fn new(cfg: &LookupConfig) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .connect_timeout(cfg.connect_timeout())
            .user_agent(cfg.user_agent.as_str())
            .build()
            .map_err(|e| LookupError::Other(e.to_string()))?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{barcode}", self.base_url)
    }

    async fn fetch(&self, barcode: &str) -> Result<ProductInfo, LookupError> {
        let response = self
            .http
            .get(self.product_url(barcode))
            .query(&[("fields", PRODUCT_FIELDS)])
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        if let Some(err) = status_error(response.status()) {
            return Err(err);
        }

        let body = response.bytes().await.map_err(|e| transport_error(&e))?;
        let parsed: ProductResponse =
            serde_json::from_slice(&body).map_err(|e| LookupError::Parse(e.to_string()))?;
        parsed.into_product_info(barcode)
    }
}

#[async_trait]
impl ProductLookup for OpenFoodFactsClient {
    async fn lookup(&self, barcode: &str) -> Result<ProductInfo, LookupError> {
        let start = Instant::now();
        let barcode = validate_barcode(barcode)?;

        match self.fetch(barcode).await {
            Ok(info) => {
                info!(
                    barcode,
                    ingredient_count = info.ingredients.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lookup_success"
                );
                Ok(info)
            }
            Err(err) => {
                warn!(
                    barcode,
                    error = %err,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lookup_failure"
                );
                Err(err)
            }
        }
    }
}

fn validate_barcode(barcode: &str) -> Result<&str, LookupError> {
    let trimmed = barcode.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LookupError::InvalidBarcode(barcode.to_string()));
    }
    Ok(trimmed)
}

fn status_error(status: StatusCode) -> Option<LookupError> {
    if status == StatusCode::NOT_FOUND {
        Some(LookupError::NotFound)
    } else if !status.is_success() {
        Some(LookupError::ServiceUnavailable(status.as_u16()))
    } else {
        None
    }
}

fn transport_error(err: &reqwest::Error) -> LookupError {
    if err.is_connect() || err.is_timeout() {
        LookupError::NoConnectivity
    } else if err.is_decode() {
        LookupError::Parse(err.to_string())
    } else {
        LookupError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::Router;

    async fn product(Path(barcode): Path<String>) -> Response {
        match barcode.as_str() {
            "111" => (
                AxumStatus::OK,
                r#"{"status":1,"product":{"product_name":"Jelly","ingredients":[{"text":"sugar"},{"text":"gelatin"}]}}"#,
            )
                .into_response(),
            "222" => (
                AxumStatus::NOT_FOUND,
                r#"{"status":0,"status_verbose":"product not found"}"#,
            )
                .into_response(),
            "333" => (AxumStatus::SERVICE_UNAVAILABLE, "maintenance").into_response(),
            "444" => (AxumStatus::OK, "<html>not json</html>").into_response(),
            _ => (AxumStatus::OK, r#"{"status":1,"product":{"ingredients":[]}}"#).into_response(),
        }
    }

    async fn spawn_catalog() -> String {
        let app = Router::new().route("/api/v2/product/{barcode}", get(product));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base_url: String) -> OpenFoodFactsClient {
        OpenFoodFactsClient::new(&LookupConfig::default().with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn found_product_is_returned() {
        let client = client(spawn_catalog().await);
        let info = client.lookup("111").await.unwrap();
        assert_eq!(info.name, "Jelly");
        assert_eq!(info.ingredients, vec!["sugar", "gelatin"]);
    }

    #[tokio::test]
    async fn http_statuses_map_to_typed_errors() {
        let client = client(spawn_catalog().await);
        assert_eq!(client.lookup("222").await.unwrap_err(), LookupError::NotFound);
        assert_eq!(
            client.lookup("333").await.unwrap_err(),
            LookupError::ServiceUnavailable(503)
        );
        assert!(matches!(
            client.lookup("444").await.unwrap_err(),
            LookupError::Parse(_)
        ));
        assert_eq!(
            client.lookup("555").await.unwrap_err(),
            LookupError::MissingIngredients
        );
    }

    #[tokio::test]
    async fn unreachable_catalog_is_no_connectivity() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(format!("http://{addr}"));
        assert_eq!(
            client.lookup("111").await.unwrap_err(),
            LookupError::NoConnectivity
        );
    }

    #[tokio::test]
    async fn malformed_barcodes_rejected_before_request() {
        let client = client("http://127.0.0.1:9".to_string());
        for barcode in ["", "  ", "12a4", "../etc"] {
            assert!(matches!(
                client.lookup(barcode).await.unwrap_err(),
                LookupError::InvalidBarcode(_)
            ));
        }
    }

    #[test]
    fn trailing_slash_in_base_url_is_ignored() {
        let client = client("https://catalog.example/".to_string());
        assert_eq!(
            client.product_url("42"),
            "https://catalog.example/api/v2/product/42"
        );
    }

    #[test]
    fn default_config_points_at_open_food_facts() {
        let cfg = LookupConfig::default();
        assert_eq!(cfg.base_url, "https://world.openfoodfacts.org");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.user_agent.starts_with("halal-scan/"));
    }
}
