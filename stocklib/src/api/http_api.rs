use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use crate::api::client::DataSourceClient;
use crate::api::errors::SourceError;
use crate::api::objects::{PredictResponse, PredictionResult, PriceSeries, StockResponse};

pub const DEFAULT_API_URL: &str = "http://localhost:5001";

/// Talks to the prediction backend's `/api/stock` and `/api/predict` routes.
pub struct HttpDataSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDataSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, Box<dyn std::error::Error>> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(HttpDataSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_body(&self, endpoint: &str) -> Result<String, SourceError> {
        let url = self.url(endpoint);

        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        log::trace!("GET {}", url);
        let response = self.client.get(&url).headers(headers).send().await?;

        // Failures come back as a 500 with {"success": false, "error": ...}
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
            return match detail {
                Some(message) => Err(SourceError::Service(message)),
                None => Err(SourceError::Status(status.as_u16())),
            };
        }

        Ok(body)
    }
}

#[async_trait]
impl DataSourceClient for HttpDataSource {
    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries, SourceError> {
        let endpoint = format!("/api/stock/{}", symbol);
        let body = self.get_body(&endpoint).await?;
        let response: StockResponse = serde_json::from_str(&body)?;
        response.into_series()
    }

    async fn fetch_prediction(&self, symbol: &str) -> Result<PredictionResult, SourceError> {
        let endpoint = format!("/api/predict/{}", symbol);
        let body = self.get_body(&endpoint).await?;
        let response: PredictResponse = serde_json::from_str(&body)?;
        response.into_prediction()
    }
}
