//! HTTP client for the weatherapi.com REST API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use weatherdash_core::ApiConfig;

use crate::error::ClientError;
use crate::types::{City, WeatherSnapshot};

const USER_AGENT: &str = concat!("weatherdash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    forecast_days: u8,
}

impl WeatherApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.effective_api_key(),
            forecast_days: config.forecast_days,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /search.json?key=..&q=..`
    pub async fn search(&self, query: &str) -> Result<Vec<City>, ClientError> {
        self.get_json("search.json", &[("q", query)]).await
    }

    /// `GET /forecast.json?key=..&q=..&days=..&aqi=yes&alerts=no`
    pub async fn forecast(&self, city: &str) -> Result<WeatherSnapshot, ClientError> {
        let days = self.forecast_days.to_string();
        self.get_json(
            "forecast.json",
            &[("q", city), ("days", days.as_str()), ("aqi", "yes"), ("alerts", "no")],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        Ok(response.json().await?)
    }
}
