use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::article::{HeadlinesResponse, RemoteArticle};
use crate::config::SyncConfig;
use crate::error::{ConfigError, SyncError};

/// Remote source of headline batches.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_headlines(
        &self,
        country: &str,
        page_size: u32,
    ) -> Result<Vec<RemoteArticle>, SyncError>;
}

/// HTTP client for a newsapi.org-style `top-headlines` endpoint.
#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(client: Client, endpoint: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(client: Client, config: &SyncConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Self::new(client, &config.endpoint, config.api_key.clone())
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl FeedSource for NewsApiClient {
    async fn fetch_headlines(
        &self,
        country: &str,
        page_size: u32,
    ) -> Result<Vec<RemoteArticle>, SyncError> {
        let page_size = page_size.to_string();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("country", country),
                ("pageSize", page_size.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        // error payloads carry a message worth surfacing even on 4xx
        let parsed = serde_json::from_slice::<HeadlinesResponse>(&bytes);
        if !status.is_success() {
            return Err(match parsed {
                Ok(HeadlinesResponse {
                    message: Some(message),
                    ..
                }) => SyncError::Api(message),
                _ => SyncError::Status(status.as_u16()),
            });
        }

        let body = parsed?;
        if body.status.as_deref() == Some("error") {
            return Err(SyncError::Api(
                body.message.unwrap_or_else(|| "unknown error".to_owned()),
            ));
        }

        debug!(country, count = body.articles.len(), "fetched headlines");
        Ok(body.articles)
    }
}
