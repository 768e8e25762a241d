//! REST catalog client over `reqwest`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use store::config::ApiConfig;
use store::PublicProfile;

use crate::catalog::{CatalogApi, IdeaSource};
use crate::models::{Categories, Category, Idea, IdeaDraft, IdeasResponse, Language, Languages};
use crate::timer::with_timeout;
use crate::ApiError;

/// HTTP client for the catalog API.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    timeout: Duration,
    health_timeout: Duration,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            health_timeout: Duration::from_secs(config.health_timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, limit: Duration) -> Result<Response, ApiError> {
        let response = with_timeout(limit, async { builder.send().await.map_err(ApiError::from) }).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder, self.timeout).await?;
        with_timeout(self.timeout, async { response.json::<T>().await.map_err(ApiError::from) }).await
    }
}

impl IdeaSource for CatalogClient {
    async fn list_ideas(&self, query: &str, token: Option<&str>) -> Result<IdeasResponse, ApiError> {
        let builder = self.http.get(self.url(&format!("/api/ideas?{}", query)));
        self.fetch_json(Self::authorized(builder, token)).await
    }
}

impl CatalogApi for CatalogClient {
    async fn get_idea(&self, id: &str, token: Option<&str>) -> Result<Idea, ApiError> {
        let builder = self.http.get(self.url(&format!("/ideas/{}", id)));
        self.fetch_json(Self::authorized(builder, token)).await
    }

    async fn create_idea(&self, draft: &IdeaDraft, token: &str) -> Result<(), ApiError> {
        let builder = self.http.post(self.url("/api/ideas")).json(draft);
        self.send(builder.bearer_auth(token), self.timeout).await?;
        tracing::info!(title = %draft.title, "idea created");
        Ok(())
    }

    async fn update_idea(&self, id: &str, draft: &IdeaDraft, token: &str) -> Result<(), ApiError> {
        let builder = self.http.put(self.url(&format!("/ideas/{}", id))).json(draft);
        self.send(builder.bearer_auth(token), self.timeout).await?;
        tracing::info!(id, "idea updated");
        Ok(())
    }

    async fn delete_idea(&self, id: &str, token: &str) -> Result<(), ApiError> {
        let builder = self.http.delete(self.url(&format!("/ideas/{}", id)));
        self.send(builder.bearer_auth(token), self.timeout).await?;
        tracing::info!(id, "idea deleted");
        Ok(())
    }

    async fn public_profile(&self, uid: &str) -> Result<PublicProfile, ApiError> {
        self.fetch_json(self.http.get(self.url(&format!("/api/ideas/user/{}", uid))))
            .await
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let envelope: Categories = self.fetch_json(self.http.get(self.url("/api/categories"))).await?;
        envelope.into_result()
    }

    async fn languages(&self) -> Result<Vec<Language>, ApiError> {
        let envelope: Languages = self.fetch_json(self.http.get(self.url("/api/languages"))).await?;
        envelope.into_result()
    }

    async fn health(&self) -> Result<(), ApiError> {
        self.send(self.http.get(self.url("/api/health")), self.health_timeout)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = CatalogClient::new(&ApiConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..ApiConfig::default()
        });
        assert_eq!(client.url("/api/health"), "http://localhost:5000/api/health");
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.health_timeout, Duration::from_secs(5));
    }
}
