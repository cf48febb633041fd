//! HTTP fetcher
//!
//! Issues JSON API requests with `reqwest`. The configured base URL is joined
//! with each query's path; configured query parameters come first, then the
//! query's own.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::FetchError;
use super::{FetchRequest, JsonFetcher};
use crate::config::DataSourceConfig;
use crate::query::Method;

/// Fetches JSON documents over HTTP
pub struct HttpFetcher {
    client: Client,
    config: DataSourceConfig,
}

impl HttpFetcher {
    /// Create a new fetcher for the configured API
    pub fn new(config: DataSourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    /// Full request URL for a query
    pub fn build_url(&self, request: &FetchRequest) -> Result<Url, FetchError> {
        let base = self.config.url.trim_end_matches('/');
        let path = request.path.trim();
        let joined = if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };

        let mut url =
            Url::parse(&joined).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", joined, e)))?;

        let configured = self.config.query_params.trim().trim_start_matches('?');
        if !configured.is_empty() {
            let merged = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, configured),
                _ => configured.to_string(),
            };
            url.set_query(Some(&merged));
        }

        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(request.params.iter());
        }

        Ok(url)
    }

    /// Check that the base URL answers with a success status
    pub async fn check_health(&self) -> Result<(), FetchError> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        check_status(response.status())
    }
}

fn check_status(status: StatusCode) -> Result<(), FetchError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(FetchError::AuthFailed(format!("API returned {}", status)));
    }

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        });
    }

    Ok(())
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<Value, FetchError> {
        let url = self.build_url(&request)?;
        debug!(method = ?request.method, %url, "Sending request");

        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, url);

        for (key, value) in self.config.headers.iter() {
            builder = builder.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            let has_content_type = request
                .headers
                .iter()
                .any(|(k, _)| k.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
            if !has_content_type {
                builder = builder.header(CONTENT_TYPE, "application/json");
            }
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        check_status(response.status())?;

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(url: &str, query_params: &str) -> HttpFetcher {
        HttpFetcher::new(DataSourceConfig {
            url: url.to_string(),
            query_params: query_params.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn request(path: &str, params: &[(&str, &str)]) -> FetchRequest {
        FetchRequest {
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_url_joins_path() {
        let f = fetcher("http://localhost:8080/api/", "");
        assert_eq!(
            f.build_url(&request("/items", &[])).unwrap().as_str(),
            "http://localhost:8080/api/items"
        );
        assert_eq!(
            f.build_url(&request("items", &[])).unwrap().as_str(),
            "http://localhost:8080/api/items"
        );
        assert_eq!(
            f.build_url(&request("", &[])).unwrap().as_str(),
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn test_build_url_query_order() {
        let f = fetcher("http://localhost:8080", "?token=abc");
        let url = f
            .build_url(&request("/search?q=x", &[("tag", "a b"), ("tag", "c")]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/search?q=x&token=abc&tag=a+b&tag=c"
        );
    }

    #[test]
    fn test_build_url_invalid() {
        let f = fetcher("not a url", "");
        assert!(matches!(
            f.build_url(&request("/x", &[])),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED),
            Err(FetchError::AuthFailed(_))
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND),
            Err(FetchError::Status { status: 404, .. })
        ));
    }
}
