//! HTTP transport for the questions API
//!
//! Every request goes through [`ApiClient`], which owns the base URL and the
//! request timeout and turns transport failures into the crate's [`Error`]
//! taxonomy in one place.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::{ApiResult, Error};

/// Error body the backend sends with non-2xx responses
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Connectivity {
                base_url: config.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET {base_url}{path}?{params}`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        log::debug!("GET {} {:?}", url, params);

        self.send(self.http.get(&url).query(params), "GET", &url)
            .await
    }

    /// `POST {base_url}{path}` with a JSON body
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        log::debug!("POST {}", url);

        self.send(self.http.post(&url).json(body), "POST", &url)
            .await
    }

    /// `POST {base_url}{path}` without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.url(path);
        log::debug!("POST {}", url);

        self.send(self.http.post(&url), "POST", &url).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        url: &str,
    ) -> ApiResult<T> {
        let response = request.send().await.map_err(|e| {
            let err = self.connectivity_error(&e);
            log::error!("{} {} failed: {}", method, url, err);
            err
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            let err = self.connectivity_error(&e);
            log::error!("{} {} failed while reading body: {}", method, url, err);
            err
        })?;

        if !status.is_success() {
            let err = application_error(status.as_u16(), &body);
            log::error!("{} {} failed: {}", method, url, err);
            return Err(err);
        }

        serde_json::from_slice(&body).map_err(|e| {
            log::warn!("{} {} returned an undecodable body: {}", method, url, e);
            Error::DataShape(format!("failed to decode response: {e}"))
        })
    }

    fn connectivity_error(&self, err: &reqwest::Error) -> Error {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else {
            err.to_string()
        };

        Error::Connectivity {
            base_url: self.base_url.clone(),
            reason,
        }
    }
}

fn application_error(status: u16, body: &[u8]) -> Error {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());

    Error::Application { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;

    #[test]
    fn test_application_error_uses_server_message() {
        let err = application_error(404, br#"{"error": "Question not found"}"#);
        assert!(matches!(
            err,
            Error::Application { status: 404, ref message } if message == "Question not found"
        ));
    }

    #[test]
    fn test_application_error_generic_message() {
        let err = application_error(502, b"<html>Bad Gateway</html>");
        assert!(matches!(
            err,
            Error::Application { status: 502, ref message } if message == "Unknown error"
        ));
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let router = Router::new().route(
            "/api/v1/ping",
            get(|| async { Json(json!({"ok": true})) }),
        );
        let client = test_support::client(&test_support::spawn(router).await);

        let body: Value = client.get("/ping", &[]).await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_application_error() {
        let router = Router::new().route(
            "/api/v1/questions/{id}",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "Question not found"})),
                )
            }),
        );
        let client = test_support::client(&test_support::spawn(router).await);

        let err = client.get::<Value>("/questions/7", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Application { status: 404, ref message } if message == "Question not found"
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_data_shape_error() {
        let router = Router::new().route("/api/v1/ping", get(|| async { "not json" }));
        let client = test_support::client(&test_support::spawn(router).await);

        let err = client.get::<Value>("/ping", &[]).await.unwrap_err();
        assert!(matches!(err, Error::DataShape(_)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_connectivity_error() {
        let base_url = test_support::unreachable_base_url().await;
        let client = test_support::client(&base_url);

        let err = client.get::<Value>("/questions", &[]).await.unwrap_err();
        assert!(err.is_connectivity());
        assert!(err.to_string().contains(&base_url));
    }

    #[tokio::test]
    async fn test_timeout_is_connectivity_error() {
        let router = Router::new().route(
            "/api/v1/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({}))
            }),
        );
        let base_url = test_support::spawn(router).await;
        let config = ApiConfig::new(base_url, Duration::from_millis(200)).unwrap();
        let client = ApiClient::new(&config).unwrap();

        let err = client.get::<Value>("/slow", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Connectivity { ref reason, .. } if reason == "request timed out"
        ));
    }
}
