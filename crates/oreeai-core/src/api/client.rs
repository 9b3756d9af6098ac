//! API client for communicating with the OreeAI backend.
//!
//! This module provides the `ApiClient` struct for making authenticated
//! requests, and the `Backend` trait that the data service is written
//! against so it can be exercised without a network.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{header, Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{SessionData, SessionUser};
use crate::models::raw::{value_to_string, RawRecord};

use super::routes::backend_url;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fallback message when the login endpoint rejects without a body.
const LOGIN_FAILED_MESSAGE: &str = "Login failed";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    client: Value,
}

/// Transport used by the data service.
///
/// Paths are logical API paths (see `routes::backend_path`). Implementations
/// must treat a 404 from `get_optional` as `Ok(None)` and every other non-2xx
/// status as an error carrying the response body.
pub trait Backend: Send + Sync {
    /// GET a JSON document, with optional query parameters.
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value>> + Send;

    /// GET a JSON document that may legitimately not exist.
    fn get_optional(&self, path: &str) -> impl Future<Output = Result<Option<Value>>> + Send;

    /// Send a write request and return the decoded response body
    /// (`Value::Null` for empty bodies).
    fn send_json(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// API client for the OreeAI backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: impl Into<Arc<str>>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: impl Into<Arc<str>>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: Arc::clone(&self.base_url),
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        backend_url(&self.base_url, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Decode a successful response body. 204 and empty bodies become `Null`.
    async fn read_json(response: reqwest::Response, url: &str) -> Result<Value> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Authenticate with email and password and return session data
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionData> {
        let url = self.url("/client/login");
        debug!(url = %url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send login request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                LOGIN_FAILED_MESSAGE.to_string()
            } else {
                body
            };
            return Err(ApiError::from_status(status, &message)).context(LOGIN_FAILED_MESSAGE);
        }

        let login: LoginResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        let client = RawRecord::new(&login.client);
        let user = SessionUser {
            id: client
                .first_present(&["id"])
                .map(value_to_string)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            email: client.str_or(&["email"], email),
            name: client
                .first_str(&["company_name", "companyName"])
                .unwrap_or_else(|| email_local_part(email)),
        };

        Ok(SessionData {
            token: login.token,
            user,
            created_at: Utc::now(),
        })
    }

    /// Invalidate the current token on the backend.
    pub async fn logout(&self) -> Result<()> {
        if self.token.is_none() {
            return Ok(());
        }
        let url = self.url("/client/logout");
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .context("Failed to send logout request")?;

        if let Err(e) = Self::check_response(response).await {
            warn!(error = %e, "Logout request rejected");
        }
        Ok(())
    }
}

/// The part of an email address before `@`.
pub(crate) fn email_local_part(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

impl Backend for ApiClient {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, params = query.len(), "GET");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        Self::read_json(response, &url).await
    }

    async fn get_optional(&self, path: &str) -> Result<Option<Value>> {
        let url = self.url(path);
        debug!(url = %url, "GET (optional)");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(url = %url, "Resource not found");
            return Ok(None);
        }

        let response = Self::check_response(response).await?;
        match Self::read_json(response, &url).await? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn send_json(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path);
        debug!(url = %url, method = %method, "Sending request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .headers(self.auth_headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send {} request to {}", method, url))?;

        let response = Self::check_response(response).await?;
        Self::read_json(response, &url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token_shares_base_url() {
        let api = ApiClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:8000/api");
        assert!(api.token().is_none());

        let authed = api.with_token("abc.def.ghi");
        assert_eq!(authed.token(), Some("abc.def.ghi"));
        assert_eq!(authed.base_url(), api.base_url());
    }

    #[test]
    fn test_url_applies_route_mapping() {
        let api = ApiClient::new("https://api.example.com").unwrap();
        assert_eq!(api.url("/stats"), "https://api.example.com/client/stats");
        assert_eq!(api.url("/leads/5"), "https://api.example.com/leads/5");
    }

    #[test]
    fn test_auth_headers_include_bearer_when_set() {
        let mut api = ApiClient::new("http://localhost").unwrap();
        let headers = api.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());

        api.set_token("tok");
        let headers = api.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok");

        api.clear_token();
        assert!(api.auth_headers().unwrap().get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // nothing listens on port 1
        let api = ApiClient::new("http://127.0.0.1:1").unwrap();
        let err = api.authenticate("ana@acme.com", "secret").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NetworkError(_))
        ));

        let err = api.get_json("/leads", &[]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::NetworkError(_))
        ));
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("ana@acme.com"), "ana");
        assert_eq!(email_local_part("plain"), "plain");
    }
}
