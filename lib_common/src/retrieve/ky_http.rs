//! # HTTP Retrieval Utilities
//!
//! This module provides an asynchronous API client wrapper around `reqwest`.
//! Requests go out exactly once: no retry middleware is attached. Credentials
//! travel as a query parameter, so every error leaving this module has the
//! request URL stripped from it.

use anyhow::{anyhow, Context};
use reqwest::{Method, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde::de::DeserializeOwned;

/// A standardized container for API responses.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
}

/// A query parameter appended to every request, such as `token=<key>`.
#[derive(Clone)]
pub struct QueryToken {
    /// Parameter name.
    pub name: String,
    /// Parameter value. Never logged.
    pub value: String,
}

impl std::fmt::Debug for QueryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryToken").field("name", &self.name).field("value", &"***").finish()
    }
}

/// Asynchronous HTTP client bound to one base URL.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
    /// Optional credential added to every request.
    token: Option<QueryToken>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "https://api.example.com/v1/").
    /// * `token` - Optional query-parameter credential.
    ///
    /// # Errors
    /// Returns an error if the `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str, token: Option<QueryToken>) -> anyhow::Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("Invalid base URL (must be absolute): {}", base_url))?;

        Ok(Self {
            inner: ClientBuilder::new(reqwest::Client::new()).build(),
            base_url: url,
            token,
        })
    }

    /// Performs a `GET` and handles the response.
    ///
    /// # Arguments
    /// * `path` - The relative path to append to the base URL.
    /// * `query` - Query parameters; values are percent-encoded. The token goes last.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining, network execution or
    /// decoding of a successful body fails. A non-2xx status is not an error.
    /// Error text names `path` only, never the full URL.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<ApiResponse<T>> {
        // 1. Construct the full absolute URL (no query yet, so safe to log)
        let full_url = self.base_url.join(path)?;
        log::debug!("{} {}", Method::GET, full_url);
        let mut req = self.inner.get(full_url);

        // 2. Query parameters, credentials last
        let mut params: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if let Some(QueryToken { name, value }) = &self.token {
            params.push((name.as_str(), value.as_str()));
        }
        if !params.is_empty() {
            req = req.query(&params);
        }

        // 3. Execute the request and capture response metadata
        let response = req.send().await.map_err(|e| match e {
            reqwest_middleware::Error::Reqwest(e) => redact(path, e),
            reqwest_middleware::Error::Middleware(e) => e.context(format!("Request to {} failed", path)),
        })?;
        let status = response.status();

        // 4. Handle the result based on success status
        if status.is_success() {
            let data = response.json::<T>().await.map_err(|e| redact(path, e))?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
            })
        }
    }
}

/// Drops the request URL (and with it the query token) from a reqwest error.
fn redact(path: &str, e: reqwest::Error) -> anyhow::Error {
    anyhow!(e.without_url()).context(format!("Request to {} failed", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::RawQuery, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v1/", addr)
    }

    fn echo_router() -> Router {
        Router::new()
            .route("/api/v1/echo", get(|RawQuery(q): RawQuery| async move { Json(json!({ "query": q })) }))
            .route("/api/v1/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
            .route("/api/v1/garbage", get(|| async { "<html>not json</html>" }))
    }

    fn token(value: &str) -> Option<QueryToken> {
        Some(QueryToken { name: "token".into(), value: value.into() })
    }

    #[tokio::test]
    async fn query_params_and_token_are_appended() {
        let base = spawn(echo_router()).await;
        let api = ApiClient::new(&base, token("secret")).unwrap();

        let res = api.get::<Value>("echo", &[("q", "A&B".to_string())]).await.unwrap();
        assert!(res.success);
        assert_eq!(res.data.unwrap()["query"], "q=A%26B&token=secret");
    }

    #[tokio::test]
    async fn non_success_is_not_an_error() {
        let base = spawn(echo_router()).await;
        let api = ApiClient::new(&base, None).unwrap();
        let res = api.get::<Value>("missing", &[]).await.unwrap();
        assert!(!res.success);
        assert_eq!(res.status, 404);
        assert_eq!(res.error_body.as_deref(), Some("nope"));
    }

    #[tokio::test]
    async fn connect_error_hides_token() {
        let api = ApiClient::new("http://127.0.0.1:9/api/v1/", token("SECRET-KEY-123")).unwrap();
        let err = api.get::<Value>("quote", &[("symbol", "AAPL".to_string())]).await.unwrap_err();
        let text = format!("{:#}", err);
        assert!(text.starts_with("Request to quote failed"), "{}", text);
        assert!(!text.contains("SECRET-KEY-123"), "{}", text);
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }

    #[tokio::test]
    async fn body_decode_error_hides_token() {
        let base = spawn(echo_router()).await;
        let api = ApiClient::new(&base, token("SECRET-KEY-123")).unwrap();
        let err = api.get::<Value>("garbage", &[]).await.unwrap_err();
        assert!(!format!("{:#}", err).contains("SECRET-KEY-123"));
        assert!(!format!("{:?}", err).contains("SECRET-KEY-123"));
    }

    #[test]
    fn token_value_is_masked_in_debug() {
        let t = QueryToken { name: "token".into(), value: "SECRET-KEY-123".into() };
        assert!(!format!("{:?}", t).contains("SECRET"));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        assert!(ApiClient::new("not a url", None).is_err());
    }
}
