//! Backend API client using reqwest

use pear_core::{ApiConfig, ApiToken, TOKEN_ENV};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::{ApiError, Result};

/// Bearer token sent with every request
#[derive(Clone)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Wrap a bearer token, rejecting blank tokens
    pub fn bearer(token: impl Into<String>) -> Result<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(ApiError::Auth("API token is empty".to_string()));
        }
        Ok(Self { token })
    }

    /// Resolve the token from PEAR_TOKEN or `~/.config/pear/secrets.toml`
    pub fn resolve() -> Result<Self> {
        let token = ApiToken::resolve()
            .map_err(|e| ApiError::Auth(e.to_string()))?
            .ok_or_else(|| {
                ApiError::Auth(format!(
                    "API token not found. Set {} or run `pear init-secrets` and add it there",
                    TOKEN_ENV
                ))
            })?;
        debug!(source = %token.source(), "Using API token");
        Ok(Self::from(token))
    }

    fn header_value(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl From<ApiToken> for Credentials {
    fn from(token: ApiToken) -> Self {
        Self {
            token: token.as_str().to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .finish()
    }
}

/// `{ "content": ..., "error": ... }` wrapper used by the backend
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    content: Option<T>,
    error: Option<String>,
}

/// Error bodies use `error` on most endpoints and `message` on a few
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// REST client for the review backend
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
}

impl ApiClient {
    /// Create a client for the backend described by `config`
    pub fn new(config: &ApiConfig, credentials: Credentials) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pear/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(base_url = %base_url, "Created API client");

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Create a client with a token resolved from the environment or secrets file
    pub fn from_environment(config: &ApiConfig) -> Result<Self> {
        Self::new(config, Credentials::resolve()?)
    }

    /// Get the normalized base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `/api/<segments...>` under the base URL
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        build_endpoint(&self.base_url, segments)
    }

    /// GET an endpoint and decode its JSON body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let body = self.get_text(segments).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET an endpoint that wraps its payload in `{ "content": ... }`
    pub(crate) async fn get_content<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        fallback: &str,
    ) -> Result<T> {
        let body = self.get_text(segments).await?;
        decode_content(&body, fallback)
    }

    /// POST a JSON body, discarding the success response
    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<()> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "POST");

        let response = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.header_value())
            .json(body)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    async fn get_text(&self, segments: &[&str]) -> Result<String> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.credentials.header_value())
            .send()
            .await?;

        check_status(response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Read the body, turning non-2xx responses into [`ApiError::Status`]
async fn check_status(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    Ok(body)
}

/// Backend error text, or a generic message naming the status
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16()))
}

/// Unwrap `{ "content": ... }`, using the body's `error` or `fallback` if absent
fn decode_content<T: DeserializeOwned>(body: &str, fallback: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    envelope
        .content
        .ok_or_else(|| ApiError::MissingContent(envelope.error.unwrap_or_else(|| fallback.to_string())))
}

/// Parse a base URL and make sure its path ends in `/`
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn build_endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .push("api")
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_endpoint_on_bare_host() {
        let base = parse_base_url("http://localhost").unwrap();
        let url = build_endpoint(&base, &["code_path", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/code_path/42");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let base = parse_base_url("https://school.example/pear").unwrap();
        let url = build_endpoint(&base, &["submit_review"]).unwrap();
        assert_eq!(url.as_str(), "https://school.example/pear/api/submit_review");
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let base = parse_base_url("http://localhost:5000/").unwrap();
        let url = build_endpoint(&base, &["review_code", "7/../admin"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/review_code/7%2F..%2Fadmin"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(parse_base_url("not a url"), Err(ApiError::Url(_))));
        assert!(matches!(
            parse_base_url("mailto:admin@school.example"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_error_message_prefers_backend_text() {
        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"error": "No code found"}"#);
        assert_eq!(msg, "No code found");

        let msg = error_message(StatusCode::BAD_REQUEST, r#"{"message": "submission created"}"#);
        assert_eq!(msg, "submission created");
    }

    #[test]
    fn test_error_message_fallback() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(msg, "HTTP error! Status: 500");

        let msg = error_message(StatusCode::UNAUTHORIZED, r#"{"msg": "Missing Authorization Header"}"#);
        assert_eq!(msg, "HTTP error! Status: 401");
    }

    #[test]
    fn test_decode_content_string() {
        let code: String = decode_content(r#"{"content": "print(1)\n"}"#, "Failed").unwrap();
        assert_eq!(code, "print(1)\n");
    }

    #[test]
    fn test_decode_content_mapping() {
        let comments: BTreeMap<String, String> =
            decode_content(r#"{"content": {"3": "rename"}}"#, "Failed").unwrap();
        assert_eq!(comments.get("3").map(String::as_str), Some("rename"));
    }

    #[test]
    fn test_decode_content_missing() {
        let err = decode_content::<String>(r#"{"error": "No code path found"}"#, "Failed to fetch code")
            .unwrap_err();
        assert_eq!(err.to_string(), "No code path found");

        let err = decode_content::<String>("{}", "Failed to fetch code").unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch code");

        assert!(matches!(
            decode_content::<String>("[1, 2]", "x"),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert!(matches!(Credentials::bearer("  "), Err(ApiError::Auth(_))));
        let creds = Credentials::bearer(" abc ").unwrap();
        assert_eq!(creds.header_value(), "Bearer abc");
        assert!(!format!("{:?}", creds).contains("abc"));
    }

    #[test]
    fn test_credentials_from_resolved_token() {
        let token = ApiToken::resolve_from(Some(" env-token ".to_string()), None)
            .unwrap()
            .unwrap();
        let creds = Credentials::from(token);
        assert_eq!(creds.header_value(), "Bearer env-token");
    }

    #[test]
    fn test_client_debug_hides_token() {
        let client = ApiClient::new(
            &ApiConfig::default(),
            Credentials::bearer("secret-token").unwrap(),
        )
        .unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("http://localhost/"));
        assert!(!debug.contains("secret-token"));
    }
}
