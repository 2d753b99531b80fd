//! Treasury backend HTTP client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{AppError, Result};

/// Path prefix shared by every backend resource.
pub const API_PREFIX: &str = "/api/v1";

/// Query parameters in the order they are sent.
pub type QueryParams = Vec<(String, String)>;

/// Treasury backend REST client.
///
/// Communicates with the backend over JSON and authenticates with a bearer token once
/// a session is installed. Cloning is cheap; clones share the connection pool but each
/// keeps its own token.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `config` - Server URL (e.g., "https://treasury.example.org") and timeout
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Install or remove the bearer token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Server root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for a resource path such as `/students/3`.
    pub fn url(&self, path: &str) -> String {
        format!("{base}{API_PREFIX}{path}", base = self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// `GET` a resource and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(String, String)]) -> Result<T> {
        let url = self.url(path);
        debug!("GET {url} {query:?}");
        let response = self.authorize(self.client.get(&url).query(query)).send().await?;
        decode(response).await
    }

    /// `POST` a JSON body and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!("POST {url}");
        let response = self.authorize(self.client.post(&url).json(body)).send().await?;
        decode(response).await
    }

    /// `POST` a JSON body, ignoring any response body.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let url = self.url(path);
        debug!("POST {url}");
        let response = self.authorize(self.client.post(&url).json(body)).send().await?;
        check_status(response).await.map(|_| ())
    }

    /// `DELETE` a resource.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        debug!("DELETE {url}");
        let response = self.authorize(self.client.delete(&url)).send().await?;
        check_status(response).await.map(|_| ())
    }

    /// Test connection to the server.
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self.client.get(&self.base_url).send().await?;
        Ok(!response.status().is_server_error())
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Extract the backend's error text from an error body.
///
/// Spring-style bodies carry `message`, some handlers only `error`; a plain-text body is
/// used verbatim. Falls back to the HTTP reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str())
                && !text.trim().is_empty()
            {
                return text.to_string();
            }
        }
    } else if !body.trim().is_empty() && body.len() < 300 {
        return body.trim().to_string();
    }

    format!(
        "Request failed: {status} {reason}",
        status = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Unknown")
    )
}
