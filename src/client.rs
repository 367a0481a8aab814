use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::storage::{AuthCookie, FileStore, KeyValueStore, SessionStorage};

/// HTTP access to the TodoFlow backend.
///
/// Every request carries the stored bearer token and the auth cookie. Every
/// response is inspected for a rotated `access_token`. A 401 from any
/// endpoint wipes the stored identity and comes back as
/// [`ApiError::Unauthorized`]; deciding where to navigate is left to the caller.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    storage: SessionStorage,
}

impl ApiClient {
    pub fn new(config: ClientConfig, durable: Box<dyn KeyValueStore>) -> Result<Self> {
        let cookie = AuthCookie::new(config.base_url.clone());

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .cookie_provider(cookie.jar())
            .build()?;

        Ok(Self {
            http,
            config,
            storage: SessionStorage::new(durable, cookie),
        })
    }

    /// Client backed by the `session.json` file in the configured data directory.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let store = FileStore::open(config.session_file())?;
        Self::new(config, Box::new(store))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.request(Method::GET, path)?).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.dispatch(self.request(Method::POST, path)?.json(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.request(Method::POST, path)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.dispatch(self.request(Method::PUT, path)?.json(body)).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.dispatch(self.request(Method::PATCH, path)?.json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.dispatch(self.request(Method::DELETE, path)?).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.config.endpoint(path)?;
        log::info!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.storage.resolve_token() {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn dispatch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(|e| {
            log::error!("Failed to send request: {}", e);
            e
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            log::error!("Failed to get response text: {}", e);
            e
        })?;

        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Backend answered 401, clearing session");
            self.storage.clear();
            return Err(ApiError::Unauthorized {
                detail: extract_detail(&response_text),
            });
        }

        if !status.is_success() {
            log::error!("Server returned {}: {}", status, response_text);
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: extract_detail(&response_text),
            });
        }

        let json_value: Value = if response_text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response_text).map_err(|e| {
                log::error!("Failed to parse response as JSON: {}", e);
                e
            })?
        };

        if let Some(token) = json_value.get("access_token").and_then(Value::as_str) {
            log::info!("Response carried a fresh access token, persisting it");
            self.storage.rotate_token(token)?;
        }

        Ok(serde_json::from_value(json_value)?)
    }
}

/// Pulls FastAPI's `detail` field out of an error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
