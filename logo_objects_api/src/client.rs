//! HTTP client for the Logo Objects REST API.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{
    auth::{AccessToken, TokenCache, TokenResponse},
    config::{ApiClientConfig, AuthConfig, ConfigError},
    entity::{Entity, EntityClient},
    errors::{classify, ApiError, TransportFailure},
    query::{Query, QueryOptions},
};

const USER_AGENT: &str = concat!("logo-objects-api/", env!("CARGO_PKG_VERSION"));

/// One request as issued by a caller. Owned by the call that builds it.
///
/// The body is held as a JSON value so every retry sends the same payload.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
    /// Whether auth headers are attached. Only the reachability check turns this off.
    pub authenticated: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            authenticated: true,
        }
    }

    pub fn with_query(mut self, query: &impl Query) -> Self {
        let qs = query.to_query_string();
        self.query = if qs.is_empty() { None } else { Some(qs) };
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Request dispatcher for one configured API endpoint.
///
/// Owns a single `reqwest::Client` built at construction; its headers and
/// timeout never change afterwards, so one `ApiClient` can serve concurrent
/// calls. Transient failures (network errors, 5xx) are retried with a constant
/// delay; everything else is returned on first occurrence.
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiClientConfig,
    tokens: TokenCache,
}

impl Clone for ApiClient {
    /// The clone copies the configuration and starts with an empty token cache.
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            tokens: TokenCache::default(),
        }
    }
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ConfigError> {
        let http = build_transport(&config)?;
        Ok(Self {
            http,
            config,
            tokens: TokenCache::default(),
        })
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    /// Typed client for one entity endpoint.
    pub fn entity<E: Entity>(&self) -> EntityClient<'_, E> {
        EntityClient::new(self)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: Option<&QueryOptions>,
    ) -> Result<T, ApiError> {
        let mut descriptor = RequestDescriptor::new(Method::GET, path);
        if let Some(options) = options {
            descriptor = descriptor.with_query(options);
        }
        self.request(descriptor).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PATCH, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(RequestDescriptor::new(Method::DELETE, path))
            .await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::other("Failed to serialize request body", e))?;
        self.request(RequestDescriptor::new(method, path).with_body(body))
            .await
    }

    /// Issues the request, retrying transient failures up to `config.retries()` times.
    ///
    /// On success the body is decoded into `T` as-is; an empty body decodes
    /// from JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ApiError> {
        let url = self.resolve_url(&descriptor.path, descriptor.query.as_deref())?;
        let max_retries = self.config.retries();
        let mut attempt = 0u32;

        let (status, body) = loop {
            tracing::debug!(
                "{} {} (attempt {}/{})",
                descriptor.method,
                url,
                attempt + 1,
                max_retries + 1
            );
            match self.attempt(&descriptor, &url).await {
                Ok(ok) => break ok,
                Err(err) => {
                    if err.is_retryable() && attempt < max_retries {
                        attempt += 1;
                        let delay = self.config.retry_delay();
                        tracing::warn!(
                            "{} {} failed (retry {}/{}), retrying in {:.1}s: {}",
                            descriptor.method,
                            descriptor.path,
                            attempt,
                            max_retries,
                            delay.as_secs_f64(),
                            err
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    tracing::error!(
                        "{} {} failed: {} | body: {}",
                        descriptor.method,
                        descriptor.path,
                        err,
                        err.body()
                            .map(|b| truncate_body(&b.to_string()))
                            .unwrap_or_default()
                    );
                    return Err(err);
                }
            }
        };

        decode_body(status, &body)
    }

    /// One attempt: returns the status and raw body of a 2xx response.
    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
        url: &Url,
    ) -> Result<(StatusCode, String), ApiError> {
        let mut request = self.http.request(descriptor.method.clone(), url.clone());
        let mut bearer = None;
        if descriptor.authenticated {
            bearer = self.bearer_token().await?;
        }
        if let Some(token) = &bearer {
            request = request.bearer_auth(&token.value);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        let result = self.execute(request).await;
        if let (Err(ApiError::Authentication { .. }), Some(token)) = (&result, &bearer) {
            self.tokens.clear_if(&token.value).await;
        }
        result
    }

    /// Sends the request and reads the body; non-2xx answers become classified errors.
    async fn execute(&self, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| classify(transport_failure(e)))?;

        let status = response.status();
        let retry_after_header = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response
            .text()
            .await
            .map_err(|e| classify(transport_failure(e)))?;

        if !status.is_success() {
            return Err(classify(TransportFailure::Response {
                status: status.as_u16(),
                body: parse_body(&body),
                retry_after_header,
            }));
        }
        Ok((status, body))
    }

    /// The token to send with an authenticated call, if the auth variant uses one.
    async fn bearer_token(&self) -> Result<Option<AccessToken>, ApiError> {
        match self.config.auth() {
            AuthConfig::GrantType { .. } => Ok(Some(self.access_token().await?)),
            // The API key travels as a default header of the transport.
            AuthConfig::ApiKey { .. } | AuthConfig::None => Ok(None),
        }
    }

    /// Returns the cached token, exchanging credentials when there is none or it expired.
    pub async fn access_token(&self) -> Result<AccessToken, ApiError> {
        let mut slot = self.tokens.lock().await;
        if let Some(token) = slot.as_ref() {
            if token.is_valid_at(chrono::Utc::now()) {
                return Ok(token.clone());
            }
        }
        let token = self.exchange_token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Forgets the cached token; the next authenticated call exchanges again.
    pub async fn clear_token(&self) {
        self.tokens.clear().await;
    }

    async fn exchange_token(&self) -> Result<AccessToken, ApiError> {
        let AuthConfig::GrantType {
            username,
            password,
            firm,
            basic_auth,
        } = self.config.auth()
        else {
            return Err(ApiError::other(
                "Token exchange requires grant-type credentials",
                "no grant-type credentials configured",
            ));
        };

        let url = self.resolve_url(self.config.token_path(), None)?;
        tracing::debug!("Exchanging credentials for {} at {}", username, url);
        let request = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Basic {}", basic_auth))
            .form(&[
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("firmno", firm.as_str()),
                ("password", password.as_str()),
            ]);

        let (_, body) = self.execute(request).await?;
        let resp: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Failed to parse token response: {} | body: {}",
                e,
                truncate_body(&body)
            );
            ApiError::other("Failed to parse token response", e)
        })?;
        Ok(AccessToken::from_response(resp, chrono::Utc::now()))
    }

    /// Reachability check without credentials. Errors are logged and reported as `false`.
    pub async fn ping(&self) -> bool {
        let descriptor =
            RequestDescriptor::new(Method::GET, self.config.health_path()).unauthenticated();
        match self.request::<Value>(descriptor).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Ping failed: {}", err);
                false
            }
        }
    }

    /// Checks that the configured credentials are accepted. Errors are logged and
    /// reported as `false`.
    pub async fn is_token_valid(&self) -> bool {
        let descriptor = RequestDescriptor::new(Method::GET, self.config.health_path());
        match self.request::<Value>(descriptor).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!("Credential check failed: {}", err);
                false
            }
        }
    }

    fn resolve_url(&self, path: &str, query: Option<&str>) -> Result<Url, ApiError> {
        let base = self.config.base_url().as_str().trim_end_matches('/');
        let raw = if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };
        let mut url = Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            ApiError::other(format!("Invalid request URL {}", raw), e)
        })?;
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        Ok(url)
    }
}

fn build_transport(config: &ApiClientConfig) -> Result<reqwest::Client, ConfigError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let AuthConfig::ApiKey { header, key } = config.auth() {
        let name = HeaderName::from_bytes(header.as_bytes()).map_err(|_| {
            ConfigError::InvalidHeader {
                name: header.clone(),
            }
        })?;
        let mut value = HeaderValue::from_str(key).map_err(|_| ConfigError::InvalidHeader {
            name: header.clone(),
        })?;
        value.set_sensitive(true);
        headers.insert(name, value);
    }

    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(config.timeout())
        .build()?)
}

/// Failures without a response are connection-level; the rest are wrapped as-is.
fn transport_failure(err: reqwest::Error) -> TransportFailure {
    if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
        TransportFailure::Connection(err)
    } else {
        TransportFailure::Other(Box::new(err))
    }
}

/// Error bodies are kept as JSON when they parse, otherwise as a JSON string.
fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let parsed = if body.trim().is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_str(body)
    };
    parsed.map_err(|e| {
        tracing::error!(
            "Failed to parse response: {} | body: {}",
            e,
            truncate_body(body)
        );
        ApiError::Api {
            message: "Failed to decode response body".to_string(),
            status: status.as_u16(),
            body: parse_body(body),
            source: Some(Box::new(e)),
        }
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
