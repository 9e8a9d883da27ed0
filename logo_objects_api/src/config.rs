//! Client configuration: auth variant, timeouts and retry policy.

use std::fmt;
use std::time::Duration;

use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
pub const DEFAULT_TOKEN_PATH: &str = "/api/v1/token";
pub const DEFAULT_HEALTH_PATH: &str = "/api/v1";

const TIMEOUT_MS_RANGE: (u64, u64) = (1_000, 300_000);
const RETRIES_RANGE: (u32, u32) = (0, 10);
const RETRY_DELAY_MS_RANGE: (u64, u64) = (100, 10_000);

/// Errors raised while building or validating a configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("Both API key and username/password credentials are configured")]
    ConflictingAuth,
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Environment variable {name} is not a valid number: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("Invalid header {name:?}")]
    InvalidHeader { name: String },
    #[error("Failed to build HTTP transport")]
    Transport(#[from] reqwest::Error),
}

/// How requests authenticate. Exactly one variant applies per client.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum AuthConfig {
    #[default]
    None,
    /// A static key sent in `header` on every request.
    ApiKey { header: String, key: String },
    /// Password grant against the token endpoint; the access token is sent as a bearer.
    GrantType {
        username: String,
        password: String,
        firm: String,
        /// Pre-encoded client credentials for the token request's `Authorization: Basic`.
        basic_auth: String,
    },
}

impl AuthConfig {
    pub fn api_key(key: impl Into<String>) -> Self {
        AuthConfig::ApiKey {
            header: DEFAULT_API_KEY_HEADER.to_string(),
            key: key.into(),
        }
    }

    pub fn grant_type(
        username: impl Into<String>,
        password: impl Into<String>,
        firm: impl Into<String>,
        basic_auth: impl Into<String>,
    ) -> Self {
        AuthConfig::GrantType {
            username: username.into(),
            password: password.into(),
            firm: firm.into(),
            basic_auth: basic_auth.into(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self {
            AuthConfig::None => Ok(()),
            AuthConfig::ApiKey { header, key } => {
                non_empty("api key header", header)?;
                non_empty("api key", key)
            }
            AuthConfig::GrantType {
                username,
                password,
                firm,
                basic_auth,
            } => {
                non_empty("username", username)?;
                non_empty("password", password)?;
                non_empty("firm", firm)?;
                non_empty("basic auth", basic_auth)
            }
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthConfig::None => write!(f, "None"),
            AuthConfig::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .field("key", &"***")
                .finish(),
            AuthConfig::GrantType { username, firm, .. } => f
                .debug_struct("GrantType")
                .field("username", username)
                .field("password", &"***")
                .field("firm", firm)
                .field("basic_auth", &"***")
                .finish(),
        }
    }
}

/// Validated, immutable client configuration.
///
/// Built through [`ApiClientConfig::builder`] or [`ApiClientConfig::from_env`];
/// both reject out-of-range values, so a value of this type is always usable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiClientConfig {
    base_url: Url,
    auth: AuthConfig,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
    token_path: String,
    health_path: String,
}

impl ApiClientConfig {
    pub fn builder(base_url: &str) -> ApiClientConfigBuilder {
        ApiClientConfigBuilder::new(base_url)
    }

    /// Reads the configuration from `LOGO_*` environment variables.
    ///
    /// `LOGO_API_KEY` selects the API-key variant, `LOGO_USERNAME` the grant
    /// variant (which then also needs `LOGO_PASSWORD`, `LOGO_FIRM` and
    /// `LOGO_BASIC_AUTH`); setting both is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_var("LOGO_BASE_URL").ok_or(ConfigError::MissingEnv("LOGO_BASE_URL"))?;
        let mut builder = ApiClientConfigBuilder::new(&base_url);

        let api_key = env_var("LOGO_API_KEY");
        let username = env_var("LOGO_USERNAME");
        builder = match (api_key, username) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingAuth),
            (Some(key), None) => builder.auth(AuthConfig::ApiKey {
                header: env_var("LOGO_API_KEY_HEADER")
                    .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
                key,
            }),
            (None, Some(username)) => builder.auth(AuthConfig::GrantType {
                username,
                password: required_env("LOGO_PASSWORD")?,
                firm: required_env("LOGO_FIRM")?,
                basic_auth: required_env("LOGO_BASIC_AUTH")?,
            }),
            (None, None) => builder,
        };

        if let Some(ms) = env_u64("LOGO_TIMEOUT_MS")? {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(retries) = env_u64("LOGO_RETRIES")? {
            builder = builder.retries(u32::try_from(retries).unwrap_or(u32::MAX));
        }
        if let Some(ms) = env_u64("LOGO_RETRY_DELAY_MS")? {
            builder = builder.retry_delay(Duration::from_millis(ms));
        }

        builder.build()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retries after the first attempt; a call makes at most `retries + 1` attempts.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn token_path(&self) -> &str {
        &self.token_path
    }

    pub fn health_path(&self) -> &str {
        &self.health_path
    }
}

/// Builder for [`ApiClientConfig`]; all checks run in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct ApiClientConfigBuilder {
    base_url: String,
    auth: AuthConfig,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
    token_path: String,
    health_path: String,
}

impl ApiClientConfigBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            auth: AuthConfig::None,
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn token_path(mut self, path: &str) -> Self {
        self.token_path = path.to_string();
        self
    }

    pub fn health_path(mut self, path: &str) -> Self {
        self.health_path = path.to_string();
        self
    }

    pub fn build(self) -> Result<ApiClientConfig, ConfigError> {
        let base_url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url,
                reason: format!("unsupported scheme {}", base_url.scheme()),
            });
        }

        check_range(
            "timeout (ms)",
            duration_ms(self.timeout),
            TIMEOUT_MS_RANGE,
        )?;
        check_range(
            "retries",
            self.retries.into(),
            (RETRIES_RANGE.0.into(), RETRIES_RANGE.1.into()),
        )?;
        check_range(
            "retry delay (ms)",
            duration_ms(self.retry_delay),
            RETRY_DELAY_MS_RANGE,
        )?;
        self.auth.validate()?;

        Ok(ApiClientConfig {
            base_url,
            auth: self.auth,
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            token_path: self.token_path,
            health_path: self.health_path,
        })
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn check_range(name: &'static str, value: u64, (min, max): (u64, u64)) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn non_empty(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty(name));
    }
    Ok(())
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required_env(key: &'static str) -> Result<String, ConfigError> {
    env_var(key).ok_or(ConfigError::MissingEnv(key))
}

fn env_u64(key: &'static str) -> Result<Option<u64>, ConfigError> {
    env_var(key)
        .map(|val| {
            val.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                name: key,
                value: val.clone(),
            })
        })
        .transpose()
}
