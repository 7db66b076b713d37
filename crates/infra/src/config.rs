//! Configuration loading and representation.

/// Default Redis endpoint when `REDIS_URL` is unset.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Default key namespace Resque writes under.
pub const DEFAULT_NAMESPACE: &str = "resque";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Where to find the queue system's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub url: String,
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl RedisConfig {
    /// Read `REDIS_URL` and `RESQUE_NAMESPACE`, falling back to defaults.
    ///
    /// Not validated, so callers can apply overrides first and then call
    /// [`RedisConfig::validated`] once.
    pub fn from_env() -> Self {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        let namespace =
            std::env::var("RESQUE_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());
        Self::default().with_url(url).with_namespace(namespace)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Reject settings that cannot address a Resque keyspace.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid("redis url must not be empty".into()));
        }
        let namespace = self.namespace.trim_end_matches(':').to_string();
        if namespace.is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".into()));
        }
        Ok(Self { namespace, ..self })
    }
}
