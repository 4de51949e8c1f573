//! Transport configuration.
//!
//! Mirrors a `services.infobip` application config block:
//!
//! ```json
//! {
//!     "api_key": "...",
//!     "base_url": "https://xyz.api.infobip.com",
//!     "http": { "connect_timeout": 10, "timeout": 30 }
//! }
//! ```
//!
//! The `http` block is also accepted under the key `guzzle`.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

/// Connect timeout applied when the config does not set one, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT: f64 = 60.0;

/// HTTP client options.
///
/// Timeouts are in seconds. A timeout of `0` disables it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpOptions {
    /// Time allowed to establish the connection.
    pub connect_timeout: Option<f64>,
    /// Time allowed for the whole request.
    pub timeout: Option<f64>,
    /// Treat non-2xx responses as errors (default: true).
    pub http_errors: Option<bool>,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl HttpOptions {
    /// Adds the default connect timeout if none is set. An explicit value,
    /// including `0`, is kept.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.connect_timeout.get_or_insert(DEFAULT_CONNECT_TIMEOUT);
        self
    }

    /// Whether non-2xx responses are errors.
    #[must_use]
    pub fn http_errors(&self) -> bool {
        self.http_errors.unwrap_or(true)
    }

    /// Builds a `reqwest` client from these options.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout is negative or not finite, the proxy
    /// URL is invalid, or the client cannot be built.
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder();

        if let Some(timeout) = seconds("connect_timeout", self.connect_timeout)? {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(timeout) = seconds("timeout", self.timeout)? {
            builder = builder.timeout(timeout);
        }

        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }

        Ok(builder.build()?)
    }
}

fn seconds(option: &str, value: Option<f64>) -> Result<Option<Duration>> {
    match value {
        None => Ok(None),
        Some(secs) if secs == 0.0 => Ok(None),
        Some(secs) => Duration::try_from_secs_f64(secs).map(Some).map_err(|_| {
            Error::InvalidConfig(format!(
                "{option} must be a non-negative number of seconds, got {secs}"
            ))
        }),
    }
}

/// Raw Infobip configuration as read from a config source.
///
/// Required values are optional here so a missing key is reported by
/// [`InfobipConfig::validate`] rather than by the deserializer.
#[derive(Clone, Default, Deserialize)]
pub struct InfobipConfig {
    /// API key sent as `Authorization: App <key>`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Account base URL, e.g. `https://xyz.api.infobip.com`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// HTTP client options.
    #[serde(default, alias = "guzzle")]
    pub http: HttpOptions,
}

impl InfobipConfig {
    /// Creates a configuration with the required values set.
    #[must_use]
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: Some(base_url.into()),
            http: HttpOptions::default(),
        }
    }

    /// Replaces the HTTP client options.
    #[must_use]
    pub fn with_http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Parses a `services.infobip` JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads `INFOBIP_API_KEY`, `INFOBIP_BASE_URL`,
    /// `INFOBIP_CONNECT_TIMEOUT` and `INFOBIP_TIMEOUT`.
    ///
    /// # Errors
    ///
    /// Returns an error if a timeout variable is not a number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let timeout = |key: &str| -> Result<Option<f64>> {
            lookup(key)
                .map(|value| {
                    value.trim().parse::<f64>().map_err(|_| {
                        Error::InvalidConfig(format!("{key} is not a number: {value}"))
                    })
                })
                .transpose()
        };

        Ok(Self {
            api_key: lookup("INFOBIP_API_KEY"),
            base_url: lookup("INFOBIP_BASE_URL"),
            http: HttpOptions {
                connect_timeout: timeout("INFOBIP_CONNECT_TIMEOUT")?,
                timeout: timeout("INFOBIP_TIMEOUT")?,
                ..HttpOptions::default()
            },
        })
    }

    /// Checks required values and applies defaults.
    ///
    /// A base URL without a scheme is taken as `https`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingConfig`] if `api_key` or `base_url` is
    /// missing or blank, or [`Error::Url`] if the base URL does not parse.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let api_key = non_blank(self.api_key.as_deref()).ok_or(Error::MissingConfig("api_key"))?;
        let base_url =
            non_blank(self.base_url.as_deref()).ok_or(Error::MissingConfig("base_url"))?;

        let base_url = if base_url.contains("://") {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("https://{base_url}"))?
        };

        Ok(ValidatedConfig {
            api_key: api_key.to_string(),
            base_url,
            http: self.http.clone().with_defaults(),
        })
    }
}

impl fmt::Debug for InfobipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfobipConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .finish()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Configuration with required values present and defaults applied.
#[derive(Clone)]
pub struct ValidatedConfig {
    /// API key.
    pub api_key: String,
    /// Account base URL.
    pub base_url: Url,
    /// HTTP client options with defaults applied.
    pub http: HttpOptions,
}

impl fmt::Debug for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("http", &self.http)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_connect_timeout_default_added() {
        let options = HttpOptions::default().with_defaults();
        assert_eq!(options.connect_timeout, Some(60.0));
    }

    #[test]
    fn test_explicit_connect_timeout_kept() {
        let options = HttpOptions {
            connect_timeout: Some(5.0),
            ..HttpOptions::default()
        }
        .with_defaults();
        assert_eq!(options.connect_timeout, Some(5.0));

        let disabled = HttpOptions {
            connect_timeout: Some(0.0),
            ..HttpOptions::default()
        }
        .with_defaults();
        assert_eq!(disabled.connect_timeout, Some(0.0));
    }

    #[test]
    fn test_http_errors_defaults_to_true() {
        assert!(HttpOptions::default().http_errors());
        let lenient = HttpOptions {
            http_errors: Some(false),
            ..HttpOptions::default()
        };
        assert!(!lenient.http_errors());
    }

    #[test]
    fn test_from_json_with_guzzle_alias() {
        let config = InfobipConfig::from_json(
            r#"{
                "api_key": "secret",
                "base_url": "https://xyz.api.infobip.com",
                "guzzle": { "connect_timeout": 3, "http_errors": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.http.connect_timeout, Some(3.0));
        assert_eq!(config.http.http_errors, Some(false));

        let validated = config.validate().unwrap();
        assert_eq!(validated.http.connect_timeout, Some(3.0));
        assert_eq!(validated.base_url.as_str(), "https://xyz.api.infobip.com/");
    }

    #[test]
    fn test_validate_missing_api_key() {
        let config = InfobipConfig::from_json(r#"{ "base_url": "https://x.test" }"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::MissingConfig("api_key")));
        assert!(err.is_config());
    }

    #[test]
    fn test_validate_blank_base_url() {
        let config = InfobipConfig::new("secret", "   ");
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfig("base_url"))
        ));
    }

    #[test]
    fn test_validate_base_url_without_scheme() {
        let validated = InfobipConfig::new("secret", "xyz.api.infobip.com")
            .validate()
            .unwrap();
        assert_eq!(validated.base_url.scheme(), "https");
        assert_eq!(validated.base_url.host_str(), Some("xyz.api.infobip.com"));
        assert_eq!(validated.http.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("INFOBIP_API_KEY", "secret"),
            ("INFOBIP_BASE_URL", "https://x.test"),
            ("INFOBIP_TIMEOUT", "12.5"),
        ]
        .into_iter()
        .collect();

        let config =
            InfobipConfig::from_lookup(|key| env.get(key).map(ToString::to_string)).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.http.timeout, Some(12.5));
        assert_eq!(config.http.connect_timeout, None);
    }

    #[test]
    fn test_from_lookup_rejects_bad_timeout() {
        let result = InfobipConfig::from_lookup(|key| {
            (key == "INFOBIP_CONNECT_TIMEOUT").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = InfobipConfig::new("super-secret", "https://x.test");
        assert!(!format!("{config:?}").contains("super-secret"));
        assert!(!format!("{:?}", config.validate().unwrap()).contains("super-secret"));
    }

    #[test]
    fn test_build_client_rejects_negative_timeout() {
        let options = HttpOptions {
            timeout: Some(-1.0),
            ..HttpOptions::default()
        };
        assert!(matches!(
            options.build_client(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_client_with_defaults() {
        assert!(HttpOptions::default().with_defaults().build_client().is_ok());
    }
}
