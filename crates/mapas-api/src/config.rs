//! # Service Configuration
//!
//! Loaded from the environment at startup:
//!
//! | Variable         | Default                  | Meaning |
//! |------------------|--------------------------|---------|
//! | `PORT`           | `8080`                   | HTTP listen port |
//! | `AUTH_TOKEN`     | unset (auth disabled)    | shared secret for bearer tokens |
//! | `MAPAS_BASE_URL` | `http://localhost:8080/` | base of the canonical URLs in projections |

use mapas_core::{UrlBuilder, UrlError};

#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared bearer-token secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// Canonical URL builder rooted at the public base URL.
    pub urls: UrlBuilder,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.urls.base())
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            urls: UrlBuilder::default(),
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError` if `PORT` is not a port number or
    /// `MAPAS_BASE_URL` is not an absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8080,
        };

        let auth_token = lookup("AUTH_TOKEN").filter(|t| !t.is_empty());

        let urls = match lookup("MAPAS_BASE_URL") {
            Some(raw) => UrlBuilder::new(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
                var: "MAPAS_BASE_URL".to_string(),
                source,
            })?,
            None => UrlBuilder::default(),
        };

        Ok(Self {
            port,
            auth_token,
            urls,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),
    #[error("invalid URL for {var}: {source}")]
    InvalidUrl {
        var: String,
        #[source]
        source: UrlError,
    },
}
