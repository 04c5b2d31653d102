//! Configuration manager for the marketplace.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8000";
const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_OTP_COST: u32 = 10;
const MIN_OTP_COST: u32 = 4;
const MAX_OTP_COST: u32 = 31;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Domain name of current instance.
    pub url: String,
    /// Socket address to listen on.
    pub address: Option<String>,
    /// Origin allowed to send credentialed requests.
    pub frontend_url: Option<String>,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Related to access token configuration.
    #[serde(skip_serializing)]
    pub token: Option<Token>,
    /// Related to delivery code hashing.
    #[serde(default, skip_serializing)]
    pub otp: Otp,
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

/// Access token configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Token {
    /// HMAC secret shared with the authentication service.
    pub secret: Option<String>,
    /// Expected `aud` claim.
    pub audience: Option<String>,
}

/// Delivery code configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Otp {
    /// bcrypt cost factor.
    pub cost: u32,
}

impl Default for Otp {
    fn default() -> Self {
        Self {
            cost: DEFAULT_OTP_COST,
        }
    }
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Address the HTTP server binds to. `PORT` overrides the configured port.
    pub fn listen_address(&self) -> String {
        let address = self.address.as_deref().unwrap_or(DEFAULT_ADDRESS);

        match std::env::var("PORT") {
            Ok(port) => {
                let host = address.rsplit_once(':').map(|(host, _)| host).unwrap_or(address);
                format!("{host}:{port}")
            },
            Err(_) => address.to_owned(),
        }
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{url}")
        };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.as_str().trim_end_matches('/').to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            self.path.as_path()
        } else {
            Path::new(DEFAULT_CONFIG_PATH)
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration = match serde_yaml::from_reader(file) {
                    Ok(config) => config,
                    Err(err) => {
                        return Ok(Arc::new(self.error(err)));
                    },
                };

                config.version = VERSION.to_owned();

                if !config.url.is_empty() {
                    config.url = self.normalize_url(&config.url)?;
                }
                config.frontend_url = config
                    .frontend_url
                    .map(|f| self.normalize_url(&f))
                    .transpose()?;

                if !(MIN_OTP_COST..=MAX_OTP_COST).contains(&config.otp.cost) {
                    tracing::warn!(
                        cost = config.otp.cost,
                        "`otp.cost` out of bcrypt range, using default"
                    );
                    config.otp = Otp::default();
                }

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid");
        Self {
            version: VERSION.to_owned(),
            ..Default::default()
        }
    }

    /// Current crate version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        let config = Configuration::default();
        assert_eq!(
            config.normalize_url("market.example.com").unwrap(),
            "https://market.example.com"
        );
        assert_eq!(
            config.normalize_url("http://localhost:5173/").unwrap(),
            "http://localhost:5173"
        );
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
name: campus-market
url: market.example.com
frontend_url: http://localhost:5173
postgres:
  address: localhost:5432
  pool_size: 4
token:
  secret: s3cr3t
otp:
  cost: 12
"#;
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.name, "campus-market");
        assert_eq!(config.postgres.unwrap().pool_size, Some(4));
        assert_eq!(config.token.unwrap().secret.as_deref(), Some("s3cr3t"));
        assert_eq!(config.otp.cost, 12);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Configuration::default()
            .path(PathBuf::from("does/not/exist.yaml"))
            .read()
            .unwrap();
        assert_eq!(config.otp.cost, DEFAULT_OTP_COST);
        assert_eq!(config.version(), VERSION);
    }
}
