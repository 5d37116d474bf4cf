//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` and can be set via
//! `-f` flag or `PERCH_CONFIG`. Any field can be overridden with a
//! `PERCH_`-prefixed variable (`PERCH_PORT=8080`); `DATABASE_URL` and
//! `JWT_SECRET` are also accepted unprefixed since deployments commonly
//! inject them that way.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Error;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PERCH_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server
    #[arg(long)]
    pub validate: bool,
}

/// Deployment platform. Destructive admin endpoints only work on `dev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    Production,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string. When unset, a dev deployment falls back
    /// to in-memory stores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// HMAC secret for signing access tokens. Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_secret: Option<String>,
    /// Shared key expected from the payment provider webhook. When unset the
    /// webhook endpoint rejects everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_api_key: Option<String>,
    pub platform: Platform,
    /// Directory served under /app
    pub static_dir: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            jwt_secret: None,
            payment_api_key: None,
            platform: Platform::Production,
            static_dir: "app".to_string(),
            access_token_ttl: Duration::from_secs(60 * 60),
            refresh_token_ttl: Duration::from_secs(60 * 60 * 24 * 60),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;

        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can still override specific values
            .merge(Env::prefixed("PERCH_"))
            // Common unprefixed deployment variables
            .merge(Env::raw().only(&["DATABASE_URL", "JWT_SECRET"]))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.jwt_secret.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Internal {
                operation: "Config validation: jwt_secret is not configured. \
                 Please set the JWT_SECRET environment variable or add jwt_secret to the config file."
                    .to_string(),
            });
        }

        if self.platform == Platform::Production && self.database_url.is_none() {
            return Err(Error::Internal {
                operation: "Config validation: production deployments require database_url"
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The signing secret. Validation guarantees it is present after load;
    /// this guards direct construction in tests.
    pub fn jwt_secret(&self) -> Result<&str, Error> {
        self.jwt_secret.as_deref().ok_or_else(|| Error::Internal {
            operation: "read jwt_secret from config".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_with_minimal_config() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
jwt_secret: hello
platform: dev
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.host, "0.0.0.0");
            assert_eq!(config.port, 8080);
            assert_eq!(config.platform, Platform::Dev);
            assert_eq!(config.access_token_ttl, Duration::from_secs(3600));
            assert_eq!(config.refresh_token_ttl, Duration::from_secs(60 * 60 * 24 * 60));

            Ok(())
        });
    }

    #[test]
    fn test_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
jwt_secret: hello
platform: dev
port: 9000
"#,
            )?;

            jail.set_env("PERCH_HOST", "127.0.0.1");
            jail.set_env("PERCH_PORT", "8081");
            jail.set_env("DATABASE_URL", "postgresql://localhost/perch");

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.port, 8081);
            assert_eq!(config.database_url.as_deref(), Some("postgresql://localhost/perch"));
            assert_eq!(config.bind_address(), "127.0.0.1:8081");

            Ok(())
        });
    }

    #[test]
    fn test_missing_jwt_secret_fails_validation() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "platform: dev\n")?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            assert!(Config::load(&args).is_err());

            Ok(())
        });
    }

    #[test]
    fn test_production_requires_database() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
jwt_secret: hello
platform: production
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            assert!(Config::load(&args).is_err());

            jail.set_env("DATABASE_URL", "postgresql://localhost/perch");
            assert!(Config::load(&args).is_ok());

            Ok(())
        });
    }

    #[test]
    fn test_ttls_accept_humantime_strings() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
jwt_secret: hello
platform: dev
access_token_ttl: 15m
refresh_token_ttl: 30days
"#,
            )?;

            let args = Args {
                config: "test.yaml".to_string(),
                validate: false,
            };

            let config = Config::load(&args)?;

            assert_eq!(config.access_token_ttl, Duration::from_secs(15 * 60));
            assert_eq!(config.refresh_token_ttl, Duration::from_secs(30 * 24 * 60 * 60));

            Ok(())
        });
    }
}
