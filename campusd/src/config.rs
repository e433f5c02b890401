//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be specified
//! via `-f` flag or the `CAMPUSD_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **Environment variables** - variables prefixed with `CAMPUSD_`
//! 3. **DATABASE_URL** - special case: overrides `database_url` if set
//!
//! For nested values, use double underscores in environment variables, e.g.
//! `CAMPUSD_WALLET__MINIMUM_WITHDRAWAL=500` sets `wallet.minimum_withdrawal`.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "CAMPUSD_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    pub admin_password: Option<String>,
    /// Secret key for JWT signing (required for production)
    pub secret_key: Option<String>,
    /// Authentication settings
    pub auth: AuthConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Wallet and settlement settings
    pub wallet: WalletConfig,
    /// Subscription settings
    pub subscriptions: SubscriptionConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Session token lifetime
    #[serde(with = "humantime_serde")]
    pub jwt_expiry: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_expiry: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins; `"*"` for any
    pub allowed_origins: Vec<CorsOrigin>,
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![CorsOrigin::Wildcard],
            allow_credentials: false,
            max_age: Some(3600),
        }
    }
}

/// One CORS origin: either the `"*"` wildcard or a concrete URL.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigin {
    Wildcard,
    Url(Url),
}

impl Serialize for CorsOrigin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CorsOrigin::Wildcard => serializer.serialize_str("*"),
            CorsOrigin::Url(url) => serializer.serialize_str(url.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for CorsOrigin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "*" {
            return Ok(CorsOrigin::Wildcard);
        }
        let url = Url::parse(&raw).map_err(serde::de::Error::custom)?;
        Ok(CorsOrigin::Url(url))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletConfig {
    /// Currency tag stamped on wallets
    pub currency: String,
    /// Smallest withdrawal the API accepts
    pub minimum_withdrawal: Decimal,
    /// Fraction of each sale credited to the uploader; the rest lands in the
    /// platform wallet
    pub seller_share: Decimal,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            currency: "NGN".to_string(),
            minimum_withdrawal: Decimal::from(1000),
            seller_share: Decimal::new(70, 2),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubscriptionConfig {
    /// Plan length when the subscribe request does not specify one
    pub default_duration_days: i64,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            default_duration_days: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgresql://localhost/campusd".to_string(),
            admin_email: "admin@campusd.local".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
            wallet: WalletConfig::default(),
            subscriptions: SubscriptionConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

impl Config {
    /// Load configuration from the YAML file and environment overrides.
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config: Config = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("CAMPUSD_").split("__"))
            .extract()?;

        // DATABASE_URL wins over everything, matching common deployment setups
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.wallet.seller_share <= Decimal::ZERO || self.wallet.seller_share > Decimal::ONE {
            anyhow::bail!(
                "wallet.seller_share must be within (0, 1], got {}",
                self.wallet.seller_share
            );
        }
        if self.wallet.minimum_withdrawal < Decimal::ZERO {
            anyhow::bail!("wallet.minimum_withdrawal cannot be negative");
        }
        if self.subscriptions.default_duration_days <= 0 {
            anyhow::bail!("subscriptions.default_duration_days must be positive");
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.wallet.seller_share, Decimal::new(70, 2));
        assert_eq!(config.wallet.currency, "NGN");
        assert_eq!(config.subscriptions.default_duration_days, 30);
    }

    #[test]
    fn seller_share_outside_unit_interval_rejected() {
        let mut config = Config::default();
        config.wallet.seller_share = Decimal::from(2);
        assert!(config.validate().is_err());

        config.wallet.seller_share = Decimal::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn cors_origin_roundtrip() {
        let wildcard: CorsOrigin = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(wildcard, CorsOrigin::Wildcard);

        let url: CorsOrigin = serde_json::from_str("\"https://app.example.com\"").unwrap();
        assert!(matches!(url, CorsOrigin::Url(_)));

        assert!(serde_json::from_str::<CorsOrigin>("\"not a url\"").is_err());
    }
}
